//! In-memory test doubles for the service layer.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_cache::{
    DeliveryError, EventPublisher, PresenceRegistry, PubSubChannel, PubSubEvent, RedisPoolError,
    RedisResult, SessionHandle, SharedPresenceRegistry,
};
use chat_core::traits::{
    ChatRepository, ListingRepository, MessageRepository, NotificationRepository,
    ParticipantRepository, RepoResult, UserRepository,
};
use chat_core::{
    Chat, DomainError, Message, Notification, Participant, ParticipantPair, Snowflake,
    SnowflakeGenerator, User,
};
use chat_service::{ServiceContext, ServiceContextBuilder};

// ============================================================================
// Repositories
// ============================================================================

#[derive(Default)]
struct State {
    users: HashMap<Snowflake, User>,
    listings: HashSet<Snowflake>,
    chats: HashMap<Snowflake, Chat>,
    participants: HashMap<(Snowflake, Snowflake), Participant>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
}

/// One store backing every repository trait
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.id, user);
    }

    pub fn add_listing(&self, id: Snowflake) {
        self.state.lock().unwrap().listings.insert(id);
    }

    pub fn chat_count(&self) -> usize {
        self.state.lock().unwrap().chats.len()
    }

    pub fn chat(&self, id: Snowflake) -> Option<Chat> {
        self.state.lock().unwrap().chats.get(&id).cloned()
    }

    pub fn notifications_for(&self, user_id: Snowflake) -> Vec<Notification> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .filter(|n| n.recipient_id == user_id)
            .cloned()
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    /// Store a message without going through the pipeline, leaving the
    /// chat's lifecycle flag untouched
    pub fn insert_raw_message(&self, message: Message) {
        self.state.lock().unwrap().messages.push(message);
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.lock().unwrap().users.contains_key(&id))
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.lock().unwrap().listings.contains(&id))
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        Ok(self.chat(id))
    }

    async fn find_by_pair(
        &self,
        pair: ParticipantPair,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Chat>> {
        let found = self
            .state
            .lock()
            .unwrap()
            .chats
            .values()
            .find(|c| c.participants == pair && c.listing_id == listing_id)
            .cloned();
        // Let concurrent callers interleave between lookup and create
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state
            .chats
            .values()
            .any(|c| c.participants == chat.participants && c.listing_id == chat.listing_id);
        if duplicate {
            return Err(DomainError::ChatAlreadyExists);
        }

        state.chats.insert(chat.id, chat.clone());
        for user_id in chat.participants.members() {
            state
                .participants
                .insert((chat.id, user_id), Participant::new(chat.id, user_id));
        }
        Ok(())
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .chats
            .values()
            .filter(|c| c.has_member(user_id))
            .cloned()
            .collect())
    }

    async fn mark_permanent(&self, id: Snowflake) -> RepoResult<bool> {
        let mut state = self.state.lock().unwrap();
        let chat = state.chats.get_mut(&id).ok_or(DomainError::ChatNotFound(id))?;
        let changed = chat.temporary;
        chat.temporary = false;
        Ok(changed)
    }

    async fn delete_empty_temporary(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let mut state = self.state.lock().unwrap();
        let doomed: Vec<Snowflake> = state
            .chats
            .values()
            .filter(|c| c.temporary && c.has_member(user_id))
            .filter(|c| !state.messages.iter().any(|m| m.chat_id == c.id))
            .map(|c| c.id)
            .collect();

        for id in &doomed {
            state.chats.remove(id);
            state.participants.retain(|(chat_id, _), _| chat_id != id);
        }
        Ok(doomed)
    }
}

/// Chat repository over a [`MemoryStore`] whose lifecycle flip can be made
/// to fail
pub struct UnreliableChats {
    store: Arc<MemoryStore>,
    fail_mark_permanent: AtomicBool,
}

impl UnreliableChats {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            fail_mark_permanent: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.fail_mark_permanent.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatRepository for UnreliableChats {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        ChatRepository::find_by_id(self.store.as_ref(), id).await
    }

    async fn find_by_pair(
        &self,
        pair: ParticipantPair,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Chat>> {
        self.store.find_by_pair(pair, listing_id).await
    }

    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        ChatRepository::create(self.store.as_ref(), chat).await
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        self.store.find_by_user(user_id).await
    }

    async fn mark_permanent(&self, id: Snowflake) -> RepoResult<bool> {
        if self.fail_mark_permanent.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection reset".to_string()));
        }
        self.store.mark_permanent(id).await
    }

    async fn delete_empty_temporary(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        self.store.delete_empty_temporary(user_id).await
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn find(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Participant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .participants
            .get(&(chat_id, user_id))
            .cloned())
    }

    async fn accept_terms(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut state = self.state.lock().unwrap();
        let participant = state
            .participants
            .get_mut(&(chat_id, user_id))
            .ok_or(DomainError::ForbiddenParticipant { chat_id, user_id })?;
        let changed = !participant.chat_terms_accepted;
        participant.chat_terms_accepted = true;
        Ok(changed)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: &Message) -> RepoResult<Message> {
        let mut state = self.state.lock().unwrap();
        if !state.chats.contains_key(&message.chat_id) {
            return Err(DomainError::ChatNotFound(message.chat_id));
        }

        // Same ordering guarantee as the GREATEST() in the Postgres insert
        let latest = state
            .messages
            .iter()
            .filter(|m| m.chat_id == message.chat_id)
            .map(|m| m.sent_at)
            .max();
        let mut stored = message.clone();
        if let Some(latest) = latest {
            stored.sent_at = stored.sent_at.max(latest);
        }
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.sent_at, m.id));
        Ok(messages)
    }

    async fn find_last(&self, chat_id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(MessageRepository::find_by_chat(self, chat_id).await?.pop())
    }

    async fn mark_read(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for message in state
            .messages
            .iter_mut()
            .filter(|m| m.chat_id == chat_id && m.receiver_id == reader_id && !m.is_read)
        {
            message.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn count_unread(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<i64> {
        let count = self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id && m.receiver_id == reader_id && !m.is_read)
            .count();
        Ok(i64::try_from(count).unwrap())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn find_by_recipient(&self, recipient_id: Snowflake) -> RepoResult<Vec<Notification>> {
        let mut found = self.notifications_for(recipient_id);
        found.sort_by_key(|n| std::cmp::Reverse((n.created_at, n.id)));
        Ok(found)
    }

    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn mark_read(&self, id: Snowflake) -> RepoResult<bool> {
        let mut state = self.state.lock().unwrap();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(DomainError::NotificationNotFound(id))?;
        let changed = !notification.is_read;
        notification.is_read = true;
        Ok(changed)
    }

    async fn count_unread(&self, recipient_id: Snowflake) -> RepoResult<i64> {
        let count = self
            .notifications_for(recipient_id)
            .iter()
            .filter(|n| !n.is_read)
            .count();
        Ok(i64::try_from(count).unwrap())
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Publisher that records every event instead of talking to Redis
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(PubSubChannel, PubSubEvent)>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<(PubSubChannel, PubSubEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_of(&self, event_type: &str) -> Vec<(PubSubChannel, PubSubEvent)> {
        self.events()
            .into_iter()
            .filter(|(_, event)| event.event_type == event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RedisPoolError::CreatePool("publisher offline".to_string()));
        }
        self.events
            .lock()
            .unwrap()
            .push((channel.clone(), event.clone()));
        Ok(1)
    }
}

/// Live session that records pushed events
pub struct FakeSession {
    id: String,
    closed: bool,
    received: Mutex<Vec<PubSubEvent>>,
}

impl FakeSession {
    pub fn open(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            closed: false,
            received: Mutex::new(Vec::new()),
        })
    }

    /// A session whose transport is already gone
    pub fn closed(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            closed: true,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<PubSubEvent> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionHandle for FakeSession {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, event: &PubSubEvent) -> Result<(), DeliveryError> {
        if self.closed {
            return Err(DeliveryError::Closed);
        }
        self.received.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub presence: SharedPresenceRegistry,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self::with_chat_repo(store.clone(), store)
    }

    /// Harness whose chat repository is `chats`, everything else on `store`
    pub fn with_chat_repo(store: Arc<MemoryStore>, chats: Arc<dyn ChatRepository>) -> Self {
        let publisher = Arc::new(RecordingPublisher::default());
        let presence = Arc::new(PresenceRegistry::new());

        let ctx = ServiceContextBuilder::new()
            .user_repo(store.clone())
            .listing_repo(store.clone())
            .chat_repo(chats)
            .participant_repo(store.clone())
            .message_repo(store.clone())
            .notification_repo(store.clone())
            .publisher(publisher.clone())
            .presence(presence.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .build()
            .unwrap();

        Self {
            ctx,
            store,
            publisher,
            presence,
        }
    }

    pub fn user(&self, id: i64, name: &str) -> Snowflake {
        let id = Snowflake::new(id);
        self.store.add_user(User::new(id, name.to_string()));
        id
    }

    pub fn listing(&self, id: i64) -> Snowflake {
        let id = Snowflake::new(id);
        self.store.add_listing(id);
        id
    }

    /// Put `user_id` online with a recording session
    pub fn connect(&self, user_id: Snowflake, session: Arc<FakeSession>) {
        self.presence.register(user_id, session);
    }
}
