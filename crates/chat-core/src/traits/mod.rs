//! Ports implemented by the infrastructure layer

mod repositories;

pub use repositories::{
    ChatRepository, ListingRepository, MessageRepository, NotificationRepository,
    ParticipantRepository, RepoResult, UserRepository,
};
