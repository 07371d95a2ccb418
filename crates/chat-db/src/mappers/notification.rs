//! Notification entity <-> model mapper

use chat_core::entities::{Notification, NotificationPayload};
use chat_core::value_objects::Snowflake;

use crate::models::NotificationModel;

impl From<NotificationModel> for Notification {
    fn from(model: NotificationModel) -> Self {
        Notification {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.recipient_id),
            payload: NotificationPayload {
                title: model.title,
                body: model.body,
                link: model.link,
            },
            created_at: model.created_at,
            is_read: model.is_read,
        }
    }
}

/// Notification entity values for insertion
pub struct NotificationInsert<'a> {
    pub id: i64,
    pub recipient_id: i64,
    pub title: &'a str,
    pub body: &'a str,
    pub link: &'a str,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
}

impl<'a> NotificationInsert<'a> {
    pub fn new(notification: &'a Notification) -> Self {
        Self {
            id: notification.id.into_inner(),
            recipient_id: notification.recipient_id.into_inner(),
            title: &notification.payload.title,
            body: &notification.payload.body,
            link: &notification.payload.link,
            created_at: notification.created_at,
            is_read: notification.is_read,
        }
    }
}
