//! User read model
//!
//! Accounts are owned by the marketplace user service; chat only needs
//! the display data of the people it connects.

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(id: Snowflake, name: String) -> Self {
        Self {
            id,
            name,
            avatar_url: None,
        }
    }
}
