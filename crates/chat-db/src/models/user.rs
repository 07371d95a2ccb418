//! User read model

use sqlx::FromRow;

/// Columns of the users table that chat reads
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}
