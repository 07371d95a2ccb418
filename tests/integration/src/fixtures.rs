//! Test fixtures
//!
//! Seeds the user and listing read models directly; the chat subsystem
//! never writes them.

use std::sync::OnceLock;

use anyhow::Result;
use chat_common::{AppConfig, JwtService};
use chat_core::{Snowflake, SnowflakeGenerator};
use chat_db::PgPool;
use serde::Serialize;

/// Ids unique across concurrently running test binaries
pub fn unique_id() -> Snowflake {
    static GENERATOR: OnceLock<SnowflakeGenerator> = OnceLock::new();
    GENERATOR
        .get_or_init(|| {
            let worker = u16::try_from(std::process::id() % 1024).unwrap_or(1023);
            SnowflakeGenerator::new(worker)
        })
        .generate()
}

/// A seeded user with a valid access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Snowflake,
    pub name: String,
    pub token: String,
}

impl TestUser {
    pub async fn seed(pool: &PgPool, jwt: &JwtService, name: &str) -> Result<Self> {
        let id = unique_id();
        let name = format!("{name}-{id}");

        sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2)")
            .bind(id.into_inner())
            .bind(&name)
            .execute(pool)
            .await?;

        let token = jwt.issue_access_token(id)?;
        Ok(Self { id, name, token })
    }
}

/// Seed a listing owned by `seller`
pub async fn seed_listing(pool: &PgPool, seller: &TestUser, title: &str) -> Result<Snowflake> {
    let id = unique_id();

    sqlx::query("INSERT INTO listings (id, seller_id, title) VALUES ($1, $2, $3)")
        .bind(id.into_inner())
        .bind(seller.id.into_inner())
        .bind(title)
        .execute(pool)
        .await?;

    Ok(id)
}

/// Pool and token issuer for seeding, built from the same config as the
/// server under test
pub struct Seeder {
    pub pool: PgPool,
    pub jwt: JwtService,
}

impl Seeder {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pool = chat_db::create_pool(&chat_db::PoolConfig::from(&config.database)).await?;
        chat_db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            jwt: JwtService::from_config(&config.jwt),
        })
    }

    pub async fn user(&self, name: &str) -> Result<TestUser> {
        TestUser::seed(&self.pool, &self.jwt, name).await
    }

    pub async fn listing(&self, seller: &TestUser, title: &str) -> Result<Snowflake> {
        seed_listing(&self.pool, seller, title).await
    }
}

/// POST /chats body
#[derive(Debug, Serialize)]
pub struct OpenChat {
    pub seller_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
}

impl OpenChat {
    pub fn with(seller: &TestUser) -> Self {
        Self {
            seller_id: seller.id.to_string(),
            listing_id: None,
        }
    }

    pub fn about(seller: &TestUser, listing_id: Snowflake) -> Self {
        Self {
            seller_id: seller.id.to_string(),
            listing_id: Some(listing_id.to_string()),
        }
    }
}
