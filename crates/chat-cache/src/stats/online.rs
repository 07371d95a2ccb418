//! Periodic online-count snapshots stored in Redis.
//!
//! The gateway records one snapshot per interval; the REST layer reads the
//! latest value and a bounded history.

use crate::pool::{RedisPool, RedisResult};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

const CURRENT_KEY: &str = "stats:online:current";
const HISTORY_KEY: &str = "stats:online:history";

/// Number of connected users at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineSnapshot {
    pub online: u64,
    pub timestamp: DateTime<Utc>,
}

impl OnlineSnapshot {
    #[must_use]
    pub fn now(online: usize) -> Self {
        Self {
            online: online as u64,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OnlineStatsStore {
    pool: RedisPool,
    history_size: usize,
}

impl OnlineStatsStore {
    #[must_use]
    pub fn new(pool: RedisPool, history_size: usize) -> Self {
        Self {
            pool,
            history_size: history_size.max(1),
        }
    }

    /// Store `snapshot` as current and push it onto the capped history
    pub async fn record(&self, snapshot: &OnlineSnapshot) -> RedisResult<()> {
        let encoded = serde_json::to_string(snapshot)?;
        let mut conn = self.pool.get().await?;

        redis::pipe()
            .atomic()
            .set(CURRENT_KEY, &encoded)
            .ignore()
            .lpush(HISTORY_KEY, &encoded)
            .ignore()
            .ltrim(HISTORY_KEY, 0, last_index(self.history_size))
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        tracing::trace!(online = snapshot.online, "Recorded online snapshot");
        Ok(())
    }

    pub async fn latest(&self) -> RedisResult<Option<OnlineSnapshot>> {
        self.pool.get_value(CURRENT_KEY).await
    }

    /// Most recent snapshots first, at most `limit` (capped by history size)
    pub async fn history(&self, limit: usize) -> RedisResult<Vec<OnlineSnapshot>> {
        let mut conn = self.pool.get().await?;
        let raw: Vec<String> = conn
            .lrange(HISTORY_KEY, 0, last_index(limit.min(self.history_size)))
            .await?;

        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed online snapshot");
                    None
                }
            })
            .collect())
    }
}

/// Inclusive end index for LRANGE/LTRIM covering `len` entries
fn last_index(len: usize) -> isize {
    isize::try_from(len).unwrap_or(isize::MAX).max(1) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_index() {
        assert_eq!(last_index(96), 95);
        assert_eq!(last_index(1), 0);
        assert_eq!(last_index(0), 0);
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = OnlineSnapshot::now(3);
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["online"], 3);
        assert!(json["timestamp"].is_string());
    }
}
