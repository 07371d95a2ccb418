//! Periodic online-count snapshots

use chat_cache::{OnlineSnapshot, OnlineStatsStore, SharedPresenceRegistry};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Record the presence count every `every`; `None` when disabled (zero)
pub fn spawn_online_snapshots(
    presence: SharedPresenceRegistry,
    store: OnlineStatsStore,
    every: Duration,
) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        tracing::info!("Online snapshots disabled");
        return None;
    }

    tracing::info!(interval_secs = every.as_secs(), "Online snapshots enabled");

    Some(tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let snapshot = OnlineSnapshot::now(presence.online_count());
            if let Err(e) = store.record(&snapshot).await {
                tracing::warn!(error = %e, online = snapshot.online, "Failed to record online snapshot");
            }
        }
    }))
}
