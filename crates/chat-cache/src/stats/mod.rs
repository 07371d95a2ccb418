//! Online-user statistics.

mod online;

pub use online::{OnlineSnapshot, OnlineStatsStore};
