//! Presence module.
//!
//! In-process registry of the live gateway session held by each user.

mod registry;

pub use registry::{DeliveryError, PresenceRegistry, SessionHandle, SharedPresenceRegistry};
