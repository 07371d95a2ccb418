//! Integration test utilities for the chat subsystem
//!
//! Helpers for running end-to-end tests against the REST API and the
//! session gateway.

pub mod fixtures;
pub mod gateway;
pub mod helpers;

pub use fixtures::*;
pub use gateway::*;
pub use helpers::*;
