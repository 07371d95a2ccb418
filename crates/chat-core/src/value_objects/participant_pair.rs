//! Unordered pair of chat members
//!
//! A chat is keyed by its two members regardless of who opened it, so the
//! pair is normalized with the lower id first. `(a, b)` and `(b, a)` compare
//! and hash equal.

use crate::error::DomainError;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: Snowflake,
    high: Snowflake,
}

impl ParticipantPair {
    /// Build a pair from two distinct users
    pub fn new(a: Snowflake, b: Snowflake) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::InvalidParticipants(
                "a chat needs two different users".to_string(),
            ));
        }
        Ok(if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        })
    }

    #[inline]
    pub fn low(&self) -> Snowflake {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Snowflake {
        self.high
    }

    #[inline]
    pub fn contains(&self, user_id: Snowflake) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The member that is not `user_id`, if `user_id` belongs to the pair
    pub fn other(&self, user_id: Snowflake) -> Option<Snowflake> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn members(&self) -> [Snowflake; 2] {
        [self.low, self.high]
    }
}
