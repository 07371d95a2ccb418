//! Value objects - immutable types that represent domain concepts

mod participant_pair;
mod snowflake;

pub use participant_pair::ParticipantPair;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
