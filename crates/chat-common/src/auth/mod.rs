//! Caller authentication

mod jwt;

pub use jwt::{Claims, JwtService, TokenType};
