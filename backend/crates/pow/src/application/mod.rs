//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod authorizer;
pub mod config;
pub mod difficulty;
pub mod issue_seed;
pub mod redeem_token;
pub mod request_quote;
pub mod seed;
