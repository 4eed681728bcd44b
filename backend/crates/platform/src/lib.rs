//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (OS entropy, SHA-256, Base64)
//! - Client identification for TCP peers
//! - Sliding-window request rate measurement

pub mod client;
pub mod crypto;
pub mod rate_limit;
