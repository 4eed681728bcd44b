//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! admission engine and the binaries:
//! - Common error types and result aliases
//! - Error classification used to render `error` frames and pick log levels
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all layers.

pub mod error {
    pub mod app_error;
    pub mod kind;
}
