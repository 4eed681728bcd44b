//! Infrastructure Layer - Store and content implementations

pub mod memory;
pub mod postgres;
pub mod quotes;
