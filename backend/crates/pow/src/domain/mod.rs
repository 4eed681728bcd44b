//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (IssuedSeed)
//! - Domain value objects (AuthorizerConfig, BitsRange)
//! - Domain services (hashcash stamp minting and verification)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
