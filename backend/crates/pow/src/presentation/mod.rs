//! Presentation Layer - Wire protocol and TCP transport
//!
//! Contains the frame codec, request routing, the per-connection loop,
//! the listener and the transport client.

pub mod client;
pub mod codec;
pub mod connection;
pub mod dto;
pub mod handlers;
pub mod listener;
pub mod router;
