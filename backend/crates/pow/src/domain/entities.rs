//! Domain Entities
//!
//! Core business entities for the PoW domain.

use platform::client::ClientIdentity;

/// A seed handed to a client, bound to that client's identity
///
/// The replay store holds one slot per identity. A seed counts as issued
/// only while it is the one stored in its identity's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSeed {
    pub identity: String,
    /// Seed exactly as sent on the wire (difficulty config merged in)
    pub seed: String,
}

impl IssuedSeed {
    pub fn new(identity: &ClientIdentity, seed: impl Into<String>) -> Self {
        Self {
            identity: identity.as_str().to_owned(),
            seed: seed.into(),
        }
    }
}
