//! Client identification utilities
//!
//! TCP peers are identified by their IP address alone. The port changes on
//! every dial, so it is never part of the identity.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Identity of a remote client, used to bind issued seeds to the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Build the identity from a peer socket address (port dropped)
    pub fn from_addr(addr: SocketAddr) -> Self {
        Self::from_ip(addr.ip())
    }

    pub fn from_ip(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
