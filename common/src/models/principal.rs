// common/src/models/principal.rs
use serde::{Deserialize, Serialize};

/// Authenticated caller identified by a wallet address
///
/// Produced fresh per request by the session resolver and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Base58 wallet public key
    pub address: String,
}

impl Principal {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}
