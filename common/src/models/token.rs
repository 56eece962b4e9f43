// common/src/models/token.rs
use serde::{Deserialize, Serialize};

/// One claimed token unit of the gating drop
///
/// Sourced fresh per request from the ownership oracle; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Wallet that holds the claimed unit
    pub owner: String,
    /// Raw units held by the owner's token account
    pub amount: u64,
}
