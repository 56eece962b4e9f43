// web-server/src/access/mod.rs
mod gate;
mod oracle;
mod resolver;

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub use gate::{AccessDecision, AccessGate};
pub use oracle::{OwnershipOracle, SplTokenOracle};
pub use resolver::{JwtSessionResolver, RequestCredentials, SessionResolver, AUTH_COOKIE_NAME};

/// Collaborator fault surfaced by the access gate
///
/// Deny outcomes are not errors. This type only carries failures of the
/// session or ownership collaborators themselves, and those must never
/// collapse into the deny redirect.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid program address: {0}")]
    ProgramAddress(#[from] solana_sdk::pubkey::ParsePubkeyError),

    #[error("ownership lookup failed: {0}")]
    Oracle(#[from] solana_client::client_error::ClientError),

    #[error("session verification failed: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
}

impl ResponseError for GateError {
    fn error_response(&self) -> HttpResponse {
        tracing::error!("Gate collaborator fault: {}", self);
        HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error"
        }))
    }
}
