// common/src/utils.rs
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use jsonwebtoken::{encode, decode, Header, Algorithm, Validation, EncodingKey, DecodingKey};
use jsonwebtoken::errors::ErrorKind;
use serde::{Serialize, Deserialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Setup tracing for consistent logging across services
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Session token lifetime in seconds (24 hours)
pub const SESSION_TTL_SECS: usize = 86400;

// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,       // wallet_address
    pub domain: String,    // domain the session was issued for
    pub exp: usize,        // expiration time
    pub iat: usize,        // issued at time
}

// Generate a session token for a wallet address, bound to a domain
pub fn generate_session_token(wallet_address: &str, domain: &str, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as usize;

    let claims = SessionClaims {
        sub: wallet_address.to_string(),
        domain: domain.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret)
    )
}

// Validate a session token and extract the wallet address
pub fn validate_session_token(token: &str, secret: &[u8], domain: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation
    )?;

    // A token issued for another domain is not a session for this one
    if token_data.claims.domain != domain {
        return Err(ErrorKind::InvalidAudience.into());
    }

    Ok(token_data.claims.sub)
}
