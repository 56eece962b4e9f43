// web-server/src/access/resolver.rs
use actix_web::HttpRequest;
use async_trait::async_trait;
use common::models::principal::Principal;
use common::validate_session_token;
use jsonwebtoken::errors::ErrorKind;

use super::GateError;

// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "gate_session";

/// Owned credential view of an inbound request
///
/// The gate never sees the request itself, only this extraction.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    session_token: Option<String>,
}

impl RequestCredentials {
    /// Pull the session cookie out of an inbound request
    pub fn from_request(req: &HttpRequest) -> Self {
        Self {
            session_token: req
                .cookie(AUTH_COOKIE_NAME)
                .map(|cookie| cookie.value().to_string()),
        }
    }

    /// Credentials of a caller with no session cookie
    pub fn anonymous() -> Self {
        Self {
            session_token: None,
        }
    }

    pub fn from_token(token: String) -> Self {
        Self {
            session_token: Some(token),
        }
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

/// Resolves a caller to an authenticated principal, or to nothing
///
/// "Unauthenticated" is a normal return value. Implementations reserve
/// errors for faults of the verification machinery itself.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, creds: &RequestCredentials) -> Result<Option<Principal>, GateError>;
}

/// Session resolver backed by the signed session cookie
pub struct JwtSessionResolver {
    secret: Vec<u8>,
    domain: String,
}

impl JwtSessionResolver {
    pub fn new(secret: Vec<u8>, domain: String) -> Self {
        Self { secret, domain }
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, creds: &RequestCredentials) -> Result<Option<Principal>, GateError> {
        let token = match creds.session_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        match validate_session_token(token, &self.secret, &self.domain) {
            Ok(address) => Ok(Some(Principal::new(address))),
            Err(e) if is_credential_failure(&e) => {
                tracing::debug!("Rejected session token: {}", e);
                Ok(None)
            }
            // Anything else is the verifier failing, not a bad token
            Err(e) => Err(GateError::Session(e)),
        }
    }
}

// Token problems that mean "not logged in" rather than "verifier broken"
fn is_credential_failure(err: &jsonwebtoken::errors::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use common::generate_session_token;

    const SECRET: &[u8] = b"test_secret";
    const DOMAIN: &str = "example.com";

    fn resolver() -> JwtSessionResolver {
        JwtSessionResolver::new(SECRET.to_vec(), DOMAIN.to_string())
    }

    #[tokio::test]
    async fn test_no_cookie_resolves_to_none() {
        let result = resolver()
            .resolve(&RequestCredentials::anonymous())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_valid_token_resolves_to_principal() {
        let token = generate_session_token("Wallet1", DOMAIN, SECRET).unwrap();
        let creds = RequestCredentials::from_token(token);

        let principal = resolver().resolve(&creds).await.unwrap().unwrap();
        assert_eq!(principal.address, "Wallet1");
    }

    #[tokio::test]
    async fn test_garbage_token_resolves_to_none() {
        let creds = RequestCredentials::from_token("not-a-jwt".to_string());
        let result = resolver().resolve(&creds).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_wrong_domain_token_resolves_to_none() {
        let token = generate_session_token("Wallet1", "other.com", SECRET).unwrap();
        let creds = RequestCredentials::from_token(token);

        let result = resolver().resolve(&creds).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_wrong_secret_token_resolves_to_none() {
        let token = generate_session_token("Wallet1", DOMAIN, b"other_secret").unwrap();
        let creds = RequestCredentials::from_token(token);

        let result = resolver().resolve(&creds).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_credentials_read_the_session_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(AUTH_COOKIE_NAME, "abc"))
            .to_http_request();

        let creds = RequestCredentials::from_request(&req);
        assert_eq!(creds.session_token(), Some("abc"));

        let bare = TestRequest::default().to_http_request();
        assert!(RequestCredentials::from_request(&bare)
            .session_token()
            .is_none());
    }
}
