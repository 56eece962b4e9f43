// web-server/src/api/auth.rs
use std::str::FromStr;

use actix::Addr;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder, cookie::{Cookie, SameSite}};
use actix_web::cookie::time::Duration as CookieDuration;
use common::{generate_session_token, validate_session_token, Config};
use serde::Deserialize;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::access::{RequestCredentials, AUTH_COOKIE_NAME};
use crate::registry::{ConsumeNonce, IssueNonce, NonceRegistryActor};

// Cookie max age in seconds (24 hours), matching the session token lifetime
const COOKIE_MAX_AGE: i64 = 86400;

/// Login request carrying the signed challenge
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub address: String,
    pub signature: String,
    pub nonce: String,
}

/// Message a wallet signs to prove control of its address
pub fn login_message(domain: &str, address: &str, nonce: &str) -> String {
    format!(
        "{} wants you to sign in with your wallet:\n{}\n\nNonce: {}",
        domain, address, nonce
    )
}

// Issue a single-use nonce for the next login attempt
#[get("/nonce")]
pub async fn issue_nonce(registry: web::Data<Addr<NonceRegistryActor>>) -> impl Responder {
    match registry.send(IssueNonce).await {
        Ok(nonce) => HttpResponse::Ok().json(json!({
            "nonce": nonce
        })),
        Err(e) => {
            tracing::error!("Error issuing nonce: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }))
        }
    }
}

// Verify a signed login challenge and start a session
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    registry: web::Data<Addr<NonceRegistryActor>>,
    config: web::Data<Config>,
) -> impl Responder {
    // Nonces are single-use; a replayed login fails here
    match registry.send(ConsumeNonce { nonce: body.nonce.clone() }).await {
        Ok(true) => {},
        Ok(false) => {
            tracing::info!("Login attempt with unknown or expired nonce");
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid or expired nonce"
            }));
        },
        Err(e) => {
            tracing::error!("Error consuming nonce: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }
    }

    let pubkey = match Pubkey::from_str(&body.address) {
        Ok(pubkey) => pubkey,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid wallet address"
            }));
        }
    };

    let signature = match Signature::from_str(&body.signature) {
        Ok(signature) => signature,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid signature format"
            }));
        }
    };

    let message = login_message(&config.domain, &body.address, &body.nonce);
    if !signature.verify(pubkey.as_ref(), message.as_bytes()) {
        tracing::warn!("Signature verification failed for wallet {}", body.address);
        return HttpResponse::Unauthorized().json(json!({
            "error": "Signature verification failed"
        }));
    }

    let token = match generate_session_token(&body.address, &config.domain, config.jwt_secret.as_bytes()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Error generating session token: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }
    };

    // Create session cookie
    let cookie = Cookie::build(AUTH_COOKIE_NAME, token.clone())
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(COOKIE_MAX_AGE))
        .finish();

    tracing::info!("Started session for wallet {}", body.address);

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({
            "status": "success",
            "token": token
        }))
}

// End the current session by clearing the cookie
#[post("/logout")]
pub async fn logout(req: HttpRequest) -> impl Responder {
    if req.cookie(AUTH_COOKIE_NAME).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "error": "No session cookie found"
        }));
    }

    // Create empty cookie to clear the session
    let cookie = Cookie::build(AUTH_COOKIE_NAME, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish();

    tracing::info!("Session cookie cleared");

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({
            "status": "success",
            "message": "Logged out"
        }))
}

// Return the wallet behind the current session, if any
#[get("/user")]
pub async fn current_user(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    let creds = RequestCredentials::from_request(&req);
    let token = match creds.session_token() {
        Some(token) => token.to_string(),
        None => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Not logged in"
            }));
        }
    };

    match validate_session_token(&token, config.jwt_secret.as_bytes(), &config.domain) {
        Ok(address) => HttpResponse::Ok().json(json!({
            "address": address
        })),
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            HttpResponse::Unauthorized().json(json!({
                "error": "Invalid session"
            }))
        }
    }
}
