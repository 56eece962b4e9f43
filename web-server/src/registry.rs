// web-server/src/registry.rs
use actix::{Actor, AsyncContext, Context, Handler, Message, MessageResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use crate::utils::token::generate_nonce;

// Default nonce TTL in seconds (5 minutes)
const DEFAULT_NONCE_TTL: i64 = 300;

/// Actor message: issue a new single-use login nonce
#[derive(Message)]
#[rtype(result = "String")]
pub struct IssueNonce;

/// Actor message: consume a nonce, succeeding at most once per nonce
#[derive(Message)]
#[rtype(result = "bool")]
pub struct ConsumeNonce {
    pub nonce: String,
}

/// Actor message: drop nonces past their TTL
#[derive(Message)]
#[rtype(result = "usize")]
pub struct CleanupExpiredNonces;

/// NonceRegistryActor hands out login challenges and enforces single use
pub struct NonceRegistryActor {
    // Map from nonce value to issue time
    nonces: Arc<DashMap<String, DateTime<Utc>>>,
    // Nonce TTL in seconds
    nonce_ttl: i64,
    // Cleanup interval in seconds
    cleanup_interval: u64,
    // Counters for lifetime logging
    issued_count: u64,
    consumed_count: u64,
}

impl Default for NonceRegistryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceRegistryActor {
    pub fn new() -> Self {
        Self {
            nonces: Arc::new(DashMap::new()),
            nonce_ttl: DEFAULT_NONCE_TTL,
            cleanup_interval: 60,
            issued_count: 0,
            consumed_count: 0,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.nonce_ttl = ttl_seconds;
        self
    }

    pub fn with_cleanup_interval(mut self, interval_seconds: u64) -> Self {
        self.cleanup_interval = interval_seconds;
        self
    }

    fn is_fresh(&self, issued_at: &DateTime<Utc>) -> bool {
        let age = Utc::now().signed_duration_since(*issued_at);
        age.num_seconds() <= self.nonce_ttl
    }

    /// Remove expired nonces
    fn cleanup_nonces(&mut self) -> usize {
        let now = Utc::now();

        let expired: Vec<String> = self
            .nonces
            .iter()
            .filter_map(|entry| {
                let age = now.signed_duration_since(*entry.value());
                if age.num_seconds() > self.nonce_ttl {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect();

        let expired_count = expired.len();
        for nonce in expired {
            self.nonces.remove(&nonce);
        }

        expired_count
    }
}

impl Actor for NonceRegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("NonceRegistryActor started with TTL: {}s", self.nonce_ttl);

        // Schedule periodic nonce cleanup
        ctx.run_interval(Duration::from_secs(self.cleanup_interval), |act, _ctx| {
            let expired_count = act.cleanup_nonces();
            if expired_count > 0 {
                tracing::info!("Cleaned up {} expired nonces", expired_count);
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            "NonceRegistryActor stopped. {} nonces issued, {} consumed",
            self.issued_count,
            self.consumed_count
        );
    }
}

// Handle issuance of a new login nonce
impl Handler<IssueNonce> for NonceRegistryActor {
    type Result = MessageResult<IssueNonce>;

    fn handle(&mut self, _msg: IssueNonce, _ctx: &mut Self::Context) -> Self::Result {
        let nonce = generate_nonce();

        self.nonces.insert(nonce.clone(), Utc::now());
        self.issued_count += 1;

        tracing::debug!("Issued login nonce");

        MessageResult(nonce)
    }
}

// Handle consumption of a nonce. Removal is the consumption, so a nonce
// can only ever succeed once; stale nonces are removed but fail.
impl Handler<ConsumeNonce> for NonceRegistryActor {
    type Result = MessageResult<ConsumeNonce>;

    fn handle(&mut self, msg: ConsumeNonce, _ctx: &mut Self::Context) -> Self::Result {
        let result = match self.nonces.remove(&msg.nonce) {
            Some((_, issued_at)) => {
                if self.is_fresh(&issued_at) {
                    self.consumed_count += 1;
                    true
                } else {
                    tracing::debug!("Rejected expired nonce");
                    false
                }
            }
            None => {
                tracing::debug!("Rejected unknown nonce");
                false
            }
        };

        MessageResult(result)
    }
}

// Handle nonce cleanup
impl Handler<CleanupExpiredNonces> for NonceRegistryActor {
    type Result = MessageResult<CleanupExpiredNonces>;

    fn handle(&mut self, _msg: CleanupExpiredNonces, _ctx: &mut Self::Context) -> Self::Result {
        let expired_count = self.cleanup_nonces();
        tracing::info!("Cleaned up {} expired nonces", expired_count);
        MessageResult(expired_count)
    }
}
