// web-server/src/main.rs
mod access;
mod api;
mod middleware;
mod pages;
mod registry;
mod static_files;
mod utils;

use std::str::FromStr;
use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use common::{setup_tracing, Config};
use solana_sdk::pubkey::Pubkey;

use access::{AccessGate, JwtSessionResolver, SplTokenOracle};
use middleware::rate_limiter::RateLimiter;
use registry::NonceRegistryActor;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // An unusable drop address should fail startup, not the first request
    Pubkey::from_str(&config.program_address)
        .expect("program_address is not a valid base58 public key");

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    tracing::info!("Starting gate server on {}", server_addr);
    tracing::info!("Gating on drop {}", config.program_address);

    // Initialize the nonce registry actor
    let registry = NonceRegistryActor::new().start();

    // Wire the gate with its two collaborators
    let resolver = Arc::new(JwtSessionResolver::new(
        config.jwt_secret.as_bytes().to_vec(),
        config.domain.clone(),
    ));
    let oracle = Arc::new(SplTokenOracle::new(config.rpc_url.clone()));
    let gate = AccessGate::new(resolver, oracle, config.program_address.clone());

    // One limiter shared across workers
    let rate_limiter = RateLimiter::new(vec!["/api/auth".to_string()]);

    // Create data references
    let config_data = web::Data::new(config);
    let registry_data = web::Data::new(registry);
    let gate_data = web::Data::new(gate);

    // Start HTTP server
    HttpServer::new(move || {
        let static_config = config_data.static_files.clone();
        App::new()
            .app_data(config_data.clone())
            .app_data(registry_data.clone())
            .app_data(gate_data.clone())
            .wrap(rate_limiter.clone())
            .service(pages::protected_page)
            .service(pages::login_page)
            .configure(api::configure)
            .configure(move |cfg| static_files::configure(cfg, static_config))
    })
    .bind(&server_addr)?
    .run()
    .await
}
