// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

/// Central configuration for the gate server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,
    /// Domain the login challenge and session tokens are bound to
    pub domain: String,
    /// HMAC secret for signing session tokens
    pub jwt_secret: String,
    /// JSON-RPC endpoint the ownership oracle queries
    pub rpc_url: String,
    /// Mint address of the gating drop
    pub program_address: String,

    // Static file serving configuration
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    pub path: String,
    pub index: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            domain: "example.com".to_string(),
            jwt_secret: "dev_secret".to_string(),
            rpc_url: "https://api.devnet.solana.com".to_string(),
            program_address: "So11111111111111111111111111111111111111112".to_string(),

            static_files: StaticFilesConfig {
                path: "./static".to_string(),
                index: "login.html".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        // Build configuration
        let config = ConfigFile::builder()
            // Start with defaults
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add environment specific config
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Add a local config file for local overrides
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables with prefix "APP"
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Build and deserialize
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (backward compatibility)
    pub fn from_env() -> Self {
        // Try to load from file first
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let defaults = Config::default();

                let web_server_addr = env::var("WEB_SERVER_ADDR")
                    .unwrap_or(defaults.web_server_addr);

                let domain = env::var("AUTH_DOMAIN")
                    .unwrap_or(defaults.domain);

                let jwt_secret = env::var("JWT_SECRET")
                    .unwrap_or(defaults.jwt_secret);

                let rpc_url = env::var("RPC_URL")
                    .unwrap_or(defaults.rpc_url);

                let program_address = env::var("PROGRAM_ADDRESS")
                    .unwrap_or(defaults.program_address);

                let static_files_path = env::var("STATIC_FILES_PATH")
                    .unwrap_or(defaults.static_files.path);

                let static_files_index = env::var("STATIC_FILES_INDEX")
                    .unwrap_or(defaults.static_files.index);

                Self {
                    web_server_addr,
                    domain,
                    jwt_secret,
                    rpc_url,
                    program_address,
                    static_files: StaticFilesConfig {
                        path: static_files_path,
                        index: static_files_index,
                    },
                }
            }
        }
    }
}
