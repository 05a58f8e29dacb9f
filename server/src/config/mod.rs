use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "sqlite://ticket-wallet.db";
const DEFAULT_VALIDATION_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Upper bound on a single validation endpoint request.
    pub validation_timeout: Duration,
    pub allowed_origins: String,
    /// Production deployments sit behind HTTPS and get HSTS.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            validation_timeout: Duration::from_secs(DEFAULT_VALIDATION_TIMEOUT_SECS),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unparsable values fall
    /// back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("WALLET_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("WALLET_BIND_ADDR")
            .and_then(|raw| match raw.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!("Config: Invalid WALLET_BIND_ADDR '{}': {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(|| Config::default().bind_addr);

        let validation_timeout = lookup("WALLET_VALIDATION_TIMEOUT_SECS")
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    tracing::warn!(
                        "Config: Invalid WALLET_VALIDATION_TIMEOUT_SECS '{}', using {}s",
                        raw,
                        DEFAULT_VALIDATION_TIMEOUT_SECS
                    );
                    None
                }
            })
            .unwrap_or(Duration::from_secs(DEFAULT_VALIDATION_TIMEOUT_SECS));

        let allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());

        let production = lookup("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        Self {
            database_url,
            bind_addr,
            validation_timeout,
            allowed_origins,
            production,
        }
    }
}
