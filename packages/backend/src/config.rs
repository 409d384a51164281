use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// HS256 bearer token issued by the identity provider
    Jwt,
    /// Identity already resolved by an upstream gateway (`x-user-id`)
    TrustedHeader,
}

impl AuthMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jwt" => Some(Self::Jwt),
            "trusted-header" | "trusted_header" | "header" => Some(Self::TrustedHeader),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub auth_mode: AuthMode,
    pub jwt_secret: Option<String>,
    pub save_attempts: u32,
    pub store_timeout: Duration,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(5000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let database_url = env_non_empty("DATABASE_URL");

        let auth_mode = std::env::var("AUTH_MODE")
            .ok()
            .as_deref()
            .and_then(AuthMode::parse)
            .unwrap_or(AuthMode::Jwt);

        Self {
            host,
            port,
            log_level,
            database_url,
            db_max_connections: env_u32("DB_MAX_CONNECTIONS", 10),
            auth_mode,
            jwt_secret: env_non_empty("JWT_SECRET"),
            save_attempts: env_u32("PROGRESS_SAVE_ATTEMPTS", 5).max(1),
            store_timeout: Duration::from_millis(env_u64("STORE_TIMEOUT_MS", 10_000)),
            cors_allow_origin: env_non_empty("CORS_ALLOW_ORIGIN"),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            log_level: "info".to_string(),
            database_url: None,
            db_max_connections: 10,
            auth_mode: AuthMode::TrustedHeader,
            jwt_secret: None,
            save_attempts: 5,
            store_timeout: Duration::from_secs(10),
            cors_allow_origin: None,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
