pub mod migrate;
pub mod operations;

use std::time::{Duration, Instant};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::Config;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct DatabaseProxy {
    pool: PgPool,
}

impl DatabaseProxy {
    pub async fn connect(config: &Config) -> Result<Self, DbInitError> {
        let url = config.database_url.as_deref().ok_or(DbInitError::Missing {
            key: "DATABASE_URL",
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip latency of a trivial query, bounded by a short timeout.
    pub async fn ping(&self) -> Result<Duration, DbPingError> {
        let started = Instant::now();
        match tokio::time::timeout(PING_TIMEOUT, sqlx::query("SELECT 1").execute(&self.pool)).await
        {
            Ok(Ok(_)) => Ok(started.elapsed()),
            Ok(Err(err)) => Err(DbPingError::Sqlx(err)),
            Err(_) => Err(DbPingError::Timeout),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("missing required env var {key}")]
    Missing { key: &'static str },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] migrate::MigrationError),
}

#[derive(Debug, Error)]
pub enum DbPingError {
    #[error("database ping timed out")]
    Timeout,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
