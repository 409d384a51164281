use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::catalog::{CourseCatalog, MemoryCourseCatalog, PgCourseCatalog};
use crate::config::Config;
use crate::db::DatabaseProxy;
use crate::services::progress::ProgressService;
use crate::store::{MemoryProgressStore, PgProgressStore, ProgressStore};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    db_proxy: Option<DatabaseProxy>,
    store: Arc<dyn ProgressStore>,
    catalog: Arc<dyn CourseCatalog>,
}

impl AppState {
    pub fn new(
        config: Config,
        db_proxy: Option<DatabaseProxy>,
        store: Arc<dyn ProgressStore>,
        catalog: Arc<dyn CourseCatalog>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            db_proxy,
            store,
            catalog,
        }
    }

    /// Postgres-backed store and catalog sharing one pool.
    pub fn with_database(config: Config, proxy: DatabaseProxy) -> Self {
        let store = Arc::new(PgProgressStore::new(proxy.clone()));
        let catalog = Arc::new(PgCourseCatalog::new(proxy.clone()));
        Self::new(config, Some(proxy), store, catalog)
    }

    pub fn in_memory(config: Config, catalog: Arc<MemoryCourseCatalog>) -> Self {
        Self::new(config, None, Arc::new(MemoryProgressStore::new()), catalog)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db_proxy(&self) -> Option<&DatabaseProxy> {
        self.db_proxy.as_ref()
    }

    pub fn store(&self) -> Arc<dyn ProgressStore> {
        Arc::clone(&self.store)
    }

    pub fn catalog(&self) -> Arc<dyn CourseCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn progress_service(&self) -> ProgressService {
        ProgressService::new(
            self.store(),
            self.config.save_attempts,
            self.config.store_timeout,
        )
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
