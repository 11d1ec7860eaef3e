use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use streamdex_core::CatalogServices;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<CatalogServices>,
    pub config: Arc<Config>,
    /// Cache writes that failed since startup.
    pub write_failures: Arc<AtomicU64>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Must be called from within a Tokio runtime: it subscribes to the
    /// cache write failure channel.
    pub fn new(config: Config, services: CatalogServices) -> Self {
        let write_failures = Arc::new(AtomicU64::new(0));

        let mut failures = services.failures.subscribe();
        let counter = Arc::clone(&write_failures);
        tokio::spawn(async move {
            loop {
                match failures.recv().await {
                    Ok(failure) => {
                        debug!(tier = %failure.tier, key = %failure.key, "counted cache write failure");
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        counter.fetch_add(missed, Ordering::Relaxed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            services: Arc::new(services),
            config: Arc::new(config),
            write_failures,
        }
    }

    pub fn write_failure_count(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }
}
