use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::api::ImportServices;

/// Фоновый воркер, удаляющий устаревшие сессии импорта.
pub struct SessionCleanupWorker {
    services: ImportServices,
    interval_seconds: u64,
}

impl SessionCleanupWorker {
    pub fn new(services: ImportServices, interval_seconds: u64) -> Self {
        Self {
            services,
            interval_seconds,
        }
    }

    /// Запускает цикл очистки.
    pub async fn run_loop(&self) {
        info!(
            "Session cleanup worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    pub async fn run_once(&self) -> usize {
        let removed = self.services.cleanup().await;
        if removed > 0 {
            info!("Removed {} stale import sessions", removed);
        }
        removed
    }
}
