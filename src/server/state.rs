//! Application state management

use crate::advisory::AdvisoryTables;
use crate::inference::ImageClassificationService;

use super::ServerConfig;

/// Read-only state shared across handlers.
///
/// Everything here is built once before the router starts serving and never
/// mutated afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub classifier: ImageClassificationService,
    pub tables: AdvisoryTables,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        classifier: ImageClassificationService,
        tables: AdvisoryTables,
    ) -> Self {
        Self {
            config,
            classifier,
            tables,
            started_at: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
