//! NeoKrishi API Server Module
//!
//! HTTP surface for leaf disease classification and the rule-based
//! soil, fertilizer, crop and market advisory endpoints.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::{PestResponse, UPLOAD_FIELD};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::advisory::AdvisoryTables;
use crate::error::Result;
use crate::inference::{
    ClassLabelTable, ImageClassificationService, InferenceConfig, OnnxClassifier,
};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    /// JSON replacement for the built-in advisory tables.
    pub tables_path: Option<PathBuf>,
    pub max_upload_size: usize,
    pub inference: InferenceConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for ServerConfig {
    fn default() -> Self {
        let defaults = InferenceConfig::default();
        let inference = InferenceConfig {
            max_image_dimension: env_parse("MAX_IMAGE_DIMENSION")
                .unwrap_or(defaults.max_image_dimension),
            max_concurrent: env_parse("MAX_CONCURRENT_INFERENCES")
                .unwrap_or(defaults.max_concurrent)
                .max(1),
            timeout_secs: env_parse("INFERENCE_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            ..defaults
        };

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("API_PORT").unwrap_or(8000),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "./models/pest_classifier.onnx".to_string())
                .into(),
            labels_path: std::env::var("LABELS_PATH")
                .unwrap_or_else(|_| "./models/labels.txt".to_string())
                .into(),
            tables_path: std::env::var("ADVISORY_TABLES").ok().map(PathBuf::from),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE").unwrap_or(10 * 1024 * 1024), // 10MB
            inference,
        }
    }
}

impl ServerConfig {
    /// Load the model, labels and tables named by this configuration.
    ///
    /// Any mismatch between the label table and the model output is reported
    /// here, before a socket is bound.
    pub fn load_state(&self) -> Result<AppState> {
        let classifier =
            OnnxClassifier::load(&self.model_path, self.inference.input_shape())?;
        let labels = ClassLabelTable::from_file(&self.labels_path)?;
        let service =
            ImageClassificationService::new(self.inference.clone(), Arc::new(classifier), labels)?;

        let tables = match &self.tables_path {
            Some(path) => {
                info!(tables = %path.display(), "Loading advisory tables");
                AdvisoryTables::from_file(path)?
            }
            None => AdvisoryTables::default(),
        };

        Ok(AppState::new(self.clone(), service, tables))
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model = %config.model_path.display(),
        labels = %config.labels_path.display(),
        resize_filter = ?config.inference.filter,
        max_concurrent_inferences = config.inference.max_concurrent,
        inference_timeout_secs = config.inference.timeout_secs,
        "Loading classifier"
    );

    let state = Arc::new(config.load_state()?);
    info!(
        classes = state.classifier.labels().len(),
        "Classifier ready"
    );

    let app = create_router(Arc::clone(&state), &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %start_time.to_rfc3339(),
        "NeoKrishi API starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgriError;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.max_upload_size > 0);
        assert_eq!(config.inference.input_shape(), [1, 224, 224, 3]);
        assert!(config.inference.max_concurrent >= 1);
    }

    #[test]
    fn test_missing_model_fails_before_serving() {
        let config = ServerConfig {
            model_path: "/nonexistent/model.onnx".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.load_state(),
            Err(AgriError::Configuration(_))
        ));
    }
}
