//! Image classification service
//!
//! Request path for leaf photos: decode and normalize, run the shared
//! classifier, map the winning score to a label. Work runs on the blocking
//! pool, bounded by a semaphore and a per-request deadline.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::classifier::Classifier;
use super::config::InferenceConfig;
use super::labels::ClassLabelTable;
use super::mapper::{map_scores, PredictionResult};
use super::preprocess::{ImagePreprocessor, UploadedImage};
use crate::error::{AgriError, Result};
use crate::monitoring::{FailureKind, MetricsSummary, PerformanceMetrics};

/// Classifies uploaded images against one immutable model and label table.
///
/// Cloning is cheap; clones share the model, labels, limiter and metrics.
#[derive(Clone)]
pub struct ImageClassificationService {
    config: InferenceConfig,
    preprocessor: ImagePreprocessor,
    classifier: Arc<dyn Classifier>,
    labels: Arc<ClassLabelTable>,
    limiter: Arc<Semaphore>,
    metrics: Arc<PerformanceMetrics>,
}

impl std::fmt::Debug for ImageClassificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClassificationService")
            .field("config", &self.config)
            .field("num_classes", &self.labels.len())
            .finish()
    }
}

impl ImageClassificationService {
    /// Build the service. Fails if the label table does not have exactly one
    /// entry per classifier output.
    pub fn new(
        config: InferenceConfig,
        classifier: Arc<dyn Classifier>,
        labels: ClassLabelTable,
    ) -> Result<Self> {
        labels.ensure_matches(classifier.num_classes())?;

        Ok(Self {
            preprocessor: ImagePreprocessor::new(config.clone()),
            limiter: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            metrics: Arc::new(PerformanceMetrics::default()),
            labels: Arc::new(labels),
            classifier,
            config,
        })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    /// Synchronous path: preprocess, predict, map.
    ///
    /// The classifier is only reached once decoding has succeeded.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<PredictionResult> {
        let tensor = self.preprocessor.process(bytes)?;
        let scores = self.classifier.predict(&tensor)?;
        map_scores(&scores, &self.labels)
    }

    /// Classify one upload on the blocking pool.
    ///
    /// The deadline covers waiting for a free slot as well as the work
    /// itself. A timed-out task keeps its slot until the model returns.
    pub async fn classify(&self, upload: UploadedImage) -> Result<PredictionResult> {
        let start = Instant::now();
        let filename = upload.filename.clone();

        let this = self.clone();
        let limiter = Arc::clone(&self.limiter);
        let work = async move {
            let permit = limiter
                .acquire_owned()
                .await
                .map_err(|_| AgriError::Inference("inference limiter closed".to_string()))?;

            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                this.classify_bytes(&upload.bytes)
            })
            .await
            .map_err(|join_err| AgriError::Inference(format!("inference task failed: {join_err}")))?
        };

        let outcome = match tokio::time::timeout(self.config.timeout(), work).await {
            Ok(result) => result,
            Err(_) => Err(AgriError::InferenceTimeout(self.config.timeout_secs)),
        };

        match &outcome {
            Ok(prediction) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.metrics.record_success(latency_ms);
                debug!(
                    filename = %filename,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    latency_ms,
                    "Classified upload"
                );
            }
            Err(err) => {
                let kind = match err {
                    AgriError::InvalidImage(_) => FailureKind::InvalidImage,
                    AgriError::InferenceTimeout(_) => FailureKind::Timeout,
                    _ => FailureKind::Inference,
                };
                self.metrics.record_failure(kind);
                warn!(filename = %filename, error = %err, "Classification failed");
            }
        }

        outcome
    }

    pub fn stats(&self) -> MetricsSummary {
        self.metrics.summary()
    }
}
