//! NeoKrishi - agricultural advisory service
//!
//! HTTP endpoints that give farm advice:
//! - leaf photo → pest/disease label and confidence, via a pre-trained
//!   classifier loaded once at startup
//! - soil quality score and grade
//! - fertilizer, crop and market recommendations from fixed rules and tables
//!
//! # Modules
//!
//! - [`inference`] - Image preprocessing, classifier invocation, result mapping
//! - [`advisory`] - Rule-based soil, fertilizer, crop and market advice
//! - [`monitoring`] - Classification latency and outcome metrics
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Domain modules
pub mod inference;
pub mod advisory;

// Infrastructure
pub mod monitoring;

// Services
pub mod server;
pub mod cli;

pub use error::{AgriError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{AgriError, Result};

    pub use crate::inference::{
        Classifier, ClassLabelTable, ImageClassificationService, InferenceConfig,
        NormalizedTensor, OnnxClassifier, PredictionResult, UploadedImage,
    };

    pub use crate::advisory::{
        assess_soil, market_outlook, recommend_crops, recommend_fertilizer, AdvisoryTables,
        SoilGrade, Trend,
    };

    pub use crate::server::{create_router, AppState, ServerConfig};
}
