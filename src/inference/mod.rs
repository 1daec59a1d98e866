//! Leaf image classification
//!
//! - [`preprocess`]: decode uploads and build the `[1, 224, 224, 3]` tensor
//! - [`classifier`]: the opaque classifier trait and the ONNX backend
//! - [`labels`]: ordered class names, checked against the model at startup
//! - [`mapper`]: argmax (lowest index wins ties) and confidence formatting
//! - [`service`]: the concurrent request path tying these together

mod classifier;
mod config;
mod labels;
mod mapper;
mod preprocess;
mod service;

pub use classifier::{Classifier, OnnxClassifier};
pub use config::{InferenceConfig, ResizeFilter, INPUT_CHANNELS, INPUT_SIZE};
pub use labels::ClassLabelTable;
pub use mapper::{argmax, map_scores, PredictionResult};
pub use preprocess::{ImagePreprocessor, NormalizedTensor, UploadedImage, SUPPORTED_FORMATS};
pub use service::ImageClassificationService;
