//! Inference configuration

use image::imageops::FilterType;
use serde::Serialize;
use std::time::Duration;

/// Side length of the square tensor the classifier expects.
pub const INPUT_SIZE: u32 = 224;

/// Number of colour channels in the tensor.
pub const INPUT_CHANNELS: usize = 3;

/// Resampling algorithm used when resizing to the model input size.
///
/// The choice changes classifier output, so it is fixed per deployment and
/// logged at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    /// Triangle filter (bilinear interpolation).
    #[default]
    Bilinear,
}

impl ResizeFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Configuration for image preprocessing and classifier invocation
#[derive(Debug, Clone, Serialize)]
pub struct InferenceConfig {
    /// Target width and height of the tensor
    pub input_size: u32,

    /// Resampling filter
    pub filter: ResizeFilter,

    /// Largest accepted width or height of a decoded image
    pub max_image_dimension: u32,

    /// Maximum number of inferences running at once
    pub max_concurrent: usize,

    /// Per-request inference deadline
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_size: INPUT_SIZE,
            filter: ResizeFilter::default(),
            max_image_dimension: 8192,
            max_concurrent: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            timeout_secs: 30,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the resampling filter
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder method to cap decoded image dimensions
    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_image_dimension = max;
        self
    }

    /// Builder method to bound concurrent inferences
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Builder method to set the inference deadline
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Shape of the tensor handed to the classifier: `[batch, height, width, channels]`.
    pub fn input_shape(&self) -> [usize; 4] {
        [1, self.input_size as usize, self.input_size as usize, INPUT_CHANNELS]
    }
}
