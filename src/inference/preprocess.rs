//! Image decoding and tensor normalization
//!
//! Turns an uploaded leaf photo into the `[1, 224, 224, 3]` tensor the
//! classifier consumes:
//! - format sniffed from content, not from the declared MIME type
//! - decoder limits bound the decoded dimensions
//! - alpha dropped, grayscale replicated to RGB
//! - resized to the exact input size (aspect ratio not preserved)
//! - every channel divided by 255

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbImage};
use ndarray::Array4;
use tracing::debug;

use super::config::{InferenceConfig, INPUT_CHANNELS};
use crate::error::{AgriError, Result};

/// Raster formats accepted for classification.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// A single upload as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    /// Display only; never interpreted.
    pub filename: String,
    pub declared_mime: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            declared_mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Format detected from the leading bytes, if any.
    pub fn sniffed_format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }
}

/// Classifier input: `[batch=1, height, width, channels=3]`, values in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct NormalizedTensor {
    data: Array4<f32>,
}

impl NormalizedTensor {
    /// Wrap an existing array. Values are not rescaled.
    pub fn from_array(data: Array4<f32>) -> Result<Self> {
        let shape = data.shape();
        if shape[0] != 1 || shape[3] != INPUT_CHANNELS {
            return Err(AgriError::Inference(format!(
                "expected tensor of shape [1, H, W, {}], got {:?}",
                INPUT_CHANNELS, shape
            )));
        }
        Ok(Self { data })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn view(&self) -> ndarray::ArrayView4<'_, f32> {
        self.data.view()
    }

    /// Contiguous NHWC buffer.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}

/// Decodes and normalizes images according to an [`InferenceConfig`].
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: InferenceConfig,
}

impl ImagePreprocessor {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Decode raw bytes into an RGB bitmap.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(AgriError::InvalidImage("empty upload".to_string()));
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| AgriError::InvalidImage(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| AgriError::InvalidImage("unrecognized image format".to_string()))?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(AgriError::InvalidImage(format!(
                "unsupported image format: {}",
                format.to_mime_type()
            )));
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.config.max_image_dimension);
        limits.max_image_height = Some(self.config.max_image_dimension);
        reader.limits(limits);

        let image = reader.decode()?;
        debug!(
            format = format.to_mime_type(),
            width = image.width(),
            height = image.height(),
            "Decoded upload"
        );
        Ok(image)
    }

    /// Resize a decoded image and scale it into a tensor.
    pub fn normalize(&self, image: &DynamicImage) -> Result<NormalizedTensor> {
        let size = self.config.input_size;
        let rgb: RgbImage = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, size, size, self.config.filter.filter_type());

        let side = size as usize;
        let data = Array4::from_shape_fn((1, side, side, INPUT_CHANNELS), |(_, y, x, c)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });

        NormalizedTensor::from_array(data)
    }

    /// Decode then normalize.
    pub fn process(&self, bytes: &[u8]) -> Result<NormalizedTensor> {
        let image = self.decode(bytes)?;
        self.normalize(&image)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(InferenceConfig::default())
    }
}
