//! Classifier backends
//!
//! The classifier is an opaque, already-trained function from a
//! [`NormalizedTensor`] to one score per class. Backends are shared across
//! requests behind an `Arc` and must only need `&self` to run.

use std::path::Path;

use tract_onnx::prelude::*;
use tracing::info;

use super::preprocess::NormalizedTensor;
use crate::error::{AgriError, Result};

/// A pre-trained image classifier.
pub trait Classifier: Send + Sync {
    /// Score every known class for one tensor.
    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>>;

    /// Length of the vector returned by [`Classifier::predict`].
    fn num_classes(&self) -> usize;
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX model executed with tract.
///
/// The plan is optimized once at load time and run from `&self`; tract
/// creates fresh per-call state, so concurrent calls need no lock.
pub struct OnnxClassifier {
    plan: OnnxPlan,
    input_shape: [usize; 4],
    num_classes: usize,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_shape", &self.input_shape)
            .field("num_classes", &self.num_classes)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load and optimize a model whose single input is `f32` of `input_shape`.
    pub fn load(path: impl AsRef<Path>, input_shape: [usize; 4]) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AgriError::Configuration(format!(
                "model artifact not found: {}",
                path.display()
            )));
        }

        let config_err =
            |e: TractError| AgriError::Configuration(format!("{}: {}", path.display(), e));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(config_err)?
            .with_input_fact(0, f32::fact(input_shape).into())
            .map_err(config_err)?
            .into_optimized()
            .map_err(config_err)?
            .into_runnable()
            .map_err(config_err)?;

        let output = plan.model().output_fact(0).map_err(config_err)?;
        let num_classes = output
            .shape
            .as_concrete()
            .and_then(|dims| dims.last().copied())
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                AgriError::Configuration(format!(
                    "{}: cannot determine class count from output shape {:?}",
                    path.display(),
                    output.shape
                ))
            })?;

        info!(
            model = %path.display(),
            input_shape = ?input_shape,
            num_classes,
            "Classifier loaded"
        );

        Ok(Self {
            plan,
            input_shape,
            num_classes,
        })
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>> {
        if tensor.shape() != &self.input_shape[..] {
            return Err(AgriError::Inference(format!(
                "tensor shape {:?} does not match model input {:?}",
                tensor.shape(),
                self.input_shape
            )));
        }

        let data = tensor
            .as_slice()
            .ok_or_else(|| AgriError::Inference("tensor is not contiguous".to_string()))?;
        let input = Tensor::from_shape(&self.input_shape, data)
            .map_err(|e| AgriError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| AgriError::Inference(e.to_string()))?;

        let scores = outputs
            .first()
            .ok_or_else(|| AgriError::Inference("model produced no output".to_string()))?
            .as_slice::<f32>()
            .map_err(|e| AgriError::Inference(e.to_string()))?
            .to_vec();

        Ok(scores)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}
