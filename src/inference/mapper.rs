//! Score vector to prediction mapping

use serde::Serialize;

use super::labels::ClassLabelTable;
use crate::error::{AgriError, Result};

/// Winning class of one classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub index: usize,
    /// Winning score clamped into `[0, 1]`.
    pub confidence: f32,
}

impl PredictionResult {
    /// Confidence as a percentage with two decimals, e.g. `87.00%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence as f64 * 100.0)
    }
}

/// Index of the highest score. Ties go to the lowest index.
pub fn argmax(scores: &[f32]) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(AgriError::Inference(format!(
                "non-finite score {score} at index {i}"
            )));
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
        .ok_or_else(|| AgriError::Inference("classifier returned no scores".to_string()))
}

/// Map a score vector onto the label table.
pub fn map_scores(scores: &[f32], labels: &ClassLabelTable) -> Result<PredictionResult> {
    if scores.len() != labels.len() {
        return Err(AgriError::Inference(format!(
            "classifier returned {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }

    let index = argmax(scores)?;
    let label = labels
        .get(index)
        .ok_or_else(|| AgriError::Inference(format!("no label for class {index}")))?;

    Ok(PredictionResult {
        label: label.to_string(),
        index,
        confidence: scores[index].clamp(0.0, 1.0),
    })
}
