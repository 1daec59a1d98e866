//! Soil quality scoring

use serde::{Deserialize, Serialize};

use super::{nutrient_recommendations, require_non_negative, require_range};
use crate::error::Result;

pub const LIME_ADVICE: &str = "Soil is acidic: apply agricultural lime to raise pH";
pub const COMPOST_ADVICE: &str = "Soil is alkaline: add compost or organic matter to lower pH";
pub const IRRIGATION_ADVICE: &str = "Moisture is low: schedule irrigation";

#[derive(Debug, Clone, Deserialize)]
pub struct SoilRequest {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    /// Percent volumetric moisture.
    pub moisture: f64,
}

impl SoilRequest {
    pub fn validate(&self) -> Result<()> {
        require_range("ph", self.ph, 0.0, 14.0)?;
        require_non_negative("nitrogen", self.nitrogen)?;
        require_non_negative("phosphorus", self.phosphorus)?;
        require_non_negative("potassium", self.potassium)?;
        require_range("moisture", self.moisture, 0.0, 100.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilGrade {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl SoilGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            SoilGrade::Excellent => "Excellent",
            SoilGrade::Good => "Good",
            SoilGrade::Moderate => "Moderate",
            SoilGrade::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for SoilGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilResponse {
    pub score: f64,
    pub grade: SoilGrade,
    pub recommendations: Vec<String>,
}

/// `((7 - |ph - 7|) * 10 + N + P + K + moisture) / 5`, rounded to 2 decimals.
pub fn soil_score(req: &SoilRequest) -> f64 {
    let ph_component = (7.0 - (req.ph - 7.0).abs()) * 10.0;
    let raw = (ph_component + req.nitrogen + req.phosphorus + req.potassium + req.moisture) / 5.0;
    round2(raw)
}

/// Lower bounds are inclusive: 80 is Excellent, 60 Good, 40 Moderate.
pub fn grade_for(score: f64) -> SoilGrade {
    if score >= 80.0 {
        SoilGrade::Excellent
    } else if score >= 60.0 {
        SoilGrade::Good
    } else if score >= 40.0 {
        SoilGrade::Moderate
    } else {
        SoilGrade::Poor
    }
}

/// Score, grade (of the rounded score) and corrective actions.
pub fn assess_soil(req: &SoilRequest) -> Result<SoilResponse> {
    req.validate()?;

    let score = soil_score(req);
    let mut recommendations = Vec::new();
    if req.ph < 6.0 {
        recommendations.push(LIME_ADVICE.to_string());
    }
    if req.ph > 8.0 {
        recommendations.push(COMPOST_ADVICE.to_string());
    }
    recommendations.extend(nutrient_recommendations(
        req.nitrogen,
        req.phosphorus,
        req.potassium,
    ));
    if req.moisture < 30.0 {
        recommendations.push(IRRIGATION_ADVICE.to_string());
    }

    Ok(SoilResponse {
        score,
        grade: grade_for(score),
        recommendations,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
