//! Fertilizer recommendation

use serde::{Deserialize, Serialize};

use super::{nutrient_recommendations, require_non_negative, require_text};
use crate::error::Result;

pub const SUFFICIENT_ADVICE: &str =
    "Nutrient levels are sufficient: no additional fertilizer is needed";
pub const ORGANIC_OPTION: &str =
    "Apply well-decomposed farmyard manure or vermicompost at 5 to 10 tonnes per hectare";
pub const SAFETY_NOTE: &str =
    "Wear gloves and a mask when handling fertilizers and never exceed the labelled dose";

#[derive(Debug, Clone, Deserialize)]
pub struct FertilizerRequest {
    pub crop: String,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    /// Accepted for context; the rules depend on N/P/K only.
    pub soil_grade: String,
}

impl FertilizerRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("crop", &self.crop)?;
        require_non_negative("nitrogen", self.nitrogen)?;
        require_non_negative("phosphorus", self.phosphorus)?;
        require_non_negative("potassium", self.potassium)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerResponse {
    pub crop: String,
    pub recommendations: Vec<String>,
    pub organic_option: String,
    pub safety_note: String,
}

/// N/P/K advice; exactly one "sufficient" entry when nothing is low.
pub fn recommend_fertilizer(req: &FertilizerRequest) -> Result<FertilizerResponse> {
    req.validate()?;

    let mut recommendations = nutrient_recommendations(req.nitrogen, req.phosphorus, req.potassium);
    if recommendations.is_empty() {
        recommendations.push(SUFFICIENT_ADVICE.to_string());
    }

    Ok(FertilizerResponse {
        crop: req.crop.clone(),
        recommendations,
        organic_option: ORGANIC_OPTION.to_string(),
        safety_note: SAFETY_NOTE.to_string(),
    })
}
