//! Crop recommendation

use serde::{Deserialize, Serialize};

use super::require_finite;
use super::tables::CropTable;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct CropRequest {
    pub soil_grade: String,
    pub season: String,
    /// Degrees Celsius; validated but not used by the rules.
    pub temperature: f64,
    pub rainfall: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropResponse {
    pub recommended_crops: Vec<String>,
    pub season: String,
    pub soil_grade: String,
}

/// Base crops for the grade plus seasonal and rainfall additions, without
/// duplicates. Order follows first appearance.
pub fn recommend_crops(req: &CropRequest, table: &CropTable) -> Result<CropResponse> {
    require_finite("temperature", req.temperature)?;

    let candidates = table
        .base_for(&req.soil_grade)
        .iter()
        .chain(table.season_additions(&req.season))
        .chain(table.rainfall_additions(&req.rainfall));

    let mut recommended_crops: Vec<String> = Vec::new();
    for crop in candidates {
        if !recommended_crops
            .iter()
            .any(|c| c.eq_ignore_ascii_case(crop))
        {
            recommended_crops.push(crop.clone());
        }
    }

    Ok(CropResponse {
        recommended_crops,
        season: req.season.clone(),
        soil_grade: req.soil_grade.clone(),
    })
}
