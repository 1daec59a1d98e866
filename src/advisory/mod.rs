//! Rule-based advisory
//!
//! Pure, deterministic functions over request fields:
//! - [`soil`]: soil quality score, grade and corrective actions
//! - [`fertilizer`]: nutrient-driven fertilizer advice
//! - [`crop`]: crops suited to soil grade, season and rainfall
//! - [`market`]: demo price projection from a static table
//!
//! Lookup data lives in [`AdvisoryTables`] and is passed in explicitly.

pub mod crop;
pub mod fertilizer;
pub mod market;
pub mod soil;
mod tables;

pub use crop::{recommend_crops, CropRequest, CropResponse};
pub use fertilizer::{recommend_fertilizer, FertilizerRequest, FertilizerResponse};
pub use market::{market_outlook, MarketRequest, MarketResponse, Trend};
pub use soil::{assess_soil, grade_for, soil_score, SoilGrade, SoilRequest, SoilResponse};
pub use tables::{AdvisoryTables, CropTable, MarketEntry, MarketTable};

use crate::error::{AgriError, Result};

/// Nitrogen below this triggers urea.
pub const NITROGEN_MIN: f64 = 50.0;
/// Phosphorus below this triggers SSP.
pub const PHOSPHORUS_MIN: f64 = 40.0;
/// Potassium below this triggers potash.
pub const POTASSIUM_MIN: f64 = 40.0;

pub const UREA_ADVICE: &str = "Nitrogen is low: apply urea";
pub const SSP_ADVICE: &str = "Phosphorus is low: apply single super phosphate (SSP)";
pub const POTASH_ADVICE: &str = "Potassium is low: apply muriate of potash";

/// N/P/K advice shared by the soil and fertilizer endpoints, in N, P, K order.
pub fn nutrient_recommendations(nitrogen: f64, phosphorus: f64, potassium: f64) -> Vec<String> {
    let mut advice = Vec::new();
    if nitrogen < NITROGEN_MIN {
        advice.push(UREA_ADVICE.to_string());
    }
    if phosphorus < PHOSPHORUS_MIN {
        advice.push(SSP_ADVICE.to_string());
    }
    if potassium < POTASSIUM_MIN {
        advice.push(POTASH_ADVICE.to_string());
    }
    advice
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AgriError::invalid_field(field, "must be a finite number"))
    }
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(AgriError::invalid_field(field, format!("must not be negative, got {value}")));
    }
    Ok(())
}

pub(crate) fn require_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < min || value > max {
        return Err(AgriError::invalid_field(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AgriError::invalid_field(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_thresholds_are_strict() {
        assert!(nutrient_recommendations(50.0, 40.0, 40.0).is_empty());
        assert_eq!(
            nutrient_recommendations(49.9, 39.9, 39.9),
            vec![UREA_ADVICE, SSP_ADVICE, POTASH_ADVICE]
        );
    }

    #[test]
    fn test_field_checks() {
        assert!(require_range("ph", 14.0, 0.0, 14.0).is_ok());
        assert!(require_range("ph", 14.1, 0.0, 14.0).is_err());
        assert!(require_non_negative("nitrogen", -0.1).is_err());
        assert!(require_finite("moisture", f64::NAN).is_err());
        assert!(require_text("crop", "  ").is_err());
    }
}
