//! Lookup tables for crop and market advice
//!
//! Keys are matched case-insensitively; tables are normalized to lowercase
//! keys when built or loaded.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::market::Trend;
use crate::error::{AgriError, Result};

/// Crops by soil grade, plus additions keyed by season and rainfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropTable {
    pub by_grade: HashMap<String, Vec<String>>,
    /// Used when the grade is not in `by_grade`.
    pub fallback: Vec<String>,
    #[serde(default)]
    pub by_season: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub by_rainfall: HashMap<String, Vec<String>>,
}

impl CropTable {
    pub fn base_for(&self, grade: &str) -> &[String] {
        self.by_grade
            .get(&normalize_key(grade))
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }

    pub fn season_additions(&self, season: &str) -> &[String] {
        lookup(&self.by_season, season)
    }

    pub fn rainfall_additions(&self, rainfall: &str) -> &[String] {
        lookup(&self.by_rainfall, rainfall)
    }

    fn normalized(self) -> Self {
        Self {
            by_grade: normalize_keys(self.by_grade),
            fallback: self.fallback,
            by_season: normalize_keys(self.by_season),
            by_rainfall: normalize_keys(self.by_rainfall),
        }
    }
}

impl Default for CropTable {
    fn default() -> Self {
        let by_grade = HashMap::from([
            ("excellent".to_string(), crops(&["Wheat", "Rice", "Sugarcane"])),
            ("good".to_string(), crops(&["Maize", "Cotton"])),
            ("moderate".to_string(), crops(&["Millets", "Pulses"])),
        ]);
        Self {
            by_grade,
            fallback: crops(&["Barley", "Mustard"]),
            by_season: HashMap::from([("summer".to_string(), crops(&["Groundnut", "Watermelon"]))]),
            by_rainfall: HashMap::from([("high".to_string(), crops(&["Paddy"]))]),
        }
    }
}

/// Base price and trend of one crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub price: u32,
    pub trend: Trend,
}

/// Static price/trend table for the market demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTable {
    pub prices: HashMap<String, MarketEntry>,
    #[serde(default = "default_price")]
    pub default_price: u32,
    #[serde(default)]
    pub default_trend: Trend,
}

fn default_price() -> u32 {
    3000
}

impl MarketTable {
    /// Entry for a crop, or the default price and trend for unknown crops.
    pub fn entry_for(&self, crop: &str) -> MarketEntry {
        self.prices
            .get(&normalize_key(crop))
            .copied()
            .unwrap_or(MarketEntry {
                price: self.default_price,
                trend: self.default_trend,
            })
    }

    fn normalized(self) -> Self {
        Self {
            prices: normalize_keys(self.prices),
            ..self
        }
    }
}

impl Default for MarketTable {
    fn default() -> Self {
        let entries = [
            ("wheat", 2275, Trend::Increasing),
            ("rice", 2183, Trend::Stable),
            ("maize", 2090, Trend::Increasing),
            ("cotton", 6620, Trend::Decreasing),
            ("onion", 1800, Trend::Increasing),
            ("tomato", 1500, Trend::Decreasing),
            ("potato", 1200, Trend::Stable),
            ("soybean", 4600, Trend::Increasing),
            ("mustard", 5650, Trend::Increasing),
            ("groundnut", 6377, Trend::Stable),
        ];
        Self {
            prices: entries
                .into_iter()
                .map(|(crop, price, trend)| (crop.to_string(), MarketEntry { price, trend }))
                .collect(),
            default_price: default_price(),
            default_trend: Trend::Stable,
        }
    }
}

/// All lookup data used by the advisory endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryTables {
    pub crops: CropTable,
    pub market: MarketTable,
}

impl AdvisoryTables {
    /// Parse tables from JSON. Sections left out keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let tables: AdvisoryTables = serde_json::from_str(text)
            .map_err(|e| AgriError::Configuration(format!("invalid advisory tables: {e}")))?;
        tables.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AgriError::Configuration(format!("cannot read tables {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    fn validated(self) -> Result<Self> {
        if self.crops.fallback.is_empty() {
            return Err(AgriError::Configuration(
                "crop table fallback must list at least one crop".to_string(),
            ));
        }
        Ok(Self {
            crops: self.crops.normalized(),
            market: self.market.normalized(),
        })
    }
}

fn crops(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn normalize_keys<V>(map: HashMap<String, V>) -> HashMap<String, V> {
    map.into_iter().map(|(k, v)| (normalize_key(&k), v)).collect()
}

fn lookup<'a>(map: &'a HashMap<String, Vec<String>>, key: &str) -> &'a [String] {
    map.get(&normalize_key(key)).map(Vec::as_slice).unwrap_or(&[])
}
