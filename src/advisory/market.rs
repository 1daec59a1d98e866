//! Market price outlook (static demo table)

use serde::{Deserialize, Serialize};

use super::require_text;
use super::tables::MarketTable;
use crate::error::Result;

/// Rise applied to the 7-day projection when the trend is increasing.
pub const WEEKLY_RISE: u32 = 150;
/// Drop applied to the 7-day projection otherwise.
pub const WEEKLY_DROP: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    #[default]
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketRequest {
    pub crop: String,
    /// Market identifier; passed through unvalidated against any list.
    pub mandi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketResponse {
    pub crop: String,
    pub mandi: String,
    pub today_price: u32,
    pub price_after_7_days: u32,
    pub market_trend: Trend,
    pub best_sell_time: String,
}

pub fn market_outlook(req: &MarketRequest, table: &MarketTable) -> Result<MarketResponse> {
    require_text("crop", &req.crop)?;
    require_text("mandi", &req.mandi)?;

    let entry = table.entry_for(&req.crop);
    let (price_after_7_days, best_sell_time) = match entry.trend {
        Trend::Increasing => (entry.price.saturating_add(WEEKLY_RISE), "Next 3 days"),
        _ => (entry.price.saturating_sub(WEEKLY_DROP), "Wait 5–7 days"),
    };

    Ok(MarketResponse {
        crop: req.crop.clone(),
        mandi: req.mandi.clone(),
        today_price: entry.price,
        price_after_7_days,
        market_trend: entry.trend,
        best_sell_time: best_sell_time.to_string(),
    })
}
