use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::position::AssetCategory;

/// Which slice of the portfolio a summary covers, and therefore how its
/// allocation map is keyed.
///
/// - `Overall`: every position, allocation grouped by category name.
/// - `Category(c)`: only positions in `c`, allocation grouped by asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationView {
    Overall,
    Category(AssetCategory),
}

/// Portfolio-level totals plus the allocation breakdown used for
/// proportion/pie rendering.
///
/// The core computes, the frontend renders — this struct is the wire shape
/// of the summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of invested amounts (quantity × buy price) over all covered
    /// positions. Reflects capital deployed historically: it does not
    /// shrink as units are sold.
    pub total_invested: f64,

    /// Sum of net (realized + unrealized) profit/loss over all covered
    /// positions, each valued with its looked-up current price.
    pub total_profit_loss: f64,

    /// Number of covered positions
    pub position_count: usize,

    /// Invested amount grouped by the view's key: category name for the
    /// overall view, asset name within a single category.
    pub allocation: HashMap<String, f64>,
}

impl PortfolioSummary {
    /// The all-zero summary of an empty position set.
    pub fn empty() -> Self {
        Self {
            total_invested: 0.0,
            total_profit_loss: 0.0,
            position_count: 0,
            allocation: HashMap::new(),
        }
    }
}

/// Every computed figure for one position, ready for a table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub position_id: Uuid,
    pub asset_name: String,
    pub category: AssetCategory,

    /// Units not yet sold. Negative when sales were over-recorded —
    /// propagated as-is, never clamped.
    pub remaining_quantity: f64,

    /// Original cost basis of the full lot (quantity × buy price)
    pub invested_amount: f64,

    /// Profit locked in by completed sales
    pub realized_profit_loss: f64,

    /// Hypothetical profit on the remaining units at the effective
    /// current price (zero when the position could not be priced)
    pub unrealized_profit_loss: f64,

    /// realized + unrealized
    pub net_profit_loss: f64,

    /// The live price the report was valued with, if one was supplied
    pub current_price: Option<f64>,
}

/// One point of the cumulative realized P&L series: a single sale's
/// contribution and the running total up to and including it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Date of the sale this point corresponds to
    pub date: NaiveDate,

    /// This sale's realized profit: units_sold × (sell_price − buy_price)
    pub profit_loss: f64,

    /// Running total of realized profit across all prior sales plus this one
    pub cumulative: f64,
}
