use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The category of a tracked position.
/// Determines which quote provider (if any) can price it live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Stocks / equities (RELIANCE, AAPL, etc.) — priced via Yahoo Finance
    Stocks,
    /// Cryptocurrencies (BTC, ETH, etc.) — priced via CoinCap
    Crypto,
    /// Real estate holdings — no live pricing
    #[serde(rename = "Real Estate")]
    RealEstate,
    /// Anything else (gold, collectibles, ...) — no live pricing
    Other,
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetCategory::Stocks => write!(f, "Stocks"),
            AssetCategory::Crypto => write!(f, "Crypto"),
            AssetCategory::RealEstate => write!(f, "Real Estate"),
            AssetCategory::Other => write!(f, "Other"),
        }
    }
}

impl AssetCategory {
    /// All categories, in display order.
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Stocks,
        AssetCategory::Crypto,
        AssetCategory::RealEstate,
        AssetCategory::Other,
    ];
}

/// One disposal event recorded against a position.
///
/// Sales are owned by their parent position: they carry a stable id for
/// edit/remove addressing, but that id is only meaningful through the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier, scoped within the parent position
    pub id: Uuid,

    /// Units disposed (always positive). The aggregate across a position's
    /// sales is NOT forced to stay within the purchased quantity — over-sold
    /// positions surface as a negative remaining quantity downstream.
    pub units_sold: f64,

    /// Price per unit at disposal (non-negative)
    pub sell_price: f64,

    /// Date of the sale (daily granularity)
    pub date: NaiveDate,
}

impl Sale {
    pub fn new(units_sold: f64, sell_price: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            units_sold,
            sell_price,
            date,
        }
    }
}

/// One purchase lot: the "investment" record of the tracker.
///
/// A position is created with zero sales; sale events are appended over time.
/// `quantity` is the originally purchased amount and is never adjusted when
/// sales occur — the remaining quantity is always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier, assigned at creation, immutable
    pub id: Uuid,

    /// The user who owns this position; set at creation, immutable.
    /// Positions are exclusively owned — no sharing or transfer.
    pub owner: Uuid,

    /// Asset category. Immutable after creation: the update-purchase
    /// operation does not accept a category change.
    pub category: AssetCategory,

    /// Free-form label / ticker (e.g., "RELIANCE", "bitcoin")
    pub asset_name: String,

    /// Total units originally purchased (positive)
    pub quantity: f64,

    /// Purchase price per unit (non-negative)
    pub buy_price: f64,

    /// Calendar date of the purchase
    pub purchase_date: NaiveDate,

    /// Disposal events against this lot, in insertion order.
    /// Deleted together with the position (owned child collection).
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl Position {
    pub fn new(
        owner: Uuid,
        category: AssetCategory,
        asset_name: impl Into<String>,
        quantity: f64,
        buy_price: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            category,
            asset_name: asset_name.into().trim().to_string(),
            quantity,
            buy_price,
            purchase_date,
            sales: Vec::new(),
        }
    }

    /// Find a sale by its id.
    pub fn sale(&self, sale_id: Uuid) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == sale_id)
    }

    /// The most recent sale by date. Among sales sharing the latest date,
    /// the last-appended one wins — matching the order-of-entry semantics
    /// consumers rely on for the last-sale price fallback.
    pub fn latest_sale(&self) -> Option<&Sale> {
        let mut latest: Option<&Sale> = None;
        for sale in &self.sales {
            match latest {
                Some(best) if sale.date < best.date => {}
                _ => latest = Some(sale),
            }
        }
        latest
    }
}
