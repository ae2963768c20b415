use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::position::Position;

/// The caller-supplied capability for pricing positions.
///
/// Backed by a live quote service, cached data, or absent entirely — the
/// aggregator only sees "a position maybe has a current price". A `None`
/// degrades that position's unrealized figures rather than failing.
pub trait PriceLookup {
    fn current_price(&self, position: &Position) -> Option<f64>;
}

/// A snapshot of live quotes keyed by uppercased asset name.
///
/// Built by `QuoteService` from whatever the providers could deliver;
/// positions missing from the book are simply not priced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBook {
    quotes: HashMap<String, f64>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the quote for a symbol.
    pub fn insert(&mut self, symbol: &str, price: f64) {
        self.quotes.insert(symbol.to_uppercase(), price);
    }

    /// Get the quote for a symbol, if present.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.quotes.get(&symbol.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl PriceLookup for QuoteBook {
    fn current_price(&self, position: &Position) -> Option<f64> {
        self.get(&position.asset_name)
    }
}

/// The absent lookup: prices nothing. Summaries computed against it fall
/// back to last-sale valuation or zero unrealized P&L.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuotes;

impl PriceLookup for NoQuotes {
    fn current_price(&self, _position: &Position) -> Option<f64> {
        None
    }
}
