use std::collections::HashMap;

use crate::models::position::{AssetCategory, Position};
use crate::models::quote::PriceLookup;
use crate::models::summary::{AllocationView, PortfolioSummary, PositionReport, SeriesPoint};

/// Turns positions into financial metrics: remaining quantity, invested
/// totals, realized/unrealized profit-loss, allocation breakdowns, and the
/// cumulative realized series.
///
/// Every consumer (summary endpoint, per-row listings, charts) goes
/// through this one implementation of the formulas.
///
/// Pure business logic: no I/O, no locking, no shared state. Malformed
/// input (an over-sold position) degrades to a mathematically consistent
/// negative remainder; missing prices degrade unrealized figures to zero.
/// Nothing here returns an error.
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Units of the position not yet sold:
    /// `quantity - Σ units_sold`.
    ///
    /// Not floored at zero. A negative result means sales were recorded
    /// beyond the purchased quantity — that signal is passed through to the
    /// caller, whose boundary layer owns validation.
    pub fn remaining_quantity(&self, position: &Position) -> f64 {
        let sold: f64 = position.sales.iter().map(|s| s.units_sold).sum();
        position.quantity - sold
    }

    /// Original cost basis of the full lot: `quantity × buy_price`.
    ///
    /// Deliberately independent of sales — "total invested" reflects capital
    /// deployed historically, not capital currently at risk, so it never
    /// decreases as units are sold.
    pub fn invested_amount(&self, position: &Position) -> f64 {
        position.quantity * position.buy_price
    }

    /// Profit locked in by completed sales:
    /// `Σ units_sold × (sell_price − buy_price)`.
    ///
    /// A position is exactly one buy lot, so its single buy price is the
    /// exact cost basis for every sale — no FIFO/LIFO layering needed.
    pub fn realized_profit_loss(&self, position: &Position) -> f64 {
        position
            .sales
            .iter()
            .map(|s| s.units_sold * (s.sell_price - position.buy_price))
            .sum()
    }

    /// Hypothetical profit on the units still held:
    /// `remaining_quantity × (effective_price − buy_price)`.
    ///
    /// Valuation rule (one rule, applied consistently): the externally
    /// supplied live price wins when present; otherwise the most recent
    /// sale's price stands in for it; with neither, the unrealized figure
    /// is zero. The two are never blended within one computation.
    pub fn unrealized_profit_loss(&self, position: &Position, current_price: Option<f64>) -> f64 {
        match self.effective_price(position, current_price) {
            Some(price) => self.remaining_quantity(position) * (price - position.buy_price),
            None => 0.0,
        }
    }

    /// realized + unrealized, valued per `unrealized_profit_loss`.
    pub fn net_profit_loss(&self, position: &Position, current_price: Option<f64>) -> f64 {
        self.realized_profit_loss(position) + self.unrealized_profit_loss(position, current_price)
    }

    /// Every per-position figure bundled for display.
    pub fn position_report(
        &self,
        position: &Position,
        current_price: Option<f64>,
    ) -> PositionReport {
        PositionReport {
            position_id: position.id,
            asset_name: position.asset_name.clone(),
            category: position.category,
            remaining_quantity: self.remaining_quantity(position),
            invested_amount: self.invested_amount(position),
            realized_profit_loss: self.realized_profit_loss(position),
            unrealized_profit_loss: self.unrealized_profit_loss(position, current_price),
            net_profit_loss: self.net_profit_loss(position, current_price),
            current_price,
        }
    }

    /// Portfolio-level totals and the allocation breakdown.
    ///
    /// - `Overall` view: all positions, allocation keyed by category name.
    /// - `Category(c)` view: positions in `c` only, allocation keyed by
    ///   asset name (the drill-down a pie chart switches to).
    ///
    /// Never fails on missing price data: positions the lookup cannot price
    /// contribute zero unrealized P&L (subject to the last-sale fallback).
    /// An empty position set yields all-zero totals and an empty map.
    pub fn summarize(
        &self,
        positions: &[Position],
        prices: &impl PriceLookup,
        view: &AllocationView,
    ) -> PortfolioSummary {
        let mut summary = PortfolioSummary::empty();

        for position in Self::covered(positions, view) {
            let invested = self.invested_amount(position);
            summary.total_invested += invested;
            summary.total_profit_loss +=
                self.net_profit_loss(position, prices.current_price(position));
            summary.position_count += 1;

            let key = match view {
                AllocationView::Overall => position.category.to_string(),
                AllocationView::Category(_) => position.asset_name.clone(),
            };
            *summary.allocation.entry(key).or_insert(0.0) += invested;
        }

        summary
    }

    /// Invested amount grouped by the view's key, without the totals.
    pub fn allocation(
        &self,
        positions: &[Position],
        view: &AllocationView,
    ) -> HashMap<String, f64> {
        let mut allocation = HashMap::new();
        for position in Self::covered(positions, view) {
            let key = match view {
                AllocationView::Overall => position.category.to_string(),
                AllocationView::Category(_) => position.asset_name.clone(),
            };
            *allocation.entry(key).or_insert(0.0) += self.invested_amount(position);
        }
        allocation
    }

    /// Time-ordered running total of realized P&L across every sale of the
    /// matching positions.
    ///
    /// Flattens each sale tagged with its parent's buy price, stable-sorts
    /// ascending by sale date (sales sharing a date keep their input order —
    /// there is no secondary key), then walks the list accumulating
    /// `units_sold × (sell_price − buy_price)`.
    ///
    /// One output point per sale; no sales means an empty series, not an
    /// error.
    pub fn cumulative_realized_series(
        &self,
        positions: &[Position],
        category: Option<AssetCategory>,
    ) -> Vec<SeriesPoint> {
        let mut flattened: Vec<(chrono::NaiveDate, f64)> = positions
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .flat_map(|p| {
                p.sales
                    .iter()
                    .map(|s| (s.date, s.units_sold * (s.sell_price - p.buy_price)))
            })
            .collect();

        flattened.sort_by_key(|(date, _)| *date);

        let mut cumulative = 0.0;
        flattened
            .into_iter()
            .map(|(date, profit_loss)| {
                cumulative += profit_loss;
                SeriesPoint {
                    date,
                    profit_loss,
                    cumulative,
                }
            })
            .collect()
    }

    /// The price a position is valued at: live quote first, most recent
    /// sale's price as the last resort.
    fn effective_price(&self, position: &Position, current_price: Option<f64>) -> Option<f64> {
        current_price.or_else(|| position.latest_sale().map(|s| s.sell_price))
    }

    fn covered<'a>(
        positions: &'a [Position],
        view: &AllocationView,
    ) -> impl Iterator<Item = &'a Position> {
        let filter = match view {
            AllocationView::Overall => None,
            AllocationView::Category(c) => Some(*c),
        };
        positions
            .iter()
            .filter(move |p| filter.map_or(true, |c| p.category == c))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
