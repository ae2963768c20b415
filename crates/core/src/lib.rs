pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use uuid::Uuid;

use errors::CoreError;
use models::{
    ledger::Ledger,
    position::{AssetCategory, Position, Sale},
    quote::{PriceLookup, QuoteBook},
    summary::{AllocationView, PortfolioSummary, PositionReport, SeriesPoint},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    aggregator::Aggregator,
    position_service::{PositionService, PurchaseChange},
    quote_service::QuoteService,
};

/// Main entry point for the invest-tracker core library.
///
/// Holds one user's ledger and the services that operate on it. The HTTP
/// layer above this authenticates the caller, loads/persists the ledger,
/// and serializes what comes out — everything with actual semantics
/// happens here.
#[must_use]
pub struct InvestTracker {
    ledger: Ledger,
    position_service: PositionService,
    aggregator: Aggregator,
    quote_service: QuoteService,
}

impl std::fmt::Debug for InvestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestTracker")
            .field("owner", &self.ledger.owner)
            .field("positions", &self.ledger.positions.len())
            .field("sales", &self.ledger.sale_count())
            .finish()
    }
}

impl InvestTracker {
    /// Create an empty tracker for a user.
    pub fn create_new(owner: Uuid) -> Self {
        Self::build(Ledger::new(owner))
    }

    /// Wrap an already-loaded ledger (e.g., fetched from storage by the
    /// caller). The ledger is expected to be scoped to one owner.
    pub fn from_ledger(ledger: Ledger) -> Self {
        Self::build(ledger)
    }

    /// The owner this tracker's positions belong to.
    #[must_use]
    pub fn owner(&self) -> Uuid {
        self.ledger.owner
    }

    /// Borrow the underlying ledger (e.g., for persistence by the caller).
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ── Position Lifecycle ──────────────────────────────────────────

    /// Record a new purchase lot. Returns the new position's id.
    pub fn add_position(
        &mut self,
        category: AssetCategory,
        asset_name: impl Into<String>,
        quantity: f64,
        buy_price: f64,
        purchase_date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        let position = Position::new(
            self.ledger.owner,
            category,
            asset_name,
            quantity,
            buy_price,
            purchase_date,
        );
        let id = position.id;
        self.position_service.add_position(&mut self.ledger, position)?;
        Ok(id)
    }

    /// Update the purchase details of a position. Category and owner are
    /// immutable and not part of the change.
    pub fn update_purchase(
        &mut self,
        position_id: Uuid,
        change: PurchaseChange,
    ) -> Result<(), CoreError> {
        self.position_service
            .update_purchase(&mut self.ledger, position_id, change)
    }

    /// Delete a position and all of its sales.
    pub fn remove_position(&mut self, position_id: Uuid) -> Result<Position, CoreError> {
        self.position_service
            .remove_position(&mut self.ledger, position_id)
    }

    /// Record a sale against a position. Returns the new sale's id.
    pub fn record_sale(
        &mut self,
        position_id: Uuid,
        units_sold: f64,
        sell_price: f64,
        date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        self.position_service
            .add_sale(&mut self.ledger, position_id, units_sold, sell_price, date)
    }

    /// Edit one sale of a position.
    pub fn update_sale(
        &mut self,
        position_id: Uuid,
        sale_id: Uuid,
        units_sold: f64,
        sell_price: f64,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        self.position_service.update_sale(
            &mut self.ledger,
            position_id,
            sale_id,
            units_sold,
            sell_price,
            date,
        )
    }

    /// Remove one sale from a position.
    pub fn remove_sale(&mut self, position_id: Uuid, sale_id: Uuid) -> Result<Sale, CoreError> {
        self.position_service
            .remove_sale(&mut self.ledger, position_id, sale_id)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Get a single position by id.
    #[must_use]
    pub fn get_position(&self, position_id: Uuid) -> Option<&Position> {
        self.ledger.position(position_id)
    }

    /// All positions, newest purchase first.
    #[must_use]
    pub fn get_positions(&self) -> Vec<&Position> {
        self.position_service.positions_by_date_desc(&self.ledger)
    }

    /// Positions in one category.
    #[must_use]
    pub fn positions_for_category(&self, category: AssetCategory) -> Vec<&Position> {
        self.position_service
            .positions_in_category(&self.ledger, category)
    }

    /// Number of positions without materializing a sorted vector.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.ledger.positions.len()
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Overall portfolio summary: totals plus allocation by category.
    #[must_use]
    pub fn portfolio_summary(&self, prices: &impl PriceLookup) -> PortfolioSummary {
        self.aggregator
            .summarize(&self.ledger.positions, prices, &AllocationView::Overall)
    }

    /// Summary of one category: totals over its positions plus allocation
    /// by asset name (the drill-down view).
    #[must_use]
    pub fn category_summary(
        &self,
        category: AssetCategory,
        prices: &impl PriceLookup,
    ) -> PortfolioSummary {
        self.aggregator.summarize(
            &self.ledger.positions,
            prices,
            &AllocationView::Category(category),
        )
    }

    /// Full report for one position at the supplied price.
    pub fn position_report(
        &self,
        position_id: Uuid,
        prices: &impl PriceLookup,
    ) -> Result<PositionReport, CoreError> {
        let position = self
            .ledger
            .position(position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;
        Ok(self
            .aggregator
            .position_report(position, prices.current_price(position)))
    }

    /// Reports for all positions, newest purchase first.
    #[must_use]
    pub fn position_reports(&self, prices: &impl PriceLookup) -> Vec<PositionReport> {
        self.get_positions()
            .into_iter()
            .map(|p| self.aggregator.position_report(p, prices.current_price(p)))
            .collect()
    }

    /// Cumulative realized P&L series across all sales, optionally filtered
    /// to one category. Empty when there are no sales.
    #[must_use]
    pub fn realized_series(&self, category: Option<AssetCategory>) -> Vec<SeriesPoint> {
        self.aggregator
            .cumulative_realized_series(&self.ledger.positions, category)
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Fetch live quotes for all held positions. Positions whose category
    /// has no provider, or whose fetch fails, are left unpriced — summaries
    /// computed against the returned book degrade those to zero unrealized.
    pub async fn refresh_quotes(&self) -> QuoteBook {
        self.quote_service.fetch_quotes(&self.ledger.positions).await
    }

    /// Check whether live pricing exists for a category.
    #[must_use]
    pub fn is_provider_available(&self, category: AssetCategory) -> bool {
        self.quote_service.has_provider_for(category)
    }

    /// Names of the quote providers available for a category.
    #[must_use]
    pub fn provider_names(&self, category: AssetCategory) -> Vec<String> {
        self.quote_service.provider_names(category)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all positions (with their sales) as a JSON string.
    pub fn export_positions_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger.positions)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize positions: {e}")))
    }

    /// Import positions from a JSON string. All positions are validated
    /// first; if any fails, none are added. Returns the number imported.
    pub fn import_positions_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let positions: Vec<Position> = serde_json::from_str(json)?;
        let count = positions.len();

        // Phase 1: validate everything against a scratch copy
        let mut scratch = self.ledger.clone();
        for position in &positions {
            self.position_service
                .add_position(&mut scratch, position.clone())?;
        }

        // Phase 2: all valid — commit
        self.ledger = scratch;
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: Ledger) -> Self {
        let registry = QuoteProviderRegistry::new_with_defaults();
        Self {
            ledger,
            position_service: PositionService::new(),
            aggregator: Aggregator::new(),
            quote_service: QuoteService::new(registry),
        }
    }
}
