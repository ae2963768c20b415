use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::position::AssetCategory;

/// Trait abstraction for live market-quote providers.
///
/// Each upstream API (CoinCap, Yahoo Finance) implements this trait.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset categories this provider can price.
    fn supported_categories(&self) -> Vec<AssetCategory>;

    /// Fetch the current market price for an asset symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<f64, CoreError>;
}
