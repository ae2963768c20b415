use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::position::{AssetCategory, Position};
use crate::models::quote::QuoteBook;
use crate::providers::registry::QuoteProviderRegistry;

/// Resolves live market quotes for a set of positions.
///
/// Best-effort by contract: a position whose quote cannot be fetched (no
/// provider for its category, API down, bad symbol) is simply left out of
/// the resulting `QuoteBook`. The aggregator degrades unpriced positions,
/// so a flaky market-data upstream can never break a summary.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider can price the given category.
    pub fn has_provider_for(&self, category: AssetCategory) -> bool {
        self.registry.get_provider_for(category).is_some()
    }

    /// Names of all providers available for a category.
    pub fn provider_names(&self, category: AssetCategory) -> Vec<String> {
        self.registry
            .get_providers_for(category)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Build a quote book covering as many of the given positions as the
    /// providers can price. Symbols are deduplicated per category so each
    /// is fetched once.
    pub async fn fetch_quotes(&self, positions: &[Position]) -> QuoteBook {
        let mut book = QuoteBook::new();
        let mut seen: HashSet<(String, AssetCategory)> = HashSet::new();

        for position in positions {
            let key = (position.asset_name.to_uppercase(), position.category);
            if !seen.insert(key) {
                continue;
            }

            match self.fetch_quote(&position.asset_name, position.category).await {
                Ok(price) => book.insert(&position.asset_name, price),
                Err(_) => continue, // unpriced positions degrade downstream
            }
        }

        book
    }

    /// Fetch one quote with automatic provider fallback.
    ///
    /// Tries providers in registration order; rejects non-finite or
    /// negative quotes and moves on to the next provider.
    pub async fn fetch_quote(
        &self,
        symbol: &str,
        category: AssetCategory,
    ) -> Result<f64, CoreError> {
        let providers = self.registry.get_providers_for(category);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(category.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.fetch_quote(symbol).await {
                Ok(price) => {
                    if !price.is_finite() || price < 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid quote returned for {symbol}: {price} (must be finite and non-negative)"
                            ),
                        });
                        continue;
                    }
                    return Ok(price);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(category.to_string())))
    }
}
