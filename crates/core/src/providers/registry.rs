use crate::models::position::AssetCategory;

use super::coincap::CoinCapProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Routes requests to the correct provider based on `AssetCategory`.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default providers pre-configured.
    /// RealEstate and Other have no live pricing; the aggregator
    /// degrades their unrealized figures instead.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // CoinCap — crypto, no API key needed
        registry.register(Box::new(CoinCapProvider::new()));

        // Yahoo Finance — stocks, no API key needed
        if let Ok(yahoo) = YahooFinanceProvider::new() {
            registry.register(Box::new(yahoo));
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given category.
    pub fn get_provider_for(&self, category: AssetCategory) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_categories().contains(&category))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given category, in registration
    /// order. Used for fallback: if the first fails, try the next one.
    pub fn get_providers_for(&self, category: AssetCategory) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_categories().contains(&category))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
