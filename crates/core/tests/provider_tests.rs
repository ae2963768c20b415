// ═══════════════════════════════════════════════════════════════════
// Provider Tests — registry routing, quote service fallback, symbols
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use invest_tracker_core::errors::CoreError;
use invest_tracker_core::models::position::{AssetCategory, Position};
use invest_tracker_core::providers::coincap::CoinCapProvider;
use invest_tracker_core::providers::registry::QuoteProviderRegistry;
use invest_tracker_core::providers::traits::QuoteProvider;
use invest_tracker_core::providers::yahoo_finance::YahooFinanceProvider;
use invest_tracker_core::services::quote_service::QuoteService;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Configurable in-memory provider for exercising registry and service
/// logic without touching the network.
struct MockProvider {
    name: String,
    categories: Vec<AssetCategory>,
    quote: Result<f64, String>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn priced(name: &str, categories: Vec<AssetCategory>, price: f64) -> Self {
        Self {
            name: name.to_string(),
            categories,
            quote: Ok(price),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(name: &str, categories: Vec<AssetCategory>, message: &str) -> Self {
        Self {
            name: name.to_string(),
            categories,
            quote: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_categories(&self) -> Vec<AssetCategory> {
        self.categories.clone()
    }

    async fn fetch_quote(&self, _symbol: &str) -> Result<f64, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.quote {
            Ok(price) => Ok(*price),
            Err(message) => Err(CoreError::Api {
                provider: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

fn position(category: AssetCategory, name: &str) -> Position {
    Position::new(Uuid::new_v4(), category, name, 1.0, 100.0, d(2025, 1, 1))
}

// ═══════════════════════════════════════════════════════════════════
//  Registry routing
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn empty_registry_routes_nothing() {
        let registry = QuoteProviderRegistry::new();
        for category in AssetCategory::ALL {
            assert!(registry.get_provider_for(category).is_none());
            assert!(registry.get_providers_for(category).is_empty());
        }
    }

    #[test]
    fn routes_by_supported_category() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(MockProvider::priced(
            "stocks-api",
            vec![AssetCategory::Stocks],
            1.0,
        )));
        registry.register(Box::new(MockProvider::priced(
            "crypto-api",
            vec![AssetCategory::Crypto],
            1.0,
        )));

        assert_eq!(
            registry.get_provider_for(AssetCategory::Stocks).unwrap().name(),
            "stocks-api"
        );
        assert_eq!(
            registry.get_provider_for(AssetCategory::Crypto).unwrap().name(),
            "crypto-api"
        );
        assert!(registry.get_provider_for(AssetCategory::RealEstate).is_none());
    }

    #[test]
    fn providers_listed_in_registration_order() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(MockProvider::priced(
            "primary",
            vec![AssetCategory::Stocks],
            1.0,
        )));
        registry.register(Box::new(MockProvider::priced(
            "backup",
            vec![AssetCategory::Stocks],
            2.0,
        )));

        let providers = registry.get_providers_for(AssetCategory::Stocks);
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["primary", "backup"]);
        assert_eq!(registry.get_provider_for(AssetCategory::Stocks).unwrap().name(), "primary");
    }

    #[test]
    fn one_provider_may_cover_several_categories() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(MockProvider::priced(
            "broad",
            vec![AssetCategory::Stocks, AssetCategory::Crypto],
            1.0,
        )));

        assert!(registry.get_provider_for(AssetCategory::Stocks).is_some());
        assert!(registry.get_provider_for(AssetCategory::Crypto).is_some());
        assert!(registry.get_provider_for(AssetCategory::Other).is_none());
    }

    #[test]
    fn default_registry_prices_stocks_and_crypto_only() {
        let registry = QuoteProviderRegistry::new_with_defaults();
        assert!(registry.get_provider_for(AssetCategory::Crypto).is_some());
        assert!(registry.get_provider_for(AssetCategory::RealEstate).is_none());
        assert!(registry.get_provider_for(AssetCategory::Other).is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  QuoteService
// ═══════════════════════════════════════════════════════════════════

mod quote_service {
    use super::*;

    fn service(providers: Vec<MockProvider>) -> QuoteService {
        let mut registry = QuoteProviderRegistry::new();
        for provider in providers {
            registry.register(Box::new(provider));
        }
        QuoteService::new(registry)
    }

    #[test]
    fn provider_availability_and_names() {
        let svc = service(vec![
            MockProvider::priced("primary", vec![AssetCategory::Stocks], 1.0),
            MockProvider::priced("backup", vec![AssetCategory::Stocks], 2.0),
        ]);

        assert!(svc.has_provider_for(AssetCategory::Stocks));
        assert!(!svc.has_provider_for(AssetCategory::Crypto));
        assert_eq!(svc.provider_names(AssetCategory::Stocks), vec!["primary", "backup"]);
        assert!(svc.provider_names(AssetCategory::Other).is_empty());
    }

    #[tokio::test]
    async fn fetch_quote_uses_first_working_provider() {
        let primary = MockProvider::priced("primary", vec![AssetCategory::Stocks], 120.5);
        let backup = MockProvider::priced("backup", vec![AssetCategory::Stocks], 999.0);
        let backup_calls = backup.call_counter();
        let svc = service(vec![primary, backup]);

        let price = svc.fetch_quote("TCS", AssetCategory::Stocks).await.unwrap();
        assert!((price - 120.5).abs() < 1e-9);
        assert_eq!(backup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_quote_falls_back_when_primary_fails() {
        let primary = MockProvider::failing("primary", vec![AssetCategory::Stocks], "rate limited");
        let backup = MockProvider::priced("backup", vec![AssetCategory::Stocks], 88.0);
        let svc = service(vec![primary, backup]);

        let price = svc.fetch_quote("TCS", AssetCategory::Stocks).await.unwrap();
        assert!((price - 88.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fetch_quote_rejects_non_finite_and_negative_prices() {
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let svc = service(vec![MockProvider::priced(
                "broken",
                vec![AssetCategory::Crypto],
                bad,
            )]);
            let err = svc.fetch_quote("BTC", AssetCategory::Crypto).await.unwrap_err();
            assert!(matches!(err, CoreError::Api { .. }));
        }
    }

    #[tokio::test]
    async fn invalid_quote_still_allows_fallback() {
        let primary = MockProvider::priced("primary", vec![AssetCategory::Crypto], f64::NAN);
        let backup = MockProvider::priced("backup", vec![AssetCategory::Crypto], 43_000.0);
        let svc = service(vec![primary, backup]);

        let price = svc.fetch_quote("BTC", AssetCategory::Crypto).await.unwrap();
        assert!((price - 43_000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fetch_quote_without_provider_errors() {
        let svc = service(vec![]);
        let err = svc
            .fetch_quote("Flat 4B", AssetCategory::RealEstate)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoProvider(_)));
    }

    #[tokio::test]
    async fn last_error_surfaces_when_all_providers_fail() {
        let svc = service(vec![
            MockProvider::failing("primary", vec![AssetCategory::Stocks], "timeout"),
            MockProvider::failing("backup", vec![AssetCategory::Stocks], "bad symbol"),
        ]);

        let err = svc.fetch_quote("TCS", AssetCategory::Stocks).await.unwrap_err();
        match err {
            CoreError::Api { provider, message } => {
                assert_eq!(provider, "backup");
                assert_eq!(message, "bad symbol");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_quotes_covers_priceable_positions_only() {
        let svc = service(vec![
            MockProvider::priced("stocks-api", vec![AssetCategory::Stocks], 120.0),
            MockProvider::priced("crypto-api", vec![AssetCategory::Crypto], 43_000.0),
        ]);

        let positions = vec![
            position(AssetCategory::Stocks, "TCS"),
            position(AssetCategory::Crypto, "BTC"),
            position(AssetCategory::RealEstate, "Flat 4B"),
        ];

        let book = svc.fetch_quotes(&positions).await;
        assert_eq!(book.len(), 2);
        assert_eq!(book.get("TCS"), Some(120.0));
        assert_eq!(book.get("btc"), Some(43_000.0));
        assert_eq!(book.get("Flat 4B"), None);
    }

    #[tokio::test]
    async fn fetch_quotes_skips_failures_and_keeps_going() {
        let svc = service(vec![
            MockProvider::failing("stocks-api", vec![AssetCategory::Stocks], "down"),
            MockProvider::priced("crypto-api", vec![AssetCategory::Crypto], 2_500.0),
        ]);

        let positions = vec![
            position(AssetCategory::Stocks, "TCS"),
            position(AssetCategory::Crypto, "ETH"),
        ];

        let book = svc.fetch_quotes(&positions).await;
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("ETH"), Some(2_500.0));
    }

    #[tokio::test]
    async fn fetch_quotes_deduplicates_symbols() {
        let provider = MockProvider::priced("stocks-api", vec![AssetCategory::Stocks], 120.0);
        let calls = provider.call_counter();
        let svc = service(vec![provider]);

        // Two lots of the same asset, different casing
        let positions = vec![
            position(AssetCategory::Stocks, "TCS"),
            position(AssetCategory::Stocks, "tcs"),
            position(AssetCategory::Stocks, "RELIANCE"),
        ];

        let book = svc.fetch_quotes(&positions).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(book.len(), 2);
    }

    #[tokio::test]
    async fn fetch_quotes_with_no_positions_is_empty() {
        let svc = service(vec![MockProvider::priced(
            "stocks-api",
            vec![AssetCategory::Stocks],
            1.0,
        )]);
        let book = svc.fetch_quotes(&[]).await;
        assert!(book.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Yahoo symbol mapping
// ═══════════════════════════════════════════════════════════════════

mod yahoo_symbols {
    use super::*;

    #[test]
    fn bare_symbols_default_to_nse() {
        assert_eq!(YahooFinanceProvider::yahoo_symbol("RELIANCE"), "RELIANCE.NS");
        assert_eq!(YahooFinanceProvider::yahoo_symbol("tcs"), "TCS.NS");
        assert_eq!(YahooFinanceProvider::yahoo_symbol(" infy "), "INFY.NS");
    }

    #[test]
    fn known_us_tickers_pass_through() {
        assert_eq!(YahooFinanceProvider::yahoo_symbol("AAPL"), "AAPL");
        assert_eq!(YahooFinanceProvider::yahoo_symbol("msft"), "MSFT");
        assert_eq!(YahooFinanceProvider::yahoo_symbol("TSLA"), "TSLA");
    }

    #[test]
    fn exchange_suffixes_and_indices_are_kept() {
        assert_eq!(YahooFinanceProvider::yahoo_symbol("TCS.NS"), "TCS.NS");
        assert_eq!(YahooFinanceProvider::yahoo_symbol("RELIANCE.BO"), "RELIANCE.BO");
        assert_eq!(YahooFinanceProvider::yahoo_symbol("^NSEI"), "^NSEI");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CoinCap symbol resolution
// ═══════════════════════════════════════════════════════════════════

mod coincap_symbols {
    use super::*;

    #[test]
    fn common_tickers_map_to_asset_ids() {
        let provider = CoinCapProvider::new();
        assert_eq!(provider.resolve_id("BTC"), "bitcoin");
        assert_eq!(provider.resolve_id("eth"), "ethereum");
        assert_eq!(provider.resolve_id("DOGE"), "dogecoin");
    }

    #[test]
    fn unknown_symbols_fall_back_to_lowercase() {
        let provider = CoinCapProvider::new();
        // Users often enter the CoinCap id itself as the asset name
        assert_eq!(provider.resolve_id("bitcoin"), "bitcoin");
        assert_eq!(provider.resolve_id("PEPE"), "pepe");
    }
}
