use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::position::AssetCategory;
use super::traits::QuoteProvider;

/// Tickers assumed to be US-listed and passed to Yahoo untouched. Any other
/// bare symbol (no exchange suffix) is treated as an NSE listing.
const KNOWN_US_SYMBOLS: [&str; 8] = [
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "NFLX", "META",
];

/// Yahoo Finance provider for stock/equity quotes.
///
/// - **Free**: No API key required (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices.
///
/// Uses the `yahoo_finance_api` crate, which wraps Yahoo Finance's public
/// endpoints. Quotes come back in the listing's native currency.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Map an entered asset name to a Yahoo ticker. A symbol that already
    /// carries an exchange suffix ("RELIANCE.NS", "^NSEI") is kept as-is;
    /// a bare symbol that isn't a known US ticker gets the NSE ".NS" suffix.
    pub fn yahoo_symbol(symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        if upper.contains('.') || upper.starts_with('^') || KNOWN_US_SYMBOLS.contains(&upper.as_str())
        {
            upper
        } else {
            format!("{upper}.NS")
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_categories(&self) -> Vec<AssetCategory> {
        vec![AssetCategory::Stocks]
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<f64, CoreError> {
        let ticker = Self::yahoo_symbol(symbol);

        let resp = self
            .connector
            .get_latest_quotes(&ticker, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {ticker}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {ticker}: {e}"),
        })?;

        Ok(quote.close)
    }
}
