use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::position::AssetCategory;
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://api.coincap.io/v2";

/// CoinCap API provider for cryptocurrency quotes.
///
/// - **Free**: No API key required, no strict rate limits.
/// - **Data**: 2000+ cryptocurrencies, real-time.
/// - **Endpoints**: `/assets/{id}`, `/assets?search={symbol}`
///
/// CoinCap uses lowercase ids like "bitcoin", "ethereum". Common symbols
/// (BTC → bitcoin) are pre-mapped; unknown ones are resolved dynamically
/// via the search endpoint and cached.
pub struct CoinCapProvider {
    client: Client,
    /// Map from uppercase symbol (BTC) to CoinCap asset id (bitcoin).
    symbol_map: Mutex<HashMap<String, String>>,
}

impl CoinCapProvider {
    pub fn new() -> Self {
        let mut symbol_map = HashMap::new();
        let common = vec![
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("USDT", "tether"),
            ("USDC", "usd-coin"),
            ("BNB", "binance-coin"),
            ("XRP", "xrp"),
            ("ADA", "cardano"),
            ("SOL", "solana"),
            ("DOGE", "dogecoin"),
            ("DOT", "polkadot"),
            ("MATIC", "polygon"),
            ("LTC", "litecoin"),
            ("AVAX", "avalanche"),
            ("LINK", "chainlink"),
            ("UNI", "uniswap"),
            ("ATOM", "cosmos"),
            ("XLM", "stellar"),
            ("SHIB", "shiba-inu"),
            ("TRX", "tron"),
            ("XMR", "monero"),
        ];
        for (sym, id) in common {
            symbol_map.insert(sym.to_string(), id.to_string());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            symbol_map: Mutex::new(symbol_map),
        }
    }

    /// Resolve a symbol like "BTC" to a CoinCap id like "bitcoin" from the
    /// static map, falling back to the lowercased symbol itself (users often
    /// enter the CoinCap id, e.g. "bitcoin", as the asset name directly).
    pub fn resolve_id(&self, symbol: &str) -> String {
        let upper = symbol.to_uppercase();
        let map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&upper)
            .cloned()
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    /// Dynamically resolve a symbol by searching the CoinCap API.
    /// Caches the result for future lookups.
    async fn resolve_id_dynamic(&self, symbol: &str) -> Result<String, CoreError> {
        let upper = symbol.to_uppercase();

        {
            let map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(id) = map.get(&upper) {
                return Ok(id.clone());
            }
        }

        let url = format!("{BASE_URL}/assets?search={upper}&limit=5");
        let resp: AssetsSearchResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Failed to search for {upper}: {e}"),
            })?;

        // Prefer an exact symbol match; otherwise accept an exact id match
        // (asset names like "bitcoin" arrive as ids, not tickers).
        let matched = resp
            .data
            .iter()
            .find(|a| a.symbol.to_uppercase() == upper)
            .or_else(|| resp.data.iter().find(|a| a.id == symbol.to_lowercase()))
            .ok_or_else(|| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("No CoinCap asset found for symbol {upper}"),
            })?;

        let id = matched.id.clone();

        {
            let mut map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
            map.insert(upper, id.clone());
        }

        Ok(id)
    }
}

impl Default for CoinCapProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── CoinCap API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct AssetResponse {
    data: AssetData,
}

#[derive(Deserialize)]
struct AssetData {
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
}

#[derive(Deserialize)]
struct AssetsSearchResponse {
    data: Vec<AssetSearchEntry>,
}

#[derive(Deserialize)]
struct AssetSearchEntry {
    id: String,
    symbol: String,
}

#[async_trait]
impl QuoteProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "CoinCap"
    }

    fn supported_categories(&self) -> Vec<AssetCategory> {
        vec![AssetCategory::Crypto]
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<f64, CoreError> {
        let id = self.resolve_id_dynamic(symbol).await?;
        let url = format!("{BASE_URL}/assets/{id}");

        let resp: AssetResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Failed to parse response for {symbol}: {e}"),
            })?;

        let price_usd: f64 = resp
            .data
            .price_usd
            .ok_or_else(|| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("No price data for {symbol}"),
            })?
            .parse()
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Invalid price format for {symbol}: {e}"),
            })?;

        Ok(price_usd)
    }
}
