use thiserror::Error;

/// Unified error type for the invest-tracker-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The aggregator itself never produces errors — pure arithmetic over
/// already-loaded data degrades instead of failing. Errors come from the
/// position lifecycle (validation, lookups) and the quote providers.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider available for category: {0}")]
    NoProvider(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
