use thiserror::Error;

/// Unified error type for the entire bursatil-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// An empty filter result and an undefined percent change are not errors:
/// they surface as empty vectors and absent (`None` / `""`) values.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data source ─────────────────────────────────────────────────
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── User selections ─────────────────────────────────────────────
    #[error("Invalid selection: {0}")]
    ValidationError(String),

    // ── Rendering ───────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::DataUnavailable(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::DataUnavailable(format!("CSV read failed: {e}"))
    }
}

impl From<calamine::Error> for CoreError {
    fn from(e: calamine::Error) -> Self {
        CoreError::DataUnavailable(format!("Spreadsheet read failed: {e}"))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}
