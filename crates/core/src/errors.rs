use thiserror::Error;

/// Unified error type for the entire portfolio-valuation-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Data conditions such as zero holdings or a short price history are not
/// errors; they travel next to results as `DataCondition` values.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted file")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Price sources / Network ─────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price source available for instrument type: {0}")]
    NoProvider(String),

    #[error("Failed to parse {source_name} response: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Asset not found in catalog: {0}")]
    AssetNotFound(String),

    #[error("Price not available for {asset_code} on {date}")]
    PriceNotAvailable { asset_code: String, date: String },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; query strings may hold API keys.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}

/// Strip everything after the first `?` so URLs in messages never expose secrets.
pub(crate) fn redact_query(message: &str) -> String {
    match message.find('?') {
        Some(idx) => format!("{}?<query redacted>", &message[..idx]),
        None => message.to_string(),
    }
}
