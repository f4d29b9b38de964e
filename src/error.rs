//! Error taxonomy for the wallet core
//!
//! Identity and secret operations (`create`, `import`, `reveal_mnemonic`)
//! fail loudly with [`WalletError`]. Ledger-sync operations classify
//! remote failures as [`SourceError`] internally, walk the fallback
//! chain, and degrade to empty results instead of propagating.

use thiserror::Error;

/// Errors surfaced by wallet identity, secret and persistence operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The recovery phrase failed validation (wrong length, unknown
    /// word, or checksum mismatch). User-correctable.
    #[error("invalid mnemonic phrase")]
    InvalidMnemonic,

    /// Wrong passphrase or corrupted ciphertext. Fatal to the
    /// operation; never silently succeeds.
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,

    /// Sealing the secret failed (key derivation or cipher setup).
    #[error("encryption failed: {0}")]
    Crypto(String),

    /// The persistence backend rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transient failures from a single remote data source.
///
/// Any of these moves the ledger client on to the next configured
/// source; they are never returned to callers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP 429 from the source.
    #[error("rate limited by source")]
    RateLimited,

    /// Connection, DNS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status other than 429.
    #[error("source returned status {0}")]
    Status(u16),

    /// The response body did not match any known shape.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl SourceError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            SourceError::RateLimited
        } else {
            SourceError::Status(status)
        }
    }

    /// Classify a reqwest transport error.
    pub fn from_network_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Network("request timed out".to_string())
        } else if err.is_connect() {
            SourceError::Network("connection failed".to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}
