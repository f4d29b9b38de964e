//! Canonical data model for the wallet core
//!
//! Every remote source shape is normalized into these types. Monetary
//! amounts are integer strings in the asset's smallest unit; display
//! conversion happens only in [`crate::format`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current wallet record schema. Bump when the persisted layout changes.
pub const WALLET_SCHEMA_VERSION: u32 = 1;

/// Ciphertext blob produced by the secret store, with everything
/// needed for decryption except the passphrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// AES-256-GCM ciphertext (includes the auth tag)
    pub ciphertext: Vec<u8>,
    /// Salt for Argon2id key derivation (16 bytes)
    pub salt: Vec<u8>,
    /// Nonce for AES-GCM (12 bytes)
    pub nonce: Vec<u8>,
}

/// The single persisted wallet record. Created by
/// `WalletRepository::create`, destroyed by `delete`, immutable
/// otherwise: re-creating replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Persisted layout version, for future migration
    pub schema_version: u32,
    /// User-friendly bounceable address string
    pub address: String,
    /// Hex-encoded Ed25519 public key
    pub public_key_hex: String,
    /// Wallet contract version the address was derived under
    pub wallet_version: crate::ton::WalletVersion,
    /// Workchain the address lives in
    pub workchain: i32,
    /// Recovery phrase sealed by the secret store
    pub encrypted_secret: EncryptedSecret,
    /// Creation time in unix milliseconds
    pub created_at_ms: i64,
}

/// Native-asset balance in smallest units plus its display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Integer string in nanotons
    pub nano: String,
    /// Display value, 4 fractional digits
    pub formatted: String,
}

impl Balance {
    /// The "no data" terminal state: callers treat this the same as a
    /// wallet that holds nothing.
    pub fn zero() -> Self {
        Self {
            nano: "0".to_string(),
            formatted: "0.0000".to_string(),
        }
    }
}

/// Transaction confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Confirmed => write!(f, "confirmed"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One canonical ledger entry, regardless of which source shape it
/// came from. Each heterogeneous source action becomes one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Native tx hash, or a synthetic `{event}-{i}-{j}` key when the
    /// source has none. Unique within a result page.
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Integer string in the asset's smallest unit
    pub amount: String,
    pub decimals: u32,
    pub asset_symbol: String,
    pub timestamp_ms: i64,
    pub status: TxStatus,
    /// True when the normalized recipient equals the wallet address
    pub is_incoming: bool,
    pub comment: Option<String>,
    /// Master contract address for jetton transfers
    pub jetton_contract: Option<String>,
}

/// A fungible token ("jetton") held by the wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHolding {
    pub contract_address: String,
    pub name: String,
    pub symbol: String,
    /// Integer string in smallest units
    pub balance: String,
    pub decimals: u32,
    /// True only when the source explicitly whitelists the contract
    pub verified: bool,
    pub image_url: Option<String>,
}

/// Cached price point for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub change_24h_percent: Decimal,
    /// Unix milliseconds at fetch time
    pub fetched_at_ms: i64,
}

impl PriceQuote {
    /// Floor quote when nothing has ever been fetched.
    pub fn zero(fetched_at_ms: i64) -> Self {
        Self {
            price: Decimal::ZERO,
            change_24h_percent: Decimal::ZERO,
            fetched_at_ms,
        }
    }
}

/// Composite wallet view assembled by `LedgerClient::overview`.
/// Fields arrive from independent queries; any of them may be the
/// empty/zero terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletOverview {
    pub balance: Balance,
    pub transactions: Vec<Transaction>,
    pub tokens: Vec<TokenHolding>,
    pub price: PriceQuote,
    /// Native balance valued at the cached quote
    pub usd_value: Decimal,
}
