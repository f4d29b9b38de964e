//! Wallet identity and ledger-sync core for a TON mini-app wallet
//!
//! The crate covers the engineering-hard half of a custodial-in-browser
//! wallet and nothing presentational:
//!
//! 1. **Identity**: deterministic Ed25519 key and contract-address
//!    derivation from a 24-word recovery phrase, with the phrase sealed
//!    at rest under AES-256-GCM and an Argon2id-derived key.
//! 2. **Ledger sync**: balance, transaction history and jetton holdings
//!    reconciled from structurally different untrusted HTTP sources,
//!    with per-query fallback chains normalizing into one canonical
//!    model, plus a TTL + single-flight USD price cache.
//!
//! Identity errors propagate; display-data errors degrade to empty
//! results. Dependencies (HTTP transport, persistence, clock) are
//! injected at construction so every service runs against fakes in
//! tests.

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod services;
pub mod ton;
pub mod types;
pub mod wallet;

pub use clock::{system_clock, Clock, SystemClock};
pub use config::Config;
pub use error::{SourceError, WalletError};
pub use services::{LedgerClient, PriceCache, ReqwestTransport};
pub use ton::{derive_address, derive_key_pair, Mnemonic, TonAddress, WalletVersion};
pub use types::{
    Balance, EncryptedSecret, PriceQuote, TokenHolding, Transaction, TxStatus, WalletOverview,
    WalletRecord,
};
pub use wallet::{FileStore, KeyValueStore, MemoryStore, WalletRepository};
