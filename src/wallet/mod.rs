//! Wallet identity: encrypted secret storage and the persisted record
//!
//! Provides phrase sealing, the persistence port, and the repository
//! that owns the single wallet record.

pub mod encryption;
pub mod repository;
pub mod storage;

pub use encryption::{decrypt_secret, encrypt_secret};
pub use repository::WalletRepository;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
