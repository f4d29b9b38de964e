//! TON protocol primitives: recovery phrases, key derivation, cells
//! and addresses.

pub mod address;
pub mod cell;
pub mod contract;
pub mod keys;
pub mod mnemonic;

pub use address::{normalize, AddressError, TonAddress};
pub use contract::{derive_address, WalletVersion};
pub use keys::{derive_key_pair, KeyPair};
pub use mnemonic::Mnemonic;
