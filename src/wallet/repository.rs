//! The single persisted wallet
//!
//! One record per store: creating a wallet replaces whatever was
//! there, deleting removes the slot. Identity errors propagate to the
//! caller; nothing in this module degrades silently.

use crate::clock::Clock;
use crate::error::WalletError;
use crate::ton::{derive_address, derive_key_pair, Mnemonic, WalletVersion};
use crate::types::{WalletRecord, WALLET_SCHEMA_VERSION};
use crate::wallet::encryption::{decrypt_secret, encrypt_secret};
use crate::wallet::storage::KeyValueStore;
use std::sync::Arc;
use tracing::info;

/// Storage slot holding the serialized record.
const WALLET_SLOT: &str = "wallet";

/// Owns creation, import, lookup and deletion of the wallet record.
pub struct WalletRepository {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    workchain: i32,
    version: WalletVersion,
}

impl WalletRepository {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        workchain: i32,
        version: WalletVersion,
    ) -> Self {
        Self {
            store,
            clock,
            workchain,
            version,
        }
    }

    /// Create a wallet and persist it, overwriting any prior record.
    /// Generates a fresh phrase when none is given; the phrase is
    /// returned exactly once, for the caller to show the user.
    pub async fn create(
        &self,
        mnemonic: Option<Mnemonic>,
        passphrase: &str,
    ) -> Result<(WalletRecord, Mnemonic), WalletError> {
        let mnemonic = mnemonic.unwrap_or_else(Mnemonic::generate);
        if !mnemonic.is_valid() {
            return Err(WalletError::InvalidMnemonic);
        }

        let keys = derive_key_pair(&mnemonic)?;
        let address = derive_address(&keys.public, self.workchain, self.version);

        let encrypted_secret = encrypt_secret(&mnemonic.phrase(), passphrase)?;

        let record = WalletRecord {
            schema_version: WALLET_SCHEMA_VERSION,
            address: address.to_friendly(true, false),
            public_key_hex: keys.public_hex(),
            wallet_version: self.version,
            workchain: self.workchain,
            encrypted_secret,
            created_at_ms: self.clock.now_ms(),
        };

        let json = serde_json::to_string(&record)?;
        self.store.set(WALLET_SLOT, &json).await?;
        info!("wallet record created for {}", record.address);

        Ok((record, mnemonic))
    }

    /// Import an existing phrase. Fails with
    /// [`WalletError::InvalidMnemonic`] before touching storage.
    pub async fn import(
        &self,
        mnemonic: Mnemonic,
        passphrase: &str,
    ) -> Result<WalletRecord, WalletError> {
        if !mnemonic.is_valid() {
            return Err(WalletError::InvalidMnemonic);
        }
        let (record, _) = self.create(Some(mnemonic), passphrase).await?;
        Ok(record)
    }

    /// Load the current record, if any.
    pub async fn get(&self) -> Result<Option<WalletRecord>, WalletError> {
        let Some(json) = self.store.get(WALLET_SLOT).await? else {
            return Ok(None);
        };
        let record: WalletRecord = serde_json::from_str(&json)?;
        if record.schema_version != WALLET_SCHEMA_VERSION {
            return Err(WalletError::Storage(format!(
                "unsupported wallet schema version {}",
                record.schema_version
            )));
        }
        Ok(Some(record))
    }

    pub async fn exists(&self) -> Result<bool, WalletError> {
        Ok(self.get().await?.is_some())
    }

    /// Remove the record. Idempotent: deleting a missing wallet is
    /// not an error.
    pub async fn delete(&self) -> Result<(), WalletError> {
        self.store.delete(WALLET_SLOT).await?;
        info!("wallet record deleted");
        Ok(())
    }

    /// Decrypt the recovery phrase out of a record. Fails with
    /// [`WalletError::Decryption`] on a wrong passphrase.
    pub fn reveal_mnemonic(
        &self,
        record: &WalletRecord,
        passphrase: &str,
    ) -> Result<Mnemonic, WalletError> {
        let phrase = decrypt_secret(&record.encrypted_secret, passphrase)?;
        Ok(Mnemonic::parse(&phrase))
    }
}
