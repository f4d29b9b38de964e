//! Recovery phrase encryption using AES-256-GCM with Argon2id key derivation
//!
//! The phrase is sealed before it ever reaches the persistence layer.
//! A failed authentication tag surfaces as a decryption error; corrupted
//! plaintext is never returned.

use crate::error::WalletError;
use crate::types::EncryptedSecret;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use argon2::Argon2;
use rand::RngCore;
use zeroize::Zeroize;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Seal a secret under a passphrase.
///
/// A fresh salt and nonce are drawn per call, so sealing the same
/// secret twice yields different blobs.
pub fn encrypt_secret(plaintext: &str, passphrase: &str) -> Result<EncryptedSecret, WalletError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut key_bytes = derive_key(passphrase, &salt)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
    let cipher = Aes256Gcm::new(key);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| WalletError::Crypto(e.to_string()));
    key_bytes.zeroize();

    Ok(EncryptedSecret {
        ciphertext: ciphertext?,
        salt: salt.to_vec(),
        nonce: nonce_bytes.to_vec(),
    })
}

/// Open a sealed secret. Fails with [`WalletError::Decryption`] on a
/// wrong passphrase, a failed auth tag, or a malformed blob.
pub fn decrypt_secret(secret: &EncryptedSecret, passphrase: &str) -> Result<String, WalletError> {
    if secret.salt.len() != SALT_LEN || secret.nonce.len() != NONCE_LEN {
        return Err(WalletError::Decryption);
    }

    let mut key_bytes = derive_key(passphrase, &secret.salt)?;

    let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
    let cipher = Aes256Gcm::new(key);
    let nonce = Nonce::from_slice(&secret.nonce);

    let plaintext = cipher.decrypt(nonce, secret.ciphertext.as_ref());
    key_bytes.zeroize();

    let plaintext = plaintext.map_err(|_| WalletError::Decryption)?;
    String::from_utf8(plaintext).map_err(|_| WalletError::Decryption)
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; 32], WalletError> {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| WalletError::Crypto(e.to_string()))?;
    Ok(key)
}
