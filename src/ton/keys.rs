//! Ed25519 keypair derivation from a recovery phrase
//!
//! The phrase entropy is stretched with PBKDF2-SHA512 under the
//! "TON default seed" salt; the first 32 bytes seed the Ed25519 key.
//! Derivation is a pure function of the phrase: no randomness enters.

use crate::error::WalletError;
use crate::ton::mnemonic::Mnemonic;
use ed25519_dalek::SigningKey;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEY_SEED_SALT: &[u8] = b"TON default seed";
const KEY_SEED_ROUNDS: u32 = 100_000;

/// A derived signing keypair. The secret follows the NaCl layout
/// (seed followed by public key, 64 bytes). Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    pub public: [u8; 32],
    pub secret: [u8; 64],
}

impl KeyPair {
    /// Hex form of the public key, as persisted in the wallet record.
    pub fn public_hex(&self) -> String {
        hex::encode(self.public)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair(public: {})", self.public_hex())
    }
}

/// Derive the signing keypair for a phrase. Fails with
/// [`WalletError::InvalidMnemonic`] when the phrase does not validate.
pub fn derive_key_pair(mnemonic: &Mnemonic) -> Result<KeyPair, WalletError> {
    if !mnemonic.is_valid() {
        return Err(WalletError::InvalidMnemonic);
    }

    let entropy = mnemonic.entropy();
    let mut stretched = [0u8; 64];
    pbkdf2_hmac::<Sha512>(&entropy, KEY_SEED_SALT, KEY_SEED_ROUNDS, &mut stretched);

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&stretched[..32]);
    stretched.zeroize();

    let signing = SigningKey::from_bytes(&seed);
    seed.zeroize();

    Ok(KeyPair {
        public: signing.verifying_key().to_bytes(),
        secret: signing.to_keypair_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ton::mnemonic::tests::VALID_PHRASE;

    #[test]
    fn derivation_is_deterministic() {
        let m = Mnemonic::parse(VALID_PHRASE);
        let a = derive_key_pair(&m).unwrap();
        let b = derive_key_pair(&m).unwrap();
        assert_eq!(a.public, b.public);
        assert_eq!(a.secret, b.secret);
    }

    #[test]
    fn known_phrase_yields_known_public_key() {
        let m = Mnemonic::parse(VALID_PHRASE);
        let kp = derive_key_pair(&m).unwrap();
        assert_eq!(
            kp.public_hex(),
            "338c0f79ba0f1d1c81cacaa5f0136877c5494e3ffba6f07a388cb830d2328b60"
        );
    }

    #[test]
    fn secret_embeds_the_public_key() {
        let m = Mnemonic::parse(VALID_PHRASE);
        let kp = derive_key_pair(&m).unwrap();
        assert_eq!(&kp.secret[32..], &kp.public);
    }

    #[test]
    fn invalid_phrase_is_rejected() {
        let m = Mnemonic::parse(&["abandon"; 24].join(" "));
        assert!(matches!(
            derive_key_pair(&m),
            Err(WalletError::InvalidMnemonic)
        ));
    }

    #[test]
    fn distinct_phrases_yield_distinct_keys() {
        let a = derive_key_pair(&Mnemonic::parse(VALID_PHRASE)).unwrap();
        let b = derive_key_pair(&Mnemonic::generate()).unwrap();
        assert_ne!(a.public, b.public);
    }
}
