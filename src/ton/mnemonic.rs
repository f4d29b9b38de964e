//! Recovery phrase generation and validation
//!
//! TON mnemonics use the BIP39 English word list but not the BIP39
//! checksum: a candidate phrase is valid when its HMAC-SHA512 entropy,
//! stretched through PBKDF2 with the "TON seed version" salt, starts
//! with a zero byte. Generation rejection-samples random phrases until
//! one passes, so roughly one candidate in 256 is accepted.

use bip39::Language;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::Rng;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Words in a recovery phrase.
pub const WORD_COUNT: usize = 24;

const BASIC_SEED_SALT: &[u8] = b"TON seed version";
// max(1, 100000 / 256), as in the reference scheme
const BASIC_SEED_ROUNDS: u32 = 390;

/// A 24-word recovery phrase. Held only transiently; the words are
/// wiped from memory on drop and the type is never serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    words: Vec<String>,
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mnemonic({} words)", self.words.len())
    }
}

impl Mnemonic {
    /// Wrap a word sequence without validating it. Callers that need a
    /// guarantee go through [`Mnemonic::validate`] (key derivation and
    /// the wallet repository always do).
    pub fn from_words(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Split free-form user input into a candidate phrase: whitespace
    /// separated, lowercased. No validation happens here.
    pub fn parse(phrase: &str) -> Self {
        let words = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        Self { words }
    }

    /// Generate a new phrase from OS randomness, resampling until the
    /// embedded checksum condition holds.
    pub fn generate() -> Self {
        let list = Language::English.word_list();
        let mut rng = OsRng;
        loop {
            let words: Vec<String> = (0..WORD_COUNT)
                .map(|_| list[rng.gen_range(0..list.len())].to_string())
                .collect();
            if Self::validate(&words) {
                return Self { words };
            }
        }
    }

    /// Check a candidate phrase. Returns false (never an error) for a
    /// wrong word count, words outside the word list, non-lowercase
    /// input, or a failed checksum.
    pub fn validate<S: AsRef<str>>(words: &[S]) -> bool {
        if words.len() != WORD_COUNT {
            return false;
        }
        let list = Language::English.word_list();
        for word in words {
            let word = word.as_ref();
            if word.chars().any(|c| !c.is_ascii_lowercase()) {
                return false;
            }
            if list.binary_search(&word).is_err() {
                return false;
            }
        }
        let phrase = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        is_basic_seed(&phrase_entropy(&phrase))
    }

    /// True when this phrase passes [`Mnemonic::validate`].
    pub fn is_valid(&self) -> bool {
        Self::validate(&self.words)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The space-joined phrase, for sealing into the secret store.
    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }

    /// 512-bit entropy of the phrase, the input to key derivation.
    pub(crate) fn entropy(&self) -> [u8; 64] {
        phrase_entropy(&self.phrase())
    }
}

/// HMAC-SHA512 keyed by the phrase itself, over an empty message
/// (the no-passphrase variant of the scheme).
fn phrase_entropy(phrase: &str) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(phrase.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(b"");
    let mut entropy = [0u8; 64];
    entropy.copy_from_slice(&mac.finalize().into_bytes());
    entropy
}

/// The embedded checksum: the stretched entropy must start with 0x00.
fn is_basic_seed(entropy: &[u8; 64]) -> bool {
    let mut seed = [0u8; 64];
    pbkdf2_hmac::<Sha512>(entropy, BASIC_SEED_SALT, BASIC_SEED_ROUNDS, &mut seed);
    let ok = seed[0] == 0;
    seed.zeroize();
    ok
}
