//! TON address parsing, formatting and normalization
//!
//! Addresses circulate in two forms: raw (`0:<64 hex>`) and
//! user-friendly (48-char base64, tag + workchain + hash + CRC-16).
//! Remote sources mix both freely, so every equality check in the
//! crate routes through [`TonAddress::parse`] / [`TonAddress::to_raw`]
//! rather than comparing strings of unknown form.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

/// Tag byte of a bounceable user-friendly address.
const TAG_BOUNCEABLE: u8 = 0x11;
/// Tag byte of a non-bounceable user-friendly address.
const TAG_NON_BOUNCEABLE: u8 = 0x51;
/// Flag bit marking a testnet-only address.
const FLAG_TESTNET: u8 = 0x80;

/// Address parse failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address has invalid length")]
    InvalidLength,

    #[error("address base64 payload is malformed")]
    InvalidBase64,

    #[error("address hex payload is malformed")]
    InvalidHex,

    #[error("address checksum mismatch")]
    InvalidChecksum,

    #[error("unknown address tag byte")]
    InvalidTag,
}

/// A workchain-qualified account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    pub workchain: i32,
    pub hash_part: [u8; 32],
}

impl TonAddress {
    pub fn new(workchain: i32, hash_part: [u8; 32]) -> Self {
        Self { workchain, hash_part }
    }

    /// Parse either form. Friendly addresses are accepted in both the
    /// url-safe and standard base64 alphabets.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();
        if input.contains(':') {
            Self::parse_raw(input)
        } else {
            Self::parse_friendly(input)
        }
    }

    fn parse_raw(input: &str) -> Result<Self, AddressError> {
        let (wc, hash_hex) = input.split_once(':').ok_or(AddressError::InvalidLength)?;
        let workchain: i32 = wc.parse().map_err(|_| AddressError::InvalidHex)?;
        let bytes = hex::decode(hash_hex).map_err(|_| AddressError::InvalidHex)?;
        let hash_part: [u8; 32] = bytes.try_into().map_err(|_| AddressError::InvalidLength)?;
        Ok(Self { workchain, hash_part })
    }

    fn parse_friendly(input: &str) -> Result<Self, AddressError> {
        if input.len() != 48 {
            return Err(AddressError::InvalidLength);
        }
        let normalized: String = input
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                c => c,
            })
            .collect();
        let bytes = URL_SAFE_NO_PAD
            .decode(normalized.as_bytes())
            .map_err(|_| AddressError::InvalidBase64)?;
        if bytes.len() != 36 {
            return Err(AddressError::InvalidLength);
        }

        let stored = u16::from_be_bytes([bytes[34], bytes[35]]);
        if crc16_xmodem(&bytes[..34]) != stored {
            return Err(AddressError::InvalidChecksum);
        }

        let tag = bytes[0] & !FLAG_TESTNET;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(AddressError::InvalidTag);
        }

        let workchain = bytes[1] as i8 as i32;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&bytes[2..34]);
        Ok(Self { workchain, hash_part })
    }

    /// Canonical raw form. This is the normalization funnel: all
    /// address comparisons in the crate compare this string.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash_part))
    }

    /// User-friendly base64url form.
    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        let mut tag = if bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if testnet {
            tag |= FLAG_TESTNET;
        }
        let mut body = Vec::with_capacity(36);
        body.push(tag);
        body.push(self.workchain as i8 as u8);
        body.extend_from_slice(&self.hash_part);
        let crc = crc16_xmodem(&body);
        body.extend_from_slice(&crc.to_be_bytes());
        URL_SAFE_NO_PAD.encode(body)
    }
}

impl std::fmt::Display for TonAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_friendly(true, false))
    }
}

impl std::str::FromStr for TonAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalize any address string to the canonical raw form; `None` when
/// it parses as neither form.
pub fn normalize(input: &str) -> Option<String> {
    TonAddress::parse(input).ok().map(|a| a.to_raw())
}

/// CRC-16/XMODEM over the tag + workchain + hash body.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut reg: u16 = 0;
    for &byte in data {
        reg ^= (byte as u16) << 8;
        for _ in 0..8 {
            reg = if reg & 0x8000 != 0 {
                (reg << 1) ^ 0x1021
            } else {
                reg << 1
            };
        }
    }
    reg
}
