//! Minimal TON cell construction
//!
//! Just enough of the cell model to assemble a wallet contract's
//! StateInit and take its representation hash: ordinary cells, bit-level
//! writes, up to four references. Exotic cells and BOC (de)serialization
//! are not needed for address derivation.

use sha2::{Digest, Sha256};

/// Maximum payload bits of an ordinary cell.
pub const MAX_BITS: usize = 1023;

/// Maximum references of an ordinary cell.
pub const MAX_REFS: usize = 4;

/// An immutable cell with its representation hash and depth fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Cell {
    hash: [u8; 32],
    depth: u16,
}

impl Cell {
    /// Wrap a compiled artifact known only by its representation hash
    /// and depth (e.g. a wallet contract's code cell). The parent's
    /// hash needs nothing else from the child.
    pub fn precomputed(hash: [u8; 32], depth: u16) -> Self {
        Self { hash, depth }
    }

    /// Standard representation hash of the cell.
    pub fn repr_hash(&self) -> [u8; 32] {
        self.hash
    }

    /// Depth of the subtree rooted at this cell.
    pub fn depth(&self) -> u16 {
        self.depth
    }
}

/// Builder accumulating bits and references for one ordinary cell.
#[derive(Debug, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit.
    pub fn store_bit(&mut self, bit: bool) -> &mut Self {
        assert!(self.bit_len < MAX_BITS, "cell payload overflow");
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let idx = self.bit_len / 8;
            self.data[idx] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
        self
    }

    /// Append a big-endian 32-bit integer.
    pub fn store_u32(&mut self, value: u32) -> &mut Self {
        for i in (0..32).rev() {
            self.store_bit((value >> i) & 1 == 1);
        }
        self
    }

    /// Append whole bytes, bit-aligned or not.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if self.bit_len % 8 == 0 {
            assert!(self.bit_len + bytes.len() * 8 <= MAX_BITS, "cell payload overflow");
            self.data.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
        } else {
            for byte in bytes {
                for i in (0..8).rev() {
                    self.store_bit((byte >> i) & 1 == 1);
                }
            }
        }
        self
    }

    /// Attach a child cell.
    pub fn store_ref(&mut self, cell: Cell) -> &mut Self {
        assert!(self.refs.len() < MAX_REFS, "cell reference overflow");
        self.refs.push(cell);
        self
    }

    /// Finalize into an immutable cell, computing depth and the
    /// representation hash: `d1 d2 payload [ref depths] [ref hashes]`
    /// through SHA-256, with the payload padded by a completion tag
    /// when the bit count is not byte-aligned.
    pub fn build(self) -> Cell {
        let depth = self
            .refs
            .iter()
            .map(|r| r.depth)
            .max()
            .map_or(0, |d| d + 1);

        let d1 = self.refs.len() as u8;
        let d2 = (self.bit_len / 8 + (self.bit_len + 7) / 8) as u8;

        let mut payload = self.data.clone();
        if self.bit_len % 8 != 0 {
            let last = payload.len() - 1;
            payload[last] |= 0x80 >> (self.bit_len % 8);
        }

        let mut repr = Vec::with_capacity(2 + payload.len() + self.refs.len() * 34);
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&payload);
        for r in &self.refs {
            repr.extend_from_slice(&r.depth.to_be_bytes());
        }
        for r in &self.refs {
            repr.extend_from_slice(&r.hash);
        }

        let hash: [u8; 32] = Sha256::digest(&repr).into();
        Cell { hash, depth }
    }
}
