//! # Compact Targets
//!
//! Difficulty targets are 256-bit unsigned integers, but block headers carry
//! them in a lossy 32-bit "compact" form: a one-byte size exponent followed by
//! a 23-bit mantissa and a sign bit. This module converts between the two
//! representations exactly the way the reference node does, including the
//! negative and overflow flags the decoder reports.

use borsh::{BorshDeserialize, BorshSerialize};
use crypto_bigint::{Encoding, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sign bit of the compact mantissa.
const SIGN_BIT: u32 = 0x0080_0000;
/// Mantissa bits of the compact form, without the sign bit.
const MANTISSA_MASK: u32 = 0x007f_ffff;

#[derive(Debug, Error, PartialEq)]
pub enum TargetParseError {
    #[error("Invalid target hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Target must be 32 bytes, got {0}")]
    Length(usize),
}

/// A full-precision 256-bit difficulty target.
///
/// Serialized as a 64 character big-endian hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target(U256);

impl Target {
    pub const ZERO: Target = Target(U256::ZERO);
    pub const MAX: Target = Target(U256::MAX);

    pub const fn from_u256(value: U256) -> Self {
        Target(value)
    }

    /// Builds a target from a big-endian hex literal. Panics on malformed
    /// input, so it is meant for constants.
    pub const fn from_be_hex(hex: &str) -> Self {
        Target(U256::from_be_hex(hex))
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Target(U256::from_be_bytes(bytes))
    }

    /// Interprets a block hash (stored little-endian, as on the wire) as a
    /// 256-bit integer.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Target(U256::from_le_bytes(bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Number of significant bits.
    pub fn bits(&self) -> usize {
        self.0.bits()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    /// Encodes the target in compact form, dropping everything below the
    /// three most significant bytes.
    pub fn to_compact(&self) -> CompactTarget {
        let mut size = self.0.bits().div_ceil(8);
        let mut compact = if size <= 3 {
            low_u32(&self.0) << (8 * (3 - size))
        } else {
            low_u32(&(self.0 >> (8 * (size - 3))))
        };

        // The mantissa is signed, a set sign bit would flip the meaning.
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        CompactTarget(compact | ((size as u32) << 24))
    }
}

fn low_u32(value: &U256) -> u32 {
    let bytes = value.to_be_bytes();
    u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]])
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_be_bytes()))
    }
}

impl FromStr for Target {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TargetParseError::Length(bytes.len()))?;
        Ok(Target::from_be_bytes(bytes))
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        Target::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Result of expanding a compact target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTarget {
    pub value: Target,
    pub negative: bool,
    pub overflow: bool,
}

/// The 32-bit compact encoding of a target, as found in the `bits` field of
/// a block header.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(transparent)]
pub struct CompactTarget(u32);

impl CompactTarget {
    pub const fn from_consensus(bits: u32) -> Self {
        CompactTarget(bits)
    }

    pub const fn to_consensus(self) -> u32 {
        self.0
    }

    /// Expands the compact form into a full target.
    ///
    /// `negative` is set when the sign bit is set on a non-zero mantissa,
    /// `overflow` when the value does not fit in 256 bits. Callers must treat
    /// both as invalid.
    pub fn decode(self) -> DecodedTarget {
        let size = (self.0 >> 24) as usize;
        let mut word = self.0 & MANTISSA_MASK;

        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            U256::from(word)
        } else {
            let shift = 8 * (size - 3);
            if shift >= 256 {
                U256::ZERO
            } else {
                U256::from(word) << shift
            }
        };

        let negative = word != 0 && (self.0 & SIGN_BIT) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedTarget {
            value: Target(value),
            negative,
            overflow,
        }
    }

    /// Difficulty as a multiple of the minimum difficulty `0x1d00ffff`.
    pub fn difficulty(self) -> f64 {
        let mut shift = (self.0 >> 24) & 0xff;
        let mut difficulty = f64::from(0x0000_ffff_u32) / f64::from(self.0 & 0x00ff_ffff);

        while shift < 29 {
            difficulty *= 256.0;
            shift += 1;
        }
        while shift > 29 {
            difficulty /= 256.0;
            shift -= 1;
        }

        difficulty
    }
}

impl fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<bitcoin::CompactTarget> for CompactTarget {
    fn from(bits: bitcoin::CompactTarget) -> Self {
        CompactTarget(bits.to_consensus())
    }
}

impl From<CompactTarget> for bitcoin::CompactTarget {
    fn from(bits: CompactTarget) -> Self {
        bitcoin::CompactTarget::from_consensus(bits.0)
    }
}

/// Expected number of hashes needed to find a block at `bits`, i.e.
/// `2^256 / (target + 1)`.
///
/// Negative, overflowing and zero targets carry no work.
pub fn block_proof(bits: CompactTarget) -> U256 {
    let decoded = bits.decode();
    if decoded.negative || decoded.overflow || decoded.value.is_zero() {
        return U256::ZERO;
    }

    let target = decoded.value.as_u256();
    if target == U256::MAX {
        return U256::ONE;
    }

    // 2^256 / (target + 1) == ~target / (target + 1) + 1
    (!target)
        .wrapping_div(&target.wrapping_add(&U256::ONE))
        .wrapping_add(&U256::ONE)
}
