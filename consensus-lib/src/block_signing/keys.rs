//! Key and signature encodings, byte-compatible with mcl's serialization.
//!
//! Coordinates are 32-byte little-endian field elements and points are
//! compressed: a signature is the `x` of its G1 point, a public key is
//! `x.c0 || x.c1` of its G2 point. The top bit of the last byte holds the
//! parity of `y` (of `y.c1` in G2). The point at infinity is all zeros.
//! Secret keys are 32-byte little-endian scalars.

use super::curve::{g1, g2, Fq, Fq2, Fr, G1Affine, G2Affine};
use super::hash_to_curve::hash_to_g1;
use ark_ec::short_weierstrass::SWCurveConfig;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInt, BigInteger, Field, PrimeField, Zero};
use ark_std::{rand::Rng, UniformRand};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SIGNATURE_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 64;
pub const SECRET_KEY_LEN: usize = 32;

/// Set in the last byte of an encoded point when `y` is odd.
const Y_PARITY_FLAG: u8 = 0x80;

#[derive(Debug, Error, PartialEq)]
pub enum PointParseError {
    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("Coordinate is not a canonical field element")]
    NonCanonical,
    #[error("Point is not on the curve")]
    NotOnCurve,
    #[error("Point is not in the prime-order subgroup")]
    NotInSubgroup,
    #[error("Signer key is the point at infinity")]
    Identity,
    #[error("Secret key must be a non-zero scalar below the group order")]
    InvalidScalar,
}

fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], PointParseError> {
    let bytes = hex::decode(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| PointParseError::Length {
            expected: N,
            actual: bytes.len(),
        })
}

/// Reads a little-endian field element, `None` unless it is below the
/// modulus.
pub(super) fn field_from_le<F: PrimeField<BigInt = BigInt<4>>>(bytes: &[u8]) -> Option<F> {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks(8)) {
        *limb = chunk
            .iter()
            .rev()
            .fold(0, |acc, byte| (acc << 8) | u64::from(*byte));
    }
    F::from_bigint(BigInt::new(limbs))
}

fn fq_to_le(value: &Fq) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&value.into_bigint().to_bytes_le());
    out
}

fn is_odd(value: &Fq) -> bool {
    value.into_bigint().is_odd()
}

/// Clears the parity flag and returns it.
fn take_parity<const N: usize>(bytes: &mut [u8; N]) -> bool {
    let odd = bytes[N - 1] & Y_PARITY_FLAG != 0;
    bytes[N - 1] &= !Y_PARITY_FLAG;
    odd
}

/// A coinbase signature: a point in G1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(G1Affine);

impl Signature {
    pub(crate) fn from_point(point: G1Affine) -> Self {
        Signature(point)
    }

    pub fn point(&self) -> &G1Affine {
        &self.0
    }

    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Result<Self, PointParseError> {
        if bytes.iter().all(|byte| *byte == 0) {
            return Ok(Signature(G1Affine::identity()));
        }

        let mut bytes = *bytes;
        let odd = take_parity(&mut bytes);
        let x: Fq = field_from_le(&bytes).ok_or(PointParseError::NonCanonical)?;
        let y = (x.square() * x + g1::Config::COEFF_B)
            .sqrt()
            .ok_or(PointParseError::NotOnCurve)?;
        let y = if is_odd(&y) == odd { y } else { -y };

        // E(Fq) has prime order, so every point is in the subgroup.
        Ok(Signature(G1Affine::new_unchecked(x, y)))
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        if self.0.is_zero() {
            return [0u8; SIGNATURE_LEN];
        }
        let mut out = fq_to_le(&self.0.x);
        if is_odd(&self.0.y) {
            out[SIGNATURE_LEN - 1] |= Y_PARITY_FLAG;
        }
        out
    }
}

impl FromStr for Signature {
    type Err = PointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::from_bytes(&decode_hex::<SIGNATURE_LEN>(s)?)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

/// The network's designated coinbase signer, a point in G2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSignerKey(G2Affine);

impl NetworkSignerKey {
    pub fn point(&self) -> &G2Affine {
        &self.0
    }

    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LEN]) -> Result<Self, PointParseError> {
        if bytes.iter().all(|byte| *byte == 0) {
            return Err(PointParseError::Identity);
        }

        let mut bytes = *bytes;
        let odd = take_parity(&mut bytes);
        let x = Fq2::new(
            field_from_le(&bytes[..32]).ok_or(PointParseError::NonCanonical)?,
            field_from_le(&bytes[32..]).ok_or(PointParseError::NonCanonical)?,
        );
        let y = (x.square() * x + g2::Config::COEFF_B)
            .sqrt()
            .ok_or(PointParseError::NotOnCurve)?;
        let y = if is_odd(&y.c1) == odd { y } else { -y };
        if is_odd(&y.c1) != odd {
            return Err(PointParseError::NonCanonical);
        }

        let point = G2Affine::new_unchecked(x, y);
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(PointParseError::NotInSubgroup);
        }

        Ok(NetworkSignerKey(point))
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out[..32].copy_from_slice(&fq_to_le(&self.0.x.c0));
        out[32..].copy_from_slice(&fq_to_le(&self.0.x.c1));
        if is_odd(&self.0.y.c1) {
            out[PUBLIC_KEY_LEN - 1] |= Y_PARITY_FLAG;
        }
        out
    }
}

impl FromStr for NetworkSignerKey {
    type Err = PointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkSignerKey::from_bytes(&decode_hex::<PUBLIC_KEY_LEN>(s)?)
    }
}

impl fmt::Display for NetworkSignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl Serialize for NetworkSignerKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NetworkSignerKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        NetworkSignerKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Signing key of the coinbase signer. Only mining tools hold one.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Fr);

impl SecretKey {
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LEN]) -> Result<Self, PointParseError> {
        match field_from_le::<Fr>(bytes) {
            Some(scalar) if !scalar.is_zero() => Ok(SecretKey(scalar)),
            _ => Err(PointParseError::InvalidScalar),
        }
    }

    pub fn from_hex(s: &str) -> Result<Self, PointParseError> {
        SecretKey::from_bytes(&decode_hex::<SECRET_KEY_LEN>(s)?)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let scalar = Fr::rand(rng);
            if !scalar.is_zero() {
                return SecretKey(scalar);
            }
        }
    }

    pub fn public_key(&self) -> NetworkSignerKey {
        NetworkSignerKey((G2Affine::generator() * self.0).into_affine())
    }

    /// Signs `message`. Returns `None` if the message does not hash onto
    /// the curve.
    pub fn sign(&self, message: &[u8]) -> Option<Signature> {
        let hashed = hash_to_g1(message)?;
        Some(Signature((hashed * self.0).into_affine()))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}
