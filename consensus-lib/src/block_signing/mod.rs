//! # Coinbase Block Signing
//!
//! Every block's coinbase input carries a script-sig of the form
//! `<height> <extra-nonce> <signature-hex> [...]`. The signature is a BLS
//! signature over `"<height>:<extra-nonce>:<prev-block-hash>"` made with the
//! network's designated signer key, and proves the block was authorized.
//!
//! The scheme is mcl's BLS on its BN254 curve with signatures in G1 and
//! public keys in G2. Verification checks
//! `e(signature, Q) == e(H(message), signer_key)` where `Q` is the fixed G2
//! generator.

pub mod curve;
pub mod hash_to_curve;
pub mod keys;

pub use keys::{NetworkSignerKey, PointParseError, SecretKey, Signature};

use crate::params::ConsensusParams;
use ark_ec::{pairing::Pairing, AffineRepr};
use ark_ff::Zero;
use curve::{Bn254, G2Affine};
use hash_to_curve::hash_to_g1;
use once_cell::sync::Lazy;
use thiserror::Error;

/// The G2 generator with its Miller-loop coefficients precomputed.
static G2_GENERATOR: Lazy<<Bn254 as Pairing>::G2Prepared> =
    Lazy::new(|| G2Affine::generator().into());

/// Prepares the pairing tables shared by all verifications. Calling it is
/// optional and idempotent; the first verification does it otherwise.
pub fn init() {
    Lazy::force(&G2_GENERATOR);
}

#[derive(Debug, Error, PartialEq)]
pub enum ScriptSigError {
    #[error("Coinbase script-sig has {0} tokens, expected at least 3")]
    MissingTokens(usize),
    #[error("Malformed coinbase signature: {0}")]
    Signature(#[from] PointParseError),
}

/// The message a coinbase signature commits to.
pub fn build_message(height: &str, extra_nonce: &str, prev_block_hash: &str) -> String {
    format!("{}:{}:{}", height, extra_nonce, prev_block_hash)
}

/// A parsed coinbase script-sig. Tokens after the signature are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinbaseScriptSig<'a> {
    pub height: &'a str,
    pub extra_nonce: &'a str,
    pub signature: Signature,
}

impl<'a> CoinbaseScriptSig<'a> {
    pub fn parse(script_sig: &'a str) -> Result<Self, ScriptSigError> {
        let tokens: Vec<&str> = script_sig.split(' ').collect();
        if tokens.len() < 3 {
            return Err(ScriptSigError::MissingTokens(tokens.len()));
        }

        Ok(CoinbaseScriptSig {
            height: tokens[0],
            extra_nonce: tokens[1],
            signature: tokens[2].parse()?,
        })
    }

    pub fn message(&self, prev_block_hash: &str) -> String {
        build_message(self.height, self.extra_nonce, prev_block_hash)
    }
}

impl NetworkSignerKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Some(hashed) = hash_to_g1(message) else {
            return false;
        };
        Bn254::multi_pairing(
            [*signature.point(), -hashed],
            [G2_GENERATOR.clone(), (*self.point()).into()],
        )
        .is_zero()
    }
}

impl SecretKey {
    /// Builds a complete coinbase script-sig for a block at `height` on top
    /// of `prev_block_hash`.
    pub fn sign_coinbase(
        &self,
        height: u32,
        extra_nonce: u64,
        prev_block_hash: &str,
    ) -> Option<String> {
        let height = height.to_string();
        let extra_nonce = extra_nonce.to_string();
        let message = build_message(&height, &extra_nonce, prev_block_hash);
        let signature = self.sign(message.as_bytes())?;
        Some(format!("{} {} {}", height, extra_nonce, signature))
    }
}

/// Checks that `script_sig` carries a valid signature by `signer_key` over
/// the block's height, extra nonce and `prev_block_hash`.
///
/// Malformed input of any kind yields `false`.
pub fn verify_coinbase_signature(
    script_sig: &str,
    prev_block_hash: &str,
    signer_key: &NetworkSignerKey,
) -> bool {
    let parsed = match CoinbaseScriptSig::parse(script_sig) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Rejecting coinbase script-sig: {}", e);
            return false;
        }
    };

    let message = parsed.message(prev_block_hash);
    let valid = signer_key.verify(message.as_bytes(), &parsed.signature);
    if !valid {
        tracing::debug!(%message, "Coinbase signature does not verify");
    }
    valid
}

/// Whether a block at `height` must carry a coinbase signature.
pub fn coinbase_signature_required(height: u32, params: &ConsensusParams) -> bool {
    height >= params.coinbase_signature_height
}

/// Coinbase authorization for a block at `height`: blocks below the
/// activation height pass, every other block needs a valid signature.
pub fn check_coinbase_authorization(
    height: u32,
    script_sig: &str,
    prev_block_hash: &str,
    params: &ConsensusParams,
) -> bool {
    !coinbase_signature_required(height, params)
        || verify_coinbase_signature(script_sig, prev_block_hash, &params.signer_key)
}
