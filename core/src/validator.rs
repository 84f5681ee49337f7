//! # Header Validation
//!
//! Runs the consensus checks a new header must pass before it is added to
//! the block index: it must extend a known block, declare the bits the
//! difficulty rules require, meet its own target and, past the activation
//! height, come with a coinbase signed by the network signer.

use crate::errors::{CoreError, HeaderRejection};
use consensus_lib::block_signing::check_coinbase_authorization;
use consensus_lib::chain::{BlockArena, BlockHash, BlockHeader, BlockId};
use consensus_lib::difficulty::next_required_target;
use consensus_lib::params::ConsensusParams;
use consensus_lib::pow::check_proof_of_work;

#[derive(Debug, Clone, Copy)]
pub struct HeaderValidator<'a> {
    params: &'a ConsensusParams,
}

impl<'a> HeaderValidator<'a> {
    pub fn new(params: &'a ConsensusParams) -> Self {
        HeaderValidator { params }
    }

    /// Checks `header` against `chain` without modifying it and returns the
    /// header's hash.
    ///
    /// `coinbase_script_sig` is the text form of the block's coinbase input
    /// script: `<height> <extra nonce> <signature hex>`.
    pub fn validate(
        &self,
        chain: &BlockArena,
        header: &BlockHeader,
        coinbase_script_sig: &str,
    ) -> Result<BlockHash, HeaderRejection> {
        let hash = header.compute_block_hash();
        if chain.lookup(&hash).is_some() {
            return Err(HeaderRejection::Duplicate(hash));
        }

        let parent = chain
            .lookup(&header.prev_block_hash)
            .ok_or(HeaderRejection::UnknownParent(header.prev_block_hash))?;

        let expected = next_required_target(chain, Some(parent), header, self.params);
        if header.bits != expected {
            return Err(HeaderRejection::BadDifficultyBits {
                expected,
                got: header.bits,
            });
        }

        if !check_proof_of_work(&hash, header.bits, self.params, header.time) {
            return Err(HeaderRejection::HighHash(hash));
        }

        let height = parent.height + 1;
        if !check_coinbase_authorization(
            height,
            coinbase_script_sig,
            &parent.hash.to_string(),
            self.params,
        ) {
            return Err(HeaderRejection::UnauthorizedCoinbase(height));
        }

        Ok(hash)
    }

    /// Validates `header` and appends it to `chain`. Rejected headers leave
    /// the chain untouched.
    pub fn accept(
        &self,
        chain: &mut BlockArena,
        header: &BlockHeader,
        coinbase_script_sig: &str,
    ) -> Result<BlockId, CoreError> {
        let hash = match self.validate(chain, header, coinbase_script_sig) {
            Ok(hash) => hash,
            Err(rejection) => {
                tracing::warn!(
                    hash = %header.compute_block_hash(),
                    "Rejected header: {}",
                    rejection
                );
                return Err(rejection.into());
            }
        };

        let id = chain.insert(header)?;
        tracing::info!(
            %hash,
            bits = %header.bits,
            tip = %chain.tip().hash,
            "Accepted header"
        );

        Ok(id)
    }
}
