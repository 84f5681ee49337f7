//! # Proof-of-Work Validation

use crate::chain::BlockHash;
use crate::compact::CompactTarget;
use crate::params::ConsensusParams;

/// Checks that `hash` meets the target encoded in `bits`.
///
/// The target must decode to a positive value no higher than the network's
/// proof-of-work limit. When a target-reset epoch applies to `header_time`
/// (or the bits are that epoch's sentinel), both the target and the limit
/// are replaced by the epoch's reset limit first.
pub fn check_proof_of_work(
    hash: &BlockHash,
    bits: CompactTarget,
    params: &ConsensusParams,
    header_time: u32,
) -> bool {
    let decoded = bits.decode();
    let mut target = decoded.value;
    let mut limit = params.pow_limit;

    if let Some(reset_limit) = params.epochs.target_override(header_time, &decoded.value) {
        tracing::trace!(%bits, header_time, "Applying reset proof-of-work limit");
        target = reset_limit;
        limit = reset_limit;
    }

    if decoded.negative || decoded.overflow || target.is_zero() || target > limit {
        return false;
    }

    hash.to_target() <= target
}
