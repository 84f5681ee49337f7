//! # Mining Statistics
//!
//! Estimates derived from the indexed chain, as reported to miners.

use crate::chain::{BlockIndex, ChainHistory};
use crate::params::ConsensusParams;
use crypto_bigint::Encoding;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Average network hash rate, in hashes per second, over the `lookup` blocks
/// ending at `tip`.
///
/// A non-positive `lookup` means "since the last difficulty change". The
/// window never extends past genesis. Returns zero at genesis or when every
/// block in the window carries the same timestamp.
pub fn network_hash_ps<C: ChainHistory + ?Sized>(
    chain: &C,
    tip: &BlockIndex,
    lookup: i64,
    params: &ConsensusParams,
) -> f64 {
    if tip.height == 0 {
        return 0.0;
    }

    let height = i64::from(tip.height);
    let lookup = if lookup <= 0 {
        height % params.difficulty_adjustment_interval() + 1
    } else {
        lookup
    }
    .min(height);

    let mut first = tip;
    let mut min_time = tip.time;
    let mut max_time = tip.time;
    for _ in 0..lookup {
        let Some(parent) = chain.predecessor(first) else {
            break;
        };
        first = parent;
        min_time = min_time.min(first.time);
        max_time = max_time.max(first.time);
    }

    if min_time == max_time {
        return 0.0;
    }

    let work = tip.chain_work.wrapping_sub(&first.chain_work);
    let work = BigUint::from_bytes_be(&work.to_be_bytes())
        .to_f64()
        .unwrap_or(f64::MAX);

    work / f64::from(max_time - min_time)
}
