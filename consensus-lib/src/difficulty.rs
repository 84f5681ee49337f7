//! # Difficulty Adjustment
//!
//! Decides which compact target the next block has to declare. Outside of
//! retarget boundaries the difficulty is carried over (with the testnet
//! minimum-difficulty exception); at a boundary the previous target is scaled
//! by how long the last period actually took.

use crate::chain::{BlockHeader, BlockIndex, ChainHistory};
use crate::compact::{CompactTarget, Target};
use crate::params::ConsensusParams;
use num_bigint::BigUint;

/// Targets wider than this are halved before scaling, mirroring the
/// reference node which does the arithmetic in 256 bits.
const RETARGET_SHIFT_THRESHOLD: u64 = 235;

/// Returns the compact target a block built on `prev` must declare.
///
/// `candidate` supplies the new block's timestamp and, during the legacy
/// epoch, the bits it declares. `prev` is `None` only when the candidate is
/// the genesis block.
///
/// # Panics
///
/// At a retarget boundary the chain must contain every block of the last
/// period. A history missing one of them is a caller bug and panics.
pub fn next_required_target<C: ChainHistory + ?Sized>(
    chain: &C,
    prev: Option<&BlockIndex>,
    candidate: &BlockHeader,
    params: &ConsensusParams,
) -> CompactTarget {
    let pow_limit_bits = params.pow_limit.to_compact();
    let Some(prev) = prev else {
        return pow_limit_bits;
    };

    if params.epochs.accepts_declared_bits(candidate.time) {
        return candidate.bits;
    }

    let interval = params.difficulty_adjustment_interval();
    let next_height = i64::from(prev.height) + 1;

    if next_height % interval != 0 {
        if params.no_retargeting {
            return prev.bits;
        }

        if params.allow_min_difficulty_blocks {
            // A block more than two spacings late may be mined at minimum
            // difficulty.
            if i64::from(candidate.time) > i64::from(prev.time) + 2 * params.pow_target_spacing {
                return pow_limit_bits;
            }

            // Otherwise use the last difficulty that was not such an exception.
            let mut index = prev;
            while let Some(parent) = chain.predecessor(index) {
                if i64::from(index.height) % interval == 0 || index.bits != pow_limit_bits {
                    break;
                }
                index = parent;
            }
            return index.bits;
        }

        return prev.bits;
    }

    // The first period after genesis is one block short.
    let lookback = if next_height == interval {
        interval - 1
    } else {
        interval
    };
    let first = chain
        .ancestor_back(prev, lookback as u64)
        .unwrap_or_else(|| {
            panic!(
                "chain history is missing ancestors {} blocks before height {}",
                lookback, prev.height
            )
        });

    calculate_next_work(prev, i64::from(first.time), params)
}

/// Scales `prev`'s target by the time the last retarget period took,
/// clamped to a factor of four in either direction and capped at the
/// proof-of-work limit.
pub fn calculate_next_work(
    prev: &BlockIndex,
    first_block_time: i64,
    params: &ConsensusParams,
) -> CompactTarget {
    if params.no_retargeting {
        return prev.bits;
    }

    let timespan = params.pow_target_timespan;
    let actual_timespan =
        (i64::from(prev.time) - first_block_time).clamp(timespan / 4, timespan * 4);

    let mut target = BigUint::from_bytes_be(&prev.bits.decode().value.to_be_bytes());
    let shifted = target.bits() > RETARGET_SHIFT_THRESHOLD;
    if shifted {
        target >>= 1u32;
    }
    target *= actual_timespan.unsigned_abs();
    target /= timespan.unsigned_abs();
    if shifted {
        target <<= 1u32;
    }

    let pow_limit = BigUint::from_bytes_be(&params.pow_limit.to_be_bytes());
    let new_target = if target > pow_limit {
        params.pow_limit
    } else {
        biguint_to_target(&target)
    };

    let bits = new_target.to_compact();
    tracing::debug!(
        height = prev.height + 1,
        actual_timespan,
        old_bits = %prev.bits,
        new_bits = %bits,
        "Retargeted difficulty"
    );
    bits
}

/// Callers guarantee `value` fits in 256 bits.
fn biguint_to_target(value: &BigUint) -> Target {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Target::from_be_bytes(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::test_utils::{header_on, linear_chain};
    use crate::chain::{BlockArena, BlockHash, BlockId};
    use crate::epochs::{EpochSchedule, LEGACY_CUTOVER_TIME};
    use crypto_bigint::U256;
    use proptest::prelude::*;

    const BASE_TIME: u32 = 1_600_000_000;
    const LIMIT_BITS: u32 = 0x207fffff;

    /// Bitcoin mainnet retarget rules.
    fn bitcoin_params() -> ConsensusParams {
        ConsensusParams {
            pow_limit: Target::from_be_hex(
                "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            pow_target_timespan: 14 * 24 * 60 * 60,
            pow_target_spacing: 600,
            allow_min_difficulty_blocks: false,
            no_retargeting: false,
            epochs: EpochSchedule::default(),
            ..ConsensusParams::testnet()
        }
    }

    /// Retargets every four blocks, forty seconds per period.
    fn short_params(allow_min_difficulty_blocks: bool, no_retargeting: bool) -> ConsensusParams {
        ConsensusParams {
            pow_target_timespan: 40,
            pow_target_spacing: 10,
            allow_min_difficulty_blocks,
            no_retargeting,
            ..ConsensusParams::testnet()
        }
    }

    fn index_at(height: u32, time: u32, bits: u32) -> BlockIndex {
        let (arena, _) = linear_chain(&[(time, bits)]);
        BlockIndex {
            height,
            ..arena.genesis().clone()
        }
    }

    fn next_for(arena: &BlockArena, prev: BlockId, time: u32, params: &ConsensusParams) -> u32 {
        let prev = arena.get(prev).unwrap();
        let candidate = header_on(prev.hash, time, 0x1d00ffff, 0);
        next_required_target(arena, Some(prev), &candidate, params).to_consensus()
    }

    #[test]
    fn test_genesis_uses_pow_limit() {
        let candidate = header_on(BlockHash::ZERO, BASE_TIME, 0x1d00ffff, 0);
        let (arena, _) = linear_chain(&[(BASE_TIME, LIMIT_BITS)]);
        for params in [
            ConsensusParams::mainnet(),
            ConsensusParams::testnet(),
            ConsensusParams::regtest(),
        ] {
            assert_eq!(
                next_required_target(&arena, None, &candidate, &params).to_consensus(),
                LIMIT_BITS
            );
        }
    }

    #[test]
    fn test_legacy_epoch_keeps_declared_bits() {
        let (arena, ids) = linear_chain(&[(1_500_000_000, LIMIT_BITS)]);
        let prev = arena.get(ids[0]).unwrap();

        let candidate = header_on(prev.hash, LEGACY_CUTOVER_TIME, 0x1b0404cb, 0);
        assert_eq!(
            next_required_target(&arena, Some(prev), &candidate, &ConsensusParams::testnet())
                .to_consensus(),
            0x1b0404cb
        );

        let candidate = header_on(prev.hash, LEGACY_CUTOVER_TIME + 1, 0x1b0404cb, 0);
        assert_eq!(
            next_required_target(&arena, Some(prev), &candidate, &ConsensusParams::mainnet())
                .to_consensus(),
            LIMIT_BITS
        );
    }

    #[test]
    fn test_bitcoin_retarget_vectors() {
        let params = bitcoin_params();

        let prev = index_at(32255, 1262152739, 0x1d00ffff);
        assert_eq!(
            calculate_next_work(&prev, 1261130161, &params).to_consensus(),
            0x1d00d86a
        );

        // Capped at the proof-of-work limit.
        let prev = index_at(2015, 1233061996, 0x1d00ffff);
        assert_eq!(
            calculate_next_work(&prev, 1231006505, &params).to_consensus(),
            0x1d00ffff
        );

        // Fast period, clamped to a quarter of the timespan.
        let prev = index_at(68543, 1279297671, 0x1c05a3f4);
        assert_eq!(
            calculate_next_work(&prev, 1279008237, &params).to_consensus(),
            0x1c0168fd
        );

        // Slow period, clamped to four times the timespan.
        let prev = index_at(46367, 1269211443, 0x1c387f6f);
        assert_eq!(
            calculate_next_work(&prev, 1263163443, &params).to_consensus(),
            0x1d00e1fd
        );
    }

    #[test]
    fn test_wide_targets_are_halved_first() {
        let params = ConsensusParams::testnet();
        let timespan = params.pow_target_timespan as u32;

        let prev = index_at(2015, 1000 + timespan, LIMIT_BITS);
        assert_eq!(
            calculate_next_work(&prev, 1000, &params).to_consensus(),
            LIMIT_BITS
        );

        let prev = index_at(2015, 1000 + timespan / 2, LIMIT_BITS);
        assert_eq!(
            calculate_next_work(&prev, 1000, &params).to_consensus(),
            0x203fffff
        );

        let params = short_params(false, false);
        let prev = index_at(3, 30, 0x1e0ffff0);
        assert_eq!(calculate_next_work(&prev, 0, &params).to_consensus(), 0x1e0bfff4);
    }

    #[test]
    fn test_no_retargeting_keeps_prev_bits() {
        let params = short_params(false, true);
        let prev = index_at(3, 1000, 0x1d00ffff);
        assert_eq!(
            calculate_next_work(&prev, 0, &params).to_consensus(),
            0x1d00ffff
        );
    }

    #[test]
    fn test_first_retarget_looks_back_one_block_less() {
        let params = short_params(false, false);
        let (arena, ids) = linear_chain(&[
            (BASE_TIME, 0x1d00ffff),
            (BASE_TIME + 10, 0x1d00ffff),
            (BASE_TIME + 20, 0x1d00ffff),
            (BASE_TIME + 30, 0x1d00ffff),
        ]);
        // Period measured from genesis: 30 seconds out of 40.
        assert_eq!(next_for(&arena, ids[3], BASE_TIME + 40, &params), 0x1d00bfff);
    }

    #[test]
    fn test_later_retargets_look_back_full_interval() {
        let params = short_params(false, false);
        let mut blocks = vec![(BASE_TIME, 0x1d00ffff)];
        for i in 1..8 {
            blocks.push((BASE_TIME + 10 * i, 0x1d00ffff));
        }
        // Block 3 is the first of the window; stretch the period to 1000s.
        blocks[7].0 = blocks[3].0 + 1000;
        let (arena, ids) = linear_chain(&blocks);

        assert_eq!(next_for(&arena, ids[7], BASE_TIME + 2000, &params), 0x1d03fffc);
    }

    #[test]
    fn test_mid_interval_carries_prev_bits() {
        let params = short_params(false, false);
        let (arena, ids) = linear_chain(&[(BASE_TIME, 0x1d00ffff), (BASE_TIME + 10, 0x1c7fffff)]);
        assert_eq!(next_for(&arena, ids[1], BASE_TIME + 500, &params), 0x1c7fffff);
    }

    #[test]
    fn test_min_difficulty_after_long_gap() {
        let params = short_params(true, false);
        let (arena, ids) = linear_chain(&[(BASE_TIME, 0x1d00ffff), (BASE_TIME + 10, 0x1d00ffff)]);

        assert_eq!(next_for(&arena, ids[1], BASE_TIME + 30, &params), 0x1d00ffff);
        assert_eq!(next_for(&arena, ids[1], BASE_TIME + 31, &params), LIMIT_BITS);
    }

    #[test]
    fn test_min_difficulty_walks_back_to_real_difficulty() {
        let params = short_params(true, false);
        let (arena, ids) = linear_chain(&[
            (BASE_TIME, 0x1d00ffff),
            (BASE_TIME + 10, 0x1c0fffff),
            (BASE_TIME + 40, LIMIT_BITS),
        ]);
        assert_eq!(next_for(&arena, ids[2], BASE_TIME + 45, &params), 0x1c0fffff);
    }

    #[test]
    fn test_min_difficulty_walk_stops_at_boundary() {
        let params = short_params(true, false);
        let (arena, ids) = linear_chain(&[
            (BASE_TIME, 0x1d00ffff),
            (BASE_TIME + 10, 0x1d00ffff),
            (BASE_TIME + 20, 0x1d00ffff),
            (BASE_TIME + 30, 0x1d00ffff),
            (BASE_TIME + 60, LIMIT_BITS),
            (BASE_TIME + 90, LIMIT_BITS),
        ]);
        // Height 4 sits on a boundary, so its bits are taken as they are.
        assert_eq!(next_for(&arena, ids[5], BASE_TIME + 95, &params), LIMIT_BITS);
    }

    #[test]
    fn test_no_retargeting_wins_over_min_difficulty() {
        let params = short_params(true, true);
        let (arena, ids) = linear_chain(&[(BASE_TIME, 0x1d00ffff), (BASE_TIME + 10, 0x1d00ffff)]);
        assert_eq!(next_for(&arena, ids[1], BASE_TIME + 10_000, &params), 0x1d00ffff);
    }

    #[test]
    fn test_mainnet_boundary_keeps_bits() {
        let params = ConsensusParams {
            pow_target_timespan: 40,
            pow_target_spacing: 10,
            ..ConsensusParams::mainnet()
        };
        let (arena, ids) = linear_chain(&[
            (BASE_TIME, 0x1d00ffff),
            (BASE_TIME + 1, 0x1d00ffff),
            (BASE_TIME + 2, 0x1d00ffff),
            (BASE_TIME + 3, 0x1d00ffff),
        ]);
        assert_eq!(next_for(&arena, ids[3], BASE_TIME + 4, &params), 0x1d00ffff);
    }

    struct TipOnly(BlockIndex);

    impl ChainHistory for TipOnly {
        fn block(&self, id: BlockId) -> Option<&BlockIndex> {
            (id == self.0.id).then_some(&self.0)
        }
    }

    #[test]
    #[should_panic(expected = "chain history is missing")]
    fn test_missing_ancestor_panics() {
        let params = short_params(false, false);
        let (arena, ids) = linear_chain(&[(BASE_TIME, 0x1d00ffff), (BASE_TIME + 10, 0x1d00ffff)]);
        let mut tip = arena.get(ids[1]).unwrap().clone();
        tip.height = 7;
        let history = TipOnly(tip.clone());
        let candidate = header_on(tip.hash, BASE_TIME + 20, 0x1d00ffff, 0);
        next_required_target(&history, Some(&tip), &candidate, &params);
    }

    #[test]
    fn test_concurrent_reads() {
        let params = short_params(false, false);
        let (arena, ids) = linear_chain(&[
            (BASE_TIME, 0x1d00ffff),
            (BASE_TIME + 10, 0x1d00ffff),
            (BASE_TIME + 20, 0x1d00ffff),
            (BASE_TIME + 30, 0x1d00ffff),
        ]);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| next_for(&arena, ids[3], BASE_TIME + 40, &params)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 0x1d00bfff);
            }
        });
    }

    fn decoded(bits: CompactTarget) -> U256 {
        bits.decode().value.as_u256()
    }

    proptest! {
        #[test]
        fn retarget_stays_within_bounds(
            exponent in 0x1bu32..=0x1f,
            mantissa in 0x8000u32..=0x7fffff,
            span in 0i64..3_000_000,
        ) {
            let params = ConsensusParams::testnet();
            let old = exponent << 24 | mantissa;
            let prev = index_at(2015, 1_000_000_000, old);
            let new_bits = calculate_next_work(&prev, 1_000_000_000 - span, &params);

            let old_target = decoded(CompactTarget::from_consensus(old));
            let new_target = decoded(new_bits);
            prop_assert!(new_target <= params.pow_limit.as_u256());
            prop_assert!(new_target <= old_target.wrapping_mul(&U256::from(4u64)));
            prop_assert!(new_target.wrapping_mul(&U256::from(5u64)) >= old_target);
        }
    }
}
