//! # Consensus Epochs
//!
//! Historical exceptions to the difficulty and proof-of-work rules, keyed by
//! header timestamp. The chain went through a legacy period during which
//! declared bits were accepted as-is and a transition window during which the
//! PoW ceiling was lifted. Both are described as data here so that
//! [`crate::difficulty`] and [`crate::pow`] stay free of literal timestamps.

use crate::compact::{CompactTarget, Target};
use serde::{Deserialize, Serialize};

/// Last header timestamp for which declared bits are accepted unchecked.
pub const LEGACY_CUTOVER_TIME: u32 = 1530084602;
/// Exclusive lower bound of the target-reset window.
pub const RESET_WINDOW_START: u32 = 1523543406;
/// Exclusive upper bound of the target-reset window.
pub const RESET_WINDOW_END: u32 = 1555134300;
/// Compact target that triggers the reset regardless of timestamp.
pub const TRANSITION_SENTINEL: CompactTarget = CompactTarget::from_consensus(0x1e0fffff);
/// Ceiling applied while the reset is in effect.
pub const RESET_POW_LIMIT: Target =
    Target::from_be_hex("ffffff0000000000000000000000000000000000000000000000000000000000");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EpochRule {
    /// Headers with `activation_time <= time <= until` keep whatever bits
    /// they declare.
    LegacyAcceptance { until: u32 },
    /// For headers with `activation_time < time < until`, or whose bits
    /// decode to `sentinel`, both the target and the ceiling become
    /// `reset_limit`.
    TargetReset {
        until: u32,
        sentinel: CompactTarget,
        reset_limit: Target,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochEntry {
    pub activation_time: u32,
    #[serde(flatten)]
    pub rule: EpochRule,
}

impl EpochEntry {
    fn accepts_declared_bits(&self, time: u32) -> bool {
        match self.rule {
            EpochRule::LegacyAcceptance { until } => {
                self.activation_time <= time && time <= until
            }
            EpochRule::TargetReset { .. } => false,
        }
    }

    fn target_override(&self, time: u32, target: &Target) -> Option<Target> {
        match &self.rule {
            EpochRule::TargetReset {
                until,
                sentinel,
                reset_limit,
            } => {
                let in_window = self.activation_time < time && time < *until;
                (in_window || sentinel.decode().value == *target).then_some(*reset_limit)
            }
            EpochRule::LegacyAcceptance { .. } => None,
        }
    }
}

/// Epoch table, ordered by activation time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<EpochEntry>", into = "Vec<EpochEntry>")]
pub struct EpochSchedule(Vec<EpochEntry>);

impl EpochSchedule {
    pub fn new(mut entries: Vec<EpochEntry>) -> Self {
        entries.sort_by_key(|entry| entry.activation_time);
        EpochSchedule(entries)
    }

    /// The table every Flashcoin network has been running with.
    pub fn flashcoin() -> Self {
        EpochSchedule::new(vec![
            EpochEntry {
                activation_time: 0,
                rule: EpochRule::LegacyAcceptance {
                    until: LEGACY_CUTOVER_TIME,
                },
            },
            EpochEntry {
                activation_time: RESET_WINDOW_START,
                rule: EpochRule::TargetReset {
                    until: RESET_WINDOW_END,
                    sentinel: TRANSITION_SENTINEL,
                    reset_limit: RESET_POW_LIMIT,
                },
            },
        ])
    }

    pub fn entries(&self) -> &[EpochEntry] {
        &self.0
    }

    /// Whether a header stamped `time` is exempt from difficulty retargeting.
    pub fn accepts_declared_bits(&self, time: u32) -> bool {
        self.0.iter().any(|entry| entry.accepts_declared_bits(time))
    }

    /// Replacement target and ceiling for a header stamped `time` whose bits
    /// decode to `target`, if any reset applies.
    pub fn target_override(&self, time: u32, target: &Target) -> Option<Target> {
        self.0
            .iter()
            .find_map(|entry| entry.target_override(time, target))
    }
}

impl From<Vec<EpochEntry>> for EpochSchedule {
    fn from(entries: Vec<EpochEntry>) -> Self {
        EpochSchedule::new(entries)
    }
}

impl From<EpochSchedule> for Vec<EpochEntry> {
    fn from(schedule: EpochSchedule) -> Self {
        schedule.0
    }
}
