//! Multi-log aggregation.
//!
//! Folds per-log chatter counts, recovery samples, and per-key event
//! collections across any number of logs into running totals, kept at both
//! granularities side by side. The two granularities stay independent; they
//! are never merged into each other. Combination is a plain sum/concatenate,
//! so the fold is deterministic and order-independent.

use crate::core::chatter::{compute_chatter, ChatterCounts};
use crate::core::grouping::{GroupKey, Grouping};
use crate::core::recovery::compute_recovery;
use crate::log::types::{TriggerEvent, TriggerLog};
use std::collections::HashMap;

/// Combined analysis inputs and results across all logs seen so far.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Chatter totals grouped by condition
    pub chatter_by_condition: HashMap<GroupKey, ChatterCounts>,
    /// Chatter totals grouped by (condition, band)
    pub chatter_by_band: HashMap<GroupKey, ChatterCounts>,
    /// Recovery samples grouped by condition
    pub recovery_by_condition: HashMap<GroupKey, Vec<f64>>,
    /// Recovery samples grouped by (condition, band)
    pub recovery_by_band: HashMap<GroupKey, Vec<f64>>,
    /// Events pooled per condition, later fed to the rate binner per key
    pub events_by_condition: HashMap<GroupKey, Vec<TriggerEvent>>,
    /// Events pooled per (condition, band)
    pub events_by_band: HashMap<GroupKey, Vec<TriggerEvent>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one log's events, chatter, and recovery into the running totals.
    pub fn add_log(&mut self, log: &TriggerLog) {
        for event in log.events() {
            self.events_by_condition
                .entry(Grouping::Condition.key_for(event))
                .or_default()
                .push(event.clone());
            self.events_by_band
                .entry(Grouping::ConditionBand.key_for(event))
                .or_default()
                .push(event.clone());
        }

        merge_chatter(
            &mut self.chatter_by_condition,
            compute_chatter(log.events(), Grouping::Condition),
        );
        merge_chatter(
            &mut self.chatter_by_band,
            compute_chatter(log.events(), Grouping::ConditionBand),
        );

        merge_recovery(
            &mut self.recovery_by_condition,
            compute_recovery(log.markers(), log.events(), Grouping::Condition),
        );
        merge_recovery(
            &mut self.recovery_by_band,
            compute_recovery(log.markers(), log.events(), Grouping::ConditionBand),
        );
    }
}

/// Element-wise sum per key. Keys absent from `from` are left untouched, so
/// no key can appear in the aggregate with counts it never earned.
fn merge_chatter(
    into: &mut HashMap<GroupKey, ChatterCounts>,
    from: HashMap<GroupKey, ChatterCounts>,
) {
    for (key, counts) in from {
        into.entry(key).or_default().merge(counts);
    }
}

/// List concatenation per key.
fn merge_recovery(into: &mut HashMap<GroupKey, Vec<f64>>, from: HashMap<GroupKey, Vec<f64>>) {
    for (key, samples) in from {
        into.entry(key).or_default().extend(samples);
    }
}
