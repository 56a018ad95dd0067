//! Chatter detection.
//!
//! A trigger is chatter when it arrives sooner than its own cooldown after
//! the previous trigger with the same (condition, band). Detection always
//! runs on that pair; the caller only chooses how the counts are *reported*.
//! Coarsening the reporting key must never change what gets flagged.

use crate::core::grouping::{GroupKey, Grouping};
use crate::log::types::{CooldownKey, TriggerEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chatter and total trigger counts for one reporting key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatterCounts {
    /// Triggers that re-fired inside their cooldown window
    pub chatter: u64,
    /// All triggers reported under this key
    pub total: u64,
}

impl ChatterCounts {
    /// Chatter fraction, or `None` when there are no triggers to divide by.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.chatter as f64 / self.total as f64)
        }
    }

    /// Element-wise sum, used when folding per-log counts into an aggregate.
    pub fn merge(&mut self, other: ChatterCounts) {
        self.chatter += other.chatter;
        self.total += other.total;
    }
}

/// Count chatter and total triggers per reporting key.
///
/// Events are re-sorted by timestamp before the scan even if the caller
/// believes they are sorted. The cooldown window applied to a gap is the
/// *newer* event's `cooldown_ms`, not the previous event's.
pub fn compute_chatter(
    events: &[TriggerEvent],
    grouping: Grouping,
) -> HashMap<GroupKey, ChatterCounts> {
    let mut ordered: Vec<&TriggerEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));

    let mut counts: HashMap<GroupKey, ChatterCounts> = HashMap::new();
    let mut last_seen: HashMap<CooldownKey, f64> = HashMap::new();

    for event in ordered {
        let cooldown_key = event.cooldown_key();
        let entry = counts.entry(grouping.key_for(event)).or_default();

        if let Some(&last) = last_seen.get(&cooldown_key) {
            if event.t_ms - last < event.cooldown_ms {
                entry.chatter += 1;
            }
        }
        entry.total += 1;
        last_seen.insert(cooldown_key, event.t_ms);
    }

    counts
}
