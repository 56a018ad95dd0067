//! Recovery time estimation.
//!
//! For each MARK the estimator finds, per reporting key, the earliest trigger
//! at or after the mark and records the elapsed time in seconds. The search
//! runs independently for every key: one mark may contribute a sample to
//! several keys when each of them has a future trigger. Keys with no
//! qualifying trigger contribute nothing for that mark.

use crate::core::grouping::{GroupKey, Grouping};
use crate::log::types::{Marker, TriggerEvent};
use std::collections::HashMap;

/// Recovery times in seconds from each marker to the next trigger, grouped by
/// the chosen reporting key. Empty markers or events yield an empty map.
pub fn compute_recovery(
    markers: &[Marker],
    events: &[TriggerEvent],
    grouping: Grouping,
) -> HashMap<GroupKey, Vec<f64>> {
    if markers.is_empty() || events.is_empty() {
        return HashMap::new();
    }

    let mut times_by_key: HashMap<GroupKey, Vec<f64>> = HashMap::new();
    let mut ordered: Vec<&TriggerEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));
    for event in ordered {
        times_by_key
            .entry(grouping.key_for(event))
            .or_default()
            .push(event.t_ms);
    }

    let mut recovery: HashMap<GroupKey, Vec<f64>> = HashMap::new();
    for marker in markers {
        for (key, times) in &times_by_key {
            // First trigger with t >= marker t; an exact tie is a valid
            // zero-time recovery.
            let idx = times.partition_point(|&t| t < marker.t_ms);
            if let Some(&next_t) = times.get(idx) {
                recovery
                    .entry(key.clone())
                    .or_default()
                    .push((next_t - marker.t_ms) / 1000.0);
            }
        }
    }

    recovery
}
