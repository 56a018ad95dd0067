//! Value types for trigger logs.
//!
//! A log is one CSV file written by the FreqZone sketch: one row per band
//! trigger, plus optional MARK rows inserted by the operator. Everything here
//! is immutable once constructed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One detected trigger: a band energy measurement that crossed its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Timestamp in milliseconds since the start of the log
    pub t_ms: f64,
    /// Label of the trigger rule that fired (e.g. a named detector state)
    pub condition: String,
    /// Auxiliary label; carried through but never used for grouping
    pub mode: String,
    /// Frequency band index
    pub band: u32,
    /// Lower frequency bound in Hz
    pub f_lo: f64,
    /// Upper frequency bound in Hz
    pub f_hi: f64,
    /// Normalized band energy at trigger time
    pub energy_norm: f64,
    /// Threshold the energy crossed
    pub threshold: f64,
    /// Hysteresis applied around the threshold
    pub hysteresis: f64,
    /// Cooldown in milliseconds. This is the window during which a *following*
    /// trigger of the same (condition, band) counts as chatter; the check
    /// always reads this field from the newer event of the pair.
    pub cooldown_ms: f64,
}

impl TriggerEvent {
    /// The key chatter detection operates on. Chatter is decided strictly
    /// within one (condition, band) pair, regardless of how results are
    /// grouped for reporting.
    pub fn cooldown_key(&self) -> CooldownKey {
        CooldownKey {
            condition: self.condition.clone(),
            band: self.band,
        }
    }
}

/// The (condition, band) pair that scopes cooldown tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub condition: String,
    pub band: u32,
}

/// An operator-inserted timestamp annotation. Markers are not triggers and
/// never participate in chatter detection; they anchor recovery measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Timestamp in milliseconds since the start of the log
    pub t_ms: f64,
    /// Free-text label from the MARK row
    pub label: String,
}

/// In-memory view of one log file: events and markers, each sorted ascending
/// by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerLog {
    events: Vec<TriggerEvent>,
    markers: Vec<Marker>,
}

impl TriggerLog {
    /// Build a log from unordered events and markers. Both sequences are
    /// sorted here once; the log is read-only afterwards.
    pub fn new(mut events: Vec<TriggerEvent>, mut markers: Vec<Marker>) -> Self {
        events.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));
        markers.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));
        Self { events, markers }
    }

    /// Events in ascending timestamp order.
    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    /// Markers in ascending timestamp order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The distinct condition labels present in the event sequence.
    pub fn conditions(&self) -> BTreeSet<&str> {
        self.events.iter().map(|e| e.condition.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(t_ms: f64, condition: &str, band: u32, cooldown_ms: f64) -> TriggerEvent {
        TriggerEvent {
            t_ms,
            condition: condition.to_string(),
            mode: "sustain".to_string(),
            band,
            f_lo: 100.0,
            f_hi: 200.0,
            energy_norm: 0.5,
            threshold: 0.4,
            hysteresis: 0.1,
            cooldown_ms,
        }
    }

    #[test]
    fn test_log_sorts_on_construction() {
        let events = vec![
            event(900.0, "C", 0, 500.0),
            event(0.0, "C", 0, 500.0),
            event(300.0, "C", 0, 500.0),
        ];
        let markers = vec![
            Marker {
                t_ms: 500.0,
                label: "b".to_string(),
            },
            Marker {
                t_ms: 100.0,
                label: "a".to_string(),
            },
        ];

        let log = TriggerLog::new(events, markers);

        let times: Vec<f64> = log.events().iter().map(|e| e.t_ms).collect();
        assert_eq!(times, vec![0.0, 300.0, 900.0]);
        assert_eq!(log.markers()[0].label, "a");
    }

    #[test]
    fn test_conditions_are_distinct() {
        let log = TriggerLog::new(
            vec![
                event(0.0, "kick", 0, 100.0),
                event(10.0, "kick", 1, 100.0),
                event(20.0, "hat", 2, 100.0),
            ],
            Vec::new(),
        );

        let conditions = log.conditions();
        assert_eq!(conditions.len(), 2);
        assert!(conditions.contains("kick"));
        assert!(conditions.contains("hat"));
    }

    #[test]
    fn test_cooldown_key_ignores_mode() {
        let mut a = event(0.0, "kick", 3, 100.0);
        let mut b = event(50.0, "kick", 3, 100.0);
        a.mode = "sustain".to_string();
        b.mode = "retrigger".to_string();
        assert_eq!(a.cooldown_key(), b.cooldown_key());
    }
}
