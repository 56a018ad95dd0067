//! Trigger rate binning.
//!
//! Converts an event sequence into fixed-width time bins and a per-bin rate
//! in triggers per second. Bins always span from t=0, so a log whose first
//! trigger comes late has legitimate empty leading bins.

use crate::log::types::TriggerEvent;
use serde::{Deserialize, Serialize};

/// Binned trigger rate: one center and one rate per bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    /// Bin centers in seconds: (i + 0.5) * bin width
    pub bin_centers_s: Vec<f64>,
    /// Triggers per second within each bin
    pub rates_per_s: Vec<f64>,
}

impl RateSeries {
    pub fn is_empty(&self) -> bool {
        self.bin_centers_s.is_empty()
    }
}

/// Bin `events` into `bin_ms`-wide windows and compute per-bin rates.
///
/// Rates are normalized by bin width so series computed with different bin
/// widths stay comparable. Empty input (or a zero bin width, which has no
/// meaningful rate) yields an empty series. Pure function; no state survives
/// the call.
pub fn bin_rates(events: &[TriggerEvent], bin_ms: u32) -> RateSeries {
    if events.is_empty() || bin_ms == 0 {
        return RateSeries::default();
    }

    let bin_ms = f64::from(bin_ms);
    let max_t = events.iter().map(|e| e.t_ms).fold(f64::MIN, f64::max);
    let bin_count = (max_t / bin_ms).floor() as usize + 1;

    let mut counts = vec![0u64; bin_count];
    for event in events {
        let idx = (event.t_ms / bin_ms).floor() as usize;
        counts[idx] += 1;
    }

    let bin_width_s = bin_ms / 1000.0;
    RateSeries {
        bin_centers_s: (0..bin_count)
            .map(|i| (i as f64 + 0.5) * bin_width_s)
            .collect(),
        rates_per_s: counts.iter().map(|&c| c as f64 / bin_width_s).collect(),
    }
}
