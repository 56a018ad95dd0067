//! Chart data export.
//!
//! Plot drawing is an external concern; this module serializes everything a
//! plotting step needs into JSON documents, one per figure. Each document
//! carries producer metadata so a chart can be traced back to the run that
//! generated it.

use crate::core::chatter::ChatterCounts;
use crate::core::grouping::GroupKey;
use crate::core::rate::{bin_rates, RateSeries};
use crate::log::types::TriggerEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Max, Min, OrderStatistics, Statistics};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// The name written into every chart document.
pub const PRODUCER_NAME: &str = "freqzone-analyzer";

/// Note written into a chatter/recovery chart that has no recovery samples,
/// so a renderer can show a placeholder instead of an empty box plot.
pub const NO_MARKS_NOTE: &str = "No MARK rows found";

/// Who produced a chart document and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Uuid shared by every document of one analysis run
    pub run_id: String,
    pub generated_at_utc: String,
}

impl Producer {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: run_id.to_string(),
            generated_at_utc: Utc::now().to_rfc3339(),
        }
    }
}

/// One labelled rate line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateChartSeries {
    pub label: String,
    #[serde(flatten)]
    pub series: RateSeries,
}

/// Trigger-rate-over-time figure: one series per grouping key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateChart {
    pub producer: Producer,
    pub bin_ms: u32,
    pub series: Vec<RateChartSeries>,
}

/// One chatter bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatterBar {
    pub label: String,
    pub chatter: u64,
    pub total: u64,
    /// Absent when `total` is zero
    pub ratio: Option<f64>,
}

/// Distribution summary of one key's recovery samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySummary {
    pub count: usize,
    pub mean_s: f64,
    pub min_s: f64,
    pub p5_s: f64,
    pub median_s: f64,
    pub p95_s: f64,
    pub max_s: f64,
}

/// One recovery box: raw samples plus the summary a box plot needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryBox {
    pub label: String,
    pub samples_s: Vec<f64>,
    /// Absent when the key has no samples
    pub summary: Option<RecoverySummary>,
}

/// Combined chatter + recovery figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatterRecoveryChart {
    pub producer: Producer,
    pub bars: Vec<ChatterBar>,
    pub recovery: Vec<RecoveryBox>,
    /// Set when there are no recovery samples at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Errors from writing chart documents.
#[derive(Debug)]
pub enum RenderError {
    Io(String),
    Serialize(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "IO error: {e}"),
            RenderError::Serialize(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Build the rate figure for one granularity. Keys with no events produce no
/// series. Series are ordered by label so reruns emit identical documents.
pub fn rate_chart(
    events_by_key: &HashMap<GroupKey, Vec<TriggerEvent>>,
    bin_ms: u32,
    producer: Producer,
) -> RateChart {
    let mut keys: Vec<&GroupKey> = events_by_key.keys().collect();
    keys.sort();

    let series = keys
        .into_iter()
        .filter_map(|key| {
            let series = bin_rates(&events_by_key[key], bin_ms);
            if series.is_empty() {
                None
            } else {
                Some(RateChartSeries {
                    label: key.to_string(),
                    series,
                })
            }
        })
        .collect();

    RateChart {
        producer,
        bin_ms,
        series,
    }
}

/// Build the chatter + recovery figure for one granularity. The label axis is
/// the union of chatter and recovery keys, like the reference figures, so a
/// key with chatter but no marks still gets a (sample-less) box slot.
pub fn chatter_recovery_chart(
    chatter: &HashMap<GroupKey, ChatterCounts>,
    recovery: &HashMap<GroupKey, Vec<f64>>,
    producer: Producer,
) -> ChatterRecoveryChart {
    let mut keys: Vec<&GroupKey> = chatter.keys().chain(recovery.keys()).collect();
    keys.sort();
    keys.dedup();

    let bars = keys
        .iter()
        .map(|&key| {
            let counts = chatter.get(key).copied().unwrap_or_default();
            ChatterBar {
                label: key.to_string(),
                chatter: counts.chatter,
                total: counts.total,
                ratio: counts.ratio(),
            }
        })
        .collect();

    let any_samples = recovery.values().any(|samples| !samples.is_empty());
    let boxes = if any_samples {
        keys.iter()
            .map(|&key| {
                let samples = recovery.get(key).cloned().unwrap_or_default();
                RecoveryBox {
                    label: key.to_string(),
                    summary: recovery_summary(&samples),
                    samples_s: samples,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    ChatterRecoveryChart {
        producer,
        bars,
        recovery: boxes,
        note: if any_samples {
            None
        } else {
            Some(NO_MARKS_NOTE.to_string())
        },
    }
}

/// Summarize one key's recovery distribution. Whiskers at the 5th and 95th
/// percentiles, matching the reference box plots.
fn recovery_summary(samples: &[f64]) -> Option<RecoverySummary> {
    if samples.is_empty() {
        return None;
    }

    let mut data = Data::new(samples.to_vec());
    Some(RecoverySummary {
        count: samples.len(),
        mean_s: Statistics::mean(samples),
        min_s: data.min(),
        p5_s: data.percentile(5),
        median_s: data.median(),
        p95_s: data.percentile(95),
        max_s: data.max(),
    })
}

/// Serialize a chart document to pretty JSON at `path`.
pub fn write_chart<T: Serialize>(chart: &T, path: &Path) -> Result<(), RenderError> {
    let json =
        serde_json::to_string_pretty(chart).map_err(|e| RenderError::Serialize(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| RenderError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(t_ms: f64, condition: &str, band: u32) -> TriggerEvent {
        TriggerEvent {
            t_ms,
            condition: condition.to_string(),
            mode: String::new(),
            band,
            f_lo: 100.0,
            f_hi: 200.0,
            energy_norm: 0.5,
            threshold: 0.4,
            hysteresis: 0.1,
            cooldown_ms: 500.0,
        }
    }

    fn producer() -> Producer {
        Producer::new(Uuid::new_v4())
    }

    #[test]
    fn test_rate_chart_orders_series_by_label() {
        let mut events_by_key = HashMap::new();
        events_by_key.insert(
            GroupKey::Condition("snare".to_string()),
            vec![event(0.0, "snare", 0)],
        );
        events_by_key.insert(
            GroupKey::Condition("kick".to_string()),
            vec![event(0.0, "kick", 0)],
        );

        let chart = rate_chart(&events_by_key, 1000, producer());
        let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["kick", "snare"]);
    }

    #[test]
    fn test_recovery_summary_statistics() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let summary = recovery_summary(&samples).unwrap();

        assert_eq!(summary.count, 5);
        assert!((summary.mean_s - 0.3).abs() < 1e-9);
        assert!((summary.median_s - 0.3).abs() < 1e-9);
        assert_eq!(summary.min_s, 0.1);
        assert_eq!(summary.max_s, 0.5);
        assert!(summary.p5_s <= summary.median_s);
        assert!(summary.p95_s >= summary.median_s);
    }

    #[test]
    fn test_no_marks_yields_placeholder_note() {
        let mut chatter = HashMap::new();
        chatter.insert(
            GroupKey::Condition("kick".to_string()),
            ChatterCounts {
                chatter: 1,
                total: 4,
            },
        );

        let chart = chatter_recovery_chart(&chatter, &HashMap::new(), producer());
        assert!(chart.recovery.is_empty());
        assert_eq!(chart.note.as_deref(), Some(NO_MARKS_NOTE));
        assert_eq!(chart.bars.len(), 1);
        assert_eq!(chart.bars[0].ratio, Some(0.25));
    }

    #[test]
    fn test_label_axis_is_the_union_of_keys() {
        let mut chatter = HashMap::new();
        chatter.insert(
            GroupKey::Condition("kick".to_string()),
            ChatterCounts {
                chatter: 0,
                total: 2,
            },
        );
        let mut recovery = HashMap::new();
        recovery.insert(GroupKey::Condition("snare".to_string()), vec![0.5]);

        let chart = chatter_recovery_chart(&chatter, &recovery, producer());
        let bar_labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(bar_labels, vec!["kick", "snare"]);

        // "kick" has no samples but still holds a slot on the shared axis.
        assert_eq!(chart.recovery.len(), 2);
        assert!(chart.recovery[0].summary.is_none());
        assert!(chart.recovery[1].summary.is_some());
        // A bar with no triggers reported under it keeps ratio absent
        // rather than dividing by zero.
        assert_eq!(chart.bars[1].total, 0);
        assert_eq!(chart.bars[1].ratio, None);
    }

    #[test]
    fn test_write_chart_round_trips() {
        let mut events_by_key = HashMap::new();
        events_by_key.insert(
            GroupKey::ConditionBand("kick".to_string(), 0),
            vec![event(0.0, "kick", 0), event(2500.0, "kick", 0)],
        );
        let chart = rate_chart(&events_by_key, 1000, producer());

        let path =
            std::env::temp_dir().join(format!("fz-render-test-{}.json", std::process::id()));
        write_chart(&chart, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: RateChart = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.bin_ms, 1000);
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.series[0].label, "kick (band 0)");
        assert_eq!(parsed.series[0].series.bin_centers_s.len(), 3);

        let _ = std::fs::remove_file(&path);
    }
}
