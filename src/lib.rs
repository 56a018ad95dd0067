//! FreqZone Analyzer - offline diagnostics for band-trigger logs.
//!
//! The FreqZone sketch detects threshold crossings of band-limited audio
//! energy and writes one CSV row per trigger, plus MARK rows the operator
//! inserts as reference points. This library reads those logs after the fact
//! and derives three diagnostics:
//!
//! - **Rate**: triggers per second over fixed-width time bins
//! - **Chatter**: re-triggers that land inside their own cooldown window
//! - **Recovery**: elapsed time from each MARK to the next trigger
//!
//! Every diagnostic can be grouped by condition or by (condition, band), and
//! results from many logs fold into one aggregate without the two
//! granularities contaminating each other.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FreqZone Analyzer                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────────┐   ┌────────────────┐  │
//! │  │   Log    │──▶│  Core analyses    │──▶│   Aggregate    │  │
//! │  │  Reader  │   │ rate/chatter/rec. │   │ (across logs)  │  │
//! │  └──────────┘   └───────────────────┘   └───────┬────────┘  │
//! │                                                 ▼           │
//! │  ┌──────────┐                          ┌────────────────┐   │
//! │  │ Monitor  │  (live view only)        │  Chart export  │   │
//! │  │ (OSC/UDP)│                          │    (JSON)      │   │
//! │  └──────────┘                          └────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use freqzone_analyzer::{core::Aggregate, log::read_log};
//! use std::path::Path;
//!
//! let log = read_log(Path::new("take1.csv")).expect("readable log");
//! let mut aggregate = Aggregate::new();
//! aggregate.add_log(&log);
//! ```

pub mod config;
pub mod core;
pub mod log;
pub mod receiver;
pub mod render;

// Re-export key types at crate root for convenience
pub use config::Config;
pub use core::{
    bin_rates, compute_chatter, compute_recovery, Aggregate, ChatterCounts, GroupKey, Grouping,
    RateSeries,
};
pub use log::{read_log, Marker, TriggerEvent, TriggerLog};
pub use receiver::{BandMessage, Monitor};
pub use render::{chatter_recovery_chart, rate_chart, write_chart};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
