//! Core analyses for trigger logs.
//!
//! This module contains:
//! - Grouping keys shared by all analyses
//! - Rate binning over fixed-width time windows
//! - Chatter detection (re-triggers inside a cooldown window)
//! - Recovery estimation from MARK rows
//! - Aggregation of per-log results across many logs

pub mod aggregate;
pub mod chatter;
pub mod grouping;
pub mod rate;
pub mod recovery;

// Re-export commonly used types
pub use aggregate::Aggregate;
pub use chatter::{compute_chatter, ChatterCounts};
pub use grouping::{GroupKey, Grouping};
pub use rate::{bin_rates, RateSeries};
pub use recovery::compute_recovery;
