//! Reporting granularity for the analyses.
//!
//! Every metric can be grouped two ways: by condition alone, or by
//! (condition, band). Only these two are ever used, so the selector is a
//! plain enum rather than a generic key function.

use crate::log::types::TriggerEvent;
use std::fmt;

/// Caller-chosen reporting granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Group by condition label only
    Condition,
    /// Group by (condition, band) pair
    ConditionBand,
}

impl Grouping {
    /// The reporting key for an event under this granularity.
    pub fn key_for(self, event: &TriggerEvent) -> GroupKey {
        match self {
            Grouping::Condition => GroupKey::Condition(event.condition.clone()),
            Grouping::ConditionBand => {
                GroupKey::ConditionBand(event.condition.clone(), event.band)
            }
        }
    }
}

/// A concrete reporting key. Note this is distinct from the cooldown key:
/// chatter detection always runs per (condition, band) no matter how coarse
/// the reporting key is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Condition(String),
    ConditionBand(String, u32),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Condition(condition) => write!(f, "{condition}"),
            GroupKey::ConditionBand(condition, band) => {
                write!(f, "{condition} (band {band})")
            }
        }
    }
}
