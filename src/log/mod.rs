//! Trigger log model and CSV reader.

pub mod reader;
pub mod types;

// Re-export commonly used types
pub use reader::{parse_row, read_log, ParsedRow, ReadError, SkipReason};
pub use types::{CooldownKey, Marker, TriggerEvent, TriggerLog};
