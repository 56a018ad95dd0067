//! CSV log reader.
//!
//! Parses the comma-delimited logs the FreqZone sketch writes: an optional
//! header row, MARK rows, and ten-field trigger rows. Individual bad rows are
//! skipped, never fatal; the row parser returns an explicit [`ParsedRow`] so
//! the skip policy is a visible, testable branch. Only failing to read the
//! file at all is an error.

use crate::log::types::{Marker, TriggerEvent, TriggerLog};
use std::path::Path;

/// First field of the header row, compared case-insensitively.
const TIMESTAMP_HEADER: &str = "t_ms";

/// Second field of a marker row, compared case-insensitively.
const MARKER_SENTINEL: &str = "MARK";

/// Label used when a MARK row carries no label field.
const DEFAULT_MARKER_LABEL: &str = "mark";

/// Number of fields a trigger row must have. Extra fields are ignored.
const EVENT_FIELD_COUNT: usize = 10;

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank line
    Blank,
    /// Fewer than the ten fields a trigger row needs
    TooFewFields { found: usize },
    /// A numeric field failed to parse; carries the column name
    BadNumber { field: &'static str },
}

/// Outcome of parsing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    /// Header row, carries no data
    Header,
    /// Operator annotation; never counted as an event
    Marker(Marker),
    /// A trigger event
    Event(TriggerEvent),
    /// Tolerated bad row
    Skipped(SkipReason),
}

/// Errors from reading a log file.
#[derive(Debug)]
pub enum ReadError {
    Io(String),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ReadError {}

/// Parse a single log row.
pub fn parse_row(line: &str) -> ParsedRow {
    if line.trim().is_empty() {
        return ParsedRow::Skipped(SkipReason::Blank);
    }

    let fields: Vec<&str> = line.split(',').collect();

    if fields[0].trim().eq_ignore_ascii_case(TIMESTAMP_HEADER) {
        return ParsedRow::Header;
    }

    if fields.len() >= 2 && fields[1].trim().eq_ignore_ascii_case(MARKER_SENTINEL) {
        let t_ms = match parse_f64(fields[0], "t_ms") {
            Ok(v) => v,
            Err(reason) => return ParsedRow::Skipped(reason),
        };
        let label = fields
            .get(2)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MARKER_LABEL.to_string());
        return ParsedRow::Marker(Marker { t_ms, label });
    }

    if fields.len() < EVENT_FIELD_COUNT {
        return ParsedRow::Skipped(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }

    match parse_event(&fields) {
        Ok(event) => ParsedRow::Event(event),
        Err(reason) => ParsedRow::Skipped(reason),
    }
}

fn parse_event(fields: &[&str]) -> Result<TriggerEvent, SkipReason> {
    Ok(TriggerEvent {
        t_ms: parse_f64(fields[0], "t_ms")?,
        condition: fields[1].trim().to_string(),
        mode: fields[2].trim().to_string(),
        band: parse_u32(fields[3], "band")?,
        f_lo: parse_f64(fields[4], "f_lo")?,
        f_hi: parse_f64(fields[5], "f_hi")?,
        energy_norm: parse_f64(fields[6], "energy_norm")?,
        threshold: parse_f64(fields[7], "threshold")?,
        hysteresis: parse_f64(fields[8], "hysteresis")?,
        cooldown_ms: parse_f64(fields[9], "cooldown_ms")?,
    })
}

fn parse_f64(raw: &str, field: &'static str) -> Result<f64, SkipReason> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SkipReason::BadNumber { field })
}

fn parse_u32(raw: &str, field: &'static str) -> Result<u32, SkipReason> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| SkipReason::BadNumber { field })
}

/// Read one log file into a [`TriggerLog`].
///
/// Bad rows are dropped quietly so a single garbled line cannot take down a
/// whole analysis run; a file that cannot be read at all is an error.
pub fn read_log(path: &Path) -> Result<TriggerLog, ReadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReadError::Io(format!("{}: {e}", path.display())))?;

    let mut events = Vec::new();
    let mut markers = Vec::new();

    for line in content.lines() {
        match parse_row(line) {
            ParsedRow::Event(event) => events.push(event),
            ParsedRow::Marker(marker) => markers.push(marker),
            ParsedRow::Header | ParsedRow::Skipped(_) => {}
        }
    }

    Ok(TriggerLog::new(events, markers))
}
