use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLC price bar.
///
/// Bars are ordered by `timestamp`; the engine itself only ever uses the
/// position of a bar within its batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// True when the bar shows no price movement at all (`high == low`).
    pub fn is_flat(&self) -> bool {
        self.high == self.low
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a bar timestamp as written by quote providers and spreadsheets.
///
/// Accepted: `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM`,
/// RFC 3339 (converted to UTC wall time) and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Canonical text form used when writing bars back out.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Batch validation
// ---------------------------------------------------------------------------

/// Validate a whole batch before any computation touches it.
///
/// # Errors
/// `InvalidInput` for the first bar that has a non-finite or non-positive
/// price, violates `low <= open, close <= high`, or whose timestamp does not
/// strictly follow the previous bar's.
pub fn validate_bars(bars: &[Bar]) -> Result<(), EngineError> {
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::invalid_input(
                i,
                format!(
                    "non-finite price: open={}, high={}, low={}, close={}",
                    bar.open, bar.high, bar.low, bar.close
                ),
            ));
        }
        if prices.iter().any(|&p| p <= 0.0) {
            return Err(EngineError::invalid_input(
                i,
                format!(
                    "non-positive price: open={}, high={}, low={}, close={}",
                    bar.open, bar.high, bar.low, bar.close
                ),
            ));
        }
        if bar.low > bar.high {
            return Err(EngineError::invalid_input(
                i,
                format!("low {} above high {}", bar.low, bar.high),
            ));
        }
        if bar.open < bar.low || bar.open > bar.high || bar.close < bar.low || bar.close > bar.high
        {
            return Err(EngineError::invalid_input(
                i,
                format!(
                    "open/close outside range: low={}, high={}, open={}, close={}",
                    bar.low, bar.high, bar.open, bar.close
                ),
            ));
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(EngineError::invalid_input(
                i,
                format!(
                    "timestamp {} does not follow {}",
                    format_timestamp(&bar.timestamp),
                    format_timestamp(&bars[i - 1].timestamp)
                ),
            ));
        }
    }
    Ok(())
}
