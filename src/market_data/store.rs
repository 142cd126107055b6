// =============================================================================
// Bar Store: CSV persistence for bar batches
// =============================================================================
//
// Files carry a header row; columns are located by name so provider exports
// with extra columns (or in a different order) load unchanged.
// =============================================================================

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{Reader, StringRecord, Writer};
use tracing::{debug, info};

use super::bar::{format_timestamp, parse_timestamp, Bar};

/// Column positions resolved from a header row.
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| find(name).with_context(|| format!("missing `{name}` column"));

        Ok(Self {
            timestamp: require("timestamp")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

fn parse_price(record: &StringRecord, idx: usize, name: &str, line: usize) -> Result<f64> {
    let raw = record
        .get(idx)
        .with_context(|| format!("row {line}: missing {name}"))?;
    raw.trim()
        .parse()
        .with_context(|| format!("row {line}: failed to parse {name} `{raw}`"))
}

/// Read bars from any CSV source.
///
/// Rows come back in file order; ordering is checked later by the engine.
pub fn read_bars<R: Read>(source: R) -> Result<Vec<Bar>> {
    let mut reader = Reader::from_reader(source);
    let header = reader.headers().context("failed to read CSV header")?.clone();
    let cols = Columns::from_header(&header)?;

    let mut bars = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = result.with_context(|| format!("row {line}: malformed CSV record"))?;

        let raw_ts = record
            .get(cols.timestamp)
            .with_context(|| format!("row {line}: missing timestamp"))?;
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            bail!("row {line}: unrecognised timestamp `{raw_ts}`");
        };

        let mut bar = Bar::new(
            timestamp,
            parse_price(&record, cols.open, "open", line)?,
            parse_price(&record, cols.high, "high", line)?,
            parse_price(&record, cols.low, "low", line)?,
            parse_price(&record, cols.close, "close", line)?,
        );
        if let Some(idx) = cols.volume {
            if let Some(raw) = record.get(idx).filter(|s| !s.trim().is_empty()) {
                let volume = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("row {line}: failed to parse volume `{raw}`"))?;
                bar = bar.with_volume(volume);
            }
        }
        bars.push(bar);
    }

    debug!(count = bars.len(), "bars parsed from CSV");
    Ok(bars)
}

/// Write bars as `timestamp,open,high,low,close,volume`.
pub fn write_bars<W: Write>(sink: W, bars: &[Bar]) -> Result<()> {
    let mut writer = Writer::from_writer(sink);
    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;

    for bar in bars {
        writer.write_record([
            format_timestamp(&bar.timestamp),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush().context("failed to flush bar CSV")?;
    Ok(())
}

/// Load a bar file from disk.
pub fn load_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let bars = read_bars(file).with_context(|| format!("failed to load bars from {}", path.display()))?;
    info!(path = %path.display(), count = bars.len(), "bar file loaded");
    Ok(bars)
}

/// Save a bar file to disk, creating parent directories as needed.
pub fn save_bars(path: impl AsRef<Path>, bars: &[Bar]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_bars(file, bars)?;
    info!(path = %path.display(), count = bars.len(), "bar file saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::test_support::{bar, minute};

    #[test]
    fn reads_provider_layout_with_reordered_columns() {
        let csv = "\
timestamp,close,open,high,low,volume,dividend
2024-01-02 09:30:00,101.5,100.0,102.0,99.5,1200,0
2024-01-02 09:31:00,102.0,101.5,102.5,101.0,900,0
";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, minute(0));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 101.5);
        assert_eq!(bars[1].low, 101.0);
        assert_eq!(bars[1].volume, Some(900.0));
    }

    #[test]
    fn volume_column_is_optional() {
        let csv = "timestamp,open,high,low,close\n2024-01-02,10,11,9,10.5\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "timestamp,open,high,close\n2024-01-02,10,11,10.5\n";
        let err = read_bars(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("low"));
    }

    #[test]
    fn bad_number_reports_row() {
        let csv = "timestamp,open,high,low,close\n2024-01-02,10,abc,9,10.5\n";
        let err = read_bars(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn written_bars_read_back() {
        let bars = vec![
            bar(0, 100.0, 101.0, 99.0, 100.5).with_volume(10.0),
            bar(1, 100.5, 102.0, 100.0, 101.75),
        ];
        let mut buf = Vec::new();
        write_bars(&mut buf, &bars).unwrap();
        assert_eq!(read_bars(buf.as_slice()).unwrap(), bars);
    }
}
