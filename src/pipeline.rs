// =============================================================================
// Signal Engine: one batch in, one annotated batch out
// =============================================================================
//
// Pipeline:
//   1. Validate parameters (InvalidParameter) and bars (InvalidInput)
//   2. Compute indicator columns over the full history
//   3. Optionally keep only the trailing `signal_tail` bars
//   4. Trend classifier       (sustained EMA ordering)
//   5. Band-cross classifier  (trend + close touching a band)
//   6. Momentum classifier    (growing trailing window), confirm/veto
//   7. Assemble one AnnotatedBar per retained input bar, same order
//
// Nothing is carried between runs; a new batch recomputes from scratch.
// =============================================================================

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::indicators::{compute_indicators, IndicatorRecord};
use crate::market_data::bar::format_timestamp;
use crate::market_data::{validate_bars, Bar};
use crate::runtime_config::EngineConfig;
use crate::signals::{classify_band_cross, classify_momentum, classify_trend, confirm};
use crate::types::{MomentumSignal, TotalSignal, TrendSignal};

/// Offset of a chart marker from the bar extreme it is drawn against.
const MARKER_OFFSET: f64 = 1e-4;

// =============================================================================
// Output types
// =============================================================================

/// A bar with every derived value attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub bar: Bar,
    pub indicators: IndicatorRecord,
    pub trend: TrendSignal,
    /// Band-cross signal before momentum confirmation.
    pub band_cross: TotalSignal,
    pub momentum: MomentumSignal,
    /// Final action after momentum confirmation.
    pub total: TotalSignal,
}

impl AnnotatedBar {
    /// Where a charting layer should draw this bar's action marker: just
    /// below the low for Buy, just above the high for Sell.
    pub fn marker_price(&self) -> Option<f64> {
        match self.total {
            TotalSignal::Buy => Some(self.bar.low - MARKER_OFFSET),
            TotalSignal::Sell => Some(self.bar.high + MARKER_OFFSET),
            TotalSignal::None => None,
        }
    }
}

/// Count of bars per final signal value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub none: usize,
    pub sell: usize,
    pub buy: usize,
}

impl std::fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "None: {}, Sell: {}, Buy: {}", self.none, self.sell, self.buy)
    }
}

/// The engine's output for one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    pub bars: Vec<AnnotatedBar>,
}

const OUTPUT_HEADER: [&str; 15] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "ema_slow",
    "ema_fast",
    "momentum",
    "atr",
    "band_lower",
    "band_middle",
    "band_upper",
    "trend_signal",
    "momentum_signal",
    "total_signal",
];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl AnnotatedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn total_signals(&self) -> Vec<TotalSignal> {
        self.bars.iter().map(|b| b.total).collect()
    }

    pub fn summary(&self) -> SignalSummary {
        self.bars
            .iter()
            .fold(SignalSummary::default(), |mut acc, b| {
                match b.total {
                    TotalSignal::None => acc.none += 1,
                    TotalSignal::Sell => acc.sell += 1,
                    TotalSignal::Buy => acc.buy += 1,
                }
                acc
            })
    }

    /// Write the annotated table as CSV. Undefined values are empty cells;
    /// signals are written as their numeric codes.
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = Writer::from_writer(sink);
        writer.write_record(OUTPUT_HEADER)?;

        for row in &self.bars {
            let rec = &row.indicators;
            writer.write_record([
                format_timestamp(&row.bar.timestamp),
                row.bar.open.to_string(),
                row.bar.high.to_string(),
                row.bar.low.to_string(),
                row.bar.close.to_string(),
                cell(rec.ema_slow),
                cell(rec.ema_fast),
                cell(rec.momentum),
                cell(rec.atr),
                cell(rec.band_lower),
                cell(rec.band_middle),
                cell(rec.band_upper),
                row.trend.code().to_string(),
                row.momentum.code().to_string(),
                row.total.code().to_string(),
            ])?;
        }

        writer.flush().context("failed to flush annotated CSV")?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.len(), "annotated series saved");
        Ok(())
    }
}

// =============================================================================
// Signal Engine
// =============================================================================

/// Stateless batch engine configured once with validated parameters.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    /// # Errors
    /// `InvalidParameter` for the first invalid setting in `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the full pipeline over one ordered batch.
    ///
    /// # Errors
    /// `InvalidInput` when any bar is malformed or out of order; nothing is
    /// computed in that case.
    pub fn run(&self, bars: &[Bar]) -> Result<AnnotatedSeries, EngineError> {
        validate_bars(bars)?;

        let ind = &self.config.indicators;
        let sig = &self.config.signals;

        let full = compute_indicators(bars, ind)?;

        let start = match self.config.signal_tail {
            Some(tail) => bars.len().saturating_sub(tail),
            None => 0,
        };
        let bars = &bars[start..];
        let cols = full.tail_from(start);
        debug!(retained = bars.len(), skipped = start, "classifying bars");

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let trend = classify_trend(&cols.ema_fast, &cols.ema_slow, sig.back_candles)?;
        let band_cross =
            classify_band_cross(&trend, &closes, &cols.bands.lower, &cols.bands.upper);
        let momentum = classify_momentum(
            &cols.momentum,
            sig.momentum_window,
            sig.momentum_up_limit,
            sig.momentum_down_limit,
        )?;
        let total = confirm(&band_cross, &momentum);

        let series = AnnotatedSeries {
            bars: bars
                .iter()
                .enumerate()
                .map(|(i, bar)| AnnotatedBar {
                    bar: bar.clone(),
                    indicators: cols.record(i),
                    trend: trend[i],
                    band_cross: band_cross[i],
                    momentum: momentum[i],
                    total: total[i],
                })
                .collect(),
        };

        let summary = series.summary();
        info!(
            bars = series.len(),
            buy = summary.buy,
            sell = summary.sell,
            "signal pass complete"
        );

        Ok(series)
    }
}
