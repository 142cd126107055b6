// =============================================================================
// Indicator Aggregator
// =============================================================================
//
// Runs the moving-average engine (EMA slow/fast, momentum proxy, ATR) and the
// band engine side by side and joins them into one column set aligned with
// the input bars. Undefined entries are left as `None`; nothing here decides
// whether there is "enough" history.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::atr::calculate_atr;
use super::bollinger::{calculate_bollinger, BandSeries};
use super::ema::calculate_ema;
use crate::error::EngineError;
use crate::market_data::Bar;
use crate::runtime_config::IndicatorParams;

/// Indicator values attached to one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub ema_slow: Option<f64>,
    pub ema_fast: Option<f64>,
    pub momentum: Option<f64>,
    pub atr: Option<f64>,
    pub band_lower: Option<f64>,
    pub band_middle: Option<f64>,
    pub band_upper: Option<f64>,
}

/// Column-wise indicator output, one entry per bar in every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorColumns {
    pub ema_slow: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub momentum: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub bands: BandSeries,
}

impl IndicatorColumns {
    pub fn len(&self) -> usize {
        self.ema_slow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_slow.is_empty()
    }

    /// The record for bar `i`.
    pub fn record(&self, i: usize) -> IndicatorRecord {
        IndicatorRecord {
            ema_slow: self.ema_slow[i],
            ema_fast: self.ema_fast[i],
            momentum: self.momentum[i],
            atr: self.atr[i],
            band_lower: self.bands.lower[i],
            band_middle: self.bands.middle[i],
            band_upper: self.bands.upper[i],
        }
    }

    pub fn records(&self) -> Vec<IndicatorRecord> {
        (0..self.len()).map(|i| self.record(i)).collect()
    }

    /// Columns restricted to bars `start..`.
    pub fn tail_from(&self, start: usize) -> Self {
        let start = start.min(self.len());
        Self {
            ema_slow: self.ema_slow[start..].to_vec(),
            ema_fast: self.ema_fast[start..].to_vec(),
            momentum: self.momentum[start..].to_vec(),
            atr: self.atr[start..].to_vec(),
            bands: BandSeries {
                lower: self.bands.lower[start..].to_vec(),
                middle: self.bands.middle[start..].to_vec(),
                upper: self.bands.upper[start..].to_vec(),
            },
        }
    }
}

/// Output of the moving-average engine.
struct AverageColumns {
    ema_slow: Vec<Option<f64>>,
    ema_fast: Vec<Option<f64>>,
    momentum: Vec<Option<f64>>,
    atr: Vec<Option<f64>>,
}

fn moving_averages(
    bars: &[Bar],
    closes: &[f64],
    params: &IndicatorParams,
) -> Result<AverageColumns, EngineError> {
    Ok(AverageColumns {
        ema_slow: calculate_ema(closes, params.ema_slow_length)?,
        ema_fast: calculate_ema(closes, params.ema_fast_length)?,
        momentum: calculate_ema(closes, params.momentum_length)?,
        atr: calculate_atr(bars, params.atr_length)?,
    })
}

/// Compute every indicator column for `bars`.
///
/// The moving-average and band engines share no state and run concurrently.
///
/// # Errors
/// `InvalidParameter` when any length or the band multiplier is invalid.
/// Bars are assumed validated already.
pub fn compute_indicators(
    bars: &[Bar],
    params: &IndicatorParams,
) -> Result<IndicatorColumns, EngineError> {
    params.validate()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let (averages, bands) = rayon::join(
        || moving_averages(bars, &closes, params),
        || calculate_bollinger(&closes, params.band_length, params.band_std_dev),
    );
    let averages = averages?;
    let bands = bands?;

    debug!(bars = bars.len(), "indicator columns computed");

    Ok(IndicatorColumns {
        ema_slow: averages.ema_slow,
        ema_fast: averages.ema_fast,
        momentum: averages.momentum,
        atr: averages.atr,
        bands,
    })
}
