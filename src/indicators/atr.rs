// =============================================================================
// Average True Range (ATR): EMA smoothing
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR_0 = H - L                                   (no previous close)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the EMA of TR with the same SMA seed as `ema::calculate_ema`, so
// the first defined value sits at index `length - 1`.
// =============================================================================

use super::ema::calculate_ema;
use crate::error::{require_length, EngineError};
use crate::market_data::Bar;

/// Per-bar true range, aligned with `bars`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            match i.checked_sub(1).map(|p| bars[p].close) {
                Some(prev_close) => {
                    let hc = (bar.high - prev_close).abs();
                    let lc = (bar.low - prev_close).abs();
                    hl.max(hc).max(lc)
                }
                None => hl,
            }
        })
        .collect()
}

/// Compute the position-aligned ATR series.
///
/// # Errors
/// `InvalidParameter` when `length == 0`.
pub fn calculate_atr(bars: &[Bar], length: usize) -> Result<Vec<Option<f64>>, EngineError> {
    require_length("atr length", length)?;
    calculate_ema(&true_range(bars), length)
}
