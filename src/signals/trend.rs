// =============================================================================
// Trend Classifier: sustained EMA ordering
// =============================================================================
//
// above[i] = emaFast[i] > emaSlow[i]
// below[i] = emaSlow[i] > emaFast[i]
//
// UpTrend at bar i iff above[j] holds for every j in [i - back + 1, i];
// DownTrend likewise for below. A window reaching before the first bar, or
// containing an undefined EMA, never qualifies.
// =============================================================================

use crate::error::{require_length, EngineError};
use crate::types::TrendSignal;

/// `fast > slow` per bar; undefined on either side is `false`.
pub fn fast_above(ema_fast: &[Option<f64>], ema_slow: &[Option<f64>]) -> Vec<bool> {
    ema_fast
        .iter()
        .zip(ema_slow)
        .map(|(f, s)| matches!((f, s), (Some(f), Some(s)) if f > s))
        .collect()
}

/// Per bar: true when `condition` held for the whole trailing `window`
/// ending at that bar.
///
/// Implemented as a running streak length, so a window that extends before
/// the first bar can never be satisfied.
pub fn sustained(condition: &[bool], window: usize) -> Vec<bool> {
    let mut streak = 0usize;
    condition
        .iter()
        .map(|&held| {
            streak = if held { streak + 1 } else { 0 };
            streak >= window
        })
        .collect()
}

/// Classify every bar.
///
/// # Errors
/// `InvalidParameter` when `back_candles == 0`.
pub fn classify_trend(
    ema_fast: &[Option<f64>],
    ema_slow: &[Option<f64>],
    back_candles: usize,
) -> Result<Vec<TrendSignal>, EngineError> {
    require_length("back_candles", back_candles)?;

    let all_above = sustained(&fast_above(ema_fast, ema_slow), back_candles);
    let all_below = sustained(&fast_above(ema_slow, ema_fast), back_candles);

    // Down is assigned first so Up wins if both ever held.
    Ok(all_above
        .iter()
        .zip(&all_below)
        .map(|(&up, &down)| {
            let mut signal = TrendSignal::None;
            if down {
                signal = TrendSignal::DownTrend;
            }
            if up {
                signal = TrendSignal::UpTrend;
            }
            signal
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn sustained_needs_full_window() {
        let cond = [true, true, true, false, true, true, true, true];
        assert_eq!(
            sustained(&cond, 3),
            vec![false, false, true, false, false, false, true, true]
        );
    }

    #[test]
    fn up_trend_after_window_fills() {
        let fast = some(&[2.0; 6]);
        let slow = some(&[1.0; 6]);
        let sig = classify_trend(&fast, &slow, 3).unwrap();
        assert_eq!(
            sig,
            vec![
                TrendSignal::None,
                TrendSignal::None,
                TrendSignal::UpTrend,
                TrendSignal::UpTrend,
                TrendSignal::UpTrend,
                TrendSignal::UpTrend,
            ]
        );
    }

    #[test]
    fn down_trend_is_symmetric() {
        let fast = some(&[1.0; 4]);
        let slow = some(&[2.0; 4]);
        let sig = classify_trend(&fast, &slow, 2).unwrap();
        assert_eq!(sig[0], TrendSignal::None);
        assert!(sig[1..].iter().all(|s| *s == TrendSignal::DownTrend));
    }

    #[test]
    fn single_break_in_window_cancels_trend() {
        let fast = some(&[2.0; 10]);
        let slow = some(&[1.0; 10]);
        for flip in 3..=6 {
            let mut slow = slow.clone();
            slow[flip] = Some(2.0); // equal => neither above nor below
            let sig = classify_trend(&fast, &slow, 4).unwrap();
            assert_ne!(sig[6], TrendSignal::UpTrend, "flip at {flip}");
        }
    }

    #[test]
    fn undefined_values_never_satisfy() {
        let fast = vec![None, None, Some(2.0), Some(2.0), Some(2.0)];
        let slow = vec![Some(1.0), None, Some(1.0), Some(1.0), Some(1.0)];
        let sig = classify_trend(&fast, &slow, 3).unwrap();
        assert_eq!(sig[3], TrendSignal::None);
        assert_eq!(sig[4], TrendSignal::UpTrend);
    }

    #[test]
    fn window_longer_than_series_is_none() {
        let sig = classify_trend(&some(&[2.0; 3]), &some(&[1.0; 3]), 7).unwrap();
        assert!(sig.iter().all(|s| *s == TrendSignal::None));
    }

    #[test]
    fn zero_window_rejected() {
        assert!(classify_trend(&[], &[], 0).is_err());
    }
}
