// =============================================================================
// Momentum Confirmation: variable-length trailing window
// =============================================================================
//
// For bar i the window is the `min(cap, i)` momentum values strictly before
// i; bar 0 always sees an empty window. The window grows with position until
// it reaches the cap, so it cannot be expressed as one fixed rolling window.
//
//   UpTrend   iff window non-empty and every value > up_limit
//   DownTrend iff window non-empty and every value < down_limit
//
// Undefined momentum values fail both comparisons.
//
// The band-cross signal survives only when its numeric code equals the
// momentum code at the same bar (Sell=1 vs DownTrend=1, Buy=2 vs UpTrend=2,
// None=0 vs None=0). This is a literal code comparison across two different
// encodings, kept exactly as is.
// =============================================================================

use crate::error::{require_finite, require_length, EngineError};
use crate::types::{MomentumSignal, TotalSignal};

/// Trailing window bounds `[start, end)` for bar `i`.
pub fn window_bounds(i: usize, cap: usize) -> (usize, usize) {
    (i - cap.min(i), i)
}

/// Classify every bar from the momentum proxy.
///
/// # Errors
/// `InvalidParameter` when `cap == 0` or a limit is not finite.
pub fn classify_momentum(
    momentum: &[Option<f64>],
    cap: usize,
    up_limit: f64,
    down_limit: f64,
) -> Result<Vec<MomentumSignal>, EngineError> {
    require_length("momentum_window", cap)?;
    require_finite("momentum_up_limit", up_limit)?;
    require_finite("momentum_down_limit", down_limit)?;

    let signals = (0..momentum.len())
        .map(|i| {
            let (start, end) = window_bounds(i, cap);
            let window = &momentum[start..end];
            if window.is_empty() {
                MomentumSignal::None
            } else if window.iter().all(|v| v.map_or(false, |v| v > up_limit)) {
                MomentumSignal::UpTrend
            } else if window.iter().all(|v| v.map_or(false, |v| v < down_limit)) {
                MomentumSignal::DownTrend
            } else {
                MomentumSignal::None
            }
        })
        .collect();

    Ok(signals)
}

/// Keep each band-cross signal only where it agrees code-for-code with the
/// momentum signal; every disagreement becomes `None`.
pub fn confirm(band_cross: &[TotalSignal], momentum: &[MomentumSignal]) -> Vec<TotalSignal> {
    band_cross
        .iter()
        .zip(momentum)
        .map(|(&signal, &momentum)| {
            if signal.code() == momentum.code() {
                signal
            } else {
                TotalSignal::None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn window_grows_to_cap() {
        let lengths: Vec<usize> = (0..8)
            .map(|i| {
                let (s, e) = window_bounds(i, 5);
                e - s
            })
            .collect();
        assert_eq!(lengths, vec![0, 1, 2, 3, 4, 5, 5, 5]);
        assert_eq!(window_bounds(7, 5), (2, 7));
    }

    #[test]
    fn short_series_uses_growing_windows() {
        // cap 5 on 3 bars: windows of 0, 1, 2 values.
        let sig = classify_momentum(&some(&[60.0, 60.0, 60.0]), 5, 50.1, 49.9).unwrap();
        assert_eq!(
            sig,
            vec![MomentumSignal::None, MomentumSignal::UpTrend, MomentumSignal::UpTrend]
        );
    }

    #[test]
    fn window_excludes_current_bar() {
        // The last bar dips below the limit but is not part of its own window.
        let sig = classify_momentum(&some(&[60.0, 60.0, 60.0, 10.0]), 5, 50.1, 49.9).unwrap();
        assert_eq!(sig[3], MomentumSignal::UpTrend);
    }

    #[test]
    fn old_values_fall_out_of_window() {
        let values = some(&[10.0, 60.0, 60.0, 60.0]);
        let sig = classify_momentum(&values, 2, 50.1, 49.9).unwrap();
        assert_eq!(sig[1], MomentumSignal::DownTrend);
        assert_eq!(sig[2], MomentumSignal::None);
        assert_eq!(sig[3], MomentumSignal::UpTrend);
    }

    #[test]
    fn limits_are_strict() {
        let sig = classify_momentum(&some(&[50.1, 50.1, 49.9, 49.9, 50.0]), 1, 50.1, 49.9).unwrap();
        assert_eq!(sig[1], MomentumSignal::None);
        assert_eq!(sig[3], MomentumSignal::None);
        assert_eq!(sig[4], MomentumSignal::None);
    }

    #[test]
    fn undefined_values_block_signal() {
        let values = vec![None, Some(60.0), Some(60.0)];
        let sig = classify_momentum(&values, 5, 50.1, 49.9).unwrap();
        assert_eq!(sig, vec![MomentumSignal::None; 3]);
    }

    #[test]
    fn confirm_keeps_only_matching_codes() {
        let band = [
            TotalSignal::Buy,
            TotalSignal::Buy,
            TotalSignal::Sell,
            TotalSignal::Sell,
            TotalSignal::None,
            TotalSignal::None,
        ];
        let momentum = [
            MomentumSignal::UpTrend,
            MomentumSignal::DownTrend,
            MomentumSignal::DownTrend,
            MomentumSignal::None,
            MomentumSignal::None,
            MomentumSignal::UpTrend,
        ];
        assert_eq!(
            confirm(&band, &momentum),
            vec![
                TotalSignal::Buy,
                TotalSignal::None,
                TotalSignal::Sell,
                TotalSignal::None,
                TotalSignal::None,
                TotalSignal::None,
            ]
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(classify_momentum(&[], 0, 50.1, 49.9).is_err());
        assert!(classify_momentum(&[], 5, f64::NAN, 49.9).is_err());
    }
}
