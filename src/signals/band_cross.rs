// =============================================================================
// Band-Cross Classifier
// =============================================================================
//
// Buy  when the trend is up   and close has touched or broken the lower band.
// Sell when the trend is down and close has touched or broken the upper band.
//
// Evaluation order is part of the contract: Sell is assigned first, Buy
// second, so Buy takes precedence if both conditions ever hold together.
// An undefined band never triggers.
// =============================================================================

use crate::types::{TotalSignal, TrendSignal};

pub fn classify_band_cross(
    trend: &[TrendSignal],
    closes: &[f64],
    band_lower: &[Option<f64>],
    band_upper: &[Option<f64>],
) -> Vec<TotalSignal> {
    trend
        .iter()
        .zip(closes)
        .zip(band_lower.iter().zip(band_upper))
        .map(|((&trend, &close), (&lower, &upper))| {
            let sell = trend == TrendSignal::DownTrend && upper.map_or(false, |u| close >= u);
            let buy = trend == TrendSignal::UpTrend && lower.map_or(false, |l| close <= l);

            let mut signal = TotalSignal::None;
            if sell {
                signal = TotalSignal::Sell;
            }
            if buy {
                signal = TotalSignal::Buy;
            }
            signal
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TrendSignal::{DownTrend, UpTrend};

    #[test]
    fn buy_needs_up_trend_and_lower_touch() {
        let trend = [UpTrend, UpTrend, TrendSignal::None, DownTrend];
        let closes = [95.0, 96.0, 90.0, 90.0];
        let lower = [Some(95.0), Some(95.0), Some(95.0), Some(95.0)];
        let upper = [Some(105.0); 4];
        assert_eq!(
            classify_band_cross(&trend, &closes, &lower, &upper),
            vec![TotalSignal::Buy, TotalSignal::None, TotalSignal::None, TotalSignal::None]
        );
    }

    #[test]
    fn sell_needs_down_trend_and_upper_touch() {
        let trend = [DownTrend, DownTrend, UpTrend];
        let closes = [105.0, 104.0, 110.0];
        let lower = [Some(95.0); 3];
        let upper = [Some(105.0); 3];
        assert_eq!(
            classify_band_cross(&trend, &closes, &lower, &upper),
            vec![TotalSignal::Sell, TotalSignal::None, TotalSignal::None]
        );
    }

    #[test]
    fn undefined_bands_never_trigger() {
        let trend = [UpTrend, DownTrend];
        let closes = [1.0, 1000.0];
        let out = classify_band_cross(&trend, &closes, &[None, None], &[None, None]);
        assert_eq!(out, vec![TotalSignal::None, TotalSignal::None]);
    }

    #[test]
    fn collapsed_band_counts_as_touch() {
        // Zero-width band: close == lower == upper.
        let out = classify_band_cross(&[UpTrend], &[100.0], &[Some(100.0)], &[Some(100.0)]);
        assert_eq!(out, vec![TotalSignal::Buy]);
    }
}
