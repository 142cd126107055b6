// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), evaluated over a trailing window ending at
// every bar.
//
// σ is the POPULATION standard deviation of the window (divide by `length`,
// not `length - 1`). Band values depend on this choice; keep it fixed.
// =============================================================================

use crate::error::{require_length, require_positive, EngineError};

/// Position-aligned band columns; each entry is `None` before `length - 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSeries {
    pub lower: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over `prices`.
///
/// # Errors
/// `InvalidParameter` when `length == 0` or `std_dev` is not a positive
/// finite number.
pub fn calculate_bollinger(
    prices: &[f64],
    length: usize,
    std_dev: f64,
) -> Result<BandSeries, EngineError> {
    require_length("band length", length)?;
    require_positive("band std dev", std_dev)?;

    let n = prices.len();
    let mut bands = BandSeries {
        lower: vec![None; n],
        middle: vec![None; n],
        upper: vec![None; n],
    };

    for (offset, window) in prices.windows(length).enumerate() {
        let i = offset + length - 1;
        let middle = window.iter().sum::<f64>() / length as f64;
        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / length as f64;
        let sigma = variance.sqrt();

        bands.middle[i] = Some(middle);
        bands.upper[i] = Some(middle + std_dev * sigma);
        bands.lower[i] = Some(middle - std_dev * sigma);
    }

    Ok(bands)
}
