// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (length + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// Evaluated as EMA_{t-1} + multiplier * (value_t - EMA_{t-1}) so a flat input
// reproduces its value exactly.
//
// The first EMA value sits at index `length - 1` and is seeded with the SMA
// of the first `length` values. Output is aligned 1:1 with the input; every
// earlier position is `None`.
// =============================================================================

use crate::error::{require_length, EngineError};

/// Compute the position-aligned EMA series for `values` and look-back `length`.
///
/// # Errors
/// `InvalidParameter` when `length == 0`.
///
/// # Edge cases
/// - `values.len() < length` => every entry is `None`.
pub fn calculate_ema(values: &[f64], length: usize) -> Result<Vec<Option<f64>>, EngineError> {
    require_length("ema length", length)?;

    let mut result = vec![None; values.len()];
    if values.len() < length {
        return Ok(result);
    }

    let multiplier = 2.0 / (length + 1) as f64;

    // Seed: SMA of the first `length` values.
    let seed = values[..length].iter().sum::<f64>() / length as f64;
    result[length - 1] = Some(seed);

    let mut prev_ema = seed;
    for (i, &value) in values.iter().enumerate().skip(length) {
        let ema = prev_ema + multiplier * (value - prev_ema);
        result[i] = Some(ema);
        prev_ema = ema;
    }

    Ok(result)
}
