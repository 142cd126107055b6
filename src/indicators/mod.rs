// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator columns. Every series is aligned 1:1 with
// its input and holds `None` wherever the look-back window is not yet full,
// so callers are forced to handle the insufficient-history case.

pub mod aggregate;
pub mod atr;
pub mod bollinger;
pub mod ema;

pub use aggregate::{compute_indicators, IndicatorColumns, IndicatorRecord};
pub use bollinger::BandSeries;
