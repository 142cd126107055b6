// =============================================================================
// Signals Module
// =============================================================================
//
// Forward-scan classifiers over the indicator columns:
// - Trend: sustained fast/slow EMA ordering
// - Band cross: trend intersected with close touching a Bollinger band
// - Momentum: growing trailing window over the momentum proxy, used to
//   confirm or veto the band-cross signal

pub mod band_cross;
pub mod momentum;
pub mod trend;

pub use band_cross::classify_band_cross;
pub use momentum::{classify_momentum, confirm};
pub use trend::classify_trend;
