// =============================================================================
// trendband: EMA trend + Bollinger band-cross + momentum confirmation
// =============================================================================
//
// The engine turns an ordered batch of OHLC bars into per-bar indicator
// values and a None / Sell / Buy signal. Quote download, CSV persistence and
// configuration sit around it as collaborators.
// =============================================================================

pub mod error;
pub mod indicators;
pub mod market_data;
pub mod pipeline;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use error::EngineError;
pub use market_data::Bar;
pub use pipeline::{AnnotatedBar, AnnotatedSeries, SignalEngine, SignalSummary};
pub use runtime_config::{EngineConfig, IndicatorParams, SignalParams};
pub use types::{MomentumSignal, TotalSignal, TrendSignal};
