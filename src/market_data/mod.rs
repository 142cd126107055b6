pub mod bar;
pub mod quotes;
pub mod store;

// Re-export the Bar struct for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{validate_bars, Bar};
pub use quotes::{QuoteClient, SeriesRequest};
pub use store::{load_bars, save_bars};
