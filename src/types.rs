// =============================================================================
// Shared signal types used across the trendband engine
// =============================================================================
//
// Every trinary signal carries a numeric code (0, 1, 2). The codes are what
// the annotated CSV output stores and what the momentum confirmation step
// compares.

use serde::{Deserialize, Serialize};

/// Direction read from a sustained condition over a trailing window.
///
/// Shared by the EMA trend classifier and the momentum classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendSignal {
    None,
    DownTrend,
    UpTrend,
}

/// The momentum classifier uses the same encoding as the trend classifier.
pub type MomentumSignal = TrendSignal;

impl TrendSignal {
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::DownTrend => 1,
            Self::UpTrend => 2,
        }
    }
}

impl Default for TrendSignal {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::DownTrend => write!(f, "DownTrend"),
            Self::UpTrend => write!(f, "UpTrend"),
        }
    }
}

/// Final per-bar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TotalSignal {
    None,
    Sell,
    Buy,
}

impl TotalSignal {
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sell => 1,
            Self::Buy => 2,
        }
    }

    pub fn is_action(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for TotalSignal {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for TotalSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Sell => write!(f, "Sell"),
            Self::Buy => write!(f, "Buy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_line_up_across_encodings() {
        assert_eq!(TrendSignal::None.code(), TotalSignal::None.code());
        assert_eq!(TrendSignal::DownTrend.code(), TotalSignal::Sell.code());
        assert_eq!(TrendSignal::UpTrend.code(), TotalSignal::Buy.code());
    }

    #[test]
    fn defaults_are_none() {
        assert_eq!(TrendSignal::default(), TrendSignal::None);
        assert_eq!(TotalSignal::default(), TotalSignal::None);
        assert!(!TotalSignal::default().is_action());
    }
}
