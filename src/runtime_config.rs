// =============================================================================
// Engine Configuration: indicator and signal tuning with atomic save
// =============================================================================
//
// Every tunable length, multiplier and threshold lives here. The band
// parameters used by the band-cross classifier are read from the same
// `IndicatorParams` the aggregator used, so the two can never drift apart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{require_finite, require_length, require_positive, EngineError};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ema_slow_length() -> usize {
    50
}

fn default_ema_fast_length() -> usize {
    30
}

fn default_momentum_length() -> usize {
    10
}

fn default_atr_length() -> usize {
    7
}

fn default_band_length() -> usize {
    15
}

fn default_band_std_dev() -> f64 {
    1.5
}

fn default_back_candles() -> usize {
    7
}

fn default_momentum_window() -> usize {
    5
}

fn default_momentum_up_limit() -> f64 {
    50.1
}

fn default_momentum_down_limit() -> f64 {
    49.9
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Lengths and multipliers for the indicator aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Slow EMA length over close.
    #[serde(default = "default_ema_slow_length")]
    pub ema_slow_length: usize,

    /// Fast EMA length over close.
    #[serde(default = "default_ema_fast_length")]
    pub ema_fast_length: usize,

    /// Length of the EMA used as the momentum proxy.
    #[serde(default = "default_momentum_length")]
    pub momentum_length: usize,

    #[serde(default = "default_atr_length")]
    pub atr_length: usize,

    /// Bollinger window length.
    #[serde(default = "default_band_length")]
    pub band_length: usize,

    /// Bollinger width in population standard deviations.
    #[serde(default = "default_band_std_dev")]
    pub band_std_dev: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_slow_length: default_ema_slow_length(),
            ema_fast_length: default_ema_fast_length(),
            momentum_length: default_momentum_length(),
            atr_length: default_atr_length(),
            band_length: default_band_length(),
            band_std_dev: default_band_std_dev(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        require_length("ema_slow_length", self.ema_slow_length)?;
        require_length("ema_fast_length", self.ema_fast_length)?;
        require_length("momentum_length", self.momentum_length)?;
        require_length("atr_length", self.atr_length)?;
        require_length("band_length", self.band_length)?;
        require_positive("band_std_dev", self.band_std_dev)?;
        Ok(())
    }
}

// =============================================================================
// SignalParams
// =============================================================================

/// Window lengths and thresholds for the three classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    /// Bars of sustained EMA ordering required for a trend.
    #[serde(default = "default_back_candles")]
    pub back_candles: usize,

    /// Cap on the trailing momentum window. The effective window at bar `i`
    /// is `min(momentum_window, i)`.
    #[serde(default = "default_momentum_window")]
    pub momentum_window: usize,

    /// Every value in the window must be strictly above this for UpTrend.
    #[serde(default = "default_momentum_up_limit")]
    pub momentum_up_limit: f64,

    /// Every value in the window must be strictly below this for DownTrend.
    #[serde(default = "default_momentum_down_limit")]
    pub momentum_down_limit: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            back_candles: default_back_candles(),
            momentum_window: default_momentum_window(),
            momentum_up_limit: default_momentum_up_limit(),
            momentum_down_limit: default_momentum_down_limit(),
        }
    }
}

impl SignalParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        require_length("back_candles", self.back_candles)?;
        require_length("momentum_window", self.momentum_window)?;
        require_finite("momentum_up_limit", self.momentum_up_limit)?;
        require_finite("momentum_down_limit", self.momentum_down_limit)?;
        Ok(())
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for one engine run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub signals: SignalParams,

    /// When set, indicators use the full history but only the last N bars
    /// are classified and emitted.
    #[serde(default)]
    pub signal_tail: Option<usize>,
}

impl EngineConfig {
    /// Check every parameter; the first offender is reported.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.indicators.validate()?;
        self.signals.validate()?;
        if let Some(tail) = self.signal_tail {
            require_length("signal_tail", tail)?;
        }
        Ok(())
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error; see `load_or_default` for the fallback.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            ema_slow = config.indicators.ema_slow_length,
            ema_fast = config.indicators.ema_fast_length,
            band_length = config.indicators.band_length,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Load from `path`, or return the defaults when no file exists there.
    ///
    /// A file that exists but cannot be read or parsed is an error; it is
    /// never silently replaced by the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no engine config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.indicators.ema_slow_length, 50);
        assert_eq!(cfg.indicators.ema_fast_length, 30);
        assert_eq!(cfg.indicators.momentum_length, 10);
        assert_eq!(cfg.indicators.atr_length, 7);
        assert_eq!(cfg.indicators.band_length, 15);
        assert!((cfg.indicators.band_std_dev - 1.5).abs() < f64::EPSILON);
        assert_eq!(cfg.signals.back_candles, 7);
        assert_eq!(cfg.signals.momentum_window, 5);
        assert!((cfg.signals.momentum_up_limit - 50.1).abs() < f64::EPSILON);
        assert!((cfg.signals.momentum_down_limit - 49.9).abs() < f64::EPSILON);
        assert_eq!(cfg.signal_tail, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "indicators": { "band_length": 20 }, "signal_tail": 60000 }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.indicators.band_length, 20);
        assert_eq!(cfg.indicators.ema_slow_length, 50);
        assert_eq!(cfg.signals.back_candles, 7);
        assert_eq!(cfg.signal_tail, Some(60000));
    }

    #[test]
    fn validate_rejects_zero_lengths() {
        let mut cfg = EngineConfig::default();
        cfg.signals.back_candles = 0;
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidParameter { name: "back_candles", .. })
        ));

        let mut cfg = EngineConfig::default();
        cfg.indicators.ema_fast_length = 0;
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidParameter { name: "ema_fast_length", .. })
        ));

        let cfg = EngineConfig {
            signal_tail: Some(0),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_multiplier_and_limits() {
        let mut cfg = EngineConfig::default();
        cfg.indicators.band_std_dev = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.signals.momentum_up_limit = f64::INFINITY;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("trendband-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine_config.json");

        let mut cfg = EngineConfig::default();
        cfg.indicators.band_std_dev = 2.0;
        cfg.signal_tail = Some(500);
        cfg.save(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(EngineConfig::load(&path).unwrap(), cfg);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(EngineConfig::load("/nonexistent/engine_config.json").is_err());
    }

    #[test]
    fn load_or_default_falls_back_only_for_missing_file() {
        let cfg = EngineConfig::load_or_default("/nonexistent/engine_config.json").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn load_or_default_rejects_unparseable_file() {
        let dir = std::env::temp_dir().join(format!("trendband-badcfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        // Negative length: serde cannot parse it into usize.
        let bad_value = dir.join("bad_value.json");
        std::fs::write(
            &bad_value,
            r#"{"indicators":{"band_length":-1,"ema_slow_length":20}}"#,
        )
        .unwrap();
        let err = EngineConfig::load_or_default(&bad_value).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse engine config"));

        let malformed = dir.join("malformed.json");
        std::fs::write(&malformed, "{ \"indicators\": ").unwrap();
        assert!(EngineConfig::load_or_default(&malformed).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
