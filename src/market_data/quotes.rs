// =============================================================================
// Alpha Vantage quote client: CSV time series download
// =============================================================================
//
// The provider returns newest-first rows and includes bars with no movement
// (weekends, halted minutes). Both are normalised here so the batch handed to
// the engine is strictly oldest-first with real price action.
// =============================================================================

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use super::bar::Bar;
use super::store::read_bars;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Which time series endpoint to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesRequest {
    /// `TIME_SERIES_INTRADAY` at `interval` (e.g. `1min`), optionally for a
    /// single `YYYY-MM` month instead of the trailing 30 days.
    Intraday {
        interval: String,
        month: Option<String>,
    },
    /// `TIME_SERIES_DAILY`.
    Daily,
}

/// Alpha Vantage REST client.
#[derive(Clone)]
pub struct QuoteClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl QuoteClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            client,
        })
    }

    /// Build a client from `ALPHA_VANTAGE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_VAR)
            .with_context(|| format!("{API_KEY_VAR} is not set"))?;
        Self::new(key)
    }

    /// Query string for a request, without the base URL.
    pub fn query(&self, symbol: &str, request: &SeriesRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("symbol", symbol.to_string())];
        match request {
            SeriesRequest::Intraday { interval, month } => {
                params.push(("function", "TIME_SERIES_INTRADAY".to_string()));
                params.push(("interval", interval.clone()));
                if let Some(month) = month {
                    params.push(("month", month.clone()));
                }
            }
            SeriesRequest::Daily => {
                params.push(("function", "TIME_SERIES_DAILY".to_string()));
            }
        }
        params.push(("outputsize", "full".to_string()));
        params.push(("datatype", "csv".to_string()));
        params.push(("apikey", self.api_key.clone()));
        params
    }

    /// Download a full series for `symbol`, oldest bar first.
    #[instrument(skip(self), name = "alphavantage::fetch_bars")]
    pub async fn fetch_bars(&self, symbol: &str, request: &SeriesRequest) -> Result<Vec<Bar>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.query(symbol, request))
            .send()
            .await
            .context("time series request failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read time series response")?;

        if !status.is_success() {
            bail!("Alpha Vantage returned {status}: {body}");
        }

        let bars = parse_series_csv(&body)?;
        info!(symbol, count = bars.len(), "time series fetched");
        Ok(bars)
    }
}

/// Parse a provider CSV body into an engine-ready batch.
///
/// Error payloads arrive as JSON even when CSV was requested; those are
/// surfaced as errors rather than parsed as empty data.
pub fn parse_series_csv(body: &str) -> Result<Vec<Bar>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        bail!("Alpha Vantage error response: {}", trimmed.trim());
    }

    let raw = read_bars(trimmed.as_bytes()).context("failed to parse time series CSV")?;
    let total = raw.len();

    let mut bars: Vec<Bar> = raw.into_iter().filter(|b| !b.is_flat()).collect();
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let dropped = total - bars.len();
    if dropped > 0 {
        warn!(dropped, "dropped bars with no price movement");
    }
    debug!(count = bars.len(), "time series normalised");
    Ok(bars)
}
