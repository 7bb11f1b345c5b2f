//! Drift/volatility estimation from historical closing prices

use crate::error::{EngineError, Result};
use crate::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker or symbol identifying one instrument
///
/// Resolved once at the estimator boundary; always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(EngineError::InvalidInstrument(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One adjusted close observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronologically ordered adjusted closes for one instrument
#[derive(Debug, Clone)]
pub struct PriceSeries {
    instrument: InstrumentId,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting observations by date
    ///
    /// Closes must be finite and strictly positive (log-returns are taken).
    pub fn new(instrument: InstrumentId, mut points: Vec<PricePoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(EngineError::invalid_parameters(format!(
                "{}: close on {} must be positive, got {}",
                instrument, bad.date, bad.close
            )));
        }
        points.sort_by_key(|p| p.date);
        Ok(Self { instrument, points })
    }

    /// Build from bare closes already in chronological order (dates are synthetic)
    pub fn from_closes(instrument: InstrumentId, closes: &[f64]) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(2000, 1, 3)
            .ok_or_else(|| EngineError::invalid_parameters("invalid synthetic start date"))?;
        let points = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| PricePoint { date, close })
            .collect();
        Self::new(instrument, points)
    }

    pub fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}

/// Annualized drift, volatility and latest observed price for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    /// Annualized drift of log-returns
    pub mu: f64,
    /// Annualized volatility (NaN when fewer than two returns were available)
    pub sigma: f64,
    /// Latest observed price
    pub s0: f64,
}

impl MarketParameters {
    /// Replace a non-positive or undefined sigma with `default_sigma`
    pub fn with_volatility_fallback(self, default_sigma: f64) -> Self {
        if self.sigma > 0.0 && self.sigma.is_finite() {
            return self;
        }
        warn!(
            "Estimated volatility {} is not usable, substituting {:.4}",
            self.sigma, default_sigma
        );
        Self { sigma: default_sigma, ..self }
    }
}

/// Estimate `MarketParameters` from a price series
///
/// Log-returns `ln(P_t / P_{t-1})` are annualized with 252 trading days:
/// `mu = mean * 252`, `sigma = sample std * sqrt(252)`.
pub fn estimate_parameters(series: &PriceSeries) -> Result<MarketParameters> {
    let s0 = series
        .last_close()
        .ok_or_else(|| EngineError::DataUnavailable(series.instrument().to_string()))?;

    let returns: Vec<f64> = series
        .points()
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();
    if returns.is_empty() {
        return Err(EngineError::DataUnavailable(series.instrument().to_string()));
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    // Sample standard deviation (n - 1); undefined for a single return
    let std = if returns.len() > 1 {
        let ss: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    let days = TRADING_DAYS_PER_YEAR as f64;
    let params = MarketParameters {
        mu: mean * days,
        sigma: std * days.sqrt(),
        s0,
    };
    debug!(
        "{}: {} returns, mu={:.4}, sigma={:.4}, s0={:.4}",
        series.instrument(), returns.len(), params.mu, params.sigma, params.s0
    );
    Ok(params)
}

/// Compound annual growth rate between the first and last observation
///
/// Year fraction is calendar days / 365.25.
pub fn historical_cagr(series: &PriceSeries) -> Result<f64> {
    let unavailable = || EngineError::DataUnavailable(series.instrument().to_string());
    let first = series.points().first().ok_or_else(unavailable)?;
    let last = series.points().last().ok_or_else(unavailable)?;

    let days = (last.date - first.date).num_days();
    if days <= 0 {
        return Err(unavailable());
    }
    let years = days as f64 / 365.25;
    Ok((last.close / first.close).powf(1.0 / years) - 1.0)
}
