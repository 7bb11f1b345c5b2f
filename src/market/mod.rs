//! Market data inputs: instrument identifiers, price series and parameter estimation

mod estimator;
pub mod loader;

pub use estimator::{
    InstrumentId, MarketParameters, PricePoint, PriceSeries,
    estimate_parameters, historical_cagr,
};
pub use loader::{load_price_series, load_price_series_from_reader};

/// Volatility substituted when an estimate is non-positive or undefined (15%)
pub const DEFAULT_VOLATILITY: f64 = 0.15;
