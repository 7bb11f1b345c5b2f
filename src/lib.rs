//! UL Guarantee - Monte Carlo payout engine for unit-linked life policies
//!
//! This library provides:
//! - Market parameter estimation from historical price series
//! - Mortality tables with death-age sampling and survival probabilities
//! - Path simulation (GBM for funds, rolling Ornstein-Uhlenbeck for bonds)
//! - Black-Scholes pricing of the minimum capital guarantee
//! - Fee drag, guarantee floor and payout statistics
//! - Plausibility diagnostics and end-to-end scenario runs

pub mod error;
pub mod market;
pub mod mortality;
pub mod simulation;
pub mod guarantee;
pub mod payout;
pub mod plausibility;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use market::{InstrumentId, MarketParameters, PriceSeries, estimate_parameters};
pub use mortality::{MortalityTable, HorizonPolicy};
pub use simulation::{PathMatrix, PathProcess, GbmProcess, OuProcess};
pub use guarantee::{GuaranteeContract, CostEstimate, price_guarantee_put, get_guarantee_cost};
pub use payout::{apply_annual_costs, floor_at_guarantee, PayoutSummary};
pub use plausibility::{check_plausibility, Diagnostics, RiskClass, Severity, Warning, WarningCategory};
pub use scenario::{ScenarioConfig, ScenarioReport, ScenarioRunner};

/// Trading days per year used for annualisation and day counts
pub const TRADING_DAYS_PER_YEAR: usize = 252;
