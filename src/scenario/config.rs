//! Scenario configuration, read from JSON

use crate::error::{EngineError, Result};
use crate::market::{InstrumentId, DEFAULT_VOLATILITY};
use crate::guarantee::DEFAULT_RISK_FREE_RATE;
use crate::mortality::{HorizonPolicy, MAX_AGE};
use crate::plausibility::RiskClass;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One fund in the requested allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundWeight {
    pub instrument: InstrumentId,
    /// Share of the contribution in percent
    pub weight_pct: f64,
}

/// Constants of the rolling-bond model used for risk classes 1 and 2
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondModelConfig {
    /// Mean-reversion speed
    #[serde(default = "default_theta")]
    pub theta: f64,

    /// Years between reinvestments
    #[serde(default = "default_roll_years")]
    pub roll_years: f64,

    /// Starting level of each segment
    #[serde(default = "default_start_level")]
    pub start_level: f64,
}

fn default_theta() -> f64 { 0.2 }
fn default_roll_years() -> f64 { 10.0 }
fn default_start_level() -> f64 { 1.0 }

impl Default for BondModelConfig {
    fn default() -> Self {
        Self {
            theta: 0.2,
            roll_years: 10.0,
            start_level: 1.0,
        }
    }
}

impl BondModelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.start_level > 0.0) || !self.start_level.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "bond start level must be positive, got {}",
                self.start_level
            )));
        }
        if !(self.theta >= 0.0) || !self.theta.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "mean-reversion speed must be non-negative, got {}",
                self.theta
            )));
        }
        if !(self.roll_years > 0.0) || !self.roll_years.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "roll period must be positive, got {} years",
                self.roll_years
            )));
        }
        Ok(())
    }
}

/// Parameters of one payout scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Age of the policyholder at subscription
    #[serde(default = "default_entry_age")]
    pub entry_age: u32,

    /// Single premium in EUR
    #[serde(default = "default_contribution")]
    pub contribution: f64,

    /// Guaranteed fractions of the contribution, each in (0, 1]
    #[serde(default = "default_guarantee_levels")]
    pub guarantee_levels: Vec<f64>,

    /// Product costs in percent per year
    #[serde(default = "default_annual_costs_pct")]
    pub annual_costs_pct: f64,

    /// Entry costs in percent, deducted before investing
    #[serde(default)]
    pub initial_costs_pct: f64,

    #[serde(default = "default_n_paths")]
    pub n_paths: usize,

    /// Run seed; drawn at start-up and reported when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub risk_class: RiskClass,

    #[serde(default)]
    pub horizon: HorizonPolicy,

    /// Fund allocation; empty means equal weights over the supplied series
    #[serde(default)]
    pub funds: Vec<FundWeight>,

    #[serde(default)]
    pub bond: BondModelConfig,

    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Volatility used when the estimate is missing or non-positive
    #[serde(default = "default_volatility_fallback")]
    pub volatility_fallback: f64,
}

fn default_entry_age() -> u32 { 38 }
fn default_contribution() -> f64 { 10_000.0 }
fn default_guarantee_levels() -> Vec<f64> { vec![0.8, 0.9, 1.0] }
fn default_annual_costs_pct() -> f64 { 1.0 }
fn default_n_paths() -> usize { 100 }
fn default_risk_free_rate() -> f64 { DEFAULT_RISK_FREE_RATE }
fn default_volatility_fallback() -> f64 { DEFAULT_VOLATILITY }

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            entry_age: default_entry_age(),
            contribution: default_contribution(),
            guarantee_levels: default_guarantee_levels(),
            annual_costs_pct: default_annual_costs_pct(),
            initial_costs_pct: 0.0,
            n_paths: default_n_paths(),
            seed: None,
            risk_class: RiskClass::default(),
            horizon: HorizonPolicy::default(),
            funds: Vec::new(),
            bond: BondModelConfig::default(),
            risk_free_rate: default_risk_free_rate(),
            volatility_fallback: default_volatility_fallback(),
        }
    }
}

impl ScenarioConfig {
    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Reject requests that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.entry_age >= MAX_AGE {
            return Err(EngineError::invalid_parameters(format!(
                "entry age {} must be below {MAX_AGE}",
                self.entry_age
            )));
        }
        if !(self.contribution > 0.0 && self.contribution.is_finite()) {
            return Err(EngineError::invalid_parameters(format!(
                "contribution must be positive, got {}",
                self.contribution
            )));
        }
        if self.guarantee_levels.is_empty() {
            return Err(EngineError::invalid_parameters("no guarantee levels requested"));
        }
        if let Some(level) = self.guarantee_levels.iter().find(|&&g| !(g > 0.0 && g <= 1.0)) {
            return Err(EngineError::invalid_parameters(format!(
                "guarantee level must lie in (0, 1], got {level}"
            )));
        }
        if !(0.0..100.0).contains(&self.initial_costs_pct) {
            return Err(EngineError::invalid_parameters(format!(
                "initial costs must lie in [0, 100), got {}",
                self.initial_costs_pct
            )));
        }
        if self.n_paths == 0 {
            return Err(EngineError::invalid_parameters("number of paths must be positive"));
        }
        if !self.funds.is_empty() {
            if let Some(bad) = self.funds.iter().find(|f| !(f.weight_pct > 0.0)) {
                return Err(EngineError::invalid_parameters(format!(
                    "weight of {} must be positive, got {}",
                    bad.instrument, bad.weight_pct
                )));
            }
            let total: f64 = self.funds.iter().map(|f| f.weight_pct).sum();
            if (total - 100.0).abs() > 1e-6 {
                return Err(EngineError::invalid_parameters(format!(
                    "fund weights must sum to 100%, got {total}"
                )));
            }
        }
        if !(self.annual_costs_pct >= 0.0 && self.annual_costs_pct <= 100.0) {
            return Err(EngineError::invalid_parameters(format!(
                "annual costs must lie in [0, 100], got {}",
                self.annual_costs_pct
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        self.bond.validate()?;
        if !(self.volatility_fallback > 0.0) || !self.volatility_fallback.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "volatility fallback must be positive, got {}",
                self.volatility_fallback
            )));
        }
        Ok(())
    }
}
