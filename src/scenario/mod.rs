//! End-to-end scenario runs
//!
//! A [`ScenarioConfig`] describes one request (policyholder, contribution,
//! guarantee levels, costs, funds). [`ScenarioRunner`] estimates market
//! parameters, resolves the horizon, prices each guarantee level and
//! simulates payouts, producing a serialisable [`ScenarioReport`].

mod config;
mod runner;
mod report;

pub use config::{BondModelConfig, FundWeight, ScenarioConfig};
pub use runner::ScenarioRunner;
pub use report::{FundEstimate, GuaranteeOutcome, ScenarioReport, SimulationModel};
