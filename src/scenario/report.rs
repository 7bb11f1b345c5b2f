//! Serialisable results of a scenario run

use crate::guarantee::CostEstimate;
use crate::market::{InstrumentId, MarketParameters};
use crate::mortality::Horizon;
use crate::payout::PayoutSummary;
use crate::plausibility::{Diagnostics, RiskClass, Warning};
use serde::{Deserialize, Serialize};

/// Which value model produced the paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationModel {
    /// Weighted GBM fund portfolio
    Gbm,
    /// Rolling Ornstein-Uhlenbeck bond reinvestment
    RollingBond,
}

/// Estimated parameters of one fund and its weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundEstimate {
    pub instrument: InstrumentId,
    pub params: MarketParameters,
    pub weight_pct: f64,
    /// Compound annual growth of the observed closes, when computable
    pub historical_cagr: Option<f64>,
}

/// Result for one guarantee level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeOutcome {
    /// Guaranteed fraction of the contribution
    pub level: f64,
    /// `level * contribution`
    pub guaranteed_amount: f64,
    pub cost: CostEstimate,
    /// Product costs plus guarantee cost, percent per year
    pub total_annual_cost_pct: f64,
    /// Mean terminal value after costs, before the floor
    pub mean_net_value: f64,
    /// Share of paths ending below the guarantee
    pub floor_hit_ratio: f64,
    pub summary: PayoutSummary,
    pub warnings: Vec<Warning>,
    /// Floored payout per path
    #[serde(skip)]
    pub payouts: Vec<f64>,
}

/// Full result of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Seed actually used, so the run can be repeated
    pub seed: u64,
    pub contribution: f64,
    pub risk_class: RiskClass,
    pub horizon: Horizon,
    pub model: SimulationModel,
    pub funds: Vec<FundEstimate>,
    /// Weight-averaged drift across funds
    pub weighted_mu: f64,
    /// Weight-averaged volatility, used to price the guarantee
    pub weighted_sigma: f64,
    /// Mean terminal value before any annual costs
    pub mean_gross_value: f64,
    pub outcomes: Vec<GuaranteeOutcome>,
    /// Run-level warnings (fallbacks, suitability, mortality gaps)
    pub diagnostics: Diagnostics,
}

impl ScenarioReport {
    pub fn outcome(&self, level: f64) -> Option<&GuaranteeOutcome> {
        self.outcomes.iter().find(|o| (o.level - level).abs() < 1e-9)
    }

    /// Run-level and per-level warnings in report order
    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.diagnostics
            .warnings()
            .iter()
            .chain(self.outcomes.iter().flat_map(|o| o.warnings.iter()))
    }
}
