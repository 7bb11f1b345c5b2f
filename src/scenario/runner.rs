//! Scenario orchestration: market data to payout statistics

use super::report::{FundEstimate, GuaranteeOutcome, ScenarioReport, SimulationModel};
use super::ScenarioConfig;
use crate::error::{EngineError, Result};
use crate::guarantee::get_guarantee_cost;
use crate::market::{estimate_parameters, historical_cagr, PriceSeries};
use crate::mortality::{Horizon, MortalityTable};
use crate::payout::{apply_annual_costs, floor_at_guarantee, PayoutSummary};
use crate::plausibility::{
    check_instrument_suitability, check_plausibility, Diagnostics, Severity, Warning,
    WarningCategory,
};
use crate::simulation::{
    derive_seed, simulate_gbm_with_mode, simulate_portfolio, simulate_rolling_bond,
    FundAllocation, GbmMode, PathMatrix, RollingBondParams,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Random stream reserved for sampling the horizon
const HORIZON_STREAM: u64 = 0xFFFF;

/// Runs one [`ScenarioConfig`] against price series and a mortality table
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: ScenarioConfig,
}

impl ScenarioRunner {
    /// Create a runner, validating the configuration up front
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Estimate, simulate and evaluate every requested guarantee level
    ///
    /// Paths are simulated once and shared by all levels, so the levels
    /// differ only in their guarantee cost and floor.
    pub fn run(&self, series: &[PriceSeries], table: &MortalityTable) -> Result<ScenarioReport> {
        let start = Instant::now();
        let cfg = &self.config;
        let seed = cfg.seed.unwrap_or_else(rand::random);
        info!(
            "Scenario: entry age {}, contribution {:.2}, risk class {}, {} paths, seed {}",
            cfg.entry_age, cfg.contribution, cfg.risk_class, cfg.n_paths, seed
        );

        let mut diagnostics = Diagnostics::new();
        let funds = self.estimate_funds(series, &mut diagnostics)?;
        let weighted_mu: f64 = funds.iter().map(|f| f.params.mu * f.weight_pct / 100.0).sum();
        let weighted_sigma: f64 = funds.iter().map(|f| f.params.sigma * f.weight_pct / 100.0).sum();
        info!(
            "Parameters estimated for {} fund(s): mu={:.4}, sigma={:.4}",
            funds.len(),
            weighted_mu,
            weighted_sigma
        );

        let mut horizon_rng = StdRng::seed_from_u64(derive_seed(seed, HORIZON_STREAM, 0));
        let horizon = cfg
            .horizon
            .resolve(table, cfg.entry_age, &mut horizon_rng, &mut diagnostics)?;

        let model = if cfg.risk_class.uses_bond_simulation() {
            SimulationModel::RollingBond
        } else {
            SimulationModel::Gbm
        };
        let gross = self.simulate(model, &funds, weighted_mu, weighted_sigma, horizon.days, seed)?;
        if !gross.all_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "{model:?} simulation produced non-finite values (mu={weighted_mu}, sigma={weighted_sigma})"
            )));
        }
        let mean_gross_value = mean(&gross.terminal_values());

        let outcomes = cfg
            .guarantee_levels
            .iter()
            .map(|&level| self.evaluate_level(level, &gross, &horizon, weighted_mu, weighted_sigma))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Scenario finished: {} level(s), {} warning(s) in {:?}",
            outcomes.len(),
            diagnostics.len() + outcomes.iter().map(|o| o.warnings.len()).sum::<usize>(),
            start.elapsed()
        );

        Ok(ScenarioReport {
            seed,
            contribution: cfg.contribution,
            risk_class: cfg.risk_class,
            horizon,
            model,
            funds,
            weighted_mu,
            weighted_sigma,
            mean_gross_value,
            outcomes,
            diagnostics,
        })
    }

    /// Pair each configured fund with its series and estimate its parameters
    fn estimate_funds(
        &self,
        series: &[PriceSeries],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<FundEstimate>> {
        let cfg = &self.config;
        let selection: Vec<(&PriceSeries, f64)> = if cfg.funds.is_empty() {
            if series.is_empty() {
                return Err(EngineError::DataUnavailable("no price series supplied".to_string()));
            }
            let weight = 100.0 / series.len() as f64;
            series.iter().map(|s| (s, weight)).collect()
        } else {
            cfg.funds
                .iter()
                .map(|fund| {
                    series
                        .iter()
                        .find(|s| s.instrument() == &fund.instrument)
                        .map(|s| (s, fund.weight_pct))
                        .ok_or_else(|| EngineError::DataUnavailable(fund.instrument.to_string()))
                })
                .collect::<Result<Vec<_>>>()?
        };

        let mut funds = Vec::with_capacity(selection.len());
        for (s, weight_pct) in selection {
            let estimated = estimate_parameters(s)?;
            let params = estimated.with_volatility_fallback(cfg.volatility_fallback);
            if params.sigma != estimated.sigma {
                diagnostics.push(Warning::new(
                    Severity::Notice,
                    WarningCategory::VolatilityFallback,
                    format!(
                        "{}: volatility estimate unusable, using {:.2}%",
                        s.instrument(),
                        params.sigma * 100.0
                    ),
                ));
            }
            if let Some(w) = check_instrument_suitability(cfg.risk_class, params.mu, params.sigma) {
                warn!("{}: {}", s.instrument(), w.message);
                diagnostics.push(Warning {
                    message: format!("{}: {}", s.instrument(), w.message),
                    ..w
                });
            }
            funds.push(FundEstimate {
                instrument: s.instrument().clone(),
                params,
                weight_pct,
                historical_cagr: historical_cagr(s).ok(),
            });
        }
        Ok(funds)
    }

    /// Holding-value paths before annual costs, shape `[days + 1, n_paths]`
    fn simulate(
        &self,
        model: SimulationModel,
        funds: &[FundEstimate],
        weighted_mu: f64,
        weighted_sigma: f64,
        days: usize,
        seed: u64,
    ) -> Result<PathMatrix> {
        let cfg = &self.config;
        match model {
            SimulationModel::Gbm => match funds {
                [single] => simulate_gbm_with_mode(
                    single.params.s0,
                    single.params.mu,
                    single.params.sigma,
                    days,
                    cfg.n_paths,
                    seed,
                    GbmMode::Portfolio {
                        contribution: cfg.contribution,
                        initial_costs_pct: cfg.initial_costs_pct,
                    },
                ),
                _ => {
                    let allocations: Vec<FundAllocation> = funds
                        .iter()
                        .map(|f| FundAllocation {
                            instrument: f.instrument.clone(),
                            params: f.params,
                            weight_pct: f.weight_pct,
                        })
                        .collect();
                    let sim = simulate_portfolio(
                        &allocations,
                        cfg.contribution,
                        cfg.initial_costs_pct,
                        days,
                        cfg.n_paths,
                        seed,
                    )?;
                    Ok(sim.paths)
                }
            },
            SimulationModel::RollingBond => {
                let params = RollingBondParams {
                    s0: cfg.bond.start_level,
                    mu: weighted_mu,
                    theta: cfg.bond.theta,
                    sigma: weighted_sigma,
                    roll_years: cfg.bond.roll_years,
                };
                let growth = simulate_rolling_bond(&params, days, cfg.n_paths, seed)?;
                let net_contribution = cfg.contribution * (1.0 - cfg.initial_costs_pct / 100.0);
                let values: Vec<f64> = growth
                    .iter()
                    .map(|g| g / cfg.bond.start_level * net_contribution)
                    .collect();
                PathMatrix::tiled(&values, days + 1)
            }
        }
    }

    fn evaluate_level(
        &self,
        level: f64,
        gross: &PathMatrix,
        horizon: &Horizon,
        mu: f64,
        sigma: f64,
    ) -> Result<GuaranteeOutcome> {
        let cfg = &self.config;
        let cost = get_guarantee_cost(
            cfg.contribution,
            level,
            f64::from(horizon.years),
            sigma,
            cfg.risk_free_rate,
        )?;
        let total_annual_cost_pct = cfg.annual_costs_pct + cost.annual_pct;

        let mut paths = gross.clone();
        apply_annual_costs(&mut paths, total_annual_cost_pct, horizon.days)?;
        let net_values = paths.terminal_values();
        let guaranteed_amount = cfg.contribution * level;
        let floor_hits = net_values.iter().filter(|&&v| v < guaranteed_amount).count();

        let payouts = floor_at_guarantee(&net_values, cfg.contribution, level);
        let summary = PayoutSummary::from_payouts(&payouts)?;
        let label = format!("Guarantee {:.0}%", level * 100.0);
        let warnings = check_plausibility(guaranteed_amount, summary.mean, mu, sigma, &label);
        for w in &warnings {
            warn!("{w}");
        }
        info!(
            "{label}: cost {:.4}% p.a., mean payout {:.2}, VaR95 {:.2}",
            cost.annual_pct, summary.mean, summary.var_95
        );

        Ok(GuaranteeOutcome {
            level,
            guaranteed_amount,
            cost,
            total_annual_cost_pct,
            mean_net_value: mean(&net_values),
            floor_hit_ratio: floor_hits as f64 / net_values.len() as f64,
            summary,
            warnings,
            payouts,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
