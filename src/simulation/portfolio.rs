//! Multi-fund portfolio simulation

use super::{simulate_process, GbmProcess, PathMatrix, DAILY_DT};
use crate::error::{EngineError, Result};
use crate::market::{InstrumentId, MarketParameters};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One fund held in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAllocation {
    pub instrument: InstrumentId,
    pub params: MarketParameters,
    /// Share of the contribution in percent
    pub weight_pct: f64,
}

/// Portfolio value paths plus the weight-averaged volatility
#[derive(Debug, Clone)]
pub struct PortfolioSimulation {
    /// Holding value in currency, shape `[days + 1, n_paths]`
    pub paths: PathMatrix,
    pub weighted_sigma: f64,
}

/// Simulate every fund independently and sum the holding values
///
/// Each fund buys `contribution * (1 - initial_costs_pct/100) * weight/100`
/// worth of shares at its `s0`. Funds run in parallel; fund `k` uses its own
/// random stream so adding a fund does not perturb the others.
pub fn simulate_portfolio(
    allocations: &[FundAllocation],
    contribution: f64,
    initial_costs_pct: f64,
    days: usize,
    n_paths: usize,
    seed: u64,
) -> Result<PortfolioSimulation> {
    if allocations.is_empty() {
        return Err(EngineError::invalid_parameters("portfolio has no funds"));
    }
    if let Some(bad) = allocations.iter().find(|a| !(a.weight_pct > 0.0)) {
        return Err(EngineError::invalid_parameters(format!(
            "weight of {} must be positive, got {}",
            bad.instrument, bad.weight_pct
        )));
    }
    let total_weight: f64 = allocations.iter().map(|a| a.weight_pct).sum();
    if (total_weight - 100.0).abs() > 1e-6 {
        return Err(EngineError::invalid_parameters(format!(
            "fund weights must sum to 100%, got {total_weight}"
        )));
    }
    if let Some(bad) = allocations.iter().find(|a| !(a.params.s0 > 0.0)) {
        return Err(EngineError::invalid_parameters(format!(
            "{}: s0 must be positive, got {}",
            bad.instrument, bad.params.s0
        )));
    }

    let net_contribution = contribution * (1.0 - initial_costs_pct / 100.0);

    let fund_paths: Vec<PathMatrix> = allocations
        .par_iter()
        .enumerate()
        .map(|(k, alloc)| {
            let weight_ratio = alloc.weight_pct / 100.0;
            let n_shares = net_contribution * weight_ratio / alloc.params.s0;
            let process = GbmProcess {
                s0: alloc.params.s0,
                mu: alloc.params.mu,
                sigma: alloc.params.sigma,
            };
            let mut paths = simulate_process(&process, days, n_paths, DAILY_DT, seed, k as u64 + 1)?;
            paths.scale(n_shares);
            debug!("{}: {:.4} shares, weight {:.1}%", alloc.instrument, n_shares, alloc.weight_pct);
            Ok(paths)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut funds = fund_paths.into_iter();
    let mut total = funds
        .next()
        .ok_or_else(|| EngineError::invalid_parameters("portfolio has no funds"))?;
    for paths in funds {
        total.add_scaled(&paths, 1.0)?;
    }

    let weighted_sigma: f64 = allocations
        .iter()
        .map(|a| a.params.sigma * a.weight_pct / 100.0)
        .sum();

    Ok(PortfolioSimulation { paths: total, weighted_sigma })
}
