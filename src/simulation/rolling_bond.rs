//! Rolling bond reinvestment over OU segments

use super::{simulate_process, OuProcess, DAILY_DT};
use crate::error::{EngineError, Result};
use crate::TRADING_DAYS_PER_YEAR;
use log::debug;
use serde::{Deserialize, Serialize};

/// OU level dynamics plus the reinvestment period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingBondParams {
    /// Starting level of every segment (and of the accumulated value)
    pub s0: f64,
    /// Long-run level the segment reverts to
    pub mu: f64,
    /// Mean-reversion speed
    pub theta: f64,
    pub sigma: f64,
    /// Years between reinvestments
    pub roll_years: f64,
}

impl RollingBondParams {
    /// Trading days in one reinvestment segment
    pub fn roll_days(&self) -> usize {
        (self.roll_years * TRADING_DAYS_PER_YEAR as f64) as usize
    }
}

/// Accumulated growth factor per path after all complete reinvestment segments
///
/// The horizon is split into `total_days / roll_days` segments. Each segment
/// is a fresh OU path started at `s0`; its terminal level multiplies the
/// running value of that path. Days left over after the last full segment
/// are not reinvested. Segments are combined in order.
pub fn simulate_rolling_bond(
    params: &RollingBondParams,
    total_days: usize,
    n_paths: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    let roll_days = params.roll_days();
    if roll_days == 0 {
        return Err(EngineError::invalid_parameters(format!(
            "roll period of {} years is shorter than one day",
            params.roll_years
        )));
    }
    if total_days == 0 || n_paths == 0 {
        return Err(EngineError::invalid_parameters(format!(
            "rolling bond needs positive days and paths, got {total_days} x {n_paths}"
        )));
    }
    if !(params.s0 > 0.0) || !params.s0.is_finite() {
        return Err(EngineError::invalid_parameters(format!(
            "starting level must be positive, got {}",
            params.s0
        )));
    }
    if !(params.theta >= 0.0) || !params.theta.is_finite() || !params.mu.is_finite() {
        return Err(EngineError::invalid_parameters(format!(
            "mean reversion needs finite mu and non-negative theta, got mu={}, theta={}",
            params.mu, params.theta
        )));
    }
    if !(params.sigma >= 0.0) {
        return Err(EngineError::invalid_parameters(format!(
            "volatility must be non-negative, got {}",
            params.sigma
        )));
    }

    let n_rolls = total_days / roll_days;
    let process = OuProcess {
        x0: params.s0,
        mu: params.mu,
        theta: params.theta,
        sigma: params.sigma,
    };

    let mut value = vec![params.s0; n_paths];
    for segment in 0..n_rolls {
        let sub_path = simulate_process(&process, roll_days, n_paths, DAILY_DT, seed, segment as u64 + 1)?;
        for (v, growth) in value.iter_mut().zip(sub_path.terminal_values()) {
            *v *= growth;
        }
    }

    debug!(
        "Rolling bond: {} segments of {} days, {} residual days dropped",
        n_rolls,
        roll_days,
        total_days % roll_days
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(s0: f64, mu: f64, sigma: f64) -> RollingBondParams {
        RollingBondParams { s0, mu, theta: 0.2, sigma, roll_years: 10.0 }
    }

    #[test]
    fn test_noise_free_at_long_run_level_compounds() {
        // Starting at mu with no noise the OU level never moves
        let p = params(1.05, 1.05, 0.0);
        let days = 25 * 252;

        let one = simulate_rolling_bond(&p, days, 1, 3).unwrap();
        let many = simulate_rolling_bond(&p, days, 50, 3).unwrap();

        // Two full segments, five residual years dropped
        let expected = 1.05 * 1.05_f64.powi(2);
        assert_relative_eq!(one[0], expected, max_relative = 1e-12);
        assert!(many.iter().all(|v| (v - expected).abs() < 1e-12));
    }

    #[test]
    fn test_invalid_level_dynamics_rejected() {
        assert!(matches!(
            simulate_rolling_bond(&params(0.0, 0.03, 0.01), 2520, 4, 1),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(simulate_rolling_bond(&params(1.0, f64::NAN, 0.01), 2520, 4, 1).is_err());
        let negative_theta = RollingBondParams { theta: -0.2, ..params(1.0, 0.03, 0.01) };
        assert!(simulate_rolling_bond(&negative_theta, 2520, 4, 1).is_err());
    }

    #[test]
    fn test_horizon_shorter_than_roll_keeps_start() {
        let p = params(1.0, 0.03, 0.02);
        let values = simulate_rolling_bond(&p, 5 * 252, 4, 1).unwrap();
        assert_eq!(values, vec![1.0; 4]);
    }

    #[test]
    fn test_reproducible_and_random() {
        let p = params(1.0, 1.02, 0.05);
        let a = simulate_rolling_bond(&p, 20 * 252, 16, 11).unwrap();
        let b = simulate_rolling_bond(&p, 20 * 252, 16, 11).unwrap();
        assert_eq!(a, b);
        assert!(a.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut p = params(1.0, 1.0, 0.0);
        assert!(simulate_rolling_bond(&p, 0, 4, 1).is_err());
        assert!(simulate_rolling_bond(&p, 100, 0, 1).is_err());
        p.roll_years = 0.0;
        assert!(simulate_rolling_bond(&p, 100, 4, 1).is_err());
        let q = params(1.0, 1.0, -0.1);
        assert!(simulate_rolling_bond(&q, 100, 4, 1).is_err());
    }
}
