//! Step-wise stochastic processes and the shared path generator

use super::{derive_seed, PathMatrix, DAILY_DT};
use crate::error::{EngineError, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

/// One-dimensional process advanced by a standard normal shock per step
///
/// GBM and OU differ only in their starting value and recurrence; path
/// allocation, seeding and parallelism live in [`simulate_process`].
pub trait PathProcess: Sync {
    /// Value at row 0
    fn initial(&self) -> f64;

    /// Advance `x` by one step of length `dt` with shock `z ~ N(0, 1)`
    fn step(&self, x: f64, dt: f64, z: f64) -> f64;

    /// Diffusion coefficient, checked before any path is generated
    fn volatility(&self) -> f64;
}

/// Geometric Brownian motion: `dS/S = mu dt + sigma dW`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmProcess {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl PathProcess for GbmProcess {
    fn initial(&self) -> f64 {
        self.s0
    }

    /// Exact log-normal step: `S * exp((mu - sigma^2/2) dt + sigma sqrt(dt) z)`
    fn step(&self, x: f64, dt: f64, z: f64) -> f64 {
        let drift = (self.mu - 0.5 * self.sigma * self.sigma) * dt;
        let shock = self.sigma * z * dt.sqrt();
        x * (drift + shock).exp()
    }

    fn volatility(&self) -> f64 {
        self.sigma
    }
}

/// Ornstein-Uhlenbeck: `dX = theta (mu - X) dt + sigma dW`, Euler-Maruyama discretised
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuProcess {
    pub x0: f64,
    /// Long-run level
    pub mu: f64,
    /// Mean-reversion speed
    pub theta: f64,
    pub sigma: f64,
}

impl PathProcess for OuProcess {
    fn initial(&self) -> f64 {
        self.x0
    }

    fn step(&self, x: f64, dt: f64, z: f64) -> f64 {
        x + self.theta * (self.mu - x) * dt + self.sigma * dt.sqrt() * z
    }

    fn volatility(&self) -> f64 {
        self.sigma
    }
}

/// Generate `n_paths` realisations of `days` steps each
///
/// Output shape is `[days + 1, n_paths]`; row 0 holds the starting value.
/// `stream` separates independent draws that share one run seed.
pub fn simulate_process<P: PathProcess>(
    process: &P,
    days: usize,
    n_paths: usize,
    dt: f64,
    seed: u64,
    stream: u64,
) -> Result<PathMatrix> {
    if days == 0 {
        return Err(EngineError::invalid_parameters("days must be positive"));
    }
    if n_paths == 0 {
        return Err(EngineError::invalid_parameters("n_paths must be positive"));
    }
    let sigma = process.volatility();
    if !(sigma >= 0.0) || !sigma.is_finite() {
        return Err(EngineError::invalid_parameters(format!(
            "volatility must be non-negative, got {sigma}"
        )));
    }
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(EngineError::invalid_parameters(format!("dt must be positive, got {dt}")));
    }

    let steps = days + 1;
    let mut matrix = PathMatrix::zeros(steps, n_paths)?;
    matrix
        .data_mut()
        .par_chunks_mut(steps)
        .enumerate()
        .for_each(|(i, path)| {
            let mut rng = StdRng::seed_from_u64(derive_seed(seed, stream, i as u64));
            let mut x = process.initial();
            path[0] = x;
            for value in path.iter_mut().skip(1) {
                let z: f64 = StandardNormal.sample(&mut rng);
                x = process.step(x, dt, z);
                *value = x;
            }
        });

    debug!("Simulated {} paths x {} days (stream {})", n_paths, days, stream);
    Ok(matrix)
}

/// Unit convention of GBM output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GbmMode {
    /// Price per unit
    Price,
    /// Holding value: shares bought with the contribution net of entry costs
    Portfolio {
        contribution: f64,
        /// One-time entry cost in percent
        initial_costs_pct: f64,
    },
}

/// GBM price paths with daily steps, shape `[days + 1, n_paths]`
pub fn simulate_gbm(
    s0: f64,
    mu: f64,
    sigma: f64,
    days: usize,
    n_paths: usize,
    seed: u64,
) -> Result<PathMatrix> {
    simulate_gbm_with_mode(s0, mu, sigma, days, n_paths, seed, GbmMode::Price)
}

/// GBM paths in either price or holding-value units
pub fn simulate_gbm_with_mode(
    s0: f64,
    mu: f64,
    sigma: f64,
    days: usize,
    n_paths: usize,
    seed: u64,
    mode: GbmMode,
) -> Result<PathMatrix> {
    if !(s0 > 0.0) {
        return Err(EngineError::invalid_parameters(format!("s0 must be positive, got {s0}")));
    }
    let process = GbmProcess { s0, mu, sigma };
    let mut paths = simulate_process(&process, days, n_paths, DAILY_DT, seed, 0)?;

    if let GbmMode::Portfolio { contribution, initial_costs_pct } = mode {
        let net_contribution = contribution * (1.0 - initial_costs_pct / 100.0);
        let n_shares = net_contribution / s0;
        paths.scale(n_shares);
    }
    Ok(paths)
}

/// OU paths, shape `[days + 1, n_paths]`, with `X[0] = s0`
pub fn simulate_ou(
    s0: f64,
    mu: f64,
    theta: f64,
    sigma: f64,
    days: usize,
    n_paths: usize,
    dt: f64,
    seed: u64,
) -> Result<PathMatrix> {
    let process = OuProcess { x0: s0, mu, theta, sigma };
    simulate_process(&process, days, n_paths, dt, seed, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gbm_zero_drift_zero_vol_is_constant() {
        let paths = simulate_gbm(100.0, 0.0, 0.0, 252, 5, 1).unwrap();
        assert_eq!(paths.steps(), 253);
        assert_eq!(paths.n_paths(), 5);
        for path in paths.paths() {
            assert!(path.iter().all(|&v| v == 100.0));
        }
    }

    #[test]
    fn test_gbm_deterministic_drift() {
        // sigma = 0: S_t = s0 * exp(mu * t)
        let paths = simulate_gbm(50.0, 0.05, 0.0, 252, 3, 9).unwrap();
        for v in paths.terminal_values() {
            assert_relative_eq!(v, 50.0 * 0.05_f64.exp(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_gbm_seed_reproducible() {
        let a = simulate_gbm(100.0, 0.05, 0.2, 100, 8, 123).unwrap();
        let b = simulate_gbm(100.0, 0.05, 0.2, 100, 8, 123).unwrap();
        let c = simulate_gbm(100.0, 0.05, 0.2, 100, 8, 124).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_adjacent_seeds_give_different_distributions() {
        let sorted_terminal = |seed| {
            let mut t = simulate_gbm(100.0, 0.05, 0.2, 50, 4, seed).unwrap().terminal_values();
            t.sort_by(|a, b| a.total_cmp(b));
            t
        };
        assert_ne!(sorted_terminal(10), sorted_terminal(11));
        assert_ne!(sorted_terminal(0), sorted_terminal(1));
    }

    #[test]
    fn test_same_paths_on_any_thread_count() {
        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let serial = single.install(|| simulate_gbm(100.0, 0.05, 0.2, 120, 64, 31).unwrap());
        let parallel = simulate_gbm(100.0, 0.05, 0.2, 120, 64, 31).unwrap();
        assert_eq!(serial, parallel);

        let serial_ou = single.install(|| simulate_ou(0.02, 0.03, 0.2, 0.01, 120, 64, DAILY_DT, 31).unwrap());
        let parallel_ou = simulate_ou(0.02, 0.03, 0.2, 0.01, 120, 64, DAILY_DT, 31).unwrap();
        assert_eq!(serial_ou, parallel_ou);
    }

    #[test]
    fn test_path_independent_of_path_count() {
        let small = simulate_gbm(100.0, 0.05, 0.2, 50, 3, 77).unwrap();
        let large = simulate_gbm(100.0, 0.05, 0.2, 50, 30, 77).unwrap();
        for i in 0..3 {
            assert_eq!(small.path(i), large.path(i));
        }
    }

    #[test]
    fn test_gbm_start_row_and_finite() {
        let paths = simulate_gbm(10.0, 0.07, 0.3, 500, 20, 5).unwrap();
        assert!(paths.row(0).iter().all(|&v| v == 10.0));
        assert!(paths.all_finite());
        assert!(paths.terminal_values().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_gbm_mean_matches_expectation() {
        // E[S_T] = s0 * exp(mu * T); 4000 paths over one year
        let paths = simulate_gbm(100.0, 0.08, 0.2, 252, 4000, 2024).unwrap();
        let terminal = paths.terminal_values();
        let mean = terminal.iter().sum::<f64>() / terminal.len() as f64;
        let expected = 100.0 * 0.08_f64.exp();
        // Standard error ~ 0.35
        assert!((mean - expected).abs() < 2.0, "mean {mean} vs {expected}");
    }

    #[test]
    fn test_portfolio_mode_scales_by_shares() {
        let mode = GbmMode::Portfolio { contribution: 10_000.0, initial_costs_pct: 2.0 };
        let paths = simulate_gbm_with_mode(50.0, 0.0, 0.0, 10, 2, 1, mode).unwrap();
        // 9800 / 50 = 196 shares at a constant 50
        assert!(paths.row(0).iter().all(|&v| (v - 9_800.0).abs() < 1e-9));
        assert!(paths.terminal_values().iter().all(|&v| (v - 9_800.0).abs() < 1e-9));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            simulate_gbm(100.0, 0.0, 0.2, 0, 5, 1),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate_gbm(100.0, 0.0, 0.2, 10, 0, 1),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate_gbm(100.0, 0.0, -0.2, 10, 5, 1),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate_ou(1.0, 0.0, 0.2, f64::NAN, 10, 5, DAILY_DT, 1),
            Err(EngineError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_ou_without_noise_reverts_to_mean() {
        // X[t+1] - mu = (1 - theta dt) (X[t] - mu)
        let theta = 0.5;
        let paths = simulate_ou(1.0, 0.03, theta, 0.0, 252, 2, DAILY_DT, 1).unwrap();
        assert_eq!(paths.steps(), 253);
        assert_eq!(paths.get(0, 0), 1.0);

        let expected = 0.03 + (1.0 - 0.03) * (1.0 - theta * DAILY_DT).powi(252);
        for v in paths.terminal_values() {
            assert_relative_eq!(v, expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_ou_noise_spreads_paths() {
        let paths = simulate_ou(0.02, 0.02, 0.2, 0.01, 252, 200, DAILY_DT, 8).unwrap();
        let terminal = paths.terminal_values();
        let mean = terminal.iter().sum::<f64>() / terminal.len() as f64;
        let var = terminal.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / terminal.len() as f64;
        assert!(var > 0.0);
        // Stationary std is sigma / sqrt(2 theta) ~ 0.0158; one year from the mean is below that
        assert!(var.sqrt() < 0.02);
    }
}
