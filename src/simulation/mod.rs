//! Monte Carlo path simulation
//!
//! - [`GbmProcess`]: geometric Brownian motion for equity and fund prices
//! - [`OuProcess`]: Ornstein-Uhlenbeck mean reversion for bond-like levels
//! - [`simulate_rolling_bond`]: periodic reinvestment into fresh OU segments
//! - [`simulate_portfolio`]: weighted multi-fund GBM aggregation
//!
//! Every path draws from its own generator seeded from the run seed, the
//! stream (fund or segment number) and the path index, so results do not
//! depend on thread scheduling and path `i` is the same whatever `n_paths` is.

mod paths;
mod process;
mod rolling_bond;
mod portfolio;

pub use paths::PathMatrix;
pub use process::{
    GbmMode, GbmProcess, OuProcess, PathProcess,
    simulate_gbm, simulate_gbm_with_mode, simulate_ou, simulate_process,
};
pub use rolling_bond::{RollingBondParams, simulate_rolling_bond};
pub use portfolio::{FundAllocation, PortfolioSimulation, simulate_portfolio};

/// Length of one simulation step in years (one trading day)
pub const DAILY_DT: f64 = 1.0 / 252.0;

/// Derive an independent generator seed for one path of one stream
///
/// Seed, stream and path are mixed in turn, so neighbouring seeds never
/// map onto each other's paths.
pub(crate) fn derive_seed(base_seed: u64, stream: u64, path: u64) -> u64 {
    let seeded = splitmix64(base_seed);
    let streamed = splitmix64(seeded ^ splitmix64(stream.wrapping_add(1)));
    splitmix64(streamed ^ path)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
