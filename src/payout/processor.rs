//! Anniversary fee haircuts and the terminal guarantee floor

use crate::error::{EngineError, Result};
use crate::simulation::PathMatrix;
use crate::TRADING_DAYS_PER_YEAR;
use rayon::prelude::*;

/// Apply the annual cost at every completed policy year, in place
///
/// For each anniversary `y = 1, 2, ...` with `y * 252 < rows`, the value at
/// row `y * 252` and every later row of that path is multiplied by
/// `1 - annual_pct / 100`. Later anniversaries multiply already reduced
/// values, so the haircut compounds: after `n` anniversaries a path carries
/// `(1 - annual_pct / 100)^n`.
///
/// Anniversaries are counted from `days`; a non-positive cost leaves the
/// paths untouched.
pub fn apply_annual_costs(paths: &mut PathMatrix, annual_pct: f64, days: usize) -> Result<()> {
    if !annual_pct.is_finite() || annual_pct > 100.0 {
        return Err(EngineError::invalid_parameters(format!(
            "annual cost must be a finite percentage up to 100, got {annual_pct}"
        )));
    }
    if annual_pct <= 0.0 {
        return Ok(());
    }

    let factor = 1.0 - annual_pct / 100.0;
    let rows = paths.steps();
    let anniversaries: Vec<usize> = (1..=days / TRADING_DAYS_PER_YEAR)
        .map(|year| year * TRADING_DAYS_PER_YEAR)
        .filter(|&idx| idx < rows)
        .collect();

    paths
        .data_mut()
        .par_chunks_mut(rows)
        .for_each(|path| {
            for &idx in &anniversaries {
                path[idx..].iter_mut().for_each(|v| *v *= factor);
            }
        });
    Ok(())
}

/// Terminal payouts with the guaranteed capital as a floor
///
/// `payout = max(value, contribution * level)`: shortfalls are absorbed by
/// the insurer and upside is not capped.
pub fn floor_at_guarantee(terminal_values: &[f64], contribution: f64, level: f64) -> Vec<f64> {
    let guaranteed = contribution * level;
    terminal_values.iter().map(|&v| v.max(guaranteed)).collect()
}
