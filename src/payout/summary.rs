//! Distribution statistics over final payouts

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Summary of the floored payouts of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// 5th percentile of payouts (VaR 95%)
    pub var_95: f64,
    /// Mean of payouts at or below `var_95` (CVaR 95%)
    pub cvar_95: f64,
    pub n_paths: usize,
}

impl PayoutSummary {
    pub fn from_payouts(payouts: &[f64]) -> Result<Self> {
        if payouts.is_empty() {
            return Err(EngineError::invalid_parameters("no payouts to summarise"));
        }
        let mut sorted = payouts.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let var_95 = percentile(&sorted, 5.0);
        let tail: Vec<f64> = sorted.iter().copied().take_while(|&v| v <= var_95).collect();
        // The minimum is always <= any interpolated percentile, so the tail is never empty
        let cvar_95 = if tail.is_empty() {
            sorted[0]
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        };

        Ok(Self {
            mean,
            min: sorted[0],
            max: sorted[n - 1],
            var_95,
            cvar_95,
            n_paths: n,
        })
    }
}

/// Percentile `p` (0-100) of sorted data, linear interpolation between ranks
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
