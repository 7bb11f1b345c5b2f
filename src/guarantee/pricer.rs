//! Black-Scholes put pricing and straight-line cost amortisation

use crate::error::{EngineError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Guarantee promised at the horizon for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeContract {
    /// Fraction of the contribution guaranteed, in (0, 1]
    pub level: f64,
    pub horizon_years: f64,
    /// Guaranteed capital: contribution * level
    pub strike: f64,
}

impl GuaranteeContract {
    pub fn new(contribution: f64, level: f64, horizon_years: f64) -> Result<Self> {
        if !(contribution > 0.0) || !contribution.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "contribution must be positive, got {contribution}"
            )));
        }
        if !(level > 0.0 && level <= 1.0) {
            return Err(EngineError::invalid_parameters(format!(
                "guarantee level must lie in (0, 1], got {level}"
            )));
        }
        if !(horizon_years > 0.0) || !horizon_years.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "horizon must be positive, got {horizon_years} years"
            )));
        }
        Ok(Self {
            level,
            horizon_years,
            strike: contribution * level,
        })
    }
}

/// Put premium and its annualised share of the contribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Fair value of the guarantee in currency
    pub put_price: f64,
    /// Premium / contribution / horizon, in percent per year
    pub annual_pct: f64,
}

/// Black-Scholes European put, floored at zero
///
/// `S0` is the invested amount, `K` the guaranteed capital, `T` the horizon in
/// years. With no time or no uncertainty only intrinsic value remains:
/// `max(K - S0, 0)`. Non-finite inputs and non-positive `S0` or `K` are
/// rejected rather than priced.
pub fn price_guarantee_put(s0: f64, k: f64, t: f64, sigma: f64, r: f64) -> Result<f64> {
    for (name, value) in [("S0", s0), ("K", k), ("T", t), ("sigma", sigma), ("r", r)] {
        if !value.is_finite() {
            return Err(EngineError::invalid_parameters(format!(
                "{name} must be finite, got {value}"
            )));
        }
    }
    if s0 <= 0.0 || k <= 0.0 {
        return Err(EngineError::invalid_parameters(format!(
            "S0 and K must be positive, got S0={s0}, K={k}"
        )));
    }
    if t <= 0.0 || sigma <= 0.0 {
        return Ok((k - s0).max(0.0));
    }

    let sqrt_t = t.sqrt();
    let d1 = ((s0 / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;

    let price = k * (-r * t).exp() * norm_cdf(-d2) - s0 * norm_cdf(-d1);
    if !price.is_finite() {
        return Err(EngineError::invalid_parameters(format!(
            "put price is not finite for S0={s0}, K={k}, T={t}, sigma={sigma}, r={r}"
        )));
    }
    // Rounding can leave tiny negatives deep out of the money
    Ok(price.max(0.0))
}

/// Annual guarantee cost in percent of the contribution
///
/// The put premium is amortised straight-line over the horizon:
/// `annual_pct = price / contribution / T * 100`.
pub fn get_guarantee_cost(
    contribution: f64,
    guarantee_level: f64,
    t: f64,
    sigma: f64,
    r: f64,
) -> Result<CostEstimate> {
    let contract = GuaranteeContract::new(contribution, guarantee_level, t)?;
    let put_price = price_guarantee_put(contribution, contract.strike, t, sigma, r)?;
    let annual_pct = (put_price / contribution) * (1.0 / t) * 100.0;

    debug!(
        "Guarantee {:.0}% over {:.1}y, sigma={:.4}: put={:.2}, cost={:.4}% p.a.",
        guarantee_level * 100.0, t, sigma, put_price, annual_pct
    );
    Ok(CostEstimate { put_price, annual_pct })
}

fn norm_cdf(x: f64) -> f64 {
    // Standard normal parameters are always valid
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.cdf(x),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_reference_scenario() {
        // S0=10000, K=8000, T=20, sigma=10%, r=1%: d1=1.1698, d2=0.7226
        let price = price_guarantee_put(10_000.0, 8_000.0, 20.0, 0.10, 0.01).unwrap();
        assert_abs_diff_eq!(price, 328.5, epsilon = 1.0);

        let cost = get_guarantee_cost(10_000.0, 0.8, 20.0, 0.10, 0.01).unwrap();
        assert_relative_eq!(cost.put_price, price);
        assert_abs_diff_eq!(cost.annual_pct, 0.164, epsilon = 0.001);
    }

    #[test]
    fn test_degenerate_cases_use_intrinsic_value() {
        assert_eq!(price_guarantee_put(100.0, 120.0, 0.0, 0.2, 0.01).unwrap(), 20.0);
        assert_eq!(price_guarantee_put(100.0, 120.0, 5.0, 0.0, 0.01).unwrap(), 20.0);
        assert_eq!(price_guarantee_put(100.0, 80.0, 0.0, 0.2, 0.01).unwrap(), 0.0);
        assert_eq!(price_guarantee_put(100.0, 80.0, -1.0, -0.2, 0.01).unwrap(), 0.0);
    }

    #[test]
    fn test_small_volatility_converges_to_discounted_intrinsic() {
        let (s0, k, t, r) = (100.0, 120.0, 5.0, 0.01);
        let price = price_guarantee_put(s0, k, t, 1e-6, r).unwrap();
        let expected = (k * (-r * t).exp() - s0).max(0.0);
        assert_abs_diff_eq!(price, expected, epsilon = 1e-6);

        // Out of the money after discounting: worthless
        let otm = price_guarantee_put(100.0, 100.0, 5.0, 1e-6, r).unwrap();
        assert_abs_diff_eq!(otm, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_put_call_parity() {
        // C - P = S0 - K e^{-rT}; call price from the closed form
        let (s0, k, t, sigma, r) = (100.0, 90.0, 3.0, 0.25, 0.02);
        let put = price_guarantee_put(s0, k, t, sigma, r).unwrap();
        let sqrt_t = t.sqrt();
        let d1 = ((s0 / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
        let d2 = d1 - sigma * sqrt_t;
        let call = s0 * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2);
        assert_abs_diff_eq!(call - put, s0 - k * (-r * t).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_price_increases_with_level_and_volatility() {
        let low = price_guarantee_put(10_000.0, 8_000.0, 20.0, 0.10, 0.01).unwrap();
        let high_level = price_guarantee_put(10_000.0, 10_000.0, 20.0, 0.10, 0.01).unwrap();
        let high_vol = price_guarantee_put(10_000.0, 8_000.0, 20.0, 0.20, 0.01).unwrap();
        assert!(high_level > low);
        assert!(high_vol > low);
    }

    #[test]
    fn test_zero_horizon_cost_is_rejected() {
        assert!(matches!(
            get_guarantee_cost(10_000.0, 0.9, 0.0, 0.1, 0.01),
            Err(EngineError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_non_finite_inputs_are_rejected() {
        assert!(matches!(
            price_guarantee_put(10_000.0, 8_000.0, 20.0, 0.10, f64::NAN),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            price_guarantee_put(10_000.0, 8_000.0, 20.0, f64::INFINITY, 0.01),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            price_guarantee_put(f64::NAN, 8_000.0, 20.0, 0.10, 0.01),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            get_guarantee_cost(10_000.0, 0.9, 20.0, 0.10, f64::NAN),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(matches!(
            get_guarantee_cost(10_000.0, 0.9, 20.0, f64::NAN, 0.01),
            Err(EngineError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_non_positive_prices_are_rejected() {
        assert!(price_guarantee_put(0.0, 8_000.0, 20.0, 0.10, 0.01).is_err());
        assert!(price_guarantee_put(10_000.0, -1.0, 20.0, 0.10, 0.01).is_err());
    }

    #[test]
    fn test_contract_validation() {
        let c = GuaranteeContract::new(10_000.0, 0.9, 15.0).unwrap();
        assert_relative_eq!(c.strike, 9_000.0);
        assert!(GuaranteeContract::new(10_000.0, 0.0, 15.0).is_err());
        assert!(GuaranteeContract::new(10_000.0, 1.1, 15.0).is_err());
        assert!(GuaranteeContract::new(0.0, 0.9, 15.0).is_err());
    }
}
