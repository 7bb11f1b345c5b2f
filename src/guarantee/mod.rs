//! Pricing of the minimum capital guarantee as an embedded European put

mod pricer;

pub use pricer::{GuaranteeContract, CostEstimate, price_guarantee_put, get_guarantee_cost};

/// Default risk-free rate used for guarantee pricing (1%)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;
