//! Plausibility diagnostics and risk-class suitability checks

mod diagnostics;
mod checks;
mod risk_class;

pub use diagnostics::{Diagnostics, Severity, Warning, WarningCategory};
pub use checks::check_plausibility;
pub use risk_class::{RiskClass, check_instrument_suitability};
