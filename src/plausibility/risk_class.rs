//! Investor risk classes (1 prudent to 5 aggressive)

use super::{Severity, Warning, WarningCategory};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk profile of the policyholder
///
/// Parsed from labels such as `"3 - Bilanciato"`; only the leading digit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RiskClass(u8);

impl RiskClass {
    pub fn new(level: u8) -> Result<Self> {
        if (1..=5).contains(&level) {
            Ok(Self(level))
        } else {
            Err(EngineError::invalid_parameters(format!(
                "risk class must be between 1 and 5, got {level}"
            )))
        }
    }

    pub fn parse(label: &str) -> Result<Self> {
        let key = label.split_whitespace().next().unwrap_or("");
        let level = key.parse::<u8>().map_err(|_| {
            EngineError::invalid_parameters(format!("unrecognised risk class '{label}'"))
        })?;
        Self::new(level)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Classes 1 and 2 hold bond-like instruments
    pub fn uses_bond_simulation(self) -> bool {
        self.0 <= 2
    }
}

impl Default for RiskClass {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<String> for RiskClass {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RiskClass> for String {
    fn from(class: RiskClass) -> Self {
        class.0.to_string()
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Warn when an instrument's estimated drift or volatility exceeds its class limits
///
/// - class 1: `mu < 0` or `sigma > 5%`
/// - class 2: `sigma > 10%`
/// - class 3: `sigma > 20%`
/// - classes 4 and 5: no limit
pub fn check_instrument_suitability(class: RiskClass, mu: f64, sigma: f64) -> Option<Warning> {
    let unsuitable = match class.level() {
        1 => mu < 0.0 || sigma > 0.05,
        2 => sigma > 0.10,
        3 => sigma > 0.20,
        _ => false,
    };
    unsuitable.then(|| {
        Warning::new(
            Severity::Warning,
            WarningCategory::RiskClassMismatch,
            format!(
                "Instrument with mu={:.2}%, sigma={:.2}% exceeds the limits of risk class {}",
                mu * 100.0,
                sigma * 100.0,
                class
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(RiskClass::parse("3 - Bilanciato").unwrap().level(), 3);
        assert_eq!(RiskClass::parse("1").unwrap().level(), 1);
        assert!(RiskClass::parse("Prudente").is_err());
        assert!(RiskClass::parse("6 - Speculativo").is_err());
        assert!(RiskClass::parse("").is_err());
    }

    #[test]
    fn test_bond_simulation_classes() {
        assert!(RiskClass::new(1).unwrap().uses_bond_simulation());
        assert!(RiskClass::new(2).unwrap().uses_bond_simulation());
        assert!(!RiskClass::new(3).unwrap().uses_bond_simulation());
    }

    #[test]
    fn test_suitability_limits() {
        let c1 = RiskClass::new(1).unwrap();
        assert!(check_instrument_suitability(c1, 0.01, 0.03).is_none());
        assert!(check_instrument_suitability(c1, -0.01, 0.03).is_some());
        assert!(check_instrument_suitability(c1, 0.01, 0.06).is_some());

        let c2 = RiskClass::new(2).unwrap();
        assert!(check_instrument_suitability(c2, -0.01, 0.08).is_none());
        assert!(check_instrument_suitability(c2, 0.02, 0.12).is_some());

        let c3 = RiskClass::new(3).unwrap();
        assert!(check_instrument_suitability(c3, 0.05, 0.25).is_some());

        let c5 = RiskClass::new(5).unwrap();
        assert!(check_instrument_suitability(c5, -0.3, 0.9).is_none());
    }

    #[test]
    fn test_deserialize_from_label() {
        let class: RiskClass = serde_json::from_str("\"2 - Moderato\"").unwrap();
        assert_eq!(class.level(), 2);
    }
}
