//! Severity-tagged warnings collected during a run

use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a warning calls the result into question
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; the result stands
    Notice,
    /// Result is questionable
    Warning,
    /// Result is very likely implausible
    Alert,
}

/// What a warning is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// Mean payout at or below the guaranteed capital
    GuaranteeBinding,
    /// Mean payout more than three times the guarantee
    ImplausibleMultiple,
    /// Positive outcome although the expected drift is negative
    NegativeDriftPositiveOutcome,
    /// High return with very low volatility
    LowVolatilityHighReturn,
    /// Instrument drift/volatility outside its risk class limits
    RiskClassMismatch,
    /// Volatility estimate replaced by the fallback
    VolatilityFallback,
    /// Age skipped in a survival product
    MissingMortalityRate,
}

/// One diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Severity,
    pub category: WarningCategory,
    pub message: String,
}

impl Warning {
    pub fn new(severity: Severity, category: WarningCategory, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}

/// Ordered warnings produced by one run; never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn extend<I: IntoIterator<Item = Warning>>(&mut self, warnings: I) {
        self.warnings.extend(warnings);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Highest severity present, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }

    pub fn has_category(&self, category: WarningCategory) -> bool {
        self.warnings.iter().any(|w| w.category == category)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Warning;
    type IntoIter = std::vec::IntoIter<Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_query() {
        let mut d = Diagnostics::new();
        assert!(d.is_empty());
        assert_eq!(d.max_severity(), None);

        d.push(Warning::new(Severity::Notice, WarningCategory::MissingMortalityRate, "age 99"));
        d.extend(vec![Warning::new(
            Severity::Alert,
            WarningCategory::ImplausibleMultiple,
            "ratio 4.2",
        )]);

        assert_eq!(d.len(), 2);
        assert_eq!(d.max_severity(), Some(Severity::Alert));
        assert!(d.has_category(WarningCategory::ImplausibleMultiple));
        assert!(!d.has_category(WarningCategory::GuaranteeBinding));
        assert_eq!(d.warnings()[0].to_string(), "[Notice] age 99");
    }

    #[test]
    fn test_serializes_as_list() {
        let mut d = Diagnostics::new();
        d.push(Warning::new(Severity::Warning, WarningCategory::GuaranteeBinding, "binding"));
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(
            json,
            r#"[{"severity":"warning","category":"guarantee_binding","message":"binding"}]"#
        );
    }
}
