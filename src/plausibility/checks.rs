//! Sanity checks on a finished run's mean payout against its inputs

use super::{Severity, Warning, WarningCategory};

/// Flag implausible combinations of simulated mean payout and input assumptions
///
/// Pure function: returns warnings in a fixed order, one per triggered rule.
pub fn check_plausibility(
    guaranteed_amount: f64,
    mean_final: f64,
    mu: f64,
    sigma: f64,
    label: &str,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let ratio = if guaranteed_amount > 0.0 {
        mean_final / guaranteed_amount
    } else {
        0.0
    };

    if mean_final <= guaranteed_amount {
        warnings.push(Warning::new(
            Severity::Warning,
            WarningCategory::GuaranteeBinding,
            format!(
                "{label}: mean payout ({mean_final:.0} EUR) <= guaranteed capital ({guaranteed_amount:.0} EUR)"
            ),
        ));
    }
    if ratio > 3.0 {
        warnings.push(Warning::new(
            Severity::Alert,
            WarningCategory::ImplausibleMultiple,
            format!(
                "{label}: mean/guarantee ratio is very high ({ratio:.1}), mu={:.2}%, sigma={:.2}%",
                mu * 100.0,
                sigma * 100.0
            ),
        ));
    }
    if mu < 0.0 && mean_final > guaranteed_amount {
        warnings.push(Warning::new(
            Severity::Notice,
            WarningCategory::NegativeDriftPositiveOutcome,
            format!("{label}: negative mu but positive mean outcome ({mean_final:.0} EUR)"),
        ));
    }
    if sigma < 0.05 && ratio > 1.5 {
        warnings.push(Warning::new(
            Severity::Alert,
            WarningCategory::LowVolatilityHighReturn,
            format!("{label}: low volatility (sigma={:.2}%) but high result", sigma * 100.0),
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(warnings: &[Warning]) -> Vec<WarningCategory> {
        warnings.iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_reasonable_result_is_clean() {
        let w = check_plausibility(9_000.0, 14_000.0, 0.05, 0.12, "Guarantee 90%");
        assert!(w.is_empty());
    }

    #[test]
    fn test_binding_guarantee() {
        let w = check_plausibility(10_000.0, 10_000.0, 0.03, 0.1, "Guarantee 100%");
        assert_eq!(categories(&w), vec![WarningCategory::GuaranteeBinding]);
        assert!(w[0].message.starts_with("Guarantee 100%:"));
    }

    #[test]
    fn test_high_multiple_with_low_volatility() {
        let w = check_plausibility(8_000.0, 32_000.0, 0.07, 0.03, "G80");
        assert_eq!(
            categories(&w),
            vec![WarningCategory::ImplausibleMultiple, WarningCategory::LowVolatilityHighReturn]
        );
        assert!(w.iter().all(|x| x.severity == Severity::Alert));
    }

    #[test]
    fn test_negative_drift_positive_outcome() {
        let w = check_plausibility(8_000.0, 9_000.0, -0.01, 0.2, "G80");
        assert_eq!(categories(&w), vec![WarningCategory::NegativeDriftPositiveOutcome]);
    }

    #[test]
    fn test_zero_guarantee_ratio() {
        // Ratio rules are disabled without a guarantee
        let w = check_plausibility(0.0, 50_000.0, 0.05, 0.01, "none");
        assert!(w.is_empty());
    }
}
