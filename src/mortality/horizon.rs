//! Contract horizon: from entry age to the (assumed) age at death

use super::MortalityTable;
use crate::error::{EngineError, Result};
use crate::plausibility::Diagnostics;
use crate::TRADING_DAYS_PER_YEAR;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Trading days between two ages (252 per year)
pub fn days_between_ages(start_age: u32, end_age: u32) -> usize {
    end_age.saturating_sub(start_age) as usize * TRADING_DAYS_PER_YEAR
}

/// How the age at death, and therefore the payout horizon, is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HorizonPolicy {
    /// Age at death supplied directly
    Fixed { death_age: u32 },
    /// Age by which the conditional death probability reaches `quantile`
    Quantile { quantile: f64 },
    /// Age at which survival drops to `1 - probability`
    SurvivalTarget { probability: f64 },
    /// Single draw from the mortality table
    Sampled,
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        HorizonPolicy::Fixed { death_age: 85 }
    }
}

/// Resolved horizon for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub entry_age: u32,
    pub death_age: u32,
    /// Whole years from entry to death
    pub years: u32,
    /// Trading days from entry to death
    pub days: usize,
    /// Probability of surviving from entry age to `death_age`
    pub survival_probability: f64,
}

impl HorizonPolicy {
    /// Resolve the death age for someone entering at `entry_age`
    ///
    /// A sampled death in the entry year is treated as a one-year horizon.
    /// Ages missing from the table while computing the survival probability
    /// are recorded in `diagnostics`.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        table: &MortalityTable,
        entry_age: u32,
        rng: &mut R,
        diagnostics: &mut Diagnostics,
    ) -> Result<Horizon> {
        let death_age = match *self {
            HorizonPolicy::Fixed { death_age } => death_age,
            HorizonPolicy::Quantile { quantile } => {
                check_probability("quantile", quantile)?;
                table.quantile_death_age(entry_age, quantile)
            }
            HorizonPolicy::SurvivalTarget { probability } => {
                check_probability("survival target", probability)?;
                table.age_at_survival_probability(entry_age, probability)
            }
            HorizonPolicy::Sampled => table.sample_death_age(entry_age, rng).max(entry_age + 1),
        };

        if death_age <= entry_age {
            return Err(EngineError::invalid_parameters(format!(
                "death age {death_age} must be greater than entry age {entry_age}"
            )));
        }

        let horizon = Horizon {
            entry_age,
            death_age,
            years: death_age - entry_age,
            days: days_between_ages(entry_age, death_age),
            survival_probability: table.survival_probability_with_diagnostics(entry_age, death_age, diagnostics),
        };
        info!(
            "Horizon {:?}: entry age {}, death age {}, {} years, survival probability {:.4}",
            self, entry_age, death_age, horizon.years, horizon.survival_probability
        );
        Ok(horizon)
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_parameters(format!("{name} must lie in (0, 1), got {p}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat_table() -> MortalityTable {
        let raw: Vec<(u32, f64)> = (50..=120).map(|a| (a, 0.1)).collect();
        MortalityTable::load(&raw).unwrap()
    }

    #[test]
    fn test_days_between_ages() {
        assert_eq!(days_between_ages(65, 85), 20 * 252);
        assert_eq!(days_between_ages(85, 65), 0);
    }

    #[test]
    fn test_fixed_horizon() {
        let mut rng = StdRng::seed_from_u64(1);
        let h = HorizonPolicy::Fixed { death_age: 85 }
            .resolve(&flat_table(), 65, &mut rng, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(h.years, 20);
        assert_eq!(h.days, 5040);
        assert!((h.survival_probability - 0.9_f64.powi(20)).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_horizon() {
        let mut rng = StdRng::seed_from_u64(1);
        let h = HorizonPolicy::Quantile { quantile: 0.5 }
            .resolve(&flat_table(), 60, &mut rng, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(h.death_age, 67);
    }

    #[test]
    fn test_fixed_horizon_must_be_after_entry() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = HorizonPolicy::Fixed { death_age: 60 }.resolve(&flat_table(), 60, &mut rng, &mut Diagnostics::new());
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }

    #[test]
    fn test_quantile_out_of_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = HorizonPolicy::Quantile { quantile: 1.5 }.resolve(&flat_table(), 60, &mut rng, &mut Diagnostics::new());
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }

    #[test]
    fn test_sampled_horizon_at_least_one_year() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let h = HorizonPolicy::Sampled
                .resolve(&flat_table(), 70, &mut rng, &mut Diagnostics::new())
                .unwrap();
            assert!(h.years >= 1);
        }
    }

    #[test]
    fn test_policy_deserializes() {
        let policy: HorizonPolicy =
            serde_json::from_str(r#"{"type": "survival_target", "probability": 0.95}"#).unwrap();
        assert_eq!(policy, HorizonPolicy::SurvivalTarget { probability: 0.95 });
    }
}
