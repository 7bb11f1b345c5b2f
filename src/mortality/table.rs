//! Age-indexed one-year death probabilities

use super::MAX_AGE;
use crate::error::{EngineError, Result};
use crate::plausibility::{Diagnostics, Severity, Warning, WarningCategory};
use log::warn;
use rand::Rng;

/// One tabulated age
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortalityRow {
    pub age: u32,
    /// One-year death probability at `age`
    pub qx: f64,
    /// Cumulative qx normalized so the last row equals 1.0
    pub cum_qx: f64,
}

/// Mortality table sorted by age
///
/// Built once at load time and read-only afterwards.
#[derive(Debug, Clone)]
pub struct MortalityTable {
    rows: Vec<MortalityRow>,
}

impl MortalityTable {
    /// Validate and normalize raw `(age, qx)` pairs
    ///
    /// - qx values given as percentages (max > 1) are divided by 100
    /// - `cum_qx` is the running sum of qx, rescaled so the final entry is 1.0
    pub fn load(raw: &[(u32, f64)]) -> Result<Self> {
        if raw.is_empty() {
            return Err(EngineError::invalid_table("no rows"));
        }
        if let Some(&(age, qx)) = raw.iter().find(|(_, qx)| !qx.is_finite() || *qx < 0.0) {
            return Err(EngineError::invalid_table(format!("qx at age {age} is {qx}")));
        }

        let mut pairs = raw.to_vec();
        pairs.sort_by_key(|&(age, _)| age);
        if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(EngineError::invalid_table(format!("age {} appears twice", w[0].0)));
        }

        let max_qx = pairs.iter().map(|&(_, qx)| qx).fold(0.0, f64::max);
        let scale = if max_qx > 1.0 { 100.0 } else { 1.0 };
        if max_qx / scale > 1.0 {
            return Err(EngineError::invalid_table(format!(
                "qx of {max_qx} is not a probability or percentage"
            )));
        }

        let mut running = 0.0;
        let mut rows: Vec<MortalityRow> = pairs
            .iter()
            .map(|&(age, qx)| {
                let qx = qx / scale;
                running += qx;
                MortalityRow { age, qx, cum_qx: running }
            })
            .collect();

        let total = running;
        if total <= 0.0 {
            return Err(EngineError::invalid_table("all qx values are zero"));
        }
        for row in &mut rows {
            row.cum_qx /= total;
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MortalityRow] {
        &self.rows
    }

    pub fn min_age(&self) -> u32 {
        self.rows[0].age
    }

    pub fn max_age(&self) -> u32 {
        self.rows[self.rows.len() - 1].age
    }

    /// qx for an exact tabulated age
    pub fn qx(&self, age: u32) -> Option<f64> {
        self.rows
            .binary_search_by_key(&age, |r| r.age)
            .ok()
            .map(|i| self.rows[i].qx)
    }

    /// qx, treating untabulated ages as certain survival
    fn qx_or_zero(&self, age: u32) -> f64 {
        self.qx(age).unwrap_or(0.0)
    }

    /// Inverse-CDF lookup of a death age for a given uniform draw `r`
    ///
    /// Returns the smallest tabulated age `>= current_age` whose cumulative
    /// probability is `>= r`, otherwise the maximum tabulated age.
    ///
    /// The global (unconditional) cumulative column is reused as-is; it is
    /// not re-based on survival to `current_age`.
    pub fn death_age_for_uniform(&self, current_age: u32, r: f64) -> u32 {
        let start = self.rows.partition_point(|row| row.age < current_age);
        let eligible = &self.rows[start..];
        eligible
            .iter()
            .find(|row| row.cum_qx >= r)
            .or_else(|| eligible.last())
            .map_or_else(|| self.max_age(), |row| row.age)
    }

    /// Draw a death age for someone currently aged `current_age`
    pub fn sample_death_age<R: Rng + ?Sized>(&self, current_age: u32, rng: &mut R) -> u32 {
        let r: f64 = rng.gen();
        self.death_age_for_uniform(current_age, r)
    }

    /// Probability of surviving every year in `[start_age, death_age)`
    ///
    /// Ages missing from the table are skipped and logged. An empty range
    /// gives 1.0; a non-empty range in which no age is tabulated gives 0.0.
    pub fn survival_probability(&self, start_age: u32, death_age: u32) -> f64 {
        let mut diagnostics = Diagnostics::new();
        self.survival_probability_with_diagnostics(start_age, death_age, &mut diagnostics)
    }

    /// Same as [`survival_probability`](Self::survival_probability), recording skipped ages
    pub fn survival_probability_with_diagnostics(
        &self,
        start_age: u32,
        death_age: u32,
        diagnostics: &mut Diagnostics,
    ) -> f64 {
        if start_age >= death_age {
            return 1.0;
        }

        let mut survival = 1.0;
        let mut contributing = 0usize;
        for age in start_age..death_age {
            match self.qx(age) {
                Some(qx) => {
                    survival *= 1.0 - qx.clamp(0.0, 1.0);
                    contributing += 1;
                }
                None => {
                    warn!("No qx value found for age {age}, treating the year as survived");
                    diagnostics.push(Warning::new(
                        Severity::Notice,
                        WarningCategory::MissingMortalityRate,
                        format!("No qx value found for age {age}"),
                    ));
                }
            }
        }

        if contributing == 0 {
            return 0.0;
        }
        survival
    }

    /// First age after `start_age` at which the conditional death probability reaches `quantile`
    ///
    /// Accumulates `cumulative += qx * (1 - cumulative)`; capped at age 120.
    pub fn quantile_death_age(&self, start_age: u32, quantile: f64) -> u32 {
        let mut cumulative = 0.0;
        for age in start_age.saturating_add(1)..=MAX_AGE {
            let qx = self.qx_or_zero(age);
            cumulative += qx * (1.0 - cumulative);
            if cumulative >= quantile {
                return age;
            }
        }
        MAX_AGE
    }

    /// First age after `start_age` at which survival drops to `1 - target_prob` or below
    ///
    /// Capped at age 120.
    pub fn age_at_survival_probability(&self, start_age: u32, target_prob: f64) -> u32 {
        let mut survival = 1.0;
        for age in start_age.saturating_add(1)..=MAX_AGE {
            survival *= 1.0 - self.qx_or_zero(age);
            if survival <= 1.0 - target_prob {
                return age;
            }
        }
        MAX_AGE
    }
}
