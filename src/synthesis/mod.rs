//! Synthetic sample generation with class-conditioned rejection sampling.
//!
//! One attempt perturbs a real base sample (numeric noise plus the
//! compositional texture handling), re-scores the candidate against the
//! criteria table and accepts it only when the fresh classification matches
//! the intended target class. The [`driver`] module runs the per-class
//! balancing loop around this.
//!
//! # Quick Start
//!
//! ```
//! use suelo::synthesis::SynthesisConfig;
//!
//! let config = SynthesisConfig::default()
//!     .with_noise_fraction(0.05)
//!     .with_seed(42);
//! assert_eq!(config.per_sample_retries, 30);
//! ```

pub mod driver;

pub use driver::{BalancingDriver, BalancingReport, ClassOutcome, ClassReport};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::criteria::CriteriaTable;
use crate::error::Result;
use crate::perturb::{CompositionalPerturbator, NumericPerturbator};
use crate::sample::{Label, Provenance, Sample};
use crate::scoring::{score_sample, ScoreBands};
use crate::stats::StatsTable;

/// Configuration for synthetic sample generation.
///
/// Every tunable the core consumes lives here; no process-wide state.
/// Defaults reproduce the reference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Per-attribute acceptable ranges for the target crop.
    pub criteria: CriteriaTable,
    /// Score bands mapping scores onto the three labels.
    pub bands: ScoreBands,
    /// Fraction of an attribute's standard deviation used as noise sigma.
    pub noise_fraction: f64,
    /// Attempts allowed per synthetic slot before abandoning it.
    pub per_sample_retries: u32,
    /// Multiplier on `needed * per_sample_retries` bounding total attempts
    /// for one class.
    pub class_attempt_multiplier: f64,
    /// Attempts allowed for the constrained texture search before falling
    /// back to noise mode.
    pub texture_retry_budget: u32,
    /// First identifier assigned to synthetic samples.
    pub first_synthetic_id: u64,
    /// Floor for the per-class target count when the majority class of a
    /// non-empty dataset counts zero labeled rows.
    pub empty_majority_target: usize,
    /// Seed for the shared random generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            criteria: CriteriaTable::corn(),
            bands: ScoreBands::default(),
            noise_fraction: 0.05,
            per_sample_retries: 30,
            class_attempt_multiplier: 1.5,
            texture_retry_budget: 500,
            first_synthetic_id: 782,
            empty_majority_target: 10,
            seed: None,
        }
    }
}

impl SynthesisConfig {
    /// Create the reference configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the criteria table.
    #[must_use]
    pub fn with_criteria(mut self, criteria: CriteriaTable) -> Self {
        self.criteria = criteria;
        self
    }

    /// Set the score bands.
    #[must_use]
    pub fn with_bands(mut self, bands: ScoreBands) -> Self {
        self.bands = bands;
        self
    }

    /// Set the noise fraction.
    #[must_use]
    pub fn with_noise_fraction(mut self, fraction: f64) -> Self {
        self.noise_fraction = fraction;
        self
    }

    /// Set the per-slot retry budget.
    #[must_use]
    pub fn with_per_sample_retries(mut self, retries: u32) -> Self {
        self.per_sample_retries = retries;
        self
    }

    /// Set the per-class attempt ceiling multiplier.
    #[must_use]
    pub fn with_class_attempt_multiplier(mut self, multiplier: f64) -> Self {
        self.class_attempt_multiplier = multiplier;
        self
    }

    /// Set the first synthetic identifier.
    #[must_use]
    pub fn with_first_synthetic_id(mut self, id: u64) -> Self {
        self.first_synthetic_id = id;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check parameter ranges, criteria ranges and band ordering.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a negative noise fraction, a zero retry
    /// budget, a multiplier below 1, an inverted criterion range, or
    /// inconsistent score bands.
    pub fn validate(&self) -> Result<()> {
        if self.noise_fraction < 0.0 {
            return Err(crate::error::SueloError::invalid_config(
                "noise_fraction",
                self.noise_fraction,
                ">= 0",
            ));
        }
        if self.per_sample_retries == 0 {
            return Err(crate::error::SueloError::invalid_config(
                "per_sample_retries",
                self.per_sample_retries,
                ">= 1",
            ));
        }
        if self.class_attempt_multiplier < 1.0 {
            return Err(crate::error::SueloError::invalid_config(
                "class_attempt_multiplier",
                self.class_attempt_multiplier,
                ">= 1",
            ));
        }
        for (name, criterion) in self.criteria.iter() {
            if criterion.high.is_some_and(|high| criterion.low > high) {
                return Err(crate::error::SueloError::invalid_config(
                    &format!("criteria.{name}"),
                    criterion.low,
                    "low <= high",
                ));
            }
        }
        self.bands.validate()
    }
}

/// Produces one synthetic candidate per call and accepts or rejects it.
///
/// Owns the monotonic synthetic identifier counter; ids are unique and
/// traceable to generation order.
#[derive(Debug)]
pub struct SampleSynthesizer<'a> {
    numeric: NumericPerturbator<'a>,
    compositional: CompositionalPerturbator<'a>,
    bands: ScoreBands,
    criteria: &'a CriteriaTable,
    next_id: u64,
}

impl<'a> SampleSynthesizer<'a> {
    /// Build a synthesizer over the shared stats table and configuration.
    #[must_use]
    pub fn new(stats: &'a StatsTable, config: &'a SynthesisConfig) -> Self {
        Self {
            numeric: NumericPerturbator::new(stats, config.noise_fraction),
            compositional: CompositionalPerturbator::new(
                stats,
                &config.criteria,
                config.noise_fraction,
                config.texture_retry_budget,
            ),
            bands: config.bands,
            criteria: &config.criteria,
            next_id: config.first_synthetic_id,
        }
    }

    /// Identifier the next accepted sample will receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// One perturbation attempt.
    ///
    /// Returns the accepted candidate, stamped with a fresh identifier,
    /// synthetic provenance, the recorded target class and the freshly
    /// computed score and label — or `None` when the perturbed sample does
    /// not classify as `target`. No state carries across rejected attempts.
    pub fn try_generate(
        &mut self,
        base: &Sample,
        target: Label,
        rng: &mut StdRng,
    ) -> Option<Sample> {
        let mut candidate = base.clone();

        self.numeric.perturb(&mut candidate, rng);
        let composition = self.compositional.perturb(base, target, rng);
        composition.apply(&mut candidate);

        let score = score_sample(&candidate, self.criteria);
        let label = self.bands.classify(score);
        if label != target {
            return None;
        }

        candidate.id = self.next_id;
        self.next_id += 1;
        candidate.provenance = Provenance::Synthetic;
        candidate.target_class = Some(target);
        candidate.score = Some(score);
        candidate.label = Some(label);
        Some(candidate)
    }
}
