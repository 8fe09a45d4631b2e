//! Convenience re-exports of the most commonly used types.
//!
//! ```
//! use suelo::prelude::*;
//!
//! let config = SynthesisConfig::default().with_seed(42);
//! assert!(config.validate().is_ok());
//! ```

pub use crate::criteria::{Criterion, CriteriaTable};
pub use crate::dataset::SoilDataset;
pub use crate::error::{Result, SueloError};
pub use crate::explore::{describe, ClassDistribution};
pub use crate::perturb::{Composition, CompositionalPerturbator, NumericPerturbator};
pub use crate::sample::{Label, Provenance, Sample, SampleSchema};
pub use crate::scoring::{score_sample, ScoreBands};
pub use crate::stats::{AttributeStats, StatsTable};
pub use crate::synthesis::{
    BalancingDriver, BalancingReport, ClassOutcome, ClassReport, SampleSynthesizer,
    SynthesisConfig,
};
