//! Per-class balancing loop around the sample synthesizer.
//!
//! For each of the three classes the driver walks an explicit state
//! machine: pick the target count (majority-class oversampling), run the
//! bounded generation loop, then record the outcome. Nothing in here is
//! fatal — missing base samples, exhausted budgets and shortfalls are all
//! reported, and the run continues.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sample::{Label, Sample};
use crate::stats::StatsTable;
use crate::synthesis::{SampleSynthesizer, SynthesisConfig};

/// Terminal state of one class's generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOutcome {
    /// Every needed sample was generated (possibly zero were needed).
    Balanced,
    /// Fewer samples than needed were generated before the slots ran out.
    Shortfall,
    /// Synthesis was needed but the class had no original base samples.
    NoBaseSamples,
    /// The per-class total-attempt ceiling terminated generation early.
    AttemptCeiling,
}

/// Generation report for one target class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassReport {
    /// The class being balanced.
    pub label: Label,
    /// Original rows carrying this label.
    pub original_count: usize,
    /// Synthetic samples needed to reach the majority count.
    pub needed: usize,
    /// Synthetic samples actually accepted.
    pub generated: usize,
    /// Total perturbation attempts spent on this class.
    pub attempts: usize,
    /// How the loop ended.
    pub outcome: ClassOutcome,
}

impl ClassReport {
    /// Count-vs-needed discrepancy (zero when balanced).
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.needed.saturating_sub(self.generated)
    }
}

/// Full balancing run report.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancingReport {
    /// Majority-class target count every class was raised toward.
    pub target_count: usize,
    /// One report per target class, in band order.
    pub classes: Vec<ClassReport>,
}

impl BalancingReport {
    /// Total synthetic samples accepted across classes.
    #[must_use]
    pub fn total_generated(&self) -> usize {
        self.classes.iter().map(|c| c.generated).sum()
    }

    /// Whether every class reached its needed count.
    #[must_use]
    pub fn is_fully_balanced(&self) -> bool {
        self.classes.iter().all(|c| c.shortfall() == 0)
    }
}

/// Phases of one class's balancing state machine.
enum ClassPhase {
    SelectTargetCount,
    GenerateLoop { needed: usize },
    Done(ClassReport),
}

/// Top-level balancing loop.
///
/// Owns the single shared random generator used for base-sample draws and
/// both perturbators; generation is single-threaded and synchronous.
///
/// # Examples
///
/// ```
/// use suelo::synthesis::{BalancingDriver, SynthesisConfig};
/// use suelo::stats::StatsTable;
///
/// let config = SynthesisConfig::default().with_seed(42);
/// let originals: Vec<suelo::sample::Sample> = Vec::new();
/// let stats = StatsTable::from_samples(&originals);
/// let mut driver = BalancingDriver::new(config, &stats);
/// let (synthetic, report) = driver.balance(&originals);
/// assert!(synthetic.is_empty());
/// assert_eq!(report.total_generated(), 0);
/// ```
#[derive(Debug)]
pub struct BalancingDriver<'a> {
    config: SynthesisConfig,
    stats: &'a StatsTable,
    rng: StdRng,
}

impl<'a> BalancingDriver<'a> {
    /// Create a driver over precomputed source statistics.
    #[must_use]
    pub fn new(config: SynthesisConfig, stats: &'a StatsTable) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, stats, rng }
    }

    /// Balance the dataset: generate synthetic samples until every class
    /// reaches the majority-class count or its budgets run out.
    ///
    /// `originals` must already carry labels (see the dataset module's
    /// labeling pass). Returns the accepted synthetic samples in
    /// generation order together with the per-class report.
    pub fn balance(&mut self, originals: &[Sample]) -> (Vec<Sample>, BalancingReport) {
        let target_count = self.select_target_count(originals);
        let config = &self.config;
        let rng = &mut self.rng;
        let mut synthesizer = SampleSynthesizer::new(self.stats, config);

        let mut accepted = Vec::new();
        let mut classes = Vec::with_capacity(Label::CLASSES.len());

        for label in Label::CLASSES {
            let report = balance_class(
                config,
                rng,
                label,
                target_count,
                originals,
                &mut synthesizer,
                &mut accepted,
            );
            classes.push(report);
        }

        (
            accepted,
            BalancingReport {
                target_count,
                classes,
            },
        )
    }

    /// Majority-class count, with the configured fallback when the
    /// majority itself counts zero labeled rows.
    fn select_target_count(&self, originals: &[Sample]) -> usize {
        let majority = Label::CLASSES
            .iter()
            .map(|label| count_class(originals, *label))
            .max()
            .unwrap_or(0);

        if majority > 0 {
            majority
        } else if originals.is_empty() {
            self.config.empty_majority_target
        } else {
            self.config
                .empty_majority_target
                .max(originals.len() / Label::CLASSES.len())
        }
    }
}

/// Walk one class through its balancing state machine.
fn balance_class(
    config: &SynthesisConfig,
    rng: &mut StdRng,
    label: Label,
    target_count: usize,
    originals: &[Sample],
    synthesizer: &mut SampleSynthesizer<'_>,
    accepted: &mut Vec<Sample>,
) -> ClassReport {
    let original_count = count_class(originals, label);
    let base_pool: Vec<&Sample> = originals
        .iter()
        .filter(|s| s.label == Some(label))
        .collect();

    let mut phase = ClassPhase::SelectTargetCount;
    let mut generated = 0usize;
    let mut attempts = 0usize;

    loop {
        phase = match phase {
            ClassPhase::SelectTargetCount => {
                let needed = target_count.saturating_sub(original_count);
                if needed == 0 {
                    ClassPhase::Done(ClassReport {
                        label,
                        original_count,
                        needed,
                        generated: 0,
                        attempts: 0,
                        outcome: ClassOutcome::Balanced,
                    })
                } else if base_pool.is_empty() {
                    // No originals to perturb: skip the class entirely.
                    ClassPhase::Done(ClassReport {
                        label,
                        original_count,
                        needed,
                        generated: 0,
                        attempts: 0,
                        outcome: ClassOutcome::NoBaseSamples,
                    })
                } else {
                    ClassPhase::GenerateLoop { needed }
                }
            }

            ClassPhase::GenerateLoop { needed } => {
                let ceiling = (needed as f64
                    * f64::from(config.per_sample_retries)
                    * config.class_attempt_multiplier) as usize;

                let mut hit_ceiling = false;
                while generated < needed {
                    if attempts > ceiling {
                        hit_ceiling = true;
                        break;
                    }

                    // One synthetic slot: bounded retries, fresh base
                    // draw and fresh noise on every attempt. Exhausting
                    // the retries abandons the slot; the ceiling bounds
                    // how many abandoned slots a class can burn.
                    for _ in 0..config.per_sample_retries {
                        attempts += 1;
                        let base = base_pool[rng.gen_range(0..base_pool.len())];
                        if let Some(sample) = synthesizer.try_generate(base, label, rng) {
                            accepted.push(sample);
                            generated += 1;
                            break;
                        }
                    }
                }

                let outcome = if hit_ceiling {
                    ClassOutcome::AttemptCeiling
                } else if generated < needed {
                    ClassOutcome::Shortfall
                } else {
                    ClassOutcome::Balanced
                };
                ClassPhase::Done(ClassReport {
                    label,
                    original_count,
                    needed,
                    generated,
                    attempts,
                    outcome,
                })
            }

            ClassPhase::Done(report) => return report,
        };
    }
}

fn count_class(samples: &[Sample], label: Label) -> usize {
    samples.iter().filter(|s| s.label == Some(label)).count()
}
