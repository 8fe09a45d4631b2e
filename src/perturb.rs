//! Bounded-noise perturbation of soil samples.
//!
//! Two perturbators share the work of producing a synthetic candidate from
//! a base sample:
//!
//! - [`NumericPerturbator`] adds Gaussian noise, scaled by a fraction of
//!   each attribute's standard deviation, to every non-texture attribute
//!   and clamps the result to the attribute's observed range.
//! - [`CompositionalPerturbator`] handles the sand/clay/silt triple, which
//!   must sum to 100: perturbing the three fractions independently and
//!   clamping (as done for other attributes) would break the constraint.

use rand::rngs::StdRng;
use rand::Rng;

use crate::criteria::{CriteriaTable, CLAY, SAND, SILT, TEXTURE_COLUMNS};
use crate::sample::{Label, Sample};
use crate::stats::StatsTable;

/// Tolerance on the texture sum constraint.
pub const TEXTURE_SUM_EPSILON: f64 = 1e-5;

/// Near-equal split used when a base sample carries no texture values.
const DEFAULT_TEXTURE: (f64, f64, f64) = (33.3, 33.3, 33.4);

/// Equal split used when every noised texture value collapses to zero.
const EQUAL_SPLIT: (f64, f64, f64) = (33.33, 33.33, 33.34);

/// Draw from N(0, `std_dev`) via the Box–Muller transform.
///
/// Returns exactly zero for a non-positive standard deviation, so
/// degenerate attributes pass through unperturbed.
pub fn gaussian(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.gen_range(1e-10_f64..1.0);
    let u2: f64 = rng.gen_range(0.0_f64..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    std_dev * z
}

/// Gaussian perturbation of non-compositional numeric attributes.
///
/// Noise magnitude is `stats[a].std * noise_fraction`; perturbed values
/// are clamped to `[min_orig, max_orig]`. Attributes with zero standard
/// deviation or a missing value pass through unchanged.
#[derive(Debug)]
pub struct NumericPerturbator<'a> {
    stats: &'a StatsTable,
    noise_fraction: f64,
}

impl<'a> NumericPerturbator<'a> {
    /// Create a perturbator over a precomputed stats table.
    #[must_use]
    pub fn new(stats: &'a StatsTable, noise_fraction: f64) -> Self {
        Self {
            stats,
            noise_fraction,
        }
    }

    /// Perturb every non-texture attribute of `sample` in place.
    pub fn perturb(&self, sample: &mut Sample, rng: &mut StdRng) {
        let names: Vec<String> = sample
            .attribute_names()
            .filter(|name| !TEXTURE_COLUMNS.contains(name))
            .map(str::to_string)
            .collect();

        for name in names {
            let Some(value) = sample.value(&name) else {
                continue;
            };
            let Some(stats) = self.stats.get(&name) else {
                continue;
            };
            if stats.std <= 0.0 {
                continue;
            }
            let noise = gaussian(rng, stats.std * self.noise_fraction);
            let perturbed = (value + noise).clamp(stats.min_orig, stats.max_orig);
            sample.set(&name, perturbed);
        }
    }
}

/// A sand/clay/silt triple summing to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    /// Sand fraction in percent.
    pub sand: f64,
    /// Clay fraction in percent.
    pub clay: f64,
    /// Silt fraction in percent.
    pub silt: f64,
}

impl Composition {
    /// Sum of the three fractions.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sand + self.clay + self.silt
    }

    /// Write the triple into a sample's texture columns.
    pub fn apply(&self, sample: &mut Sample) {
        sample.set(SAND, self.sand);
        sample.set(CLAY, self.clay);
        sample.set(SILT, self.silt);
    }
}

/// Texture-triple perturbation under the sum-to-100 constraint.
///
/// Two modes:
///
/// - **Constrained search**, active only when the target class is
///   [`Label::High`] and all three texture criteria carry bounded ranges:
///   rejection-samples a triple satisfying every range and summing to 100,
///   biasing synthesis toward the class's textural requirement.
/// - **Noise-then-renormalize**, the general case and the fallback when
///   the search budget is exhausted: Gaussian noise on the base values,
///   floored at zero, rescaled so the triple sums to exactly 100 with silt
///   derived as the remainder.
#[derive(Debug)]
pub struct CompositionalPerturbator<'a> {
    stats: &'a StatsTable,
    criteria: &'a CriteriaTable,
    noise_fraction: f64,
    search_budget: u32,
}

impl<'a> CompositionalPerturbator<'a> {
    /// Create a perturbator over the shared stats and criteria tables.
    #[must_use]
    pub fn new(
        stats: &'a StatsTable,
        criteria: &'a CriteriaTable,
        noise_fraction: f64,
        search_budget: u32,
    ) -> Self {
        Self {
            stats,
            criteria,
            noise_fraction,
            search_budget,
        }
    }

    /// Produce a texture triple for a candidate derived from `base`.
    ///
    /// Always returns a composition summing to 100 within
    /// [`TEXTURE_SUM_EPSILON`], with every component non-negative.
    #[must_use]
    pub fn perturb(&self, base: &Sample, target: Label, rng: &mut StdRng) -> Composition {
        if target == Label::High && self.criteria.has_bounded_texture() {
            if let Some(found) = self.constrained_search(rng) {
                return found;
            }
            // Search budget exhausted: infeasible ranges are recovered
            // locally, never surfaced as an error.
        }
        self.noise_renormalize(base, rng)
    }

    /// Rejection-sample a triple inside the criteria ranges.
    ///
    /// Sand is drawn uniformly from its range; the feasible clay interval
    /// follows from the sum constraint and the silt range; silt is the
    /// remainder. First success within the budget wins.
    fn constrained_search(&self, rng: &mut StdRng) -> Option<Composition> {
        let sand_crit = self.criteria.get(SAND)?;
        let clay_crit = self.criteria.get(CLAY)?;
        let silt_crit = self.criteria.get(SILT)?;

        let (s_min, s_max) = (sand_crit.low, sand_crit.high?);
        let (c_min, c_max) = (clay_crit.low, clay_crit.high?);
        let (l_min, l_max) = (silt_crit.low, silt_crit.high?);

        // An inverted range has no feasible region; noise mode takes over.
        if s_min > s_max || c_min > c_max || l_min > l_max {
            return None;
        }

        for _ in 0..self.search_budget {
            let sand = rng.gen_range(s_min..=s_max);
            let clay_lower = c_min.max(100.0 - sand - l_max);
            let clay_upper = c_max.min(100.0 - sand - l_min);
            if clay_lower > clay_upper {
                continue;
            }
            let clay = rng.gen_range(clay_lower..=clay_upper);
            let silt = 100.0 - sand - clay;
            if silt >= l_min
                && silt <= l_max
                && (sand + clay + silt - 100.0).abs() < TEXTURE_SUM_EPSILON
            {
                return Some(Composition { sand, clay, silt });
            }
        }
        None
    }

    /// Noise the base triple and renormalize to sum to 100.
    fn noise_renormalize(&self, base: &Sample, rng: &mut StdRng) -> Composition {
        let sand_base = base.value(SAND).unwrap_or(DEFAULT_TEXTURE.0);
        let clay_base = base.value(CLAY).unwrap_or(DEFAULT_TEXTURE.1);
        let silt_base = base.value(SILT).unwrap_or(DEFAULT_TEXTURE.2);

        let sand = (sand_base + self.texture_noise(SAND, rng)).max(0.0);
        let clay = (clay_base + self.texture_noise(CLAY, rng)).max(0.0);
        let silt = (silt_base + self.texture_noise(SILT, rng)).max(0.0);

        let sum = sand + clay + silt;
        if sum > TEXTURE_SUM_EPSILON {
            let sand = sand / sum * 100.0;
            let clay = clay / sum * 100.0;
            Composition {
                sand,
                clay,
                silt: 100.0 - sand - clay,
            }
        } else {
            Composition {
                sand: EQUAL_SPLIT.0,
                clay: EQUAL_SPLIT.1,
                silt: EQUAL_SPLIT.2,
            }
        }
    }

    fn texture_noise(&self, column: &str, rng: &mut StdRng) -> f64 {
        gaussian(rng, self.stats.std(column) * self.noise_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsTable;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn sample_with(pairs: &[(&str, Option<f64>)]) -> Sample {
        let attrs = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect::<BTreeMap<_, _>>();
        Sample::new(0, attrs)
    }

    fn stats_for(samples: &[Sample]) -> StatsTable {
        StatsTable::from_samples(samples)
    }

    fn spread_samples(column: &str, values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .map(|v| sample_with(&[(column, Some(*v))]))
            .collect()
    }

    #[test]
    fn test_gaussian_zero_std() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(gaussian(&mut rng, 0.0), 0.0);
        assert_eq!(gaussian(&mut rng, -1.0), 0.0);
    }

    #[test]
    fn test_numeric_perturb_clamped() {
        let source = spread_samples("pH", &[4.0, 5.0, 6.0, 7.0, 8.0]);
        let stats = stats_for(&source);
        let perturbator = NumericPerturbator::new(&stats, 5.0); // huge noise on purpose
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let mut sample = sample_with(&[("pH", Some(6.0))]);
            perturbator.perturb(&mut sample, &mut rng);
            let v = sample.value("pH").unwrap();
            assert!((4.0..=8.0).contains(&v), "clamp violated: {v}");
        }
    }

    #[test]
    fn test_numeric_perturb_zero_std_untouched() {
        let source = spread_samples("pH", &[6.0, 6.0, 6.0]);
        let stats = stats_for(&source);
        let perturbator = NumericPerturbator::new(&stats, 0.05);
        let mut rng = StdRng::seed_from_u64(1);

        let mut sample = sample_with(&[("pH", Some(6.0))]);
        perturbator.perturb(&mut sample, &mut rng);
        assert_eq!(sample.value("pH"), Some(6.0));
    }

    #[test]
    fn test_numeric_perturb_missing_untouched() {
        let source = spread_samples("pH", &[4.0, 8.0]);
        let stats = stats_for(&source);
        let perturbator = NumericPerturbator::new(&stats, 0.05);
        let mut rng = StdRng::seed_from_u64(1);

        let mut sample = sample_with(&[("pH", None)]);
        perturbator.perturb(&mut sample, &mut rng);
        assert_eq!(sample.value("pH"), None);
    }

    #[test]
    fn test_numeric_perturb_skips_texture() {
        let source = vec![
            sample_with(&[(SAND, Some(20.0)), ("pH", Some(4.0))]),
            sample_with(&[(SAND, Some(60.0)), ("pH", Some(8.0))]),
        ];
        let stats = stats_for(&source);
        let perturbator = NumericPerturbator::new(&stats, 0.5);
        let mut rng = StdRng::seed_from_u64(3);

        let mut sample = sample_with(&[(SAND, Some(40.0)), ("pH", Some(6.0))]);
        perturbator.perturb(&mut sample, &mut rng);
        assert_eq!(sample.value(SAND), Some(40.0));
    }

    fn texture_stats() -> StatsTable {
        stats_for(&[
            sample_with(&[(SAND, Some(20.0)), (CLAY, Some(30.0)), (SILT, Some(50.0))]),
            sample_with(&[(SAND, Some(40.0)), (CLAY, Some(25.0)), (SILT, Some(35.0))]),
            sample_with(&[(SAND, Some(60.0)), (CLAY, Some(15.0)), (SILT, Some(25.0))]),
        ])
    }

    #[test]
    fn test_constrained_search_succeeds() {
        // Feasible region is non-empty by construction: e.g. 40/30/30.
        let stats = texture_stats();
        let criteria = CriteriaTable::corn();
        let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 500);
        let base = sample_with(&[(SAND, Some(40.0)), (CLAY, Some(30.0)), (SILT, Some(30.0))]);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let comp = perturbator.perturb(&base, Label::High, &mut rng);
            assert!((comp.sum() - 100.0).abs() < 1e-4);
            assert!(criteria.get(SAND).unwrap().contains(comp.sand));
            assert!(criteria.get(CLAY).unwrap().contains(comp.clay));
            assert!(criteria.get(SILT).unwrap().contains(comp.silt));
        }
    }

    #[test]
    fn test_infeasible_ranges_fall_back_to_noise() {
        // Ranges whose sums can never reach 100 force the fallback path.
        let stats = texture_stats();
        let criteria = CriteriaTable::new(vec![
            (SAND.to_string(), crate::criteria::Criterion::range(0.0, 10.0)),
            (CLAY.to_string(), crate::criteria::Criterion::range(0.0, 10.0)),
            (SILT.to_string(), crate::criteria::Criterion::range(0.0, 10.0)),
        ]);
        let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 50);
        let base = sample_with(&[(SAND, Some(40.0)), (CLAY, Some(30.0)), (SILT, Some(30.0))]);
        let mut rng = StdRng::seed_from_u64(5);

        let comp = perturbator.perturb(&base, Label::High, &mut rng);
        assert!((comp.sum() - 100.0).abs() < 1e-4);
        assert!(comp.sand >= 0.0 && comp.clay >= 0.0 && comp.silt >= 0.0);
    }

    #[test]
    fn test_inverted_texture_range_falls_back_without_panic() {
        let stats = texture_stats();
        let criteria = CriteriaTable::new(vec![
            (SAND.to_string(), crate::criteria::Criterion::range(50.0, 30.0)),
            (CLAY.to_string(), crate::criteria::Criterion::range(20.0, 35.0)),
            (SILT.to_string(), crate::criteria::Criterion::range(20.0, 40.0)),
        ]);
        let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 50);
        let base = sample_with(&[(SAND, Some(40.0)), (CLAY, Some(30.0)), (SILT, Some(30.0))]);
        let mut rng = StdRng::seed_from_u64(8);

        let comp = perturbator.perturb(&base, Label::High, &mut rng);
        assert!((comp.sum() - 100.0).abs() < 1e-4);
        assert!(comp.sand >= 0.0 && comp.clay >= 0.0 && comp.silt >= 0.0);
    }

    #[test]
    fn test_noise_mode_for_non_high_target() {
        let stats = texture_stats();
        let criteria = CriteriaTable::corn();
        let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 500);
        let base = sample_with(&[(SAND, Some(70.0)), (CLAY, Some(10.0)), (SILT, Some(20.0))]);
        let mut rng = StdRng::seed_from_u64(11);

        let comp = perturbator.perturb(&base, Label::Low, &mut rng);
        assert!((comp.sum() - 100.0).abs() < 1e-4);
        // Noise mode stays near the base triple, far from the High ranges.
        assert!(comp.sand > 60.0);
    }

    #[test]
    fn test_missing_texture_defaults() {
        let stats = StatsTable::from_samples(&[]);
        let criteria = CriteriaTable::corn();
        let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 500);
        let base = sample_with(&[("pH", Some(6.0))]);
        let mut rng = StdRng::seed_from_u64(2);

        // Zero std everywhere, so the near-equal defaults renormalize as-is.
        let comp = perturbator.perturb(&base, Label::Medium, &mut rng);
        assert!((comp.sum() - 100.0).abs() < 1e-4);
        assert!((comp.sand - 33.3).abs() < 0.2);
    }

    #[test]
    fn test_apply_writes_texture_columns() {
        let comp = Composition {
            sand: 40.0,
            clay: 30.0,
            silt: 30.0,
        };
        let mut sample = sample_with(&[(SAND, None), (CLAY, None), (SILT, None)]);
        comp.apply(&mut sample);
        assert_eq!(sample.value(SAND), Some(40.0));
        assert_eq!(sample.value(CLAY), Some(30.0));
        assert_eq!(sample.value(SILT), Some(30.0));
    }

    proptest! {
        /// Composition invariant holds for arbitrary base triples and seeds.
        #[test]
        fn prop_composition_sums_to_100(
            seed in any::<u64>(),
            sand in 0.0f64..100.0,
            clay in 0.0f64..100.0,
            silt in 0.0f64..100.0,
        ) {
            let stats = texture_stats();
            let criteria = CriteriaTable::corn();
            let perturbator = CompositionalPerturbator::new(&stats, &criteria, 0.05, 500);
            let base = sample_with(&[(SAND, Some(sand)), (CLAY, Some(clay)), (SILT, Some(silt))]);
            let mut rng = StdRng::seed_from_u64(seed);

            for target in crate::sample::Label::CLASSES {
                let comp = perturbator.perturb(&base, target, &mut rng);
                prop_assert!((comp.sum() - 100.0).abs() < 1e-4);
                prop_assert!(comp.sand >= 0.0);
                prop_assert!(comp.clay >= 0.0);
                prop_assert!(comp.silt >= 0.0);
            }
        }
    }
}
