//! Rule-based suitability scoring and score-band classification.
//!
//! [`score_sample`] counts how many criteria a sample satisfies; missing
//! measurements simply contribute no point. [`ScoreBands`] maps a score to
//! one of the three suitability labels via fixed contiguous bands, with an
//! `Undefined` sentinel keeping the classifier total.

use serde::{Deserialize, Serialize};

use crate::criteria::CriteriaTable;
use crate::error::{Result, SueloError};
use crate::sample::{Label, Sample};

/// Count the criteria satisfied by a sample.
///
/// For each entry in the table: a present numeric value inside the range
/// scores one point; an absent key or missing value is skipped without
/// penalty. Deterministic and side-effect free.
///
/// # Examples
///
/// ```
/// use suelo::criteria::CriteriaTable;
/// use suelo::sample::Sample;
/// use suelo::scoring::score_sample;
/// use std::collections::BTreeMap;
///
/// let mut attrs = BTreeMap::new();
/// attrs.insert("pH".to_string(), Some(6.0));
/// let sample = Sample::new(1, attrs);
///
/// let score = score_sample(&sample, &CriteriaTable::corn());
/// assert_eq!(score, 1);
/// ```
#[must_use]
pub fn score_sample(sample: &Sample, criteria: &CriteriaTable) -> u32 {
    let mut score = 0;
    for (attribute, criterion) in criteria.iter() {
        if let Some(value) = sample.value(attribute) {
            if criterion.contains(value) {
                score += 1;
            }
        }
    }
    score
}

/// Contiguous score bands mapping `[0, max_score]` onto the three labels.
///
/// `[0, low_max]` is Low, `(low_max, medium_max]` is Medium and
/// `(medium_max, max_score]` is High. Anything else classifies as
/// [`Label::Undefined`]; with valid contiguous bands that can only happen
/// for scores above `max_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBands {
    /// Highest score still classified Low.
    pub low_max: u32,
    /// Highest score still classified Medium.
    pub medium_max: u32,
    /// Highest achievable score (the criteria count K).
    pub max_score: u32,
}

impl Default for ScoreBands {
    fn default() -> Self {
        // Reference bands for the 16-criteria corn table.
        Self {
            low_max: 5,
            medium_max: 11,
            max_score: 16,
        }
    }
}

impl ScoreBands {
    /// Bands sized for a criteria table with `max_score` entries, keeping
    /// the reference Low/Medium boundaries.
    #[must_use]
    pub fn for_max_score(max_score: u32) -> Self {
        Self {
            max_score,
            ..Self::default()
        }
    }

    /// Check band ordering.
    ///
    /// # Errors
    ///
    /// Returns [`SueloError::InvalidConfig`] unless
    /// `low_max < medium_max < max_score`.
    pub fn validate(&self) -> Result<()> {
        if self.low_max >= self.medium_max {
            return Err(SueloError::invalid_config(
                "score_bands.low_max",
                self.low_max,
                "< medium_max",
            ));
        }
        if self.medium_max >= self.max_score {
            return Err(SueloError::invalid_config(
                "score_bands.medium_max",
                self.medium_max,
                "< max_score",
            ));
        }
        Ok(())
    }

    /// Classify a score. Total: every input maps to a label.
    #[must_use]
    pub fn classify(&self, score: u32) -> Label {
        if score <= self.low_max {
            Label::Low
        } else if score <= self.medium_max {
            Label::Medium
        } else if score <= self.max_score {
            Label::High
        } else {
            Label::Undefined
        }
    }

    /// Classify an optional score; a missing score is `Undefined`.
    #[must_use]
    pub fn classify_opt(&self, score: Option<u32>) -> Label {
        score.map_or(Label::Undefined, |s| self.classify(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn sample_with(pairs: &[(&str, f64)]) -> Sample {
        let attrs = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some(*v)))
            .collect::<BTreeMap<_, _>>();
        Sample::new(0, attrs)
    }

    /// Sample satisfying all 16 corn criteria.
    fn ideal_corn_sample() -> Sample {
        sample_with(&[
            ("pH", 6.0),
            ("Sand %", 40.0),
            ("Clay %", 30.0),
            ("Silt %", 30.0),
            ("EC mS/cm", 0.5),
            ("O.M. %", 3.0),
            ("CACO3 %", 2.0),
            ("N_NO3 ppm", 25.0),
            ("P ppm", 15.0),
            ("K ppm", 150.0),
            ("Mg ppm", 100.0),
            ("Fe ppm", 6.0),
            ("Zn ppm", 1.5),
            ("Mn ppm", 10.0),
            ("Cu ppm", 1.0),
            ("B ppm", 1.0),
        ])
    }

    #[test]
    fn test_full_score() {
        let criteria = CriteriaTable::corn();
        assert_eq!(score_sample(&ideal_corn_sample(), &criteria), 16);
    }

    #[test]
    fn test_missing_values_skipped() {
        let criteria = CriteriaTable::corn();
        let mut sample = ideal_corn_sample();
        sample.clear("pH");
        sample.clear("K ppm");
        assert_eq!(score_sample(&sample, &criteria), 14);
    }

    #[test]
    fn test_out_of_range_scores_nothing() {
        let criteria = CriteriaTable::corn();
        let sample = sample_with(&[("pH", 9.0), ("Zn ppm", 50.0)]);
        assert_eq!(score_sample(&sample, &criteria), 0);
    }

    #[test]
    fn test_unbounded_criterion_scored() {
        let criteria = CriteriaTable::corn();
        let sample = sample_with(&[("K ppm", 5000.0)]);
        assert_eq!(score_sample(&sample, &criteria), 1);
    }

    #[test]
    fn test_band_boundaries() {
        let bands = ScoreBands::default();
        assert_eq!(bands.classify(0), Label::Low);
        assert_eq!(bands.classify(5), Label::Low);
        assert_eq!(bands.classify(6), Label::Medium);
        assert_eq!(bands.classify(11), Label::Medium);
        assert_eq!(bands.classify(12), Label::High);
        assert_eq!(bands.classify(16), Label::High);
        assert_eq!(bands.classify(17), Label::Undefined);
    }

    #[test]
    fn test_classify_opt_missing() {
        let bands = ScoreBands::default();
        assert_eq!(bands.classify_opt(None), Label::Undefined);
        assert_eq!(bands.classify_opt(Some(12)), Label::High);
    }

    #[test]
    fn test_band_validation() {
        assert!(ScoreBands::default().validate().is_ok());

        let bad = ScoreBands {
            low_max: 11,
            medium_max: 5,
            max_score: 16,
        };
        assert!(bad.validate().is_err());

        let overlapping_top = ScoreBands {
            low_max: 5,
            medium_max: 16,
            max_score: 16,
        };
        assert!(overlapping_top.validate().is_err());
    }

    proptest! {
        /// Score is bounded by the criteria count for arbitrary samples.
        #[test]
        fn prop_score_bounded(values in proptest::collection::vec(-1e4f64..1e4, 16)) {
            let criteria = CriteriaTable::corn();
            let names: Vec<&str> = criteria.attribute_names().collect();
            let pairs: Vec<(&str, f64)> = names.into_iter().zip(values).collect();
            let sample = sample_with(&pairs);
            let score = score_sample(&sample, &criteria);
            prop_assert!(score <= criteria.len() as u32);
        }

        /// The classifier is total over the whole score domain.
        #[test]
        fn prop_classifier_total(score in any::<u32>()) {
            let bands = ScoreBands::default();
            let label = bands.classify(score);
            prop_assert!(matches!(
                label,
                Label::Low | Label::Medium | Label::High | Label::Undefined
            ));
        }
    }
}
