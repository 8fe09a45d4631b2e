//! Descriptive exploration of a loaded dataset.
//!
//! Text-level counterparts of the exploratory stage: per-attribute
//! summaries and class-distribution counts. Plotting is out of scope; the
//! structures here are what a reporting layer would render.

use std::collections::BTreeMap;

use crate::dataset::SoilDataset;
use crate::sample::Label;

/// Count, mean, standard deviation and range for one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeSummary {
    /// Non-missing values observed.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n−1).
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Summarize every attribute column with at least one value.
#[must_use]
pub fn describe(dataset: &SoilDataset) -> BTreeMap<String, AttributeSummary> {
    let mut summaries = BTreeMap::new();
    for column in dataset.columns() {
        let values: Vec<f64> = dataset
            .samples()
            .iter()
            .filter_map(|s| s.value(column))
            .collect();
        if values.is_empty() {
            continue;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        summaries.insert(
            column.clone(),
            AttributeSummary {
                count: values.len(),
                mean,
                std,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            },
        );
    }
    summaries
}

/// Class counts and percentages over the labeled rows of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    counts: BTreeMap<Label, usize>,
    total: usize,
}

impl ClassDistribution {
    /// Compute the distribution; unlabeled rows are ignored.
    #[must_use]
    pub fn from_dataset(dataset: &SoilDataset) -> Self {
        let counts = dataset.class_counts();
        let total = counts.values().sum();
        Self { counts, total }
    }

    /// Rows carrying `label`.
    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Percentage of labeled rows carrying `label`.
    #[must_use]
    pub fn percent(&self, label: Label) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(label) as f64 / self.total as f64 * 100.0
        }
    }

    /// Total labeled rows.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Largest class count (the balancing target).
    #[must_use]
    pub fn majority_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CriteriaTable;
    use crate::scoring::ScoreBands;
    use std::io::Cursor;

    fn labeled_dataset() -> SoilDataset {
        let csv = "ID;pH;K ppm\n1;6,0;150\n2;6,2;130\n3;9,0;10\n";
        let mut ds = SoilDataset::from_reader(Cursor::new(csv)).expect("load");
        ds.score_and_label(&CriteriaTable::corn(), &ScoreBands::default());
        ds
    }

    #[test]
    fn test_describe() {
        let ds = labeled_dataset();
        let summaries = describe(&ds);
        let ph = summaries.get("pH").expect("pH summarized");
        assert_eq!(ph.count, 3);
        assert!(ph.min <= ph.mean && ph.mean <= ph.max);
        assert!(ph.std > 0.0);
    }

    #[test]
    fn test_class_distribution() {
        let ds = labeled_dataset();
        let dist = ClassDistribution::from_dataset(&ds);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.count(Label::Low), 3);
        assert!((dist.percent(Label::Low) - 100.0).abs() < 1e-9);
        assert_eq!(dist.majority_count(), 3);
    }

    #[test]
    fn test_empty_distribution() {
        let ds = SoilDataset::new(Vec::new(), Vec::new());
        let dist = ClassDistribution::from_dataset(&ds);
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.percent(Label::High), 0.0);
        assert_eq!(dist.majority_count(), 0);
    }
}
