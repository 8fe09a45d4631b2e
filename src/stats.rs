//! Per-attribute summary statistics for the source dataset.
//!
//! Computed once before synthesis and shared read-only by every
//! perturbation attempt: the standard deviation sizes Gaussian noise, and
//! the observed min/max clamp perturbed values back into the original
//! value range.

use std::collections::BTreeMap;

use crate::sample::Sample;

/// Summary for one numeric attribute.
///
/// An attribute with no non-missing values records the degenerate default
/// `{std: 0, min_orig: 0, max_orig: 0}`; callers treat `std == 0` as
/// "do not perturb".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttributeStats {
    /// Sample standard deviation (n−1 denominator) over non-missing values.
    pub std: f64,
    /// Smallest observed value.
    pub min_orig: f64,
    /// Largest observed value.
    pub max_orig: f64,
}

/// Read-only table of [`AttributeStats`] keyed by attribute name.
///
/// # Examples
///
/// ```
/// use suelo::sample::Sample;
/// use suelo::stats::StatsTable;
/// use std::collections::BTreeMap;
///
/// let rows: Vec<Sample> = (0..3)
///     .map(|i| {
///         let mut attrs = BTreeMap::new();
///         attrs.insert("pH".to_string(), Some(5.0 + i as f64));
///         Sample::new(i, attrs)
///     })
///     .collect();
///
/// let stats = StatsTable::from_samples(&rows);
/// let ph = stats.get("pH").unwrap();
/// assert_eq!(ph.min_orig, 5.0);
/// assert_eq!(ph.max_orig, 7.0);
/// assert!((ph.std - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    entries: BTreeMap<String, AttributeStats>,
}

impl StatsTable {
    /// Compute statistics over every attribute key carried by `samples`.
    ///
    /// Identifier and score columns are not attribute keys in [`Sample`],
    /// so they never enter the table.
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut entries = BTreeMap::new();

        let mut names: Vec<String> = Vec::new();
        for sample in samples {
            for name in sample.attribute_names() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }

        for name in names {
            let values: Vec<f64> = samples.iter().filter_map(|s| s.value(&name)).collect();
            entries.insert(name, Self::summarize(&values));
        }

        Self { entries }
    }

    fn summarize(values: &[f64]) -> AttributeStats {
        if values.is_empty() {
            return AttributeStats::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        };

        let min_orig = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_orig = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        AttributeStats {
            std,
            min_orig,
            max_orig,
        }
    }

    /// Statistics for `attribute`, if observed.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&AttributeStats> {
        self.entries.get(attribute)
    }

    /// Standard deviation for `attribute`, zero when unknown.
    #[must_use]
    pub fn std(&self, attribute: &str) -> f64 {
        self.entries.get(attribute).map_or(0.0, |s| s.std)
    }

    /// Number of attributes summarized.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(attribute, stats)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeStats)> {
        self.entries.iter().map(|(name, s)| (name.as_str(), s))
    }
}
