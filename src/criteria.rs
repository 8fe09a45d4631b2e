//! Agronomic suitability criteria.
//!
//! A [`CriteriaTable`] maps attribute names to acceptable ranges for one
//! target crop. The table is plain configuration data: scoring awards one
//! point per satisfied range, and the compositional perturbator reads the
//! texture ranges when biasing synthesis toward the top class.

use serde::{Deserialize, Serialize};

/// Name of the pH column.
pub const PH: &str = "pH";
/// Name of the sand percentage column.
pub const SAND: &str = "Sand %";
/// Name of the clay percentage column.
pub const CLAY: &str = "Clay %";
/// Name of the silt percentage column.
pub const SILT: &str = "Silt %";

/// The three compositional texture columns, constrained to sum to 100.
pub const TEXTURE_COLUMNS: [&str; 3] = [SAND, CLAY, SILT];

/// Closed acceptable range for one attribute.
///
/// `high: None` means the range is unbounded above ("at least `low`").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive); `None` = unbounded.
    pub high: Option<f64>,
}

impl Criterion {
    /// Bounded range `[low, high]`.
    #[must_use]
    pub fn range(low: f64, high: f64) -> Self {
        Self {
            low,
            high: Some(high),
        }
    }

    /// Unbounded range `[low, ∞)`.
    #[must_use]
    pub fn at_least(low: f64) -> Self {
        Self { low, high: None }
    }

    /// Whether `value` satisfies this criterion.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        match self.high {
            Some(high) => self.low <= value && value <= high,
            None => value >= self.low,
        }
    }

    /// Whether the range has a finite upper bound.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.high.is_some()
    }
}

/// Ordered table of per-attribute criteria for one crop.
///
/// The number of entries is the maximum achievable score K.
///
/// # Examples
///
/// ```
/// use suelo::criteria::CriteriaTable;
///
/// let table = CriteriaTable::corn();
/// assert_eq!(table.len(), 16);
/// assert!(table.get("pH").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaTable {
    entries: Vec<(String, Criterion)>,
}

impl CriteriaTable {
    /// Build a table from `(attribute, criterion)` pairs.
    #[must_use]
    pub fn new(entries: Vec<(String, Criterion)>) -> Self {
        Self { entries }
    }

    /// Reference criteria for corn on the Greek soil dataset.
    ///
    /// Nutrient concentrations are in parts per million; electrical
    /// conductivity in mS/cm; texture fractions and organic matter in
    /// percent.
    #[must_use]
    pub fn corn() -> Self {
        let entries = vec![
            (PH, Criterion::range(5.5, 6.5)),
            (SAND, Criterion::range(30.0, 50.0)),
            (CLAY, Criterion::range(20.0, 35.0)),
            (SILT, Criterion::range(20.0, 40.0)),
            ("EC mS/cm", Criterion::range(0.0, 1.0)),
            ("O.M. %", Criterion::at_least(2.0)),
            ("CACO3 %", Criterion::range(0.0, 5.0)),
            ("N_NO3 ppm", Criterion::at_least(20.0)),
            ("P ppm", Criterion::at_least(12.0)),
            ("K ppm", Criterion::at_least(120.0)),
            ("Mg ppm", Criterion::range(50.0, 150.0)),
            ("Fe ppm", Criterion::range(4.0, 8.0)),
            ("Zn ppm", Criterion::range(1.0, 2.0)),
            ("Mn ppm", Criterion::range(5.0, 20.0)),
            ("Cu ppm", Criterion::range(0.5, 2.0)),
            ("B ppm", Criterion::range(0.5, 1.5)),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
        }
    }

    /// Number of criteria (the maximum score K).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Criterion for `attribute`, if one is defined.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Criterion> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, c)| c)
    }

    /// Iterate `(attribute, criterion)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.entries.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Attribute names in table order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Whether all three texture columns have bounded criteria, the
    /// precondition for constrained texture synthesis.
    #[must_use]
    pub fn has_bounded_texture(&self) -> bool {
        TEXTURE_COLUMNS
            .iter()
            .all(|col| self.get(col).is_some_and(Criterion::is_bounded))
    }
}
