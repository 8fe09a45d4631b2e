//! Sample representation and suitability labels.
//!
//! A [`Sample`] is a mapping from attribute name to a possibly-missing
//! numeric value, plus provenance metadata. Attribute keys are validated
//! against a [`SampleSchema`] at the load boundary, so the synthesis core
//! may assume required keys exist even when individual values are missing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SueloError};

/// Soil-suitability class label.
///
/// Three ordered categories plus an `Undefined` sentinel for scores outside
/// every configured band. Contiguous default bands make the sentinel
/// unreachable in practice, but the classifier stays total.
///
/// # Examples
///
/// ```
/// use suelo::sample::Label;
///
/// assert!(Label::Low < Label::High);
/// assert_eq!(Label::Medium.as_str(), "Medium");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Low suitability (bottom score band).
    Low,
    /// Medium suitability (middle score band).
    Medium,
    /// High suitability (top score band).
    High,
    /// Sentinel for a score outside every defined band.
    Undefined,
}

impl Label {
    /// The three generation target classes, in band order.
    pub const CLASSES: [Label; 3] = [Label::Low, Label::Medium, Label::High];

    /// Short stable name, used in report and file output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Low => "Low",
            Label::Medium => "Medium",
            Label::High => "High",
            Label::Undefined => "Undefined",
        }
    }

    /// Parse a label from its short name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Label::Low),
            "Medium" => Some(Label::Medium),
            "High" => Some(Label::High),
            "Undefined" => Some(Label::Undefined),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a sample came from the source dataset or from synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Row loaded from the source dataset.
    Original,
    /// Row produced by the synthesizer.
    Synthetic,
}

impl Provenance {
    /// Stable name used in file output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Original => "Original",
            Provenance::Synthetic => "Synthetic",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One soil sample: attribute values plus identity and provenance.
///
/// Attribute values live in a sorted map so iteration order is stable.
/// A key with a `None` value means "attribute present in the schema but
/// this measurement is missing" — scoring skips it without penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Row identifier (original ID column, or a synthetic counter value).
    pub id: u64,
    /// Where this sample came from.
    pub provenance: Provenance,
    /// Class the synthesizer was targeting when this sample was generated.
    /// For original rows this records their own label.
    pub target_class: Option<Label>,
    /// Suitability score, once computed.
    pub score: Option<u32>,
    /// Suitability label, once classified.
    pub label: Option<Label>,
    attributes: BTreeMap<String, Option<f64>>,
}

impl Sample {
    /// Create an original sample from raw attribute values.
    #[must_use]
    pub fn new(id: u64, attributes: BTreeMap<String, Option<f64>>) -> Self {
        Self {
            id,
            provenance: Provenance::Original,
            target_class: None,
            score: None,
            label: None,
            attributes,
        }
    }

    /// Numeric value of an attribute, `None` if the key is absent or the
    /// measurement is missing.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied().flatten()
    }

    /// Set an attribute value, inserting the key if it is new.
    pub fn set(&mut self, name: &str, value: f64) {
        self.attributes.insert(name.to_string(), Some(value));
    }

    /// Mark an attribute as missing.
    pub fn clear(&mut self, name: &str) {
        self.attributes.insert(name.to_string(), None);
    }

    /// Whether the attribute key exists (its value may still be missing).
    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Read-only view of the attribute map.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Option<f64>> {
        &self.attributes
    }

    /// Names of attributes carried by this sample, in sorted order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

/// Declared set of attribute keys the core relies on.
///
/// Validated once at the load boundary so perturbation and scoring never
/// have to handle absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSchema {
    required: Vec<String>,
}

impl SampleSchema {
    /// Create a schema from required attribute names.
    #[must_use]
    pub fn new(required: &[&str]) -> Self {
        Self {
            required: required.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Required attribute names.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Check that every required key is present in `columns`.
    ///
    /// # Errors
    ///
    /// Returns [`SueloError::MissingColumn`] naming the first absent column.
    pub fn validate_columns(&self, columns: &[String]) -> Result<()> {
        for name in &self.required {
            if !columns.iter().any(|c| c == name) {
                return Err(SueloError::MissingColumn {
                    column: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check a single sample for required keys.
    ///
    /// # Errors
    ///
    /// Returns [`SueloError::MissingColumn`] naming the first absent key.
    pub fn validate_sample(&self, sample: &Sample) -> Result<()> {
        for name in &self.required {
            if !sample.has_key(name) {
                return Err(SueloError::MissingColumn {
                    column: name.clone(),
                });
            }
        }
        Ok(())
    }
}
