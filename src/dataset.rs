//! In-memory soil dataset: loading, cleaning and preprocessing.
//!
//! The input format is a delimited table with a header row, `;` as the
//! field separator and `,` as the decimal separator (the source locale).
//! Loading strips header whitespace, drops all-null columns and rows, and
//! coerces cells to numbers — a cell that cannot be coerced becomes a
//! missing value rather than an error, so only structural problems
//! (missing file, wrong field count) are fatal.
//!
//! Post-synthesis preprocessing lives here too: texture-sum outlier
//! detection, min-max normalization and row shuffling.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::criteria::{CriteriaTable, CLAY, PH, SAND, SILT};
use crate::error::{Result, SueloError};
use crate::sample::{Label, Provenance, Sample, SampleSchema};
use crate::scoring::{score_sample, ScoreBands};

/// Header name of the identifier column.
pub const ID_COLUMN: &str = "ID";

/// Texture-sum band considered consistent; sums outside it are outliers.
const TEXTURE_SUM_RANGE: (f64, f64) = (99.0, 101.0);

/// Physically plausible pH band; values outside it are outliers.
const PH_RANGE: (f64, f64) = (0.0, 14.0);

/// Decimals kept when normalizing.
const NORMALIZE_DECIMALS: i32 = 5;

/// A loaded soil dataset: ordered samples plus the attribute column order
/// preserved from the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilDataset {
    columns: Vec<String>,
    samples: Vec<Sample>,
}

/// A row whose sand/clay/silt sum falls outside the consistent band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureOutlier {
    /// Row identifier.
    pub id: u64,
    /// Observed sand + clay + silt.
    pub sum: f64,
}

/// A row whose pH falls outside the physically plausible band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhOutlier {
    /// Row identifier.
    pub id: u64,
    /// Observed pH.
    pub ph: f64,
}

impl SoilDataset {
    /// Build a dataset from already-constructed samples.
    #[must_use]
    pub fn new(columns: Vec<String>, samples: Vec<Sample>) -> Self {
        Self { columns, samples }
    }

    /// Load and clean a `;`-separated, `,`-decimal file.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, rows with the wrong field count, or a dataset
    /// left empty by cleaning.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load and clean from any buffered reader. See [`Self::from_path`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::from_path`].
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(SueloError::EmptyDataset),
            }
        };

        // Header whitespace stripping.
        let columns: Vec<String> = header.split(';').map(|c| c.trim().to_string()).collect();
        let n_cols = columns.len();

        let mut grid: Vec<Vec<Option<f64>>> = Vec::new();
        for (idx, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split(';').collect();
            if cells.len() != n_cols {
                return Err(SueloError::parse(
                    idx + 1,
                    format!("expected {n_cols} fields, found {}", cells.len()),
                ));
            }
            grid.push(cells.iter().map(|c| parse_locale_number(c)).collect());
        }

        // Drop all-null columns, then all-null rows.
        let kept: Vec<usize> = (0..n_cols)
            .filter(|&j| grid.iter().any(|row| row[j].is_some()))
            .collect();
        let columns: Vec<String> = kept.iter().map(|&j| columns[j].clone()).collect();
        let mut rows: Vec<Vec<Option<f64>>> = grid
            .into_iter()
            .map(|row| kept.iter().map(|&j| row[j]).collect())
            .collect();
        rows.retain(|row| row.iter().any(Option::is_some));

        if rows.is_empty() || columns.is_empty() {
            return Err(SueloError::EmptyDataset);
        }

        let id_index = columns.iter().position(|c| c == ID_COLUMN);
        let attribute_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.as_str() != ID_COLUMN)
            .cloned()
            .collect();

        let samples = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let id = id_index
                    .and_then(|j| row[j])
                    .map_or(i as u64 + 1, |v| v as u64);
                let mut attrs = BTreeMap::new();
                for (j, value) in row.into_iter().enumerate() {
                    if Some(j) != id_index {
                        attrs.insert(columns[j].clone(), value);
                    }
                }
                Sample::new(id, attrs)
            })
            .collect();

        Ok(Self {
            columns: attribute_columns,
            samples,
        })
    }

    /// Attribute column names in input order (identifier excluded).
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Samples in row order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Validate the attribute columns against a declared schema.
    ///
    /// # Errors
    ///
    /// Returns [`SueloError::MissingColumn`] for the first absent column.
    pub fn validate_schema(&self, schema: &SampleSchema) -> Result<()> {
        schema.validate_columns(&self.columns)
    }

    /// Score and classify every row, recording each original row's own
    /// label as its target class.
    pub fn score_and_label(&mut self, criteria: &CriteriaTable, bands: &ScoreBands) {
        for sample in &mut self.samples {
            let score = score_sample(sample, criteria);
            sample.score = Some(score);
            let label = bands.classify(score);
            sample.label = Some(label);
            if sample.provenance == Provenance::Original {
                sample.target_class = Some(label);
            }
        }
    }

    /// Rows per class label.
    #[must_use]
    pub fn class_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            if let Some(label) = sample.label {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Append synthetic rows after the original ones.
    pub fn extend(&mut self, synthetic: Vec<Sample>) {
        self.samples.extend(synthetic);
    }

    /// Rows whose texture fractions sum outside [99, 101]. Rows with a
    /// missing fraction cannot be checked and are skipped.
    #[must_use]
    pub fn texture_sum_outliers(&self) -> Vec<TextureOutlier> {
        self.samples
            .iter()
            .filter_map(|s| {
                let sum = s.value(SAND)? + s.value(CLAY)? + s.value(SILT)?;
                (sum < TEXTURE_SUM_RANGE.0 || sum > TEXTURE_SUM_RANGE.1)
                    .then_some(TextureOutlier { id: s.id, sum })
            })
            .collect()
    }

    /// Rows whose pH lies outside [0, 14]. Rows with a missing pH cannot
    /// be checked and are skipped.
    #[must_use]
    pub fn ph_outliers(&self) -> Vec<PhOutlier> {
        self.samples
            .iter()
            .filter_map(|s| {
                let ph = s.value(PH)?;
                (ph < PH_RANGE.0 || ph > PH_RANGE.1).then_some(PhOutlier { id: s.id, ph })
            })
            .collect()
    }

    /// Min-max normalize every attribute column to [0, 1], rounded to five
    /// decimals. Constant columns map to 0; missing values stay missing.
    pub fn normalize_min_max(&mut self) {
        for column in self.columns.clone() {
            let values: Vec<f64> = self.samples.iter().filter_map(|s| s.value(&column)).collect();
            if values.is_empty() {
                continue;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;

            for sample in &mut self.samples {
                if let Some(v) = sample.value(&column) {
                    let scaled = if span > 0.0 { (v - min) / span } else { 0.0 };
                    sample.set(&column, round_to(scaled, NORMALIZE_DECIMALS));
                }
            }
        }
    }

    /// Shuffle rows in place using the shared generator.
    pub fn shuffle(&mut self, rng: &mut StdRng) {
        self.samples.shuffle(rng);
    }

    /// Write rows in the output layout: identifier, provenance, target
    /// class, score and label first, then the attribute columns, `;`
    /// separated with `,` decimals.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors only.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut header = vec![
            ID_COLUMN.to_string(),
            "Source".to_string(),
            "TargetClass".to_string(),
            "Score".to_string(),
            "Label".to_string(),
        ];
        header.extend(self.columns.iter().cloned());
        writeln!(writer, "{}", header.join(";"))?;

        for sample in &self.samples {
            let mut fields = vec![
                sample.id.to_string(),
                sample.provenance.to_string(),
                sample
                    .target_class
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
                sample.score.map(|s| s.to_string()).unwrap_or_default(),
                sample.label.map(|l| l.to_string()).unwrap_or_default(),
            ];
            for column in &self.columns {
                fields.push(sample.value(column).map_or(String::new(), format_locale));
            }
            writeln!(writer, "{}", fields.join(";"))?;
        }
        Ok(())
    }

    /// Write only the synthetic rows to `path`. See [`Self::write_csv`].
    ///
    /// # Errors
    ///
    /// Fails on I/O errors only.
    pub fn write_synthetic_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let synthetic = Self {
            columns: self.columns.clone(),
            samples: self
                .samples
                .iter()
                .filter(|s| s.provenance == Provenance::Synthetic)
                .cloned()
                .collect(),
        };
        let mut file = File::create(path)?;
        synthetic.write_csv(&mut file)
    }
}

/// Parse a cell using the `,`-decimal locale. Unparseable or empty cells
/// become missing values.
#[must_use]
pub fn parse_locale_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.replace(',', ".").parse::<f64>().ok()
}

/// Format a number with a `,` decimal separator.
fn format_locale(value: f64) -> String {
    format!("{value}").replace('.', ",")
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
