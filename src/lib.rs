//! Suelo: soil-suitability dataset balancing in pure Rust.
//!
//! Suelo implements the synthesis stage of an agronomic soil-suitability
//! pipeline: given labeled soil samples, it generates additional synthetic
//! samples per class by perturbing real base samples with bounded Gaussian
//! noise and class-conditioned rejection sampling, until every class
//! reaches the majority-class count or its retry budgets run out.
//!
//! # Quick Start
//!
//! ```
//! use suelo::prelude::*;
//! use std::io::Cursor;
//!
//! // Two High-suitability rows and one Low row.
//! let csv = "\
//! ID;pH;Sand %;Clay %;Silt %;EC mS/cm;O.M. %;CACO3 %;N_NO3 ppm;P ppm;K ppm;Mg ppm;Fe ppm;Zn ppm;Mn ppm;Cu ppm;B ppm
//! 1;6,0;40;30;30;0,5;3;2;25;15;150;100;6;1,5;10;1;1
//! 2;6,2;42;28;30;0,4;3;2;30;18;160;110;5;1,4;12;1;1
//! 3;9,0;90;5;5;8;0,1;40;1;1;10;500;30;9;90;9;9
//! ";
//! let mut dataset = SoilDataset::from_reader(Cursor::new(csv)).unwrap();
//!
//! let config = SynthesisConfig::default().with_seed(42);
//! dataset.score_and_label(&config.criteria, &config.bands);
//!
//! let stats = StatsTable::from_samples(dataset.samples());
//! let mut driver = BalancingDriver::new(config, &stats);
//! let (synthetic, report) = driver.balance(dataset.samples());
//!
//! assert_eq!(report.target_count, 2);
//! dataset.extend(synthetic);
//! ```
//!
//! # Modules
//!
//! - [`sample`]: sample representation, labels, provenance, schema
//! - [`criteria`]: per-attribute acceptable ranges for the target crop
//! - [`scoring`]: rule-based scoring and score-band classification
//! - [`stats`]: per-attribute standard deviation and observed bounds
//! - [`perturb`]: bounded Gaussian noise and the sum-to-100 texture logic
//! - [`synthesis`]: the synthesizer and the per-class balancing driver
//! - [`dataset`]: loading, cleaning, normalization, shuffling, output
//! - [`explore`]: descriptive summaries and class distributions
//!
//! # Design
//!
//! Generation is single-threaded and synchronous; one shared seeded
//! generator drives every random draw, so a fixed seed reproduces a run
//! exactly. Nothing in the synthesis core is fatal: infeasible texture
//! constraints fall back to noise mode, abandoned slots and per-class
//! shortfalls are reported through [`synthesis::BalancingReport`], and the
//! run continues with whatever was generated.

pub mod criteria;
pub mod dataset;
pub mod error;
pub mod explore;
pub mod perturb;
pub mod prelude;
pub mod sample;
pub mod scoring;
pub mod stats;
pub mod synthesis;

pub use error::{Result, SueloError};
pub use sample::{Label, Sample};
pub use synthesis::{BalancingDriver, SynthesisConfig};
