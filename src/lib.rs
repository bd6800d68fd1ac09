//! # lakelink - Specimen to lake-survey record linkage
//!
//! lakelink matches museum specimen lots (GBIF occurrence exports) to
//! historical lake survey summary cards. Lots carry only a free-text
//! locality, so the lake name has to be extracted, corrected against a
//! closed override table and then joined exactly on county, lake name and
//! sampling year.
//!
//! ## Core Concepts
//!
//! - **Profile**: versioned configuration for one snapshot of the reference
//!   data (override table, duplicate transcriptions, normalization policy)
//! - **Field Normalizer**: individual counts, field-number years, state and
//!   year filters
//! - **Locality Parser**: lake-name extraction plus overrides
//! - **Matcher**: exact `(county, lakename, year)` inner join
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lakelink::{LinkInputs, LinkagePipeline, LinkageProfile};
//!
//! let pipeline = LinkagePipeline::new(LinkageProfile::bundled()?);
//! let outcome = pipeline.run_files(&LinkInputs::new("occurrence.txt", "cards.csv"))?;
//! println!("{} matched rows", outcome.matched.len());
//! # Ok::<(), lakelink::LinkError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod loader;
pub mod locality;
pub mod matcher;
pub mod normalize;
pub mod overrides;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod text;
pub mod writer;

pub use error::{LinkError, LinkResult, LoadError, ProfileError, Table};
pub use locality::{extract_lake_name, LocalityParser, ParseReport};
pub use matcher::{JoinKey, MatchReport, Matcher};
pub use normalize::{FieldNormalizer, NormalizeReport};
pub use overrides::{NameSource, OverrideRule, OverrideTable, ResolvedName};
pub use pipeline::{LinkInputs, LinkageOutcome, LinkagePipeline, PipelineReport};
pub use profile::{LinkageProfile, MeasurementColumns, ProfileConfig, Window};
pub use record::{
    MatchedRecord, MatchedTable, Measurements, SpecimenRecord, SurveyRecord, SurveyTable,
};
pub use writer::write_matched;
