//! The batch pipeline: normalize, parse localities, match.
//!
//! Each stage consumes the previous stage's table and returns a new one.
//! The profile is borrowed for the whole run and never mutated.

use std::path::PathBuf;

use tracing::info;

use crate::error::LinkResult;
use crate::loader::{delimiter_for_path, load_specimens, load_surveys};
use crate::locality::{LocalityParser, ParseReport};
use crate::matcher::{MatchReport, Matcher};
use crate::normalize::{FieldNormalizer, NormalizeReport};
use crate::profile::LinkageProfile;
use crate::record::{MatchedTable, SpecimenRecord, SurveyTable};

/// Input file locations and delimiters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInputs {
    pub specimens: PathBuf,
    pub surveys: PathBuf,
    /// Specimen delimiter; inferred from the file name when `None`.
    pub specimen_delimiter: Option<u8>,
    /// Survey delimiter; inferred from the file name when `None`.
    pub survey_delimiter: Option<u8>,
}

impl LinkInputs {
    /// Inputs with delimiters inferred from the file names.
    #[must_use]
    pub fn new(specimens: impl Into<PathBuf>, surveys: impl Into<PathBuf>) -> Self {
        Self {
            specimens: specimens.into(),
            surveys: surveys.into(),
            specimen_delimiter: None,
            survey_delimiter: None,
        }
    }
}

/// Per-stage diagnostics for one run.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub profile_version: String,
    pub profile_fingerprint: String,
    pub normalize: NormalizeReport,
    pub parse: ParseReport,
    pub matching: MatchReport,
}

/// Result of one run.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct LinkageOutcome {
    pub matched: MatchedTable,
    pub report: PipelineReport,
}

/// Runs the linkage pipeline under one profile.
#[derive(Debug, Clone)]
pub struct LinkagePipeline {
    profile: LinkageProfile,
}

impl LinkagePipeline {
    /// Creates a pipeline for `profile`.
    #[must_use]
    pub const fn new(profile: LinkageProfile) -> Self {
        Self { profile }
    }

    /// The profile this pipeline runs under.
    #[must_use]
    pub const fn profile(&self) -> &LinkageProfile {
        &self.profile
    }

    /// Links in-memory tables.
    #[must_use]
    pub fn run(&self, specimens: Vec<SpecimenRecord>, surveys: &SurveyTable) -> LinkageOutcome {
        let (normalized, normalize) = FieldNormalizer::new(&self.profile).normalize(specimens);
        let (parsed, parse) = LocalityParser::new(self.profile.overrides()).parse(normalized);
        let (matched, matching) =
            Matcher::new(self.profile.duplicate_subjects()).match_tables(&parsed, surveys);

        info!(
            profile = self.profile.version(),
            fingerprint = self.profile.fingerprint(),
            matched = matching.matched,
            distinct_lakes = matching.distinct_lakes,
            "linkage complete"
        );

        LinkageOutcome {
            matched,
            report: PipelineReport {
                profile_version: self.profile.version().to_string(),
                profile_fingerprint: self.profile.fingerprint().to_string(),
                normalize,
                parse,
                matching,
            },
        }
    }

    /// Loads both files and links them.
    ///
    /// # Errors
    /// Returns a load error if either file is missing, malformed or lacks a
    /// required column.
    pub fn run_files(&self, inputs: &LinkInputs) -> LinkResult<LinkageOutcome> {
        let specimen_delimiter = inputs
            .specimen_delimiter
            .unwrap_or_else(|| delimiter_for_path(&inputs.specimens));
        let survey_delimiter = inputs
            .survey_delimiter
            .unwrap_or_else(|| delimiter_for_path(&inputs.surveys));

        let specimens = load_specimens(&inputs.specimens, specimen_delimiter)?;
        let surveys = load_surveys(
            &inputs.surveys,
            survey_delimiter,
            &self.profile.config().measurement_columns,
        )?;
        info!(
            specimens = specimens.len(),
            cards = surveys.len(),
            "loaded input tables"
        );
        Ok(self.run(specimens, &surveys))
    }
}
