//! Error types for lakelink.
//!
//! Only structural problems are errors. Data-level anomalies (a locality
//! without a lake token, a field number without a usable year) degrade to
//! null values or dropped rows inside the stages and never surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Which input table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Museum specimen catalog records.
    Specimens,
    /// Historical lake survey summary cards.
    Surveys,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Specimens => write!(f, "specimens"),
            Self::Surveys => write!(f, "surveys"),
        }
    }
}

/// Structural errors raised while loading an input table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open {table} file {}: {source}", path.display())]
    Io {
        table: Table,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {table} table: {source}")]
    Csv {
        table: Table,
        #[source]
        source: csv::Error,
    },

    #[error("The {table} table has no header row")]
    EmptyHeader {
        table: Table,
    },

    #[error("The {table} table is missing required column '{column}'")]
    MissingColumn {
        table: Table,
        column: String,
    },
}

/// Errors in a linkage profile (override table, exclusion set, policy).
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid preparation count pattern '{pattern}': {reason}")]
    InvalidCountPattern {
        pattern: String,
        reason: String,
    },

    #[error("Invalid override table: {reason}")]
    InvalidOverrideTable {
        reason: String,
    },

    #[error("Invalid {window} window: [{min}, {max}]")]
    InvalidWindow {
        window: &'static str,
        min: i32,
        max: i32,
    },
}

/// Top-level error type for lakelink.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Output error: {message}")]
    Output {
        message: String,
    },
}

impl LinkError {
    /// Creates an output error.
    #[must_use]
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is a profile error.
    #[must_use]
    pub const fn is_profile(&self) -> bool {
        matches!(self, Self::Profile(_))
    }

    /// Returns true if the error names a missing input column.
    #[must_use]
    pub const fn is_missing_column(&self) -> bool {
        matches!(self, Self::Load(LoadError::MissingColumn { .. }))
    }
}

/// Result type alias for lakelink operations.
pub type LinkResult<T> = Result<T, LinkError>;
