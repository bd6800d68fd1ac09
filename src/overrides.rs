//! Lake-name override table.
//!
//! Locality strings are inconsistent enough that some extractions can only be
//! corrected by a closed list of literals. The table holds two kinds of rule:
//!
//! - identifier rules force the name for one specimen (`gbifID`), replacing
//!   whatever extraction produced, including nothing;
//! - value rules rewrite one extracted name into the survey dataset's spelling.
//!
//! Identifier rules are always consulted before value rules.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::text::normalize_key;

/// One override rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideRule {
    /// Force the lake name of a single specimen.
    Identifier {
        /// Specimen `gbifID`.
        gbif_id: String,
        /// Forced name; `None` marks a known non-lake site.
        lakename: Option<String>,
    },

    /// Replace an extracted name with its canonical spelling.
    Value {
        /// Extracted name to replace.
        extracted: String,
        /// Canonical name.
        lakename: String,
    },
}

impl OverrideRule {
    /// Creates an identifier rule.
    #[must_use]
    pub fn identifier(gbif_id: impl Into<String>, lakename: Option<&str>) -> Self {
        Self::Identifier {
            gbif_id: gbif_id.into(),
            lakename: lakename.map(str::to_string),
        }
    }

    /// Creates a value rule.
    #[must_use]
    pub fn value(extracted: impl Into<String>, lakename: impl Into<String>) -> Self {
        Self::Value {
            extracted: extracted.into(),
            lakename: lakename.into(),
        }
    }
}

impl fmt::Display for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier { gbif_id, lakename } => {
                let target = lakename.as_deref().unwrap_or("<none>");
                write!(f, "gbifID {gbif_id} → {target}")
            }
            Self::Value {
                extracted,
                lakename,
            } => write!(f, "{extracted} → {lakename}"),
        }
    }
}

/// Where a resolved lake name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSource {
    /// Taken as extracted from the locality.
    Extracted,
    /// Forced by an identifier rule.
    Identifier,
    /// Rewritten by a value rule.
    Value,
    /// Nothing extracted and no rule applied.
    Unresolved,
}

/// A lake name after the override table has been applied.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub lakename: Option<String>,
    pub source: NameSource,
}

/// Validated, immutable override table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    rules: Vec<OverrideRule>,
    by_identifier: HashMap<String, Option<String>>,
    by_value: HashMap<String, String>,
}

impl OverrideTable {
    /// Builds a table from rules in evaluation order.
    ///
    /// Names are stored in join-key form. Exact duplicate rules are kept once.
    ///
    /// # Errors
    /// - a key is empty;
    /// - the same key maps to two different names;
    /// - a value rule's replacement is itself rewritten by another value rule,
    ///   which would make applying the table twice differ from applying it once.
    ///   A replacement whose own rule maps it to itself is accepted.
    pub fn new(rules: Vec<OverrideRule>) -> Result<Self, ProfileError> {
        let mut table = Self::default();

        for rule in rules {
            match &rule {
                OverrideRule::Identifier { gbif_id, lakename } => {
                    let key = gbif_id.trim().to_string();
                    if key.is_empty() {
                        return Err(invalid("identifier rule with empty gbifID"));
                    }
                    let target = lakename.as_deref().map(normalize_key);
                    if let Some(existing) = table.by_identifier.get(&key) {
                        if *existing == target {
                            continue;
                        }
                        return Err(invalid(format!(
                            "gbifID {key} maps to both {existing:?} and {target:?}"
                        )));
                    }
                    table.by_identifier.insert(key, target);
                }
                OverrideRule::Value {
                    extracted,
                    lakename,
                } => {
                    let key = normalize_key(extracted);
                    let target = normalize_key(lakename);
                    if key.is_empty() || target.is_empty() {
                        return Err(invalid("value rule with empty name"));
                    }
                    if let Some(existing) = table.by_value.get(&key) {
                        if *existing == target {
                            continue;
                        }
                        return Err(invalid(format!(
                            "extracted name {key} maps to both {existing} and {target}"
                        )));
                    }
                    table.by_value.insert(key, target);
                }
            }
            table.rules.push(rule);
        }

        for (key, target) in &table.by_value {
            if let Some(next) = table.by_value.get(target) {
                if next != target {
                    return Err(invalid(format!(
                        "value rules chain: {key} → {target} → {next}"
                    )));
                }
            }
        }

        Ok(table)
    }

    /// Rules in the order they were supplied.
    #[must_use]
    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// Number of distinct rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies the table to one extraction result.
    #[must_use]
    pub fn apply(&self, gbif_id: &str, extracted: Option<&str>) -> ResolvedName {
        if let Some(forced) = self.by_identifier.get(gbif_id.trim()) {
            return ResolvedName {
                lakename: forced.clone(),
                source: NameSource::Identifier,
            };
        }

        let Some(name) = extracted else {
            return ResolvedName {
                lakename: None,
                source: NameSource::Unresolved,
            };
        };

        match self.by_value.get(name) {
            Some(canonical) => ResolvedName {
                lakename: Some(canonical.clone()),
                source: NameSource::Value,
            },
            None => ResolvedName {
                lakename: Some(name.to_string()),
                source: NameSource::Extracted,
            },
        }
    }
}

fn invalid(reason: impl Into<String>) -> ProfileError {
    ProfileError::InvalidOverrideTable {
        reason: reason.into(),
    }
}
