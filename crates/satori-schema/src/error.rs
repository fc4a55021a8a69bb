//! # Error Types
//!
//! Two independent families:
//!
//! - [`SchemaError`]: the schema itself is unusable. Raised at construction
//!   (inconsistent facets, required+default, self-check failure), by
//!   [`Schema::validate_schema`](crate::Schema::validate_schema) and by merge.
//! - [`ValidationFailed`]: data did not conform. Carries every
//!   [`ValidationError`] collected in one pass, each tagged with its path.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use satori_core::CoreError;

use crate::facet::FacetKind;

/// A single violation found while checking data or a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Human-readable description of the violation.
    pub message: String,
    /// Locator into the checked value, e.g. `.field[2][values]`.
    /// Empty for the root.
    pub path: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the violations in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Returns a slice of all violations.
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

/// Error in a schema definition.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The activated facets cannot be ordered consistently.
    #[error("Inconsistent schema options")]
    Inconsistent {
        /// Facets that could not be placed in the chain.
        facets: Vec<FacetKind>,
    },

    /// A constraint value in the spec is malformed or contradictory.
    #[error("{0}")]
    Invalid(String),

    /// The schema failed a subsumption check: its own self-check at
    /// construction, or an explicit `validate_schema` call.
    #[error("{message}:\n{details}")]
    Rejected {
        /// Summary of the failed check.
        message: String,
        /// The individual violations.
        details: ValidationErrors,
    },

    /// Two schemas cannot be combined.
    #[error("cannot merge schemas: {0}")]
    Unmergeable(String),

    /// The spec text did not parse.
    #[error("schema text error: {0}")]
    Text(#[from] CoreError),
}

impl SchemaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Violations attached to the error; empty for errors that carry none.
    pub fn details(&self) -> &[ValidationError] {
        match self {
            Self::Rejected { details, .. } => details.as_slice(),
            _ => &[],
        }
    }
}

/// Data did not conform to a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed:\n{0}")]
pub struct ValidationFailed(pub ValidationErrors);

impl ValidationFailed {
    /// The collected violations.
    pub fn errors(&self) -> &ValidationErrors {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_path() {
        let e = ValidationError::new("value required but not provided", ".a");
        assert_eq!(e.to_string(), ".a: value required but not provided");
    }

    #[test]
    fn display_root() {
        let e = ValidationError::new("bad", "");
        assert_eq!(e.to_string(), "(root): bad");
    }

    #[test]
    fn errors_display_one_per_line() {
        let errors = ValidationErrors::from(vec![
            ValidationError::new("first", ".a"),
            ValidationError::new("second", "[0]"),
        ]);
        assert_eq!(errors.to_string(), "  .a: first\n  [0]: second");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejected_exposes_details() {
        let err = SchemaError::Rejected {
            message: "schema too weak".into(),
            details: vec![ValidationError::new("allowed types not specified", "")].into(),
        };
        assert_eq!(err.details().len(), 1);
        assert!(err.to_string().starts_with("schema too weak:"));
    }

    #[test]
    fn other_errors_have_no_details() {
        assert!(SchemaError::invalid("x").details().is_empty());
        let inconsistent = SchemaError::Inconsistent { facets: vec![FacetKind::Type] };
        assert_eq!(inconsistent.to_string(), "Inconsistent schema options");
    }

    #[test]
    fn errors_serialize_as_list() {
        let errors = ValidationErrors::from(vec![ValidationError::new("m", ".p")]);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["path"], ".p");
        assert_eq!(json[0]["message"], "m");
    }
}
