//! Error taxonomy for the PWF codec.
//!
//! Three tiers with different propagation policies:
//!
//! - [`SchemaError`] - fatal, raised only while building a
//!   [`SchemaRegistry`](crate::SchemaRegistry). A malformed field mapping is a
//!   startup failure, never a parse-time surprise.
//! - [`FieldError`] - recoverable. One field failed to decode or encode; the
//!   enclosing record is discarded with a diagnostic and processing continues.
//! - [`AssemblyError`] - recoverable. A multi-line record's continuation
//!   structure was malformed; the record is skipped and assembly resumes at
//!   the next record start.

use thiserror::Error;

/// Fatal schema-construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Record type marker was empty or whitespace
    #[error("record type marker must not be empty")]
    EmptyMarker,

    /// Two schemas registered under the same marker
    #[error("duplicate record type marker '{0}'")]
    DuplicateMarker(String),

    /// Two fields of one record type share a name
    #[error("duplicate field '{field}' in record type '{record_type}'")]
    DuplicateField { record_type: String, field: String },

    /// Field declared with start column 0 (columns are 1-based)
    #[error("field '{field}' in record type '{record_type}' starts at column 0; columns are 1-based")]
    ZeroColumn { record_type: String, field: String },

    /// Field declared with start column after its end column
    #[error(
        "field '{field}' in record type '{record_type}' has start column {start} after end column {end}"
    )]
    InvertedColumns {
        record_type: String,
        field: String,
        start: usize,
        end: usize,
    },

    /// Fields out of ascending column order or with overlapping ranges
    #[error(
        "fields '{previous}' and '{field}' in record type '{record_type}' overlap or are out of column order"
    )]
    OverlappingColumns {
        record_type: String,
        previous: String,
        field: String,
    },

    /// Enumerated field declared with an empty code set
    #[error("enumerated field '{field}' in record type '{record_type}' declares no codes")]
    EmptyCodeSet { record_type: String, field: String },

    /// Sub-group declared with zero instances per continuation line
    #[error("record type '{record_type}' declares a sub-group with zero entries per line")]
    EmptyGroup { record_type: String },
}

/// A single field failed to decode from, or encode into, its column range.
///
/// Carries enough context (record type, field, source line, raw slice) for a
/// diagnostic a human can act on.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("field '{field}' of {record_type}{} [{slice:?}]: {reason}", line_suffix(.line))]
pub struct FieldError {
    pub record_type: String,
    pub field: String,
    /// 1-based source line, absent for encode-side failures
    pub line: Option<usize>,
    /// Raw column slice that failed to convert
    pub slice: String,
    pub reason: String,
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {n}"),
        None => String::new(),
    }
}

/// A multi-line record could not be assembled from its continuation lines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// A continuation line did not match the sub-group column layout
    #[error("record type '{record_type}' at line {line}: malformed continuation: {source}")]
    BadContinuation {
        record_type: String,
        line: usize,
        #[source]
        source: FieldError,
    },

    /// End of section reached before the group end marker
    #[error("record type '{record_type}' starting at line {line}: sub-group never terminated")]
    UnterminatedGroup { record_type: String, line: usize },
}

impl AssemblyError {
    /// Source line the failure was detected on.
    pub fn line(&self) -> usize {
        match self {
            AssemblyError::BadContinuation { line, .. } => *line,
            AssemblyError::UnterminatedGroup { line, .. } => *line,
        }
    }
}
