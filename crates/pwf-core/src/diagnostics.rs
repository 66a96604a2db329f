//! Diagnostics infrastructure for tracking issues during parse and
//! serialization.
//!
//! Per-line and per-record failures never abort a run; they are collected
//! here with enough context (severity, category, line number, record type)
//! for the caller to report them at whatever verbosity it chooses. Supports:
//!
//! - Severity levels (Warning, Error)
//! - Categories for grouping issues (parse, assembly, encode, ...)
//! - Optional record type references (e.g. "DBAR")
//! - Optional source line numbers
//! - Serialization for JSON output
//!
//! # Example
//!
//! ```
//! use pwf_core::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("parse", "unrecognized line skipped");
//! diag.add_error_for("assembly", "sub-group never terminated", "DBSH", 42);
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! assert!(diag.has_errors());
//! ```

use std::fmt;

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but processing continued (e.g. skipped stray line)
    Warning,
    /// Could not process an element (e.g. malformed record, discarded)
    Error,
}

/// A single issue encountered during an operation
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Category for grouping (e.g. "parse", "assembly", "encode")
    pub category: String,
    /// Human-readable description
    pub message: String,
    /// 1-based source line number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Record type the issue belongs to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

/// Counters describing one parse or serialize pass
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ParseStats {
    /// Records successfully assembled
    pub records: usize,
    /// Records discarded because a field or continuation failed
    pub skipped_records: usize,
    /// Unrecognized or unsupported-section lines skipped
    pub skipped_lines: usize,
    /// Blank slices that decoded to their declared default
    pub defaulted_values: usize,
}

/// Complete diagnostics for one operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub stats: ParseStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning issue
    pub fn add_warning(&mut self, category: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            category: category.to_string(),
            message: message.into(),
            line: None,
            record_type: None,
        });
    }

    /// Add a warning with a source line number
    pub fn add_warning_at_line(&mut self, category: &str, message: impl Into<String>, line: usize) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            category: category.to_string(),
            message: message.into(),
            line: Some(line),
            record_type: None,
        });
    }

    /// Add a warning attributed to a record type
    pub fn add_warning_with_record(
        &mut self,
        category: &str,
        message: impl Into<String>,
        record_type: &str,
    ) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            category: category.to_string(),
            message: message.into(),
            line: None,
            record_type: Some(record_type.to_string()),
        });
    }

    /// Add an error attributed to a record type
    pub fn add_error_with_record(
        &mut self,
        category: &str,
        message: impl Into<String>,
        record_type: &str,
    ) {
        self.issues.push(Issue {
            severity: Severity::Error,
            category: category.to_string(),
            message: message.into(),
            line: None,
            record_type: Some(record_type.to_string()),
        });
    }

    /// Add an error (processing continued, element discarded)
    pub fn add_error(&mut self, category: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Error,
            category: category.to_string(),
            message: message.into(),
            line: None,
            record_type: None,
        });
    }

    /// Add an error attributed to a record type and source line
    pub fn add_error_for(
        &mut self,
        category: &str,
        message: impl Into<String>,
        record_type: &str,
        line: usize,
    ) {
        self.issues.push(Issue {
            severity: Severity::Error,
            category: category.to_string(),
            message: message.into(),
            line: Some(line),
            record_type: Some(record_type.to_string()),
        });
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Merge another diagnostics set into this one, summing stats.
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
        self.stats.records += other.stats.records;
        self.stats.skipped_records += other.stats.skipped_records;
        self.stats.skipped_lines += other.stats.skipped_lines;
        self.stats.defaulted_values += other.stats.defaulted_values;
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            let tag = match issue.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            write!(f, "{tag}[{}]", issue.category)?;
            if let Some(line) = issue.line {
                write!(f, " line {line}")?;
            }
            if let Some(record_type) = &issue.record_type {
                write!(f, " ({record_type})")?;
            }
            writeln!(f, ": {}", issue.message)?;
        }
        Ok(())
    }
}
