//! # pwf-core: ANAREDE Network Data Model
//!
//! Fundamental data structures for the PWF (ANAREDE) fixed-width exchange
//! format: the declarative field-mapping schema, typed record values, the
//! parsed network document, and the shared diagnostics infrastructure.
//!
//! ## Design Philosophy
//!
//! **Config-driven record types**: every record type (bus data, line data,
//! generator data, ...) is described by a [`RecordSchema`], a marker plus an
//! ordered list of column ranges with value kinds and defaults, instead of a
//! handler type per record. One generic engine in `pwf-io` decodes and
//! re-renders all of them.
//!
//! **Fail at build time, not parse time**: a [`SchemaRegistry`] validates
//! every schema when it is registered (overlapping columns, duplicate names,
//! inverted ranges). A malformed mapping is a [`SchemaError`] before the
//! first line of input is read, never a silent misparse.
//!
//! **Error recovery over abort**: per-field and per-record failures are
//! collected in [`Diagnostics`]; only schema construction can fail hard.
//!
//! ## Core Data Structures
//!
//! - [`SchemaRegistry`] / [`RecordSchema`] / [`FieldSpec`] - the field mapping
//! - [`Record`] / [`Value`] - one decoded fixed-width record
//! - [`NetworkDocument`] - ordered collection of records across record types
//! - [`Diagnostics`] - warnings and errors accumulated during an operation

pub mod constants;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod record;
pub mod schema;

pub use diagnostics::{Diagnostics, Issue, ParseStats, Severity};
pub use document::NetworkDocument;
pub use error::{AssemblyError, FieldError, SchemaError};
pub use record::{FieldMap, Record, Value};
pub use schema::{FieldSpec, GroupSpec, RecordSchema, SchemaRegistry, ValueKind};
