//! # pwf-io: ANAREDE Fixed-Width Codec
//!
//! Parsing and serialization for the PWF (ANAREDE) power-system exchange
//! format: a schema-driven engine that classifies raw lines, decodes
//! fixed-column field slices into typed records, and re-renders documents
//! back into column-exact text.
//!
//! ## Design Philosophy
//!
//! **One engine, many record types**: record layouts are data
//! ([`pwf_core::RecordSchema`]), not code. Parsing and serialization share
//! the same registry and field codec, so decode and encode rules cannot
//! drift apart.
//!
//! **Error Recovery**: parsing continues past malformed lines and records,
//! collecting diagnostics for user visibility rather than aborting. A single
//! bad record never prevents parsing the remainder of the file.
//!
//! **Canonical output**: serialization always renders at the schema's
//! declared column positions, whatever the input's alignment was.
//!
//! ## Quick Start
//!
//! ```
//! use pwf_io::{default_registry, parse, serialize};
//!
//! let text = "DBAR\n    1  2 A BAR-1       A1050\n99999\nFIM\n";
//! let outcome = parse(text, default_registry());
//! assert_eq!(outcome.document.records("DBAR").len(), 1);
//! assert_eq!(outcome.document.records("DBAR")[0].float("voltage"), Some(1.05));
//!
//! let rendered = serialize(&outcome.document, default_registry());
//! assert!(rendered.text.starts_with("DBAR\n"));
//! ```
//!
//! ## Module Overview
//!
//! - [`classify`] - raw line classification (markers, sentinels, comments)
//! - [`codec`] - fixed-width field decode/encode
//! - [`assemble`] - classified lines → typed records (incl. multi-line types)
//! - [`parse`] - parse entry point returning document + diagnostics
//! - [`serialize`] - canonical fixed-width rendering
//! - [`mapping`] - built-in ANAREDE mapping and mapping-spec loading
//! - [`transform`] - shunt folding into bus records
//! - [`dat`] - AMPL-style DAT export
//!
//! ## Error Handling
//!
//! Entry points never fail on malformed input; they return
//! [`pwf_core::Diagnostics`] alongside the result:
//!
//! ```
//! use pwf_io::{default_registry, parse};
//!
//! let outcome = parse("DBAR\nBAD BUS LINE\n99999\nFIM\n", default_registry());
//! assert!(outcome.document.records("DBAR").is_empty());
//! assert!(outcome.diagnostics.has_errors());
//! for issue in &outcome.diagnostics.issues {
//!     eprintln!("{:?}: {}", issue.severity, issue.message);
//! }
//! ```

pub mod assemble;
pub mod classify;
pub mod codec;
pub mod dat;
pub mod mapping;
pub mod parse;
pub mod serialize;
pub mod transform;

pub use assemble::{assemble_section, RawLine};
pub use classify::{Classification, LineClassifier};
pub use codec::{decode_field, encode_field, Decoded};
pub use dat::{case_title, render_dat};
pub use mapping::{default_registry, registry_from_json, registry_from_spec, MappingSpec};
pub use parse::{parse, ParseOutcome};
pub use serialize::{serialize, SerializeOutcome};
pub use transform::fold_shunts;

#[cfg(test)]
mod tests;
