//! Parse entry point: raw text → network document + diagnostics.
//!
//! One sequential pass: each line is classified, data lines are grouped per
//! section occurrence, and every group is handed to the assembler when the
//! section closes (terminator, next section start, end-of-case, or
//! end-of-input). Parsing never aborts on a per-record failure; everything
//! recoverable lands in the returned diagnostics.

use pwf_core::{Diagnostics, NetworkDocument, RecordSchema, SchemaRegistry};

use crate::assemble::{assemble_section, RawLine};
use crate::classify::{Classification, LineClassifier};

/// Result of one parse pass.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: NetworkDocument,
    pub diagnostics: Diagnostics,
}

enum OpenSection<'a> {
    /// A registered record type collecting data lines
    Supported(&'a RecordSchema, Vec<RawLine>),
    /// A recognized-but-unsupported section being skipped
    Skipped,
}

/// Parse a complete case. The registry is read-only and may be shared.
pub fn parse(text: &str, registry: &SchemaRegistry) -> ParseOutcome {
    let classifier = LineClassifier::new(registry);
    let mut document = NetworkDocument::new();
    let mut diagnostics = Diagnostics::new();
    let mut open: Option<OpenSection> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        match classifier.classify(raw, open.is_some()) {
            Classification::Blank | Classification::Comment => {}
            Classification::Terminator => {
                close_section(open.take(), &mut document, &mut diagnostics);
            }
            Classification::EndOfCase => {
                close_section(open.take(), &mut document, &mut diagnostics);
                break;
            }
            Classification::RecordStart(schema) => {
                close_section(open.take(), &mut document, &mut diagnostics);
                open = Some(OpenSection::Supported(schema, Vec::new()));
            }
            Classification::UnsupportedSection(marker) => {
                close_section(open.take(), &mut document, &mut diagnostics);
                diagnostics.add_warning_at_line(
                    "parse",
                    format!("skipping section '{marker}' (not supported)"),
                    line_no,
                );
                open = Some(OpenSection::Skipped);
            }
            Classification::Continuation => match &mut open {
                Some(OpenSection::Supported(_, lines)) => {
                    lines.push(RawLine::new(line_no, raw));
                }
                Some(OpenSection::Skipped) | None => {
                    diagnostics.stats.skipped_lines += 1;
                }
            },
            Classification::Unrecognized => {
                diagnostics.add_warning_at_line("parse", "unrecognized line skipped", line_no);
                diagnostics.stats.skipped_lines += 1;
            }
        }
    }

    // End of input closes whatever is still open.
    close_section(open.take(), &mut document, &mut diagnostics);

    ParseOutcome {
        document,
        diagnostics,
    }
}

fn close_section(
    open: Option<OpenSection>,
    document: &mut NetworkDocument,
    diagnostics: &mut Diagnostics,
) {
    if let Some(OpenSection::Supported(schema, lines)) = open {
        let (records, diag) = assemble_section(schema, &lines);
        diagnostics.merge(diag);
        for record in records {
            document.push(record);
        }
    }
}
