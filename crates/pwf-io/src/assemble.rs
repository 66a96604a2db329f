//! Record assembly: classified section lines → typed records.
//!
//! Single-line record types decode one record per data line. Multi-line
//! record types decode a header line plus continuation lines carrying
//! repeated sub-groups (e.g. one capacitor bank per line) until the group
//! end marker; the sub-groups land in the record's list-valued field.
//!
//! Assembly is failure-isolated: a malformed line discards the record it
//! belongs to, records a diagnostic, and assembly resumes with the next
//! record start. One bad record never takes the section down.

use pwf_core::{
    AssemblyError, Diagnostics, FieldError, FieldMap, FieldSpec, GroupSpec, Record, RecordSchema,
    Value,
};

use crate::codec::{decode_field, slice_columns};

/// One data line of a section, with its 1-based source line number kept for
/// diagnostics. Transient: discarded once records are assembled.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Assemble all records of one section occurrence.
pub fn assemble_section(schema: &RecordSchema, lines: &[RawLine]) -> (Vec<Record>, Diagnostics) {
    match &schema.group {
        None => assemble_single_line(schema, lines),
        Some(group) => assemble_multi_line(schema, group, lines),
    }
}

fn assemble_single_line(schema: &RecordSchema, lines: &[RawLine]) -> (Vec<Record>, Diagnostics) {
    let mut records = Vec::new();
    let mut diag = Diagnostics::new();

    for line in lines {
        match decode_line(&line.text, &schema.fields, &schema.marker, line.number, &mut diag) {
            Ok(fields) => {
                records.push(Record::new(&schema.marker, fields));
                diag.stats.records += 1;
            }
            Err(err) => {
                diag.add_error_for("parse", err.to_string(), &schema.marker, line.number);
                diag.stats.skipped_records += 1;
            }
        }
    }

    (records, diag)
}

fn assemble_multi_line(
    schema: &RecordSchema,
    group: &GroupSpec,
    lines: &[RawLine],
) -> (Vec<Record>, Diagnostics) {
    enum Mode {
        /// Waiting for the next record's header line
        Header,
        /// Accumulating sub-group continuation lines
        Banks {
            header: FieldMap,
            header_line: usize,
            banks: Vec<FieldMap>,
        },
        /// Discarding lines after a failure, until the group end marker
        Resync,
    }

    let mut records = Vec::new();
    let mut diag = Diagnostics::new();
    let mut mode = Mode::Header;

    let is_group_end = |text: &str| {
        group
            .end_marker
            .as_deref()
            .is_some_and(|m| text.trim_start().starts_with(m))
    };

    for line in lines {
        mode = match mode {
            Mode::Header => {
                match decode_line(&line.text, &schema.fields, &schema.marker, line.number, &mut diag)
                {
                    Ok(header) => Mode::Banks {
                        header,
                        header_line: line.number,
                        banks: Vec::new(),
                    },
                    Err(err) => {
                        diag.add_error_for("parse", err.to_string(), &schema.marker, line.number);
                        diag.stats.skipped_records += 1;
                        Mode::Resync
                    }
                }
            }
            Mode::Banks {
                header,
                header_line,
                mut banks,
            } => {
                if is_group_end(&line.text) {
                    records.push(finish_record(schema, group, header, banks));
                    diag.stats.records += 1;
                    Mode::Header
                } else {
                    match decode_group_line(&line.text, group, &schema.marker, line.number, &mut diag)
                    {
                        Ok(instances) => {
                            banks.extend(instances);
                            Mode::Banks {
                                header,
                                header_line,
                                banks,
                            }
                        }
                        Err(err) => {
                            let err = AssemblyError::BadContinuation {
                                record_type: schema.marker.clone(),
                                line: line.number,
                                source: err,
                            };
                            diag.add_error_for(
                                "assembly",
                                err.to_string(),
                                &schema.marker,
                                line.number,
                            );
                            diag.stats.skipped_records += 1;
                            Mode::Resync
                        }
                    }
                }
            }
            Mode::Resync => {
                if is_group_end(&line.text) {
                    Mode::Header
                } else {
                    diag.stats.skipped_lines += 1;
                    Mode::Resync
                }
            }
        };
    }

    // Section end closes an open group, unless the schema declares an
    // explicit end marker, in which case its absence is a malformed record.
    if let Mode::Banks {
        header,
        header_line,
        banks,
    } = mode
    {
        if group.end_marker.is_some() {
            let err = AssemblyError::UnterminatedGroup {
                record_type: schema.marker.clone(),
                line: header_line,
            };
            diag.add_error_for("assembly", err.to_string(), &schema.marker, header_line);
            diag.stats.skipped_records += 1;
        } else {
            records.push(finish_record(schema, group, header, banks));
            diag.stats.records += 1;
        }
    }

    (records, diag)
}

fn finish_record(
    schema: &RecordSchema,
    group: &GroupSpec,
    mut header: FieldMap,
    banks: Vec<FieldMap>,
) -> Record {
    header.insert(group.field.clone(), Value::List(banks));
    Record::new(&schema.marker, header)
}

/// Decode every field of `specs` from one line. Every declared field ends up
/// in the map, defaulted when its slice is blank.
fn decode_line(
    line: &str,
    specs: &[FieldSpec],
    record_type: &str,
    line_no: usize,
    diag: &mut Diagnostics,
) -> Result<FieldMap, FieldError> {
    let mut fields = FieldMap::new();
    let mut defaulted = 0usize;
    for spec in specs {
        let decoded = decode_field(line, spec, record_type, line_no)?;
        if decoded.defaulted {
            defaulted += 1;
        }
        fields.insert(spec.name.clone(), decoded.value);
    }
    diag.stats.defaulted_values += defaulted;
    Ok(fields)
}

/// Decode the sub-group instances on one continuation line.
///
/// Instances tile the line at a stride of the group's column span; a fully
/// blank block ends the line's instances.
fn decode_group_line(
    line: &str,
    group: &GroupSpec,
    record_type: &str,
    line_no: usize,
    diag: &mut Diagnostics,
) -> Result<Vec<FieldMap>, FieldError> {
    let stride = group.fields.iter().map(|f| f.end).max().unwrap_or(0);
    let mut instances = Vec::new();
    for k in 0..group.per_line {
        let block = slice_columns(line, k * stride + 1, (k + 1) * stride);
        if block.trim().is_empty() {
            break;
        }
        instances.push(decode_line(&block, &group.fields, record_type, line_no, diag)?);
    }
    Ok(instances)
}
