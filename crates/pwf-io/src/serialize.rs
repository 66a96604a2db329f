//! Serializer: network document → canonical fixed-width text.
//!
//! Re-renders every record at the exact column positions its schema
//! declares, independent of how the original input was aligned. Sections
//! appear in the order the document first populated them, each closed by the
//! registry's terminator; the end-of-case marker closes the file. Records
//! whose values cannot be rendered (e.g. a value wider than its column
//! range) are dropped with an error diagnostic, and serialization continues.

use pwf_core::{
    Diagnostics, FieldError, FieldMap, FieldSpec, NetworkDocument, Record, RecordSchema,
    SchemaRegistry,
};

use crate::codec::encode_field;

/// Result of one serialization pass.
#[derive(Debug)]
pub struct SerializeOutcome {
    pub text: String,
    pub diagnostics: Diagnostics,
}

/// Render a document with the same registry it was parsed with (or one
/// explicitly targeting another column layout).
pub fn serialize(document: &NetworkDocument, registry: &SchemaRegistry) -> SerializeOutcome {
    let mut text = String::new();
    let mut diagnostics = Diagnostics::new();

    for (record_type, records) in document.sections() {
        let Some(schema) = registry.lookup(record_type) else {
            diagnostics.add_error(
                "encode",
                format!("no schema registered for record type '{record_type}'"),
            );
            continue;
        };

        text.push_str(&schema.marker);
        text.push('\n');
        for record in records {
            match render_record(schema, record) {
                Ok(lines) => {
                    for line in lines {
                        text.push_str(&line);
                        text.push('\n');
                    }
                    diagnostics.stats.records += 1;
                }
                Err(err) => {
                    diagnostics.add_error_with_record("encode", err.to_string(), record_type);
                    diagnostics.stats.skipped_records += 1;
                }
            }
        }
        text.push_str(registry.terminator());
        text.push('\n');
    }

    text.push_str(registry.end_marker());
    text.push('\n');

    SerializeOutcome { text, diagnostics }
}

fn render_record(schema: &RecordSchema, record: &Record) -> Result<Vec<String>, FieldError> {
    let mut lines = vec![render_line(&schema.fields, record.fields(), &schema.marker)?];

    if let Some(group) = &schema.group {
        let stride = group.fields.iter().map(|f| f.end).max().unwrap_or(0);
        let instances = record.list(&group.field).unwrap_or(&[]);
        for chunk in instances.chunks(group.per_line.max(1)) {
            let mut line = String::new();
            for (k, instance) in chunk.iter().enumerate() {
                let rendered = render_line(&group.fields, instance, &schema.marker)?;
                // Pad the previous block out to the stride so instance k
                // lands at its tiled column offset.
                while line.chars().count() < k * stride {
                    line.push(' ');
                }
                line.push_str(&rendered);
            }
            lines.push(line.trim_end().to_string());
        }
        if let Some(end_marker) = &group.end_marker {
            lines.push(end_marker.clone());
        }
    }

    Ok(lines)
}

/// Render one line from field specs, placing each encoded slice at its
/// declared columns. Fields missing from the map render their default.
fn render_line(
    specs: &[FieldSpec],
    fields: &FieldMap,
    record_type: &str,
) -> Result<String, FieldError> {
    let mut line = String::new();
    for spec in specs {
        let value = fields.get(&spec.name).unwrap_or(&spec.default);
        let slice = encode_field(value, spec, record_type)?;
        while line.chars().count() < spec.start - 1 {
            line.push(' ');
        }
        line.push_str(&slice);
    }
    Ok(line.trim_end().to_string())
}
