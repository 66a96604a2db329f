//! Declarative field-mapping schema for fixed-width record types.
//!
//! A [`RecordSchema`] describes one record type of the exchange format: its
//! leading marker and the ordered column layout of its fields. Multi-line
//! record types additionally carry a [`GroupSpec`] describing the repeated
//! sub-group on continuation lines. The [`SchemaRegistry`] owns every
//! registered schema plus the format-level sentinels (comment prefix,
//! section terminator, end-of-case marker) and validates all of it up front.

use crate::error::SchemaError;
use crate::record::Value;

/// How a column slice converts to and from a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Plain base-10 integer, optional sign. `zero_fill` renders with
    /// leading zeros instead of spaces.
    Integer { zero_fill: bool },
    /// Free decimal number written with an explicit decimal point.
    Float,
    /// Decimal with implied scale: the slice holds an integer that is an
    /// exact multiple of `1/scale` (e.g. raw `1050` with scale 1000 is
    /// 1.050). A slice carrying an explicit decimal point is taken literally.
    Scaled { scale: u32 },
    /// Verbatim text, trailing spaces stripped. `preserve_leading` keeps
    /// leading spaces instead of trimming them.
    Text { preserve_leading: bool },
    /// Two-state marker rendered as one of two codes.
    Flag { true_code: String, false_code: String },
    /// One of a closed set of codes; anything else fails decoding.
    Code { codes: Vec<String> },
}

/// Column layout and conversion rules for one field.
///
/// Columns are 1-based and inclusive on both ends, matching the format
/// documentation's numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub kind: ValueKind,
    /// Decoded value used when the source slice is blank.
    pub default: Value,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        start: usize,
        end: usize,
        kind: ValueKind,
        default: Value,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            kind,
            default,
        }
    }

    /// Width of the rendered slice in characters.
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn integer(name: impl Into<String>, start: usize, end: usize, default: i64) -> Self {
        Self::new(
            name,
            start,
            end,
            ValueKind::Integer { zero_fill: false },
            Value::Int(default),
        )
    }

    pub fn float(name: impl Into<String>, start: usize, end: usize, default: f64) -> Self {
        Self::new(name, start, end, ValueKind::Float, Value::Float(default))
    }

    pub fn scaled(
        name: impl Into<String>,
        start: usize,
        end: usize,
        scale: u32,
        default: f64,
    ) -> Self {
        Self::new(
            name,
            start,
            end,
            ValueKind::Scaled { scale },
            Value::Float(default),
        )
    }

    pub fn text(name: impl Into<String>, start: usize, end: usize, default: &str) -> Self {
        Self::new(
            name,
            start,
            end,
            ValueKind::Text {
                preserve_leading: false,
            },
            Value::Text(default.to_string()),
        )
    }

    pub fn code(
        name: impl Into<String>,
        start: usize,
        end: usize,
        codes: &[&str],
        default: &str,
    ) -> Self {
        Self::new(
            name,
            start,
            end,
            ValueKind::Code {
                codes: codes.iter().map(|c| c.to_string()).collect(),
            },
            Value::Code(default.to_string()),
        )
    }
}

/// Repeated sub-group layout for multi-line record types.
///
/// Continuation lines carry `per_line` sub-group instances; each instance
/// uses `fields` as its column layout, repeated at a stride of the group's
/// column span. Decoded sub-groups accumulate under the list-valued `field`
/// of the parent record until `end_marker` (or the section end) is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    /// Name of the list-valued field on the parent record (e.g. "banks").
    pub field: String,
    /// Column layout of one sub-group instance on a continuation line.
    pub fields: Vec<FieldSpec>,
    /// Sub-group instances per continuation line.
    pub per_line: usize,
    /// Line marker closing the group (e.g. "FBAN"); section end also closes.
    pub end_marker: Option<String>,
}

/// Marker plus ordered field specs for one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub marker: String,
    pub fields: Vec<FieldSpec>,
    pub group: Option<GroupSpec>,
}

impl RecordSchema {
    pub fn new(marker: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            marker: marker.into(),
            fields,
            group: None,
        }
    }

    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.group = Some(group);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_multi_line(&self) -> bool {
        self.group.is_some()
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.marker.trim().is_empty() {
            return Err(SchemaError::EmptyMarker);
        }
        validate_fields(&self.marker, &self.fields)?;
        if let Some(group) = &self.group {
            if group.per_line == 0 {
                return Err(SchemaError::EmptyGroup {
                    record_type: self.marker.clone(),
                });
            }
            if self.field(&group.field).is_some() {
                return Err(SchemaError::DuplicateField {
                    record_type: self.marker.clone(),
                    field: group.field.clone(),
                });
            }
            validate_fields(&self.marker, &group.fields)?;
        }
        Ok(())
    }
}

fn validate_fields(marker: &str, fields: &[FieldSpec]) -> Result<(), SchemaError> {
    for (idx, field) in fields.iter().enumerate() {
        if field.start == 0 {
            return Err(SchemaError::ZeroColumn {
                record_type: marker.to_string(),
                field: field.name.clone(),
            });
        }
        if field.start > field.end {
            return Err(SchemaError::InvertedColumns {
                record_type: marker.to_string(),
                field: field.name.clone(),
                start: field.start,
                end: field.end,
            });
        }
        if let ValueKind::Code { codes } = &field.kind {
            if codes.is_empty() {
                return Err(SchemaError::EmptyCodeSet {
                    record_type: marker.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        if fields[..idx].iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateField {
                record_type: marker.to_string(),
                field: field.name.clone(),
            });
        }
        // Ascending order doubles as the overlap check: each field must
        // start after the previous one ends.
        if idx > 0 {
            let previous = &fields[idx - 1];
            if field.start <= previous.end {
                return Err(SchemaError::OverlappingColumns {
                    record_type: marker.to_string(),
                    previous: previous.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// The full set of supported record types plus format-level sentinels.
///
/// Built once at startup and immutable thereafter; parsing and serialization
/// share it so decode and encode rules cannot drift apart. May be shared
/// read-only across threads without synchronization.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<RecordSchema>,
    /// Marker indices sorted longest marker first, so a short marker can
    /// never shadow a longer one sharing its prefix.
    by_length: Vec<usize>,
    /// Markers recognized as valid sections but intentionally not decoded.
    acknowledged: Vec<String>,
    comment_prefix: String,
    terminator: String,
    end_marker: String,
}

impl SchemaRegistry {
    /// Empty registry with the given format sentinels.
    pub fn new(
        comment_prefix: impl Into<String>,
        terminator: impl Into<String>,
        end_marker: impl Into<String>,
    ) -> Self {
        Self {
            schemas: Vec::new(),
            by_length: Vec::new(),
            acknowledged: Vec::new(),
            comment_prefix: comment_prefix.into(),
            terminator: terminator.into(),
            end_marker: end_marker.into(),
        }
    }

    /// Register a record type. All schema validation happens here, so a
    /// malformed mapping fails at build time rather than misparsing later.
    pub fn register(&mut self, schema: RecordSchema) -> Result<&RecordSchema, SchemaError> {
        schema.validate()?;
        if self.lookup(&schema.marker).is_some() || self.acknowledged.contains(&schema.marker) {
            return Err(SchemaError::DuplicateMarker(schema.marker));
        }
        self.schemas.push(schema);
        let idx = self.schemas.len() - 1;
        let len = self.schemas[idx].marker.len();
        let pos = self
            .by_length
            .iter()
            .position(|&i| self.schemas[i].marker.len() < len)
            .unwrap_or(self.by_length.len());
        self.by_length.insert(pos, idx);
        Ok(&self.schemas[idx])
    }

    /// Mark a section keyword as recognized-but-unsupported: the classifier
    /// will identify it so the parser can skip the section with a warning
    /// instead of reporting every line as unrecognized.
    pub fn acknowledge(&mut self, marker: impl Into<String>) -> Result<(), SchemaError> {
        let marker = marker.into();
        if marker.trim().is_empty() {
            return Err(SchemaError::EmptyMarker);
        }
        if self.lookup(&marker).is_some() || self.acknowledged.contains(&marker) {
            return Err(SchemaError::DuplicateMarker(marker));
        }
        self.acknowledged.push(marker);
        Ok(())
    }

    /// Schema registered under exactly this marker.
    pub fn lookup(&self, marker: &str) -> Option<&RecordSchema> {
        self.schemas.iter().find(|s| s.marker == marker)
    }

    /// Schema whose marker is a prefix of `line`, longest marker first.
    pub fn match_marker<'a>(&'a self, line: &str) -> Option<&'a RecordSchema> {
        self.by_length
            .iter()
            .map(|&i| &self.schemas[i])
            .find(|s| line.starts_with(&s.marker))
    }

    /// Acknowledged (skip-with-warning) marker prefixing `line`, if any.
    pub fn match_acknowledged<'a>(&'a self, line: &str) -> Option<&'a str> {
        self.acknowledged
            .iter()
            .map(String::as_str)
            .find(|m| line.starts_with(m))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &RecordSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn comment_prefix(&self) -> &str {
        &self.comment_prefix
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    pub fn end_marker(&self) -> &str {
        &self.end_marker
    }
}
