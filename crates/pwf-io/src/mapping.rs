//! Field-mapping configuration.
//!
//! Two ways to obtain a [`SchemaRegistry`]:
//!
//! - [`default_registry`] - the built-in ANAREDE mapping, constructed once
//!   and shared read-only for the life of the process.
//! - [`registry_from_spec`] / [`registry_from_json`] - build a registry from
//!   an externally supplied mapping specification (the loading of the JSON
//!   text itself is the caller's job; this module only consumes the parsed
//!   structure).
//!
//! A specification field without an explicit `kind` infers one from its
//! default value (number with decimal point → float, integer → integer,
//! string → text), matching the original mapping files, with `scale` and
//! `codes` promoting to the scaled and enumerated kinds.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

use pwf_core::constants::INFINITY_LIMIT;
use pwf_core::{FieldSpec, GroupSpec, RecordSchema, SchemaRegistry, Value, ValueKind};

/// Externally supplied mapping specification for one whole format.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingSpec {
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    #[serde(default = "default_terminator")]
    pub terminator: String,
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
    /// Markers recognized and skipped with a warning, not decoded.
    #[serde(default)]
    pub skip: Vec<String>,
    pub records: Vec<RecordDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordDef {
    pub marker: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub group: Option<GroupDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupDef {
    pub field: String,
    pub fields: Vec<FieldDef>,
    #[serde(default = "one")]
    pub per_line: usize,
    #[serde(default)]
    pub end_marker: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub kind: Option<KindDef>,
    #[serde(default)]
    pub default: serde_json::Value,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub codes: Option<Vec<String>>,
    #[serde(default)]
    pub true_code: Option<String>,
    #[serde(default)]
    pub false_code: Option<String>,
    #[serde(default)]
    pub zero_fill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDef {
    Integer,
    Float,
    Scaled,
    Text,
    Flag,
    Code,
}

fn default_comment_prefix() -> String {
    "(".to_string()
}

fn default_terminator() -> String {
    "99999".to_string()
}

fn default_end_marker() -> String {
    "FIM".to_string()
}

fn one() -> usize {
    1
}

/// Build a validated registry from a mapping specification.
pub fn registry_from_spec(spec: &MappingSpec) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new(
        spec.comment_prefix.clone(),
        spec.terminator.clone(),
        spec.end_marker.clone(),
    );
    for record in &spec.records {
        let mut schema = RecordSchema::new(
            record.marker.clone(),
            convert_fields(&record.marker, &record.fields)?,
        );
        if let Some(group) = &record.group {
            schema = schema.with_group(GroupSpec {
                field: group.field.clone(),
                fields: convert_fields(&record.marker, &group.fields)?,
                per_line: group.per_line,
                end_marker: group.end_marker.clone(),
            });
        }
        registry
            .register(schema)
            .with_context(|| format!("registering record type '{}'", record.marker))?;
    }
    for marker in &spec.skip {
        registry
            .acknowledge(marker.clone())
            .with_context(|| format!("acknowledging section '{marker}'"))?;
    }
    Ok(registry)
}

/// Parse a mapping-specification JSON document and build its registry.
pub fn registry_from_json(text: &str) -> Result<SchemaRegistry> {
    let spec: MappingSpec =
        serde_json::from_str(text).context("parsing mapping specification JSON")?;
    registry_from_spec(&spec)
}

fn convert_fields(marker: &str, defs: &[FieldDef]) -> Result<Vec<FieldSpec>> {
    defs.iter()
        .map(|def| convert_field(def).with_context(|| format!("field '{}' of '{marker}'", def.name)))
        .collect()
}

fn convert_field(def: &FieldDef) -> Result<FieldSpec> {
    let kind = match def.kind {
        Some(kind) => kind,
        None => infer_kind(def),
    };

    let (kind, default) = match kind {
        KindDef::Integer => (
            ValueKind::Integer {
                zero_fill: def.zero_fill,
            },
            Value::Int(def.default.as_i64().unwrap_or(0)),
        ),
        KindDef::Float => (
            ValueKind::Float,
            Value::Float(def.default.as_f64().unwrap_or(0.0)),
        ),
        KindDef::Scaled => {
            let Some(scale) = def.scale else {
                bail!("scaled field without a scale");
            };
            (
                ValueKind::Scaled { scale },
                Value::Float(def.default.as_f64().unwrap_or(0.0)),
            )
        }
        KindDef::Text => (
            ValueKind::Text {
                preserve_leading: false,
            },
            Value::Text(def.default.as_str().unwrap_or("").to_string()),
        ),
        KindDef::Flag => {
            let (Some(true_code), Some(false_code)) = (&def.true_code, &def.false_code) else {
                bail!("flag field without true_code/false_code");
            };
            (
                ValueKind::Flag {
                    true_code: true_code.clone(),
                    false_code: false_code.clone(),
                },
                Value::Flag(def.default.as_bool().unwrap_or(false)),
            )
        }
        KindDef::Code => {
            let Some(codes) = &def.codes else {
                bail!("enumerated field without codes");
            };
            let default = def
                .default
                .as_str()
                .map(str::to_string)
                .or_else(|| codes.first().cloned())
                .unwrap_or_default();
            (
                ValueKind::Code {
                    codes: codes.clone(),
                },
                Value::Code(default),
            )
        }
    };

    Ok(FieldSpec::new(
        def.name.clone(),
        def.start,
        def.end,
        kind,
        default,
    ))
}

/// Infer a kind from the shape of the default value, the way the original
/// mapping files did: `scale` → scaled, `codes` → enumerated, integer
/// default → integer, fractional default → float, anything else → text.
fn infer_kind(def: &FieldDef) -> KindDef {
    if def.scale.is_some() {
        return KindDef::Scaled;
    }
    if def.codes.is_some() {
        return KindDef::Code;
    }
    if def.true_code.is_some() || def.false_code.is_some() {
        return KindDef::Flag;
    }
    match &def.default {
        serde_json::Value::Number(n) if n.is_i64() => KindDef::Integer,
        serde_json::Value::Number(_) => KindDef::Float,
        serde_json::Value::Bool(_) => KindDef::Flag,
        _ => KindDef::Text,
    }
}

/// Built-in ANAREDE mapping, built once per process.
pub fn default_registry() -> &'static SchemaRegistry {
    static REGISTRY: Lazy<SchemaRegistry> =
        Lazy::new(|| build_default_registry().expect("built-in ANAREDE mapping is valid"));
    &REGISTRY
}

/// Sections the format defines but this engine does not decode.
const UNSUPPORTED_SECTIONS: &[&str] = &[
    "DOPC", "QLIM", "DGLT", "DARE", "DGBT", "DGGB", "DTPF", "DMFL", "DCTR", "DELO", "DCBA",
    "DCLI", "DCNV", "DCCV",
];

fn build_default_registry() -> Result<SchemaRegistry, pwf_core::SchemaError> {
    use FieldSpec as F;

    let mut reg = SchemaRegistry::new("(", "99999", "FIM");

    // Case title: one free-text line.
    reg.register(RecordSchema::new("TITU", vec![F::text("title", 1, 80, "")]))?;

    // DBAR - AC bus data.
    reg.register(RecordSchema::new(
        "DBAR",
        vec![
            F::integer("number", 1, 5, 0),
            F::text("operation", 6, 6, "A"),
            F::code("state", 7, 7, &["L", "D"], "L"),
            F::integer("type", 8, 8, 0),
            F::text("voltage_group", 9, 10, ""),
            F::text("name", 11, 22, ""),
            F::text("limit_group", 23, 24, ""),
            F::scaled("voltage", 25, 28, 1000, 1.0),
            F::float("angle", 29, 32, 0.0),
            F::float("active_generation", 33, 37, 0.0),
            F::float("reactive_generation", 38, 42, 0.0),
            F::float("min_reactive_generation", 43, 47, -9999.0),
            F::float("max_reactive_generation", 48, 52, 9999.0),
            F::integer("controlled_bus", 53, 58, 0),
            F::float("active_load", 59, 63, 0.0),
            F::float("reactive_load", 64, 68, 0.0),
            F::float("capacitor_reactor", 69, 73, 0.0),
            F::integer("area", 74, 76, 1),
            F::scaled("charge_voltage", 77, 80, 1000, 1.0),
        ],
    ))?;

    // DLIN - AC circuit (line/transformer) data.
    reg.register(RecordSchema::new(
        "DLIN",
        vec![
            F::integer("from_bus", 1, 5, 0),
            F::text("operation", 8, 8, "A"),
            F::integer("to_bus", 11, 15, 0),
            F::integer("circuit", 16, 17, 1),
            F::code("state", 18, 18, &["L", "D"], "L"),
            F::float("resistance", 21, 26, 0.0),
            F::float("reactance", 27, 32, 0.0),
            F::float("susceptance", 33, 38, 0.0),
            F::float("tap", 39, 43, 1.0),
            F::float("tap_min", 44, 48, 0.0),
            F::float("tap_max", 49, 53, 0.0),
            F::float("phase_shift", 54, 58, 0.0),
            F::integer("controlled_bus", 59, 64, 0),
            F::float("normal_capacity", 65, 68, 9999.0),
            F::float("emergency_capacity", 69, 72, 9999.0),
            F::integer("tap_steps", 73, 74, 0),
        ],
    ))?;

    // DGER - generator limit/participation data.
    reg.register(RecordSchema::new(
        "DGER",
        vec![
            F::integer("number", 1, 5, 0),
            F::text("operation", 7, 7, "A"),
            F::float("min_active_generation", 9, 14, 0.0),
            F::float("max_active_generation", 16, 21, INFINITY_LIMIT),
            F::float("participation_factor", 23, 27, 0.0),
            F::float("remote_participation_factor", 29, 33, 100.0),
            F::float("nominal_participation_factor", 35, 39, 0.0),
            F::float("armature_current_limit", 41, 44, 0.0),
            F::float("rotor_current_limit", 46, 49, 0.0),
            F::float("load_angle", 51, 54, 0.0),
            F::float("quadrature_reactance", 56, 60, 0.0),
            F::float("nominal_apparent_power", 62, 66, 0.0),
        ],
    ))?;

    // DCSC - controllable series compensator data.
    reg.register(RecordSchema::new(
        "DCSC",
        vec![
            F::integer("from_bus", 1, 5, 0),
            F::text("operation", 8, 8, "A"),
            F::integer("to_bus", 10, 14, 0),
            F::integer("circuit", 15, 16, 1),
            F::code("state", 18, 18, &["L", "D"], "L"),
            F::text("owner", 20, 20, "F"),
            F::text("bypass", 22, 22, "D"),
            F::float("min_reactance", 23, 34, -9999.0),
            F::float("max_reactance", 35, 46, 9999.0),
            F::float("initial_reactance", 47, 55, 0.0),
            F::code("control_mode", 56, 56, &["X", "P", "I"], "X"),
            F::float("specified_value", 57, 69, 0.0),
            F::integer("measurement_terminal", 70, 71, 1),
            F::integer("number_of_stages", 72, 75, 1),
        ],
    ))?;

    // DCER - static reactive compensator data.
    reg.register(RecordSchema::new(
        "DCER",
        vec![
            F::integer("bus", 1, 5, 0),
            F::text("operation", 7, 7, "A"),
            F::integer("group", 9, 10, 1),
            F::integer("units", 11, 13, 1),
            F::integer("controlled_bus", 15, 19, 0),
            F::float("slope", 21, 26, 0.0),
            F::float("reactive_generation", 27, 34, 0.0),
            F::float("min_reactive_generation", 35, 42, -INFINITY_LIMIT),
            F::float("max_reactive_generation", 43, 50, INFINITY_LIMIT),
            F::code("control_mode", 51, 52, &["I", "Q", "V", "P"], "I"),
            F::code("state", 53, 54, &["L", "D"], "L"),
        ],
    ))?;

    // DBSH - shunt bank data; one bank per continuation line, closed by FBAN.
    reg.register(
        RecordSchema::new(
            "DBSH",
            vec![
                F::integer("from_bus", 1, 5, 0),
                F::text("operation", 7, 7, "A"),
                F::integer("to_bus", 9, 13, 0),
                F::text("control_mode", 18, 18, "C"),
                F::float("initial_reactive_injection", 36, 41, 0.0),
                // 0 means "same as from_bus"; resolved by the shunt transform.
                F::integer("terminal_bus", 47, 51, 0),
            ],
        )
        .with_group(GroupSpec {
            field: "banks".to_string(),
            fields: vec![
                F::integer("group_id", 1, 2, 1),
                F::code("state", 7, 7, &["L", "D"], "L"),
                F::integer("units_in_operation", 13, 15, 1),
                F::float("unit_reactive_power", 17, 22, 0.0),
            ],
            per_line: 1,
            end_marker: Some("FBAN".to_string()),
        }),
    )?;

    // DSHL - AC circuit shunt device data.
    reg.register(RecordSchema::new(
        "DSHL",
        vec![
            F::integer("from_bus", 1, 5, 0),
            F::text("operation", 7, 7, "A"),
            F::integer("to_bus", 10, 14, 0),
            F::integer("circuit", 15, 16, 1),
            F::float("shunt_from", 18, 23, 0.0),
            F::float("shunt_to", 24, 29, 0.0),
            F::code("state_from", 31, 32, &["L", "D"], "L"),
            F::code("state_to", 34, 35, &["L", "D"], "L"),
        ],
    ))?;

    // DCAR - functional (voltage-dependent) load composition. Decoded and
    // retained; no computation consumes it here.
    reg.register(RecordSchema::new(
        "DCAR",
        vec![
            F::text("set_type_1", 1, 4, ""),
            F::integer("set_from_1", 6, 10, 0),
            F::text("set_type_2", 12, 15, ""),
            F::integer("set_from_2", 17, 21, 0),
            F::text("set_type_3", 23, 26, ""),
            F::integer("set_from_3", 28, 32, 0),
            F::text("set_type_4", 34, 37, ""),
            F::integer("set_from_4", 39, 43, 0),
            F::text("operation", 45, 45, "A"),
            F::float("p_const_current", 47, 49, 0.0),
            F::float("p_const_impedance", 51, 53, 0.0),
            F::float("q_const_current", 55, 57, 0.0),
            F::float("q_const_impedance", 59, 61, 0.0),
            F::scaled("undervoltage_threshold", 63, 66, 1000, 0.7),
        ],
    ))?;

    for marker in UNSUPPORTED_SECTIONS {
        reg.acknowledge(*marker)?;
    }

    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_builds_and_knows_all_sections() {
        let reg = default_registry();
        for marker in ["TITU", "DBAR", "DLIN", "DGER", "DCSC", "DCER", "DBSH", "DSHL", "DCAR"] {
            assert!(reg.lookup(marker).is_some(), "missing {marker}");
        }
        assert!(reg.lookup("DBSH").unwrap().is_multi_line());
        assert_eq!(reg.match_acknowledged("DOPC IMPR"), Some("DOPC"));
        assert_eq!(reg.comment_prefix(), "(");
        assert_eq!(reg.terminator(), "99999");
        assert_eq!(reg.end_marker(), "FIM");
    }

    #[test]
    fn registry_from_json_with_inferred_kinds() {
        let json = r#"{
            "records": [
                {
                    "marker": "BUS",
                    "fields": [
                        {"name": "number", "start": 1, "end": 5, "default": 0},
                        {"name": "voltage", "start": 6, "end": 10, "scale": 1000, "default": 1.0},
                        {"name": "name", "start": 11, "end": 22, "default": ""},
                        {"name": "state", "start": 23, "end": 23, "codes": ["L", "D"], "default": "L"}
                    ]
                }
            ],
            "skip": ["DOPC"]
        }"#;
        let reg = registry_from_json(json).unwrap();
        let schema = reg.lookup("BUS").unwrap();
        assert_eq!(
            schema.field("number").unwrap().kind,
            ValueKind::Integer { zero_fill: false }
        );
        assert_eq!(
            schema.field("voltage").unwrap().kind,
            ValueKind::Scaled { scale: 1000 }
        );
        assert!(matches!(
            schema.field("name").unwrap().kind,
            ValueKind::Text { .. }
        ));
        assert!(matches!(
            schema.field("state").unwrap().kind,
            ValueKind::Code { .. }
        ));
        assert_eq!(reg.match_acknowledged("DOPC"), Some("DOPC"));
    }

    #[test]
    fn registry_from_json_rejects_overlapping_mapping() {
        let json = r#"{
            "records": [
                {
                    "marker": "BUS",
                    "fields": [
                        {"name": "a", "start": 1, "end": 5, "default": 0},
                        {"name": "b", "start": 5, "end": 9, "default": 0}
                    ]
                }
            ]
        }"#;
        let err = registry_from_json(json).unwrap_err();
        assert!(err.to_string().contains("registering record type 'BUS'"));
    }

    #[test]
    fn scaled_spec_without_scale_is_rejected() {
        let json = r#"{
            "records": [
                {
                    "marker": "BUS",
                    "fields": [
                        {"name": "v", "start": 1, "end": 4, "kind": "scaled", "default": 1.0}
                    ]
                }
            ]
        }"#;
        assert!(registry_from_json(json).is_err());
    }
}
