//! Fixed-width field codec: column slice ↔ typed value.
//!
//! `decode_field` and `encode_field` are a pure function pair driven by the
//! same [`FieldSpec`], so parse and serialize cannot disagree about a
//! field's layout. Round-trip holds up to padding normalization: numeric
//! kinds re-render right-justified, text left-justified, and a blank slice
//! re-renders as the canonical form of the field's default.

use pwf_core::{FieldError, FieldSpec, Value, ValueKind};

/// Decoded value plus whether the source slice was blank (default applied).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub defaulted: bool,
}

/// Extract the characters of a 1-based inclusive column range.
///
/// Ranges beyond the end of the line yield the available characters (possibly
/// none); the format routinely omits trailing blank columns.
pub fn slice_columns(line: &str, start: usize, end: usize) -> String {
    line.chars().skip(start - 1).take(end - start + 1).collect()
}

/// Decode one field from a raw line.
pub fn decode_field(
    line: &str,
    spec: &FieldSpec,
    record_type: &str,
    line_no: usize,
) -> Result<Decoded, FieldError> {
    let raw = slice_columns(line, spec.start, spec.end);
    let trimmed = match &spec.kind {
        ValueKind::Text {
            preserve_leading: true,
        } => raw.trim_end(),
        _ => raw.trim(),
    };

    if trimmed.is_empty() {
        return Ok(Decoded {
            value: spec.default.clone(),
            defaulted: true,
        });
    }

    let fail = |reason: String| FieldError {
        record_type: record_type.to_string(),
        field: spec.name.clone(),
        line: Some(line_no),
        slice: raw.clone(),
        reason,
    };

    let value = match &spec.kind {
        ValueKind::Integer { .. } => Value::Int(
            trimmed
                .parse::<i64>()
                .map_err(|_| fail(format!("'{trimmed}' is not an integer")))?,
        ),
        ValueKind::Float => Value::Float(
            trimmed
                .parse::<f64>()
                .map_err(|_| fail(format!("'{trimmed}' is not a number")))?,
        ),
        ValueKind::Scaled { scale } => {
            // Implied-scale integer is the canonical form; an explicit
            // decimal point is taken literally (the format writes both).
            if trimmed.contains('.') {
                Value::Float(
                    trimmed
                        .parse::<f64>()
                        .map_err(|_| fail(format!("'{trimmed}' is not a number")))?,
                )
            } else {
                let units = trimmed
                    .parse::<i64>()
                    .map_err(|_| fail(format!("'{trimmed}' is not a scaled integer")))?;
                Value::Float(units as f64 / f64::from(*scale))
            }
        }
        ValueKind::Text { .. } => Value::Text(trimmed.to_string()),
        ValueKind::Flag {
            true_code,
            false_code,
        } => {
            if trimmed == true_code {
                Value::Flag(true)
            } else if trimmed == false_code {
                Value::Flag(false)
            } else {
                return Err(fail(format!(
                    "'{trimmed}' is neither '{true_code}' nor '{false_code}'"
                )));
            }
        }
        ValueKind::Code { codes } => {
            if codes.iter().any(|c| c == trimmed) {
                Value::Code(trimmed.to_string())
            } else {
                return Err(fail(format!(
                    "code '{trimmed}' is not one of {}",
                    codes.join("/")
                )));
            }
        }
    };

    Ok(Decoded {
        value,
        defaulted: false,
    })
}

/// Render one value into a slice of exactly `spec.width()` characters.
pub fn encode_field(
    value: &Value,
    spec: &FieldSpec,
    record_type: &str,
) -> Result<String, FieldError> {
    let width = spec.width();
    let fail = |reason: String| FieldError {
        record_type: record_type.to_string(),
        field: spec.name.clone(),
        line: None,
        slice: String::new(),
        reason,
    };

    match &spec.kind {
        ValueKind::Integer { zero_fill } => {
            let v = integer_of(value).ok_or_else(|| fail("expected an integer".to_string()))?;
            render_integer(v, width, *zero_fill)
                .ok_or_else(|| fail(format!("{v} does not fit in {width} columns")))
        }
        ValueKind::Float => {
            let v = value
                .as_float()
                .ok_or_else(|| fail("expected a number".to_string()))?;
            render_float(v, width)
                .map(|s| format!("{s:>width$}"))
                .ok_or_else(|| fail(format!("{v} does not fit in {width} columns")))
        }
        ValueKind::Scaled { scale } => {
            let v = value
                .as_float()
                .ok_or_else(|| fail("expected a number".to_string()))?;
            let units = (v * f64::from(*scale)).round() as i64;
            render_integer(units, width, false)
                .ok_or_else(|| fail(format!("{v} does not fit in {width} columns")))
        }
        ValueKind::Text { .. } => {
            let v = value
                .as_str()
                .ok_or_else(|| fail("expected text".to_string()))?;
            if v.chars().count() > width {
                return Err(fail(format!("'{v}' does not fit in {width} columns")));
            }
            Ok(format!("{v:<width$}"))
        }
        ValueKind::Flag {
            true_code,
            false_code,
        } => {
            let v = value
                .as_flag()
                .ok_or_else(|| fail("expected a flag".to_string()))?;
            let code = if v { true_code } else { false_code };
            if code.chars().count() > width {
                return Err(fail(format!("'{code}' does not fit in {width} columns")));
            }
            Ok(format!("{code:<width$}"))
        }
        ValueKind::Code { codes } => {
            let v = value
                .as_str()
                .ok_or_else(|| fail("expected an enumerated code".to_string()))?;
            if !codes.iter().any(|c| c == v) {
                return Err(fail(format!("code '{v}' is not one of {}", codes.join("/"))));
            }
            if v.chars().count() > width {
                return Err(fail(format!("'{v}' does not fit in {width} columns")));
            }
            Ok(format!("{v:<width$}"))
        }
    }
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Int(v) => Some(*v),
        // Serialized documents may carry integral floats in integer columns
        // (e.g. values that went through a numeric transform).
        Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}

fn render_integer(v: i64, width: usize, zero_fill: bool) -> Option<String> {
    let rendered = if zero_fill {
        if v < 0 {
            format!("-{:0>w$}", v.unsigned_abs(), w = width.saturating_sub(1))
        } else {
            format!("{v:0>width$}")
        }
    } else {
        format!("{v:>width$}")
    };
    (rendered.len() <= width).then_some(rendered)
}

/// Shortest decimal rendering of `v` that fits `width` columns.
///
/// Prefers a representation that parses back to exactly `v`; falls back to
/// the highest precision that fits when `v` is not exactly representable.
fn render_float(v: f64, width: usize) -> Option<String> {
    let mut best: Option<String> = None;
    for precision in 0..=width {
        let s = format!("{v:.precision$}");
        if s.len() > width {
            break;
        }
        if s.parse::<f64>() == Ok(v) {
            return Some(s);
        }
        best = Some(s);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwf_core::FieldSpec;

    fn spec_int() -> FieldSpec {
        FieldSpec::integer("number", 1, 5, 0)
    }

    fn spec_scaled() -> FieldSpec {
        FieldSpec::scaled("voltage", 6, 10, 1000, 1.0)
    }

    #[test]
    fn decodes_integer_and_scaled_slices() {
        let line = "10001 1050     ";
        let number = decode_field(line, &spec_int(), "BUS", 1).unwrap();
        assert_eq!(number.value, Value::Int(10001));
        assert!(!number.defaulted);

        let voltage = decode_field(line, &spec_scaled(), "BUS", 1).unwrap();
        assert_eq!(voltage.value, Value::Float(1.05));
    }

    #[test]
    fn blank_slice_decodes_to_default() {
        let line = "10001          ";
        let voltage = decode_field(line, &spec_scaled(), "BUS", 1).unwrap();
        assert_eq!(voltage.value, Value::Float(1.0));
        assert!(voltage.defaulted);

        // Slice entirely beyond the end of the line is blank too.
        let short = decode_field("10001", &spec_scaled(), "BUS", 1).unwrap();
        assert!(short.defaulted);
    }

    #[test]
    fn scaled_decode_is_exact_integer_division() {
        let spec = FieldSpec::scaled("value", 1, 5, 100, 0.0);
        let decoded = decode_field("12345", &spec, "T", 1).unwrap();
        assert_eq!(decoded.value, Value::Float(123.45));
    }

    #[test]
    fn scaled_accepts_explicit_decimal_point() {
        let spec = FieldSpec::scaled("value", 1, 5, 1000, 0.0);
        let decoded = decode_field(" -8.4", &spec, "T", 1).unwrap();
        assert_eq!(decoded.value, Value::Float(-8.4));
    }

    #[test]
    fn bad_integer_reports_field_error() {
        let err = decode_field("  X  ", &spec_int(), "BUS", 7).unwrap_err();
        assert_eq!(err.record_type, "BUS");
        assert_eq!(err.field, "number");
        assert_eq!(err.line, Some(7));
        assert!(err.reason.contains("not an integer"));
    }

    #[test]
    fn out_of_range_code_fails() {
        let spec = FieldSpec::code("state", 1, 1, &["L", "D"], "L");
        assert_eq!(
            decode_field("L", &spec, "DBAR", 1).unwrap().value,
            Value::Code("L".to_string())
        );
        let err = decode_field("Z", &spec, "DBAR", 3).unwrap_err();
        assert!(err.reason.contains("not one of L/D"));
    }

    #[test]
    fn flag_decodes_both_codes() {
        let spec = FieldSpec::new(
            "closed",
            1,
            1,
            ValueKind::Flag {
                true_code: "F".to_string(),
                false_code: "A".to_string(),
            },
            Value::Flag(true),
        );
        assert_eq!(
            decode_field("F", &spec, "T", 1).unwrap().value,
            Value::Flag(true)
        );
        assert_eq!(
            decode_field("A", &spec, "T", 1).unwrap().value,
            Value::Flag(false)
        );
        assert!(decode_field("X", &spec, "T", 1).is_err());
        assert_eq!(
            encode_field(&Value::Flag(false), &spec, "T").unwrap(),
            "A".to_string()
        );
    }

    #[test]
    fn encode_right_justifies_numerics() {
        assert_eq!(
            encode_field(&Value::Int(42), &spec_int(), "BUS").unwrap(),
            "   42"
        );
        assert_eq!(
            encode_field(&Value::Float(1.05), &spec_scaled(), "BUS").unwrap(),
            " 1050"
        );
        assert_eq!(
            encode_field(&Value::Float(-8.4), &FieldSpec::float("angle", 1, 4, 0.0), "T").unwrap(),
            "-8.4"
        );
    }

    #[test]
    fn encode_zero_fill() {
        let spec = FieldSpec::new(
            "circuit",
            1,
            3,
            ValueKind::Integer { zero_fill: true },
            Value::Int(1),
        );
        assert_eq!(encode_field(&Value::Int(7), &spec, "T").unwrap(), "007");
        assert_eq!(encode_field(&Value::Int(-7), &spec, "T").unwrap(), "-07");
    }

    #[test]
    fn encode_left_justifies_text() {
        let spec = FieldSpec::text("name", 1, 8, "");
        assert_eq!(
            encode_field(&Value::Text("BAR-1".to_string()), &spec, "DBAR").unwrap(),
            "BAR-1   "
        );
    }

    #[test]
    fn encode_rejects_overflow() {
        let err = encode_field(&Value::Int(123_456), &spec_int(), "BUS").unwrap_err();
        assert!(err.reason.contains("does not fit"));
        assert_eq!(err.line, None);

        let spec = FieldSpec::text("name", 1, 3, "");
        assert!(encode_field(&Value::Text("ABCD".to_string()), &spec, "T").is_err());
    }

    #[test]
    fn round_trip_reproduces_canonical_slices() {
        // encode(decode(s)) == s for already-canonical slices.
        for (raw, spec) in [
            ("10001", spec_int()),
            ("  123", spec_int()),
            (" 1050", FieldSpec::scaled("v", 1, 5, 1000, 1.0)),
            (" 5.34", FieldSpec::float("x", 1, 5, 0.0)),
            ("BAR-1   ", FieldSpec::text("n", 1, 8, "")),
        ] {
            let decoded = decode_field(raw, &spec, "T", 1).unwrap();
            let encoded = encode_field(&decoded.value, &spec, "T").unwrap();
            assert_eq!(encoded, raw, "round-trip of {raw:?}");
        }
    }

    #[test]
    fn float_rendering_prefers_exact_reparse() {
        assert_eq!(render_float(5.34, 5), Some("5.34".to_string()));
        assert_eq!(render_float(0.0, 5), Some("0".to_string()));
        assert_eq!(render_float(650.0, 6), Some("650".to_string()));
        // Not exactly representable in 5 columns: best effort, max precision.
        assert_eq!(render_float(1.0 / 3.0, 5), Some("0.333".to_string()));
        // Integer part alone does not fit.
        assert_eq!(render_float(123_456.0, 5), None);
    }
}
