//! Decoded record values.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// One decoded field value.
///
/// `List` holds the sub-group entries of a multi-line record (e.g. one map
/// per capacitor bank), in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
    Code(String),
    List(Vec<FieldMap>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: integers widen to f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Textual view over both free text and enumerated codes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) | Value::Code(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldMap]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) | Value::Code(v) => serializer.serialize_str(v),
            Value::Flag(v) => serializer.serialize_bool(*v),
            Value::List(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for entry in entries {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
        }
    }
}

/// Field-name → value mapping that preserves insertion (schema) order.
///
/// Record types have at most a few dozen fields, so lookups scan a Vec
/// rather than paying for a hash map and losing ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One decoded fixed-width record.
///
/// Immutable once assembled: every field declared by the record type's schema
/// is present (default-filled where the source slice was blank). Corrections
/// go through [`Record::with_field`], which produces a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: String,
    fields: FieldMap,
}

impl Record {
    pub fn new(record_type: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            record_type: record_type.into(),
            fields,
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn list(&self, name: &str) -> Option<&[FieldMap]> {
        self.get(name).and_then(Value::as_list)
    }

    /// New record with one field replaced.
    pub fn with_field(&self, name: &str, value: Value) -> Record {
        let mut fields = self.fields.clone();
        fields.insert(name, value);
        Record {
            record_type: self.record_type.clone(),
            fields,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut fields = FieldMap::new();
        fields.insert("number", Value::Int(10001));
        fields.insert("voltage", Value::Float(1.05));
        fields.insert("name", Value::Text("BAR-1 GER1".to_string()));
        fields.insert("state", Value::Code("L".to_string()));
        Record::new("DBAR", fields)
    }

    #[test]
    fn field_map_preserves_insertion_order() {
        let record = sample();
        let names: Vec<&str> = record.fields().iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["number", "voltage", "name", "state"]);
    }

    #[test]
    fn typed_accessors() {
        let record = sample();
        assert_eq!(record.int("number"), Some(10001));
        assert_eq!(record.float("voltage"), Some(1.05));
        assert_eq!(record.float("number"), Some(10001.0));
        assert_eq!(record.text("state"), Some("L"));
        assert_eq!(record.int("voltage"), None);
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let record = sample();
        let patched = record.with_field("voltage", Value::Float(0.989));
        assert_eq!(record.float("voltage"), Some(1.05));
        assert_eq!(patched.float("voltage"), Some(0.989));
        assert_eq!(patched.record_type(), "DBAR");
    }

    #[test]
    fn serializes_in_field_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"number":10001,"voltage":1.05,"name":"BAR-1 GER1","state":"L"}"#
        );
    }
}
