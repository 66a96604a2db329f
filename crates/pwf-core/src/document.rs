//! The parsed network document.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::record::Record;

/// Ordered collection of all parsed records across record types.
///
/// Sections appear in the order they were first populated; records within a
/// section keep the order they appeared in the source text (or the order the
/// caller appended them, for synthesized documents). Downstream consumers may
/// rely on both, e.g. a bus's defining record preceding records that
/// reference it. The document does not enforce cross-record referential
/// integrity; that belongs to a downstream validation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkDocument {
    sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
struct Section {
    record_type: String,
    records: Vec<Record>,
}

impl NetworkDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its record type's section, creating the section at
    /// the end of the document if this is the first record of that type.
    pub fn push(&mut self, record: Record) {
        match self
            .sections
            .iter_mut()
            .find(|s| s.record_type == record.record_type())
        {
            Some(section) => section.records.push(record),
            None => self.sections.push(Section {
                record_type: record.record_type().to_string(),
                records: vec![record],
            }),
        }
    }

    /// Records of one type, in source order. Empty slice for unknown types.
    pub fn records(&self, record_type: &str) -> &[Record] {
        self.sections
            .iter()
            .find(|s| s.record_type == record_type)
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    /// Section tags in first-populated order.
    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.record_type.as_str())
    }

    /// `(record_type, records)` pairs in first-populated order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.sections
            .iter()
            .map(|s| (s.record_type.as_str(), s.records.as_slice()))
    }

    /// Total record count across all sections.
    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.records.is_empty())
    }
}

impl Serialize for NetworkDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.record_type, &section.records)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldMap, Value};

    fn record(record_type: &str, number: i64) -> Record {
        let mut fields = FieldMap::new();
        fields.insert("number", Value::Int(number));
        Record::new(record_type, fields)
    }

    #[test]
    fn sections_keep_first_populated_order() {
        let mut doc = NetworkDocument::new();
        doc.push(record("DBAR", 1));
        doc.push(record("DLIN", 10));
        doc.push(record("DBAR", 2));

        let order: Vec<&str> = doc.record_types().collect();
        assert_eq!(order, vec!["DBAR", "DLIN"]);
        assert_eq!(doc.records("DBAR").len(), 2);
        assert_eq!(doc.records("DBAR")[1].int("number"), Some(2));
        assert_eq!(doc.record_count(), 3);
    }

    #[test]
    fn unknown_type_yields_empty_slice() {
        let doc = NetworkDocument::new();
        assert!(doc.records("DGER").is_empty());
        assert!(doc.is_empty());
    }

    #[test]
    fn serializes_sections_in_order() {
        let mut doc = NetworkDocument::new();
        doc.push(record("DBAR", 1));
        doc.push(record("DLIN", 7));
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"DBAR":[{"number":1}],"DLIN":[{"number":7}]}"#);
    }
}
