//! Raw line classification.
//!
//! The classifier decides what one line of input *is* (comment, section
//! terminator, record start, continuation data, end-of-case) without
//! decoding anything. Record-type markers are matched by exact-prefix
//! comparison, longest registered marker first, so a short marker can never
//! shadow a longer one sharing its prefix.

use pwf_core::{RecordSchema, SchemaRegistry};

/// What a raw input line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// Line starting with the format's comment prefix
    Comment,
    /// Section-end sentinel (e.g. `99999`)
    Terminator,
    /// End-of-case sentinel (e.g. `FIM`); everything after it is ignored
    EndOfCase,
    /// Line opening a section of a registered record type
    RecordStart(&'a RecordSchema),
    /// Line opening a recognized-but-unsupported section (skipped, warned)
    UnsupportedSection(&'a str),
    /// Data line belonging to the currently open section
    Continuation,
    /// Line matching nothing while no section is open (skipped, warned)
    Unrecognized,
}

/// Stateless classifier over a registry's markers and sentinels.
pub struct LineClassifier<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> LineClassifier<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Classify one line. `in_section` tells the classifier whether a record
    /// type's section is currently open: unmatched data lines are
    /// continuations of it, or unrecognized strays otherwise.
    pub fn classify(&self, line: &str, in_section: bool) -> Classification<'a> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Classification::Blank;
        }
        if trimmed.starts_with(self.registry.comment_prefix()) {
            return Classification::Comment;
        }
        if trimmed == self.registry.terminator() {
            return Classification::Terminator;
        }
        if trimmed == self.registry.end_marker() {
            return Classification::EndOfCase;
        }
        if let Some(schema) = self.registry.match_marker(trimmed) {
            return Classification::RecordStart(schema);
        }
        if let Some(marker) = self.registry.match_acknowledged(trimmed) {
            return Classification::UnsupportedSection(marker);
        }
        if in_section {
            Classification::Continuation
        } else {
            Classification::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwf_core::{FieldSpec, RecordSchema, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        let mut reg = SchemaRegistry::new("(", "99999", "FIM");
        reg.register(RecordSchema::new(
            "DBAR",
            vec![FieldSpec::integer("number", 1, 5, 0)],
        ))
        .unwrap();
        reg.register(RecordSchema::new(
            "DC",
            vec![FieldSpec::integer("number", 1, 5, 0)],
        ))
        .unwrap();
        reg.register(RecordSchema::new(
            "DCAR",
            vec![FieldSpec::integer("number", 1, 5, 0)],
        ))
        .unwrap();
        reg.acknowledge("DOPC").unwrap();
        reg
    }

    #[test]
    fn classifies_sentinels() {
        let reg = registry();
        let classifier = LineClassifier::new(&reg);
        assert_eq!(classifier.classify("", false), Classification::Blank);
        assert_eq!(classifier.classify("   ", false), Classification::Blank);
        assert_eq!(
            classifier.classify("(comment line", false),
            Classification::Comment
        );
        assert_eq!(
            classifier.classify(" 99999 ", false),
            Classification::Terminator
        );
        assert_eq!(classifier.classify("FIM", false), Classification::EndOfCase);
    }

    #[test]
    fn longest_marker_wins() {
        let reg = registry();
        let classifier = LineClassifier::new(&reg);
        match classifier.classify("DCAR", false) {
            Classification::RecordStart(schema) => assert_eq!(schema.marker, "DCAR"),
            other => panic!("expected record start, got {other:?}"),
        }
        match classifier.classify("DC", false) {
            Classification::RecordStart(schema) => assert_eq!(schema.marker, "DC"),
            other => panic!("expected record start, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_sections_are_identified_with_arguments() {
        let reg = registry();
        let classifier = LineClassifier::new(&reg);
        assert_eq!(
            classifier.classify("DOPC IMPR", false),
            Classification::UnsupportedSection("DOPC")
        );
    }

    #[test]
    fn data_lines_depend_on_section_state() {
        let reg = registry();
        let classifier = LineClassifier::new(&reg);
        let data = "    1  2 A BAR-1 GER1  A1000";
        assert_eq!(classifier.classify(data, true), Classification::Continuation);
        assert_eq!(
            classifier.classify(data, false),
            Classification::Unrecognized
        );
    }
}
