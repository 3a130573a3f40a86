//! Label index: human-readable annotation → entity IRIs.
//!
//! Derived from label annotation assertions. An entity may carry several
//! labels and a label may be shared by several entities; lookups return every
//! match, never an arbitrary pick. Labels are matched exactly (after trimming
//! surrounding whitespace).

use std::collections::{BTreeSet, HashMap};

use crate::axiom::{AnnotationValue, Axiom};
use crate::entity::Iri;

/// Bidirectional label ↔ entity mapping.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    by_label: HashMap<String, BTreeSet<Iri>>,
    by_entity: HashMap<Iri, BTreeSet<String>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from every `label_property` annotation in `axioms`.
    pub fn rebuild<'a>(axioms: impl IntoIterator<Item = &'a Axiom>, label_property: &Iri) -> Self {
        let mut index = Self::new();
        for axiom in axioms {
            index.observe(axiom, label_property);
        }
        index
    }

    /// Index `axiom` if it is a label annotation.
    pub fn observe(&mut self, axiom: &Axiom, label_property: &Iri) {
        if let Axiom::AnnotationAssertion {
            subject,
            property,
            value: AnnotationValue::Literal { lexical, .. },
        } = axiom
        {
            if property == label_property {
                self.insert(subject.clone(), lexical);
            }
        }
    }

    pub fn insert(&mut self, iri: Iri, label: &str) {
        let label = label.trim().to_string();
        self.by_entity
            .entry(iri.clone())
            .or_default()
            .insert(label.clone());
        self.by_label.entry(label).or_default().insert(iri);
    }

    /// All entities carrying `label`, sorted by IRI.
    pub fn lookup(&self, label: &str) -> Vec<Iri> {
        self.by_label
            .get(label.trim())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The entity with the smallest IRI among those carrying `label`.
    pub fn first(&self, label: &str) -> Option<&Iri> {
        self.by_label.get(label.trim())?.iter().next()
    }

    /// Labels attached to `iri`, sorted.
    pub fn labels_of(&self, iri: &Iri) -> Vec<&str> {
        self.by_entity
            .get(iri)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::vocab;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/{s}"))
    }

    #[test]
    fn shared_label_returns_all_matches() {
        let mut index = LabelIndex::new();
        index.insert(iri("ID01"), "animal");
        index.insert(iri("ID02"), "animal");
        index.insert(iri("ID02"), "beast");

        assert_eq!(index.lookup("animal"), vec![iri("ID01"), iri("ID02")]);
        assert_eq!(index.first("animal"), Some(&iri("ID01")));
        assert_eq!(index.labels_of(&iri("ID02")), vec!["animal", "beast"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn missing_label() {
        let index = LabelIndex::new();
        assert!(index.lookup("ID011").is_empty());
        assert!(index.first("ID011").is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn rebuild_only_uses_label_property() {
        let label = Iri::new(vocab::RDFS_LABEL);
        let axioms = vec![
            Axiom::AnnotationAssertion {
                subject: iri("A"),
                property: label.clone(),
                value: AnnotationValue::literal("pouet"),
            },
            Axiom::AnnotationAssertion {
                subject: iri("A"),
                property: Iri::new(vocab::RDFS_COMMENT),
                value: AnnotationValue::literal("a comment"),
            },
        ];
        let index = LabelIndex::rebuild(&axioms, &label);
        assert_eq!(index.lookup("pouet"), vec![iri("A")]);
        assert!(index.lookup("a comment").is_empty());
    }

    #[test]
    fn lookup_trims_whitespace() {
        let mut index = LabelIndex::new();
        index.insert(iri("A"), " pouet pouet ");
        assert_eq!(index.lookup("pouet pouet"), vec![iri("A")]);
    }
}
