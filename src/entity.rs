//! Core entity types for the knowledge base.
//!
//! Entities are the atomic units of an ontology. Every class, property and
//! individual is identified by an [`Iri`] and tagged with an [`EntityKind`].
//! The top class (`owl:Thing`) is a constant entity that exists in every
//! registry without being declared.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known vocabulary IRIs.
pub mod vocab {
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const RDFS_SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
    pub const RDFS_IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";
}

/// An absolute identifier for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Wrap a string as an IRI. Surrounding angle brackets are stripped.
    pub fn new(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        match iri.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            Some(inner) => Iri(inner.to_string()),
            None => Iri(iri),
        }
    }

    /// The IRI of `owl:Thing`.
    pub fn thing() -> Self {
        Iri(vocab::OWL_THING.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text looks like an absolute IRI rather than a short name.
    pub fn looks_absolute(text: &str) -> bool {
        (text.starts_with('<') && text.ends_with('>'))
            || text.contains("://")
            || text.starts_with("urn:")
    }

    /// Whether this IRI is syntactically usable (non-empty, no whitespace or brackets).
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || c == '<' || c == '>')
    }

    /// The fragment after the last `#` or `/`, or the whole IRI if neither occurs
    /// (or the IRI ends with one of them).
    pub fn short_form(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(pos) if pos + 1 < self.0.len() => &self.0[pos + 1..],
            _ => &self.0,
        }
    }

    /// Everything up to and including the last `#` or `/`.
    pub fn namespace(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(pos) => &self.0[..=pos],
            None => "",
        }
    }

    pub fn is_thing(&self) -> bool {
        self.0 == vocab::OWL_THING
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Iri::new(s)
    }
}

/// Classification of an entity in the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    Individual,
    /// `owl:Thing`, always present.
    TopClass,
}

impl EntityKind {
    /// Whether entities of this kind can stand where a class is expected.
    pub fn is_class(self) -> bool {
        matches!(self, EntityKind::Class | EntityKind::TopClass)
    }

    pub fn is_property(self) -> bool {
        matches!(
            self,
            EntityKind::ObjectProperty | EntityKind::DataProperty | EntityKind::AnnotationProperty
        )
    }

    /// Two kinds are compatible when a redeclaration is a no-op merge.
    pub fn compatible_with(self, other: EntityKind) -> bool {
        self == other || (self.is_class() && other.is_class())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Class => "Class",
            EntityKind::ObjectProperty => "ObjectProperty",
            EntityKind::DataProperty => "DataProperty",
            EntityKind::AnnotationProperty => "AnnotationProperty",
            EntityKind::Individual => "Individual",
            EntityKind::TopClass => "TopClass",
        };
        f.write_str(name)
    }
}

/// A uniquely identified class, property or individual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub iri: Iri,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(iri: Iri, kind: EntityKind) -> Self {
        Self { iri, kind }
    }

    /// The implicit top class.
    pub fn thing() -> Self {
        Self {
            iri: Iri::thing(),
            kind: EntityKind::TopClass,
        }
    }

    pub fn short_name(&self) -> &str {
        self.iri.short_form()
    }

    pub fn is_thing(&self) -> bool {
        self.kind == EntityKind::TopClass
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_after_hash_or_slash() {
        assert_eq!(Iri::new("http://example.org/Lion").short_form(), "Lion");
        assert_eq!(Iri::new("http://example.org/onto#part-of").short_form(), "part-of");
        assert_eq!(Iri::thing().short_form(), "Thing");
        assert_eq!(Iri::new("http://example.org/").short_form(), "http://example.org/");
    }

    #[test]
    fn namespace_keeps_separator() {
        assert_eq!(Iri::new("http://example.org/onto#A").namespace(), "http://example.org/onto#");
        assert_eq!(Iri::new("urn-without-separator").namespace(), "");
    }

    #[test]
    fn angle_brackets_are_stripped() {
        let iri = Iri::new("<http://example.org/A>");
        assert_eq!(iri.as_str(), "http://example.org/A");
        assert!(Iri::looks_absolute("<http://example.org/A>"));
        assert!(Iri::looks_absolute("urn:x:y"));
        assert!(!Iri::looks_absolute("part-of"));
    }

    #[test]
    fn validity_rejects_whitespace() {
        assert!(Iri::new("http://example.org/A").is_valid());
        assert!(!Iri::new("http://example.org/a b").is_valid());
        assert!(!Iri::new("").is_valid());
    }

    #[test]
    fn class_kinds_are_compatible() {
        assert!(EntityKind::Class.compatible_with(EntityKind::TopClass));
        assert!(EntityKind::Individual.compatible_with(EntityKind::Individual));
        assert!(!EntityKind::Class.compatible_with(EntityKind::ObjectProperty));
    }

    #[test]
    fn entity_display() {
        let e = Entity::new(Iri::new("http://example.org/A"), EntityKind::Class);
        assert_eq!(e.to_string(), "Class(http://example.org/A)");
        assert!(Entity::thing().is_thing());
    }
}
