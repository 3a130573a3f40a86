//! Axioms and the ontology that owns them.
//!
//! An [`Ontology`] pairs the [`EntityRegistry`] with an [`AxiomStore`]. Every
//! axiom is checked against the registry before it is stored: each class,
//! property and individual it mentions must already be declared with a
//! fitting kind.
//!
//! The store has set semantics (asserting an axiom twice has no further
//! effect). Insertion order is kept for iteration, but callers should not rely
//! on it.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, Iri, vocab};
use crate::error::RegistryError;
use crate::expression::ClassExpression;
use crate::registry::{EntityRegistry, RegistryResult};

// ---------------------------------------------------------------------------
// Annotation values
// ---------------------------------------------------------------------------

/// The object of an annotation assertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// A plain or language-tagged literal.
    Literal { lexical: String, lang: Option<String> },
    /// An IRI reference.
    Iri(Iri),
}

impl AnnotationValue {
    pub fn literal(lexical: impl Into<String>) -> Self {
        AnnotationValue::Literal {
            lexical: lexical.into(),
            lang: None,
        }
    }

    pub fn lang_literal(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        AnnotationValue::Literal {
            lexical: lexical.into(),
            lang: Some(lang.into()),
        }
    }

    /// The value as text: the lexical form of a literal, or the IRI itself.
    pub fn as_text(&self) -> &str {
        match self {
            AnnotationValue::Literal { lexical, .. } => lexical,
            AnnotationValue::Iri(iri) => iri.as_str(),
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Literal {
                lexical,
                lang: Some(lang),
            } => write!(f, "\"{lexical}\"@{lang}"),
            AnnotationValue::Literal { lexical, .. } => write!(f, "\"{lexical}\""),
            AnnotationValue::Iri(iri) => write!(f, "<{iri}>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Axioms
// ---------------------------------------------------------------------------

/// An asserted logical (or annotation) relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axiom {
    SubClassOf {
        sub: ClassExpression,
        sup: ClassExpression,
    },
    EquivalentClasses(Vec<ClassExpression>),
    DisjointClasses(Vec<ClassExpression>),
    ClassAssertion {
        individual: Iri,
        class: ClassExpression,
    },
    /// Object property assertion between two individuals.
    PropertyAssertion {
        subject: Iri,
        property: Iri,
        object: Iri,
    },
    AnnotationAssertion {
        subject: Iri,
        property: Iri,
        value: AnnotationValue,
    },
    SubObjectPropertyOf {
        sub: Iri,
        sup: Iri,
    },
}

impl Axiom {
    pub fn sub_class_of(sub: ClassExpression, sup: ClassExpression) -> Self {
        Axiom::SubClassOf { sub, sup }
    }

    /// Whether the axiom contributes to reasoning (everything except annotations).
    pub fn is_logical(&self) -> bool {
        !matches!(self, Axiom::AnnotationAssertion { .. })
    }

    /// Class expressions the axiom mentions, in position order.
    pub fn class_expressions(&self) -> Vec<&ClassExpression> {
        match self {
            Axiom::SubClassOf { sub, sup } => vec![sub, sup],
            Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => ops.iter().collect(),
            Axiom::ClassAssertion { class, .. } => vec![class],
            _ => Vec::new(),
        }
    }

    /// Every entity the axiom references, with the kind it must have.
    ///
    /// Class positions report [`EntityKind::Class`]; `owl:Thing` is included
    /// and accepted by [`EntityRegistry`] lookups as the top class.
    pub fn signature(&self) -> BTreeSet<(Iri, EntityKind)> {
        let mut out = BTreeSet::new();
        for expr in self.class_expressions() {
            out.extend(expr.classes().into_iter().map(|c| (c, EntityKind::Class)));
            out.extend(
                expr.properties()
                    .into_iter()
                    .map(|p| (p, EntityKind::ObjectProperty)),
            );
        }
        match self {
            Axiom::ClassAssertion { individual, .. } => {
                out.insert((individual.clone(), EntityKind::Individual));
            }
            Axiom::PropertyAssertion {
                subject,
                property,
                object,
            } => {
                out.insert((subject.clone(), EntityKind::Individual));
                out.insert((property.clone(), EntityKind::ObjectProperty));
                out.insert((object.clone(), EntityKind::Individual));
            }
            Axiom::AnnotationAssertion { property, .. } => {
                if !is_builtin_annotation(property) {
                    out.insert((property.clone(), EntityKind::AnnotationProperty));
                }
            }
            Axiom::SubObjectPropertyOf { sub, sup } => {
                out.insert((sub.clone(), EntityKind::ObjectProperty));
                out.insert((sup.clone(), EntityKind::ObjectProperty));
            }
            _ => {}
        }
        out
    }

    /// Render with entity names produced by `name`.
    pub fn render(&self, name: &impl Fn(&Iri) -> String) -> String {
        let list = |ops: &[ClassExpression]| {
            ops.iter()
                .map(|op| op.render(name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Axiom::SubClassOf { sub, sup } => {
                format!("SubClassOf({}, {})", sub.render(name), sup.render(name))
            }
            Axiom::EquivalentClasses(ops) => format!("EquivalentClasses({})", list(ops)),
            Axiom::DisjointClasses(ops) => format!("DisjointClasses({})", list(ops)),
            Axiom::ClassAssertion { individual, class } => {
                format!("ClassAssertion({}, {})", class.render(name), name(individual))
            }
            Axiom::PropertyAssertion {
                subject,
                property,
                object,
            } => format!(
                "ObjectPropertyAssertion({}, {}, {})",
                name(property),
                name(subject),
                name(object)
            ),
            Axiom::AnnotationAssertion {
                subject,
                property,
                value,
            } => format!("AnnotationAssertion({}, {}, {value})", name(property), name(subject)),
            Axiom::SubObjectPropertyOf { sub, sup } => {
                format!("SubObjectPropertyOf({}, {})", name(sub), name(sup))
            }
        }
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&|iri: &Iri| iri.short_form().to_string()))
    }
}

/// The RDFS annotation properties usable without declaration.
pub fn is_builtin_annotation(property: &Iri) -> bool {
    matches!(
        property.as_str(),
        vocab::RDFS_LABEL | vocab::RDFS_COMMENT | vocab::RDFS_SEE_ALSO | vocab::RDFS_IS_DEFINED_BY
    )
}

// ---------------------------------------------------------------------------
// Axiom store
// ---------------------------------------------------------------------------

/// Insertion-ordered axiom set.
#[derive(Debug, Clone, Default)]
pub struct AxiomStore {
    ordered: Vec<Axiom>,
    seen: HashSet<Axiom>,
}

impl AxiomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an axiom. Returns `false` if it was already present.
    pub fn insert(&mut self, axiom: Axiom) -> bool {
        if self.seen.contains(&axiom) {
            return false;
        }
        self.seen.insert(axiom.clone());
        self.ordered.push(axiom);
        true
    }

    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.seen.contains(axiom)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Axiom> {
        self.ordered.iter()
    }

    /// Logical axioms only.
    pub fn logical(&self) -> impl Iterator<Item = &Axiom> + '_ {
        self.ordered.iter().filter(|a| a.is_logical())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<'a> IntoIterator for &'a AxiomStore {
    type Item = &'a Axiom;
    type IntoIter = std::slice::Iter<'a, Axiom>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Ontology
// ---------------------------------------------------------------------------

/// Entities plus the axioms over them.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    iri: Option<Iri>,
    registry: EntityRegistry,
    axioms: AxiomStore,
}

impl Ontology {
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            iri: None,
            registry: EntityRegistry::new(default_namespace),
            axioms: AxiomStore::new(),
        }
    }

    pub fn with_iri(mut self, iri: Option<Iri>) -> Self {
        self.iri = iri;
        self
    }

    /// The ontology document IRI, if any.
    pub fn iri(&self) -> Option<&Iri> {
        self.iri.as_ref()
    }

    pub fn set_iri(&mut self, iri: Option<Iri>) {
        self.iri = iri;
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn axioms(&self) -> &AxiomStore {
        &self.axioms
    }

    /// Check that every entity the axiom references is declared with a
    /// fitting kind.
    pub fn check_axiom(&self, axiom: &Axiom) -> RegistryResult<()> {
        for (iri, expected) in axiom.signature() {
            check_reference(&self.registry, &iri, expected)?;
        }
        if let Axiom::AnnotationAssertion { subject, .. } = axiom {
            if !self.registry.contains(subject) {
                return Err(RegistryError::UnknownEntity {
                    name: subject.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Add an axiom after checking its signature. Returns `false` if it was
    /// already present.
    pub fn add_axiom(&mut self, axiom: Axiom) -> RegistryResult<bool> {
        self.check_axiom(&axiom)?;
        Ok(self.axioms.insert(axiom))
    }

    /// Add several axioms atomically: either all are checked and stored, or
    /// none. Returns how many were new.
    pub fn add_axioms(&mut self, axioms: Vec<Axiom>) -> RegistryResult<usize> {
        for axiom in &axioms {
            self.check_axiom(axiom)?;
        }
        Ok(axioms
            .into_iter()
            .filter(|axiom| self.axioms.insert(axiom.clone()))
            .count())
    }

    /// All annotation values of `property` on `subject`.
    pub fn annotation_values<'a>(
        &'a self,
        subject: &'a Iri,
        property: &'a Iri,
    ) -> impl Iterator<Item = &'a AnnotationValue> + 'a {
        self.axioms.iter().filter_map(move |axiom| match axiom {
            Axiom::AnnotationAssertion {
                subject: s,
                property: p,
                value,
            } if s == subject && p == property => Some(value),
            _ => None,
        })
    }
}

fn check_reference(registry: &EntityRegistry, iri: &Iri, expected: EntityKind) -> RegistryResult<()> {
    let Some(entity) = registry.get(iri) else {
        return Err(RegistryError::UnknownEntity {
            name: iri.to_string(),
        });
    };
    if entity.kind.compatible_with(expected) {
        Ok(())
    } else {
        Err(RegistryError::IdentityConflict {
            iri: iri.to_string(),
            existing: entity.kind,
            requested: expected,
        })
    }
}
