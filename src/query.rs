//! Query targets and set extraction over a classification.
//!
//! A query argument is resolved once, at the query boundary, into a
//! [`QueryTarget`]: a known named class or an anonymous class expression.
//! After reasoning it becomes a [`Placement`], from which every query shape
//! (sub, super, equivalent, instances; direct or transitive) is read without
//! branching on the argument's textual form again.

use std::collections::BTreeSet;

use crate::entity::{Entity, Iri};
use crate::expression::ClassExpression;
use crate::reasoner::{Classification, ExpressionNode};
use crate::registry::EntityRegistry;

/// A resolved query argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// A declared class (or `owl:Thing`).
    Named(Entity),
    /// A compound class expression; never declared.
    Anonymous(ClassExpression),
}

impl QueryTarget {
    /// Wrap a parsed expression, turning a bare named class into `Named`.
    pub fn from_expression(expression: ClassExpression, registry: &EntityRegistry) -> Self {
        if let ClassExpression::Named(iri) = &expression {
            if let Some(entity) = registry.get(iri) {
                return QueryTarget::Named(entity);
            }
        }
        QueryTarget::Anonymous(expression)
    }

    pub fn named_iri(&self) -> Option<&Iri> {
        match self {
            QueryTarget::Named(entity) => Some(&entity.iri),
            QueryTarget::Anonymous(_) => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, QueryTarget::Named(_))
    }
}

/// A target placed in the classification.
#[derive(Debug, Clone)]
pub enum Placement {
    Named(Iri),
    Anonymous(ExpressionNode),
}

impl Placement {
    /// Strict subclasses: direct children or the transitive closure.
    pub fn sub_classes(&self, classification: &Classification, direct: bool) -> BTreeSet<Iri> {
        match self {
            Placement::Named(iri) => classification.sub_classes(iri, direct),
            Placement::Anonymous(node) if direct => classification.most_general(&node.subs),
            Placement::Anonymous(node) => node.subs.clone(),
        }
    }

    /// Strict superclasses, `owl:Thing` included.
    pub fn super_classes(&self, classification: &Classification, direct: bool) -> BTreeSet<Iri> {
        match self {
            Placement::Named(iri) => classification.super_classes(iri, direct),
            Placement::Anonymous(node) if direct => classification.most_specific(&node.supers),
            Placement::Anonymous(node) => node.supers.clone(),
        }
    }

    /// Equivalent named classes, excluding the target itself.
    pub fn equivalent_classes(&self, classification: &Classification) -> BTreeSet<Iri> {
        match self {
            Placement::Named(iri) => classification.equivalents(iri),
            Placement::Anonymous(node) => node.equivalents.clone(),
        }
    }

    /// Individuals of the target. With `direct`, those not belonging to any
    /// strict subclass of it.
    pub fn instances(&self, classification: &Classification, direct: bool) -> BTreeSet<Iri> {
        match self {
            Placement::Named(iri) => classification.instances(iri, direct),
            Placement::Anonymous(node) if direct => node
                .instances
                .iter()
                .filter(|individual| {
                    classification.types(individual).is_none_or(|types| {
                        node.subs.iter().all(|sub| !types.all.contains(sub))
                    })
                })
                .cloned()
                .collect(),
            Placement::Anonymous(node) => node.instances.clone(),
        }
    }
}

/// Short names of a set of IRIs.
pub fn short_names(iris: &BTreeSet<Iri>) -> BTreeSet<String> {
    iris.iter().map(|iri| iri.short_form().to_string()).collect()
}
