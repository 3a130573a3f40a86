//! Profile checking: does an ontology stay within a tractable fragment?

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axiom::{Axiom, Ontology};
use crate::expression::ClassExpression;

/// Supported profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    /// OWL 2 EL.
    El,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::El => f.write_str("OWL 2 EL"),
        }
    }
}

/// One axiom using a construct the profile does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileViolation {
    /// The offending axiom, rendered with short names.
    pub axiom: String,
    /// The disallowed construct (e.g. `ObjectUnionOf`).
    pub construct: String,
}

impl fmt::Display for ProfileViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "use of {} in {}", self.construct, self.axiom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub kind: ProfileKind,
    pub violations: Vec<ProfileViolation>,
}

impl ProfileReport {
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks an ontology against a profile. Never mutates anything.
pub trait ProfileChecker: Send + Sync {
    fn check(&self, ontology: &Ontology, kind: ProfileKind) -> ProfileReport;
}

/// Structural OWL 2 EL checker.
///
/// EL allows named classes, `owl:Thing`, existential restrictions and
/// intersections in every class position; universal restrictions, unions
/// and complements are violations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElProfileChecker;

impl ProfileChecker for ElProfileChecker {
    fn check(&self, ontology: &Ontology, kind: ProfileKind) -> ProfileReport {
        let ProfileKind::El = kind;
        let violations = ontology
            .axioms()
            .logical()
            .flat_map(axiom_violations)
            .collect::<Vec<_>>();
        tracing::debug!(profile = %kind, violations = violations.len(), "checked profile");
        ProfileReport { kind, violations }
    }
}

fn axiom_violations(axiom: &Axiom) -> Vec<ProfileViolation> {
    let mut constructs = Vec::new();
    for expr in axiom.class_expressions() {
        expr.walk(&mut |node| {
            let construct = match node {
                ClassExpression::ForAll { .. } => "ObjectAllValuesFrom",
                ClassExpression::Or(_) => "ObjectUnionOf",
                ClassExpression::Not(_) => "ObjectComplementOf",
                _ => return,
            };
            if !constructs.contains(&construct) {
                constructs.push(construct);
            }
        });
    }
    let rendered = axiom.to_string();
    constructs
        .into_iter()
        .map(|construct| ProfileViolation {
            axiom: rendered.clone(),
            construct: construct.to_string(),
        })
        .collect()
}
