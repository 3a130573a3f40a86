//! Class expressions: named classes and compound descriptions over them.
//!
//! A [`ClassExpression`] is either a named class or a compound node built from
//! existential / universal restrictions, intersection, union and complement.
//! Expressions are compared structurally: two textually different but
//! semantically equivalent expressions are distinct values.
//!
//! - [`lexer`]: whitespace tokenization with quoted literals and parentheses
//! - [`parser`]: recursive-descent parser with pluggable leaf resolution
//! - [`resolve`]: name-based and label-based leaf resolvers

pub mod lexer;
pub mod parser;
pub mod resolve;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Iri;

pub use parser::{LeafResolver, parse};
pub use resolve::{LabelResolver, NameResolver};

/// A named or compound description of a set of individuals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassExpression {
    /// A named class (including `owl:Thing`).
    Named(Iri),
    /// `property some filler`
    Exists {
        property: Iri,
        filler: Box<ClassExpression>,
    },
    /// `property only filler`
    ForAll {
        property: Iri,
        filler: Box<ClassExpression>,
    },
    /// `a and b and ...`
    And(Vec<ClassExpression>),
    /// `a or b or ...`
    Or(Vec<ClassExpression>),
    /// `not a`
    Not(Box<ClassExpression>),
}

impl ClassExpression {
    pub fn named(iri: impl Into<Iri>) -> Self {
        ClassExpression::Named(iri.into())
    }

    pub fn exists(property: impl Into<Iri>, filler: ClassExpression) -> Self {
        ClassExpression::Exists {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    pub fn for_all(property: impl Into<Iri>, filler: ClassExpression) -> Self {
        ClassExpression::ForAll {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    /// Build an intersection; a single operand collapses to itself.
    pub fn and(mut operands: Vec<ClassExpression>) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            ClassExpression::And(operands)
        }
    }

    /// Build a union; a single operand collapses to itself.
    pub fn or(mut operands: Vec<ClassExpression>) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            ClassExpression::Or(operands)
        }
    }

    pub fn not(operand: ClassExpression) -> Self {
        ClassExpression::Not(Box::new(operand))
    }

    pub fn thing() -> Self {
        ClassExpression::Named(Iri::thing())
    }

    pub fn as_named(&self) -> Option<&Iri> {
        match self {
            ClassExpression::Named(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, ClassExpression::Named(_))
    }

    /// Named classes referenced anywhere in the expression.
    pub fn classes(&self) -> BTreeSet<Iri> {
        let mut out = BTreeSet::new();
        self.walk(&mut |node| {
            if let ClassExpression::Named(iri) = node {
                out.insert(iri.clone());
            }
        });
        out
    }

    /// Properties referenced anywhere in the expression.
    pub fn properties(&self) -> BTreeSet<Iri> {
        let mut out = BTreeSet::new();
        self.walk(&mut |node| match node {
            ClassExpression::Exists { property, .. } | ClassExpression::ForAll { property, .. } => {
                out.insert(property.clone());
            }
            _ => {}
        });
        out
    }

    /// Whether the expression only uses EL constructors (named, `some`, `and`).
    pub fn is_el(&self) -> bool {
        match self {
            ClassExpression::Named(_) => true,
            ClassExpression::Exists { filler, .. } => filler.is_el(),
            ClassExpression::And(ops) => ops.iter().all(ClassExpression::is_el),
            ClassExpression::ForAll { .. } | ClassExpression::Or(_) | ClassExpression::Not(_) => {
                false
            }
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ClassExpression)) {
        visit(self);
        match self {
            ClassExpression::Named(_) => {}
            ClassExpression::Exists { filler, .. } | ClassExpression::ForAll { filler, .. } => {
                filler.walk(visit)
            }
            ClassExpression::And(ops) | ClassExpression::Or(ops) => {
                for op in ops {
                    op.walk(visit);
                }
            }
            ClassExpression::Not(op) => op.walk(visit),
        }
    }

    /// Render in Manchester-like syntax, naming entities with `name`.
    pub fn render(&self, name: &impl Fn(&Iri) -> String) -> String {
        match self {
            ClassExpression::Named(iri) => name(iri),
            ClassExpression::Exists { property, filler } => {
                format!("{} some {}", name(property), filler.render_operand(name))
            }
            ClassExpression::ForAll { property, filler } => {
                format!("{} only {}", name(property), filler.render_operand(name))
            }
            ClassExpression::And(ops) => join(ops, " and ", name),
            ClassExpression::Or(ops) => join(ops, " or ", name),
            ClassExpression::Not(op) => format!("not {}", op.render_operand(name)),
        }
    }

    fn render_operand(&self, name: &impl Fn(&Iri) -> String) -> String {
        match self {
            ClassExpression::Named(_) => self.render(name),
            _ => format!("({})", self.render(name)),
        }
    }
}

fn join(ops: &[ClassExpression], sep: &str, name: &impl Fn(&Iri) -> String) -> String {
    ops.iter()
        .map(|op| op.render_operand(name))
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&|iri: &Iri| iri.short_form().to_string()))
    }
}

impl From<Iri> for ClassExpression {
    fn from(iri: Iri) -> Self {
        ClassExpression::Named(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/{s}"))
    }

    #[test]
    fn display_uses_short_names_and_parens() {
        let expr = ClassExpression::and(vec![
            ClassExpression::named(iri("A")),
            ClassExpression::exists(iri("part-of"), ClassExpression::named(iri("B"))),
        ]);
        assert_eq!(expr.to_string(), "A and (part-of some B)");
    }

    #[test]
    fn singleton_and_collapses() {
        let expr = ClassExpression::and(vec![ClassExpression::named(iri("A"))]);
        assert!(expr.is_named());
    }

    #[test]
    fn signature_collects_classes_and_properties() {
        let expr = ClassExpression::or(vec![
            ClassExpression::exists(iri("r"), ClassExpression::named(iri("A"))),
            ClassExpression::not(ClassExpression::for_all(
                iri("s"),
                ClassExpression::named(iri("B")),
            )),
        ]);
        let classes: Vec<_> = expr.classes().into_iter().collect();
        assert_eq!(classes, vec![iri("A"), iri("B")]);
        assert_eq!(expr.properties().len(), 2);
    }

    #[test]
    fn el_detection() {
        let el = ClassExpression::exists(iri("r"), ClassExpression::named(iri("A")));
        assert!(el.is_el());
        let not_el = ClassExpression::for_all(iri("r"), ClassExpression::named(iri("A")));
        assert!(!not_el.is_el());
        assert!(!ClassExpression::or(vec![el.clone(), el]).is_el());
    }

    #[test]
    fn structural_equality() {
        let a = ClassExpression::exists(iri("r"), ClassExpression::named(iri("A")));
        let b = ClassExpression::exists(iri("r"), ClassExpression::named(iri("A")));
        assert_eq!(a, b);
        let c = ClassExpression::and(vec![a.clone(), ClassExpression::named(iri("B"))]);
        let d = ClassExpression::and(vec![ClassExpression::named(iri("B")), a]);
        assert_ne!(c, d);
    }
}
