//! Leaf resolvers: names through the registry, labels through the label index.

use super::ClassExpression;
use super::lexer::{Token, tokenize};
use super::parser::{ExpressionResult, LeafResolver};
use crate::config::AmbiguityPolicy;
use crate::entity::{EntityKind, Iri};
use crate::error::{ExpressionError, LabelError};
use crate::label::LabelIndex;
use crate::registry::EntityRegistry;

/// Resolves leaves as entity names (full IRI, `prefix:local` or bare name).
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> NameResolver<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }
}

impl LeafResolver for NameResolver<'_> {
    fn resolve_class(&self, token: &Token, input: &str) -> ExpressionResult<ClassExpression> {
        let entity = self
            .registry
            .lookup(&token.text)
            .ok_or_else(|| unresolved(token, input))?;
        if !entity.kind.is_class() {
            return Err(wrong_kind(token, "class", entity.kind, input));
        }
        Ok(ClassExpression::Named(entity.iri))
    }

    fn resolve_property(&self, token: &Token, input: &str) -> ExpressionResult<Iri> {
        let entity = self
            .registry
            .lookup(&token.text)
            .ok_or_else(|| unresolved(token, input))?;
        if entity.kind != EntityKind::ObjectProperty {
            return Err(wrong_kind(token, "object property", entity.kind, input));
        }
        Ok(entity.iri)
    }
}

/// Resolves leaves as labels.
///
/// In class position a label shared by several classes is handled by the
/// [`AmbiguityPolicy`]. In property position ambiguity is always an error, and
/// a token that is no property label falls back to name lookup (so
/// `part-of some animal` works when only `animal` is a label).
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'a> {
    registry: &'a EntityRegistry,
    labels: &'a LabelIndex,
    policy: AmbiguityPolicy,
}

impl<'a> LabelResolver<'a> {
    pub fn new(registry: &'a EntityRegistry, labels: &'a LabelIndex, policy: AmbiguityPolicy) -> Self {
        Self {
            registry,
            labels,
            policy,
        }
    }

    /// The classes sharing a label, when `input` is that label alone and the
    /// policy unions ambiguous matches. `None` otherwise.
    pub fn shared_label(&self, input: &str) -> Option<Vec<Iri>> {
        if self.policy != AmbiguityPolicy::Union {
            return None;
        }
        let tokens = tokenize(input).ok()?;
        let [token] = tokens.as_slice() else {
            return None;
        };
        if !token.is_reference() {
            return None;
        }
        let (classes, _) = self.matches(&token.text, EntityKind::is_class);
        (classes.len() > 1).then_some(classes)
    }

    /// Label matches of `kind`-compatible entities, plus the kind of the first
    /// match that was filtered out.
    fn matches(&self, label: &str, keep: impl Fn(EntityKind) -> bool) -> (Vec<Iri>, Option<EntityKind>) {
        let mut kept = Vec::new();
        let mut rejected = None;
        for iri in self.labels.lookup(label) {
            match self.registry.get(&iri) {
                Some(entity) if keep(entity.kind) => kept.push(iri),
                Some(entity) => {
                    rejected.get_or_insert(entity.kind);
                }
                None => {}
            }
        }
        (kept, rejected)
    }
}

impl LeafResolver for LabelResolver<'_> {
    fn resolve_class(&self, token: &Token, input: &str) -> ExpressionResult<ClassExpression> {
        let (classes, rejected) = self.matches(&token.text, EntityKind::is_class);
        if classes.is_empty() {
            return Err(match rejected {
                Some(kind) => wrong_kind(token, "class", kind, input),
                None => LabelError::NoMatch {
                    label: token.text.clone(),
                }
                .into(),
            });
        }
        if classes.len() == 1 {
            return Ok(ClassExpression::Named(classes[0].clone()));
        }
        match self.policy {
            AmbiguityPolicy::Union => Ok(ClassExpression::or(
                classes.into_iter().map(ClassExpression::Named).collect(),
            )),
            // `lookup` returns matches sorted by IRI.
            AmbiguityPolicy::First => Ok(ClassExpression::Named(classes[0].clone())),
            AmbiguityPolicy::Reject => Err(ambiguous(&token.text, &classes).into()),
        }
    }

    fn resolve_property(&self, token: &Token, input: &str) -> ExpressionResult<Iri> {
        let (properties, _) = self.matches(&token.text, |k| k == EntityKind::ObjectProperty);
        match properties.len() {
            0 => match self.registry.lookup(&token.text) {
                Some(entity) if entity.kind == EntityKind::ObjectProperty => Ok(entity.iri),
                Some(entity) => Err(wrong_kind(token, "object property", entity.kind, input)),
                None => Err(LabelError::NoMatch {
                    label: token.text.clone(),
                }
                .into()),
            },
            1 => Ok(properties[0].clone()),
            _ => Err(ambiguous(&token.text, &properties).into()),
        }
    }
}

fn unresolved(token: &Token, input: &str) -> ExpressionError {
    ExpressionError::Unresolved {
        token: token.text.clone(),
        input: input.to_string(),
    }
}

fn wrong_kind(token: &Token, expected: &str, actual: EntityKind, input: &str) -> ExpressionError {
    ExpressionError::WrongKind {
        token: token.text.clone(),
        expected: expected.to_string(),
        actual,
        input: input.to_string(),
    }
}

fn ambiguous(label: &str, matches: &[Iri]) -> LabelError {
    LabelError::Ambiguous {
        label: label.to_string(),
        count: matches.len(),
        candidates: matches
            .iter()
            .map(|iri| iri.short_form())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse;

    fn setup() -> (EntityRegistry, LabelIndex) {
        let mut reg = EntityRegistry::new("http://localhost/");
        for name in ["Animal", "Beast", "Lion"] {
            reg.declare(Iri::new(format!("http://localhost/{name}")), EntityKind::Class)
                .unwrap();
        }
        reg.declare(Iri::new("http://localhost/part-of"), EntityKind::ObjectProperty)
            .unwrap();
        reg.declare(Iri::new("http://localhost/joe"), EntityKind::Individual)
            .unwrap();

        let mut labels = LabelIndex::new();
        labels.insert(Iri::new("http://localhost/Animal"), "animal");
        labels.insert(Iri::new("http://localhost/Beast"), "animal");
        labels.insert(Iri::new("http://localhost/Lion"), "big cat");
        labels.insert(Iri::new("http://localhost/joe"), "joe");
        (reg, labels)
    }

    fn named(s: &str) -> ClassExpression {
        ClassExpression::named(Iri::new(format!("http://localhost/{s}")))
    }

    #[test]
    fn names_resolve_through_registry() {
        let (reg, _) = setup();
        let expr = parse("part-of some Animal", &NameResolver::new(&reg)).unwrap();
        assert_eq!(
            expr,
            ClassExpression::exists(Iri::new("http://localhost/part-of"), named("Animal"))
        );
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let (reg, _) = setup();
        let err = parse("part-of some C", &NameResolver::new(&reg)).unwrap_err();
        assert!(matches!(err, ExpressionError::Unresolved { ref token, .. } if token == "C"));
    }

    #[test]
    fn property_in_class_position_is_wrong_kind() {
        let (reg, _) = setup();
        let err = parse("Animal and part-of", &NameResolver::new(&reg)).unwrap_err();
        assert!(matches!(err, ExpressionError::WrongKind { .. }));
        let err = parse("Lion some Animal", &NameResolver::new(&reg)).unwrap_err();
        assert!(matches!(err, ExpressionError::WrongKind { .. }));
    }

    #[test]
    fn ambiguous_label_policies() {
        let (reg, labels) = setup();

        let union = parse("animal", &LabelResolver::new(&reg, &labels, AmbiguityPolicy::Union))
            .unwrap();
        assert_eq!(union, ClassExpression::Or(vec![named("Animal"), named("Beast")]));

        let first = parse("animal", &LabelResolver::new(&reg, &labels, AmbiguityPolicy::First))
            .unwrap();
        assert_eq!(first, named("Animal"));

        let err = parse("animal", &LabelResolver::new(&reg, &labels, AmbiguityPolicy::Reject))
            .unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::Label(LabelError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn quoted_multi_word_label() {
        let (reg, labels) = setup();
        let resolver = LabelResolver::new(&reg, &labels, AmbiguityPolicy::Union);
        assert_eq!(parse("'big cat'", &resolver).unwrap(), named("Lion"));
    }

    #[test]
    fn property_falls_back_to_name() {
        let (reg, labels) = setup();
        let resolver = LabelResolver::new(&reg, &labels, AmbiguityPolicy::First);
        let expr = parse("part-of some 'big cat'", &resolver).unwrap();
        assert_eq!(
            expr,
            ClassExpression::exists(Iri::new("http://localhost/part-of"), named("Lion"))
        );
    }

    #[test]
    fn unknown_label_is_no_match() {
        let (reg, labels) = setup();
        let resolver = LabelResolver::new(&reg, &labels, AmbiguityPolicy::Union);
        let err = parse("ID011", &resolver).unwrap_err();
        assert!(matches!(err, ExpressionError::Label(LabelError::NoMatch { .. })));
        // Names are not labels in class position.
        assert!(parse("Lion", &resolver).is_err());
    }

    #[test]
    fn individual_label_in_class_position() {
        let (reg, labels) = setup();
        let resolver = LabelResolver::new(&reg, &labels, AmbiguityPolicy::Union);
        let err = parse("joe", &resolver).unwrap_err();
        assert!(matches!(err, ExpressionError::WrongKind { .. }));
    }

    #[test]
    fn shared_label_alone() {
        let (reg, labels) = setup();
        let union = LabelResolver::new(&reg, &labels, AmbiguityPolicy::Union);
        assert_eq!(
            union.shared_label(" animal "),
            Some(vec![
                Iri::new("http://localhost/Animal"),
                Iri::new("http://localhost/Beast"),
            ])
        );
        assert_eq!(union.shared_label("'animal'").map(|c| c.len()), Some(2));
        assert!(union.shared_label("part-of some animal").is_none());
        assert!(union.shared_label("'big cat'").is_none());

        let first = LabelResolver::new(&reg, &labels, AmbiguityPolicy::First);
        assert!(first.shared_label("animal").is_none());
    }
}
