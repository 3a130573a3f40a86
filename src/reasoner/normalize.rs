//! Structural transformation of axioms into EL normal form.
//!
//! Every concept the saturation works on gets a dense [`ConceptId`]: the top
//! and bottom concepts, one per named class, one per individual (treated as a
//! nominal-like singleton concept), and fresh names for compound
//! subexpressions. Normal forms:
//!
//! - `A ⊑ B` ([`NormalAxiom::Sub`])
//! - `A1 ⊓ A2 ⊑ B` ([`NormalAxiom::Conj`])
//! - `A ⊑ ∃r.B` ([`NormalAxiom::ExistsRight`])
//! - `∃r.A ⊑ B` ([`NormalAxiom::ExistsLeft`])
//!
//! plus a role hierarchy. An axiom `C ⊑ D` becomes `neg(C) ⊑ pos(D)`, where
//! `neg(C)` names a concept subsuming `C` and `pos(D)` names one subsumed by
//! `D`. Constructs outside EL are weakened so that no unsound consequence is
//! introduced: on the right-hand side `or` and `only` become ⊤, on the
//! left-hand side `not` and `only` become a fresh unconstrained concept.
//! Negation on the right is kept as `A ⊓ B ⊑ ⊥`.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::axiom::{Axiom, Ontology};
use crate::entity::{EntityKind, Iri};
use crate::expression::ClassExpression;

pub type ConceptId = usize;
pub type RoleId = usize;

/// ⊤ (`owl:Thing`).
pub const TOP: ConceptId = 0;
/// ⊥ (`owl:Nothing`).
pub const BOTTOM: ConceptId = 1;

/// Where a concept id came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptOrigin {
    Top,
    Bottom,
    Class(Iri),
    Individual(Iri),
    Fresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalAxiom {
    Sub(ConceptId, ConceptId),
    Conj(ConceptId, ConceptId, ConceptId),
    ExistsRight(ConceptId, RoleId, ConceptId),
    ExistsLeft(RoleId, ConceptId, ConceptId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Polarity {
    Positive,
    Negative,
}

/// Normalized ontology: concept and role tables plus normal-form axioms.
#[derive(Debug, Clone)]
pub struct NormalForm {
    origins: Vec<ConceptOrigin>,
    classes: HashMap<Iri, ConceptId>,
    individuals: HashMap<Iri, ConceptId>,
    roles: Vec<Iri>,
    role_ids: HashMap<Iri, RoleId>,
    /// Direct `sub ⊑ sup` role edges.
    role_edges: Vec<(RoleId, RoleId)>,
    memo: HashMap<(Polarity, ClassExpression), ConceptId>,
    axioms: Vec<NormalAxiom>,
    weakened: usize,
}

impl Default for NormalForm {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalForm {
    pub fn new() -> Self {
        Self {
            origins: vec![ConceptOrigin::Top, ConceptOrigin::Bottom],
            classes: HashMap::new(),
            individuals: HashMap::new(),
            roles: Vec::new(),
            role_ids: HashMap::new(),
            role_edges: Vec::new(),
            memo: HashMap::new(),
            axioms: Vec::new(),
            weakened: 0,
        }
    }

    /// Normalize every declared class and individual and every logical axiom.
    pub fn from_ontology(ontology: &Ontology) -> Self {
        let mut normal = Self::new();
        let registry = ontology.registry();
        let mut classes: Vec<&Iri> = registry.entities_of(EntityKind::Class).collect();
        classes.sort();
        for iri in classes {
            normal.class(iri);
        }
        let mut individuals: Vec<&Iri> = registry.entities_of(EntityKind::Individual).collect();
        individuals.sort();
        for iri in individuals {
            normal.individual(iri);
        }
        for axiom in ontology.axioms().logical() {
            normal.add_axiom(axiom);
        }
        tracing::debug!(
            concepts = normal.concept_count(),
            roles = normal.roles.len(),
            axioms = normal.axioms.len(),
            weakened = normal.weakened,
            "normalized ontology"
        );
        normal
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    fn push(&mut self, origin: ConceptOrigin) -> ConceptId {
        self.origins.push(origin);
        self.origins.len() - 1
    }

    /// Concept id of a named class (⊤ for `owl:Thing`).
    pub fn class(&mut self, iri: &Iri) -> ConceptId {
        if iri.is_thing() {
            return TOP;
        }
        if let Some(&id) = self.classes.get(iri) {
            return id;
        }
        let id = self.push(ConceptOrigin::Class(iri.clone()));
        self.classes.insert(iri.clone(), id);
        id
    }

    /// Concept id of an individual's singleton concept.
    pub fn individual(&mut self, iri: &Iri) -> ConceptId {
        if let Some(&id) = self.individuals.get(iri) {
            return id;
        }
        let id = self.push(ConceptOrigin::Individual(iri.clone()));
        self.individuals.insert(iri.clone(), id);
        id
    }

    pub fn role(&mut self, iri: &Iri) -> RoleId {
        if let Some(&id) = self.role_ids.get(iri) {
            return id;
        }
        self.roles.push(iri.clone());
        let id = self.roles.len() - 1;
        self.role_ids.insert(iri.clone(), id);
        id
    }

    pub fn fresh(&mut self) -> ConceptId {
        self.push(ConceptOrigin::Fresh)
    }

    pub fn class_id(&self, iri: &Iri) -> Option<ConceptId> {
        if iri.is_thing() {
            return Some(TOP);
        }
        self.classes.get(iri).copied()
    }

    pub fn individual_id(&self, iri: &Iri) -> Option<ConceptId> {
        self.individuals.get(iri).copied()
    }

    /// Named classes and their concept ids (excluding `owl:Thing`).
    pub fn classes(&self) -> impl Iterator<Item = (&Iri, ConceptId)> + '_ {
        self.classes.iter().map(|(iri, &id)| (iri, id))
    }

    pub fn individuals(&self) -> impl Iterator<Item = (&Iri, ConceptId)> + '_ {
        self.individuals.iter().map(|(iri, &id)| (iri, id))
    }

    pub fn origin(&self, id: ConceptId) -> &ConceptOrigin {
        &self.origins[id]
    }

    pub fn concept_count(&self) -> usize {
        self.origins.len()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn axioms(&self) -> &[NormalAxiom] {
        &self.axioms
    }

    /// Number of subexpressions weakened because they fall outside EL.
    pub fn weakened(&self) -> usize {
        self.weakened
    }

    /// Reflexive-transitive super-role closure, indexed by role id.
    pub fn role_closure(&self) -> Vec<Vec<RoleId>> {
        let mut parents: Vec<Vec<RoleId>> = vec![Vec::new(); self.roles.len()];
        for &(sub, sup) in &self.role_edges {
            parents[sub].push(sup);
        }
        (0..self.roles.len())
            .map(|role| {
                let mut visited = HashSet::from([role]);
                let mut order = vec![role];
                let mut queue = VecDeque::from([role]);
                while let Some(current) = queue.pop_front() {
                    for &parent in &parents[current] {
                        if visited.insert(parent) {
                            order.push(parent);
                            queue.push_back(parent);
                        }
                    }
                }
                order
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Axioms
    // -----------------------------------------------------------------------

    /// Normalize one logical axiom. Annotation assertions are ignored.
    pub fn add_axiom(&mut self, axiom: &Axiom) {
        match axiom {
            Axiom::SubClassOf { sub, sup } => self.subsumption(sub, sup),
            Axiom::EquivalentClasses(ops) => {
                if let Some((first, rest)) = ops.split_first() {
                    for other in rest {
                        self.subsumption(first, other);
                        self.subsumption(other, first);
                    }
                }
            }
            Axiom::DisjointClasses(ops) => {
                for (i, a) in ops.iter().enumerate() {
                    for b in &ops[i + 1..] {
                        let a = self.neg(a);
                        let b = self.neg(b);
                        self.axioms.push(NormalAxiom::Conj(a, b, BOTTOM));
                    }
                }
            }
            Axiom::ClassAssertion { individual, class } => {
                let ind = self.individual(individual);
                let class = self.pos(class);
                self.axioms.push(NormalAxiom::Sub(ind, class));
            }
            Axiom::PropertyAssertion {
                subject,
                property,
                object,
            } => {
                let s = self.individual(subject);
                let r = self.role(property);
                let o = self.individual(object);
                self.axioms.push(NormalAxiom::ExistsRight(s, r, o));
            }
            Axiom::SubObjectPropertyOf { sub, sup } => {
                let sub = self.role(sub);
                let sup = self.role(sup);
                self.role_edges.push((sub, sup));
            }
            Axiom::AnnotationAssertion { .. } => {}
        }
    }

    /// Introduce a fresh concept equivalent (as far as EL allows) to `expr`.
    pub fn define_query(&mut self, expr: &ClassExpression) -> ConceptId {
        let query = self.fresh();
        let upper = self.pos(expr);
        let lower = self.neg(expr);
        self.axioms.push(NormalAxiom::Sub(query, upper));
        self.axioms.push(NormalAxiom::Sub(lower, query));
        query
    }

    fn subsumption(&mut self, sub: &ClassExpression, sup: &ClassExpression) {
        let lhs = self.neg(sub);
        let rhs = self.pos(sup);
        if lhs != rhs && rhs != TOP {
            self.axioms.push(NormalAxiom::Sub(lhs, rhs));
        }
    }

    /// A concept `A` with `A ⊑ expr` (right-hand-side occurrence).
    fn pos(&mut self, expr: &ClassExpression) -> ConceptId {
        if let ClassExpression::Named(iri) = expr {
            return self.class(iri);
        }
        if let Some(&id) = self.memo.get(&(Polarity::Positive, expr.clone())) {
            return id;
        }
        let id = match expr {
            ClassExpression::Named(iri) => self.class(iri),
            ClassExpression::And(ops) => {
                let a = self.fresh();
                for op in ops {
                    let b = self.pos(op);
                    self.axioms.push(NormalAxiom::Sub(a, b));
                }
                a
            }
            ClassExpression::Exists { property, filler } => {
                let a = self.fresh();
                let r = self.role(property);
                let b = self.pos(filler);
                self.axioms.push(NormalAxiom::ExistsRight(a, r, b));
                a
            }
            ClassExpression::Not(operand) => {
                let a = self.fresh();
                let b = self.neg(operand);
                self.axioms.push(NormalAxiom::Conj(a, b, BOTTOM));
                a
            }
            ClassExpression::Or(_) | ClassExpression::ForAll { .. } => {
                self.weakened += 1;
                tracing::debug!(expr = %expr, "weakened right-hand side construct to owl:Thing");
                TOP
            }
        };
        self.memo.insert((Polarity::Positive, expr.clone()), id);
        id
    }

    /// A concept `A` with `expr ⊑ A` (left-hand-side occurrence).
    fn neg(&mut self, expr: &ClassExpression) -> ConceptId {
        if let ClassExpression::Named(iri) = expr {
            return self.class(iri);
        }
        if let Some(&id) = self.memo.get(&(Polarity::Negative, expr.clone())) {
            return id;
        }
        let id = match expr {
            ClassExpression::Named(iri) => self.class(iri),
            ClassExpression::And(ops) => {
                let ids: Vec<ConceptId> = ops.iter().map(|op| self.neg(op)).collect();
                match ids.as_slice() {
                    [] => TOP,
                    [only] => *only,
                    [first, rest @ ..] => {
                        let mut acc = *first;
                        for &next in rest {
                            let joined = self.fresh();
                            self.axioms.push(NormalAxiom::Conj(acc, next, joined));
                            acc = joined;
                        }
                        acc
                    }
                }
            }
            ClassExpression::Exists { property, filler } => {
                let a = self.fresh();
                let r = self.role(property);
                let b = self.neg(filler);
                self.axioms.push(NormalAxiom::ExistsLeft(r, b, a));
                a
            }
            ClassExpression::Or(ops) => {
                let a = self.fresh();
                for op in ops {
                    let b = self.neg(op);
                    self.axioms.push(NormalAxiom::Sub(b, a));
                }
                a
            }
            ClassExpression::Not(_) | ClassExpression::ForAll { .. } => {
                self.weakened += 1;
                tracing::debug!(expr = %expr, "weakened left-hand side construct to a fresh concept");
                self.fresh()
            }
        };
        self.memo.insert((Polarity::Negative, expr.clone()), id);
        id
    }
}
