//! The built-in EL reasoner.
//!
//! Classification normalizes the ontology, saturates it, and builds the
//! taxonomy. The saturation is retained so that an expression query only adds
//! the axioms defining a fresh query concept and re-saturates a copy.

use std::collections::BTreeSet;
use std::time::Instant;

use super::normalize::{ConceptId, NormalForm, TOP};
use super::saturate::Saturation;
use super::taxonomy::Classification;
use super::{ExpressionNode, Reasoner, ReasonerFactory, ReasonerResult};
use crate::axiom::Ontology;
use crate::entity::Iri;
use crate::error::ReasonerError;
use crate::expression::ClassExpression;

const NAME: &str = "el";

#[derive(Debug, Clone)]
struct ElState {
    normal: NormalForm,
    sat: Saturation,
}

/// Completion-based reasoner for the EL fragment.
///
/// Constructs outside EL (`or` and `only` on the right of a subsumption,
/// `not` and `only` on the left) are ignored, so every reported subsumption
/// holds but some entailments may be missed.
#[derive(Debug, Default)]
pub struct ElReasoner {
    state: Option<ElState>,
}

impl ElReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a saturation is currently held.
    pub fn is_primed(&self) -> bool {
        self.state.is_some()
    }

    fn saturate(ontology: &Ontology) -> ReasonerResult<ElState> {
        let normal = NormalForm::from_ontology(ontology);
        let mut sat = Saturation::new();
        sat.ensure_concepts(normal.concept_count());
        sat.set_role_closure(normal.role_closure());
        sat.add_axioms(normal.axioms());
        sat.run();

        if normal.weakened() > 0 {
            tracing::warn!(
                weakened = normal.weakened(),
                "constructs outside EL were ignored during classification"
            );
        }

        if sat.is_unsatisfiable(TOP) {
            return Err(ReasonerError::Inconsistent {
                witness: "owl:Thing".into(),
            });
        }
        let mut individuals: Vec<(&Iri, ConceptId)> = normal.individuals().collect();
        individuals.sort();
        if let Some((iri, _)) = individuals
            .into_iter()
            .find(|(_, concept)| sat.is_unsatisfiable(*concept))
        {
            return Err(ReasonerError::Inconsistent {
                witness: format!("individual {}", iri.short_form()),
            });
        }

        Ok(ElState { normal, sat })
    }
}

impl Reasoner for ElReasoner {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&mut self, ontology: &Ontology) -> ReasonerResult<Classification> {
        let started = Instant::now();
        let state = Self::saturate(ontology)?;
        let classification = Classification::build(&state.normal, &state.sat);
        tracing::info!(
            reasoner = NAME,
            concepts = state.normal.concept_count(),
            nodes = classification.node_count(),
            unsatisfiable = classification.unsatisfiable().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classified ontology"
        );
        self.state = Some(state);
        Ok(classification)
    }

    fn classify_expression(
        &mut self,
        ontology: &Ontology,
        expression: &ClassExpression,
    ) -> ReasonerResult<ExpressionNode> {
        if self.state.is_none() {
            self.state = Some(Self::saturate(ontology)?);
        }
        let Some(base) = self.state.as_ref() else {
            return Err(ReasonerError::Internal {
                reasoner: NAME.into(),
                message: "no saturation available".into(),
            });
        };

        let mut normal = base.normal.clone();
        let mut sat = base.sat.clone();
        let before = normal.axioms().len();

        let query = normal.define_query(expression);
        // A union is subsumed by what subsumes every disjunct.
        let upper: Vec<ConceptId> = match expression {
            ClassExpression::Or(ops) => ops.iter().map(|op| normal.define_query(op)).collect(),
            _ => vec![query],
        };

        sat.ensure_concepts(normal.concept_count());
        sat.set_role_closure(normal.role_closure());
        sat.add_axioms(&normal.axioms()[before..]);
        sat.refire();
        sat.run();

        let mut node = ExpressionNode {
            satisfiable: !sat.is_unsatisfiable(query),
            ..Default::default()
        };
        let named = normal
            .classes()
            .map(|(iri, id)| (iri.clone(), id))
            .chain(std::iter::once((Iri::thing(), TOP)));
        // An empty query is below every class; an empty class below the query.
        for (iri, concept) in named {
            let above = !node.satisfiable || upper.iter().all(|&q| sat.subsumes(concept, q));
            let below = sat.is_unsatisfiable(concept) || sat.subsumes(query, concept);
            match (above, below) {
                (true, true) => node.equivalents.insert(iri),
                (true, false) => node.supers.insert(iri),
                (false, true) => node.subs.insert(iri),
                (false, false) => false,
            };
        }
        node.instances = normal
            .individuals()
            .filter(|(_, concept)| sat.subsumes(query, *concept))
            .map(|(iri, _)| iri.clone())
            .collect::<BTreeSet<_>>();

        tracing::debug!(
            expression = %expression,
            equivalents = node.equivalents.len(),
            supers = node.supers.len(),
            subs = node.subs.len(),
            "classified expression"
        );
        Ok(node)
    }
}

/// Factory for [`ElReasoner`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElReasonerFactory;

impl ReasonerFactory for ElReasonerFactory {
    fn name(&self) -> &str {
        NAME
    }

    fn create(&self) -> Box<dyn Reasoner> {
        Box::new(ElReasoner::new())
    }
}
