//! Reasoning capability: traits, results, and the built-in EL reasoner.
//!
//! The knowledge base only talks to reasoners through [`Reasoner`] (one
//! handle per knowledge base, created by a [`ReasonerFactory`]) and to
//! profile checkers through [`ProfileChecker`].
//!
//! - [`normalize`]: structural transformation into EL normal form
//! - [`saturate`]: completion-rule saturation
//! - [`taxonomy`]: equivalence-class nodes and the [`Classification`] result
//! - [`el`]: [`ElReasoner`], the default reasoner built from the above
//! - [`profile`]: EL profile checking

pub mod el;
pub mod normalize;
pub mod profile;
pub mod saturate;
pub mod taxonomy;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::axiom::Ontology;
use crate::entity::Iri;
use crate::error::ReasonerError;
use crate::expression::ClassExpression;

pub use el::{ElReasoner, ElReasonerFactory};
pub use profile::{ElProfileChecker, ProfileChecker, ProfileKind, ProfileReport, ProfileViolation};
pub use taxonomy::{ClassNode, Classification, IndividualTypes};

/// Result type for reasoning operations.
pub type ReasonerResult<T> = std::result::Result<T, ReasonerError>;

/// Where an anonymous class expression sits relative to the named classes.
///
/// All sets hold strict relations: the equivalents are reported separately
/// and never appear in `supers` or `subs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub satisfiable: bool,
    /// Named classes equivalent to the expression.
    pub equivalents: BTreeSet<Iri>,
    /// Named classes strictly subsuming the expression (`owl:Thing` included).
    pub supers: BTreeSet<Iri>,
    /// Named classes strictly subsumed by the expression.
    pub subs: BTreeSet<Iri>,
    /// Individuals belonging to the expression.
    pub instances: BTreeSet<Iri>,
}

/// A reasoner handle bound to one knowledge base.
///
/// Handles may keep internal state between calls (the built-in reasoner
/// keeps its saturation so expression queries are incremental). Resources
/// are released on drop.
pub trait Reasoner: Send {
    /// Backend name, for logs and errors.
    fn name(&self) -> &str;

    /// Classify every named class and individual of `ontology`.
    ///
    /// All-or-nothing: on error the handle keeps whatever state it had.
    fn classify(&mut self, ontology: &Ontology) -> ReasonerResult<Classification>;

    /// Place an anonymous class expression relative to the named classes.
    ///
    /// Results are computed per call and never cached.
    fn classify_expression(
        &mut self,
        ontology: &Ontology,
        expression: &ClassExpression,
    ) -> ReasonerResult<ExpressionNode>;
}

/// Creates reasoner handles on demand.
pub trait ReasonerFactory: Send + Sync {
    fn name(&self) -> &str;

    fn create(&self) -> Box<dyn Reasoner>;
}
