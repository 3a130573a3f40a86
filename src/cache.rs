//! Classification cache: owns the reasoner handle and the latest result.
//!
//! State machine:
//!
//! - any mutation: `Clean`/`Dirty` → `Dirty`, `Asleep` stays `Asleep`
//! - a query in `Dirty` or `Asleep`: synchronous full recomputation → `Clean`
//! - `classify()`: recomputation from any state → `Clean`
//! - `sleep()`: drop the reasoner handle and the result → `Asleep`
//!
//! Recomputation is all-or-nothing: if the reasoner fails, the state and the
//! previous result are left as they were and the error propagates.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axiom::Ontology;
use crate::config::ClassificationMode;
use crate::error::ReasonerError;
use crate::expression::ClassExpression;
use crate::reasoner::{Classification, ExpressionNode, Reasoner, ReasonerFactory, ReasonerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheState {
    /// The cached classification matches the current axioms.
    Clean,
    /// Axioms changed since the last classification.
    Dirty,
    /// Reasoner resources released; axioms retained.
    Asleep,
}

pub struct ClassificationCache {
    factory: Arc<dyn ReasonerFactory>,
    reasoner: Option<Box<dyn Reasoner>>,
    classification: Option<Classification>,
    state: CacheState,
    mode: ClassificationMode,
    recomputations: u64,
}

impl fmt::Debug for ClassificationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationCache")
            .field("reasoner", &self.factory.name())
            .field("awake", &self.reasoner.is_some())
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("recomputations", &self.recomputations)
            .finish()
    }
}

impl ClassificationCache {
    pub fn new(factory: Arc<dyn ReasonerFactory>, mode: ClassificationMode) -> Self {
        Self {
            factory,
            reasoner: None,
            classification: None,
            state: CacheState::Dirty,
            mode,
            recomputations: 0,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ClassificationMode) {
        self.mode = mode;
    }

    /// Whether a reasoner handle is currently held.
    pub fn is_awake(&self) -> bool {
        self.reasoner.is_some()
    }

    /// How many full classifications have been computed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Record a mutation. In eager mode an awake cache reclassifies at once;
    /// a failure there is logged and the cache stays dirty.
    pub fn invalidate(&mut self, ontology: &Ontology) {
        if self.state == CacheState::Clean {
            tracing::debug!("classification cache: clean -> dirty");
            self.state = CacheState::Dirty;
            self.classification = None;
        }
        if self.mode == ClassificationMode::Eager && self.state == CacheState::Dirty {
            if let Err(err) = self.recompute(ontology) {
                tracing::warn!(error = %err, "eager reclassification failed");
            }
        }
    }

    /// The classification of the current axioms, recomputing if needed.
    pub fn ensure(&mut self, ontology: &Ontology) -> ReasonerResult<&Classification> {
        if self.state != CacheState::Clean || self.classification.is_none() {
            self.recompute(ontology)?;
        }
        self.result()
    }

    /// Force a recomputation regardless of state.
    pub fn classify(&mut self, ontology: &Ontology) -> ReasonerResult<&Classification> {
        self.recompute(ontology)?;
        self.result()
    }

    /// Place an anonymous expression. Never cached.
    pub fn classify_expression(
        &mut self,
        ontology: &Ontology,
        expression: &ClassExpression,
    ) -> ReasonerResult<ExpressionNode> {
        self.ensure(ontology)?;
        self.handle().classify_expression(ontology, expression)
    }

    /// Release the reasoner handle and the cached result.
    pub fn sleep(&mut self) {
        if self.reasoner.take().is_some() {
            tracing::debug!(reasoner = self.factory.name(), "released reasoner");
        }
        self.classification = None;
        self.state = CacheState::Asleep;
    }

    fn handle(&mut self) -> &mut Box<dyn Reasoner> {
        let factory = &self.factory;
        self.reasoner.get_or_insert_with(|| {
            tracing::debug!(reasoner = factory.name(), "created reasoner");
            factory.create()
        })
    }

    fn recompute(&mut self, ontology: &Ontology) -> ReasonerResult<()> {
        let from = self.state;
        let classification = self.handle().classify(ontology)?;
        self.classification = Some(classification);
        self.state = CacheState::Clean;
        self.recomputations += 1;
        tracing::debug!(?from, "classification cache: -> clean");
        Ok(())
    }

    fn result(&self) -> ReasonerResult<&Classification> {
        self.classification
            .as_ref()
            .ok_or_else(|| ReasonerError::Internal {
                reasoner: self.factory.name().to_string(),
                message: "classification missing after recomputation".into(),
            })
    }
}
