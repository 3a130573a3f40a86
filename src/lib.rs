// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ontokit
//!
//! A description-logic knowledge base: typed entities, axioms over class
//! expressions, and a cached classification computed by a pluggable reasoner.
//!
//! ## Architecture
//!
//! - **Entity registry** (`registry`, `entity`, `prefix`): IRIs, short names, prefixes, identity rules
//! - **Axioms** (`axiom`): set-semantics axiom store paired with the registry as an `Ontology`
//! - **Class expressions** (`expression`): `part-of some Animal` → resolved expression trees
//! - **Labels** (`label`): label → entity index derived from annotations
//! - **Reasoning** (`reasoner`): `Reasoner` trait, built-in EL saturation reasoner, EL profile check
//! - **Classification cache** (`cache`): clean / dirty / asleep lifecycle of the reasoner handle
//! - **Queries** (`query`): named vs anonymous targets and set extraction
//! - **Merge** (`merge`): atomic "learn" of one ontology into another
//! - **Documents** (`codec`): Turtle / N-Triples / RDF/XML through oxigraph
//!
//! ## Library usage
//!
//! ```no_run
//! use ontokit::kb::KnowledgeBase;
//!
//! let mut kb = KnowledgeBase::new();
//! kb.add_class("Animal").unwrap();
//! kb.add_class("Lion").unwrap();
//! kb.add_object_property("part-of").unwrap();
//! kb.add_sub_class_of("Lion", "Animal").unwrap();
//!
//! let subs = kb.sub_classes("Animal", false).unwrap();
//! assert!(subs.contains("Lion"));
//! let parts = kb.sub_classes("part-of some Animal", true).unwrap();
//! assert!(parts.is_empty());
//! ```

pub mod axiom;
pub mod cache;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod expression;
pub mod kb;
pub mod label;
pub mod merge;
pub mod prefix;
pub mod query;
pub mod reasoner;
pub mod registry;

pub use error::{OntoError, OntoResult};
pub use kb::KnowledgeBase;
