//! Rich diagnostic error types for the ontokit knowledge base.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly
//! what went wrong and how to fix it. Every condition here is recoverable: no
//! operation leaves the knowledge base partially mutated.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::entity::EntityKind;

/// Top-level error type for the knowledge base.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum OntoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reasoner(#[from] ReasonerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("identity conflict: <{iri}> is already a {existing}, cannot redeclare it as a {requested}")]
    #[diagnostic(
        code(ontokit::registry::identity_conflict),
        help(
            "An IRI denotes at most one entity. Use a different IRI for the {requested}, \
             or remove the conflicting declaration from the source being merged."
        )
    )]
    IdentityConflict {
        iri: String,
        existing: EntityKind,
        requested: EntityKind,
    },

    #[error("entity already exists: \"{name}\" (<{iri}>)")]
    #[diagnostic(
        code(ontokit::registry::existing_entity),
        help(
            "This call site only accepts brand-new entities. Use `declare` for an \
             idempotent declaration, or pick another name."
        )
    )]
    ExistingEntity { name: String, iri: String },

    #[error("short name \"{short_name}\" already denotes <{existing}>, cannot reuse it for <{requested}>")]
    #[diagnostic(
        code(ontokit::registry::short_name_taken),
        help(
            "Query results are reported by short name, so a short name may only belong \
             to one IRI per knowledge base. Rename one of the entities."
        )
    )]
    ShortNameTaken {
        short_name: String,
        existing: String,
        requested: String,
    },

    #[error("unknown entity: \"{name}\"")]
    #[diagnostic(
        code(ontokit::registry::unknown_entity),
        help("Declare the entity first (e.g. `add_class`), or check the spelling and prefix.")
    )]
    UnknownEntity { name: String },

    #[error("unknown prefix \"{prefix}\" in \"{name}\"")]
    #[diagnostic(
        code(ontokit::registry::unknown_prefix),
        help("Register the namespace first with `add_prefix(namespace, \"{prefix}\")`.")
    )]
    UnknownPrefix { prefix: String, name: String },

    #[error("invalid IRI: \"{iri}\"")]
    #[diagnostic(
        code(ontokit::registry::invalid_iri),
        help("IRIs must be non-empty and must not contain whitespace, '<' or '>'.")
    )]
    InvalidIri { iri: String },
}

impl RegistryError {
    /// Whether this is the existing-entity condition (no inconsistency, but
    /// the call site disallowed re-declaration).
    pub fn is_existing_entity(&self) -> bool {
        matches!(
            self,
            RegistryError::ExistingEntity { .. } | RegistryError::ShortNameTaken { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Class-expression errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExpressionError {
    #[error("unresolved token \"{token}\" in class expression \"{input}\"")]
    #[diagnostic(
        code(ontokit::expression::unresolved),
        help(
            "Every class and property in an expression must already be declared. \
             Declare \"{token}\" first, or quote multi-word labels like 'a label'."
        )
    )]
    Unresolved { token: String, input: String },

    #[error("\"{token}\" is a {actual}, expected a {expected} in class expression \"{input}\"")]
    #[diagnostic(
        code(ontokit::expression::wrong_kind),
        help("Restrictions take an object property on the left and a class expression on the right.")
    )]
    WrongKind {
        token: String,
        expected: String,
        actual: EntityKind,
        input: String,
    },

    #[error("syntax error in class expression \"{input}\": {message}")]
    #[diagnostic(
        code(ontokit::expression::syntax),
        help(
            "Supported forms: `A`, `p some A`, `p only A`, `A and B`, `A or B`, `not A`, \
             with parentheses for grouping."
        )
    )]
    Syntax { message: String, input: String },

    #[error("empty class expression")]
    #[diagnostic(
        code(ontokit::expression::empty),
        help("Provide a class name or a class expression.")
    )]
    Empty,

    /// A leaf resolved through the label index failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Label(#[from] LabelError),
}

// ---------------------------------------------------------------------------
// Label errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LabelError {
    #[error("no entity carries the label \"{label}\"")]
    #[diagnostic(
        code(ontokit::label::no_match),
        help("Labels are matched exactly. Check the spelling, or query by name instead.")
    )]
    NoMatch { label: String },

    #[error("label \"{label}\" is ambiguous: {count} entities match ({candidates})")]
    #[diagnostic(
        code(ontokit::label::ambiguous),
        help(
            "This call requires exactly one entity. Query by name, or configure \
             `label_ambiguity = \"union\"` to treat the matches as a disjunction."
        )
    )]
    Ambiguous {
        label: String,
        count: usize,
        candidates: String,
    },
}

// ---------------------------------------------------------------------------
// Annotation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotationError {
    #[error("\"{entity}\" has no <{property}> annotation")]
    #[diagnostic(
        code(ontokit::annotation::missing),
        help("Attach one first with `annotate`, or use `annotations` to get a possibly empty list.")
    )]
    Missing { entity: String, property: String },
}

// ---------------------------------------------------------------------------
// Reasoner errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReasonerError {
    #[error("the ontology is inconsistent: {witness} is unsatisfiable")]
    #[diagnostic(
        code(ontokit::reasoner::inconsistent),
        help(
            "Either owl:Thing is unsatisfiable or an individual belongs to disjoint classes. \
             Review the disjointness axioms and class assertions involving {witness}."
        )
    )]
    Inconsistent { witness: String },

    #[error("reasoner \"{reasoner}\" failed: {message}")]
    #[diagnostic(
        code(ontokit::reasoner::internal),
        help("The reasoning backend reported an internal error. It is propagated unchanged.")
    )]
    Internal { reasoner: String, message: String },
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(ontokit::codec::io),
        help("Check that the file exists and that you have read/write permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ontology document: {message}")]
    #[diagnostic(
        code(ontokit::codec::parse),
        help("The document is not valid in the detected serialization (Turtle, N-Triples or RDF/XML).")
    )]
    Parse { message: String },

    #[error("malformed OWL construct: {message}")]
    #[diagnostic(
        code(ontokit::codec::malformed),
        help("The RDF graph parsed, but does not map to a supported OWL axiom or class expression.")
    )]
    Malformed { message: String },

    #[error("failed to serialize ontology: {message}")]
    #[diagnostic(
        code(ontokit::codec::serialize),
        help("An IRI or literal could not be written. Check entity IRIs for invalid characters.")
    )]
    Serialize { message: String },
}

/// Convenience alias for functions returning ontokit results.
pub type OntoResult<T> = std::result::Result<T, OntoError>;
