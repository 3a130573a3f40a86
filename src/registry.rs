//! Entity registry: IRI → entity, short name → IRI, plus the prefix table.
//!
//! The [`EntityRegistry`] owns entity identity. An IRI denotes at most one
//! entity; a short name denotes at most one IRI. `owl:Thing` is a constant
//! member that is never stored in the maps and always resolves.

use std::collections::HashMap;

use crate::entity::{Entity, EntityKind, Iri};
use crate::error::RegistryError;
use crate::prefix::PrefixManager;

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Outcome of an idempotent declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// A new entity was added.
    Declared,
    /// The IRI already denoted an entity of a compatible kind; nothing changed.
    AlreadyPresent,
}

/// Bidirectional entity registry with prefix-aware name resolution.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    /// Forward map: IRI → kind (source of truth).
    entities: HashMap<Iri, EntityKind>,
    /// Reverse map: short name → IRI.
    short_names: HashMap<String, Iri>,
    prefixes: PrefixManager,
    default_namespace: String,
}

impl EntityRegistry {
    /// Create an empty registry resolving bare names against `default_namespace`.
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            entities: HashMap::new(),
            short_names: HashMap::new(),
            prefixes: PrefixManager::with_standard_prefixes(),
            default_namespace: default_namespace.into(),
        }
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    /// Check whether `declare(iri, kind)` would succeed, without mutating.
    pub fn check_declare(&self, iri: &Iri, kind: EntityKind) -> RegistryResult<DeclareOutcome> {
        if !iri.is_valid() {
            return Err(RegistryError::InvalidIri {
                iri: iri.to_string(),
            });
        }
        if iri.is_thing() {
            return if kind.is_class() {
                Ok(DeclareOutcome::AlreadyPresent)
            } else {
                Err(RegistryError::IdentityConflict {
                    iri: iri.to_string(),
                    existing: EntityKind::TopClass,
                    requested: kind,
                })
            };
        }
        if let Some(&existing) = self.entities.get(iri) {
            return if existing.compatible_with(kind) {
                Ok(DeclareOutcome::AlreadyPresent)
            } else {
                Err(RegistryError::IdentityConflict {
                    iri: iri.to_string(),
                    existing,
                    requested: kind,
                })
            };
        }
        let short = iri.short_form();
        if short == Iri::thing().short_form() {
            return Err(RegistryError::ShortNameTaken {
                short_name: short.to_string(),
                existing: Iri::thing().to_string(),
                requested: iri.to_string(),
            });
        }
        if let Some(holder) = self.short_names.get(short) {
            return Err(RegistryError::ShortNameTaken {
                short_name: short.to_string(),
                existing: holder.to_string(),
                requested: iri.to_string(),
            });
        }
        Ok(DeclareOutcome::Declared)
    }

    /// Declare an entity. Idempotent for the same kind; an identity conflict
    /// for a different kind.
    pub fn declare(&mut self, iri: Iri, kind: EntityKind) -> RegistryResult<DeclareOutcome> {
        let outcome = self.check_declare(&iri, kind)?;
        if outcome == DeclareOutcome::Declared {
            tracing::debug!(iri = %iri, %kind, "declared entity");
            self.short_names
                .insert(iri.short_form().to_string(), iri.clone());
            self.entities.insert(iri, kind);
        }
        Ok(outcome)
    }

    /// Declare a brand-new entity: an existing same-kind entity is reported
    /// as [`RegistryError::ExistingEntity`].
    pub fn declare_new(&mut self, iri: Iri, kind: EntityKind) -> RegistryResult<Entity> {
        match self.declare(iri.clone(), kind)? {
            DeclareOutcome::Declared => Ok(Entity::new(iri, kind)),
            DeclareOutcome::AlreadyPresent => Err(RegistryError::ExistingEntity {
                name: iri.short_form().to_string(),
                iri: iri.to_string(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------------

    /// Turn user text into an IRI without requiring the entity to exist.
    ///
    /// Accepts a full IRI, `prefix:local` (prefix must be registered), or a
    /// bare local name (expanded against the default namespace).
    pub fn resolve_iri(&self, text: &str) -> RegistryResult<Iri> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RegistryError::InvalidIri { iri: text.into() });
        }
        let iri = if Iri::looks_absolute(text) {
            Iri::new(text)
        } else if text == "Thing" {
            Iri::thing()
        } else if let Some((prefix, _local)) = text.split_once(':') {
            match self.prefixes.expand(text) {
                Some(expanded) => Iri::new(expanded),
                None => {
                    return Err(RegistryError::UnknownPrefix {
                        prefix: format!("{prefix}:"),
                        name: text.to_string(),
                    });
                }
            }
        } else {
            Iri::new(format!("{}{text}", self.default_namespace))
        };
        if iri.is_valid() {
            Ok(iri)
        } else {
            Err(RegistryError::InvalidIri {
                iri: iri.to_string(),
            })
        }
    }

    /// Resolve text to an existing entity, if there is one.
    ///
    /// Bare names try the default-namespace IRI first, then the short-name index.
    pub fn lookup(&self, text: &str) -> Option<Entity> {
        let text = text.trim();
        let iri = self.resolve_iri(text).ok()?;
        if let Some(entity) = self.get(&iri) {
            return Some(entity);
        }
        if Iri::looks_absolute(text) || text.contains(':') {
            return None;
        }
        let iri = self.short_names.get(text)?;
        self.get(iri)
    }

    /// Resolve text to an existing entity, failing with
    /// [`RegistryError::UnknownEntity`] when nothing matches.
    pub fn resolve_name(&self, text: &str) -> RegistryResult<Entity> {
        if let Some(entity) = self.lookup(text) {
            return Ok(entity);
        }
        // Surface prefix errors before the generic unknown-entity error.
        self.resolve_iri(text)?;
        Err(RegistryError::UnknownEntity {
            name: text.trim().to_string(),
        })
    }

    /// Look up an entity by IRI. `owl:Thing` always resolves.
    pub fn get(&self, iri: &Iri) -> Option<Entity> {
        if iri.is_thing() {
            return Some(Entity::thing());
        }
        self.entities
            .get(iri)
            .map(|&kind| Entity::new(iri.clone(), kind))
    }

    pub fn contains(&self, iri: &Iri) -> bool {
        iri.is_thing() || self.entities.contains_key(iri)
    }

    /// Whether `text` resolves to an entity of exactly `kind`.
    pub fn knows(&self, text: &str, kind: EntityKind) -> bool {
        self.lookup(text).is_some_and(|e| e.kind == kind)
    }

    /// The display name used in query results.
    /// `prefix:local` form of an IRI, or the full IRI when no prefix covers it.
    pub fn abbreviate(&self, iri: &Iri) -> String {
        self.prefixes
            .abbreviate(iri.as_str())
            .unwrap_or_else(|| iri.to_string())
    }

    /// All declared entities (excluding `owl:Thing`), in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .map(|(iri, &kind)| Entity::new(iri.clone(), kind))
    }

    /// All declared entities of one kind, in no particular order.
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Iri> + '_ {
        self.entities
            .iter()
            .filter(move |(_, k)| **k == kind)
            .map(|(iri, _)| iri)
    }

    /// Number of declared entities (excluding `owl:Thing`).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // -----------------------------------------------------------------------
    // Prefixes
    // -----------------------------------------------------------------------

    /// Register `short_form` as a prefix for `namespace`.
    pub fn add_prefix(&mut self, namespace: &str, short_form: &str) {
        if let Some(old) = self.prefixes.add_prefix(namespace, short_form) {
            if old != namespace {
                tracing::debug!(prefix = short_form, old = %old, new = namespace, "prefix rebound");
            }
        }
    }

    /// Namespace registered for a prefix name.
    pub fn prefix(&self, short_form: &str) -> Option<&str> {
        self.prefixes.prefix(short_form)
    }

    pub fn prefixes(&self) -> &PrefixManager {
        &self.prefixes
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NAMESPACE)
    }
}
