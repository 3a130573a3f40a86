//! Merging one ontology into another ("learn").
//!
//! Every source entity is checked against the target before anything is
//! written; the first conflict aborts the merge with the target untouched.
//! The merge itself runs on a staged copy that replaces the target only once
//! entities, axioms and prefixes have all been applied.

use serde::{Deserialize, Serialize};

use crate::axiom::Ontology;
use crate::entity::Entity;
use crate::registry::{DeclareOutcome, RegistryResult};

/// What a merge changed in the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Source entities new to the target.
    pub entities_added: usize,
    /// Source entities the target already had with the same kind.
    pub entities_unified: usize,
    /// Source axioms new to the target.
    pub axioms_added: usize,
    /// Source prefixes new to the target.
    pub prefixes_added: usize,
    /// Source prefixes whose name the target already bound (the target wins).
    pub prefixes_kept: usize,
}

/// Merge `source` into `target` atomically.
pub fn merge(target: &mut Ontology, source: &Ontology) -> RegistryResult<MergeReport> {
    let mut entities: Vec<Entity> = source.registry().entities().collect();
    entities.sort();

    // Check everything first: the target stays unchanged on any conflict.
    let mut report = MergeReport::default();
    for entity in &entities {
        match target.registry().check_declare(&entity.iri, entity.kind)? {
            DeclareOutcome::Declared => report.entities_added += 1,
            DeclareOutcome::AlreadyPresent => report.entities_unified += 1,
        }
    }

    let mut staged = target.clone();
    for entity in entities {
        staged.registry_mut().declare(entity.iri, entity.kind)?;
    }
    report.axioms_added = staged.add_axioms(source.axioms().iter().cloned().collect())?;

    for (name, namespace) in source.registry().prefixes().iter() {
        match staged.registry().prefix(name) {
            Some(existing) if existing != namespace => {
                tracing::debug!(
                    prefix = %name,
                    kept = existing,
                    ignored = %namespace,
                    "prefix name already bound in target"
                );
                report.prefixes_kept += 1;
            }
            Some(_) => {}
            None => {
                staged.registry_mut().add_prefix(namespace, name);
                report.prefixes_added += 1;
            }
        }
    }

    if staged.iri().is_none() {
        staged.set_iri(source.iri().cloned());
    }

    *target = staged;
    tracing::info!(
        added = report.entities_added,
        unified = report.entities_unified,
        axioms = report.axioms_added,
        prefixes = report.prefixes_added,
        "merged ontology"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::Axiom;
    use crate::entity::{EntityKind, Iri};
    use crate::error::RegistryError;
    use crate::expression::ClassExpression;

    fn onto() -> Ontology {
        Ontology::new("http://localhost/")
    }

    #[test]
    fn merge_copies_entities_axioms_and_prefixes() {
        let mut source = onto();
        let a = Iri::new("http://whatever.com/TEST_A");
        let b = Iri::new("http://whatever.com/TEST_B");
        source.registry_mut().declare(a.clone(), EntityKind::Class).unwrap();
        source.registry_mut().declare(b.clone(), EntityKind::Class).unwrap();
        source
            .add_axiom(Axiom::sub_class_of(
                ClassExpression::named(a.clone()),
                ClassExpression::named(b),
            ))
            .unwrap();
        source
            .registry_mut()
            .add_prefix("http://whatever.com/", "whatever");

        let mut target = onto();
        target
            .registry_mut()
            .add_prefix("http://www.example.org/", "example");
        let report = merge(&mut target, &source).unwrap();

        assert_eq!(report.entities_added, 2);
        assert_eq!(report.axioms_added, 1);
        assert_eq!(report.prefixes_added, 1);
        assert!(target.registry().contains(&a));
        assert_eq!(
            target.registry().prefix("whatever:"),
            Some("http://whatever.com/")
        );
        assert_eq!(
            target.registry().prefix("example:"),
            Some("http://www.example.org/")
        );
    }

    #[test]
    fn same_kind_unifies() {
        let mut source = onto();
        source
            .registry_mut()
            .declare(Iri::new("http://localhost/A"), EntityKind::Class)
            .unwrap();
        let mut target = source.clone();
        let report = merge(&mut target, &source).unwrap();
        assert_eq!(report.entities_unified, 1);
        assert_eq!(report.entities_added, 0);
        assert_eq!(target.registry().len(), 1);
    }

    #[test]
    fn conflict_leaves_target_unchanged() {
        let mut source = onto();
        source
            .registry_mut()
            .declare(Iri::new("http://localhost/B"), EntityKind::Class)
            .unwrap();
        source
            .registry_mut()
            .declare(Iri::new("http://www.example.org/part-of"), EntityKind::ObjectProperty)
            .unwrap();

        let mut target = onto();
        target
            .registry_mut()
            .declare(Iri::new("http://www.example.org/part-of"), EntityKind::Class)
            .unwrap();

        let err = merge(&mut target, &source).unwrap_err();
        assert!(matches!(err, RegistryError::IdentityConflict { .. }));
        assert_eq!(target.registry().len(), 1);
        assert!(!target.registry().contains(&Iri::new("http://localhost/B")));
    }

    #[test]
    fn short_name_clash_is_existing_entity() {
        let mut source = onto();
        source
            .registry_mut()
            .declare(Iri::new("http://example.org/A"), EntityKind::Class)
            .unwrap();
        let mut target = onto();
        target
            .registry_mut()
            .declare(Iri::new("http://localhost/A"), EntityKind::Class)
            .unwrap();
        let err = merge(&mut target, &source).unwrap_err();
        assert!(err.is_existing_entity());
    }

    #[test]
    fn target_prefix_wins() {
        let mut source = onto();
        source.registry_mut().add_prefix("http://a.org/", "ex");
        let mut target = onto();
        target.registry_mut().add_prefix("http://b.org/", "ex");
        let report = merge(&mut target, &source).unwrap();
        assert_eq!(report.prefixes_kept, 1);
        assert_eq!(target.registry().prefix("ex:"), Some("http://b.org/"));
    }
}
