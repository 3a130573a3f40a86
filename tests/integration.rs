//! End-to-end tests for the knowledge base.
//!
//! These exercise the full path from declarations and documents through
//! expression resolution, classification and queries, validating that the
//! registry, label index, cache and merge rules work together.

use std::collections::BTreeSet;
use std::path::PathBuf;

use ontokit::cache::CacheState;
use ontokit::config::{ClassificationMode, KbConfig};
use ontokit::entity::EntityKind;
use ontokit::error::{ExpressionError, LabelError, OntoError, RegistryError};
use ontokit::reasoner::ProfileKind;
use ontokit::KnowledgeBase;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn dev() -> KnowledgeBase {
    let config = KbConfig::with_namespace("http://localhost/", "http://localhost/test.owl");
    let mut kb = KnowledgeBase::with_config(config).unwrap();
    kb.learn_document(&fixture("dev.ttl")).unwrap();
    kb
}

// ---------------------------------------------------------------------------
// Named and anonymous hierarchy queries
// ---------------------------------------------------------------------------

#[test]
fn named_sub_class() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("Animal").unwrap();
    kb.add_class("Lion").unwrap();
    kb.add_sub_class_of("Lion", "Animal").unwrap();
    assert!(kb.sub_classes("Animal", false).unwrap().contains("Lion"));
    assert!(kb.super_classes("Lion", true).unwrap().contains("Animal"));
}

#[test]
fn direct_and_indirect_sub_classes() {
    let mut kb = dev();
    assert_eq!(kb.sub_classes("I", true).unwrap(), set(&["J"]));
    assert_eq!(kb.sub_classes("I", false).unwrap(), set(&["J", "R", "Y"]));
    assert_eq!(kb.sub_classes("G", false).unwrap(), set(&["C", "D", "E", "R"]));
}

#[test]
fn super_classes_include_thing() {
    let mut kb = dev();
    assert_eq!(
        kb.super_classes("C", false).unwrap(),
        set(&["D", "E", "G", "Thing"])
    );
    assert_eq!(kb.super_classes("C", true).unwrap(), set(&["D"]));
}

#[test]
fn anonymous_sub_classes() {
    let mut kb = dev();
    assert_eq!(kb.sub_classes("part-of some L", true).unwrap(), set(&["S"]));
    assert_eq!(
        kb.sub_classes("part-of some L", false).unwrap(),
        set(&["Q", "R", "S", "T"])
    );
}

#[test]
fn anonymous_classes_in_new_knowledge_base() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("A").unwrap();
    kb.add_class("B").unwrap();
    kb.add_object_property("part-of").unwrap();
    kb.add_sub_class_of("B", "part-of some A").unwrap();
    assert_eq!(kb.sub_classes("part-of some A", true).unwrap().len(), 1);
}

#[test]
fn undeclared_filler_is_expression_error() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("A").unwrap();
    kb.add_class("B").unwrap();
    kb.add_object_property("part-of").unwrap();
    let err = kb.add_sub_class_of("B", "part-of some C").unwrap_err();
    match err {
        OntoError::Expression(ExpressionError::Unresolved { token, input }) => {
            assert_eq!(token, "C");
            assert_eq!(input, "part-of some C");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!kb.knows_class("C"));
}

#[test]
fn equivalent_classes() {
    let mut kb = dev();
    assert_eq!(kb.equivalent_classes("M").unwrap(), set(&["N"]));
    assert_eq!(kb.equivalent_classes("part-of some M").unwrap(), set(&["O"]));
}

#[test]
fn is_sub_class_and_is_super_class() {
    let mut kb = dev();
    assert!(kb.is_sub_class("D", "Thing", false).unwrap());
    assert!(kb.is_sub_class("Q", "part-of some K", false).unwrap());
    assert!(!kb.is_sub_class("part-of some K", "Q", false).unwrap());

    assert!(kb.is_super_class("Thing", "D", false).unwrap());
    assert!(!kb.is_super_class("Q", "part-of some K", false).unwrap());
    assert!(kb.is_super_class("part-of some K", "Q", false).unwrap());
}

#[test]
fn is_sub_class_mirrors_is_super_class() {
    let mut kb = dev();
    let targets = [
        "C",
        "D",
        "G",
        "K",
        "L",
        "Q",
        "S",
        "T",
        "M",
        "N",
        "Thing",
        "part-of some K",
        "part-of some L",
    ];
    for a in targets {
        for b in targets {
            for direct in [false, true] {
                assert_eq!(
                    kb.is_sub_class(a, b, direct).unwrap(),
                    kb.is_super_class(b, a, direct).unwrap(),
                    "{a} / {b} / direct={direct}"
                );
            }
        }
    }
}

#[test]
fn unsatisfiable_classes() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("A").unwrap();
    kb.add_class("B").unwrap();
    kb.add_class("C").unwrap();
    kb.add_disjoint_classes(&["A", "B"]).unwrap();
    kb.add_sub_class_of("C", "A").unwrap();
    kb.add_sub_class_of("C", "B").unwrap();
    kb.sleep();
    assert_eq!(kb.unsatisfiable_classes().unwrap(), set(&["C"]));
    assert!(!kb.is_satisfiable("C").unwrap());
    assert!(kb.is_satisfiable("A").unwrap());
    kb.sleep();

    let mut kb = dev();
    assert_eq!(kb.unsatisfiable_classes().unwrap(), set(&["R"]));
}

#[test]
fn unsatisfiable_classes_are_equivalent_and_below_everything() {
    let mut kb = KnowledgeBase::new();
    for class in ["A", "B", "C", "D", "X"] {
        kb.add_class(class).unwrap();
    }
    kb.add_disjoint_classes(&["A", "B"]).unwrap();
    kb.add_sub_class_of("C", "A").unwrap();
    kb.add_sub_class_of("C", "B").unwrap();
    kb.add_sub_class_of("D", "A and B").unwrap();

    assert_eq!(kb.unsatisfiable_classes().unwrap(), set(&["C", "D"]));
    assert_eq!(kb.equivalent_classes("C").unwrap(), set(&["D"]));
    assert!(kb.is_sub_class("C", "X", false).unwrap());
    assert!(kb.is_super_class("X", "D", true).unwrap());
    assert!(kb.sub_classes("X", true).unwrap().contains("C"));
    assert!(!kb.is_sub_class("X", "C", false).unwrap());
}

// ---------------------------------------------------------------------------
// Individuals
// ---------------------------------------------------------------------------

#[test]
fn named_individuals() {
    let mut kb = KnowledgeBase::new();
    kb.learn_document(&fixture("individuals.ttl")).unwrap();
    assert_eq!(kb.instances("Human", false).unwrap(), set(&["Joe"]));
    assert!(kb.instances("Human", true).unwrap().is_empty());
    assert_eq!(kb.instances("Fireman", true).unwrap(), set(&["Joe"]));
    assert_eq!(
        kb.instances_from_label("'a human'", false).unwrap(),
        set(&["Joe"])
    );
}

#[test]
fn individuals_declared_in_code() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("City").unwrap();
    kb.add_class("Country").unwrap();
    kb.add_class("Capital").unwrap();
    kb.add_object_property("located-in").unwrap();
    kb.add_individual("paris").unwrap();
    kb.add_individual("france").unwrap();
    kb.add_sub_class_of("Capital", "City").unwrap();
    kb.add_class_assertion("paris", "Capital").unwrap();
    kb.add_class_assertion("france", "Country").unwrap();
    kb.add_property_assertion("paris", "located-in", "france")
        .unwrap();

    assert_eq!(
        kb.instances("located-in some Country", false).unwrap(),
        set(&["paris"])
    );
    assert_eq!(kb.instances("City", false).unwrap(), set(&["paris"]));

    let err = kb.add_class_assertion("City", "Country").unwrap_err();
    assert!(matches!(
        err,
        OntoError::Expression(ExpressionError::WrongKind { .. })
    ));
}

#[test]
fn inconsistent_individual_is_reported() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("A").unwrap();
    kb.add_class("B").unwrap();
    kb.add_individual("x").unwrap();
    kb.add_disjoint_classes(&["A", "B"]).unwrap();
    kb.add_class_assertion("x", "A and B").unwrap();
    let err = kb.sub_classes("A", false).unwrap_err();
    assert!(matches!(
        err,
        OntoError::Reasoner(ontokit::error::ReasonerError::Inconsistent { .. })
    ));
    assert_eq!(kb.cache_state(), CacheState::Dirty);
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[test]
fn querying_a_name_as_label_fails() {
    let mut kb = dev();
    assert_eq!(kb.sub_classes("ID01", false).unwrap(), set(&["R", "W"]));
    let err = kb.sub_classes_from_label("ID011", false).unwrap_err();
    assert!(matches!(err, OntoError::Label(LabelError::NoMatch { .. })));
}

#[test]
fn sub_classes_from_label() {
    let mut kb = dev();
    assert_eq!(
        kb.sub_classes_from_label("animal", false).unwrap(),
        set(&["ID02", "R"])
    );
    assert_eq!(
        kb.sub_classes_from_label("part-of some animal", false).unwrap(),
        set(&["ID01", "R", "W"])
    );
}

#[test]
fn super_classes_from_label() {
    let mut kb = dev();
    assert_eq!(
        kb.super_classes_from_label("animal", false).unwrap(),
        set(&["Thing"])
    );
    assert_eq!(
        kb.super_classes_from_label("part-of some animal", false)
            .unwrap(),
        set(&["Thing"])
    );
}

#[test]
fn equivalent_classes_from_label() {
    let mut kb = dev();
    assert_eq!(
        kb.equivalent_classes_from_label("'pouet pouet'").unwrap(),
        set(&["A"])
    );
    assert_eq!(
        kb.equivalent_classes_from_label("pouet").unwrap(),
        set(&["Z"])
    );
}

fn cats(config: KbConfig) -> KnowledgeBase {
    let mut kb = KnowledgeBase::with_config(config).unwrap();
    for class in ["Cat1", "Cat2", "Sub1", "Sub2", "Shared"] {
        kb.add_class(class).unwrap();
    }
    kb.add_label("Cat1", "cat").unwrap();
    kb.add_label("Cat2", "cat").unwrap();
    kb.add_sub_class_of("Sub1", "Cat1").unwrap();
    kb.add_sub_class_of("Sub2", "Cat2").unwrap();
    kb.add_sub_class_of("Shared", "Cat1").unwrap();
    kb.add_sub_class_of("Shared", "Cat2").unwrap();
    kb
}

#[test]
fn shared_label_unions_sub_classes() {
    let mut kb = cats(KbConfig::default());
    let mut union = kb.sub_classes("Cat1", false).unwrap();
    union.extend(kb.sub_classes("Cat2", false).unwrap());
    let subs = kb.sub_classes_from_label("cat", false).unwrap();
    assert_eq!(subs, union);
    assert_eq!(subs, set(&["Shared", "Sub1", "Sub2"]));
    assert_eq!(
        kb.sub_classes_from_label("cat", true).unwrap(),
        set(&["Shared", "Sub1", "Sub2"])
    );
    assert_eq!(
        kb.super_classes_from_label("cat", true).unwrap(),
        set(&["Thing"])
    );

    kb.add_individual("tom").unwrap();
    kb.add_individual("felix").unwrap();
    kb.add_class_assertion("tom", "Sub1").unwrap();
    kb.add_class_assertion("felix", "Cat2").unwrap();
    assert_eq!(
        kb.instances_from_label("cat", false).unwrap(),
        set(&["felix", "tom"])
    );
    assert_eq!(kb.instances_from_label("cat", true).unwrap(), set(&["felix"]));
}

#[test]
fn shared_label_inside_an_expression_is_a_disjunction() {
    let mut kb = cats(KbConfig::default());
    kb.add_object_property("part-of").unwrap();
    kb.add_class("Tail").unwrap();
    kb.add_class("Whisker").unwrap();
    kb.add_sub_class_of("Tail", "part-of some Sub1").unwrap();
    kb.add_sub_class_of("Whisker", "part-of some Cat2").unwrap();
    assert_eq!(
        kb.sub_classes_from_label("part-of some cat", false).unwrap(),
        set(&["Tail", "Whisker"])
    );
}

#[test]
fn shared_label_under_reject_and_first_policies() {
    let config = KbConfig::from_toml_str("label_ambiguity = \"reject\"").unwrap();
    let mut kb = cats(config);
    let err = kb.sub_classes_from_label("cat", false).unwrap_err();
    match err {
        OntoError::Label(LabelError::Ambiguous { count, .. }) => assert_eq!(count, 2),
        other => panic!("unexpected error: {other:?}"),
    }

    let config = KbConfig::from_toml_str("label_ambiguity = \"first\"").unwrap();
    let mut kb = cats(config);
    assert_eq!(
        kb.sub_classes_from_label("cat", false).unwrap(),
        set(&["Shared", "Sub1"])
    );
}

// ---------------------------------------------------------------------------
// Annotations and entity lookup
// ---------------------------------------------------------------------------

#[test]
fn annotation_accessors() {
    let kb = dev();
    assert_eq!(kb.label("A").unwrap(), "pouet");
    assert_eq!(kb.comment("A").unwrap(), "comment attached to the class");
    assert_eq!(kb.is_defined_by("A").unwrap(), "something");
    assert_eq!(kb.see_also("A").unwrap(), "bar");
    assert_eq!(kb.annotation("A", "testing").unwrap(), "whatever");
}

#[test]
fn annotation_values_are_unordered() {
    let kb = dev();
    let mut values = kb.annotations("G", "testing").unwrap();
    values.sort();
    assert_eq!(values, vec!["value1".to_string(), "value2".to_string()]);
}

#[test]
fn annotations_added_in_code() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("Lion").unwrap();
    kb.add_annotation_property("source").unwrap();
    kb.add_comment("Lion", "a big cat").unwrap();
    kb.annotate(
        "Lion",
        "source",
        ontokit::axiom::AnnotationValue::literal("zoo guide"),
    )
    .unwrap();
    kb.add_label("Lion", "lion").unwrap();
    assert_eq!(kb.comment("Lion").unwrap(), "a big cat");
    assert_eq!(kb.annotation("Lion", "source").unwrap(), "zoo guide");
    assert_eq!(kb.label("Lion").unwrap(), "lion");
    assert_eq!(
        kb.super_classes_from_label("lion", false).unwrap(),
        set(&["Thing"])
    );
}

#[test]
fn knows_entities() {
    let kb = dev();
    assert!(kb.knows_class("M"));
    assert!(!kb.knows_class("POUET"));
    assert!(kb.knows_object_property("part-of"));
    assert!(!kb.knows_data_property("age"));
    assert!(kb.knows_annotation_property("testing"));
    assert!(!kb.knows_individual("M"));
}

#[test]
fn top_class_always_resolves() {
    let kb = KnowledgeBase::new();
    let thing = kb.entity("Thing").unwrap();
    assert_eq!(thing.kind, EntityKind::TopClass);
    assert_eq!(kb.entity("owl:Thing").unwrap(), thing);
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[test]
fn el_profile() {
    let mut kb = dev();
    assert!(kb.has_profile(ProfileKind::El));
    assert!(kb.profile_violations(ProfileKind::El).is_empty());

    kb.add_sub_class_of("A", "C or D").unwrap();
    assert!(!kb.has_profile(ProfileKind::El));
    let violations = kb.profile_violations(ProfileKind::El);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].construct, "ObjectUnionOf");
}

// ---------------------------------------------------------------------------
// Cache lifecycle
// ---------------------------------------------------------------------------

#[test]
fn restart_after_sleep() {
    let mut kb = dev();
    kb.sleep();
    assert_eq!(kb.cache_state(), CacheState::Asleep);
    assert_eq!(kb.sub_classes("I", false).unwrap().len(), 2);
    assert_eq!(kb.cache_state(), CacheState::Clean);
}

#[test]
fn sleep_between_identical_queries() {
    let mut kb = dev();
    let before = kb.sub_classes("part-of some L", false).unwrap();
    kb.sleep();
    kb.sleep();
    assert!(!kb.is_awake());
    let after = kb.sub_classes("part-of some L", false).unwrap();
    assert_eq!(before, after);
}

#[test]
fn explicit_classify() {
    let mut kb = dev();
    let nodes = kb.classify().unwrap().node_count();
    assert!(nodes > 0);
    assert_eq!(kb.cache_state(), CacheState::Clean);
}

#[test]
fn mutation_while_asleep_stays_asleep() {
    let mut kb = dev();
    kb.classify().unwrap();
    kb.sleep();
    kb.add_class("Fresh").unwrap();
    assert_eq!(kb.cache_state(), CacheState::Asleep);
    assert!(kb.sub_classes("Thing", true).unwrap().contains("Fresh"));
}

#[test]
fn eager_mode_classifies_on_mutation() {
    let mut kb = KnowledgeBase::new();
    assert_eq!(kb.classification_mode(), ClassificationMode::Lazy);
    kb.add_class("Animal").unwrap();
    assert_eq!(kb.cache_state(), CacheState::Dirty);

    kb.set_classification_mode(ClassificationMode::Eager);
    assert_eq!(kb.classification_mode(), ClassificationMode::Eager);
    kb.add_class("Lion").unwrap();
    kb.add_sub_class_of("Lion", "Animal").unwrap();
    assert_eq!(kb.cache_state(), CacheState::Clean);

    kb.sleep();
    kb.add_class("Tiger").unwrap();
    assert_eq!(kb.cache_state(), CacheState::Asleep);
}

// ---------------------------------------------------------------------------
// Learning
// ---------------------------------------------------------------------------

#[test]
fn prefixes_and_learn() {
    let mut other = KnowledgeBase::new();
    other.add_class("http://whatever.com/TEST_A").unwrap();
    other.add_prefix("http://whatever.com/", "whatever");

    let mut kb = dev();
    kb.add_prefix("http://www.example.org/", "example");
    kb.learn(&other).unwrap();
    assert_eq!(kb.prefix("whatever:"), Some("http://whatever.com/"));
    assert_eq!(kb.prefix("example:"), Some("http://www.example.org/"));
    assert!(kb.knows_class("whatever:TEST_A"));
}

#[test]
fn learn_from_other_knowledge_base() {
    let mut source = KnowledgeBase::new();
    source.add_class("A").unwrap();
    let mut kb = KnowledgeBase::new();
    let report = kb.learn(&source).unwrap();
    assert_eq!(report.entities_added, 1);
    assert!(kb.entity("A").is_ok());
}

#[test]
fn learn_rejects_short_name_clash() {
    let mut source = KnowledgeBase::new();
    source.add_class("http://example.org/A").unwrap();
    source.add_class("B").unwrap();
    let mut kb = KnowledgeBase::new();
    kb.add_class("A").unwrap();

    let err = kb.learn(&source).unwrap_err();
    match &err {
        OntoError::Registry(inner) => assert!(inner.is_existing_entity()),
        other => panic!("unexpected error: {other:?}"),
    }
    // Nothing from the source was applied.
    assert!(!kb.knows_class("B"));
    assert_eq!(kb.ontology().registry().len(), 1);
}

#[test]
fn learn_supports_identical_iris() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("http://www.example.org/N").unwrap();
    let report = kb.learn_document(&fixture("dev.ttl")).unwrap();
    assert_eq!(report.entities_unified, 1);

    let err = kb.add_class("M").unwrap_err();
    assert!(matches!(
        err,
        OntoError::Registry(RegistryError::ShortNameTaken { .. })
    ));
}

#[test]
fn learn_rejects_identical_iri_with_other_kind() {
    let mut kb = KnowledgeBase::new();
    kb.add_class("http://www.example.org/part-of").unwrap();
    let err = kb.learn_document(&fixture("dev.ttl")).unwrap_err();
    assert!(matches!(
        err,
        OntoError::Registry(RegistryError::IdentityConflict { .. })
    ));
    assert_eq!(kb.ontology().registry().len(), 1);
    assert!(kb.ontology().axioms().is_empty());
}

#[test]
fn learned_labels_are_indexed() {
    let mut kb = KnowledgeBase::new();
    kb.learn_document(&fixture("dev.ttl")).unwrap();
    assert_eq!(
        kb.sub_classes_from_label("animal", true).unwrap(),
        set(&["ID02"])
    );
}

#[test]
fn export_to_json() {
    let mut kb = dev();
    let export = kb.export().unwrap();
    assert_eq!(
        export.unsatisfiable,
        vec!["http://www.example.org/R".to_string()]
    );
    let json = export.to_json().unwrap();
    assert!(json.contains("\"pouet pouet\""));
}
