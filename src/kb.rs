//! The knowledge base: one ontology, its label index, and its classification.
//!
//! [`KnowledgeBase`] is the entry point for callers. It owns the entity
//! registry and axioms (through [`Ontology`]), the [`LabelIndex`] derived from
//! label annotations, and the [`ClassificationCache`] holding the reasoner
//! handle. Every successful mutation marks the cache dirty and keeps the label
//! index current; every query resolves its target once, then reads the
//! classification.
//!
//! Names in the API are resolved the same way everywhere: a full IRI, a
//! `prefix:local` form, or a bare local name (default namespace first, then
//! the short-name index). Query targets may also be class expressions such as
//! `part-of some Animal`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::axiom::{AnnotationValue, Axiom, Ontology, is_builtin_annotation};
use crate::cache::{CacheState, ClassificationCache};
use crate::codec::{DocumentSource, OntologyCodec, RdfCodec, RdfFormat};
use crate::config::{ClassificationMode, KbConfig};
use crate::entity::{Entity, EntityKind, Iri, vocab};
use crate::error::{AnnotationError, ExpressionError, OntoError, OntoResult, RegistryError};
use crate::export::ClassificationExport;
use crate::expression::{self, ClassExpression, LabelResolver, NameResolver};
use crate::label::LabelIndex;
use crate::merge::{self, MergeReport};
use crate::query::{Placement, QueryTarget, short_names};
use crate::reasoner::{
    Classification, ElProfileChecker, ElReasonerFactory, ProfileChecker, ProfileKind,
    ProfileViolation, ReasonerFactory,
};
use crate::registry::DeclareOutcome;

/// A description-logic knowledge base with cached classification.
pub struct KnowledgeBase {
    config: KbConfig,
    ontology: Ontology,
    labels: LabelIndex,
    label_property: Iri,
    cache: ClassificationCache,
    profile: Box<dyn ProfileChecker>,
    codec: Box<dyn OntologyCodec>,
}

impl fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("namespace", &self.config.default_namespace)
            .field("ontology_iri", &self.ontology.iri())
            .field("entities", &self.ontology.registry().len())
            .field("axioms", &self.ontology.axioms().len())
            .field("labels", &self.labels.len())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// An empty knowledge base with the default configuration and the
    /// built-in EL reasoner.
    pub fn new() -> Self {
        Self::assemble(
            KbConfig::default(),
            Arc::new(ElReasonerFactory),
            Box::new(ElProfileChecker),
            Box::new(RdfCodec),
        )
    }

    /// An empty knowledge base with a validated configuration.
    pub fn with_config(config: KbConfig) -> OntoResult<Self> {
        Self::with_reasoner(config, Arc::new(ElReasonerFactory))
    }

    /// An empty knowledge base using a custom reasoning backend.
    pub fn with_reasoner(config: KbConfig, factory: Arc<dyn ReasonerFactory>) -> OntoResult<Self> {
        Self::with_components(config, factory, Box::new(ElProfileChecker), Box::new(RdfCodec))
    }

    /// An empty knowledge base with every collaborator supplied by the caller.
    pub fn with_components(
        config: KbConfig,
        factory: Arc<dyn ReasonerFactory>,
        profile: Box<dyn ProfileChecker>,
        codec: Box<dyn OntologyCodec>,
    ) -> OntoResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, factory, profile, codec))
    }

    /// Load the configuration from a TOML file.
    pub fn from_config_file(path: &Path) -> OntoResult<Self> {
        Self::with_config(KbConfig::load(path)?)
    }

    fn assemble(
        config: KbConfig,
        factory: Arc<dyn ReasonerFactory>,
        profile: Box<dyn ProfileChecker>,
        codec: Box<dyn OntologyCodec>,
    ) -> Self {
        let ontology = Ontology::new(config.default_namespace.as_str())
            .with_iri(config.ontology_iri.as_deref().map(Iri::new));
        tracing::debug!(
            namespace = %config.default_namespace,
            reasoner = factory.name(),
            mode = ?config.classification,
            "created knowledge base"
        );
        Self {
            label_property: Iri::new(config.label_property.as_str()),
            cache: ClassificationCache::new(factory, config.classification),
            labels: LabelIndex::new(),
            ontology,
            profile,
            codec,
            config,
        }
    }

    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    pub fn classification_mode(&self) -> ClassificationMode {
        self.cache.mode()
    }

    /// Switch between lazy and eager classification. Takes effect at the
    /// next mutation.
    pub fn set_classification_mode(&mut self, mode: ClassificationMode) {
        self.config.classification = mode;
        self.cache.set_mode(mode);
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    /// Declare an entity. Redeclaring with the same kind is a no-op; with a
    /// different kind it is an identity conflict.
    pub fn declare(&mut self, name: &str, kind: EntityKind) -> OntoResult<Entity> {
        let iri = self.ontology.registry().resolve_iri(name)?;
        if self.ontology.registry_mut().declare(iri.clone(), kind)? == DeclareOutcome::Declared {
            self.touched();
        }
        Ok(self.ontology.registry().get(&iri).unwrap_or_else(|| Entity::new(iri, kind)))
    }

    fn declare_new(&mut self, name: &str, kind: EntityKind) -> OntoResult<Entity> {
        let iri = self.ontology.registry().resolve_iri(name)?;
        let entity = self.ontology.registry_mut().declare_new(iri, kind)?;
        self.touched();
        Ok(entity)
    }

    /// Declare a new class; fails with an existing-entity error if the name
    /// (or its short name) is taken.
    pub fn add_class(&mut self, name: &str) -> OntoResult<Entity> {
        self.declare_new(name, EntityKind::Class)
    }

    pub fn add_object_property(&mut self, name: &str) -> OntoResult<Entity> {
        self.declare_new(name, EntityKind::ObjectProperty)
    }

    pub fn add_data_property(&mut self, name: &str) -> OntoResult<Entity> {
        self.declare_new(name, EntityKind::DataProperty)
    }

    pub fn add_annotation_property(&mut self, name: &str) -> OntoResult<Entity> {
        self.declare_new(name, EntityKind::AnnotationProperty)
    }

    pub fn add_individual(&mut self, name: &str) -> OntoResult<Entity> {
        self.declare_new(name, EntityKind::Individual)
    }

    pub fn knows_class(&self, name: &str) -> bool {
        self.knows(name, EntityKind::Class)
    }

    pub fn knows_object_property(&self, name: &str) -> bool {
        self.knows(name, EntityKind::ObjectProperty)
    }

    pub fn knows_data_property(&self, name: &str) -> bool {
        self.knows(name, EntityKind::DataProperty)
    }

    pub fn knows_annotation_property(&self, name: &str) -> bool {
        self.knows(name, EntityKind::AnnotationProperty)
    }

    pub fn knows_individual(&self, name: &str) -> bool {
        self.knows(name, EntityKind::Individual)
    }

    fn knows(&self, name: &str, kind: EntityKind) -> bool {
        self.ontology.registry().knows(name, kind)
    }

    /// The entity a name denotes.
    pub fn entity(&self, name: &str) -> OntoResult<Entity> {
        Ok(self.ontology.registry().resolve_name(name)?)
    }

    // -----------------------------------------------------------------------
    // Prefixes
    // -----------------------------------------------------------------------

    pub fn add_prefix(&mut self, namespace: &str, short_form: &str) {
        self.ontology.registry_mut().add_prefix(namespace, short_form);
    }

    pub fn prefix(&self, short_form: &str) -> Option<&str> {
        self.ontology.registry().prefix(short_form)
    }

    // -----------------------------------------------------------------------
    // Axioms
    // -----------------------------------------------------------------------

    /// Parse a class expression whose leaves are entity names.
    pub fn parse_expression(&self, text: &str) -> OntoResult<ClassExpression> {
        Ok(expression::parse(text, &NameResolver::new(self.ontology.registry()))?)
    }

    /// Parse a class expression whose leaves are labels.
    pub fn parse_label_expression(&self, text: &str) -> OntoResult<ClassExpression> {
        let resolver = LabelResolver::new(
            self.ontology.registry(),
            &self.labels,
            self.config.label_ambiguity,
        );
        expression::parse(text, &resolver).map_err(|err| match err {
            ExpressionError::Label(label) => OntoError::Label(label),
            other => other.into(),
        })
    }

    pub fn add_sub_class_of(&mut self, sub: &str, sup: &str) -> OntoResult<bool> {
        let axiom = Axiom::sub_class_of(self.parse_expression(sub)?, self.parse_expression(sup)?);
        self.assert_axiom(axiom)
    }

    pub fn add_equivalent_classes(&mut self, first: &str, second: &str) -> OntoResult<bool> {
        let axiom = Axiom::EquivalentClasses(vec![
            self.parse_expression(first)?,
            self.parse_expression(second)?,
        ]);
        self.assert_axiom(axiom)
    }

    /// Declare the given class expressions pairwise disjoint.
    pub fn add_disjoint_classes(&mut self, classes: &[&str]) -> OntoResult<bool> {
        if classes.len() < 2 {
            return Err(ExpressionError::Syntax {
                message: "disjointness needs at least two class expressions".into(),
                input: classes.join(", "),
            }
            .into());
        }
        let ops = classes
            .iter()
            .map(|text| self.parse_expression(text))
            .collect::<OntoResult<Vec<_>>>()?;
        self.assert_axiom(Axiom::DisjointClasses(ops))
    }

    /// Assert that an individual belongs to a class expression.
    pub fn add_class_assertion(&mut self, individual: &str, class: &str) -> OntoResult<bool> {
        let individual = self.expect_kind(individual, EntityKind::Individual, "individual")?;
        let class = self.parse_expression(class)?;
        self.assert_axiom(Axiom::ClassAssertion { individual, class })
    }

    /// Assert `property(subject, object)` between two individuals.
    pub fn add_property_assertion(
        &mut self,
        subject: &str,
        property: &str,
        object: &str,
    ) -> OntoResult<bool> {
        let axiom = Axiom::PropertyAssertion {
            subject: self.expect_kind(subject, EntityKind::Individual, "individual")?,
            property: self.expect_kind(property, EntityKind::ObjectProperty, "object property")?,
            object: self.expect_kind(object, EntityKind::Individual, "individual")?,
        };
        self.assert_axiom(axiom)
    }

    pub fn add_sub_property_of(&mut self, sub: &str, sup: &str) -> OntoResult<bool> {
        let axiom = Axiom::SubObjectPropertyOf {
            sub: self.expect_kind(sub, EntityKind::ObjectProperty, "object property")?,
            sup: self.expect_kind(sup, EntityKind::ObjectProperty, "object property")?,
        };
        self.assert_axiom(axiom)
    }

    /// Add one axiom. Returns `false` if it was already present.
    pub fn assert_axiom(&mut self, axiom: Axiom) -> OntoResult<bool> {
        self.ontology.check_axiom(&axiom)?;
        self.labels.observe(&axiom, &self.label_property);
        let added = self.ontology.add_axiom(axiom)?;
        if added {
            self.touched();
        }
        Ok(added)
    }

    /// Add several axioms atomically. Returns how many were new.
    pub fn assert_axioms(&mut self, axioms: Vec<Axiom>) -> OntoResult<usize> {
        for axiom in &axioms {
            self.ontology.check_axiom(axiom)?;
        }
        for axiom in &axioms {
            self.labels.observe(axiom, &self.label_property);
        }
        let added = self.ontology.add_axioms(axioms)?;
        if added > 0 {
            self.touched();
        }
        Ok(added)
    }

    fn expect_kind(&self, name: &str, kind: EntityKind, expected: &str) -> OntoResult<Iri> {
        let entity = self.ontology.registry().resolve_name(name)?;
        if entity.kind == kind {
            Ok(entity.iri)
        } else {
            Err(ExpressionError::WrongKind {
                token: name.to_string(),
                expected: expected.to_string(),
                actual: entity.kind,
                input: name.to_string(),
            }
            .into())
        }
    }

    /// A mutation happened: drop the classification (or, in eager mode,
    /// recompute it).
    fn touched(&mut self) {
        self.cache.invalidate(&self.ontology);
    }

    // -----------------------------------------------------------------------
    // Annotations
    // -----------------------------------------------------------------------

    /// Attach an annotation to an entity. `property` must be a declared
    /// annotation property or one of the RDFS annotation properties.
    pub fn annotate(
        &mut self,
        entity: &str,
        property: &str,
        value: AnnotationValue,
    ) -> OntoResult<bool> {
        let subject = self.ontology.registry().resolve_name(entity)?.iri;
        let property = self.annotation_property(property)?;
        self.assert_axiom(Axiom::AnnotationAssertion {
            subject,
            property,
            value,
        })
    }

    pub fn add_label(&mut self, entity: &str, label: &str) -> OntoResult<bool> {
        let property = self.label_property.as_str().to_string();
        self.annotate(entity, &property, AnnotationValue::literal(label))
    }

    pub fn add_comment(&mut self, entity: &str, comment: &str) -> OntoResult<bool> {
        self.annotate(entity, vocab::RDFS_COMMENT, AnnotationValue::literal(comment))
    }

    pub fn label(&self, entity: &str) -> OntoResult<String> {
        let property = self.label_property.as_str().to_string();
        self.annotation(entity, &property)
    }

    pub fn comment(&self, entity: &str) -> OntoResult<String> {
        self.annotation(entity, vocab::RDFS_COMMENT)
    }

    pub fn is_defined_by(&self, entity: &str) -> OntoResult<String> {
        self.annotation(entity, vocab::RDFS_IS_DEFINED_BY)
    }

    pub fn see_also(&self, entity: &str) -> OntoResult<String> {
        self.annotation(entity, vocab::RDFS_SEE_ALSO)
    }

    /// One value of `property` on `entity`; an error when there is none.
    ///
    /// With several values, the lexicographically smallest is returned.
    pub fn annotation(&self, entity: &str, property: &str) -> OntoResult<String> {
        let values = self.annotations(entity, property)?;
        values
            .into_iter()
            .min()
            .ok_or_else(|| {
                AnnotationError::Missing {
                    entity: entity.to_string(),
                    property: property.to_string(),
                }
                .into()
            })
    }

    /// Every value of `property` on `entity`, in no particular order.
    pub fn annotations(&self, entity: &str, property: &str) -> OntoResult<Vec<String>> {
        let subject = self.ontology.registry().resolve_name(entity)?.iri;
        let property = self.annotation_property(property)?;
        Ok(self
            .ontology
            .annotation_values(&subject, &property)
            .map(|value| value.as_text().to_string())
            .collect())
    }

    fn annotation_property(&self, text: &str) -> OntoResult<Iri> {
        let registry = self.ontology.registry();
        if let Some(entity) = registry.lookup(text) {
            if entity.kind == EntityKind::AnnotationProperty {
                return Ok(entity.iri);
            }
            return Err(ExpressionError::WrongKind {
                token: text.to_string(),
                expected: "annotation property".into(),
                actual: entity.kind,
                input: text.to_string(),
            }
            .into());
        }
        let iri = registry.resolve_iri(text)?;
        if is_builtin_annotation(&iri) {
            Ok(iri)
        } else {
            Err(RegistryError::UnknownEntity {
                name: text.trim().to_string(),
            }
            .into())
        }
    }

    // -----------------------------------------------------------------------
    // Query targets
    // -----------------------------------------------------------------------

    /// Resolve a query argument: a known class name, or else a class
    /// expression over entity names.
    pub fn resolve_target(&self, text: &str) -> OntoResult<QueryTarget> {
        let registry = self.ontology.registry();
        if let Some(entity) = registry.lookup(text) {
            if entity.kind.is_class() {
                return Ok(QueryTarget::Named(entity));
            }
        }
        let expression = self.parse_expression(text)?;
        Ok(QueryTarget::from_expression(expression, registry))
    }

    fn shared_label(&self, text: &str) -> Option<Vec<Iri>> {
        LabelResolver::new(
            self.ontology.registry(),
            &self.labels,
            self.config.label_ambiguity,
        )
        .shared_label(text)
    }

    /// Resolve a query argument whose leaves are labels.
    pub fn resolve_label_target(&self, text: &str) -> OntoResult<QueryTarget> {
        let expression = self.parse_label_expression(text)?;
        Ok(QueryTarget::from_expression(expression, self.ontology.registry()))
    }

    fn place<T>(
        &mut self,
        target: QueryTarget,
        read: impl FnOnce(&Placement, &Classification) -> T,
    ) -> OntoResult<T> {
        let placement = match target {
            QueryTarget::Named(entity) => Placement::Named(entity.iri),
            QueryTarget::Anonymous(expression) => Placement::Anonymous(
                self.cache.classify_expression(&self.ontology, &expression)?,
            ),
        };
        let classification = self.cache.ensure(&self.ontology)?;
        Ok(read(&placement, classification))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Subclasses of a class or class expression: the direct children, or
    /// every strict subclass.
    pub fn sub_classes(&mut self, target: &str, direct: bool) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_target(target)?;
        self.sub_classes_of(target, direct)
    }

    pub fn super_classes(&mut self, target: &str, direct: bool) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_target(target)?;
        self.super_classes_of(target, direct)
    }

    pub fn equivalent_classes(&mut self, target: &str) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_target(target)?;
        self.equivalent_classes_of(target)
    }

    pub fn instances(&mut self, target: &str, direct: bool) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_target(target)?;
        self.instances_of(target, direct)
    }

    /// Whether the target can have instances.
    pub fn is_satisfiable(&mut self, target: &str) -> OntoResult<bool> {
        let target = self.resolve_target(target)?;
        self.place(target, |placement, classification| match placement {
            Placement::Named(iri) => classification.is_satisfiable(iri),
            Placement::Anonymous(node) => node.satisfiable,
        })
    }

    /// Whether `sub` is a named class below `sup`. An anonymous `sub` is
    /// never a subclass.
    pub fn is_sub_class(&mut self, sub: &str, sup: &str, direct: bool) -> OntoResult<bool> {
        let sub = self.resolve_target(sub)?;
        let sup = self.resolve_target(sup)?;
        self.is_below(sub, sup, direct)
    }

    /// Whether `sub` is a named class below `sup`; the mirror of
    /// [`Self::is_sub_class`].
    pub fn is_super_class(&mut self, sup: &str, sub: &str, direct: bool) -> OntoResult<bool> {
        let sup = self.resolve_target(sup)?;
        let sub = self.resolve_target(sub)?;
        self.is_below(sub, sup, direct)
    }

    fn is_below(&mut self, sub: QueryTarget, sup: QueryTarget, direct: bool) -> OntoResult<bool> {
        let Some(sub) = sub.named_iri().cloned() else {
            return Ok(false);
        };
        self.place(sup, |placement, classification| {
            placement.sub_classes(classification, direct).contains(&sub)
        })
    }

    /// Subclasses of a label expression. A label shared by several classes
    /// answers with the union of their subclasses.
    pub fn sub_classes_from_label(
        &mut self,
        target: &str,
        direct: bool,
    ) -> OntoResult<BTreeSet<String>> {
        if let Some(classes) = self.shared_label(target) {
            let classification = self.cache.ensure(&self.ontology)?;
            let subs: BTreeSet<Iri> = classes
                .iter()
                .flat_map(|class| classification.sub_classes(class, direct))
                .collect();
            return Ok(short_names(&subs));
        }
        let target = self.resolve_label_target(target)?;
        self.sub_classes_of(target, direct)
    }

    pub fn super_classes_from_label(
        &mut self,
        target: &str,
        direct: bool,
    ) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_label_target(target)?;
        self.super_classes_of(target, direct)
    }

    pub fn equivalent_classes_from_label(&mut self, target: &str) -> OntoResult<BTreeSet<String>> {
        let target = self.resolve_label_target(target)?;
        self.equivalent_classes_of(target)
    }

    /// Instances of a label expression; a shared label answers with the
    /// union of each class's instances.
    pub fn instances_from_label(
        &mut self,
        target: &str,
        direct: bool,
    ) -> OntoResult<BTreeSet<String>> {
        if let Some(classes) = self.shared_label(target) {
            let classification = self.cache.ensure(&self.ontology)?;
            let instances: BTreeSet<Iri> = classes
                .iter()
                .flat_map(|class| classification.instances(class, direct))
                .collect();
            return Ok(short_names(&instances));
        }
        let target = self.resolve_label_target(target)?;
        self.instances_of(target, direct)
    }

    pub fn sub_classes_of(&mut self, target: QueryTarget, direct: bool) -> OntoResult<BTreeSet<String>> {
        self.place(target, |p, c| short_names(&p.sub_classes(c, direct)))
    }

    pub fn super_classes_of(&mut self, target: QueryTarget, direct: bool) -> OntoResult<BTreeSet<String>> {
        self.place(target, |p, c| short_names(&p.super_classes(c, direct)))
    }

    pub fn equivalent_classes_of(&mut self, target: QueryTarget) -> OntoResult<BTreeSet<String>> {
        self.place(target, |p, c| short_names(&p.equivalent_classes(c)))
    }

    pub fn instances_of(&mut self, target: QueryTarget, direct: bool) -> OntoResult<BTreeSet<String>> {
        self.place(target, |p, c| short_names(&p.instances(c, direct)))
    }

    /// Named classes that can have no instances.
    pub fn unsatisfiable_classes(&mut self) -> OntoResult<BTreeSet<String>> {
        let classification = self.cache.ensure(&self.ontology)?;
        Ok(short_names(classification.unsatisfiable()))
    }

    // -----------------------------------------------------------------------
    // Classification lifecycle
    // -----------------------------------------------------------------------

    /// Classify now, whatever the cache state.
    pub fn classify(&mut self) -> OntoResult<&Classification> {
        Ok(self.cache.classify(&self.ontology)?)
    }

    /// Release the reasoner. Axioms are kept; the next query wakes it.
    pub fn sleep(&mut self) {
        self.cache.sleep();
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    pub fn is_awake(&self) -> bool {
        self.cache.is_awake()
    }

    /// Serializable view of the current classification.
    pub fn export(&mut self) -> OntoResult<ClassificationExport> {
        let classification = self.cache.ensure(&self.ontology)?;
        Ok(ClassificationExport::new(classification, &self.labels))
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub fn has_profile(&self, kind: ProfileKind) -> bool {
        self.profile.check(&self.ontology, kind).is_satisfied()
    }

    pub fn profile_violations(&self, kind: ProfileKind) -> Vec<ProfileViolation> {
        self.profile.check(&self.ontology, kind).violations
    }

    // -----------------------------------------------------------------------
    // Learning and persistence
    // -----------------------------------------------------------------------

    /// Merge another knowledge base into this one. Atomic: on any conflict
    /// nothing changes.
    pub fn learn(&mut self, other: &KnowledgeBase) -> OntoResult<MergeReport> {
        self.absorb(&other.ontology)
    }

    /// Merge an ontology document (format from the file extension).
    pub fn learn_document(&mut self, path: &Path) -> OntoResult<MergeReport> {
        let loaded = self.codec.load(DocumentSource::Path(path.to_path_buf()))?;
        let source = loaded.into_ontology(&self.config.default_namespace)?;
        self.absorb(&source)
    }

    /// Merge an in-memory ontology document.
    pub fn learn_bytes(&mut self, data: &[u8], format: RdfFormat) -> OntoResult<MergeReport> {
        let loaded = self.codec.load(DocumentSource::Bytes {
            data: data.to_vec(),
            format,
        })?;
        let source = loaded.into_ontology(&self.config.default_namespace)?;
        self.absorb(&source)
    }

    /// A new knowledge base holding one document.
    pub fn load(path: &Path, config: KbConfig) -> OntoResult<Self> {
        let mut kb = Self::with_config(config)?;
        kb.learn_document(path)?;
        Ok(kb)
    }

    /// Write the ontology as a document (format from the file extension).
    pub fn save(&self, path: &Path) -> OntoResult<()> {
        Ok(self.codec.save(&self.ontology, path)?)
    }

    fn absorb(&mut self, source: &Ontology) -> OntoResult<MergeReport> {
        let report = merge::merge(&mut self.ontology, source)?;
        self.labels = LabelIndex::rebuild(self.ontology.axioms(), &self.label_property);
        self.touched();
        Ok(report)
    }
}
