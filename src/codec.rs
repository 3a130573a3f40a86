//! Ontology documents: RDF serializations of OWL, read and written through
//! oxigraph's parsers and serializers.
//!
//! Reading streams the document through an [`RdfParser`], indexes its
//! triples, and maps the OWL 2 RDF vocabulary back onto entities and axioms.
//! Prefixes are the ones the parser actually bound.
//! Writing goes the other way through an [`RdfSerializer`].
//!
//! Supported mapping:
//!
//! | RDF | OWL |
//! |-----|-----|
//! | `x rdf:type owl:Class` (and the property / individual types) | declaration |
//! | `a rdfs:subClassOf b` | `SubClassOf` |
//! | `a owl:equivalentClass b` | `EquivalentClasses` |
//! | `a owl:disjointWith b`, `owl:AllDisjointClasses` | `DisjointClasses` |
//! | `i rdf:type C` | `ClassAssertion` |
//! | `i p j` with `p` an object property | `ObjectPropertyAssertion` |
//! | `x p v` with `p` an annotation property | `AnnotationAssertion` |
//! | `p rdfs:subPropertyOf q` | `SubObjectPropertyOf` |
//! | `owl:Restriction` + `owl:someValuesFrom` / `owl:allValuesFrom` | `some` / `only` |
//! | `owl:intersectionOf` / `owl:unionOf` / `owl:complementOf` | `and` / `or` / `not` |
//!
//! Entities used in class or property positions without a declaration are
//! declared implicitly with the kind their position requires.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use oxigraph::io::{RdfFormat as OxFormat, RdfParser, RdfSerializer};
use oxigraph::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use serde::{Deserialize, Serialize};

use crate::axiom::{AnnotationValue, Axiom, Ontology, is_builtin_annotation};
use crate::entity::{Entity, EntityKind, Iri, vocab};
use crate::error::{CodecError, OntoResult};
use crate::expression::ClassExpression;

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Blank-node nesting deeper than this is treated as a cycle.
const MAX_EXPRESSION_DEPTH: usize = 64;

mod term {
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

    pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
    pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";

    pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    pub const OWL_TRANSITIVE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#TransitiveProperty";
    pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
    pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";
    pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
    pub const OWL_RESTRICTION: &str = "http://www.w3.org/2002/07/owl#Restriction";
    pub const OWL_ALL_DISJOINT_CLASSES: &str = "http://www.w3.org/2002/07/owl#AllDisjointClasses";
    pub const OWL_MEMBERS: &str = "http://www.w3.org/2002/07/owl#members";
    pub const OWL_ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
    pub const OWL_SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";
    pub const OWL_ALL_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#allValuesFrom";
    pub const OWL_INTERSECTION_OF: &str = "http://www.w3.org/2002/07/owl#intersectionOf";
    pub const OWL_UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";
    pub const OWL_COMPLEMENT_OF: &str = "http://www.w3.org/2002/07/owl#complementOf";
    pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
    pub const OWL_DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
}

// ---------------------------------------------------------------------------
// Formats and sources
// ---------------------------------------------------------------------------

/// Serializations the codec reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl RdfFormat {
    /// Pick a format from a file extension (`ttl`, `nt`, `owl`, `rdf`, `xml`).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "owl" | "rdf" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> CodecResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| CodecError::Parse {
                message: format!(
                    "cannot infer the serialization of {} from its extension",
                    path.display()
                ),
            })
    }

    fn oxigraph(self) -> OxFormat {
        match self {
            RdfFormat::Turtle => OxFormat::Turtle,
            RdfFormat::NTriples => OxFormat::NTriples,
            RdfFormat::RdfXml => OxFormat::RdfXml,
        }
    }
}

/// Where a document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A file; the format follows its extension.
    Path(PathBuf),
    /// An in-memory document in an explicit format.
    Bytes { data: Vec<u8>, format: RdfFormat },
}

impl DocumentSource {
    fn read(self) -> CodecResult<(Vec<u8>, RdfFormat, String)> {
        match self {
            DocumentSource::Path(path) => {
                let format = RdfFormat::from_path(&path)?;
                let data = fs::read(&path).map_err(|source| CodecError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok((data, format, path.display().to_string()))
            }
            DocumentSource::Bytes { data, format } => Ok((data, format, "<bytes>".to_string())),
        }
    }
}

/// Everything read from a document, before it is checked against a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedOntology {
    pub iri: Option<Iri>,
    pub entities: Vec<Entity>,
    pub axioms: Vec<Axiom>,
    /// `(prefix name, namespace)` pairs in document order.
    pub prefixes: Vec<(String, String)>,
}

impl LoadedOntology {
    /// Build a standalone ontology from the document.
    ///
    /// Fails if the document itself violates registry rules (e.g. two IRIs
    /// sharing a short name).
    pub fn into_ontology(self, default_namespace: &str) -> OntoResult<Ontology> {
        let mut ontology = Ontology::new(default_namespace).with_iri(self.iri);
        for entity in self.entities {
            ontology.registry_mut().declare(entity.iri, entity.kind)?;
        }
        ontology.add_axioms(self.axioms)?;
        for (name, namespace) in &self.prefixes {
            ontology.registry_mut().add_prefix(namespace, name);
        }
        Ok(ontology)
    }
}

/// Reads and writes ontology documents.
pub trait OntologyCodec: Send + Sync {
    fn load(&self, source: DocumentSource) -> CodecResult<LoadedOntology>;
    fn save(&self, ontology: &Ontology, path: &Path) -> CodecResult<()>;
}

// ---------------------------------------------------------------------------
// RdfCodec
// ---------------------------------------------------------------------------

/// Codec for Turtle, N-Triples and RDF/XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct RdfCodec;

impl OntologyCodec for RdfCodec {
    fn load(&self, source: DocumentSource) -> CodecResult<LoadedOntology> {
        let (data, format, origin) = source.read()?;
        let loaded = self.read(&data, format)?;
        tracing::info!(
            source = %origin,
            entities = loaded.entities.len(),
            axioms = loaded.axioms.len(),
            prefixes = loaded.prefixes.len(),
            "loaded ontology document"
        );
        Ok(loaded)
    }

    fn save(&self, ontology: &Ontology, path: &Path) -> CodecResult<()> {
        let format = RdfFormat::from_path(path)?;
        let bytes = self.write(ontology, format)?;
        fs::write(path, &bytes).map_err(|source| CodecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            axioms = ontology.axioms().len(),
            bytes = bytes.len(),
            "saved ontology document"
        );
        Ok(())
    }
}

impl RdfCodec {
    /// Parse a document held in memory.
    pub fn read(&self, data: &[u8], format: RdfFormat) -> CodecResult<LoadedOntology> {
        let graph = TripleGraph::parse(data, format)?;
        let mut loaded = Interpreter::new(&graph).run()?;
        loaded.prefixes = graph.prefixes;
        Ok(loaded)
    }

    /// Serialize an ontology to bytes.
    pub fn write(&self, ontology: &Ontology, format: RdfFormat) -> CodecResult<Vec<u8>> {
        let triples = Emitter::default().emit(ontology)?;

        let mut serializer = RdfSerializer::from_format(format.oxigraph());
        for (name, namespace) in ontology.registry().prefixes().iter() {
            // RDF/XML has no empty prefix name.
            if name == ":" && format == RdfFormat::RdfXml {
                continue;
            }
            serializer = serializer
                .with_prefix(name.trim_end_matches(':'), namespace)
                .map_err(|e| CodecError::Serialize {
                    message: format!("invalid prefix {name} <{namespace}>: {e}"),
                })?;
        }
        let mut writer = serializer.for_writer(Vec::new());
        for triple in &triples {
            writer
                .serialize_triple(triple)
                .map_err(|e| CodecError::Serialize {
                    message: e.to_string(),
                })?;
        }
        writer.finish().map_err(|e| CodecError::Serialize {
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Node {
    Iri(String),
    Blank(String),
    Literal { lexical: String, lang: Option<String> },
}

impl Node {
    fn from_term(term: Term) -> Option<Self> {
        #[allow(unreachable_patterns)]
        match term {
            Term::NamedNode(node) => Some(Node::Iri(node.as_str().to_string())),
            Term::BlankNode(node) => Some(Node::Blank(node.as_str().to_string())),
            Term::Literal(literal) => Some(Node::Literal {
                lexical: literal.value().to_string(),
                lang: literal.language().map(str::to_string),
            }),
            _ => None,
        }
    }

    fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Node::Iri(iri) => format!("<{iri}>"),
            Node::Blank(id) => format!("_:{id}"),
            Node::Literal { lexical, .. } => format!("\"{lexical}\""),
        }
    }
}

/// The parsed triples, indexed by subject, and the prefixes the parser
/// bound along the way.
struct TripleGraph {
    triples: Vec<(Node, String, Node)>,
    by_subject: HashMap<Node, Vec<usize>>,
    prefixes: Vec<(String, String)>,
}

impl TripleGraph {
    fn parse(data: &[u8], format: RdfFormat) -> CodecResult<Self> {
        let mut parser = RdfParser::from_format(format.oxigraph()).for_reader(data);
        let mut triples = Vec::new();
        // RDF/XML bindings are element-scoped, so gather them as they appear.
        let mut bound: BTreeMap<String, String> = BTreeMap::new();
        while let Some(quad) = parser.next() {
            let quad = quad.map_err(|e| CodecError::Parse {
                message: e.to_string(),
            })?;
            for (name, namespace) in parser.prefixes() {
                bound.insert(format!("{name}:"), namespace.to_string());
            }
            let subject = Node::from_term(Term::from(quad.subject));
            let object = Node::from_term(quad.object);
            if let (Some(subject), Some(object)) = (subject, object) {
                triples.push((subject, quad.predicate.as_str().to_string(), object));
            }
        }
        for (name, namespace) in parser.prefixes() {
            bound.insert(format!("{name}:"), namespace.to_string());
        }
        triples.sort();
        triples.dedup();

        let prefixes: Vec<(String, String)> = bound
            .into_iter()
            .filter(|(_, namespace)| Iri::looks_absolute(namespace))
            .collect();

        let mut by_subject: HashMap<Node, Vec<usize>> = HashMap::new();
        for (index, (subject, _, _)) in triples.iter().enumerate() {
            by_subject.entry(subject.clone()).or_default().push(index);
        }
        Ok(TripleGraph {
            triples,
            by_subject,
            prefixes,
        })
    }

    fn objects(&self, subject: &Node, predicate: &str) -> Vec<&Node> {
        let Some(indices) = self.by_subject.get(subject) else {
            return Vec::new();
        };
        indices
            .iter()
            .map(|&index| &self.triples[index])
            .filter(|(_, p, _)| p == predicate)
            .map(|(_, _, o)| o)
            .collect()
    }

    fn object(&self, subject: &Node, predicate: &str) -> Option<&Node> {
        self.objects(subject, predicate).into_iter().next()
    }

    fn has_type(&self, subject: &Node, class: &str) -> bool {
        self.objects(subject, term::RDF_TYPE)
            .into_iter()
            .any(|o| o.as_iri() == Some(class))
    }
}

/// Maps a triple graph onto entities and axioms.
struct Interpreter<'g> {
    graph: &'g TripleGraph,
    kinds: BTreeMap<String, EntityKind>,
    ontology_iri: Option<Iri>,
    axioms: Vec<Axiom>,
    seen: HashSet<Axiom>,
    skipped: usize,
}

fn is_vocabulary(iri: &str) -> bool {
    iri.starts_with(vocab::OWL) || iri.starts_with(vocab::RDF) || iri.starts_with(vocab::RDFS)
}

fn declared_kind(type_iri: &str) -> Option<EntityKind> {
    match type_iri {
        term::OWL_CLASS | term::RDFS_CLASS => Some(EntityKind::Class),
        term::OWL_OBJECT_PROPERTY | term::OWL_TRANSITIVE_PROPERTY => {
            Some(EntityKind::ObjectProperty)
        }
        term::OWL_DATATYPE_PROPERTY => Some(EntityKind::DataProperty),
        term::OWL_ANNOTATION_PROPERTY => Some(EntityKind::AnnotationProperty),
        term::OWL_NAMED_INDIVIDUAL => Some(EntityKind::Individual),
        _ => None,
    }
}

impl<'g> Interpreter<'g> {
    fn new(graph: &'g TripleGraph) -> Self {
        Self {
            graph,
            kinds: BTreeMap::new(),
            ontology_iri: None,
            axioms: Vec::new(),
            seen: HashSet::new(),
            skipped: 0,
        }
    }

    fn run(mut self) -> CodecResult<LoadedOntology> {
        self.declarations()?;
        self.logical_axioms()?;
        self.assertions()?;

        if self.skipped > 0 {
            tracing::debug!(skipped = self.skipped, "triples without an OWL reading were skipped");
        }
        let entities = self
            .kinds
            .into_iter()
            .map(|(iri, kind)| Entity::new(Iri::new(iri), kind))
            .collect();
        Ok(LoadedOntology {
            iri: self.ontology_iri,
            entities,
            axioms: self.axioms,
            prefixes: Vec::new(),
        })
    }

    fn push(&mut self, axiom: Axiom) {
        if self.seen.insert(axiom.clone()) {
            self.axioms.push(axiom);
        }
    }

    /// Record that `iri` is used as `kind`, declaring it if needed.
    fn require(&mut self, iri: &str, kind: EntityKind) -> CodecResult<()> {
        if iri == vocab::OWL_THING {
            return if kind.is_class() {
                Ok(())
            } else {
                Err(CodecError::Malformed {
                    message: format!("owl:Thing used as {kind}"),
                })
            };
        }
        match self.kinds.get(iri) {
            Some(existing) if existing.compatible_with(kind) => Ok(()),
            Some(existing) => Err(CodecError::Malformed {
                message: format!("<{iri}> is used both as {existing} and as {kind}"),
            }),
            None => {
                self.kinds.insert(iri.to_string(), kind);
                Ok(())
            }
        }
    }

    fn declarations(&mut self) -> CodecResult<()> {
        let graph = self.graph;
        for (subject, predicate, object) in &graph.triples {
            if predicate != term::RDF_TYPE {
                continue;
            }
            let (Some(subject), Some(type_iri)) = (subject.as_iri(), object.as_iri()) else {
                continue;
            };
            if type_iri == term::OWL_ONTOLOGY {
                self.ontology_iri = Some(Iri::new(subject));
            } else if let Some(kind) = declared_kind(type_iri) {
                self.require(subject, kind)?;
            }
        }
        Ok(())
    }

    fn logical_axioms(&mut self) -> CodecResult<()> {
        let graph = self.graph;
        for (subject, predicate, object) in &graph.triples {
            match predicate.as_str() {
                term::RDFS_SUB_CLASS_OF => {
                    let sub = self.expression(subject, 0)?;
                    let sup = self.expression(object, 0)?;
                    self.push(Axiom::sub_class_of(sub, sup));
                }
                term::OWL_EQUIVALENT_CLASS => {
                    let ops = vec![self.expression(subject, 0)?, self.expression(object, 0)?];
                    self.push(Axiom::EquivalentClasses(ops));
                }
                term::OWL_DISJOINT_WITH => {
                    let ops = vec![self.expression(subject, 0)?, self.expression(object, 0)?];
                    self.push(Axiom::DisjointClasses(ops));
                }
                term::OWL_MEMBERS if graph.has_type(subject, term::OWL_ALL_DISJOINT_CLASSES) => {
                    let ops = self
                        .list(object)?
                        .iter()
                        .map(|member| self.expression(member, 0))
                        .collect::<CodecResult<Vec<_>>>()?;
                    self.push(Axiom::DisjointClasses(ops));
                }
                term::RDFS_SUB_PROPERTY_OF => {
                    let (Some(sub), Some(sup)) = (subject.as_iri(), object.as_iri()) else {
                        self.skipped += 1;
                        continue;
                    };
                    if self.is_kind(sub, EntityKind::ObjectProperty)
                        || self.is_kind(sup, EntityKind::ObjectProperty)
                        || (!self.kinds.contains_key(sub) && !self.kinds.contains_key(sup))
                    {
                        self.require(sub, EntityKind::ObjectProperty)?;
                        self.require(sup, EntityKind::ObjectProperty)?;
                        self.push(Axiom::SubObjectPropertyOf {
                            sub: Iri::new(sub),
                            sup: Iri::new(sup),
                        });
                    } else {
                        self.skipped += 1;
                    }
                }
                term::RDF_TYPE => {
                    let Some(individual) = subject.as_iri() else {
                        continue;
                    };
                    let is_class_term = match object {
                        Node::Iri(iri) => !is_vocabulary(iri) || iri == vocab::OWL_THING,
                        Node::Blank(_) => true,
                        Node::Literal { .. } => false,
                    };
                    if !is_class_term {
                        continue;
                    }
                    let class = self.expression(object, 0)?;
                    self.require(individual, EntityKind::Individual)?;
                    self.push(Axiom::ClassAssertion {
                        individual: Iri::new(individual),
                        class,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn assertions(&mut self) -> CodecResult<()> {
        let graph = self.graph;
        for (subject, predicate, object) in &graph.triples {
            let Some(subject) = subject.as_iri() else {
                continue;
            };
            let property = Iri::new(predicate.as_str());
            if is_builtin_annotation(&property) || self.is_kind(predicate, EntityKind::AnnotationProperty) {
                // Ontology headers and vocabulary terms are not entities.
                if !self.kinds.contains_key(subject) {
                    self.skipped += 1;
                    continue;
                }
                let value = match object {
                    Node::Literal { lexical, lang } => AnnotationValue::Literal {
                        lexical: lexical.clone(),
                        lang: lang.clone(),
                    },
                    Node::Iri(iri) => AnnotationValue::Iri(Iri::new(iri.as_str())),
                    Node::Blank(_) => {
                        self.skipped += 1;
                        continue;
                    }
                };
                self.push(Axiom::AnnotationAssertion {
                    subject: Iri::new(subject),
                    property,
                    value,
                });
            } else if self.is_kind(predicate, EntityKind::ObjectProperty) {
                let Some(object) = object.as_iri() else {
                    self.skipped += 1;
                    continue;
                };
                self.require(subject, EntityKind::Individual)?;
                self.require(object, EntityKind::Individual)?;
                self.push(Axiom::PropertyAssertion {
                    subject: Iri::new(subject),
                    property,
                    object: Iri::new(object),
                });
            } else if !is_vocabulary(predicate) {
                self.skipped += 1;
            }
        }
        Ok(())
    }

    fn is_kind(&self, iri: &str, kind: EntityKind) -> bool {
        self.kinds.get(iri) == Some(&kind)
    }

    fn expression(&mut self, node: &Node, depth: usize) -> CodecResult<ClassExpression> {
        if depth > MAX_EXPRESSION_DEPTH {
            return Err(CodecError::Malformed {
                message: format!("class expression at {} nests too deeply", node.describe()),
            });
        }
        match node {
            Node::Iri(iri) => {
                self.require(iri, EntityKind::Class)?;
                Ok(ClassExpression::named(Iri::new(iri.as_str())))
            }
            Node::Literal { .. } => Err(CodecError::Malformed {
                message: format!("literal {} used as a class", node.describe()),
            }),
            Node::Blank(_) => self.anonymous(node, depth),
        }
    }

    fn anonymous(&mut self, node: &Node, depth: usize) -> CodecResult<ClassExpression> {
        let graph = self.graph;
        if let Some(property) = graph.object(node, term::OWL_ON_PROPERTY) {
            let Some(property) = property.as_iri() else {
                return Err(CodecError::Malformed {
                    message: format!("restriction {} on an anonymous property", node.describe()),
                });
            };
            self.require(property, EntityKind::ObjectProperty)?;
            if let Some(filler) = graph.object(node, term::OWL_SOME_VALUES_FROM) {
                let filler = self.expression(filler, depth + 1)?;
                return Ok(ClassExpression::exists(Iri::new(property), filler));
            }
            if let Some(filler) = graph.object(node, term::OWL_ALL_VALUES_FROM) {
                let filler = self.expression(filler, depth + 1)?;
                return Ok(ClassExpression::for_all(Iri::new(property), filler));
            }
            return Err(CodecError::Malformed {
                message: format!(
                    "restriction {} is neither someValuesFrom nor allValuesFrom",
                    node.describe()
                ),
            });
        }
        if let Some(list) = graph.object(node, term::OWL_INTERSECTION_OF) {
            let ops = self.operands(list, depth)?;
            return Ok(ClassExpression::and(ops));
        }
        if let Some(list) = graph.object(node, term::OWL_UNION_OF) {
            let ops = self.operands(list, depth)?;
            return Ok(ClassExpression::or(ops));
        }
        if let Some(operand) = graph.object(node, term::OWL_COMPLEMENT_OF) {
            let operand = self.expression(operand, depth + 1)?;
            return Ok(ClassExpression::not(operand));
        }
        let kind = if graph.has_type(node, term::OWL_RESTRICTION) {
            "restriction"
        } else {
            "class expression"
        };
        Err(CodecError::Malformed {
            message: format!("unsupported {kind} {}", node.describe()),
        })
    }

    fn operands(&mut self, list: &Node, depth: usize) -> CodecResult<Vec<ClassExpression>> {
        let members = self.list(list)?;
        if members.is_empty() {
            return Err(CodecError::Malformed {
                message: format!("empty operand list {}", list.describe()),
            });
        }
        members
            .iter()
            .map(|member| self.expression(member, depth + 1))
            .collect()
    }

    /// Members of an `rdf:List`.
    fn list(&self, head: &Node) -> CodecResult<Vec<Node>> {
        let mut members = Vec::new();
        let mut visited = BTreeSet::new();
        let mut cursor = head.clone();
        while cursor.as_iri() != Some(term::RDF_NIL) {
            if !visited.insert(cursor.describe()) {
                return Err(CodecError::Malformed {
                    message: format!("cyclic list at {}", cursor.describe()),
                });
            }
            let (Some(first), Some(rest)) = (
                self.graph.object(&cursor, term::RDF_FIRST),
                self.graph.object(&cursor, term::RDF_REST),
            ) else {
                return Err(CodecError::Malformed {
                    message: format!("broken list at {}", cursor.describe()),
                });
            };
            members.push(first.clone());
            cursor = rest.clone();
        }
        Ok(members)
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Emitter {
    triples: Vec<Triple>,
}

fn named_node(iri: &str) -> CodecResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| CodecError::Serialize {
        message: format!("invalid IRI <{iri}>: {e}"),
    })
}

impl Emitter {
    fn emit(mut self, ontology: &Ontology) -> CodecResult<Vec<Triple>> {
        if let Some(iri) = ontology.iri() {
            self.typed(NamedOrBlankNode::from(named_node(iri.as_str())?), term::OWL_ONTOLOGY)?;
        }

        let mut entities: Vec<Entity> = ontology.registry().entities().collect();
        entities.sort();
        for entity in &entities {
            let type_iri = match entity.kind {
                EntityKind::Class => term::OWL_CLASS,
                EntityKind::ObjectProperty => term::OWL_OBJECT_PROPERTY,
                EntityKind::DataProperty => term::OWL_DATATYPE_PROPERTY,
                EntityKind::AnnotationProperty => term::OWL_ANNOTATION_PROPERTY,
                EntityKind::Individual => term::OWL_NAMED_INDIVIDUAL,
                EntityKind::TopClass => continue,
            };
            self.typed(NamedOrBlankNode::from(named_node(entity.iri.as_str())?), type_iri)?;
        }

        for axiom in ontology.axioms() {
            self.axiom(axiom)?;
        }
        Ok(self.triples)
    }

    fn add(&mut self, subject: NamedOrBlankNode, predicate: &str, object: impl Into<Term>) -> CodecResult<()> {
        self.triples
            .push(Triple::new(subject, named_node(predicate)?, object));
        Ok(())
    }

    fn typed(&mut self, subject: NamedOrBlankNode, type_iri: &str) -> CodecResult<()> {
        self.add(subject, term::RDF_TYPE, named_node(type_iri)?)
    }

    fn iri(&self, iri: &Iri) -> CodecResult<NamedOrBlankNode> {
        Ok(NamedOrBlankNode::from(named_node(iri.as_str())?))
    }

    fn axiom(&mut self, axiom: &Axiom) -> CodecResult<()> {
        match axiom {
            Axiom::SubClassOf { sub, sup } => {
                let sub = self.expression(sub)?;
                let sup = self.expression(sup)?;
                self.add(sub, term::RDFS_SUB_CLASS_OF, sup)
            }
            Axiom::EquivalentClasses(ops) => self.pairwise(ops, term::OWL_EQUIVALENT_CLASS),
            Axiom::DisjointClasses(ops) if ops.len() == 2 => {
                self.pairwise(ops, term::OWL_DISJOINT_WITH)
            }
            Axiom::DisjointClasses(ops) => {
                let node = NamedOrBlankNode::from(BlankNode::default());
                self.typed(node.clone(), term::OWL_ALL_DISJOINT_CLASSES)?;
                let list = self.list(ops)?;
                self.add(node, term::OWL_MEMBERS, list)
            }
            Axiom::ClassAssertion { individual, class } => {
                let subject = self.iri(individual)?;
                let class = self.expression(class)?;
                self.add(subject, term::RDF_TYPE, class)
            }
            Axiom::PropertyAssertion {
                subject,
                property,
                object,
            } => {
                let subject = self.iri(subject)?;
                let object = named_node(object.as_str())?;
                self.add(subject, property.as_str(), object)
            }
            Axiom::AnnotationAssertion {
                subject,
                property,
                value,
            } => {
                let subject = self.iri(subject)?;
                let value: Term = match value {
                    AnnotationValue::Literal { lexical, lang: None } => {
                        Literal::new_simple_literal(lexical.as_str()).into()
                    }
                    AnnotationValue::Literal {
                        lexical,
                        lang: Some(lang),
                    } => Literal::new_language_tagged_literal(lexical.as_str(), lang.as_str())
                        .map_err(|e| CodecError::Serialize {
                            message: format!("invalid language tag {lang:?}: {e}"),
                        })?
                        .into(),
                    AnnotationValue::Iri(iri) => named_node(iri.as_str())?.into(),
                };
                self.add(subject, property.as_str(), value)
            }
            Axiom::SubObjectPropertyOf { sub, sup } => {
                let sub = self.iri(sub)?;
                let sup = named_node(sup.as_str())?;
                self.add(sub, term::RDFS_SUB_PROPERTY_OF, sup)
            }
        }
    }

    /// The first operand related to each of the others.
    fn pairwise(&mut self, ops: &[ClassExpression], predicate: &str) -> CodecResult<()> {
        let Some((first, rest)) = ops.split_first() else {
            return Ok(());
        };
        let first = self.expression(first)?;
        for other in rest {
            let other = self.expression(other)?;
            self.add(first.clone(), predicate, other)?;
        }
        Ok(())
    }

    fn expression(&mut self, expr: &ClassExpression) -> CodecResult<NamedOrBlankNode> {
        match expr {
            ClassExpression::Named(iri) => self.iri(iri),
            ClassExpression::Exists { property, filler } => {
                self.restriction(property, term::OWL_SOME_VALUES_FROM, filler)
            }
            ClassExpression::ForAll { property, filler } => {
                self.restriction(property, term::OWL_ALL_VALUES_FROM, filler)
            }
            ClassExpression::And(ops) => self.boolean(term::OWL_INTERSECTION_OF, ops),
            ClassExpression::Or(ops) => self.boolean(term::OWL_UNION_OF, ops),
            ClassExpression::Not(operand) => {
                let node = NamedOrBlankNode::from(BlankNode::default());
                self.typed(node.clone(), term::OWL_CLASS)?;
                let operand = self.expression(operand)?;
                self.add(node.clone(), term::OWL_COMPLEMENT_OF, operand)?;
                Ok(node)
            }
        }
    }

    fn restriction(
        &mut self,
        property: &Iri,
        quantifier: &str,
        filler: &ClassExpression,
    ) -> CodecResult<NamedOrBlankNode> {
        let node = NamedOrBlankNode::from(BlankNode::default());
        self.typed(node.clone(), term::OWL_RESTRICTION)?;
        self.add(node.clone(), term::OWL_ON_PROPERTY, named_node(property.as_str())?)?;
        let filler = self.expression(filler)?;
        self.add(node.clone(), quantifier, filler)?;
        Ok(node)
    }

    fn boolean(&mut self, predicate: &str, ops: &[ClassExpression]) -> CodecResult<NamedOrBlankNode> {
        let node = NamedOrBlankNode::from(BlankNode::default());
        self.typed(node.clone(), term::OWL_CLASS)?;
        let list = self.list(ops)?;
        self.add(node.clone(), predicate, list)?;
        Ok(node)
    }

    fn list(&mut self, ops: &[ClassExpression]) -> CodecResult<Term> {
        let mut tail: Term = named_node(term::RDF_NIL)?.into();
        for op in ops.iter().rev() {
            let member = self.expression(op)?;
            let cell = NamedOrBlankNode::from(BlankNode::default());
            self.add(cell.clone(), term::RDF_FIRST, member)?;
            self.add(cell.clone(), term::RDF_REST, tail)?;
            tail = cell.into();
        }
        Ok(tail)
    }
}
