//! Class taxonomy: equivalence-class nodes linked to their direct parents.
//!
//! Built from a saturation in three steps:
//!
//! 1. a subsumption digraph over the named classes plus `owl:Thing`;
//! 2. `tarjan_scc` on it, each strongly connected component being one node
//!    (a set of mutually equivalent classes);
//! 3. a DAG of nodes whose edges point from a node to its direct parents
//!    (strict supers not above another strict super).
//!
//! Unsatisfiable classes are subsumed by every class, so they all collapse
//! into a single bottom node hanging below every leaf.
//!
//! Transitive queries walk the DAG breadth-first.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::normalize::{ConceptId, NormalForm, TOP};
use super::saturate::Saturation;
use crate::entity::Iri;

/// A set of mutually equivalent named classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub members: BTreeSet<Iri>,
}

impl ClassNode {
    /// The smallest member IRI, used as a stable representative.
    pub fn representative(&self) -> Option<&Iri> {
        self.members.iter().next()
    }
}

/// Named types of one individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualTypes {
    /// Every named class the individual belongs to (`owl:Thing` included).
    pub all: BTreeSet<Iri>,
    /// Members of the most specific nodes among `all`.
    pub direct: BTreeSet<Iri>,
}

/// Named-class classification: the taxonomy, unsatisfiable classes and
/// individual types. A pure function of the axioms it was computed from.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Edges go from a node to each of its direct parents.
    graph: DiGraph<ClassNode, ()>,
    node_of: HashMap<Iri, NodeIndex>,
    top: NodeIndex,
    unsatisfiable: BTreeSet<Iri>,
    types: BTreeMap<Iri, IndividualTypes>,
}

impl Classification {
    /// Build the classification from a finished saturation.
    pub fn build(normal: &NormalForm, sat: &Saturation) -> Self {
        // 1. subsumption digraph over named classes + Thing
        let mut named: Vec<(Iri, ConceptId)> = normal
            .classes()
            .map(|(iri, id)| (iri.clone(), id))
            .collect();
        named.push((Iri::thing(), TOP));
        named.sort();

        let concept_to_index: HashMap<ConceptId, usize> =
            named.iter().enumerate().map(|(i, (_, c))| (*c, i)).collect();

        let mut subsumption: DiGraph<usize, ()> = DiGraph::new();
        let raw: Vec<NodeIndex> = (0..named.len()).map(|i| subsumption.add_node(i)).collect();
        let mut supers_of: Vec<HashSet<usize>> = vec![HashSet::new(); named.len()];
        let empty: Vec<bool> = named
            .iter()
            .map(|(iri, concept)| !iri.is_thing() && sat.is_unsatisfiable(*concept))
            .collect();
        for (i, (_, concept)) in named.iter().enumerate() {
            if empty[i] {
                // Equivalent to the empty set, hence below every class.
                for j in (0..named.len()).filter(|&j| j != i) {
                    supers_of[i].insert(j);
                    subsumption.add_edge(raw[i], raw[j], ());
                }
                continue;
            }
            for sup in sat.subsumers(*concept) {
                if let Some(&j) = concept_to_index.get(sup) {
                    if i != j {
                        supers_of[i].insert(j);
                        subsumption.add_edge(raw[i], raw[j], ());
                    }
                }
            }
        }

        // 2. equivalence classes
        let components = tarjan_scc(&subsumption);
        let mut component_of = vec![0usize; named.len()];
        for (c, members) in components.iter().enumerate() {
            for idx in members {
                component_of[subsumption[*idx]] = c;
            }
        }

        // Strict supers per component.
        let mut strict: Vec<HashSet<usize>> = vec![HashSet::new(); components.len()];
        for (i, sups) in supers_of.iter().enumerate() {
            let ci = component_of[i];
            for &j in sups {
                let cj = component_of[j];
                if cj != ci {
                    strict[ci].insert(cj);
                }
            }
        }

        // 3. taxonomy DAG
        let mut graph: DiGraph<ClassNode, ()> = DiGraph::with_capacity(components.len(), 0);
        let mut node_of = HashMap::new();
        let mut nodes = Vec::with_capacity(components.len());
        for members in &components {
            let members: BTreeSet<Iri> = members
                .iter()
                .map(|idx| named[subsumption[*idx]].0.clone())
                .collect();
            let node = graph.add_node(ClassNode {
                members: members.clone(),
            });
            for iri in members {
                node_of.insert(iri, node);
            }
            nodes.push(node);
        }
        for (c, sups) in strict.iter().enumerate() {
            for &p in sups {
                let covered = sups.iter().any(|&q| q != p && strict[q].contains(&p));
                if !covered {
                    graph.add_edge(nodes[c], nodes[p], ());
                }
            }
        }
        let top = node_of[&Iri::thing()];

        let unsatisfiable: BTreeSet<Iri> = named
            .iter()
            .zip(&empty)
            .filter(|(_, empty)| **empty)
            .map(|((iri, _), _)| iri.clone())
            .collect();

        let mut classification = Self {
            graph,
            node_of,
            top,
            unsatisfiable,
            types: BTreeMap::new(),
        };

        let types: BTreeMap<Iri, IndividualTypes> = normal
            .individuals()
            .map(|(iri, concept)| {
                let all: BTreeSet<Iri> = sat
                    .subsumers(concept)
                    .iter()
                    .filter_map(|&c| named.get(*concept_to_index.get(&c)?))
                    .map(|(class, _)| class.clone())
                    .collect();
                let direct = classification.most_specific(&all);
                (iri.clone(), IndividualTypes { all, direct })
            })
            .collect();
        classification.types = types;
        classification
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    pub fn node(&self, class: &Iri) -> Option<NodeIndex> {
        self.node_of.get(class).copied()
    }

    pub fn members(&self, node: NodeIndex) -> &BTreeSet<Iri> {
        &self.graph[node].members
    }

    pub fn top(&self) -> NodeIndex {
        self.top
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn direct_parents(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    pub fn direct_children(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    /// All nodes reachable from `node` in `direction`, excluding `node`.
    fn reachable(&self, node: NodeIndex, direction: Direction) -> BTreeSet<NodeIndex> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, direction) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    pub fn ancestors(&self, node: NodeIndex) -> BTreeSet<NodeIndex> {
        self.reachable(node, Direction::Outgoing)
    }

    pub fn descendants(&self, node: NodeIndex) -> BTreeSet<NodeIndex> {
        self.reachable(node, Direction::Incoming)
    }

    fn flatten(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> BTreeSet<Iri> {
        nodes
            .into_iter()
            .flat_map(|n| self.graph[n].members.iter().cloned())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Named-class queries
    // -----------------------------------------------------------------------

    /// Named classes equivalent to `class`, excluding `class` itself.
    pub fn equivalents(&self, class: &Iri) -> BTreeSet<Iri> {
        let Some(node) = self.node(class) else {
            return BTreeSet::new();
        };
        let mut members = self.graph[node].members.clone();
        members.remove(class);
        members
    }

    /// Strict subclasses of `class` (its equivalents excluded).
    pub fn sub_classes(&self, class: &Iri, direct: bool) -> BTreeSet<Iri> {
        let Some(node) = self.node(class) else {
            return BTreeSet::new();
        };
        if direct {
            self.flatten(self.direct_children(node))
        } else {
            self.flatten(self.descendants(node))
        }
    }

    /// Strict superclasses of `class` (its equivalents excluded).
    pub fn super_classes(&self, class: &Iri, direct: bool) -> BTreeSet<Iri> {
        let Some(node) = self.node(class) else {
            return BTreeSet::new();
        };
        if direct {
            self.flatten(self.direct_parents(node))
        } else {
            self.flatten(self.ancestors(node))
        }
    }

    /// Whether `sub` is strictly below `sup` in the taxonomy.
    pub fn is_strictly_below(&self, sub: &Iri, sup: &Iri) -> bool {
        match (self.node(sub), self.node(sup)) {
            (Some(a), Some(b)) => a != b && self.ancestors(a).contains(&b),
            _ => false,
        }
    }

    /// Whether `sub ⊑ sup` (equivalence included).
    pub fn is_below_or_equal(&self, sub: &Iri, sup: &Iri) -> bool {
        match (self.node(sub), self.node(sup)) {
            (Some(a), Some(b)) => a == b || self.ancestors(a).contains(&b),
            _ => false,
        }
    }

    /// Members of the minimal nodes among `classes`.
    pub fn most_specific(&self, classes: &BTreeSet<Iri>) -> BTreeSet<Iri> {
        classes
            .iter()
            .filter(|c| !classes.iter().any(|o| self.is_strictly_below(o, c)))
            .cloned()
            .collect()
    }

    /// Members of the maximal nodes among `classes`.
    pub fn most_general(&self, classes: &BTreeSet<Iri>) -> BTreeSet<Iri> {
        classes
            .iter()
            .filter(|c| !classes.iter().any(|o| self.is_strictly_below(c, o)))
            .cloned()
            .collect()
    }

    pub fn unsatisfiable(&self) -> &BTreeSet<Iri> {
        &self.unsatisfiable
    }

    pub fn is_satisfiable(&self, class: &Iri) -> bool {
        !self.unsatisfiable.contains(class)
    }

    // -----------------------------------------------------------------------
    // Individuals
    // -----------------------------------------------------------------------

    pub fn types(&self, individual: &Iri) -> Option<&IndividualTypes> {
        self.types.get(individual)
    }

    /// Individuals of `class`. With `direct`, only those for which `class`
    /// is among their most specific types.
    pub fn instances(&self, class: &Iri, direct: bool) -> BTreeSet<Iri> {
        self.types
            .iter()
            .filter(|(_, types)| {
                if direct {
                    types.direct.contains(class)
                } else {
                    types.all.contains(class)
                }
            })
            .map(|(iri, _)| iri.clone())
            .collect()
    }

    pub fn individuals(&self) -> impl Iterator<Item = (&Iri, &IndividualTypes)> + '_ {
        self.types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::Axiom;
    use crate::expression::ClassExpression;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://localhost/{s}"))
    }

    fn named(s: &str) -> ClassExpression {
        ClassExpression::named(iri(s))
    }

    fn classify(axioms: &[Axiom], classes: &[&str]) -> Classification {
        let mut normal = NormalForm::new();
        for class in classes {
            normal.class(&iri(class));
        }
        for axiom in axioms {
            normal.add_axiom(axiom);
        }
        let mut sat = Saturation::new();
        sat.ensure_concepts(normal.concept_count());
        sat.set_role_closure(normal.role_closure());
        sat.add_axioms(normal.axioms());
        sat.run();
        Classification::build(&normal, &sat)
    }

    fn names(set: BTreeSet<Iri>) -> Vec<String> {
        set.iter().map(|i| i.short_form().to_string()).collect()
    }

    #[test]
    fn direct_and_transitive() {
        let c = classify(
            &[
                Axiom::sub_class_of(named("Lion"), named("Cat")),
                Axiom::sub_class_of(named("Cat"), named("Animal")),
            ],
            &["Animal", "Cat", "Lion"],
        );
        assert_eq!(names(c.sub_classes(&iri("Animal"), true)), vec!["Cat"]);
        assert_eq!(names(c.sub_classes(&iri("Animal"), false)), vec!["Cat", "Lion"]);
        assert_eq!(names(c.super_classes(&iri("Lion"), true)), vec!["Cat"]);
        assert_eq!(
            names(c.super_classes(&iri("Lion"), false)),
            vec!["Animal", "Cat", "Thing"]
        );
        assert!(c.is_strictly_below(&iri("Lion"), &Iri::thing()));
    }

    #[test]
    fn equivalents_share_a_node() {
        let c = classify(
            &[Axiom::EquivalentClasses(vec![named("M"), named("N")])],
            &["M", "N"],
        );
        assert_eq!(names(c.equivalents(&iri("M"))), vec!["N"]);
        assert_eq!(c.node(&iri("M")), c.node(&iri("N")));
        assert!(c.sub_classes(&iri("M"), false).is_empty());
        assert_eq!(names(c.super_classes(&iri("N"), true)), vec!["Thing"]);
    }

    #[test]
    fn unsatisfiable_class_is_reported() {
        let c = classify(
            &[
                Axiom::DisjointClasses(vec![named("A"), named("B")]),
                Axiom::sub_class_of(named("C"), named("A")),
                Axiom::sub_class_of(named("C"), named("B")),
            ],
            &["A", "B", "C"],
        );
        assert_eq!(names(c.unsatisfiable().clone()), vec!["C"]);
        assert!(c.is_satisfiable(&iri("A")));
    }

    #[test]
    fn unsatisfiable_classes_share_the_bottom_node() {
        let c = classify(
            &[
                Axiom::DisjointClasses(vec![named("A"), named("B")]),
                Axiom::sub_class_of(named("C"), named("A")),
                Axiom::sub_class_of(named("C"), named("B")),
                Axiom::sub_class_of(named("D"), ClassExpression::and(vec![named("A"), named("B")])),
                Axiom::sub_class_of(named("Y"), named("X")),
            ],
            &["A", "B", "C", "D", "X", "Y"],
        );
        assert_eq!(names(c.unsatisfiable().clone()), vec!["C", "D"]);
        assert_eq!(c.node(&iri("C")), c.node(&iri("D")));
        assert_eq!(names(c.equivalents(&iri("C"))), vec!["D"]);
        assert!(c.is_strictly_below(&iri("C"), &iri("X")));
        assert!(c.is_strictly_below(&iri("D"), &iri("Y")));
        assert_eq!(names(c.sub_classes(&iri("X"), false)), vec!["C", "D", "Y"]);
        assert_eq!(names(c.sub_classes(&iri("X"), true)), vec!["Y"]);
        assert_eq!(names(c.sub_classes(&iri("Y"), true)), vec!["C", "D"]);
        assert_eq!(names(c.super_classes(&iri("C"), true)), vec!["A", "B", "Y"]);
    }

    #[test]
    fn individual_direct_types() {
        let mut normal = NormalForm::new();
        for class in ["Human", "Fireman"] {
            normal.class(&iri(class));
        }
        normal.add_axiom(&Axiom::sub_class_of(named("Fireman"), named("Human")));
        normal.add_axiom(&Axiom::ClassAssertion {
            individual: iri("Joe"),
            class: named("Fireman"),
        });
        let mut sat = Saturation::new();
        sat.ensure_concepts(normal.concept_count());
        sat.set_role_closure(normal.role_closure());
        sat.add_axioms(normal.axioms());
        sat.run();
        let c = Classification::build(&normal, &sat);

        assert_eq!(names(c.instances(&iri("Human"), false)), vec!["Joe"]);
        assert!(c.instances(&iri("Human"), true).is_empty());
        assert_eq!(names(c.instances(&iri("Fireman"), true)), vec!["Joe"]);
    }
}
