//! Completion-rule saturation over normal-form axioms.
//!
//! Maintains, for every concept `X`, the set `S(X)` of derived subsumers and
//! the derived existential links `X →r Y`. Rules, applied from a worklist
//! until fixpoint:
//!
//! - CR1: `A ∈ S(X)`, `A ⊑ B` ⇒ `B ∈ S(X)`
//! - CR2: `A1, A2 ∈ S(X)`, `A1 ⊓ A2 ⊑ B` ⇒ `B ∈ S(X)`
//! - CR3: `A ∈ S(X)`, `A ⊑ ∃r.B` ⇒ link `X →r B`
//! - CR4: link `X →r Y`, `A ∈ S(Y)`, `r ⊑* s`, `∃s.A ⊑ B` ⇒ `B ∈ S(X)`
//! - CR5: link `X →r Y`, `⊥ ∈ S(Y)` ⇒ `⊥ ∈ S(X)`
//!
//! The state can be extended after a run (more concepts, more axioms) and
//! saturated again; [`Saturation::refire`] replays the rules over existing
//! facts so that new axioms see them.

use std::collections::{HashMap, HashSet};

use super::normalize::{BOTTOM, ConceptId, NormalAxiom, RoleId, TOP};

#[derive(Debug, Clone, Copy)]
enum Work {
    Subsumer(ConceptId, ConceptId),
    Link(ConceptId, RoleId, ConceptId),
}

/// Saturation state.
#[derive(Debug, Clone, Default)]
pub struct Saturation {
    subsumers: Vec<HashSet<ConceptId>>,
    links: HashSet<(ConceptId, RoleId, ConceptId)>,
    /// For `Y`: every `(X, r)` with a link `X →r Y`.
    predecessors: Vec<Vec<(ConceptId, RoleId)>>,
    role_supers: Vec<Vec<RoleId>>,

    told_subs: HashMap<ConceptId, Vec<ConceptId>>,
    conjunctions: HashMap<ConceptId, Vec<(ConceptId, ConceptId)>>,
    exists_right: HashMap<ConceptId, Vec<(RoleId, ConceptId)>>,
    /// Keyed by filler: `∃r.A ⊑ B` is stored under `A` as `(r, B)`.
    exists_left: HashMap<ConceptId, Vec<(RoleId, ConceptId)>>,

    queue: Vec<Work>,
}

impl Saturation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for concepts `0..count`, seeding `X ∈ S(X)` and `⊤ ∈ S(X)`
    /// for every new one.
    pub fn ensure_concepts(&mut self, count: usize) {
        let start = self.subsumers.len();
        if count <= start {
            return;
        }
        self.subsumers.resize_with(count, HashSet::new);
        self.predecessors.resize_with(count, Vec::new);
        for concept in start..count {
            self.queue.push(Work::Subsumer(concept, concept));
            self.queue.push(Work::Subsumer(concept, TOP));
        }
    }

    /// Replace the super-role closure (reflexive, indexed by role id).
    pub fn set_role_closure(&mut self, closure: Vec<Vec<RoleId>>) {
        self.role_supers = closure;
    }

    /// Index normal-form axioms. Facts already derived are not revisited
    /// until [`Saturation::refire`] is called.
    pub fn add_axioms(&mut self, axioms: &[NormalAxiom]) {
        for &axiom in axioms {
            match axiom {
                NormalAxiom::Sub(a, b) => self.told_subs.entry(a).or_default().push(b),
                NormalAxiom::Conj(a1, a2, b) => {
                    self.conjunctions.entry(a1).or_default().push((a2, b));
                    if a1 != a2 {
                        self.conjunctions.entry(a2).or_default().push((a1, b));
                    }
                }
                NormalAxiom::ExistsRight(a, r, b) => {
                    self.exists_right.entry(a).or_default().push((r, b))
                }
                NormalAxiom::ExistsLeft(r, a, b) => {
                    self.exists_left.entry(a).or_default().push((r, b))
                }
            }
        }
    }

    /// Re-apply every rule to every existing fact.
    pub fn refire(&mut self) {
        let facts: Vec<(ConceptId, ConceptId)> = self
            .subsumers
            .iter()
            .enumerate()
            .flat_map(|(x, set)| set.iter().map(move |&c| (x, c)))
            .collect();
        for (x, c) in facts {
            self.apply_subsumer_rules(x, c);
        }
        let links: Vec<_> = self.links.iter().copied().collect();
        for (x, r, y) in links {
            self.apply_link_rules(x, r, y);
        }
    }

    /// Apply rules until fixpoint.
    pub fn run(&mut self) {
        while let Some(work) = self.queue.pop() {
            match work {
                Work::Subsumer(x, c) => {
                    if self.subsumers[x].insert(c) {
                        self.apply_subsumer_rules(x, c);
                    }
                }
                Work::Link(x, r, y) => {
                    if self.links.insert((x, r, y)) {
                        self.predecessors[y].push((x, r));
                        self.apply_link_rules(x, r, y);
                    }
                }
            }
        }
    }

    fn derive(&mut self, x: ConceptId, c: ConceptId) {
        if !self.subsumers[x].contains(&c) {
            self.queue.push(Work::Subsumer(x, c));
        }
    }

    fn role_implies(&self, r: RoleId, s: RoleId) -> bool {
        r == s || self.role_supers.get(r).is_some_and(|sups| sups.contains(&s))
    }

    fn apply_subsumer_rules(&mut self, x: ConceptId, c: ConceptId) {
        // CR1
        for d in self.told_subs.get(&c).cloned().unwrap_or_default() {
            self.derive(x, d);
        }
        // CR2
        for (other, d) in self.conjunctions.get(&c).cloned().unwrap_or_default() {
            if self.subsumers[x].contains(&other) {
                self.derive(x, d);
            }
        }
        // CR3
        for (r, y) in self.exists_right.get(&c).cloned().unwrap_or_default() {
            if !self.links.contains(&(x, r, y)) {
                self.queue.push(Work::Link(x, r, y));
            }
        }
        // CR4, with `x` as the link target.
        let lefts = self.exists_left.get(&c).cloned().unwrap_or_default();
        if !lefts.is_empty() {
            for (z, r) in self.predecessors[x].clone() {
                for &(s, b) in &lefts {
                    if self.role_implies(r, s) {
                        self.derive(z, b);
                    }
                }
            }
        }
        // CR5
        if c == BOTTOM {
            for (z, _) in self.predecessors[x].clone() {
                self.derive(z, BOTTOM);
            }
        }
    }

    fn apply_link_rules(&mut self, x: ConceptId, r: RoleId, y: ConceptId) {
        let fillers: Vec<ConceptId> = self.subsumers[y].iter().copied().collect();
        for a in fillers {
            if a == BOTTOM {
                self.derive(x, BOTTOM);
            }
            for (s, b) in self.exists_left.get(&a).cloned().unwrap_or_default() {
                if self.role_implies(r, s) {
                    self.derive(x, b);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Derived subsumers of `x`.
    pub fn subsumers(&self, x: ConceptId) -> &HashSet<ConceptId> {
        &self.subsumers[x]
    }

    /// Whether `sup ∈ S(sub)`.
    pub fn subsumes(&self, sup: ConceptId, sub: ConceptId) -> bool {
        self.subsumers.get(sub).is_some_and(|set| set.contains(&sup))
    }

    pub fn is_unsatisfiable(&self, x: ConceptId) -> bool {
        self.subsumes(BOTTOM, x)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concepts 2.. are user concepts.
    fn saturate(count: usize, roles: usize, axioms: &[NormalAxiom]) -> Saturation {
        let mut sat = Saturation::new();
        sat.ensure_concepts(count);
        sat.set_role_closure((0..roles).map(|r| vec![r]).collect());
        sat.add_axioms(axioms);
        sat.run();
        sat
    }

    #[test]
    fn told_chain_is_transitive() {
        let sat = saturate(5, 0, &[NormalAxiom::Sub(2, 3), NormalAxiom::Sub(3, 4)]);
        assert!(sat.subsumes(4, 2));
        assert!(sat.subsumes(TOP, 2));
        assert!(sat.subsumes(2, 2));
        assert!(!sat.subsumes(2, 4));
    }

    #[test]
    fn conjunction_needs_both_operands() {
        // 2 ⊑ 3, 2 ⊑ 4, 3 ⊓ 4 ⊑ 5; 6 ⊑ 3 only
        let sat = saturate(
            7,
            0,
            &[
                NormalAxiom::Sub(2, 3),
                NormalAxiom::Sub(2, 4),
                NormalAxiom::Conj(3, 4, 5),
                NormalAxiom::Sub(6, 3),
            ],
        );
        assert!(sat.subsumes(5, 2));
        assert!(!sat.subsumes(5, 6));
    }

    #[test]
    fn existential_propagation() {
        // 2 ⊑ ∃r.3, 3 ⊑ 4, ∃r.4 ⊑ 5
        let sat = saturate(
            6,
            1,
            &[
                NormalAxiom::ExistsRight(2, 0, 3),
                NormalAxiom::Sub(3, 4),
                NormalAxiom::ExistsLeft(0, 4, 5),
            ],
        );
        assert!(sat.subsumes(5, 2));
        assert_eq!(sat.link_count(), 1);
    }

    #[test]
    fn role_hierarchy_applies_to_left_existentials() {
        // 2 ⊑ ∃r.3, r ⊑ s, ∃s.3 ⊑ 4
        let mut sat = Saturation::new();
        sat.ensure_concepts(5);
        sat.set_role_closure(vec![vec![0, 1], vec![1]]);
        sat.add_axioms(&[
            NormalAxiom::ExistsRight(2, 0, 3),
            NormalAxiom::ExistsLeft(1, 3, 4),
        ]);
        sat.run();
        assert!(sat.subsumes(4, 2));
    }

    #[test]
    fn bottom_propagates_backwards_over_links() {
        // 3 ⊓ 4 ⊑ ⊥, 5 ⊑ 3, 5 ⊑ 4, 2 ⊑ ∃r.5
        let sat = saturate(
            6,
            1,
            &[
                NormalAxiom::Conj(3, 4, BOTTOM),
                NormalAxiom::Sub(5, 3),
                NormalAxiom::Sub(5, 4),
                NormalAxiom::ExistsRight(2, 0, 5),
            ],
        );
        assert!(sat.is_unsatisfiable(5));
        assert!(sat.is_unsatisfiable(2));
        assert!(!sat.is_unsatisfiable(3));
    }

    #[test]
    fn extension_after_run_sees_existing_facts() {
        let mut sat = saturate(4, 0, &[NormalAxiom::Sub(2, 3)]);
        // New concept 4 with 3 ⊑ 4 added afterwards.
        sat.ensure_concepts(5);
        sat.add_axioms(&[NormalAxiom::Sub(3, 4)]);
        sat.refire();
        sat.run();
        assert!(sat.subsumes(4, 2));
    }
}
