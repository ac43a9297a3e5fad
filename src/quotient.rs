//! An irreflexive directed graph over opaque node ids supporting edge
//! quotienting, transitive closure, reduction to an acyclic quotient, and
//! extraction of a single consistent linear order with a left-bias
//! tie-break.
//!
//! This is the engine behind [`Monotone::multi_unify`](crate::monotone::Monotone::multi_unify):
//! each monotone to be reconciled contributes a chain of nodes, lower
//! constraints quotient nodes together, and the final linear order is read
//! back as the unified target. Instances are scratch objects, one per
//! unification.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, Default)]
struct NodeData {
    predecessors: BTreeSet<usize>,
    successors: BTreeSet<usize>,
    bias_left: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DirectedQuotientGraph {
    nodes: BTreeMap<usize, NodeData>,
    // Merged node ids resolve to their surviving representative.
    aliases: BTreeMap<usize, usize>,
    next_id: usize,
}

impl DirectedQuotientGraph {
    pub fn new() -> Self {
        DirectedQuotientGraph::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, bias_left: bool) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                bias_left,
                ..NodeData::default()
            },
        );
        NodeId(id)
    }

    /// Follow the alias table to the surviving representative of `node`.
    pub fn resolve(&self, node: NodeId) -> NodeId {
        let mut id = node.0;
        while let Some(&next) = self.aliases.get(&id) {
            id = next;
        }
        NodeId(id)
    }

    /// Insert the edge `a → b`. Self-edges are dropped: the graph is
    /// irreflexive by construction.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        let a = self.resolve(a).0;
        let b = self.resolve(b).0;
        if a == b {
            return;
        }
        self.nodes.get_mut(&a).expect("edge endpoint").successors.insert(b);
        self.nodes.get_mut(&b).expect("edge endpoint").predecessors.insert(a);
    }

    /// Merge `a` into `b`, rewiring all of `a`'s edges onto `b`, unioning
    /// the bias flags, and recording the alias so later lookups by the old
    /// id still resolve.
    pub fn quotient(&mut self, a: NodeId, b: NodeId) {
        let a = self.resolve(a).0;
        let b = self.resolve(b).0;
        if a == b {
            return;
        }

        let data = self.nodes.remove(&a).expect("quotient source");
        self.aliases.insert(a, b);

        for p in &data.predecessors {
            self.nodes.get_mut(p).expect("predecessor").successors.remove(&a);
        }
        for s in &data.successors {
            self.nodes.get_mut(s).expect("successor").predecessors.remove(&a);
        }
        for p in data.predecessors {
            if p != b {
                self.nodes.get_mut(&p).expect("predecessor").successors.insert(b);
                self.nodes.get_mut(&b).expect("target").predecessors.insert(p);
            }
        }
        for s in data.successors {
            if s != b {
                self.nodes.get_mut(&s).expect("successor").predecessors.insert(b);
                self.nodes.get_mut(&b).expect("target").successors.insert(s);
            }
        }

        let target = self.nodes.get_mut(&b).expect("target");
        target.bias_left |= data.bias_left;
    }

    /// Saturate successor sets under reachability.
    pub fn transitive_closure(&mut self) {
        let ids: Vec<usize> = self.nodes.keys().copied().collect();
        loop {
            let mut changed = false;
            for &id in &ids {
                let Some(node) = self.nodes.get(&id) else { continue };
                let mut additions = BTreeSet::new();
                for s in &node.successors {
                    if let Some(next) = self.nodes.get(s) {
                        for s2 in &next.successors {
                            if *s2 != id && !node.successors.contains(s2) {
                                additions.insert(*s2);
                            }
                        }
                    }
                }
                if !additions.is_empty() {
                    changed = true;
                    for s2 in additions {
                        self.nodes.get_mut(&id).expect("node").successors.insert(s2);
                        self.nodes.get_mut(&s2).expect("node").predecessors.insert(id);
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Quotient away mutually-reachable node pairs. Requires the graph to
    /// be transitively closed; simultaneous constraints can legitimately
    /// force two distinct positions to become identified.
    pub fn acyclic_quotient(&mut self) {
        loop {
            let pair = self.nodes.iter().find_map(|(&id, data)| {
                data.successors
                    .iter()
                    .find(|&&s| {
                        self.nodes
                            .get(&s)
                            .is_some_and(|other| other.successors.contains(&id))
                    })
                    .map(|&s| (id, s))
            });

            match pair {
                Some((a, b)) => {
                    self.quotient(NodeId(b), NodeId(a));
                    // Merging two closed reachability sets can create a
                    // self-description of the cycle as stray mutual edges
                    // between the survivor and third parties; the loop
                    // re-scans until none remain.
                }
                None => break,
            }
        }
    }

    /// Extract a single linear order over the surviving nodes.
    ///
    /// Repeatedly places, among the nodes whose predecessors have all been
    /// placed, a `bias_left` node if one is available, with the smallest id
    /// breaking remaining ties. Panics if no node is available while nodes
    /// remain: the graph was not acyclic, which is an engine defect.
    pub fn linear_order(&self) -> BTreeMap<NodeId, usize> {
        let mut placed: BTreeSet<usize> = BTreeSet::new();
        let mut order = BTreeMap::new();

        while placed.len() < self.nodes.len() {
            let available = self
                .nodes
                .iter()
                .filter(|(id, data)| {
                    !placed.contains(id) && data.predecessors.iter().all(|p| placed.contains(p))
                })
                .map(|(&id, data)| (id, data.bias_left));

            let mut chosen: Option<usize> = None;
            let mut chosen_bias = false;
            for (id, bias) in available {
                let better = match chosen {
                    None => true,
                    Some(_) => bias && !chosen_bias,
                };
                if better {
                    chosen = Some(id);
                    chosen_bias = bias;
                }
            }

            let id = chosen.expect("quotient graph not acyclic");
            order.insert(NodeId(id), order.len());
            placed.insert(id);
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut DirectedQuotientGraph, len: usize, bias_left: bool) -> Vec<NodeId> {
        let nodes: Vec<NodeId> = (0..len).map(|_| graph.add_node(bias_left)).collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        nodes
    }

    #[test]
    fn quotient_rewires_edges() {
        let mut g = DirectedQuotientGraph::new();
        let a = chain(&mut g, 2, false);
        let b = chain(&mut g, 2, false);
        g.quotient(b[0], a[0]);

        assert_eq!(g.resolve(b[0]), a[0]);
        let order = {
            g.transitive_closure();
            g.acyclic_quotient();
            g.linear_order()
        };
        // a0 precedes both chain tails.
        assert_eq!(order[&g.resolve(a[0])], 0);
    }

    #[test]
    fn cycles_collapse() {
        let mut g = DirectedQuotientGraph::new();
        let a = g.add_node(false);
        let b = g.add_node(false);
        let c = g.add_node(false);
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, a);

        g.transitive_closure();
        g.acyclic_quotient();
        assert_eq!(g.len(), 1);
        assert_eq!(g.resolve(a), g.resolve(c));
    }

    #[test]
    fn bias_breaks_ties() {
        let mut g = DirectedQuotientGraph::new();
        let plain = g.add_node(false);
        let biased = g.add_node(true);
        g.transitive_closure();
        g.acyclic_quotient();
        let order = g.linear_order();
        assert_eq!(order[&biased], 0);
        assert_eq!(order[&plain], 1);
    }

    #[test]
    fn irreflexive() {
        let mut g = DirectedQuotientGraph::new();
        let a = g.add_node(false);
        g.add_edge(a, a);
        g.transitive_closure();
        g.acyclic_quotient();
        assert_eq!(g.linear_order().len(), 1);
    }
}
