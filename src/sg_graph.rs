//! Network Graph
//!
//! Holds the static cost matrix of the network and keeps a live minimum
//! spanning structure over the *eligible* nodes (neither compromised nor
//! affected). The structure is rebuilt from scratch with a greedy
//! cheapest-edge-first selection, and degraded incrementally in between as
//! nodes get attacked.
//!
//! Group membership is tracked with labels instead of a union-find forest:
//! every node carries the id of its group representative, plus a history of
//! earlier labels so it can fall back when its representative drops out.

use indexmap::IndexSet;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sg_heap::PriorityHeap;
use crate::sg_interface::{Cost, NodeId, SimError};
use crate::sg_matrix::SymMatrix;

/// Parameters for random network generation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Inclusive range for raw pair costs; non-positive draws mean "no link"
    pub cost_range: (Cost, Cost),

    /// Inclusive range for the synthetic link given to a node with no positive cost
    pub patch_cost_range: (Cost, Cost),
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cost_range: (-120, 100),
            patch_cost_range: (1, 100),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let (lo, hi) = self.cost_range;
        if lo > hi {
            return Err(SimError::InvalidArgument(format!(
                "cost_range ({}, {}) is inverted",
                lo, hi
            )));
        }
        let (lo, hi) = self.patch_cost_range;
        if lo < 1 || lo > hi {
            return Err(SimError::InvalidArgument(format!(
                "patch_cost_range ({}, {}) must be positive and ordered",
                lo, hi
            )));
        }
        Ok(())
    }
}

/// Past group labels of a node; the node's own id is always at the bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelHistory {
    origin: NodeId,
    stack: Vec<NodeId>,
}

impl LabelHistory {
    pub fn new(origin: NodeId) -> Self {
        Self {
            origin,
            stack: Vec::new(),
        }
    }

    pub fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.origin)
    }

    pub fn push(&mut self, label: NodeId) {
        self.stack.push(label);
    }

    /// Drops the top label; the bottom entry is never removed
    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    /// Number of labels held, origin included; never zero
    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }

    /// Labels from bottom to top
    pub fn labels(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.origin).chain(self.stack.iter().copied())
    }

    fn reset(&mut self) {
        self.stack.clear();
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    original_id: NodeId,
    current_label: NodeId,
    compromised: bool,
    affected: bool,
    label_history: LabelHistory,
    // neighbors in the live structure, kept in insertion order
    live_neighbors: IndexSet<NodeId>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            original_id: id,
            current_label: id,
            compromised: false,
            affected: false,
            label_history: LabelHistory::new(id),
            live_neighbors: IndexSet::new(),
        }
    }

    pub fn original_id(&self) -> NodeId {
        self.original_id
    }

    pub fn current_label(&self) -> NodeId {
        self.current_label
    }

    pub fn is_compromised(&self) -> bool {
        self.compromised
    }

    pub fn is_affected(&self) -> bool {
        self.affected
    }

    pub fn is_eligible(&self) -> bool {
        !self.compromised && !self.affected
    }

    pub fn label_history(&self) -> &LabelHistory {
        &self.label_history
    }

    pub fn live_neighbors(&self) -> &IndexSet<NodeId> {
        &self.live_neighbors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub left: NodeId,
    pub right: NodeId,
    pub cost: Cost,
}

pub struct NetworkGraph {
    nodes: Vec<Node>,
    costs: SymMatrix,
    structure: SymMatrix,
    edges: Vec<Edge>,
}

impl NetworkGraph {
    /// Generate a random network of `num_nodes` hosts and build its first structure
    ///
    /// Pair costs are drawn from `config.cost_range`. A node whose draws are all
    /// non-positive gets one synthetic link (at its highest draw) with a cost
    /// from `config.patch_cost_range`; afterwards non-positive costs mean "no link".
    pub fn generate(num_nodes: usize, seed: u64, config: &NetworkConfig) -> Result<Self, SimError> {
        if num_nodes < 2 {
            return Err(SimError::InvalidArgument(format!(
                "a network needs at least 2 nodes, got {}",
                num_nodes
            )));
        }
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let (lo, hi) = config.cost_range;
        let (patch_lo, patch_hi) = config.patch_cost_range;

        let mut costs = SymMatrix::zeroed(num_nodes);
        for i in 0..num_nodes {
            for j in 0..i {
                costs.set_pair(i, j, rng.gen_range(lo..=hi));
            }
        }

        for i in 0..num_nodes {
            let mut best: Option<(NodeId, Cost)> = None;
            for j in (0..num_nodes).filter(|j| *j != i) {
                let cost = costs.get(i, j);
                if best.map_or(true, |(_, max)| cost > max) {
                    best = Some((j, cost));
                }
            }
            if let Some((j, max)) = best {
                if max <= 0 {
                    let patch = rng.gen_range(patch_lo..=patch_hi);
                    debug!("patching isolated node {} with link to {} (cost {})", i, j, patch);
                    costs.set_pair(i, j, patch);
                }
            }
        }

        for i in 0..num_nodes {
            for j in 0..i {
                if costs.get(i, j) <= 0 {
                    costs.set_pair(i, j, 0);
                }
            }
        }

        Ok(Self::with_costs(costs))
    }

    /// Build from a hand-written cost matrix; any non-zero cell is a link
    pub fn from_costs(rows: &[Vec<Cost>]) -> Result<Self, SimError> {
        let costs = SymMatrix::from_rows(rows)
            .ok_or_else(|| SimError::InvalidCostMatrix("matrix is not square".to_string()))?;
        if !costs.is_symmetric() {
            return Err(SimError::InvalidCostMatrix("matrix is not symmetric".to_string()));
        }
        if !costs.has_zero_diagonal() {
            return Err(SimError::InvalidCostMatrix("diagonal must be zero".to_string()));
        }
        Ok(Self::with_costs(costs))
    }

    fn with_costs(costs: SymMatrix) -> Self {
        let size = costs.size();
        let edges = costs
            .upper_entries()
            .map(|(left, right, cost)| Edge { left, right, cost })
            .collect();

        let mut graph = Self {
            nodes: (0..size).map(Node::new).collect(),
            structure: SymMatrix::zeroed(size),
            costs,
            edges,
        };
        graph.rebuild_structure();
        graph
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn costs(&self) -> &SymMatrix {
        &self.costs
    }

    pub fn structure(&self) -> &SymMatrix {
        &self.structure
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn structure_edges(&self) -> Vec<Edge> {
        self.structure
            .upper_entries()
            .map(|(left, right, cost)| Edge { left, right, cost })
            .collect()
    }

    pub fn structure_cost(&self) -> Cost {
        self.structure.upper_entries().map(|(_, _, cost)| cost).sum()
    }

    pub fn eligible_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_eligible()).count()
    }

    /// Recompute the spanning structure over the eligible nodes
    ///
    /// Label state is reset first, so the result only depends on the costs and
    /// the current eligibility of each node. Returns the number of edges taken.
    pub fn rebuild_structure(&mut self) -> usize {
        self.structure.clear();
        for node in &mut self.nodes {
            node.current_label = node.original_id;
            node.label_history.reset();
            node.live_neighbors.clear();
        }

        // cheapest first, equal costs by endpoint ids
        let mut queue = PriorityHeap::with_capacity(self.edges.len(), |a: &Edge, b: &Edge| {
            (a.left, a.right).cmp(&(b.left, b.right))
        });
        for edge in &self.edges {
            queue.push(*edge, edge.cost);
        }

        let mut accepted = 0;
        while let Ok(entry) = queue.pop() {
            let edge = entry.content;
            let (left, right) = (&self.nodes[edge.left], &self.nodes[edge.right]);
            if left.current_label != right.current_label
                && left.is_eligible()
                && right.is_eligible()
            {
                self.merge(edge.left, edge.right);
                self.structure.set_pair(edge.left, edge.right, edge.cost);
                accepted += 1;
            }
        }

        debug!(
            "structure rebuilt: {} edges, cost {}, {} eligible nodes",
            accepted,
            self.structure_cost(),
            self.eligible_count()
        );
        accepted
    }

    /// Mark `target` compromised and its live neighbors affected
    ///
    /// Returns the neighbors `target` had in the structure before the attack.
    pub fn mark_attacked(&mut self, target: NodeId) -> Result<Vec<NodeId>, SimError> {
        self.check_node(target)?;
        self.nodes[target].compromised = true;

        let neighbors: Vec<NodeId> = self.nodes[target].live_neighbors.iter().copied().collect();
        for &neighbor in &neighbors {
            self.mark_affected(neighbor)?;
        }

        // every neighbor already detached itself
        let remaining = self.scrub(target);
        debug_assert!(remaining.is_empty());
        self.roll_back_labels(target, &neighbors);

        debug!("node {} attacked, {} neighbors affected", target, neighbors.len());
        Ok(neighbors)
    }

    pub fn mark_affected(&mut self, target: NodeId) -> Result<(), SimError> {
        self.check_node(target)?;
        self.nodes[target].affected = true;

        let former = self.scrub(target);
        self.roll_back_labels(target, &former);
        Ok(())
    }

    /// Clear both flags; the node rejoins the structure on the next rebuild
    pub fn mark_fixed(&mut self, target: NodeId) -> Result<(), SimError> {
        self.check_node(target)?;
        let node = &mut self.nodes[target];
        node.compromised = false;
        node.affected = false;
        debug!("node {} fixed", target);
        Ok(())
    }

    /// Structure edges disagree on their group label
    pub fn is_partitioned(&self) -> bool {
        let mut labels = self
            .structure
            .upper_entries()
            .flat_map(|(i, j, _)| [i, j])
            .map(|n| self.nodes[n].current_label);

        let partitioned = match labels.next() {
            Some(first) => labels.any(|label| label != first),
            None => false,
        };

        debug!(
            "structure is {}",
            if partitioned { "partitioned" } else { "complete" }
        );
        partitioned
    }

    fn check_node(&self, id: NodeId) -> Result<(), SimError> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(SimError::UnknownNode(id))
        }
    }

    fn is_label_eligible(&self, label: NodeId) -> bool {
        self.nodes[label].is_eligible()
    }

    /// Union step: relabel the larger group label to the smaller one
    fn merge(&mut self, a: NodeId, b: NodeId) {
        let (label_a, label_b) = (self.nodes[a].current_label, self.nodes[b].current_label);
        let (keep, replace) = (label_a.min(label_b), label_a.max(label_b));

        for node in &mut self.nodes {
            if node.current_label == replace {
                node.current_label = keep;
                node.label_history.push(keep);
            }
        }

        self.nodes[a].live_neighbors.insert(b);
        self.nodes[b].live_neighbors.insert(a);
    }

    /// Remove `target` from the structure, returning its former live neighbors
    fn scrub(&mut self, target: NodeId) -> Vec<NodeId> {
        self.structure.clear_node(target);

        let former: Vec<NodeId> = self.nodes[target].live_neighbors.drain(..).collect();
        for &neighbor in &former {
            self.nodes[neighbor].live_neighbors.shift_remove(&target);
        }
        former
    }

    fn roll_back_labels(&mut self, target: NodeId, neighbors: &[NodeId]) {
        if !self.nodes[target].is_eligible() {
            self.nodes[target].current_label = self.nodes[target].original_id;
        }
        for &neighbor in neighbors {
            self.roll_back(neighbor);
        }
    }

    /// Walk down the label history until the label names an eligible node
    fn roll_back(&mut self, id: NodeId) {
        loop {
            let node = &self.nodes[id];
            let label = node.current_label;
            if label == node.original_id || self.is_label_eligible(label) {
                break;
            }

            let top = node.label_history.top();
            if node.label_history.depth() == 1 {
                self.nodes[id].current_label = top;
            } else if !self.is_label_eligible(top) {
                self.nodes[id].label_history.pop();
            } else {
                self.nodes[id].current_label = top;
            }
        }
    }
}
