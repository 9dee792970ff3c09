// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Feed-forward acyclic neural network brain (spec §4.D).
//!
//! Nodes and their outgoing edges are kept in `BTreeMap`s rather than
//! hashmaps so every traversal — topological sort, the dictionary-order
//! fallback, mutation target selection — iterates node ids in ascending
//! order without a separate sort step, matching the "all per-tick
//! traversals are by ascending id" determinism invariant used throughout
//! this workspace.

use std::collections::{BTreeMap, BTreeSet};

use hidra_rng::Rng;
use hidra_types::ActivationFunction;
use serde::{Deserialize, Serialize};

use crate::{BrainError, InputSource, OutputAction, OutputSlot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeType {
    Input,
    Hidden,
    Output,
}

/// Routing metadata carried only by input/output nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IoRole {
    Input(InputSource),
    Output(OutputAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub node_type: NodeType,
    pub bias: f32,
    pub activation: ActivationFunction,
    pub io: Option<IoRole>,
    /// Transient working value, valid only during/after an `evaluate()`
    /// call. Not meaningful to read before the first evaluation.
    #[serde(default)]
    pub value: f32,
}

impl Node {
    pub fn new(id: u32, node_type: NodeType, bias: f32, activation: ActivationFunction) -> Self {
        Self { id, node_type, bias, activation, io: None, value: 0.0 }
    }

    pub fn with_io(mut self, io: IoRole) -> Self {
        self.io = Some(io);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from_id: u32,
    pub to_id: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeuralNetwork {
    nodes: BTreeMap<u32, Node>,
    /// Outgoing edges, keyed by `from_id`.
    edges: BTreeMap<u32, Vec<Connection>>,
    #[serde(default)]
    next_node_id: u32,
    #[serde(skip)]
    topo_cache: Option<Vec<u32>>,
}

impl NeuralNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node_ids(&self) -> Vec<u32> {
        self.nodes.keys().copied().collect()
    }

    /// Allocates and inserts a fresh node, returning its new id. Bridge
    /// callers that add nodes via bytecode never pick ids themselves — the
    /// network hands one out, mirroring how neuron/synapse ids are always
    /// World-allocated rather than caller-chosen.
    pub fn add_node_auto(&mut self, node_type: NodeType, bias: f32, activation: ActivationFunction) -> u32 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.add_node(Node::new(id, node_type, bias, activation));
        id
    }

    /// Inserts `node` if its id is not already present. Returns `false`
    /// (no-op) if the id is taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id, node);
        self.topo_cache = None;
        true
    }

    pub fn remove_node(&mut self, id: u32) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.edges.remove(&id);
        for conns in self.edges.values_mut() {
            conns.retain(|c| c.to_id != id);
        }
        self.topo_cache = None;
        true
    }

    /// Adds a connection unless it would create a cycle (including a
    /// self-loop) or either endpoint doesn't exist. Cycle detection follows
    /// `inflectrix-neat`'s approach: a new edge `from -> to` is cyclic iff
    /// `from` is already reachable from `to`.
    pub fn add_connection(&mut self, conn: Connection) -> bool {
        if conn.from_id == conn.to_id {
            return false;
        }
        if !self.nodes.contains_key(&conn.from_id) || !self.nodes.contains_key(&conn.to_id) {
            return false;
        }
        if self.is_reachable(conn.to_id, conn.from_id) {
            return false;
        }
        self.edges.entry(conn.from_id).or_default().push(conn);
        self.topo_cache = None;
        true
    }

    pub fn set_connection_weight(&mut self, from_id: u32, to_id: u32, weight: f32) -> bool {
        if let Some(conns) = self.edges.get_mut(&from_id) {
            if let Some(c) = conns.iter_mut().find(|c| c.to_id == to_id) {
                c.weight = weight;
                return true;
            }
        }
        false
    }

    pub fn set_node_io(&mut self, id: u32, io: IoRole) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.io = Some(io);
                true
            }
            None => false,
        }
    }

    pub fn set_node_activation(&mut self, id: u32, activation: ActivationFunction) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.activation = activation;
                true
            }
            None => false,
        }
    }

    pub fn set_node_bias(&mut self, id: u32, bias: f32) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.bias = bias;
                true
            }
            None => false,
        }
    }

    pub fn remove_connection(&mut self, from_id: u32, to_id: u32) -> bool {
        if let Some(conns) = self.edges.get_mut(&from_id) {
            let before = conns.len();
            conns.retain(|c| c.to_id != to_id);
            if conns.len() != before {
                self.topo_cache = None;
                return true;
            }
        }
        false
    }

    fn is_reachable(&self, start: u32, target: u32) -> bool {
        let mut visited: BTreeSet<u32> = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(conns) = self.edges.get(&node) {
                for c in conns {
                    stack.push(c.to_id);
                }
            }
        }
        false
    }

    /// Kahn's algorithm over the current node/edge set, using a `BTreeSet`
    /// frontier so ties among simultaneously-ready nodes resolve in
    /// ascending id order. Returns `(order, used_fallback)`; `used_fallback`
    /// is true only if a cycle somehow slipped past `add_connection` (it
    /// shouldn't), in which case the unresolved remainder is appended in
    /// ascending id order so evaluation can still proceed.
    fn topological_order(&self) -> (Vec<u32>, bool) {
        let mut in_degree: BTreeMap<u32, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        for conns in self.edges.values() {
            for c in conns {
                *in_degree.entry(c.to_id).or_insert(0) += 1;
            }
        }

        let mut frontier: BTreeSet<u32> =
            in_degree.iter().filter(|(_, &d)| d == 0).map(|(&id, _)| id).collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(&id) = frontier.iter().next() {
            frontier.remove(&id);
            order.push(id);
            if let Some(conns) = self.edges.get(&id) {
                for c in conns {
                    if let Some(d) = in_degree.get_mut(&c.to_id) {
                        *d -= 1;
                        if *d == 0 {
                            frontier.insert(c.to_id);
                        }
                    }
                }
            }
        }

        let used_fallback = order.len() != self.nodes.len();
        if used_fallback {
            for id in self.nodes.keys() {
                if !order.contains(id) {
                    order.push(*id);
                }
            }
        }
        (order, used_fallback)
    }

    /// Ascending-id input node ids. Inputs are matched positionally to this
    /// order.
    fn input_ids(&self) -> Vec<u32> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.node_type == NodeType::Input)
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn input_sources(&self) -> Vec<InputSource> {
        self.nodes
            .values()
            .filter(|n| n.node_type == NodeType::Input)
            .filter_map(|n| match n.io {
                Some(IoRole::Input(src)) => Some(src),
                _ => None,
            })
            .collect()
    }

    pub fn output_slots(&self) -> Vec<OutputSlot> {
        self.nodes
            .values()
            .filter(|n| n.node_type == NodeType::Output)
            .filter_map(|n| match n.io {
                Some(IoRole::Output(action)) => Some(OutputSlot { action, value: n.value }),
                _ => None,
            })
            .collect()
    }

    /// Runs one evaluation: seed input nodes with `inputs` (matched
    /// positionally to ascending-id input nodes), apply each non-input
    /// node's activation function in topological order, and propagate
    /// `activation(value) * weight` along outgoing edges. Output values are
    /// read back afterward via `output_slots()`.
    pub fn evaluate(&mut self, inputs: &[f32]) -> Result<(), BrainError> {
        let input_ids = self.input_ids();
        if inputs.len() != input_ids.len() {
            return Err(BrainError::InputCountMismatch { expected: input_ids.len(), actual: inputs.len() });
        }

        if self.topo_cache.is_none() {
            let (order, used_fallback) = self.topological_order();
            if used_fallback {
                tracing::warn!(node_count = self.nodes.len(), "neural network had a residual cycle; falling back to dictionary order");
            }
            self.topo_cache = Some(order);
        }

        for node in self.nodes.values_mut() {
            node.value = node.bias;
        }
        for (i, &id) in input_ids.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.value += inputs[i];
            }
        }

        let order = self.topo_cache.as_ref().expect("populated above").clone();
        for id in order {
            let activated = match self.nodes.get_mut(&id) {
                Some(node) => {
                    if node.node_type != NodeType::Input {
                        node.value = node.activation.apply(node.value);
                    }
                    node.value
                }
                None => continue,
            };
            if let Some(conns) = self.edges.get(&id) {
                for c in conns {
                    if let Some(target) = self.nodes.get_mut(&c.to_id) {
                        target.value += activated * c.weight;
                    }
                }
            }
        }
        Ok(())
    }

    /// Clears transient per-evaluation state without touching topology.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.value = 0.0;
        }
    }

    /// Perturbs one uniformly-chosen weight and one uniformly-chosen bias
    /// by `(u * 2 - 1) * rate`, where `u` is drawn fresh for each from the
    /// simulation's deterministic RNG.
    pub fn mutate(&mut self, rate: f32, rng: &mut Rng) {
        let edge_count: usize = self.edges.values().map(|v| v.len()).sum();
        if edge_count > 0 {
            let target = rng.next_int(0, edge_count as i64) as usize;
            let mut seen = 0usize;
            'outer: for conns in self.edges.values_mut() {
                for c in conns.iter_mut() {
                    if seen == target {
                        c.weight += (rng.next_f32_unit() * 2.0 - 1.0) * rate;
                        break 'outer;
                    }
                    seen += 1;
                }
            }
            self.topo_cache = None;
        }

        if !self.nodes.is_empty() {
            let ids: Vec<u32> = self.nodes.keys().copied().collect();
            let pick = ids[rng.next_int(0, ids.len() as i64) as usize];
            if let Some(node) = self.nodes.get_mut(&pick) {
                node.bias += (rng.next_f32_unit() * 2.0 - 1.0) * rate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidra_types::ActivationFunction;

    fn input(id: u32) -> Node {
        Node::new(id, NodeType::Input, 0.0, ActivationFunction::Linear).with_io(IoRole::Input(InputSource::ActivationPotential))
    }

    fn hidden(id: u32) -> Node {
        Node::new(id, NodeType::Hidden, 0.0, ActivationFunction::Tanh)
    }

    fn output(id: u32, out: hidra_types::OutputId) -> Node {
        Node::new(id, NodeType::Output, 0.0, ActivationFunction::Linear)
            .with_io(IoRole::Output(OutputAction::SetOutputValue(out)))
    }

    #[test]
    fn rejects_self_loop_and_cycles() {
        let mut nn = NeuralNetwork::new();
        nn.add_node(input(0));
        nn.add_node(hidden(1));
        assert!(!nn.add_connection(Connection { from_id: 0, to_id: 0, weight: 1.0 }));
        assert!(nn.add_connection(Connection { from_id: 0, to_id: 1, weight: 1.0 }));
        assert!(!nn.add_connection(Connection { from_id: 1, to_id: 0, weight: 1.0 }));
    }

    #[test]
    fn evaluate_propagates_through_hidden_layer() {
        use hidra_types::OutputId;
        let mut nn = NeuralNetwork::new();
        nn.add_node(input(0));
        nn.add_node(output(1, OutputId(0)));
        nn.add_connection(Connection { from_id: 0, to_id: 1, weight: 2.0 });

        nn.evaluate(&[0.5]).unwrap();
        let outputs = nn.output_slots();
        assert_eq!(outputs.len(), 1);
        assert!((outputs[0].value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn evaluate_rejects_wrong_input_count() {
        let mut nn = NeuralNetwork::new();
        nn.add_node(input(0));
        let err = nn.evaluate(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, BrainError::InputCountMismatch { expected: 1, actual: 2 });
    }

    #[test]
    fn topological_order_is_deterministic_across_equivalent_builds() {
        let mut a = NeuralNetwork::new();
        let mut b = NeuralNetwork::new();
        for nn in [&mut a, &mut b] {
            nn.add_node(input(0));
            nn.add_node(hidden(2));
            nn.add_node(hidden(1));
            nn.add_connection(Connection { from_id: 0, to_id: 1, weight: 1.0 });
            nn.add_connection(Connection { from_id: 0, to_id: 2, weight: 1.0 });
        }
        let (order_a, _) = a.topological_order();
        let (order_b, _) = b.topological_order();
        assert_eq!(order_a, order_b);
    }
}
