// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Interpreter Bridge (spec §4.H): the host primitives reachable from gene
bytecode. A `Bridge` is instantiated per gene execution, borrows the
`World` mutably for its lifetime, and exposes one `dispatch` entry point
the interpreter calls for every API-opcode statement it walks.

`CallGene` is the one API the bridge does not implement itself — invoking
another gene's AST requires the interpreter's fuel-tracked call stack, so
`interpreter.rs` special-cases it instead of routing through `dispatch`.
*/

use hidra_brain::{Brain, FlipFlop, GateType, InputSource, OutputAction, OutputSlot};
use hidra_brain::{Connection, IoRole, NeuralNetwork, NodeType};
use hidra_types::{
    ActivationFunction, ExecutionContext, GeneId, InputId, NeuronId, Operator, OutputId, Position, SignalType,
    SynapseId, SynapseSource, SynapseTarget, TargetKind,
};
use hidra_synapse::{Condition, ConditionTarget, Synapse, TemporalOperator};

use crate::world::World;

/// Wraps `v` into `[0, n)` via `((v mod n) + n) mod n` — the bridge's
/// modulus-fallback convention for typed-index arguments. `n == 0` (an
/// empty collection to index into) returns `0`.
pub(crate) fn modulus_index(v: i64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let n = n as i64;
    (((v % n) + n) % n) as usize
}

pub struct Bridge<'w> {
    pub world: &'w mut World,
    pub context: ExecutionContext,
    pub self_neuron: Option<NeuronId>,
    pub system_target: Option<NeuronId>,
    /// Neurons created by `CreateNeuron`/`Mitosis` during this gene's
    /// execution, so the caller can schedule their `Gestation` event.
    pub created_neurons: Vec<NeuronId>,
}

impl<'w> Bridge<'w> {
    pub fn new(world: &'w mut World, context: ExecutionContext, self_neuron: Option<NeuronId>) -> Self {
        let system_target = self_neuron;
        Self { world, context, self_neuron, system_target, created_neurons: Vec::new() }
    }

    /// The target neuron for `GetPosition`, `StoreLVar`, etc.: the system
    /// target in `System` context, else `self`.
    pub fn contextual_target(&self) -> Option<NeuronId> {
        match self.context {
            ExecutionContext::System => self.system_target,
            _ => self.self_neuron,
        }
    }

    /// Dispatches one API call by name. Unrecognized names are treated as
    /// `NOP` (the decoder/AST builder only ever emit names present in the
    /// master table, so this only triggers if the tables drift).
    pub fn dispatch(&mut self, name: &str, args: &[f32]) -> f32 {
        match name {
            "NOP" => 0.0,
            "StoreLVar" => self.store_lvar(args[0], args[1]),
            "LoadLVar" => self.load_lvar(args[0]),
            "StoreGVar" => self.store_gvar(args[0], args[1]),
            "LoadGVar" => self.load_gvar(args[0]),
            "GetSelfId" => self.get_self_id(),
            "GetPosition" => self.get_position(args[0]),
            "CreateNeuron" => self.create_neuron(args[0], args[1], args[2]),
            "Mitosis" => self.mitosis(args[0], args[1], args[2]),
            "Apoptosis" => self.apoptosis(),
            "SetSystemTarget" => self.set_system_target(args[0]),
            "AddSynapse" => self.add_synapse(args[0], args[1], args[2], args[3], args[4]),
            "ModifySynapse" => self.modify_synapse(args[0], args[1], args[2], args[3]),
            "SetSynapseSimpleProperty" => self.set_synapse_simple_property(args[0], args[1], args[2]),
            "SetSynapseCondition" => self.set_synapse_condition(args[0], args[1], args[2], args[3], args[4]),
            "ClearSynapseCondition" => self.clear_synapse_condition(args[0]),
            "GetNeighborCount" => self.get_neighbor_count(args[0]),
            "GetNearestNeighborId" => self.get_nearest_neighbor_id(),
            "GetNearestNeighborPosition" => self.get_nearest_neighbor_position(args[0]),
            "SetBrainType" => self.set_brain_type(args[0]),
            "ConfigureLogicGate" => self.configure_logic_gate(args[0], args[1]),
            "ClearBrain" => self.clear_brain(),
            "AddBrainNode" => self.add_brain_node(args[0], args[1]),
            "AddBrainConnection" => self.add_brain_connection(args[0], args[1], args[2]),
            "RemoveBrainNode" => self.remove_brain_node(args[0]),
            "RemoveBrainConnection" => self.remove_brain_connection(args[0], args[1]),
            "ConfigureOutputNode" => self.configure_output_node(args[0], args[1], args[2]),
            "SetBrainInputSource" => self.set_brain_input_source(args[0], args[1], args[2]),
            "SetNodeActivationFunction" => self.set_node_activation_function(args[0], args[1]),
            "SetBrainConnectionWeight" => self.set_brain_connection_weight(args[0], args[1], args[2]),
            "SetBrainNodeProperty" => self.set_brain_node_property(args[0], args[1], args[2]),
            "SetRefractoryPeriod" => self.set_refractory_period(args[0]),
            "SetThresholdAdaptation" => self.set_threshold_adaptation(args[0]),
            "GetFiringRate" => self.get_firing_rate(),
            "CreateBrain_SimpleFeedForward" => self.create_brain_simple_feed_forward(args[0], args[1], args[2]),
            "CreateBrain_Competitive" => self.create_brain_competitive(args[0], args[1]),
            _ => {
                tracing::warn!(api = name, "dispatch called for an API with no bridge implementation");
                0.0
            }
        }
    }

    fn target_neuron(&self, id: NeuronId) -> Option<&crate::neuron::Neuron> {
        self.world.neurons.get(&id)
    }

    fn store_lvar(&mut self, i: f32, v: f32) -> f32 {
        let i = i as i64;
        if i < 0 || i as usize >= self.world.config.user_lvar_writable_limit {
            return 0.0;
        }
        if let Some(target) = self.contextual_target() {
            if let Some(n) = self.world.neurons.get_mut(&target) {
                n.set_lvar(i as usize, v);
            }
        }
        0.0
    }

    fn load_lvar(&mut self, i: f32) -> f32 {
        let i = i as i64;
        if i < 0 {
            return 0.0;
        }
        self.contextual_target().and_then(|t| self.target_neuron(t)).map(|n| n.lvar(i as usize)).unwrap_or(0.0)
    }

    fn store_gvar(&mut self, i: f32, v: f32) -> f32 {
        let idx = modulus_index(i as i64, self.world.global_hormones.len());
        self.world.global_hormones[idx] = v;
        0.0
    }

    fn load_gvar(&mut self, i: f32) -> f32 {
        let idx = modulus_index(i as i64, self.world.global_hormones.len());
        self.world.global_hormones[idx]
    }

    fn get_self_id(&mut self) -> f32 {
        self.contextual_target().map(|id| id.get() as f32).unwrap_or(0.0)
    }

    fn get_position(&mut self, axis: f32) -> f32 {
        self.contextual_target().and_then(|t| self.target_neuron(t)).map(|n| n.position.axis(axis as i64)).unwrap_or(0.0)
    }

    fn create_neuron(&mut self, x: f32, y: f32, z: f32) -> f32 {
        if !self.context.can_create_neuron() {
            return 0.0;
        }
        let id = self.world.allocate_neuron_id();
        let neuron = crate::neuron::Neuron::new(id, Position::new(x, y, z), &self.world.config);
        self.world.spatial_hash.insert(id, neuron.position);
        self.world.neurons.insert(id, neuron);
        self.system_target = Some(id);
        self.created_neurons.push(id);
        id.get() as f32
    }

    fn mitosis(&mut self, dx: f32, dy: f32, dz: f32) -> f32 {
        if !self.context.can_mitosis() {
            return 0.0;
        }
        let Some(parent_id) = self.contextual_target() else { return 0.0 };
        let Some(parent) = self.world.neurons.get(&parent_id) else { return 0.0 };
        let position = Position::new(parent.position.x + dx, parent.position.y + dy, parent.position.z + dz);
        let mut child = crate::neuron::Neuron::new(self.world.allocate_neuron_id(), position, &self.world.config);
        child.brain = parent.brain.clone();
        let child_id = child.id;
        self.world.spatial_hash.insert(child_id, child.position);
        self.world.neurons.insert(child_id, child);
        self.created_neurons.push(child_id);
        child_id.get() as f32
    }

    fn apoptosis(&mut self) -> f32 {
        if !self.context.can_apoptosis() {
            return 0.0;
        }
        if let Some(target) = self.self_neuron {
            self.world.deactivation_list.push(target);
        }
        0.0
    }

    fn set_system_target(&mut self, id: f32) -> f32 {
        if !self.context.can_set_system_target() {
            return 0.0;
        }
        let requested = NeuronId(id as i64 as u64);
        if self.world.neurons.contains_key(&requested) {
            self.system_target = Some(requested);
        } else {
            let ids: Vec<NeuronId> = self.world.neurons.keys().copied().collect();
            if !ids.is_empty() {
                self.system_target = Some(ids[modulus_index(id as i64, ids.len())]);
            }
        }
        0.0
    }

    fn add_synapse(&mut self, target_kind: f32, id: f32, sig: f32, w: f32, p: f32) -> f32 {
        let Some(source_neuron) = self.contextual_target() else { return 0.0 };
        let target_kind = match target_kind as i64 {
            0 => TargetKind::Neuron,
            1 => TargetKind::Output,
            2 => TargetKind::Input,
            _ => return 0.0,
        };
        let Some(signal_type) = SignalType::from_tag(sig as i64) else { return 0.0 };

        let target = match target_kind {
            TargetKind::Neuron => {
                let ids: Vec<NeuronId> = self.world.neurons.keys().copied().collect();
                if ids.is_empty() {
                    return 0.0;
                }
                let wanted = NeuronId(id as i64 as u64);
                let resolved = if self.world.neurons.contains_key(&wanted) { wanted } else { ids[modulus_index(id as i64, ids.len())] };
                SynapseTarget::Neuron(resolved)
            }
            TargetKind::Output => {
                let ids: Vec<OutputId> = self.world.output_nodes.keys().copied().collect();
                if ids.is_empty() {
                    return 0.0;
                }
                let wanted = OutputId(id as i64 as u64);
                let resolved = if self.world.output_nodes.contains_key(&wanted) { wanted } else { ids[modulus_index(id as i64, ids.len())] };
                SynapseTarget::Output(resolved)
            }
            // `Input` cannot be a synapse *target* — `hidra_types::SynapseTarget`
            // only has `Neuron`/`Output` variants (an external input has
            // nothing downstream to receive a connection into). `TargetKind`
            // carries `Input` for symmetry with `SynapseSource`; a gene
            // requesting it here is a no-op.
            TargetKind::Input => return 0.0,
        };

        let synapse_id = self.world.allocate_synapse_id();
        let mut synapse = Synapse::new(synapse_id, SynapseSource::Neuron(source_neuron), target, w, signal_type);
        synapse.parameter = p;
        self.world.synapses.insert(synapse_id, synapse);
        if let Some(owner) = self.world.neurons.get_mut(&source_neuron) {
            owner.owned_synapses.push(synapse_id);
        }
        synapse_id.get() as f32
    }

    fn owned_synapse_at(&self, local_idx: f32) -> Option<SynapseId> {
        let owner = self.contextual_target()?;
        let owned = &self.world.neurons.get(&owner)?.owned_synapses;
        if owned.is_empty() {
            return None;
        }
        Some(owned[modulus_index(local_idx as i64, owned.len())])
    }

    fn modify_synapse(&mut self, local_idx: f32, w: f32, p: f32, sig: f32) -> f32 {
        let Some(sid) = self.owned_synapse_at(local_idx) else { return 0.0 };
        if let Some(synapse) = self.world.synapses.get_mut(&sid) {
            synapse.weight = w;
            synapse.parameter = p;
            if let Some(st) = SignalType::from_tag(sig as i64) {
                synapse.signal_type = st;
            }
        }
        0.0
    }

    fn set_synapse_simple_property(&mut self, local_idx: f32, prop: f32, v: f32) -> f32 {
        let Some(sid) = self.owned_synapse_at(local_idx) else { return 0.0 };
        let Some(synapse) = self.world.synapses.get_mut(&sid) else { return 0.0 };
        match prop as i64 {
            0 => synapse.weight = v,
            1 => synapse.parameter = v,
            2 => {
                if let Some(st) = SignalType::from_tag(v as i64) {
                    synapse.signal_type = st;
                }
            }
            _ => {}
        }
        0.0
    }

    fn set_synapse_condition(&mut self, local_idx: f32, type_tag: f32, p1: f32, p2: f32, _p3: f32) -> f32 {
        let Some(sid) = self.owned_synapse_at(local_idx) else { return 0.0 };
        let Some(operator) = Operator::from_tag(p2 as i64) else {
            // Relational/LVar/GVar all carry their operator in p2; an
            // unrecognized tag there makes the whole condition a no-op.
            if !matches!(type_tag as i64, 4..=7) {
                return 0.0;
            }
            Operator::Eq // unused by Temporal branches below
        };
        let condition = match type_tag as i64 {
            0 => Condition::LVar { target: ConditionTarget::Source, lvar_index: p1 as usize, operator, value: _p3 },
            1 => Condition::LVar { target: ConditionTarget::Target, lvar_index: p1 as usize, operator, value: _p3 },
            2 => Condition::GVar { gvar_index: p1 as usize, operator, value: _p3 },
            3 => Condition::Relational { operator: Operator::from_tag(p1 as i64).unwrap_or(Operator::Eq) },
            4 => Condition::Temporal { operator: TemporalOperator::RisingEdge, threshold: p1, duration: 0, sustained_counter: 0 },
            5 => Condition::Temporal { operator: TemporalOperator::FallingEdge, threshold: p1, duration: 0, sustained_counter: 0 },
            6 => Condition::Temporal { operator: TemporalOperator::Changed, threshold: p1, duration: 0, sustained_counter: 0 },
            7 => Condition::Temporal { operator: TemporalOperator::Sustained, threshold: p1, duration: p2 as u32, sustained_counter: 0 },
            _ => return 0.0,
        };
        if let Some(synapse) = self.world.synapses.get_mut(&sid) {
            synapse.condition = Some(condition);
        }
        0.0
    }

    fn clear_synapse_condition(&mut self, local_idx: f32) -> f32 {
        let Some(sid) = self.owned_synapse_at(local_idx) else { return 0.0 };
        if let Some(synapse) = self.world.synapses.get_mut(&sid) {
            synapse.condition = None;
        }
        0.0
    }

    fn get_neighbor_count(&mut self, r: f32) -> f32 {
        let Some(target) = self.contextual_target().and_then(|t| self.target_neuron(t)) else { return 0.0 };
        self.world.spatial_hash.count_neighbors(target.position, r) as f32
    }

    fn get_nearest_neighbor_id(&mut self) -> f32 {
        let Some(target) = self.contextual_target().and_then(|t| self.target_neuron(t)) else { return 0.0 };
        let radius = self.world.config.competition_radius;
        self.world.spatial_hash.nearest_neighbor(target.position, radius).map(|(id, _)| id.get() as f32).unwrap_or(0.0)
    }

    fn get_nearest_neighbor_position(&mut self, axis: f32) -> f32 {
        let Some(target) = self.contextual_target().and_then(|t| self.target_neuron(t)) else { return 0.0 };
        let radius = self.world.config.competition_radius;
        self.world
            .spatial_hash
            .nearest_neighbor(target.position, radius)
            .map(|(_, pos)| pos.axis(axis as i64))
            .unwrap_or(0.0)
    }

    fn with_target_neuron_mut<F: FnOnce(&mut crate::neuron::Neuron)>(&mut self, f: F) -> f32 {
        if let Some(id) = self.contextual_target() {
            if let Some(n) = self.world.neurons.get_mut(&id) {
                f(n);
            }
        }
        0.0
    }

    fn set_brain_type(&mut self, type_tag: f32) -> f32 {
        self.with_target_neuron_mut(|n| {
            n.brain = match type_tag as i64 {
                0 => Some(Brain::NeuralNetwork(NeuralNetwork::new())),
                1 => Some(Brain::LogicGate(hidra_brain::LogicGate::new_combinational(
                    GateType::Buffer,
                    0.5,
                    Vec::new(),
                    OutputSlot { action: OutputAction::Move, value: 0.0 },
                ))),
                _ => n.brain.take(),
            };
        })
    }

    /// `gate_type_tag` selects a combinational `GateType` (0-7) or, for tags
    /// 8-10, a clocked flip-flop (D/T/Jk) instead — the combinational/
    /// sequential split is folded into one tag space since a neuron's brain
    /// is one or the other, never both.
    fn configure_logic_gate(&mut self, gate_type_tag: f32, threshold: f32) -> f32 {
        let tag = gate_type_tag as i64;
        let slot = OutputSlot { action: OutputAction::Move, value: 0.0 };
        let gate = if let Some(gate_type) = gate_type_from_tag(tag) {
            hidra_brain::LogicGate::new_combinational(gate_type, threshold, Vec::new(), slot)
        } else if let Some(flip_flop) = flip_flop_from_tag(tag) {
            hidra_brain::LogicGate::new_flip_flop(flip_flop, threshold, Vec::new(), slot)
        } else {
            return 0.0;
        };
        self.with_target_neuron_mut(|n| n.brain = Some(Brain::LogicGate(gate)))
    }

    fn clear_brain(&mut self) -> f32 {
        self.with_target_neuron_mut(|n| n.brain = None)
    }

    fn add_brain_node(&mut self, node_type_tag: f32, activation_tag: f32) -> f32 {
        let Some(node_type) = node_type_from_tag(node_type_tag as i64) else { return 0.0 };
        let Some(activation) = ActivationFunction::from_tag(activation_tag as i64) else { return 0.0 };
        let Some(id) = self.contextual_target() else { return 0.0 };
        let Some(n) = self.world.neurons.get_mut(&id) else { return 0.0 };
        if n.brain.is_none() {
            n.brain = Some(Brain::NeuralNetwork(NeuralNetwork::new()));
        }
        match &mut n.brain {
            Some(Brain::NeuralNetwork(nn)) => nn.add_node_auto(node_type, 0.0, activation) as f32,
            _ => 0.0,
        }
    }

    fn add_brain_connection(&mut self, from: f32, to: f32, weight: f32) -> f32 {
        self.with_neural_network(|nn| {
            if nn.add_connection(Connection { from_id: from as u32, to_id: to as u32, weight }) {
                1.0
            } else {
                0.0
            }
        })
        .unwrap_or(0.0)
    }

    fn remove_brain_node(&mut self, node_id: f32) -> f32 {
        self.with_neural_network(|nn| if nn.remove_node(node_id as u32) { 1.0 } else { 0.0 }).unwrap_or(0.0)
    }

    fn remove_brain_connection(&mut self, from: f32, to: f32) -> f32 {
        self.with_neural_network(|nn| if nn.remove_connection(from as u32, to as u32) { 1.0 } else { 0.0 }).unwrap_or(0.0)
    }

    fn configure_output_node(&mut self, node_id: f32, action_type: f32, action_param: f32) -> f32 {
        let action = match action_type as i64 {
            0 => OutputAction::SetOutputValue(OutputId(action_param as i64 as u64)),
            1 => OutputAction::ExecuteGene(GeneId(action_param as i64 as u32)),
            2 => OutputAction::Move,
            _ => return 0.0,
        };
        self.with_neural_network(|nn| {
            if let Some(node) = nn.node_mut(node_id as u32) {
                node.node_type = NodeType::Output;
            }
            nn.set_node_io(node_id as u32, IoRole::Output(action));
        });
        0.0
    }

    /// For a `NeuralNetwork` brain, `node_id` selects an existing node to
    /// make an input. For a `LogicGate` brain (which has no addressable
    /// nodes), `node_id` is instead a positional slot in `input_map`,
    /// growing the vector with `ActivationPotential` placeholders as needed.
    fn set_brain_input_source(&mut self, node_id: f32, source_type: f32, source_index: f32) -> f32 {
        let source = match source_type as i64 {
            0 => InputSource::ActivationPotential,
            1 => InputSource::LocalVariable(source_index.max(0.0) as usize),
            2 => InputSource::GlobalHormone(source_index.max(0.0) as usize),
            3 => InputSource::ConstantOne,
            4 => InputSource::Health,
            5 => InputSource::Age,
            _ => return 0.0,
        };
        let Some(id) = self.contextual_target() else { return 0.0 };
        let Some(n) = self.world.neurons.get_mut(&id) else { return 0.0 };
        match &mut n.brain {
            Some(Brain::NeuralNetwork(nn)) => {
                if let Some(node) = nn.node_mut(node_id as u32) {
                    node.node_type = NodeType::Input;
                }
                nn.set_node_io(node_id as u32, IoRole::Input(source));
            }
            Some(Brain::LogicGate(lg)) => {
                let slot = node_id.max(0.0) as usize;
                if slot >= lg.input_map.len() {
                    lg.input_map.resize(slot + 1, InputSource::ActivationPotential);
                }
                lg.input_map[slot] = source;
            }
            None => {}
        }
        0.0
    }

    fn set_node_activation_function(&mut self, node_id: f32, activation_tag: f32) -> f32 {
        let Some(activation) = ActivationFunction::from_tag(activation_tag as i64) else { return 0.0 };
        self.with_neural_network(|nn| {
            nn.set_node_activation(node_id as u32, activation);
        });
        0.0
    }

    fn set_brain_connection_weight(&mut self, from: f32, to: f32, weight: f32) -> f32 {
        self.with_neural_network(|nn| {
            nn.set_connection_weight(from as u32, to as u32, weight);
        });
        0.0
    }

    fn set_brain_node_property(&mut self, node_id: f32, prop: f32, value: f32) -> f32 {
        self.with_neural_network(|nn| {
            if prop as i64 == 0 {
                nn.set_node_bias(node_id as u32, value);
            }
        });
        0.0
    }

    fn set_refractory_period(&mut self, value: f32) -> f32 {
        self.with_target_neuron_mut(|n| n.set_lvar(hidra_types::LVAR_REFRACTORY_PERIOD, value))
    }

    fn set_threshold_adaptation(&mut self, factor: f32) -> f32 {
        self.with_target_neuron_mut(|n| n.set_lvar(hidra_types::LVAR_THRESHOLD_ADAPTATION_FACTOR, factor))
    }

    fn get_firing_rate(&mut self) -> f32 {
        self.contextual_target().and_then(|t| self.target_neuron(t)).map(|n| n.firing_rate()).unwrap_or(0.0)
    }

    fn with_neural_network<T>(&mut self, f: impl FnOnce(&mut NeuralNetwork) -> T) -> Option<T> {
        let id = self.contextual_target()?;
        let n = self.world.neurons.get_mut(&id)?;
        match &mut n.brain {
            Some(Brain::NeuralNetwork(nn)) => Some(f(nn)),
            _ => None,
        }
    }

    /// Builds a fully-connected feed-forward network: `num_inputs` nodes
    /// reading `ActivationPotential`, through `num_hidden` `Tanh` nodes, to
    /// `num_outputs` `SetOutputValue` nodes, fully wired input->hidden and
    /// hidden->output with unit weights.
    fn create_brain_simple_feed_forward(&mut self, num_inputs: f32, num_hidden: f32, num_outputs: f32) -> f32 {
        let ni = num_inputs.max(0.0) as u32;
        let nh = num_hidden.max(0.0) as u32;
        let no = num_outputs.max(0.0) as u32;
        let mut nn = NeuralNetwork::new();
        let inputs: Vec<u32> = (0..ni)
            .map(|_| nn.add_node_auto(NodeType::Input, 0.0, ActivationFunction::Linear))
            .collect();
        for &id in &inputs {
            nn.set_node_io(id, IoRole::Input(InputSource::ActivationPotential));
        }
        let hidden: Vec<u32> = (0..nh).map(|_| nn.add_node_auto(NodeType::Hidden, 0.0, ActivationFunction::Tanh)).collect();
        let outputs: Vec<u32> = (0..no)
            .map(|i| nn.add_node_auto(NodeType::Output, 0.0, ActivationFunction::Linear))
            .enumerate()
            .map(|(i, id)| {
                nn.set_node_io(id, IoRole::Output(OutputAction::SetOutputValue(OutputId(i as u64))));
                id
            })
            .collect();
        for &i in &inputs {
            for &h in &hidden {
                nn.add_connection(Connection { from_id: i, to_id: h, weight: 1.0 });
            }
        }
        let from_layer = if hidden.is_empty() { &inputs } else { &hidden };
        for &f in from_layer {
            for &o in &outputs {
                nn.add_connection(Connection { from_id: f, to_id: o, weight: 1.0 });
            }
        }
        self.with_target_neuron_mut(|n| n.brain = Some(Brain::NeuralNetwork(nn)))
    }

    /// A simplified winner-take-all brain: one activation-potential input
    /// feeds `num_outputs` output nodes through independently-weighted
    /// direct connections; `radius` is stored as a node property on the
    /// input for genes to read back via `SetBrainNodeProperty`'s inverse,
    /// not used in the forward pass itself (full lateral-inhibition
    /// competitive dynamics are out of this core's scope).
    fn create_brain_competitive(&mut self, num_outputs: f32, radius: f32) -> f32 {
        let no = num_outputs.max(1.0) as u32;
        let mut nn = NeuralNetwork::new();
        let input = nn.add_node_auto(NodeType::Input, radius, ActivationFunction::Linear);
        nn.set_node_io(input, IoRole::Input(InputSource::ActivationPotential));
        for i in 0..no {
            let output = nn.add_node_auto(NodeType::Output, 0.0, ActivationFunction::Linear);
            nn.set_node_io(output, IoRole::Output(OutputAction::SetOutputValue(OutputId(i as u64))));
            nn.add_connection(Connection { from_id: input, to_id: output, weight: 1.0 });
        }
        self.with_target_neuron_mut(|n| n.brain = Some(Brain::NeuralNetwork(nn)))
    }
}

fn gate_type_from_tag(tag: i64) -> Option<GateType> {
    match tag {
        0 => Some(GateType::Buffer),
        1 => Some(GateType::Not),
        2 => Some(GateType::And),
        3 => Some(GateType::Or),
        4 => Some(GateType::Nand),
        5 => Some(GateType::Nor),
        6 => Some(GateType::Xor),
        7 => Some(GateType::Xnor),
        _ => None,
    }
}

fn node_type_from_tag(tag: i64) -> Option<NodeType> {
    match tag {
        0 => Some(NodeType::Input),
        1 => Some(NodeType::Hidden),
        2 => Some(NodeType::Output),
        _ => None,
    }
}

fn flip_flop_from_tag(tag: i64) -> Option<FlipFlop> {
    match tag {
        8 => Some(FlipFlop::D),
        9 => Some(FlipFlop::T),
        10 => Some(FlipFlop::Jk),
        _ => None,
    }
}
