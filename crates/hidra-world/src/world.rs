// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
The simulation world and its 9-phase tick loop (spec §4.I). `World` is the
only globally mutable object in this crate — there is no process-wide
singleton state, matching spec §9's "global mutable state" design note.
*/

use std::collections::BTreeMap;

use hidra_bytecode::compile_genome;
use hidra_config::Config;
use hidra_events::{Event, EventKind, EventQueue, PendingEvent};
use hidra_rng::Rng;
use hidra_spatial::SpatialHash;
use hidra_synapse::{ConditionContext, Synapse};
use hidra_types::{
    lvars::*, ExecutionContext, GeneId, InputId, NeuronId, OutputId, Position, SignalType, SynapseId, SynapseSource,
    SynapseTarget,
};

use crate::error::WorldError;
use crate::interpreter::execute_gene;
use crate::neuron::Neuron;

/// An external-world input terminal (spec §3): written by the environment,
/// read by synapses whose `source` is `SynapseSource::Input`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct InputNode {
    pub id: InputId,
    pub value: f32,
}

/// An external-world output terminal: written by neuron brains, read by
/// the environment.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct OutputNode {
    pub id: OutputId,
    pub value: f32,
}

/// The self-describing, serializable document spec §6's "Persisted state"
/// describes: everything needed to resume a run bit-for-bit except the
/// non-cached indexes (`spatial_hash`, `compiled_genome`'s parsed ASTs),
/// which `World::from_snapshot` rebuilds from `genome_source` and the
/// neuron positions on load.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WorldSnapshot {
    pub config: Config,
    pub current_tick: u64,
    pub prng_state: (u64, u64),
    pub genome_source: String,
    pub neurons: Vec<Neuron>,
    pub synapses: Vec<Synapse>,
    pub input_nodes: Vec<InputNode>,
    pub output_nodes: Vec<OutputNode>,
    pub global_hormones: Vec<f32>,
    pub events: Vec<Event>,
    pub next_sequence_id: u64,
    pub next_neuron_id: u64,
    pub next_synapse_id: u64,
    pub next_input_id: u64,
    pub next_output_id: u64,
    pub deactivation_list: Vec<NeuronId>,
    pub metrics_ring: Vec<MetricsSample>,
}

/// One aggregated snapshot pushed to the metrics ring when
/// `config.metrics_enabled` and `current_tick % metrics_collection_interval == 0`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSample {
    pub tick: u64,
    pub neuron_count: usize,
    pub mean_firing_rate: f32,
    pub mean_soma_potential: f32,
    pub mean_health: f32,
    pub synapse_count: Option<usize>,
    pub io_sample: Option<(usize, usize)>,
}

/// The sole globally-mutable object in the simulation (spec §9): every
/// other type here either borrows from it transiently (`Bridge`) or is an
/// owned, passive value type (`Neuron`, `Synapse`, `Config`). Not `Clone`
/// or directly `Serialize` — `EventQueue`'s internal lock and
/// `SpatialHash`'s derived index aren't meaningfully copied or persisted
/// as-is; `hidra-persistence` builds its own serializable snapshot from a
/// `World`'s public accessors instead of round-tripping this struct.
pub struct World {
    pub(crate) neurons: BTreeMap<NeuronId, Neuron>,
    pub(crate) synapses: BTreeMap<SynapseId, Synapse>,
    pub(crate) input_nodes: BTreeMap<InputId, InputNode>,
    pub(crate) output_nodes: BTreeMap<OutputId, OutputNode>,
    pub(crate) global_hormones: Vec<f32>,
    pub config: Config,
    pub current_tick: u64,
    next_neuron_id: u64,
    next_synapse_id: u64,
    next_input_id: u64,
    next_output_id: u64,
    pub(crate) event_queue: EventQueue,
    pub(crate) spatial_hash: SpatialHash,
    pub(crate) compiled_genome: std::collections::HashMap<u32, hidra_bytecode::Ast>,
    genome_source: String,
    prng: Rng,
    pub(crate) deactivation_list: Vec<NeuronId>,
    metrics_ring: Vec<MetricsSample>,
}

impl World {
    /// Parses `genome_source`, runs Genesis (gene 0) in `System` context,
    /// and schedules a `Gestation` event at tick 1 for every neuron Genesis
    /// created.
    pub fn new(genome_source: impl Into<String>, config: Config) -> Result<Self, WorldError> {
        config.validate()?;
        let genome_source = genome_source.into();
        let compiled_genome = compile_genome(&genome_source, config.system_gene_count);
        let cell_size = if config.competition_radius > 0.0 { config.competition_radius } else { 1.0 };

        let mut world = Self {
            neurons: BTreeMap::new(),
            synapses: BTreeMap::new(),
            input_nodes: BTreeMap::new(),
            output_nodes: BTreeMap::new(),
            global_hormones: vec![0.0; GVAR_COUNT],
            prng: Rng::new(config.seed0, config.seed1),
            config,
            current_tick: 0,
            next_neuron_id: 0,
            next_synapse_id: 0,
            next_input_id: 0,
            next_output_id: 0,
            event_queue: EventQueue::new(),
            spatial_hash: SpatialHash::new(cell_size),
            compiled_genome,
            genome_source,
            deactivation_list: Vec::new(),
            metrics_ring: Vec::new(),
        };

        let mut fuel = world.config.default_gene_fuel;
        let created = execute_gene(&mut world, GeneId::GENESIS, ExecutionContext::System, None, &mut fuel)?;
        for neuron_id in created {
            world.event_queue.push(PendingEvent {
                execution_tick: 1,
                target_id: neuron_id,
                kind: EventKind::ExecuteGene { gene_id: GeneId::GESTATION, context: ExecutionContext::Protected },
            });
        }
        world.rebuild_spatial_hash();
        Ok(world)
    }

    /// Rebuilds a `World` from a previously-saved [`WorldSnapshot`]: the
    /// genome is recompiled from `genome_source` (the compiled ASTs
    /// themselves are never persisted), and the spatial hash is rebuilt
    /// from the restored neuron positions. Genesis is **not** re-run — the
    /// snapshot's neurons already reflect whatever Genesis/Mitosis/gene
    /// activity produced them.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Result<Self, WorldError> {
        snapshot.config.validate()?;
        let compiled_genome = compile_genome(&snapshot.genome_source, snapshot.config.system_gene_count);
        let cell_size = if snapshot.config.competition_radius > 0.0 { snapshot.config.competition_radius } else { 1.0 };

        let mut prng = Rng::new(snapshot.config.seed0, snapshot.config.seed1);
        prng.set_state(snapshot.prng_state);

        let mut world = Self {
            neurons: snapshot.neurons.into_iter().map(|n| (n.id, n)).collect(),
            synapses: snapshot.synapses.into_iter().map(|s| (s.id, s)).collect(),
            input_nodes: snapshot.input_nodes.into_iter().map(|n| (n.id, n)).collect(),
            output_nodes: snapshot.output_nodes.into_iter().map(|n| (n.id, n)).collect(),
            global_hormones: snapshot.global_hormones,
            config: snapshot.config,
            current_tick: snapshot.current_tick,
            next_neuron_id: snapshot.next_neuron_id,
            next_synapse_id: snapshot.next_synapse_id,
            next_input_id: snapshot.next_input_id,
            next_output_id: snapshot.next_output_id,
            event_queue: EventQueue::from_parts(snapshot.events, snapshot.next_sequence_id),
            spatial_hash: SpatialHash::new(cell_size),
            compiled_genome,
            genome_source: snapshot.genome_source,
            prng,
            deactivation_list: snapshot.deactivation_list,
            metrics_ring: snapshot.metrics_ring,
        };
        world.rebuild_spatial_hash();
        Ok(world)
    }

    /// Captures everything needed to resume this run bit-for-bit (spec
    /// §6's "Persisted state"); see [`WorldSnapshot`].
    pub fn to_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            config: self.config.clone(),
            current_tick: self.current_tick,
            prng_state: self.prng.get_state(),
            genome_source: self.genome_source.clone(),
            neurons: self.neurons.values().cloned().collect(),
            synapses: self.synapses.values().cloned().collect(),
            input_nodes: self.input_nodes.values().copied().collect(),
            output_nodes: self.output_nodes.values().copied().collect(),
            global_hormones: self.global_hormones.clone(),
            events: self.event_queue.snapshot(),
            next_sequence_id: self.event_queue.next_sequence_id(),
            next_neuron_id: self.next_neuron_id,
            next_synapse_id: self.next_synapse_id,
            next_input_id: self.next_input_id,
            next_output_id: self.next_output_id,
            deactivation_list: self.deactivation_list.clone(),
            metrics_ring: self.metrics_ring.clone(),
        }
    }

    // -- id allocation --------------------------------------------------

    pub(crate) fn allocate_neuron_id(&mut self) -> NeuronId {
        let id = NeuronId(self.next_neuron_id);
        self.next_neuron_id += 1;
        id
    }

    pub(crate) fn allocate_synapse_id(&mut self) -> SynapseId {
        let id = SynapseId(self.next_synapse_id);
        self.next_synapse_id += 1;
        id
    }

    pub fn allocate_input_node(&mut self) -> InputId {
        let id = InputId(self.next_input_id);
        self.next_input_id += 1;
        self.input_nodes.insert(id, InputNode { id, value: 0.0 });
        id
    }

    pub fn allocate_output_node(&mut self) -> OutputId {
        let id = OutputId(self.next_output_id);
        self.next_output_id += 1;
        self.output_nodes.insert(id, OutputNode { id, value: 0.0 });
        id
    }

    /// Directly creates a synapse without going through bytecode — the
    /// Rust-level "2-variant by signal type" convenience wrapper spec §9
    /// describes; it feeds the same validated primitive bridge `AddSynapse`
    /// uses, just callable from host code (tests, embedding programs)
    /// without needing to author a gene.
    pub fn add_synapse(&mut self, source: SynapseSource, target: SynapseTarget, weight: f32, signal_type: SignalType) -> SynapseId {
        let id = self.allocate_synapse_id();
        let synapse = Synapse::new(id, source, target, weight, signal_type);
        if let SynapseSource::Neuron(nid) = source {
            if let Some(owner) = self.neurons.get_mut(&nid) {
                owner.owned_synapses.push(id);
            }
        }
        self.synapses.insert(id, synapse);
        id
    }

    pub fn create_neuron(&mut self, position: Position) -> NeuronId {
        let id = self.allocate_neuron_id();
        let neuron = Neuron::new(id, position, &self.config);
        self.spatial_hash.insert(id, position);
        self.neurons.insert(id, neuron);
        id
    }

    // -- read-only introspection -----------------------------------------

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(&id)
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.neurons.get_mut(&id)
    }

    pub fn neuron_ids(&self) -> impl Iterator<Item = &NeuronId> {
        self.neurons.keys()
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.get(&id)
    }

    pub fn synapse_mut(&mut self, id: SynapseId) -> Option<&mut Synapse> {
        self.synapses.get_mut(&id)
    }

    pub fn input_value(&self, id: InputId) -> Option<f32> {
        self.input_nodes.get(&id).map(|n| n.value)
    }

    pub fn set_input_value(&mut self, id: InputId, value: f32) {
        if let Some(node) = self.input_nodes.get_mut(&id) {
            node.value = value;
        }
    }

    pub fn output_value(&self, id: OutputId) -> Option<f32> {
        self.output_nodes.get(&id).map(|n| n.value)
    }

    pub fn global_hormone(&self, index: usize) -> f32 {
        self.global_hormones.get(index).copied().unwrap_or(0.0)
    }

    pub fn set_global_hormone(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.global_hormones.get_mut(index) {
            *slot = value;
        }
    }

    /// Events scheduled for exactly `tick` (informational, does not mutate
    /// the queue — spec §6's "Event visibility").
    pub fn events_at(&self, tick: u64) -> Vec<Event> {
        self.event_queue.events_at(tick)
    }

    pub fn metrics_history(&self) -> &[MetricsSample] {
        &self.metrics_ring
    }

    pub fn genome_source(&self) -> &str {
        &self.genome_source
    }

    pub fn prng_state(&self) -> (u64, u64) {
        self.prng.get_state()
    }

    /// Perturbs `id`'s brain in place using the world's own PRNG stream
    /// (spec §3's genetic mutation operator). A no-op if the neuron has no
    /// brain or does not exist. Not invoked automatically anywhere in
    /// `step()` — this is a host-callable operator for embedding programs
    /// driving an evolutionary loop on top of the tick loop, not part of
    /// it.
    pub fn mutate_neuron_brain(&mut self, id: NeuronId, rate: f32) {
        if let Some(brain) = self.neurons.get_mut(&id).and_then(|n| n.brain.as_mut()) {
            brain.mutate(rate, &mut self.prng);
        }
    }

    fn rebuild_spatial_hash(&mut self) {
        self.spatial_hash.clear();
        for (id, neuron) in &self.neurons {
            self.spatial_hash.insert(*id, neuron.position);
        }
    }

    /// Advances the simulation `n` ticks (the `RunFor` convenience spec §5
    /// mentions as holding the world lock for the whole run).
    pub fn run_for(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    // -- the tick loop ----------------------------------------------------

    pub fn step(&mut self) {
        self.dendritic_reset();
        self.immediate_transmission_and_fatigue();
        self.drain_due_events();
        self.threshold_firing();
        self.passive_updates();
        self.lifecycle();
        self.collect_metrics();
        self.current_tick += 1;
    }

    /// Phase 1: every active neuron's `DendriticPotential <- 0`.
    fn dendritic_reset(&mut self) {
        for neuron in self.neurons.values_mut() {
            neuron.set_dendritic_potential(0.0);
        }
    }

    fn source_value_of(&self, source: SynapseSource) -> Option<f32> {
        match source {
            SynapseSource::Neuron(id) => self.neurons.get(&id).map(|n| n.soma_potential()),
            SynapseSource::Input(id) => self.input_nodes.get(&id).map(|n| n.value),
        }
    }

    fn source_lvars_of(&self, source: SynapseSource) -> Option<Vec<f32>> {
        match source {
            SynapseSource::Neuron(id) => self.neurons.get(&id).map(|n| n.local_variables.clone()),
            SynapseSource::Input(_) => None,
        }
    }

    fn target_lvars_of(&self, target: SynapseTarget) -> Option<Vec<f32>> {
        match target {
            SynapseTarget::Neuron(id) => self.neurons.get(&id).map(|n| n.local_variables.clone()),
            SynapseTarget::Output(_) => None,
        }
    }

    /// Phase 2: for every synapse (ascending id) whose source resolves,
    /// evaluate its condition and, if it holds, apply Immediate/Persistent
    /// semantics. `previous_source_value` updates and fatigue decay happen
    /// for every resolved synapse regardless of whether the condition held.
    fn immediate_transmission_and_fatigue(&mut self) {
        let synapse_ids: Vec<SynapseId> = self.synapses.keys().copied().collect();
        for sid in synapse_ids {
            let (source, target, previous_source_value) = match self.synapses.get(&sid) {
                Some(s) => (s.source, s.target, s.previous_source_value),
                None => continue,
            };
            let Some(source_value) = self.source_value_of(source) else { continue };
            let source_lvars = self.source_lvars_of(source);
            let target_lvars = self.target_lvars_of(target);

            let ctx = ConditionContext {
                source_value,
                previous_source_value,
                source_lvars: source_lvars.as_deref(),
                target_lvars: target_lvars.as_deref(),
                gvars: &self.global_hormones,
            };

            let Some(synapse) = self.synapses.get_mut(&sid) else { continue };
            let holds = synapse.condition_holds(&ctx);

            if holds {
                let contribution = match synapse.signal_type {
                    SignalType::Immediate => Some(synapse.immediate_contribution(source_value)),
                    SignalType::Persistent => Some(synapse.persistent_contribution()),
                    SignalType::Delayed | SignalType::Transient => None,
                };
                if let Some(contribution) = contribution {
                    if let SynapseTarget::Neuron(nid) = target {
                        if let Some(t) = self.neurons.get_mut(&nid) {
                            let updated = t.dendritic_potential() + contribution;
                            t.set_dendritic_potential(updated);
                        }
                    }
                    if let Some(synapse) = self.synapses.get_mut(&sid) {
                        synapse.record_transmission();
                    }
                }
            }

            if let Some(synapse) = self.synapses.get_mut(&sid) {
                synapse.update_previous_source_value(source_value);
                synapse.decay_fatigue();
            }
        }
    }

    /// Phase 3: drains due events, processing pulses before everything
    /// else, each group in ascending `(tick, sequence_id)` order.
    fn drain_due_events(&mut self) {
        let mut pulses = Vec::new();
        let mut others = Vec::new();
        self.event_queue.process_due(self.current_tick, &mut pulses, &mut others);

        for event in pulses {
            if let EventKind::PotentialPulse { amount } = event.kind {
                if let Some(n) = self.neurons.get_mut(&event.target_id) {
                    let updated = n.soma_potential() + amount;
                    n.set_soma_potential(updated);
                }
            }
        }

        for event in others {
            match event.kind {
                EventKind::ExecuteGene { gene_id, context } => {
                    self.run_gene_event(gene_id, context, event.target_id);
                }
                EventKind::Activate => {
                    self.activate_neuron(event.target_id);
                }
                EventKind::PotentialPulse { .. } => unreachable!("pulses are drained separately"),
            }
        }
    }

    fn run_gene_event(&mut self, gene_id: GeneId, context: ExecutionContext, target: NeuronId) {
        if !self.neurons.contains_key(&target) {
            return;
        }
        let mut fuel = self.config.default_gene_fuel;
        match execute_gene(self, gene_id, context, Some(target), &mut fuel) {
            Ok(created) => {
                for neuron_id in created {
                    self.event_queue.push(PendingEvent {
                        execution_tick: self.current_tick + 1,
                        target_id: neuron_id,
                        kind: EventKind::ExecuteGene { gene_id: GeneId::GESTATION, context: ExecutionContext::Protected },
                    });
                }
            }
            Err(err) => {
                tracing::warn!(gene = gene_id.0, neuron = target.get(), error = %err, "gene execution aborted");
            }
        }
    }

    fn gather_brain_inputs(&self, neuron_id: NeuronId) -> Vec<f32> {
        let Some(neuron) = self.neurons.get(&neuron_id) else { return Vec::new() };
        let Some(brain) = &neuron.brain else { return Vec::new() };
        brain
            .input_map()
            .into_iter()
            .map(|source| match source {
                hidra_brain::InputSource::ActivationPotential => neuron.soma_potential(),
                hidra_brain::InputSource::LocalVariable(i) => neuron.lvar(i % LVAR_COUNT.max(1)),
                hidra_brain::InputSource::GlobalHormone(i) => self.global_hormone(i % GVAR_COUNT.max(1)),
                hidra_brain::InputSource::ConstantOne => 1.0,
                hidra_brain::InputSource::Health => neuron.health(),
                hidra_brain::InputSource::Age => neuron.age(),
            })
            .collect()
    }

    /// Phase 4 (spec's elaboration of an `Activate` event within phase 3):
    /// evaluate the neuron's brain and apply its output actions if it has
    /// one, then schedule the Delayed/Transient/Persistent effects of its
    /// outgoing synapses regardless — a brainless neuron still transmits on
    /// firing, it just has nothing computing `SetOutputValue`/`ExecuteGene`
    /// outputs.
    fn activate_neuron(&mut self, neuron_id: NeuronId) {
        if !self.neurons.contains_key(&neuron_id) {
            return;
        }

        if let Some(mut brain) = self.neurons.get(&neuron_id).and_then(|n| n.brain.clone()) {
            let inputs = self.gather_brain_inputs(neuron_id);
            if brain.evaluate(&inputs).is_err() {
                tracing::warn!(neuron = neuron_id.get(), "brain evaluation rejected its own input vector");
            } else {
                let outputs = brain.output_map();
                if let Some(n) = self.neurons.get_mut(&neuron_id) {
                    n.brain = Some(brain);
                }
                for slot in outputs {
                    match slot.action {
                        hidra_brain::OutputAction::SetOutputValue(output_id) => {
                            if let Some(node) = self.output_nodes.get_mut(&output_id) {
                                node.value = slot.value;
                            }
                        }
                        hidra_brain::OutputAction::ExecuteGene(gene_id) => {
                            let total = self.compiled_genome.len().max(1) as u32;
                            let wrapped = gene_id.0 % total;
                            self.event_queue.push(PendingEvent {
                                execution_tick: self.current_tick + 1,
                                target_id: neuron_id,
                                kind: EventKind::ExecuteGene { gene_id: GeneId(wrapped), context: ExecutionContext::General },
                            });
                        }
                        hidra_brain::OutputAction::Move => {}
                    }
                }
            }
        }

        // The firing amplitude a brainless (or brain-evaluation-rejected)
        // neuron's synapses still transmit on Activate; captured at the
        // instant of firing, since SomaPotential is already reset by now.
        let activation_value = self.neurons.get(&neuron_id).map(|n| n.lvar(LVAR_LAST_FIRING_POTENTIAL)).unwrap_or(0.0);
        let owned: Vec<SynapseId> = self.neurons.get(&neuron_id).map(|n| n.owned_synapses.clone()).unwrap_or_default();
        for sid in owned {
            let Some(synapse) = self.synapses.get_mut(&sid) else { continue };
            match synapse.signal_type {
                SignalType::Delayed => {
                    let ticks = synapse.delayed_ticks();
                    let amount = synapse.immediate_contribution(activation_value);
                    let target_id = target_neuron_id(synapse.target).unwrap_or(neuron_id);
                    self.event_queue.push(PendingEvent {
                        execution_tick: self.current_tick + ticks,
                        target_id,
                        kind: EventKind::PotentialPulse { amount },
                    });
                }
                SignalType::Transient => {
                    let ticks = synapse.transient_ticks();
                    let amount = synapse.immediate_contribution(activation_value);
                    let target_id = target_neuron_id(synapse.target).unwrap_or(neuron_id);
                    self.event_queue.push(PendingEvent {
                        execution_tick: self.current_tick + ticks,
                        target_id,
                        kind: EventKind::PotentialPulse { amount },
                    });
                }
                SignalType::Persistent => {
                    synapse.on_source_fired(activation_value);
                }
                SignalType::Immediate => {}
            }
        }
    }

    /// Phase 5: fire every eligible active neuron (ascending id).
    fn threshold_firing(&mut self) {
        let firing_threshold = self.config.default_firing_threshold;
        let weight = self.config.firing_rate_ma_weight;
        let neuron_ids: Vec<NeuronId> = self.neurons.keys().copied().collect();
        for id in neuron_ids {
            let Some(neuron) = self.neurons.get_mut(&id) else { continue };
            if neuron.refractory_time_left() > 0.0 {
                continue;
            }
            let total_potential = neuron.dendritic_potential() + neuron.soma_potential();
            if total_potential < firing_threshold + neuron.adaptive_threshold() {
                continue;
            }
            neuron.set_lvar(LVAR_LAST_FIRING_POTENTIAL, total_potential);
            neuron.set_soma_potential(0.0);
            neuron.set_lvar(LVAR_REFRACTORY_TIME_LEFT, neuron.refractory_period());
            let new_adaptive = neuron.adaptive_threshold() + neuron.lvar(LVAR_THRESHOLD_ADAPTATION_FACTOR);
            neuron.set_lvar(LVAR_ADAPTIVE_THRESHOLD, new_adaptive);
            let new_rate = neuron.firing_rate() * (1.0 - weight) + weight;
            neuron.set_lvar(LVAR_FIRING_RATE, new_rate);

            self.event_queue.push(PendingEvent {
                execution_tick: self.current_tick + 1,
                target_id: id,
                kind: EventKind::Activate,
            });
        }
    }

    /// Phase 6: passive per-tick decay/recovery/aging.
    fn passive_updates(&mut self) {
        let decay_rate = self.config.default_decay_rate;
        let tax = self.config.metabolic_tax_per_tick;
        for neuron in self.neurons.values_mut() {
            let soma = neuron.soma_potential() * decay_rate;
            neuron.set_soma_potential(soma);

            let recovery = neuron.lvar(LVAR_THRESHOLD_RECOVERY_RATE);
            let adaptive = neuron.adaptive_threshold() * (1.0 - recovery);
            neuron.set_lvar(LVAR_ADAPTIVE_THRESHOLD, adaptive);

            let refractory = (neuron.refractory_time_left() - 1.0).max(0.0);
            neuron.set_lvar(LVAR_REFRACTORY_TIME_LEFT, refractory);

            let health = neuron.health() - tax;
            neuron.set_lvar(LVAR_HEALTH, health);

            let age = neuron.age() + 1.0;
            neuron.set_lvar(LVAR_AGE, age);
        }
    }

    /// Phase 7: deactivate/remove neurons with depleted health or on the
    /// explicit deactivation list, and the synapses incident to them.
    /// Deferred to this phase so earlier phases see a stable neuron set.
    fn lifecycle(&mut self) {
        let mut dying: Vec<NeuronId> =
            self.neurons.iter().filter(|(_, n)| n.health() <= 0.0).map(|(id, _)| *id).collect();
        dying.extend(self.deactivation_list.drain(..));
        dying.sort();
        dying.dedup();

        if dying.is_empty() {
            return;
        }

        let dying_set: std::collections::BTreeSet<NeuronId> = dying.iter().copied().collect();
        self.synapses.retain(|_, s| {
            let source_dying = matches!(s.source, SynapseSource::Neuron(id) if dying_set.contains(&id));
            let target_dying = matches!(s.target, SynapseTarget::Neuron(id) if dying_set.contains(&id));
            !(source_dying || target_dying)
        });

        for id in dying {
            self.neurons.remove(&id);
        }
        self.rebuild_spatial_hash();
    }

    /// Phase 8 (optional): aggregate metrics into the ring buffer.
    fn collect_metrics(&mut self) {
        if !self.config.metrics_enabled || self.config.metrics_collection_interval == 0 {
            return;
        }
        if self.current_tick % self.config.metrics_collection_interval != 0 {
            return;
        }

        let n = self.neurons.len();
        let (mut rate_sum, mut soma_sum, mut health_sum) = (0.0f32, 0.0f32, 0.0f32);
        for neuron in self.neurons.values() {
            rate_sum += neuron.firing_rate();
            soma_sum += neuron.soma_potential();
            health_sum += neuron.health();
        }
        let denom = n.max(1) as f32;

        let synapse_count = self.config.metrics_include_synapses.then(|| self.synapses.len());
        let io_sample = self.config.metrics_include_io.then(|| (self.input_nodes.len(), self.output_nodes.len()));

        let sample = MetricsSample {
            tick: self.current_tick,
            neuron_count: n,
            mean_firing_rate: rate_sum / denom,
            mean_soma_potential: soma_sum / denom,
            mean_health: health_sum / denom,
            synapse_count,
            io_sample,
        };

        if self.metrics_ring.len() >= self.config.metrics_ring_capacity.max(1) {
            self.metrics_ring.remove(0);
        }
        self.metrics_ring.push(sample);
    }
}

fn target_neuron_id(target: SynapseTarget) -> Option<NeuronId> {
    match target {
        SynapseTarget::Neuron(id) => Some(id),
        SynapseTarget::Output(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidra_bytecode::opcodes::opcode_for_name;
    use hidra_types::Position;

    /// A `PUSH_BYTE <own id>; CallGene` program at gene id `gene_id`,
    /// preceded by `gene_id` empty filler genes so the recursive gene lands
    /// at exactly that positional index.
    fn self_recursive_genome(gene_id: u8) -> String {
        let push_byte = opcode_for_name("PUSH_BYTE").unwrap();
        let call_gene = opcode_for_name("CallGene").unwrap();
        let bytes = [push_byte, gene_id, call_gene];
        let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        format!("{}{hex}", "GN".repeat(gene_id as usize))
    }

    #[test]
    fn self_recursive_gene_aborts_on_fuel_exhaustion_without_panicking() {
        let mut config = Config::default();
        config.default_gene_fuel = 50;
        let gene_id = GeneId(config.system_gene_count);
        let genome = self_recursive_genome(gene_id.0 as u8);
        let mut world = World::new(genome, config).expect("genome compiles");
        let neuron_id = world.create_neuron(Position::ORIGIN);
        let watched_lvar = 20;
        let before = world.neuron(neuron_id).unwrap().lvar(watched_lvar);

        let mut fuel = world.config.default_gene_fuel;
        let result = execute_gene(&mut world, gene_id, ExecutionContext::General, Some(neuron_id), &mut fuel);

        match result {
            Err(WorldError::FuelExhausted { gene_id: g, neuron_id: n }) => {
                assert_eq!(g, gene_id.0);
                assert_eq!(n, neuron_id.get());
            }
            other => panic!("expected FuelExhausted, got {other:?}"),
        }
        let after = world.neuron(neuron_id).unwrap().lvar(watched_lvar);
        assert_eq!(before, after, "a gene aborted on fuel exhaustion must not have mutated neuron state");
    }

    #[test]
    fn two_worlds_from_the_same_seed_and_genome_stay_in_lockstep() {
        let genome = "GNGNGNGN";
        let mut a = World::new(genome, Config::default()).unwrap();
        let mut b = World::new(genome, Config::default()).unwrap();
        a.create_neuron(Position::new(1.0, 2.0, 3.0));
        b.create_neuron(Position::new(1.0, 2.0, 3.0));

        a.run_for(1000);
        b.run_for(1000);

        assert_eq!(a.current_tick, b.current_tick);
        assert_eq!(a.prng_state(), b.prng_state());
        assert_eq!(a.neuron_count(), b.neuron_count());
        let a_lvars: Vec<Vec<f32>> = a.neurons.values().map(|n| n.local_variables.clone()).collect();
        let b_lvars: Vec<Vec<f32>> = b.neurons.values().map(|n| n.local_variables.clone()).collect();
        assert_eq!(a_lvars, b_lvars);
    }
}
