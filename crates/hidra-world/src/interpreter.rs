// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Walks a compiled gene [`hidra_bytecode::Ast`] against a live [`Bridge`]
(spec §4.H). Labels are bytecode instruction indices, not statement
indices, so before execution the statement list is scanned once to build
a `label -> statement position` map; `Goto`/`IfGoto` jump through that map
rather than through raw instruction offsets.

`CallGene` is the one API the bridge itself does not implement — invoking
it here lets the recursive call share this execution's fuel counter, so a
gene that calls another gene cannot buy extra budget by doing so.
*/

use std::collections::HashMap;

use hidra_bytecode::{ArithOp, Ast, Expr, Stmt};
use hidra_types::{ExecutionContext, GeneId, NeuronId};

use crate::bridge::Bridge;
use crate::error::WorldError;
use crate::world::World;

/// Interprets `gene_id` against `self_neuron` under `context`, decrementing
/// `fuel` once per statement and once per API call (including nested
/// `CallGene` invocations, which share this same counter). Returns the ids
/// of any neurons created along the way (via `CreateNeuron`/`Mitosis`,
/// including transitively through `CallGene`) so the caller can schedule
/// their `Gestation` event.
pub fn execute_gene(
    world: &mut World,
    gene_id: GeneId,
    context: ExecutionContext,
    self_neuron: Option<NeuronId>,
    fuel: &mut u32,
) -> Result<Vec<NeuronId>, WorldError> {
    let Some(ast) = world.compiled_genome.get(&gene_id.0).cloned() else {
        return Ok(Vec::new());
    };
    let mut bridge = Bridge::new(world, context, self_neuron);
    run(&ast, &mut bridge, fuel, gene_id, self_neuron)?;
    Ok(std::mem::take(&mut bridge.created_neurons))
}

fn consume_fuel(fuel: &mut u32, gene_id: GeneId, self_neuron: Option<NeuronId>) -> Result<(), WorldError> {
    if *fuel == 0 {
        return Err(WorldError::FuelExhausted { gene_id: gene_id.0, neuron_id: self_neuron.map(|n| n.get()).unwrap_or(0) });
    }
    *fuel -= 1;
    Ok(())
}

fn run(ast: &Ast, bridge: &mut Bridge, fuel: &mut u32, gene_id: GeneId, self_neuron: Option<NeuronId>) -> Result<(), WorldError> {
    let mut label_positions: HashMap<usize, usize> = HashMap::new();
    for (pos, stmt) in ast.statements.iter().enumerate() {
        if let Stmt::Label(id) = stmt {
            label_positions.insert(*id, pos);
        }
    }

    let mut temps: HashMap<u32, f32> = HashMap::new();
    let mut pc = 0usize;
    while pc < ast.statements.len() {
        consume_fuel(fuel, gene_id, self_neuron)?;
        match &ast.statements[pc] {
            Stmt::Label(_) => {}
            Stmt::Expr(expr) => {
                eval_expr(expr, bridge, &temps, fuel, gene_id, self_neuron)?;
            }
            Stmt::TempDecl { temp, value } => {
                let v = eval_expr(value, bridge, &temps, fuel, gene_id, self_neuron)?;
                temps.insert(*temp, v);
            }
            Stmt::Goto(label) => {
                if let Some(&target) = label_positions.get(label) {
                    pc = target;
                    continue;
                }
            }
            Stmt::IfGoto { label, condition } => {
                let c = eval_expr(condition, bridge, &temps, fuel, gene_id, self_neuron)?;
                if c != 0.0 {
                    if let Some(&target) = label_positions.get(label) {
                        pc = target;
                        continue;
                    }
                }
            }
        }
        pc += 1;
    }
    Ok(())
}

fn eval_expr(
    expr: &Expr,
    bridge: &mut Bridge,
    temps: &HashMap<u32, f32>,
    fuel: &mut u32,
    gene_id: GeneId,
    self_neuron: Option<NeuronId>,
) -> Result<f32, WorldError> {
    match expr {
        Expr::Literal(v) => Ok(*v),
        Expr::TempRef(id) => Ok(temps.get(id).copied().unwrap_or(0.0)),
        Expr::Arith(op, lhs, rhs) => {
            let l = eval_expr(lhs, bridge, temps, fuel, gene_id, self_neuron)?;
            let r = eval_expr(rhs, bridge, temps, fuel, gene_id, self_neuron)?;
            Ok(match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => {
                    if r == 0.0 {
                        0.0
                    } else {
                        l / r
                    }
                }
            })
        }
        Expr::Compare(op, lhs, rhs) => {
            let l = eval_expr(lhs, bridge, temps, fuel, gene_id, self_neuron)?;
            let r = eval_expr(rhs, bridge, temps, fuel, gene_id, self_neuron)?;
            Ok(if op.apply(l, r) { 1.0 } else { 0.0 })
        }
        Expr::Not(inner) => {
            let v = eval_expr(inner, bridge, temps, fuel, gene_id, self_neuron)?;
            Ok(if v != 0.0 { 0.0 } else { 1.0 })
        }
        Expr::Call { api, args } => {
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(eval_expr(a, bridge, temps, fuel, gene_id, self_neuron)?);
            }
            consume_fuel(fuel, gene_id, self_neuron)?;
            if *api == "CallGene" {
                let system_gene_count = bridge.world.config.system_gene_count as usize;
                let total_genes = bridge.world.compiled_genome.len();
                let user_gene_count = total_genes.saturating_sub(system_gene_count);
                let raw = values.first().copied().unwrap_or(0.0) as i64;
                let requested = GeneId(system_gene_count as u32 + crate::bridge::modulus_index(raw, user_gene_count) as u32);
                let created = execute_gene(bridge.world, requested, bridge.context, bridge.self_neuron, fuel)?;
                bridge.created_neurons.extend(created);
                Ok(0.0)
            } else {
                Ok(bridge.dispatch(api, &values))
            }
        }
    }
}
