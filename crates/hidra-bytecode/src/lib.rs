// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Bytecode decoding, AST construction, and genome scanning for the Hidra
gene language (spec §4.F/§4.G). `hidra-world` owns interpretation
(walking the `Ast` against a live neuron and the bridge API registry);
this crate only turns genome source text into `Ast`s.
*/

pub mod ast;
pub mod decoder;
pub mod migration;
pub mod opcodes;
pub mod scanner;

pub use ast::{ArithOp, Ast, Expr, Stmt};
pub use decoder::{decode, DecodedProgram, Instruction, JumpTarget, Operand};
pub use migration::migrate_8bit_jumps;
pub use opcodes::{InstrSpec, OperandKind, MASTER_INSTRUCTION_ORDER};
pub use scanner::scan_genome;

use std::collections::HashMap;

/// Scans and compiles an entire genome source into one `Ast` per gene id.
/// Empty user genes (id `>= system_gene_count`) are dropped from the map;
/// empty system genes are kept with an empty statement list.
pub fn compile_genome(source: &str, system_gene_count: u32) -> HashMap<u32, Ast> {
    scan_genome(source)
        .into_iter()
        .enumerate()
        .filter_map(|(gene_id, bytes)| {
            let gene_id = gene_id as u32;
            let program = decode(&bytes);
            let ast = ast::build_ast(&program, gene_id, system_gene_count);
            if bytes.is_empty() && !ast.is_system_gene {
                None
            } else {
                Some((gene_id, ast))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_user_gene_is_dropped_empty_system_gene_is_kept() {
        let genome = compile_genome("GNGN", 1);
        // Gene 0 is a system gene (< system_gene_count=1) and empty -> kept.
        assert!(genome.contains_key(&0));
        // Gene 1 is a user gene and empty -> dropped.
        assert!(!genome.contains_key(&1));
    }
}
