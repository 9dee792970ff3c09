// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! AST builder (spec §4.G): a single pass over a decoded instruction list
//! that maintains a virtual stack of expression nodes and emits a flat
//! statement list. Control flow is represented with labels and
//! goto/if-goto rather than reconstructed if/else blocks, mirroring the
//! "sole runtime primitive is jump if true" rule from spec §4.G.

use hidra_types::Operator;

use crate::decoder::{DecodedProgram, JumpTarget, Operand};
use crate::opcodes::{self, OperandKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f32),
    /// Reference to a temporary bound by a prior `TempDecl`.
    TempRef(u32),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Compare(Operator, Box<Expr>, Box<Expr>),
    /// Boolean negation used to turn `JZ`'s "jump if zero" into the sole
    /// runtime primitive, "jump if true".
    Not(Box<Expr>),
    Call { api: &'static str, args: Vec<Expr> },
}

/// Label identifiers are instruction indices; `statements.len()` worth of
/// instructions plus one extra reserved value names the virtual
/// end-of-stream sentinel.
pub type LabelId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A standalone expression evaluated for effect (a void call, or a
    /// value popped/flushed from the virtual stack).
    Expr(Expr),
    TempDecl { temp: u32, value: Expr },
    Label(LabelId),
    Goto(LabelId),
    IfGoto { label: LabelId, condition: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub statements: Vec<Stmt>,
    /// True for an empty gene whose id was below `system_gene_count`: it
    /// still gets a (trivially empty) AST rather than being dropped.
    pub is_system_gene: bool,
}

/// A sentinel label id one past the last instruction index, used for
/// `JumpTarget::VirtualEnd`.
fn virtual_end_label(instruction_count: usize) -> LabelId {
    instruction_count
}

pub fn build_ast(program: &DecodedProgram, gene_id: u32, system_gene_count: u32) -> Ast {
    if program.instructions.is_empty() {
        return Ast { statements: Vec::new(), is_system_gene: gene_id < system_gene_count };
    }

    let instr_count = program.instructions.len();
    let vend = virtual_end_label(instr_count);
    let mut statements = Vec::new();
    let mut stack: Vec<Expr> = Vec::new();
    let mut next_temp = 0u32;
    let mut labeled_already = std::collections::HashSet::new();

    for (idx, instr) in program.instructions.iter().enumerate() {
        if program.incoming.contains_key(&JumpTarget::Instruction(idx)) && labeled_already.insert(idx) {
            statements.push(Stmt::Label(idx));
        }

        let spec = opcodes::lookup(instr.opcode).expect("opcode already validated by decoder");
        match (spec.name, spec.operand, instr.operand) {
            ("PUSH_BYTE", _, Operand::Byte(b)) => stack.push(Expr::Literal(b as f32)),
            ("PUSH_FLOAT", _, Operand::Float(f)) => stack.push(Expr::Literal(f)),
            ("DUP", ..) => {
                let top = stack.last().cloned().unwrap_or(Expr::Literal(0.0));
                stack.push(top);
            }
            ("POP", ..) => {
                let value = stack.pop().unwrap_or(Expr::Literal(0.0));
                statements.push(Stmt::Expr(value));
            }
            (name @ ("ADD" | "SUB" | "MUL" | "DIV"), ..) => {
                let right = stack.pop().unwrap_or(Expr::Literal(0.0));
                let left = stack.pop().unwrap_or(Expr::Literal(0.0));
                let op = match name {
                    "ADD" => ArithOp::Add,
                    "SUB" => ArithOp::Sub,
                    "MUL" => ArithOp::Mul,
                    _ => ArithOp::Div,
                };
                stack.push(Expr::Arith(op, Box::new(left), Box::new(right)));
            }
            (name @ ("LT" | "LE" | "GT" | "GE" | "EQ" | "NE"), ..) => {
                let right = stack.pop().unwrap_or(Expr::Literal(0.0));
                let left = stack.pop().unwrap_or(Expr::Literal(0.0));
                let op = match name {
                    "LT" => Operator::Lt,
                    "LE" => Operator::Le,
                    "GT" => Operator::Gt,
                    "GE" => Operator::Ge,
                    "EQ" => Operator::Eq,
                    _ => Operator::Ne,
                };
                stack.push(Expr::Compare(op, Box::new(left), Box::new(right)));
            }
            ("JMP", ..) => {
                if let Some(label) = resolve_label(program, idx, vend) {
                    statements.push(Stmt::Goto(label));
                }
            }
            ("JZ", ..) => {
                let cond = stack.pop().unwrap_or(Expr::Literal(0.0));
                if let Some(label) = resolve_label(program, idx, vend) {
                    statements.push(Stmt::IfGoto { label, condition: Expr::Not(Box::new(cond)) });
                }
            }
            ("JNZ" | "JNE", ..) => {
                let cond = stack.pop().unwrap_or(Expr::Literal(0.0));
                if let Some(label) = resolve_label(program, idx, vend) {
                    statements.push(Stmt::IfGoto { label, condition: cond });
                }
            }
            (name, OperandKind::Api { arity, returns_value }, _) => {
                let mut args = Vec::with_capacity(arity as usize);
                for _ in 0..arity {
                    args.push(stack.pop().unwrap_or(Expr::Literal(0.0)));
                }
                args.reverse();
                let call = Expr::Call { api: name, args };

                if returns_value {
                    let temp = next_temp;
                    next_temp += 1;
                    statements.push(Stmt::TempDecl { temp, value: call });
                    stack.push(Expr::TempRef(temp));
                } else {
                    for leftover in stack.drain(..) {
                        statements.push(Stmt::Expr(leftover));
                    }
                    statements.push(Stmt::Expr(call));
                }
            }
            ("NOP", ..) => {}
            _ => {}
        }
    }

    for leftover in stack.drain(..) {
        statements.push(Stmt::Expr(leftover));
    }

    if program.incoming.contains_key(&JumpTarget::VirtualEnd) {
        statements.push(Stmt::Label(vend));
    }

    Ast { statements, is_system_gene: gene_id < system_gene_count }
}

fn resolve_label(program: &DecodedProgram, instr_idx: usize, vend: LabelId) -> Option<LabelId> {
    match program.jump_targets.get(&instr_idx)? {
        JumpTarget::Instruction(i) => Some(*i),
        JumpTarget::VirtualEnd => Some(vend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::opcodes::opcode_for_name;

    #[test]
    fn empty_system_gene_produces_tagged_empty_ast() {
        let program = decode(&[]);
        let ast = build_ast(&program, 0, 4);
        assert!(ast.statements.is_empty());
        assert!(ast.is_system_gene);
    }

    #[test]
    fn void_api_call_flushes_residual_stack_as_statements() {
        let push_byte = opcode_for_name("PUSH_BYTE").unwrap();
        let apoptosis = opcode_for_name("Apoptosis").unwrap();
        // Push a literal, leave it on the stack, then call a void API.
        let bytes = vec![push_byte, 7, apoptosis];
        let program = decode(&bytes);
        let ast = build_ast(&program, 1, 1);
        assert_eq!(ast.statements.len(), 2);
        assert!(matches!(ast.statements[0], Stmt::Expr(Expr::Literal(v)) if v == 7.0));
        assert!(matches!(&ast.statements[1], Stmt::Expr(Expr::Call { api: "Apoptosis", .. })));
    }

    #[test]
    fn value_returning_api_call_binds_a_temporary() {
        let get_self = opcode_for_name("GetSelfId").unwrap();
        let bytes = vec![get_self];
        let program = decode(&bytes);
        let ast = build_ast(&program, 1, 1);
        assert_eq!(ast.statements.len(), 2); // TempDecl, then the leftover TempRef flushed as a statement
        assert!(matches!(&ast.statements[0], Stmt::TempDecl { temp: 0, .. }));
    }

    #[test]
    fn jz_wraps_condition_in_not() {
        let push_byte = opcode_for_name("PUSH_BYTE").unwrap();
        let jz = opcode_for_name("JZ").unwrap();
        let nop = opcode_for_name("NOP").unwrap();
        // PUSH_BYTE 1, JZ -> end, NOP
        let bytes = vec![push_byte, 1, jz, 1, 0, nop];
        let program = decode(&bytes);
        let ast = build_ast(&program, 1, 1);
        let if_goto = ast.statements.iter().find(|s| matches!(s, Stmt::IfGoto { .. })).unwrap();
        assert!(matches!(if_goto, Stmt::IfGoto { condition: Expr::Not(_), .. }));
    }

    #[test]
    fn jump_target_gets_exactly_one_label_for_multiple_sources() {
        let jmp = opcode_for_name("JMP").unwrap();
        let nop = opcode_for_name("NOP").unwrap();
        // instr0: JMP +3 (to instr2/NOP), instr1(byte3): JMP +0 (to instr2/NOP), instr2: NOP
        let bytes = vec![jmp, 3, 0, jmp, 0, 0, nop];
        let program = decode(&bytes);
        let ast = build_ast(&program, 1, 1);
        let label_count = ast.statements.iter().filter(|s| matches!(s, Stmt::Label(_))).count();
        assert_eq!(label_count, 1);
    }
}
