//! Shared control flow graph fixtures for unit tests.

use crate::{
    analysis::cfg::{CfgBuilder, ControlFlowGraph},
    ir::{BinOp, Expr, Instruction, Local, LocalType, Operand},
};

pub fn int(name: &str) -> Local {
    Local::new(name, LocalType::Int)
}

/// ```text
/// B0: c := @parameter0; x = 17 * 1; if c != 0
/// B1: x = 1; goto          B2: x = 0 * 1
/// B3: y = x; return
/// ```
pub fn diamond_cfg() -> ControlFlowGraph {
    let c = Local::new("c", LocalType::Boolean);
    let (x, y) = (int("x"), int("y"));

    let mut builder = CfgBuilder::new();
    let head = builder.block([
        Instruction::parameter(c.clone(), 0),
        Instruction::assign(&x, Expr::binary(BinOp::Mul, Operand::int(17), Operand::int(1))),
        Instruction::branch(Expr::binary(BinOp::Ne, &c, Operand::int(0))),
    ]);
    let then = builder.block([Instruction::assign(&x, Operand::int(1)), Instruction::Goto]);
    let other = builder.block([Instruction::assign(
        &x,
        Expr::binary(BinOp::Mul, Operand::int(0), Operand::int(1)),
    )]);
    let join = builder.block([Instruction::assign(&y, &x), Instruction::Return(None)]);

    builder
        .edge(head, then)
        .unwrap()
        .edge(head, other)
        .unwrap()
        .edge(then, join)
        .unwrap()
        .edge(other, join)
        .unwrap();
    builder.build().unwrap()
}

/// ```text
/// B0: i = 0
/// B1: if i < 10      <-+
/// B2: i = i + 1; goto -+
/// B3: return i
/// ```
pub fn loop_cfg() -> ControlFlowGraph {
    let i = int("i");

    let mut builder = CfgBuilder::new();
    let init = builder.block([Instruction::assign(&i, Operand::int(0))]);
    let head = builder.block([Instruction::branch(Expr::binary(
        BinOp::Lt,
        &i,
        Operand::int(10),
    ))]);
    let body = builder.block([
        Instruction::assign(&i, Expr::binary(BinOp::Add, &i, Operand::int(1))),
        Instruction::Goto,
    ]);
    let exit = builder.block([Instruction::Return(Some(Operand::from(&i)))]);

    builder
        .edge(init, head)
        .unwrap()
        .edge(head, body)
        .unwrap()
        .edge(head, exit)
        .unwrap()
        .edge(body, head)
        .unwrap();
    builder.build().unwrap()
}

/// `x = 1; y = x + 2; z = y * x; return z` in a single block.
pub fn straight_line_cfg() -> ControlFlowGraph {
    let (x, y, z) = (int("x"), int("y"), int("z"));

    let mut builder = CfgBuilder::new();
    builder.block([
        Instruction::assign(&x, Operand::int(1)),
        Instruction::assign(&y, Expr::binary(BinOp::Add, &x, Operand::int(2))),
        Instruction::assign(&z, Expr::binary(BinOp::Mul, &y, &x)),
        Instruction::Return(Some(Operand::from(&z))),
    ]);
    builder.build().unwrap()
}
