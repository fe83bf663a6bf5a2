//! Analysis integration tests.
//!
//! These tests run every built-in analysis through the public API:
//! 1. Build a control flow graph with `CfgBuilder`
//! 2. Run the analysis to its fixpoint with `DfaExecution`
//! 3. Inspect the final block states in the recorded history

use std::sync::Arc;

use dfa_replay::{
    analysis::{
        dataflow::{Bit, BitVector, ConstValue, DefValue, LiveValue, TaintState, TaintValue},
        Analysis, AnalysisKind, BlockId, CfgBuilder, ConstantBits, ConstantFolding,
        ControlFlowGraph, DfaExecution, ExecutionConfig, History, LiveVariables,
        ReachingDefinitions, TaintAnalysis,
    },
    ir::{BinOp, Expr, Instruction, InvokeExpr, InvokeTags, Local, LocalType, Operand},
    Error, Result,
};

fn int(name: &str) -> Local {
    Local::new(name, LocalType::Int)
}

fn run<A: Analysis + 'static>(
    analysis: A,
    cfg: ControlFlowGraph,
) -> Result<Arc<History<A::Element>>> {
    DfaExecution::new(analysis, Arc::new(cfg), ExecutionConfig::default()).run()
}

/// Out-state of `block` after the last recorded step.
fn final_out<E: Clone>(history: &History<E>, block: BlockId) -> E {
    history
        .last()
        .and_then(|state| state.block_state(block))
        .map(|state| state.out_state.clone())
        .expect("block has a final state")
}

/// `x = 17 * 1; if (c) x = 1; else x = 0 * 1; y = x;`
fn diamond() -> Result<(ControlFlowGraph, [BlockId; 4])> {
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
        .edge(head, then)?
        .edge(head, other)?
        .edge(then, join)?
        .edge(other, join)?;

    Ok((builder.build()?, [head, then, other, join]))
}

/// `i = 0; while (i < 10) i = i + 4; return i;`
fn counting_loop() -> Result<(ControlFlowGraph, [BlockId; 4])> {
    let i = int("i");

    let mut builder = CfgBuilder::new();
    let init = builder.block([Instruction::assign(&i, Operand::int(0))]);
    let head = builder.block([Instruction::branch(Expr::binary(
        BinOp::Lt,
        &i,
        Operand::int(10),
    ))]);
    let body = builder.block([
        Instruction::assign(&i, Expr::binary(BinOp::Add, &i, Operand::int(4))),
        Instruction::Goto,
    ]);
    let exit = builder.block([Instruction::Return(Some(Operand::from(&i)))]);
    builder
        .edge(init, head)?
        .edge(head, body)?
        .edge(head, exit)?
        .edge(body, head)?;

    Ok((builder.build()?, [init, head, body, exit]))
}

#[test]
fn test_constant_folding_diamond() -> Result<()> {
    let (cfg, [_, then, other, join]) = diamond()?;
    let history = run(ConstantFolding, cfg)?;

    assert_eq!(final_out(&history, then).get(&int("x"))?, &ConstValue::Int(1));
    assert_eq!(final_out(&history, other).get(&int("x"))?, &ConstValue::Int(0));

    let exit = final_out(&history, join);
    assert_eq!(exit.get(&int("x"))?, &ConstValue::Top);
    assert_eq!(exit.get(&int("y"))?, &ConstValue::Top);
    Ok(())
}

#[test]
fn test_constant_folding_straight_line() -> Result<()> {
    let (x, l) = (int("x"), Local::new("l", LocalType::Long));
    let mut builder = CfgBuilder::new();
    let block = builder.block([
        Instruction::assign(&x, Expr::binary(BinOp::Div, Operand::int(7), Operand::int(2))),
        Instruction::assign(&l, Expr::cast(LocalType::Long, &x)),
        Instruction::assign(&l, Expr::binary(BinOp::Shl, &l, Operand::int(40))),
    ]);
    let history = run(ConstantFolding, builder.build()?)?;

    let out = final_out(&history, block);
    assert_eq!(out.get(&x)?, &ConstValue::Int(3));
    assert_eq!(out.get(&l)?, &ConstValue::Long(3 << 40));
    Ok(())
}

#[test]
fn test_constant_bits_multiplication() -> Result<()> {
    let (p, a, b, z) = (int("p"), int("a"), int("b"), int("z"));
    let mut builder = CfgBuilder::new();
    let block = builder.block([
        Instruction::parameter(p.clone(), 0),
        Instruction::assign(&a, Operand::int(6)),
        Instruction::assign(&b, Expr::binary(BinOp::Mul, &a, Operand::int(4))),
        Instruction::assign(&z, Expr::binary(BinOp::Mul, &p, Operand::int(0))),
    ]);
    let history = run(ConstantBits, builder.build()?)?;

    let out = final_out(&history, block);
    assert_eq!(out.get(&b)?, &BitVector::constant(24, 32));
    assert_eq!(out.get(&p)?, &BitVector::top(32));
    assert!(out.get(&z)?.is_zero());
    Ok(())
}

#[test]
fn test_constant_bits_loop_keeps_alignment() -> Result<()> {
    let (cfg, [_, head, _, _]) = counting_loop()?;
    let history = run(ConstantBits, cfg)?;

    let i = final_out(&history, head).get(&int("i"))?.clone();
    assert_eq!(i.bit(0), Bit::Zero);
    assert_eq!(i.bit(1), Bit::Zero);
    assert_eq!(i.bit(2), Bit::Top);
    assert_eq!(i.trailing_zeros(), 2);
    Ok(())
}

#[test]
fn test_reaching_definitions_straight_line() -> Result<()> {
    let (x, y, z) = (int("x"), int("y"), int("z"));
    let mut builder = CfgBuilder::new();
    let block = builder.block([
        Instruction::assign(&x, Operand::int(1)),
        Instruction::assign(&y, Expr::binary(BinOp::Add, &x, Operand::int(2))),
        Instruction::assign(&z, Expr::binary(BinOp::Mul, &y, &x)),
        Instruction::Return(Some(Operand::from(&z))),
    ]);
    let history = run(ReachingDefinitions, builder.build()?)?;

    let out = final_out(&history, block);
    assert_eq!(out.get(&x)?.sites(), Some(vec![0]));
    assert_eq!(out.get(&y)?.sites(), Some(vec![1]));
    assert_eq!(out.get(&z)?.sites(), Some(vec![2]));
    Ok(())
}

#[test]
fn test_reaching_definitions_diamond() -> Result<()> {
    let (cfg, [head, then, other, join]) = diamond()?;
    let x_sites = |block: BlockId| -> Result<Vec<usize>> {
        Ok(vec![cfg.try_block(block)?.elementary_blocks()[0].id()])
    };
    let expected: Vec<usize> = [x_sites(then)?, x_sites(other)?].concat();
    let history = run(ReachingDefinitions, cfg.clone())?;

    assert_eq!(final_out(&history, head).get(&int("x"))?.sites(), Some(vec![1]));
    let exit = final_out(&history, join);
    assert_eq!(exit.get(&int("x"))?.sites(), Some(expected));
    assert!(matches!(exit.get(&int("y"))?, DefValue::Defs(_)));
    Ok(())
}

#[test]
fn test_taint_violation_survives_join() -> Result<()> {
    let (p, k) = (int("p"), int("k"));
    let mut builder = CfgBuilder::new();
    let head = builder.block([
        Instruction::parameter(p.clone(), 0),
        Instruction::assign(&k, Operand::int(5)),
        Instruction::branch(Expr::binary(BinOp::Gt, &p, &k)),
    ]);
    let sink = builder.block([Instruction::Invoke(
        InvokeExpr::new("sink", vec![Operand::from(&p)]).with_tags(InvokeTags::SENSITIVE),
    )]);
    let skip = builder.block([Instruction::Nop]);
    let join = builder.block([Instruction::Return(None)]);
    builder
        .edge(head, sink)?
        .edge(head, skip)?
        .edge(sink, join)?
        .edge(skip, join)?;
    let history = run(TaintAnalysis, builder.build()?)?;

    let exit = final_out(&history, join);
    assert_eq!(exit.get(&p)?, &TaintValue::new(TaintState::Tainted, true));
    assert_eq!(exit.get(&k)?, &TaintValue::clean());
    Ok(())
}

#[test]
fn test_taint_intrinsics() -> Result<()> {
    let (a, b) = (int("a"), int("b"));
    let call = |tags, arg: &Local| {
        Instruction::Invoke(InvokeExpr::new("intrinsic", vec![Operand::from(arg)]).with_tags(tags))
    };
    let mut builder = CfgBuilder::new();
    let block = builder.block([
        Instruction::assign(&a, Operand::int(1)),
        call(InvokeTags::TAINT, &a),
        Instruction::assign(&b, Expr::binary(BinOp::Add, &a, Operand::int(1))),
        call(InvokeTags::CLEAN, &a),
        Instruction::Invoke(InvokeExpr::new("sinkAll", vec![]).with_tags(InvokeTags::SENSITIVE)),
    ]);
    let history = run(TaintAnalysis, builder.build()?)?;

    let out = final_out(&history, block);
    assert_eq!(out.get(&a)?, &TaintValue::clean());
    assert_eq!(out.get(&b)?, &TaintValue::new(TaintState::Tainted, true));
    Ok(())
}

#[test]
fn test_violation_survives_reassignment() -> Result<()> {
    let (x, p) = (int("x"), int("p"));
    let call = |tags, arg: &Local| {
        Instruction::Invoke(InvokeExpr::new("intrinsic", vec![Operand::from(arg)]).with_tags(tags))
    };
    let mut builder = CfgBuilder::new();
    let block = builder.block([
        Instruction::parameter(p.clone(), 0),
        Instruction::assign(&x, Operand::int(1)),
        call(InvokeTags::TAINT, &x),
        call(InvokeTags::SENSITIVE, &x),
        Instruction::assign(&x, Operand::int(2)),
        call(InvokeTags::SENSITIVE, &p),
        Instruction::parameter(p.clone(), 0),
    ]);
    let history = run(TaintAnalysis, builder.build()?)?;

    let out = final_out(&history, block);
    assert_eq!(out.get(&x)?, &TaintValue::new(TaintState::Clean, true));
    assert_eq!(out.get(&p)?, &TaintValue::new(TaintState::Tainted, true));
    Ok(())
}

#[test]
fn test_live_variables_loop() -> Result<()> {
    let (cfg, [init, head, body, _]) = counting_loop()?;
    let history = run(LiveVariables, cfg)?;
    let i = int("i");

    // Backward: the out-state of a block is the state at its top.
    assert_eq!(final_out(&history, head).get(&i)?, &LiveValue::Live);
    assert_eq!(final_out(&history, body).get(&i)?, &LiveValue::Live);
    assert_eq!(final_out(&history, init).get(&i)?, &LiveValue::Dead);
    Ok(())
}

#[test]
fn test_switch_rejected_by_bit_analyses() -> Result<()> {
    let x = int("x");
    let mut builder = CfgBuilder::new();
    builder.block([
        Instruction::parameter(x.clone(), 0),
        Instruction::LookupSwitch {
            key: Operand::from(&x),
        },
    ]);
    let cfg = Arc::new(builder.build()?);
    let config = ExecutionConfig::default();

    assert!(AnalysisKind::ConstantFolding.run(Arc::clone(&cfg), &config).is_ok());
    assert!(matches!(
        AnalysisKind::ConstantBits.run(Arc::clone(&cfg), &config),
        Err(Error::UnsupportedInstruction(..))
    ));
    assert!(matches!(
        AnalysisKind::ReachingDefinitions.run(cfg, &config),
        Err(Error::UnsupportedInstruction(..))
    ));
    Ok(())
}

#[test]
fn test_string_constant_rejected_by_constant_folding() -> Result<()> {
    let s = Local::new("s", LocalType::Reference);
    let x = int("x");
    let mut builder = CfgBuilder::new();
    builder.block([Instruction::assign(
        &x,
        Expr::binary(
            BinOp::Add,
            Operand::Constant(dfa_replay::ir::Constant::String("a".into())),
            &s,
        ),
    )]);

    let result =
        AnalysisKind::ConstantFolding.run(Arc::new(builder.build()?), &ExecutionConfig::default());
    assert!(matches!(result, Err(Error::UnsupportedValue(..))));
    Ok(())
}

#[test]
fn test_multiple_entries_are_normalized() -> Result<()> {
    let x = int("x");
    let mut builder = CfgBuilder::new();
    let a = builder.block([Instruction::assign(&x, Operand::int(1))]);
    let b = builder.block([Instruction::assign(&x, Operand::int(1))]);
    let join = builder.block([Instruction::Return(Some(Operand::from(&x)))]);
    builder.edge(a, join)?.edge(b, join)?;
    let cfg = builder.build()?;

    assert_eq!(cfg.block_count(), 4);
    assert!(cfg.block(cfg.entry()).is_some_and(|block| block.is_synthetic()));

    let history = run(ConstantFolding, cfg)?;
    assert_eq!(final_out(&history, join).get(&x)?, &ConstValue::Int(1));
    Ok(())
}
