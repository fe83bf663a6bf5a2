//! Benchmarks for fixpoint precalculation.
//!
//! Measures full recorded runs over a chain of counting loops:
//! - Each built-in domain on its own
//! - FIFO versus seeded random worklist order
//! - All domains at once through `analyze_all`
//! - Replaying a finished history to its end

extern crate dfa_replay;

use criterion::{criterion_group, criterion_main, Criterion};
use dfa_replay::{
    analysis::{
        analyze_all, Analysis, CfgBuilder, ConstantBits, ConstantFolding, ControlFlowGraph,
        DfaExecution, ExecutionConfig, LiveVariables, Navigator, ReachingDefinitions,
        TaintAnalysis, WorklistPolicy,
    },
    ir::{BinOp, Expr, Instruction, Local, LocalType, Operand},
};
use std::{hint::black_box, sync::Arc};

/// Number of chained loops in the benchmark graph.
const LOOPS: usize = 16;

/// Builds `LOOPS` sequential counting loops over `i` and `acc`.
///
/// ```text
/// pre:  i = 0
/// head: if i < 100
/// body: acc = acc * 3; acc = acc + i; i = i + 1; goto head
/// ```
fn chained_loops() -> Arc<ControlFlowGraph> {
    let i = Local::new("i", LocalType::Int);
    let acc = Local::new("acc", LocalType::Int);

    let mut builder = CfgBuilder::new();
    let mut previous = builder.block([Instruction::assign(&acc, Operand::int(1))]);
    for _ in 0..LOOPS {
        let pre = builder.block([Instruction::assign(&i, Operand::int(0))]);
        let head = builder.block([Instruction::branch(Expr::binary(
            BinOp::Lt,
            &i,
            Operand::int(100),
        ))]);
        let body = builder.block([
            Instruction::assign(&acc, Expr::binary(BinOp::Mul, &acc, Operand::int(3))),
            Instruction::assign(&acc, Expr::binary(BinOp::Add, &acc, &i)),
            Instruction::assign(&i, Expr::binary(BinOp::Add, &i, Operand::int(1))),
            Instruction::Goto,
        ]);
        builder
            .edge(previous, pre)
            .unwrap()
            .edge(pre, head)
            .unwrap()
            .edge(head, body)
            .unwrap()
            .edge(body, head)
            .unwrap();
        previous = head;
    }
    let exit = builder.block([Instruction::Return(Some(Operand::from(&acc)))]);
    builder.edge(previous, exit).unwrap();

    Arc::new(builder.build().unwrap())
}

fn bench_domain<A: Analysis + Copy + 'static>(c: &mut Criterion, name: &str, analysis: A) {
    let cfg = chained_loops();

    c.bench_function(name, |b| {
        b.iter(|| {
            let history = DfaExecution::new(
                analysis,
                Arc::clone(black_box(&cfg)),
                ExecutionConfig::default(),
            )
            .run()
            .unwrap();
            black_box(history)
        });
    });
}

/// Benchmark forward constant folding.
fn bench_constant_folding(c: &mut Criterion) {
    bench_domain(c, "fixpoint_constant_folding", ConstantFolding);
}

/// Benchmark forward constant bits (exercises multiplication enumeration).
fn bench_constant_bits(c: &mut Criterion) {
    bench_domain(c, "fixpoint_constant_bits", ConstantBits);
}

/// Benchmark forward reaching definitions.
fn bench_reaching_definitions(c: &mut Criterion) {
    bench_domain(c, "fixpoint_reaching_definitions", ReachingDefinitions);
}

/// Benchmark forward taint propagation.
fn bench_taint(c: &mut Criterion) {
    bench_domain(c, "fixpoint_taint", TaintAnalysis);
}

/// Benchmark backward live variables.
fn bench_live_variables(c: &mut Criterion) {
    bench_domain(c, "fixpoint_live_variables", LiveVariables);
}

/// Benchmark the random worklist against the default FIFO order.
fn bench_random_worklist(c: &mut Criterion) {
    let cfg = chained_loops();
    let config = ExecutionConfig::default()
        .with_worklist(WorklistPolicy::Random)
        .with_seed(7);

    c.bench_function("fixpoint_random_worklist", |b| {
        b.iter(|| {
            let history =
                DfaExecution::new(ConstantFolding, Arc::clone(black_box(&cfg)), config.clone())
                    .run()
                    .unwrap();
            black_box(history)
        });
    });
}

/// Benchmark running every domain in parallel.
fn bench_analyze_all(c: &mut Criterion) {
    let cfg = chained_loops();
    let config = ExecutionConfig::default();

    c.bench_function("fixpoint_analyze_all", |b| {
        b.iter(|| {
            let views = analyze_all(black_box(&cfg), &config);
            black_box(views)
        });
    });
}

/// Benchmark scrubbing a recorded history from start to end.
fn bench_replay(c: &mut Criterion) {
    let history = DfaExecution::new(ConstantFolding, chained_loops(), ExecutionConfig::default())
        .run()
        .unwrap();

    c.bench_function("replay_elementary_steps", |b| {
        b.iter(|| {
            let mut nav = Navigator::new(Arc::clone(&history));
            let mut steps = 0usize;
            while nav.next_elementary_step() {
                steps += 1;
            }
            black_box(steps)
        });
    });
}

criterion_group!(
    benches,
    // Domains
    bench_constant_folding,
    bench_constant_bits,
    bench_reaching_definitions,
    bench_taint,
    bench_live_variables,
    // Engine
    bench_random_worklist,
    bench_analyze_all,
    bench_replay,
);
criterion_main!(benches);
