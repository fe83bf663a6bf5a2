//! History, navigation and controller integration tests.
//!
//! These tests replay recorded runs through `Navigator` and `StepView`, and steer
//! background runs through their `Controller`.

use std::{sync::Arc, thread, time::Duration};

use dfa_replay::{
    analysis::{
        dataflow::ConstValue, AnalysisKind, BlockColor, BlockId, CfgBuilder, ConstantFolding,
        ControlFlowGraph, DfaExecution, ExecutionConfig, History, MapElement, Navigator,
        PrecalcState, ResultState, StepView,
    },
    ir::{BinOp, Expr, Instruction, Local, LocalType, Operand},
    Error, Result,
};

/// ```text
/// B0: i = 0
/// B1: if i < 10      <-+
/// B2: i = i + 1; goto -+
/// B3: return i
/// ```
fn loop_cfg() -> Result<(ControlFlowGraph, [BlockId; 4])> {
    let i = Local::new("i", LocalType::Int);

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
        .edge(init, head)?
        .edge(head, body)?
        .edge(head, exit)?
        .edge(body, head)?;

    Ok((builder.build()?, [init, head, body, exit]))
}

fn loop_history() -> Result<Arc<History<MapElement<ConstValue>>>> {
    let (cfg, _) = loop_cfg()?;
    DfaExecution::new(ConstantFolding, Arc::new(cfg), ExecutionConfig::default()).run()
}

#[test]
fn test_block_step_lands_on_first_elementary_step() -> Result<()> {
    let history = loop_history()?;
    let mut nav = Navigator::new(Arc::clone(&history));

    for k in 0..history.block_step_count() {
        nav.set_current_block_step(k);
        assert_eq!(nav.current_block_step(), k);
        assert_eq!(Some(nav.current_elementary_step()), history.block_start(k));
    }
    Ok(())
}

#[test]
fn test_elementary_step_selects_enclosing_block_step() -> Result<()> {
    let history = loop_history()?;
    let mut nav = Navigator::new(Arc::clone(&history));

    for step in 0..history.len() {
        nav.set_current_elementary_step(step);
        let block_step = nav.current_block_step();
        let start = history.block_start(block_step).unwrap();
        let end = history.block_start(block_step + 1).unwrap_or(history.len());
        assert!((start..end).contains(&step));

        // Every step of one block step shares the block under the cursor
        let block = history.state(step).unwrap().cursor().block;
        assert_eq!(history.state(start).unwrap().cursor().block, block);
    }
    Ok(())
}

#[test]
fn test_navigation_is_clamped() -> Result<()> {
    let history = loop_history()?;
    let mut nav = Navigator::new(Arc::clone(&history));

    assert!(!nav.previous_elementary_step());
    assert!(!nav.previous_block_step());

    nav.set_current_elementary_step(usize::MAX);
    assert_eq!(nav.current_elementary_step(), history.len() - 1);
    assert_eq!(nav.current_block_step(), history.block_step_count() - 1);
    assert!(!nav.next_elementary_step());
    assert!(!nav.next_block_step());

    nav.set_current_block_step(usize::MAX);
    assert_eq!(nav.current_block_step(), history.block_step_count() - 1);

    assert!(nav.previous_block_step());
    assert_eq!(nav.current_block_step(), history.block_step_count() - 2);
    Ok(())
}

#[test]
fn test_run_to_breakpoint() -> Result<()> {
    let (cfg, [_, _, body, _]) = loop_cfg()?;
    let cfg = Arc::new(cfg);
    let increment = cfg.try_block(body)?.elementary_blocks()[0].id();
    cfg.set_breakpoint(increment, true)?;

    let history =
        DfaExecution::new(ConstantFolding, Arc::clone(&cfg), ExecutionConfig::default()).run()?;
    let mut nav = Navigator::new(history);

    let mut hits = 0;
    while nav.run_to_breakpoint() {
        assert!(nav.is_at_breakpoint());
        let cursor = nav.current_state().unwrap().cursor();
        assert_eq!((cursor.block, cursor.elementary), (body, 0));
        hits += 1;
    }
    // Visited once with i = 0, once more with i = ⊤
    assert_eq!(hits, 2);
    assert_eq!(nav.current_elementary_step(), nav.history().len() - 1);

    // Breakpoints are read live
    cfg.set_breakpoint(increment, false)?;
    nav.set_current_elementary_step(0);
    assert!(!nav.run_to_breakpoint());
    Ok(())
}

#[test]
fn test_set_breakpoint_unknown_instruction() -> Result<()> {
    let (cfg, _) = loop_cfg()?;
    assert!(matches!(
        cfg.set_breakpoint(cfg.instruction_count(), true),
        Err(Error::InvalidArgument { .. })
    ));
    Ok(())
}

#[test]
fn test_step_view_rendering() -> Result<()> {
    let (cfg, [init, head, _, _]) = loop_cfg()?;
    let mut view =
        AnalysisKind::ConstantFolding.run(Arc::new(cfg), &ExecutionConfig::default())?;

    assert_eq!(view.name(), "Constant Folding");
    assert_eq!(view.cursor().map(|cursor| cursor.block), Some(init));
    assert_eq!(view.color(init), Some(BlockColor::Current));
    assert_eq!(view.color(head), Some(BlockColor::OnWorklist));
    assert_eq!(view.render_in_state(), "{i: 0}");
    assert_eq!(view.render_out_state(), "{i: 0}");

    assert!(view.next_block_step());
    // The head's successors were queued before its snapshot
    let successors: Vec<BlockId> = view.cfg().successors(head).collect();
    assert_eq!(view.worklist(), successors);
    assert_eq!(view.color(init), Some(BlockColor::VisitedNotOnWorklist));
    assert_eq!(
        view.render_block_state(init),
        Some(("{i: 0}".to_string(), "{i: 0}".to_string()))
    );

    view.set_current_elementary_step(view.elementary_step_count() - 1);
    assert_eq!(
        view.render_block_state(head).map(|(input, _)| input),
        Some("{i: ⊤}".to_string())
    );
    assert!(view.worklist().is_empty());
    Ok(())
}

#[test]
fn test_pause_before_start_then_continue() -> Result<()> {
    let (cfg, _) = loop_cfg()?;
    let execution = DfaExecution::new(
        ConstantFolding,
        Arc::new(cfg),
        ExecutionConfig::default().with_pause_poll(Duration::from_millis(1)),
    );
    let controller = execution.controller();
    controller.pause_precalc(Duration::from_millis(1))?;

    let worker = execution.spawn();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(controller.state()?, PrecalcState::Paused);
    assert_eq!(controller.progress(), 0);
    assert_eq!(controller.result_state()?, ResultState::NoResult);

    controller.continue_precalc()?;
    let history = controller.wait()?;
    assert_eq!(controller.state()?, PrecalcState::Completed);
    assert_eq!(controller.result_state()?, ResultState::Final);
    assert_eq!(controller.progress(), history.len());

    let joined = worker.join().expect("worker panicked")?;
    assert!(Arc::ptr_eq(&history, &joined));
    assert!(Arc::ptr_eq(&history, &controller.result()?));
    Ok(())
}

#[test]
fn test_stop_while_paused() -> Result<()> {
    let (cfg, _) = loop_cfg()?;
    let execution = DfaExecution::new(ConstantFolding, Arc::new(cfg), ExecutionConfig::default());
    let controller = execution.controller();
    controller.pause_precalc(Duration::from_millis(1))?;

    let worker = execution.spawn();
    controller.stop_precalc()?;
    let history = controller.wait()?;

    assert!(history.is_empty());
    assert_eq!(controller.state()?, PrecalcState::Stopped);
    assert_eq!(controller.result_state()?, ResultState::Intermediate);
    assert!(matches!(
        controller.continue_precalc(),
        Err(Error::IllegalState { .. })
    ));
    controller.stop_precalc()?;

    worker.join().expect("worker panicked")?;
    Ok(())
}

#[test]
fn test_completed_run_ignores_pause() -> Result<()> {
    let (cfg, _) = loop_cfg()?;
    let execution = DfaExecution::new(ConstantFolding, Arc::new(cfg), ExecutionConfig::default());
    let controller = execution.controller();
    execution.run()?;

    controller.pause_precalc(Duration::from_millis(1))?;
    controller.continue_precalc()?;
    assert_eq!(controller.state()?, PrecalcState::Completed);
    assert!(matches!(
        controller.stop_precalc(),
        Err(Error::IllegalState { .. })
    ));
    Ok(())
}
