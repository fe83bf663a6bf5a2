//! The worklist fixpoint loop that records a snapshot per elementary step.
//!
//! # Algorithm
//!
//! 1. Seed the block states with the analysis' [`Initializer`] and queue the
//!    boundary block (entry for forward, exit for backward analyses).
//! 2. Before every elementary step, consult the [`Controller`]: block while paused,
//!    leave the loop once stopped.
//! 3. Dequeue a block. Its in-state is the join of the out-states of its
//!    predecessors (forward) or successors (backward); a block without such
//!    neighbours keeps its seeded in-state.
//! 4. Walk the instructions (bottom-up for backward analyses), accumulating the
//!    out-state and recording one [`AnalysisState`] per instruction. An empty block
//!    records a single snapshot.
//! 5. If the out-state changed, or the block was visited for the first time,
//!    queue every successor (forward) or predecessor (backward). This happens
//!    before the block's last snapshot is recorded, so that snapshot shows the
//!    updated worklist.
//!
//! [`Initializer`]: crate::analysis::dataflow::Initializer

use std::{sync::Arc, thread::JoinHandle};

use log::{debug, info, trace, warn};

use crate::{
    analysis::{
        cfg::{BlockId, ControlFlowGraph},
        dataflow::{
            boundary_block, create_worklist, Analysis, AnalysisParts, BlockState, Direction,
            LatticeElement, Worklist,
        },
        engine::{
            config::ExecutionConfig,
            controller::Controller,
            history::History,
            state::{AnalysisState, BlockColor, Cursor},
        },
    },
    Result,
};

/// One precalculation of `A` over a control flow graph.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use dfa_replay::{
///     analysis::{CfgBuilder, ConstantFolding, DfaExecution, ExecutionConfig, ResultState},
///     ir::{Instruction, Local, LocalType, Operand},
/// };
///
/// let x = Local::new("x", LocalType::Int);
/// let mut builder = CfgBuilder::new();
/// builder.block([Instruction::assign(&x, Operand::int(1))]);
/// let cfg = Arc::new(builder.build()?);
///
/// let execution = DfaExecution::new(ConstantFolding, cfg, ExecutionConfig::default());
/// let controller = execution.controller();
/// let worker = execution.spawn();
///
/// let history = controller.wait()?;
/// assert_eq!(controller.result_state()?, ResultState::Final);
/// assert_eq!(history.len(), 1);
/// # worker.join().unwrap()?;
/// # Ok::<(), dfa_replay::Error>(())
/// ```
pub struct DfaExecution<A: Analysis> {
    analysis: A,
    cfg: Arc<ControlFlowGraph>,
    config: ExecutionConfig,
    controller: Arc<Controller<History<A::Element>>>,
}

impl<A: Analysis + 'static> DfaExecution<A> {
    /// Prepares a run of `analysis` over `cfg`. Nothing is computed until
    /// [`run`](Self::run) or [`spawn`](Self::spawn).
    pub fn new(analysis: A, cfg: Arc<ControlFlowGraph>, config: ExecutionConfig) -> Self {
        let controller = Arc::new(Controller::new(config.pause_poll));
        Self {
            analysis,
            cfg,
            config,
            controller,
        }
    }

    /// The controller shared with the worker.
    pub fn controller(&self) -> Arc<Controller<History<A::Element>>> {
        Arc::clone(&self.controller)
    }

    /// Runs to completion (or until stopped) on the calling thread and publishes
    /// the history.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run; the controller is left in
    /// [`PrecalcState::Failed`](super::PrecalcState::Failed) with the same error.
    pub fn run(self) -> Result<Arc<History<A::Element>>> {
        match self.precalculate() {
            Ok(history) => {
                info!(
                    "{}: recorded {} steps in {} block steps",
                    history.name(),
                    history.len(),
                    history.block_step_count()
                );
                self.controller.publish(history)
            }
            Err(error) => {
                warn!("{}: precalculation failed: {}", self.analysis.name(), error);
                self.controller.fail(error.clone())?;
                Err(error)
            }
        }
    }

    /// Runs on a new thread. Use [`controller`](Self::controller) beforehand to
    /// observe and steer the run.
    pub fn spawn(self) -> JoinHandle<Result<Arc<History<A::Element>>>> {
        std::thread::spawn(move || self.run())
    }

    fn precalculate(&self) -> Result<History<A::Element>> {
        let direction = self.analysis.direction();
        let AnalysisParts {
            join,
            transfer,
            initializer,
        } = self.analysis.build(&self.cfg)?;

        let seeded = initializer.initialize(&self.cfg, direction)?;
        let boundary = boundary_block(&self.cfg, direction)?;
        let seeded_in: Vec<A::Element> = seeded.iter().map(|s| s.in_state.clone()).collect();
        let mut states: Vec<Arc<BlockState<A::Element>>> =
            seeded.into_iter().map(Arc::new).collect();

        let mut worklist = create_worklist(self.config.worklist, self.config.seed);
        worklist.add(boundary);

        let mut visited = vec![false; self.cfg.block_count()];
        let mut recorder = Recorder::default();

        'blocks: loop {
            if !self.controller.checkpoint()? {
                break;
            }
            let Some(id) = worklist.poll() else {
                break;
            };
            recorder.block_starts.push(recorder.states.len());

            let block = self.cfg.try_block(id)?;
            let index = id.index();
            debug!(
                "{}: block step {} visits {} ({} pending)",
                self.analysis.name(),
                recorder.block_starts.len() - 1,
                id,
                worklist.len()
            );

            let neighbours = self.flow_sources(id, direction);
            let in_state = if neighbours.is_empty() {
                seeded_in[index].clone()
            } else {
                let outs: Vec<&A::Element> = neighbours
                    .iter()
                    .map(|n| &states[n.index()].out_state)
                    .collect();
                join.join(&outs)?
            };

            let first_visit = !visited[index];
            visited[index] = true;
            let previous = Arc::clone(&states[index]);

            let order: Vec<usize> = match direction {
                Direction::Forward => (0..block.len()).collect(),
                Direction::Backward => (0..block.len()).rev().collect(),
            };

            if order.is_empty() {
                states[index] = Arc::new(BlockState::new(in_state.clone(), in_state));
                if first_visit || states[index].out_state != previous.out_state {
                    self.enqueue_targets(id, direction, &mut *worklist);
                }
                recorder.record(self.snapshot(id, 0, &states, &visited, &*worklist));
                self.controller.advance();
                continue;
            }

            let mut current = in_state.clone();
            for (position, &elementary) in order.iter().enumerate() {
                if position > 0 && !self.controller.checkpoint()? {
                    break 'blocks;
                }

                let Some(instruction) = block.elementary(elementary) else {
                    return Err(illegal_state!(
                        "{} has no instruction at {}",
                        id,
                        elementary
                    ));
                };
                current = transfer.apply(&current, instruction)?;
                trace!(
                    "{}: {} [{}] {} -> {}",
                    self.analysis.name(),
                    id,
                    instruction.id(),
                    instruction,
                    current.render()
                );

                states[index] = Arc::new(BlockState::new(in_state.clone(), current.clone()));
                if position + 1 == order.len()
                    && (first_visit || current != previous.out_state)
                {
                    self.enqueue_targets(id, direction, &mut *worklist);
                }
                recorder.record(self.snapshot(
                    id,
                    elementary,
                    &states,
                    &visited,
                    &*worklist,
                ));
                self.controller.advance();
            }
        }

        Ok(History::new(
            self.analysis.name(),
            direction,
            Arc::clone(&self.cfg),
            recorder.states,
            recorder.block_starts,
        ))
    }

    /// Blocks whose out-states flow into `id`.
    fn flow_sources(&self, id: BlockId, direction: Direction) -> Vec<BlockId> {
        match direction {
            Direction::Forward => self.cfg.predecessors(id).collect(),
            Direction::Backward => self.cfg.successors(id).collect(),
        }
    }

    fn enqueue_targets(&self, id: BlockId, direction: Direction, worklist: &mut dyn Worklist) {
        let targets: Vec<BlockId> = match direction {
            Direction::Forward => self.cfg.successors(id).collect(),
            Direction::Backward => self.cfg.predecessors(id).collect(),
        };
        for target in targets {
            worklist.add(target);
        }
    }

    fn snapshot(
        &self,
        current: BlockId,
        elementary: usize,
        states: &[Arc<BlockState<A::Element>>],
        visited: &[bool],
        worklist: &dyn Worklist,
    ) -> AnalysisState<A::Element> {
        let colors = self
            .cfg
            .block_ids()
            .map(|id| {
                if id == current {
                    BlockColor::Current
                } else if worklist.contains(id) {
                    BlockColor::OnWorklist
                } else if visited[id.index()] {
                    BlockColor::VisitedNotOnWorklist
                } else {
                    BlockColor::NotVisited
                }
            })
            .collect();

        AnalysisState::new(
            worklist.iter().collect(),
            colors,
            states.to_vec(),
            Cursor {
                block: current,
                elementary,
            },
        )
    }
}

struct Recorder<E> {
    states: Vec<AnalysisState<E>>,
    block_starts: Vec<usize>,
}

impl<E> Default for Recorder<E> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            block_starts: Vec::new(),
        }
    }
}

impl<E> Recorder<E> {
    fn record(&mut self, state: AnalysisState<E>) {
        self.states.push(state);
    }
}
