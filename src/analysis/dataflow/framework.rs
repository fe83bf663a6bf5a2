//! Data flow analysis framework traits and direction.
//!
//! This module defines the core abstraction for data flow analyses. Any specific
//! analysis (constant folding, reaching definitions, taint, ...) implements the
//! [`Analysis`] trait, whose [`build`](Analysis::build) factory wires a [`Join`], a
//! [`Transfer`] and an [`Initializer`] for one control flow graph. The execution
//! engine then drives those parts to a fixpoint.

use std::{fmt::Debug, sync::Arc};

use rayon::prelude::*;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    analysis::{
        cfg::{BlockId, ControlFlowGraph, ElementaryBlock},
        dataflow::{
            ConstantBits, ConstantFolding, Join, LatticeElement, LiveVariables, MapElement,
            ReachingDefinitions, TaintAnalysis,
        },
        engine::{DfaExecution, ExecutionConfig, Navigator, StepView},
    },
    ir::Local,
    Result,
};

/// Direction of data flow analysis.
///
/// The direction determines how information propagates through the CFG, which
/// neighbours are joined, and in which order a block's instructions are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Direction {
    /// Information flows forward, from entry to exit.
    ///
    /// A block's in-state is the join of its predecessors' out-states.
    Forward,

    /// Information flows backward, from exit to entry.
    ///
    /// A block's in-state is the join of its successors' out-states, and the
    /// instructions are walked last to first. "In" and "out" are relative to the
    /// direction of the walk.
    Backward,
}

/// The pair of states attached to one basic block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState<E> {
    /// State flowing into the block, before its first transfer.
    pub in_state: E,
    /// State after the last transfer of the block.
    pub out_state: E,
}

impl<E> BlockState<E> {
    /// Creates a block state.
    pub const fn new(in_state: E, out_state: E) -> Self {
        Self {
            in_state,
            out_state,
        }
    }
}

/// The effect of a single instruction on an abstract state.
///
/// Transfers are pure: they never modify `element`.
pub trait Transfer<E>: Send + Sync {
    /// Applies the instruction wrapped by `block` to `element`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedInstruction`] or
    /// [`crate::Error::UnsupportedValue`] for constructs the domain does not model.
    fn apply(&self, element: &E, block: &ElementaryBlock) -> Result<E>;
}

/// Seeds the block states before the first iteration.
pub trait Initializer<E>: Send + Sync {
    /// Returns one [`BlockState`] per block, indexed by block id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalState`] if the graph does not have exactly one
    /// boundary block for `direction`.
    fn initialize(&self, cfg: &ControlFlowGraph, direction: Direction)
        -> Result<Vec<BlockState<E>>>;
}

/// Returns the block the analysis starts from: the unique block without
/// predecessors (forward) or without successors (backward).
///
/// # Errors
///
/// Returns [`crate::Error::IllegalState`] if there are zero or several candidates.
pub fn boundary_block(cfg: &ControlFlowGraph, direction: Direction) -> Result<BlockId> {
    let candidates: Vec<BlockId> = cfg
        .block_ids()
        .filter(|&id| match direction {
            Direction::Forward => cfg.predecessors(id).next().is_none(),
            Direction::Backward => cfg.successors(id).next().is_none(),
        })
        .collect();

    match candidates.as_slice() {
        [single] => Ok(*single),
        [] => Err(illegal_state!(
            "{} analysis requires a boundary block, found none",
            direction
        )),
        several => Err(illegal_state!(
            "{} analysis requires exactly one boundary block, found {}",
            direction,
            several.len()
        )),
    }
}

type ValueFn<V> = Box<dyn Fn(&Local) -> V + Send + Sync>;

/// The [`Initializer`] shared by all map-shaped analyses.
///
/// Every block starts as `(⊥-map, ⊥-map)`, except the boundary block whose in-state
/// binds each tracked variable to its freshly defined value.
pub struct MapInitializer<V> {
    universe: Vec<Local>,
    bottom: ValueFn<V>,
    fresh: ValueFn<V>,
}

impl<V> MapInitializer<V> {
    /// Creates an initializer over `universe`.
    ///
    /// `bottom` yields the unreached value of a variable, `fresh` its value at the
    /// boundary.
    pub fn new(
        universe: Vec<Local>,
        bottom: impl Fn(&Local) -> V + Send + Sync + 'static,
        fresh: impl Fn(&Local) -> V + Send + Sync + 'static,
    ) -> Self {
        Self {
            universe,
            bottom: Box::new(bottom),
            fresh: Box::new(fresh),
        }
    }

    fn element(&self, init: &ValueFn<V>) -> MapElement<V> {
        MapElement::new(self.universe.iter().cloned(), |local| init(local))
    }
}

impl<V> Debug for MapInitializer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapInitializer")
            .field("universe", &self.universe)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + Send + Sync> Initializer<MapElement<V>> for MapInitializer<V> {
    fn initialize(
        &self,
        cfg: &ControlFlowGraph,
        direction: Direction,
    ) -> Result<Vec<BlockState<MapElement<V>>>> {
        let boundary = boundary_block(cfg, direction)?;
        let bottom = self.element(&self.bottom);

        Ok(cfg
            .block_ids()
            .map(|id| {
                if id == boundary {
                    BlockState::new(self.element(&self.fresh), bottom.clone())
                } else {
                    BlockState::new(bottom.clone(), bottom.clone())
                }
            })
            .collect())
    }
}

/// The three parts an [`Analysis`] produces for one graph.
pub struct AnalysisParts<E> {
    /// Join used at merge points.
    pub join: Box<dyn Join<E>>,
    /// Per-instruction semantics.
    pub transfer: Box<dyn Transfer<E>>,
    /// Seeds the initial block states.
    pub initializer: Box<dyn Initializer<E>>,
}

/// A data flow analysis that can be run by the execution engine.
///
/// # Example
///
/// ```rust,ignore
/// impl Analysis for Signs {
///     type Element = MapElement<Sign>;
///
///     fn name(&self) -> &'static str {
///         "Signs"
///     }
///
///     fn direction(&self) -> Direction {
///         Direction::Forward
///     }
///
///     fn build(&self, cfg: &ControlFlowGraph) -> Result<AnalysisParts<Self::Element>> {
///         Ok(AnalysisParts {
///             join: Box::new(MapJoin::new()),
///             transfer: Box::new(SignTransfer),
///             initializer: Box::new(MapInitializer::new(
///                 cfg.universe().to_vec(),
///                 |_| Sign::Bottom,
///                 |_| Sign::Zero,
///             )),
///         })
///     }
/// }
/// ```
pub trait Analysis: Send + Sync {
    /// The abstract state computed at each program point.
    type Element: LatticeElement;

    /// Human-readable name of the analysis.
    fn name(&self) -> &'static str;

    /// The direction information flows in.
    fn direction(&self) -> Direction;

    /// Wires the join, transfer and initializer for `cfg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the analysis cannot be set up for this graph.
    fn build(&self, cfg: &ControlFlowGraph) -> Result<AnalysisParts<Self::Element>>;
}

/// The built-in analyses.
///
/// Lets a presentation layer pick an analysis by name and run it without knowing
/// its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum AnalysisKind {
    /// [`ConstantFolding`]
    #[strum(serialize = "Constant Folding")]
    ConstantFolding,
    /// [`ConstantBits`]
    #[strum(serialize = "Constant Bits")]
    ConstantBits,
    /// [`ReachingDefinitions`]
    #[strum(serialize = "Reaching Definitions")]
    ReachingDefinitions,
    /// [`TaintAnalysis`]
    #[strum(serialize = "Taint")]
    Taint,
    /// [`LiveVariables`]
    #[strum(serialize = "Live Variables")]
    LiveVariables,
}

impl AnalysisKind {
    /// Returns the direction of the analysis.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::LiveVariables => Direction::Backward,
            _ => Direction::Forward,
        }
    }

    /// Runs the analysis to completion on the calling thread and returns a
    /// navigator over its history.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run.
    pub fn run(
        self,
        cfg: Arc<ControlFlowGraph>,
        config: &ExecutionConfig,
    ) -> Result<Box<dyn StepView>> {
        match self {
            Self::ConstantFolding => erased(ConstantFolding, cfg, config),
            Self::ConstantBits => erased(ConstantBits, cfg, config),
            Self::ReachingDefinitions => erased(ReachingDefinitions, cfg, config),
            Self::Taint => erased(TaintAnalysis, cfg, config),
            Self::LiveVariables => erased(LiveVariables, cfg, config),
        }
    }
}

fn erased<A: Analysis + 'static>(
    analysis: A,
    cfg: Arc<ControlFlowGraph>,
    config: &ExecutionConfig,
) -> Result<Box<dyn StepView>> {
    let history = DfaExecution::new(analysis, cfg, config.clone()).run()?;
    Ok(Box::new(Navigator::new(history)))
}

/// Runs every built-in analysis on `cfg`, one rayon task per analysis.
///
/// Results are returned in [`AnalysisKind`] declaration order.
#[must_use]
pub fn analyze_all(
    cfg: &Arc<ControlFlowGraph>,
    config: &ExecutionConfig,
) -> Vec<(AnalysisKind, Result<Box<dyn StepView>>)> {
    AnalysisKind::iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|kind| (kind, kind.run(Arc::clone(cfg), config)))
        .collect()
}
