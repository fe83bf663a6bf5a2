//! Taint propagation with sensitive sinks.
//!
//! Every numeric local carries a [`TaintState`] and a sticky `violated` flag. Values
//! from the outside world (parameters, heap reads, call results, reference
//! constants) are tainted; numeric literals are clean. Three kinds of invoke
//! intrinsics, recognised by their [`InvokeTags`], drive the analysis:
//!
//! | Tag | Arguments | Effect |
//! |---|---|---|
//! | `TAINT` | 1 | the argument becomes tainted |
//! | `CLEAN` | 1 | the argument becomes clean |
//! | `SENSITIVE` | 1 | a tainted argument is marked violated |
//! | `SENSITIVE` | 0 | every tainted variable is marked violated |
//!
//! Forcing a state never clears `violated`: once tainted data reached a sensitive
//! sink, the variable stays flagged on every path that passes through that point.

use crate::{
    analysis::{
        cfg::{ControlFlowGraph, ElementaryBlock},
        dataflow::{
            Analysis, AnalysisParts, Direction, LatticeValue, MapElement, MapInitializer,
            MapJoin, Transfer,
        },
    },
    ir::{Constant, Expr, Instruction, InvokeExpr, InvokeTags, Local, Operand, Place, UnOp},
    Result,
};

const NAME: &str = "Taint";

/// Whether a value may carry attacker-controlled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaintState {
    /// Not reached yet.
    Bottom,
    /// Only derived from trusted data.
    Clean,
    /// May be derived from untrusted data.
    Tainted,
}

/// Taint state plus the sticky sink-violation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaintValue {
    state: TaintState,
    violated: bool,
}

impl TaintValue {
    /// Creates a value.
    #[must_use]
    pub const fn new(state: TaintState, violated: bool) -> Self {
        Self { state, violated }
    }

    /// The unreached value.
    #[must_use]
    pub const fn bottom() -> Self {
        Self::new(TaintState::Bottom, false)
    }

    /// A clean, non-violated value.
    #[must_use]
    pub const fn clean() -> Self {
        Self::new(TaintState::Clean, false)
    }

    /// A tainted, non-violated value.
    #[must_use]
    pub const fn tainted() -> Self {
        Self::new(TaintState::Tainted, false)
    }

    /// Returns the taint state.
    #[must_use]
    pub const fn state(&self) -> TaintState {
        self.state
    }

    /// Returns `true` if tainted data reached a sensitive sink through this value.
    #[must_use]
    pub const fn is_violated(&self) -> bool {
        self.violated
    }

    /// Returns this value with `state`, keeping the violation flag.
    #[must_use]
    pub const fn with_state(self, state: TaintState) -> Self {
        Self::new(state, self.violated)
    }

    fn combine(self, other: Self) -> Self {
        let state = if self.state == TaintState::Tainted || other.state == TaintState::Tainted {
            TaintState::Tainted
        } else if self.state == TaintState::Bottom || other.state == TaintState::Bottom {
            TaintState::Bottom
        } else {
            TaintState::Clean
        };
        Self::new(state, self.violated || other.violated)
    }
}

impl LatticeValue for TaintValue {
    fn join(&self, other: &Self) -> Result<Self> {
        Ok(Self::new(
            self.state.max(other.state),
            self.violated || other.violated,
        ))
    }

    fn render(&self) -> String {
        let state = match self.state {
            TaintState::Bottom => "⊥",
            TaintState::Clean => "clean",
            TaintState::Tainted => "tainted",
        };
        if self.violated {
            format!("{state}!")
        } else {
            state.to_string()
        }
    }
}

/// Forward taint analysis over numeric locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaintAnalysis;

impl Analysis for TaintAnalysis {
    type Element = MapElement<TaintValue>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn build(&self, cfg: &ControlFlowGraph) -> Result<AnalysisParts<Self::Element>> {
        let universe = cfg
            .universe()
            .iter()
            .filter(|local| local.ty().is_numeric())
            .cloned()
            .collect();

        Ok(AnalysisParts {
            join: Box::new(MapJoin::new()),
            transfer: Box::new(TaintTransfer),
            initializer: Box::new(MapInitializer::new(
                universe,
                |_| TaintValue::bottom(),
                |_| TaintValue::clean(),
            )),
        })
    }
}

/// Assigns `value` to `target`. A violation recorded for `target` survives.
fn overwrite(
    element: &mut MapElement<TaintValue>,
    target: &Local,
    mut value: TaintValue,
) -> Result<()> {
    value.violated |= element.get(target)?.violated;
    element.set(target, value)
}

/// Instruction semantics of [`TaintAnalysis`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TaintTransfer;

impl Transfer<MapElement<TaintValue>> for TaintTransfer {
    fn apply(
        &self,
        element: &MapElement<TaintValue>,
        block: &ElementaryBlock,
    ) -> Result<MapElement<TaintValue>> {
        let instruction = block.instruction();
        let mut result = element.clone();

        if let Some(invoke) = instruction.invoke() {
            apply_intrinsic(&mut result, invoke)?;
        }

        match instruction {
            Instruction::Assign {
                target: Place::Local(target),
                value,
            } if result.contains(target) => {
                let value = evaluate(&result, value);
                overwrite(&mut result, target, value)?;
            }
            Instruction::Identity { target, .. } if result.contains(target) => {
                overwrite(&mut result, target, TaintValue::tainted())?;
            }
            _ => {}
        }
        Ok(result)
    }
}

fn apply_intrinsic(element: &mut MapElement<TaintValue>, invoke: &InvokeExpr) -> Result<()> {
    let tags = invoke.tags;
    match invoke.args.as_slice() {
        [Operand::Local(arg)] if element.contains(arg) => {
            let current = *element.get(arg)?;
            if tags.contains(InvokeTags::TAINT) {
                element.set(arg, current.with_state(TaintState::Tainted))?;
            } else if tags.contains(InvokeTags::CLEAN) {
                element.set(arg, current.with_state(TaintState::Clean))?;
            } else if tags.contains(InvokeTags::SENSITIVE) && current.state == TaintState::Tainted
            {
                element.set(arg, TaintValue::new(TaintState::Tainted, true))?;
            }
        }
        [] if tags.contains(InvokeTags::SENSITIVE) => {
            for (_, value) in element.iter_mut() {
                if value.state == TaintState::Tainted && !value.violated {
                    value.violated = true;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn evaluate(element: &MapElement<TaintValue>, expr: &Expr) -> TaintValue {
    match expr {
        Expr::Operand(op)
        | Expr::Unary {
            op: UnOp::Neg,
            operand: op,
        }
        | Expr::Cast { operand: op, .. }
        | Expr::InstanceOf { operand: op, .. } => operand(element, op),
        Expr::Binary { lhs, rhs, .. } => operand(element, lhs).combine(operand(element, rhs)),
        Expr::Unary {
            op: UnOp::Length, ..
        }
        | Expr::Invoke(_)
        | Expr::Field { .. }
        | Expr::ArrayRead { .. }
        | Expr::New(_)
        | Expr::NewArray { .. } => TaintValue::tainted(),
    }
}

fn operand(element: &MapElement<TaintValue>, op: &Operand) -> TaintValue {
    match op {
        Operand::Local(local) => local_value(element, local),
        Operand::Constant(
            Constant::Int(_)
            | Constant::Long(_)
            | Constant::Float(_)
            | Constant::Double(_)
            | Constant::Null,
        ) => TaintValue::clean(),
        Operand::Constant(
            Constant::String(_) | Constant::Class(_) | Constant::MethodHandle(_),
        ) => TaintValue::tainted(),
    }
}

/// Reference locals are not tracked and read as tainted.
fn local_value(element: &MapElement<TaintValue>, local: &Local) -> TaintValue {
    element
        .get(local)
        .copied()
        .unwrap_or_else(|_| TaintValue::tainted())
}
