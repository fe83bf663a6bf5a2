//! Live variable analysis.
//!
//! A variable is *live* at a program point if some path from that point reaches a
//! use of the variable without passing through a redefinition of it.
//!
//! # Algorithm
//!
//! This is a backward data flow analysis. The engine walks blocks against the
//! edges and instructions bottom-up, so the state flowing *into* an instruction is
//! the one after it in program order:
//!
//! - `OUT[B]` = ∪{IN[S] | S is a successor of B}
//! - per instruction: `live = (live - DEF) ∪ USE`
//!
//! Every local is tracked, references included.

use crate::{
    analysis::{
        cfg::{ControlFlowGraph, ElementaryBlock},
        dataflow::{
            Analysis, AnalysisParts, Direction, LatticeValue, MapElement, MapInitializer,
            MapJoin, Transfer,
        },
    },
    Result,
};

const NAME: &str = "Live Variables";

/// Liveness of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiveValue {
    /// Not reached yet.
    Bottom,
    /// Not read on any path before being redefined.
    Dead,
    /// Read on at least one path.
    Live,
}

impl LatticeValue for LiveValue {
    fn join(&self, other: &Self) -> Result<Self> {
        Ok((*self).max(*other))
    }

    fn render(&self) -> String {
        match self {
            Self::Bottom => "⊥",
            Self::Dead => "dead",
            Self::Live => "live",
        }
        .to_string()
    }
}

/// Backward live variables over every local.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveVariables;

impl Analysis for LiveVariables {
    type Element = MapElement<LiveValue>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn build(&self, cfg: &ControlFlowGraph) -> Result<AnalysisParts<Self::Element>> {
        Ok(AnalysisParts {
            join: Box::new(MapJoin::new()),
            transfer: Box::new(LiveVariablesTransfer),
            initializer: Box::new(MapInitializer::new(
                cfg.universe().to_vec(),
                |_| LiveValue::Bottom,
                |_| LiveValue::Dead,
            )),
        })
    }
}

/// Instruction semantics of [`LiveVariables`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveVariablesTransfer;

impl Transfer<MapElement<LiveValue>> for LiveVariablesTransfer {
    fn apply(
        &self,
        element: &MapElement<LiveValue>,
        block: &ElementaryBlock,
    ) -> Result<MapElement<LiveValue>> {
        let instruction = block.instruction();
        let mut result = element.clone();

        if let Some(target) = instruction.defined_local() {
            if result.contains(target) {
                result.set(target, LiveValue::Dead)?;
            }
        }
        for used in instruction.used_locals() {
            if result.contains(used) {
                result.set(used, LiveValue::Live)?;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinOp, Expr, Instruction, Local, LocalType, Operand};

    #[test]
    fn test_join() {
        assert_eq!(LiveValue::Dead.join(&LiveValue::Live).unwrap(), LiveValue::Live);
        assert_eq!(LiveValue::Bottom.join(&LiveValue::Dead).unwrap(), LiveValue::Dead);
        assert_eq!(LiveValue::Live.render(), "live");
    }

    #[test]
    fn test_kill_then_gen() {
        let x = Local::new("x", LocalType::Int);
        let y = Local::new("y", LocalType::Reference);
        let element = MapElement::new([x.clone(), y.clone()], |_| LiveValue::Live);

        // x = 1 kills x
        let block = ElementaryBlock::new(0, Instruction::assign(&x, Operand::int(1)));
        let result = LiveVariablesTransfer.apply(&element, &block).unwrap();
        assert_eq!(result.get(&x).unwrap(), &LiveValue::Dead);
        assert_eq!(result.get(&y).unwrap(), &LiveValue::Live);

        // x = x + 1 keeps x live
        let block = ElementaryBlock::new(
            1,
            Instruction::assign(&x, Expr::binary(BinOp::Add, &x, Operand::int(1))),
        );
        let result = LiveVariablesTransfer.apply(&result, &block).unwrap();
        assert_eq!(result.get(&x).unwrap(), &LiveValue::Live);
    }

    #[test]
    fn test_return_uses_operand() {
        let y = Local::new("y", LocalType::Reference);
        let element = MapElement::new([y.clone()], |_| LiveValue::Dead);
        let block = ElementaryBlock::new(0, Instruction::Return(Some(Operand::from(&y))));
        let result = LiveVariablesTransfer.apply(&element, &block).unwrap();
        assert_eq!(result.get(&y).unwrap(), &LiveValue::Live);
    }
}
