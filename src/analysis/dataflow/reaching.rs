//! Reaching definitions analysis.
//!
//! Computes, for each tracked local, the set of definition sites that may reach a
//! program point. A definition site is the global id of the instruction that
//! writes the local (an assignment or a parameter binding).
//!
//! # Transfer Function
//!
//! For a definition `v = ...` at site `s`:
//! ```text
//! out[v] = {s}          (kills every earlier definition of v)
//! out[w] = in[w]        for w != v
//! ```

use crate::{
    analysis::{
        cfg::{ControlFlowGraph, ElementaryBlock},
        dataflow::{
            Analysis, AnalysisParts, Direction, LatticeValue, MapElement, MapInitializer,
            MapJoin, Transfer,
        },
    },
    ir::Instruction,
    utils::BitSet,
    Error, Result,
};

const NAME: &str = "Reaching Definitions";

/// The definition sites of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefValue {
    /// Not reached yet.
    Bottom,
    /// Any definition. Never produced by the transfer; absorbs in joins.
    Top,
    /// The sites that may reach this point.
    Defs(BitSet),
}

impl DefValue {
    /// Returns the reaching sites, or `None` for ⊥ and ⊤.
    #[must_use]
    pub fn sites(&self) -> Option<Vec<usize>> {
        match self {
            Self::Defs(set) => Some(set.iter().collect()),
            Self::Bottom | Self::Top => None,
        }
    }
}

impl LatticeValue for DefValue {
    fn join(&self, other: &Self) -> Result<Self> {
        Ok(match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Top, _) | (_, Self::Top) => Self::Top,
            (Self::Defs(a), Self::Defs(b)) => {
                if a.capacity() != b.capacity() {
                    return Err(Error::MismatchedDomain(format!(
                        "definition sets over {} and {} sites",
                        a.capacity(),
                        b.capacity()
                    )));
                }
                let mut union = a.clone();
                union.union_with(b);
                Self::Defs(union)
            }
        })
    }

    fn render(&self) -> String {
        match self {
            Self::Bottom => "⊥".to_string(),
            Self::Top => "⊤".to_string(),
            Self::Defs(set) => set.to_string(),
        }
    }
}

/// Forward reaching definitions over integral locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachingDefinitions;

impl Analysis for ReachingDefinitions {
    type Element = MapElement<DefValue>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn build(&self, cfg: &ControlFlowGraph) -> Result<AnalysisParts<Self::Element>> {
        let sites = cfg.instruction_count();
        let universe = cfg
            .universe()
            .iter()
            .filter(|local| local.ty().is_integral())
            .cloned()
            .collect();

        Ok(AnalysisParts {
            join: Box::new(MapJoin::new()),
            transfer: Box::new(ReachingDefinitionsTransfer { sites }),
            initializer: Box::new(MapInitializer::new(
                universe,
                |_| DefValue::Bottom,
                move |_| DefValue::Defs(BitSet::new(sites)),
            )),
        })
    }
}

/// Instruction semantics of [`ReachingDefinitions`].
#[derive(Debug, Clone, Copy)]
pub struct ReachingDefinitionsTransfer {
    /// Number of instructions in the graph, the capacity of every site set.
    sites: usize,
}

impl Transfer<MapElement<DefValue>> for ReachingDefinitionsTransfer {
    fn apply(
        &self,
        element: &MapElement<DefValue>,
        block: &ElementaryBlock,
    ) -> Result<MapElement<DefValue>> {
        let instruction = block.instruction();
        if matches!(
            instruction,
            Instruction::LookupSwitch { .. } | Instruction::TableSwitch { .. }
        ) {
            return Err(Error::UnsupportedInstruction(NAME, instruction.to_string()));
        }

        let mut result = element.clone();
        if let Some(target) = instruction.defined_local() {
            if element.contains(target) {
                if block.id() >= self.sites {
                    return Err(invalid_argument!(
                        "instruction {} is outside of the {} known sites",
                        block.id(),
                        self.sites
                    ));
                }
                result.set(target, DefValue::Defs(BitSet::singleton(self.sites, block.id())))?;
            }
        }
        Ok(result)
    }
}
