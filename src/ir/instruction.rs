//! The closed set of instruction kinds handed over by the front end.

use std::fmt;

use crate::ir::{Expr, InvokeExpr, Local, Operand, Place};

/// What an identity instruction binds its target to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySource {
    /// The n-th formal parameter.
    Parameter(u32),
    /// The receiver of an instance method.
    This,
    /// The exception object entering a handler.
    CaughtException,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(idx) => write!(f, "@parameter{idx}"),
            Self::This => f.write_str("@this"),
            Self::CaughtException => f.write_str("@caughtexception"),
        }
    }
}

/// A single IR instruction.
///
/// Control transfers (`If`, `Goto`, the switches, `Throw`, `Return`) carry no
/// targets: the edges they induce are part of the control flow graph, not of the
/// instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `target = value`
    Assign {
        /// The written place.
        target: Place,
        /// The evaluated right-hand side.
        value: Expr,
    },
    /// `target := source`, binding parameters, `this` and caught exceptions.
    Identity {
        /// The bound local.
        target: Local,
        /// What is bound.
        source: IdentitySource,
    },
    /// Conditional branch.
    If {
        /// The branch condition.
        condition: Expr,
    },
    /// Unconditional branch.
    Goto,
    /// Sparse switch over `key`.
    LookupSwitch {
        /// The switch key.
        key: Operand,
    },
    /// Dense switch over `key`.
    TableSwitch {
        /// The switch key.
        key: Operand,
    },
    /// Invocation whose result is discarded.
    Invoke(InvokeExpr),
    /// Monitor acquisition.
    EnterMonitor(Operand),
    /// Monitor release.
    ExitMonitor(Operand),
    /// Throws the operand.
    Throw(Operand),
    /// Returns, optionally with a value.
    Return(Option<Operand>),
    /// No operation.
    Nop,
}

impl Instruction {
    /// Shorthand for an assignment.
    #[must_use]
    pub fn assign(target: impl Into<Place>, value: impl Into<Expr>) -> Self {
        Self::Assign {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Shorthand for binding the `index`-th parameter.
    #[must_use]
    pub fn parameter(target: Local, index: u32) -> Self {
        Self::Identity {
            target,
            source: IdentitySource::Parameter(index),
        }
    }

    /// Shorthand for a conditional branch.
    #[must_use]
    pub fn branch(condition: impl Into<Expr>) -> Self {
        Self::If {
            condition: condition.into(),
        }
    }

    /// Returns the local written by this instruction, if any.
    #[must_use]
    pub const fn defined_local(&self) -> Option<&Local> {
        match self {
            Self::Assign {
                target: Place::Local(local),
                ..
            }
            | Self::Identity { target: local, .. } => Some(local),
            _ => None,
        }
    }

    /// Returns the invocation performed by this instruction, if any.
    #[must_use]
    pub const fn invoke(&self) -> Option<&InvokeExpr> {
        match self {
            Self::Invoke(invoke)
            | Self::Assign {
                value: Expr::Invoke(invoke),
                ..
            } => Some(invoke),
            _ => None,
        }
    }

    /// Returns every local read by this instruction, including array bases and
    /// indices of the written place.
    #[must_use]
    pub fn used_locals(&self) -> Vec<&Local> {
        match self {
            Self::Assign { target, value } => {
                let mut used = value.used_locals();
                match target {
                    Place::Local(_) | Place::Field { base: None, .. } => {}
                    Place::Field {
                        base: Some(base), ..
                    } => used.push(base),
                    Place::ArrayElement { base, index } => {
                        used.push(base);
                        used.extend(index.as_local());
                    }
                }
                used
            }
            Self::If { condition } => condition.used_locals(),
            Self::LookupSwitch { key } | Self::TableSwitch { key } => {
                key.as_local().into_iter().collect()
            }
            Self::Invoke(invoke) => invoke.args.iter().filter_map(Operand::as_local).collect(),
            Self::EnterMonitor(op) | Self::ExitMonitor(op) | Self::Throw(op) => {
                op.as_local().into_iter().collect()
            }
            Self::Return(value) => value.iter().filter_map(Operand::as_local).collect(),
            Self::Identity { .. } | Self::Goto | Self::Nop => Vec::new(),
        }
    }

    /// Returns every local mentioned by this instruction, read or written.
    #[must_use]
    pub fn locals(&self) -> Vec<&Local> {
        let mut locals = self.used_locals();
        locals.extend(self.defined_local());
        locals
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign { target, value } => write!(f, "{target} = {value}"),
            Self::Identity { target, source } => write!(f, "{target} := {source}"),
            Self::If { condition } => write!(f, "if {condition}"),
            Self::Goto => f.write_str("goto"),
            Self::LookupSwitch { key } => write!(f, "lookupswitch({key})"),
            Self::TableSwitch { key } => write!(f, "tableswitch({key})"),
            Self::Invoke(invoke) => write!(f, "invoke {invoke}"),
            Self::EnterMonitor(op) => write!(f, "entermonitor {op}"),
            Self::ExitMonitor(op) => write!(f, "exitmonitor {op}"),
            Self::Throw(op) => write!(f, "throw {op}"),
            Self::Return(Some(op)) => write!(f, "return {op}"),
            Self::Return(None) => f.write_str("return"),
            Self::Nop => f.write_str("nop"),
        }
    }
}
