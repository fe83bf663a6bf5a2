//! Constant folding over integral locals.
//!
//! Each tracked local maps to a [`ConstValue`]: unreached, a single known constant,
//! or any value. Arithmetic folds with two's complement wrapping, shift distances
//! are masked to the operand width, and comparisons produce `0`/`1` (or `-1`/`0`/`1`
//! for the three-way compares).

use std::cmp::Ordering;

use crate::{
    analysis::{
        cfg::{ControlFlowGraph, ElementaryBlock},
        dataflow::{
            Analysis, AnalysisParts, Direction, LatticeValue, MapElement, MapInitializer,
            MapJoin, Transfer,
        },
    },
    ir::{BinOp, Constant, Expr, Instruction, Local, LocalType, Operand, Place, UnOp},
    Error, Result,
};

const NAME: &str = "Constant Folding";

/// The constant folding value lattice.
///
/// ```text
///            ⊤
///   ... -1  0  1  2 ...
///            ⊥
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConstValue {
    /// Not reached yet.
    #[default]
    Bottom,
    /// Any value.
    Top,
    /// A known `boolean`/`byte`/`char`/`short`/`int` value.
    Int(i32),
    /// A known `long` value.
    Long(i64),
}

impl ConstValue {
    /// Returns the freshly defined value (zero) for a local of type `ty`.
    #[must_use]
    pub const fn zero(ty: LocalType) -> Self {
        match ty {
            LocalType::Long => Self::Long(0),
            _ => Self::Int(0),
        }
    }

    /// Returns `true` for a known constant.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Long(_))
    }

    const fn as_long(self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(value as i64),
            Self::Long(value) => Some(value),
            Self::Bottom | Self::Top => None,
        }
    }
}

impl LatticeValue for ConstValue {
    fn join(&self, other: &Self) -> Result<Self> {
        Ok(match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => *x,
            (a, b) if a == b => *a,
            _ => Self::Top,
        })
    }

    fn render(&self) -> String {
        match self {
            Self::Bottom => "⊥".to_string(),
            Self::Top => "⊤".to_string(),
            Self::Int(value) => value.to_string(),
            Self::Long(value) => format!("{value}L"),
        }
    }
}

/// Forward constant folding over `boolean`, `byte`, `char`, `short`, `int` and
/// `long` locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolding;

impl Analysis for ConstantFolding {
    type Element = MapElement<ConstValue>;

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
            .filter(|local| local.ty().is_integral())
            .cloned()
            .collect();

        Ok(AnalysisParts {
            join: Box::new(MapJoin::new()),
            transfer: Box::new(ConstantFoldingTransfer),
            initializer: Box::new(MapInitializer::new(
                universe,
                |_| ConstValue::Bottom,
                |local| ConstValue::zero(local.ty()),
            )),
        })
    }
}

/// Instruction semantics of [`ConstantFolding`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFoldingTransfer;

impl Transfer<MapElement<ConstValue>> for ConstantFoldingTransfer {
    fn apply(
        &self,
        element: &MapElement<ConstValue>,
        block: &ElementaryBlock,
    ) -> Result<MapElement<ConstValue>> {
        let mut result = element.clone();
        match block.instruction() {
            Instruction::Assign {
                target: Place::Local(target),
                value,
            } if element.contains(target) => {
                let folded = evaluate(element, value)?;
                result.set(target, folded)?;
            }
            Instruction::Identity { target, .. } if element.contains(target) => {
                result.set(target, ConstValue::Top)?;
            }
            Instruction::Assign { .. }
            | Instruction::Identity { .. }
            | Instruction::If { .. }
            | Instruction::Goto
            | Instruction::LookupSwitch { .. }
            | Instruction::TableSwitch { .. }
            | Instruction::Invoke(_)
            | Instruction::EnterMonitor(_)
            | Instruction::ExitMonitor(_)
            | Instruction::Throw(_)
            | Instruction::Return(_)
            | Instruction::Nop => {}
        }
        Ok(result)
    }
}

fn evaluate(element: &MapElement<ConstValue>, expr: &Expr) -> Result<ConstValue> {
    Ok(match expr {
        Expr::Operand(op) => operand(element, op)?,
        Expr::Binary { op, lhs, rhs } => {
            fold_binary(*op, operand(element, lhs)?, operand(element, rhs)?)
        }
        Expr::Unary {
            op: UnOp::Neg,
            operand: op,
        } => match operand(element, op)? {
            ConstValue::Int(value) => ConstValue::Int(value.wrapping_neg()),
            ConstValue::Long(value) => ConstValue::Long(value.wrapping_neg()),
            other => other,
        },
        Expr::Cast { ty, operand: op } => cast(*ty, operand(element, op)?),
        Expr::Unary {
            op: UnOp::Length, ..
        }
        | Expr::InstanceOf { .. }
        | Expr::Invoke(_)
        | Expr::Field { .. }
        | Expr::ArrayRead { .. }
        | Expr::New(_)
        | Expr::NewArray { .. } => ConstValue::Top,
    })
}

fn operand(element: &MapElement<ConstValue>, op: &Operand) -> Result<ConstValue> {
    match op {
        Operand::Local(local) => Ok(local_value(element, local)),
        Operand::Constant(Constant::Int(value)) => Ok(ConstValue::Int(*value)),
        Operand::Constant(Constant::Long(value)) => Ok(ConstValue::Long(*value)),
        Operand::Constant(Constant::Float(_) | Constant::Double(_)) => Ok(ConstValue::Top),
        Operand::Constant(_) => Err(Error::UnsupportedValue(NAME, op.to_string())),
    }
}

/// Floating point and reference locals are not tracked and read as ⊤.
fn local_value(element: &MapElement<ConstValue>, local: &Local) -> ConstValue {
    element.get(local).copied().unwrap_or(ConstValue::Top)
}

/// Folds `lhs op rhs`.
///
/// Any ⊥ operand gives ⊥, otherwise any ⊤ operand gives ⊤.
#[must_use]
pub fn fold_binary(op: BinOp, lhs: ConstValue, rhs: ConstValue) -> ConstValue {
    match (lhs, rhs) {
        (ConstValue::Bottom, _) | (_, ConstValue::Bottom) => ConstValue::Bottom,
        (ConstValue::Top, _) | (_, ConstValue::Top) => ConstValue::Top,
        (ConstValue::Int(a), ConstValue::Int(b)) => fold_int(op, a, b),
        (ConstValue::Long(a), ConstValue::Int(b)) if op.is_shift() => {
            fold_long(op, a, i64::from(b))
        }
        (a, b) => match (a.as_long(), b.as_long()) {
            (Some(a), Some(b)) => fold_long(op, a, b),
            _ => ConstValue::Top,
        },
    }
}

fn fold_int(op: BinOp, a: i32, b: i32) -> ConstValue {
    let distance = (b & 0x1f) as u32;
    let value = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Rem if b == 0 => return ConstValue::Top,
        BinOp::Div => a.wrapping_div(b),
        BinOp::Rem => a.wrapping_rem(b),
        BinOp::And => a & b,
        BinOp::Or => a | b,
        BinOp::Xor => a ^ b,
        BinOp::Shl => a.wrapping_shl(distance),
        BinOp::Shr => a.wrapping_shr(distance),
        BinOp::Ushr => ((a as u32) >> distance) as i32,
        BinOp::Cmp | BinOp::Cmpl | BinOp::Cmpg => three_way(a.cmp(&b)),
        _ => i32::from(relation(op, a.cmp(&b))),
    };
    ConstValue::Int(value)
}

fn fold_long(op: BinOp, a: i64, b: i64) -> ConstValue {
    let distance = (b & 0x3f) as u32;
    let value = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Rem if b == 0 => return ConstValue::Top,
        BinOp::Div => a.wrapping_div(b),
        BinOp::Rem => a.wrapping_rem(b),
        BinOp::And => a & b,
        BinOp::Or => a | b,
        BinOp::Xor => a ^ b,
        BinOp::Shl => a.wrapping_shl(distance),
        BinOp::Shr => a.wrapping_shr(distance),
        BinOp::Ushr => ((a as u64) >> distance) as i64,
        BinOp::Cmp | BinOp::Cmpl | BinOp::Cmpg => return ConstValue::Int(three_way(a.cmp(&b))),
        _ => return ConstValue::Int(i32::from(relation(op, a.cmp(&b)))),
    };
    ConstValue::Long(value)
}

const fn three_way(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn relation(op: BinOp, ordering: Ordering) -> bool {
    match op {
        BinOp::Eq => ordering.is_eq(),
        BinOp::Ne => ordering.is_ne(),
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

fn cast(ty: LocalType, value: ConstValue) -> ConstValue {
    let Some(raw) = value.as_long() else {
        return value;
    };
    match ty {
        LocalType::Byte => ConstValue::Int(i32::from(raw as i8)),
        LocalType::Short => ConstValue::Int(i32::from(raw as i16)),
        LocalType::Char => ConstValue::Int(i32::from(raw as u16)),
        LocalType::Boolean | LocalType::Int => ConstValue::Int(raw as i32),
        LocalType::Long => ConstValue::Long(raw),
        LocalType::Float | LocalType::Double | LocalType::Reference => ConstValue::Top,
    }
}
