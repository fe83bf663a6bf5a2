//! The constant-bits analysis and its instruction semantics.

use crate::{
    analysis::{
        cfg::{ControlFlowGraph, ElementaryBlock},
        dataflow::{
            bits::{arith, BitVector},
            Analysis, AnalysisParts, Direction, MapElement, MapInitializer, MapJoin, Transfer,
        },
    },
    ir::{BinOp, Constant, Expr, Instruction, Local, LocalType, Operand, Place, UnOp},
    Error, Result,
};

const NAME: &str = "Constant Bits";

/// Forward analysis tracking every bit of integral locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantBits;

impl Analysis for ConstantBits {
    type Element = MapElement<BitVector>;

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
            transfer: Box::new(ConstantBitsTransfer),
            initializer: Box::new(MapInitializer::new(
                universe,
                |local| BitVector::bottom(local.ty().bit_width()),
                |local| BitVector::zero(local.ty().bit_width()),
            )),
        })
    }
}

/// Instruction semantics of [`ConstantBits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantBitsTransfer;

impl Transfer<MapElement<BitVector>> for ConstantBitsTransfer {
    fn apply(
        &self,
        element: &MapElement<BitVector>,
        block: &ElementaryBlock,
    ) -> Result<MapElement<BitVector>> {
        let instruction = block.instruction();
        let mut result = element.clone();
        match instruction {
            Instruction::Assign {
                target: Place::Local(target),
                value,
            } if element.contains(target) => {
                let width = target.ty().bit_width();
                let evaluated = evaluate(element, value, width)?;
                result.set(target, evaluated.zero_extend(width))?;
            }
            Instruction::Identity { target, .. } if element.contains(target) => {
                result.set(target, BitVector::top(target.ty().bit_width()))?;
            }
            Instruction::LookupSwitch { .. } | Instruction::TableSwitch { .. } => {
                return Err(Error::UnsupportedInstruction(NAME, instruction.to_string()));
            }
            Instruction::Assign { .. }
            | Instruction::Identity { .. }
            | Instruction::If { .. }
            | Instruction::Goto
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

/// Evaluates `expr`; `width` is the width of the assigned local and is used for
/// values the domain cannot see into.
fn evaluate(element: &MapElement<BitVector>, expr: &Expr, width: u32) -> Result<BitVector> {
    Ok(match expr {
        Expr::Operand(op) => operand(element, op)?,
        Expr::Binary { op, lhs, rhs } => {
            let (a, b) = (operand(element, lhs)?, operand(element, rhs)?);
            match op {
                BinOp::Add => arith::add(&a, &b),
                BinOp::Sub => arith::sub(&a, &b),
                BinOp::Mul => arith::mul(&a, &b)?,
                BinOp::Div | BinOp::Rem => arith::div_rem(*op, &a, &b),
                BinOp::And | BinOp::Or | BinOp::Xor => arith::bitwise(*op, &a, &b),
                BinOp::Shl | BinOp::Shr | BinOp::Ushr => arith::shift(*op, &a, &b),
                BinOp::Cmp
                | BinOp::Cmpl
                | BinOp::Cmpg
                | BinOp::Eq
                | BinOp::Ne
                | BinOp::Lt
                | BinOp::Le
                | BinOp::Gt
                | BinOp::Ge => arith::compare(*op, &a, &b),
            }
        }
        Expr::Unary {
            op: UnOp::Neg,
            operand: op,
        } => arith::neg(&operand(element, op)?),
        Expr::Unary {
            op: UnOp::Length, ..
        } => BitVector::top(32),
        Expr::Cast { ty, operand: op } => cast(*ty, &operand(element, op)?),
        Expr::InstanceOf { .. }
        | Expr::Invoke(_)
        | Expr::Field { .. }
        | Expr::ArrayRead { .. }
        | Expr::New(_)
        | Expr::NewArray { .. } => BitVector::top(width),
    })
}

fn operand(element: &MapElement<BitVector>, op: &Operand) -> Result<BitVector> {
    match op {
        Operand::Local(local) => Ok(local_value(element, local)),
        Operand::Constant(Constant::Int(value)) => Ok(BitVector::constant(i64::from(*value), 32)),
        Operand::Constant(Constant::Long(value)) => Ok(BitVector::constant(*value, 64)),
        Operand::Constant(Constant::Float(_)) => Ok(BitVector::top(32)),
        Operand::Constant(Constant::Double(_)) => Ok(BitVector::top(64)),
        Operand::Constant(_) => Err(Error::UnsupportedValue(NAME, op.to_string())),
    }
}

/// Floating point and reference locals are not tracked and read as all-⊤.
fn local_value(element: &MapElement<BitVector>, local: &Local) -> BitVector {
    element
        .get(local)
        .cloned()
        .unwrap_or_else(|_| BitVector::top(local.ty().bit_width()))
}

fn cast(ty: LocalType, value: &BitVector) -> BitVector {
    match ty {
        LocalType::Long => value.sign_extend(64),
        LocalType::Int | LocalType::Boolean => value.zero_extend(32),
        LocalType::Byte => value.zero_extend(8).sign_extend(32),
        LocalType::Short => value.zero_extend(16).sign_extend(32),
        LocalType::Char => value.zero_extend(16).zero_extend(32),
        LocalType::Float => BitVector::top(32),
        LocalType::Double | LocalType::Reference => BitVector::top(64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dataflow::LatticeElement;

    fn apply(
        element: &MapElement<BitVector>,
        instruction: Instruction,
    ) -> Result<MapElement<BitVector>> {
        ConstantBitsTransfer.apply(element, &ElementaryBlock::new(0, instruction))
    }

    #[test]
    fn test_assign_and_multiply() {
        let x = Local::new("x", LocalType::Int);
        let y = Local::new("y", LocalType::Int);
        let element = MapElement::new([x.clone(), y.clone()], |_| BitVector::zero(32));

        let element = apply(&element, Instruction::assign(&x, Operand::int(6))).unwrap();
        let element = apply(
            &element,
            Instruction::assign(&y, Expr::binary(BinOp::Mul, &x, Operand::int(4))),
        )
        .unwrap();

        assert_eq!(element.get(&y).unwrap(), &BitVector::constant(24, 32));
    }

    #[test]
    fn test_parameter_is_top() {
        let p = Local::new("p", LocalType::Long);
        let element = MapElement::new([p.clone()], |_| BitVector::zero(64));
        let element = apply(&element, Instruction::parameter(p.clone(), 0)).unwrap();
        assert_eq!(element.get(&p).unwrap(), &BitVector::top(64));
        assert!(!element.get(&p).unwrap().is_constant());
    }

    #[test]
    fn test_result_fits_target_width() {
        let l = Local::new("l", LocalType::Long);
        let b = Local::new("b", LocalType::Boolean);
        let element = MapElement::new([l.clone(), b.clone()], |local| {
            BitVector::zero(local.ty().bit_width())
        });

        let element = apply(
            &element,
            Instruction::assign(&b, Expr::binary(BinOp::Lt, &l, Operand::long(3))),
        )
        .unwrap();
        assert_eq!(element.get(&b).unwrap(), &BitVector::constant(1, 32));

        let element = apply(&element, Instruction::assign(&l, Expr::cast(LocalType::Long, Operand::int(-1))))
            .unwrap();
        assert_eq!(element.get(&l).unwrap().to_signed(), Some(-1));
    }

    #[test]
    fn test_narrowing_casts() {
        let byte = cast(LocalType::Byte, &BitVector::constant(200, 32));
        assert_eq!(byte.to_signed(), Some(-56));
        let ch = cast(LocalType::Char, &BitVector::constant(-1, 32));
        assert_eq!(ch.to_signed(), Some(65535));
        let int = cast(LocalType::Int, &BitVector::constant((1 << 32) | 5, 64));
        assert_eq!(int.to_signed(), Some(5));
    }

    #[test]
    fn test_switch_unsupported() {
        let x = Local::new("x", LocalType::Int);
        let element = MapElement::new([x.clone()], |_| BitVector::zero(32));
        let result = apply(&element, Instruction::TableSwitch { key: Operand::from(&x) });
        assert!(matches!(
            result,
            Err(Error::UnsupportedInstruction(NAME, _))
        ));
    }

    #[test]
    fn test_render() {
        let x = Local::new("x", LocalType::Int);
        let element = MapElement::new([x], |_| BitVector::constant(5, 32));
        assert_eq!(
            element.render(),
            format!("{{x: {}101}}", "0".repeat(29))
        );
    }
}
