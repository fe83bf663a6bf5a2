//! Abstract arithmetic on [`BitVector`]s.
//!
//! Binary operations first bring both operands to a common width by zero-extending
//! the narrower one, except for shifts whose width is that of the shifted value.
//! Comparisons sign-extend, so a negative `int` stays negative against a `long`.

use crate::{
    analysis::dataflow::{
        bits::{Bit, BitVector},
        LatticeValue,
    },
    ir::BinOp,
    Result,
};

/// Special bit budget for multiplication by enumeration.
const ENUMERATION_LIMIT: usize = 5;

fn widen(a: &BitVector, b: &BitVector) -> (BitVector, BitVector) {
    let width = a.width().max(b.width());
    (a.zero_extend(width), b.zero_extend(width))
}

fn specials(bits: [Bit; 3]) -> Option<Bit> {
    if bits.contains(&Bit::Top) {
        Some(Bit::Top)
    } else if bits.contains(&Bit::Bottom) {
        Some(Bit::Bottom)
    } else {
        None
    }
}

fn ones(bits: [Bit; 3]) -> usize {
    bits.iter().filter(|&&bit| bit == Bit::One).count()
}

/// Carry out of one adder position.
///
/// With a ⊤ input the carry is known when the two remaining inputs agree, since they
/// decide the majority. A ⊥ input may still settle to either value, so the carry is
/// the meet of both outcomes.
fn carry_out(inputs: [Bit; 3]) -> Bit {
    if let Some(unreached) = inputs.iter().position(|&bit| bit == Bit::Bottom) {
        let (mut low, mut high) = (inputs, inputs);
        low[unreached] = Bit::Zero;
        high[unreached] = Bit::One;
        return carry_out(low).meet(carry_out(high));
    }
    let known: Vec<Bit> = inputs.into_iter().filter(|bit| !bit.is_special()).collect();
    match known.as_slice() {
        [p, q] if p == q => *p,
        [_, _, _] => Bit::from_bool(ones(inputs) >= 2),
        _ => Bit::Top,
    }
}

/// Ripple-carry addition of two equally wide vectors.
///
/// At a position where an operand bit or the incoming carry is special, the sum bit
/// is special (⊤ if any input is ⊤, ⊥ otherwise).
fn add_with_carry(a: &BitVector, b: &BitVector, carry_in: Bit) -> BitVector {
    let mut carry = carry_in;
    let bits = a
        .bits()
        .iter()
        .zip(b.bits())
        .map(|(&x, &y)| {
            let inputs = [x, y, carry];
            carry = carry_out(inputs);
            match specials(inputs) {
                Some(special) => special,
                None => Bit::from_bool(ones(inputs) % 2 == 1),
            }
        })
        .collect();
    BitVector::from_bits(bits)
}

/// `a + b`
#[must_use]
pub fn add(a: &BitVector, b: &BitVector) -> BitVector {
    let (a, b) = widen(a, b);
    add_with_carry(&a, &b, Bit::Zero)
}

/// `a - b`, computed as `a + !b + 1`.
#[must_use]
pub fn sub(a: &BitVector, b: &BitVector) -> BitVector {
    let (a, b) = widen(a, b);
    add_with_carry(&a, &b.map(Bit::not), Bit::One)
}

/// `-a`, computed as `!a + 1`.
#[must_use]
pub fn neg(a: &BitVector) -> BitVector {
    add(&a.map(Bit::not), &BitVector::constant(1, a.width()))
}

/// `a * b`.
///
/// Tried in order:
/// 1. both operands constant: exact product
/// 2. either operand zero: zero
/// 3. either operand `2^k`: the other shifted left by `k`
/// 4. at most five special bits in total: join over every concrete assignment of
///    the special bits
/// 5. otherwise the known low zeros add up, the known high zeros add up minus the
///    width, and every bit in between is ⊤
///
/// # Errors
///
/// Never fails for equally wide vectors; the result is a `Result` because the
/// enumeration joins products.
pub fn mul(a: &BitVector, b: &BitVector) -> Result<BitVector> {
    let (a, b) = widen(a, b);
    let width = a.width();

    if let (Some(x), Some(y)) = (a.to_raw(), b.to_raw()) {
        return Ok(BitVector::constant(x.wrapping_mul(y) as i64, width));
    }
    if a.is_zero() || b.is_zero() {
        return Ok(BitVector::zero(width));
    }
    if let Some(k) = a.power_of_two() {
        return Ok(shift_left(&b, k));
    }
    if let Some(k) = b.power_of_two() {
        return Ok(shift_left(&a, k));
    }
    if a.special_count() + b.special_count() <= ENUMERATION_LIMIT {
        return enumerate_product(&a, &b);
    }
    Ok(sandwich(&a, &b))
}

fn enumerate_product(a: &BitVector, b: &BitVector) -> Result<BitVector> {
    let positions = |v: &BitVector| -> Vec<usize> {
        v.bits()
            .iter()
            .enumerate()
            .filter(|(_, bit)| bit.is_special())
            .map(|(i, _)| i)
            .collect()
    };
    let (a_specials, b_specials) = (positions(a), positions(b));
    let total = a_specials.len() + b_specials.len();

    let concretize = |v: &BitVector, specials: &[usize], assignment: u32| -> u64 {
        let mut raw = v
            .bits()
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit == Bit::One)
            .fold(0u64, |acc, (i, _)| acc | 1 << i);
        for (n, &pos) in specials.iter().enumerate() {
            if assignment >> n & 1 == 1 {
                raw |= 1 << pos;
            }
        }
        raw
    };

    let width = a.width();
    let mut result: Option<BitVector> = None;
    for assignment in 0u32..(1 << total) {
        let x = concretize(a, &a_specials, assignment);
        let y = concretize(b, &b_specials, assignment >> a_specials.len());
        let product = BitVector::constant(x.wrapping_mul(y) as i64, width);
        result = Some(match result {
            Some(acc) => acc.join(&product)?,
            None => product,
        });
    }
    Ok(result.unwrap_or_else(|| BitVector::top(width)))
}

fn sandwich(a: &BitVector, b: &BitVector) -> BitVector {
    let width = a.width();
    let low = (a.trailing_zeros() + b.trailing_zeros()).min(width);
    let high = (a.leading_zeros() + b.leading_zeros()).saturating_sub(width);
    let bits = (0..width)
        .map(|i| {
            if i < low || i >= width - high {
                Bit::Zero
            } else {
                Bit::Top
            }
        })
        .collect();
    BitVector::from_bits(bits)
}

fn shift_left(v: &BitVector, distance: u32) -> BitVector {
    let width = v.width();
    let bits = (0..width)
        .map(|i| {
            if i < distance {
                Bit::Zero
            } else {
                v.bit(i - distance)
            }
        })
        .collect();
    BitVector::from_bits(bits)
}

fn shift_right(v: &BitVector, distance: u32, fill: Bit) -> BitVector {
    let width = v.width();
    let bits = (0..width)
        .map(|i| {
            if i + distance < width {
                v.bit(i + distance)
            } else {
                fill
            }
        })
        .collect();
    BitVector::from_bits(bits)
}

/// Bitwise `&`, `|` or `^`.
///
/// A known absorbing bit (0 for `&`, 1 for `|`) decides the result; otherwise ⊤ and
/// then ⊥ propagate.
#[must_use]
pub fn bitwise(op: BinOp, a: &BitVector, b: &BitVector) -> BitVector {
    let (a, b) = widen(a, b);
    let absorbing = match op {
        BinOp::And => Some(Bit::Zero),
        BinOp::Or => Some(Bit::One),
        _ => None,
    };
    let bits = a
        .bits()
        .iter()
        .zip(b.bits())
        .map(|(&x, &y)| {
            if absorbing.is_some_and(|abs| x == abs || y == abs) {
                return absorbing.unwrap_or(Bit::Top);
            }
            match (x.known(), y.known()) {
                (Some(p), Some(q)) => Bit::from_bool(match op {
                    BinOp::And => p & q,
                    BinOp::Or => p | q,
                    _ => p ^ q,
                }),
                _ if x == Bit::Top || y == Bit::Top => Bit::Top,
                _ => Bit::Bottom,
            }
        })
        .collect();
    BitVector::from_bits(bits)
}

/// `<<`, `>>` or `>>>`, whose result is as wide as `a`.
///
/// A constant distance is masked to the width and shifts exactly; `>>` replicates
/// the (possibly special) sign bit.
#[must_use]
pub fn shift(op: BinOp, a: &BitVector, distance: &BitVector) -> BitVector {
    let width = a.width();
    let Some(raw) = distance.to_raw() else {
        return unknown(width, a, distance);
    };
    let distance = (raw & u64::from(width - 1)) as u32;
    match op {
        BinOp::Shl => shift_left(a, distance),
        BinOp::Shr => shift_right(a, distance, a.bit(width - 1)),
        _ => shift_right(a, distance, Bit::Zero),
    }
}

/// `/` or `%` with truncating signed semantics.
///
/// Exact for two constants, all-⊤ for a constant zero divisor.
#[must_use]
pub fn div_rem(op: BinOp, a: &BitVector, b: &BitVector) -> BitVector {
    let (a, b) = widen(a, b);
    let width = a.width();
    match (a.to_signed(), b.to_signed()) {
        (Some(_), Some(0)) => BitVector::top(width),
        (Some(x), Some(y)) => {
            let value = if op == BinOp::Div {
                x.wrapping_div(y)
            } else {
                x.wrapping_rem(y)
            };
            BitVector::constant(value, width)
        }
        _ => unknown(width, &a, &b),
    }
}

/// Relational and three-way comparisons, producing a 32-bit `int`.
///
/// Relational results are `0` or `1`, so only bit 0 can be unknown.
#[must_use]
pub fn compare(op: BinOp, a: &BitVector, b: &BitVector) -> BitVector {
    let width = a.width().max(b.width());
    let (a, b) = (a.sign_extend(width), b.sign_extend(width));
    if let (Some(x), Some(y)) = (a.to_signed(), b.to_signed()) {
        let ordering = x.cmp(&y);
        let value = match op {
            BinOp::Eq => i64::from(ordering.is_eq()),
            BinOp::Ne => i64::from(ordering.is_ne()),
            BinOp::Lt => i64::from(ordering.is_lt()),
            BinOp::Le => i64::from(ordering.is_le()),
            BinOp::Gt => i64::from(ordering.is_gt()),
            BinOp::Ge => i64::from(ordering.is_ge()),
            _ => ordering as i64,
        };
        return BitVector::constant(value, 32);
    }
    if op.is_relational() {
        let mut bits = vec![Bit::Zero; 32];
        bits[0] = Bit::Top;
        BitVector::from_bits(bits)
    } else {
        BitVector::top(32)
    }
}

/// Fallback for operations without a precise rule.
fn unknown(width: u32, a: &BitVector, b: &BitVector) -> BitVector {
    if a.is_bottom() || b.is_bottom() {
        BitVector::bottom(width)
    } else {
        BitVector::top(width)
    }
}
