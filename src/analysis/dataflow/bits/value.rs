//! Per-bit abstract values and fixed-width bit vectors.

use std::fmt;

use crate::{analysis::dataflow::LatticeValue, Error, Result};

/// The abstract value of a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    /// Known to be 0.
    Zero,
    /// Known to be 1.
    One,
    /// Either value.
    Top,
    /// Not reached yet.
    Bottom,
}

impl Bit {
    /// Converts a concrete bit.
    #[must_use]
    pub const fn from_bool(bit: bool) -> Self {
        if bit {
            Self::One
        } else {
            Self::Zero
        }
    }

    /// Returns `true` for [`Bit::Top`] and [`Bit::Bottom`].
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Returns the concrete value of a known bit.
    #[must_use]
    pub const fn known(self) -> Option<bool> {
        match self {
            Self::Zero => Some(false),
            Self::One => Some(true),
            Self::Top | Self::Bottom => None,
        }
    }

    /// Least upper bound of two bits.
    #[must_use]
    pub const fn join(self, other: Self) -> Self {
        match (self, other) {
            (Self::Top, _) | (_, Self::Top) => Self::Top,
            (Self::Bottom, x) | (x, Self::Bottom) => x,
            (Self::Zero, Self::Zero) => Self::Zero,
            (Self::One, Self::One) => Self::One,
            _ => Self::Top,
        }
    }

    /// Greatest lower bound of two bits.
    #[must_use]
    pub const fn meet(self, other: Self) -> Self {
        match (self, other) {
            (Self::Bottom, _) | (_, Self::Bottom) => Self::Bottom,
            (Self::Top, x) | (x, Self::Top) => x,
            (Self::Zero, Self::Zero) => Self::Zero,
            (Self::One, Self::One) => Self::One,
            _ => Self::Bottom,
        }
    }

    /// Flips a known bit; special bits stay as they are.
    #[must_use]
    pub const fn not(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
            special => special,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Top => '⊤',
            Self::Bottom => '⊥',
        }
    }
}

/// A fixed-width vector of abstract bits, bit 0 being the least significant.
///
/// The width is 64 for `long` locals and 32 for every other integral type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    bits: Vec<Bit>,
}

impl BitVector {
    /// Creates a vector with every bit set to `bit`.
    #[must_use]
    pub fn filled(width: u32, bit: Bit) -> Self {
        Self {
            bits: vec![bit; width as usize],
        }
    }

    /// The all-⊥ vector.
    #[must_use]
    pub fn bottom(width: u32) -> Self {
        Self::filled(width, Bit::Bottom)
    }

    /// The all-⊤ vector.
    #[must_use]
    pub fn top(width: u32) -> Self {
        Self::filled(width, Bit::Top)
    }

    /// The concrete zero.
    #[must_use]
    pub fn zero(width: u32) -> Self {
        Self::filled(width, Bit::Zero)
    }

    /// The concrete value `value`, truncated to `width` bits.
    #[must_use]
    pub fn constant(value: i64, width: u32) -> Self {
        let raw = value as u64;
        Self {
            bits: (0..width)
                .map(|i| Bit::from_bool(raw >> i & 1 == 1))
                .collect(),
        }
    }

    /// Builds a vector from bits ordered least significant first.
    #[must_use]
    pub fn from_bits(bits: Vec<Bit>) -> Self {
        Self { bits }
    }

    /// Returns the width in bits.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Returns bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    #[must_use]
    pub fn bit(&self, index: u32) -> Bit {
        self.bits[index as usize]
    }

    /// Returns the bits, least significant first.
    #[must_use]
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    /// Returns the raw two's complement pattern if every bit is known.
    #[must_use]
    pub fn to_raw(&self) -> Option<u64> {
        self.bits
            .iter()
            .enumerate()
            .try_fold(0u64, |acc, (i, bit)| {
                bit.known().map(|set| acc | (u64::from(set) << i))
            })
    }

    /// Returns the signed value if every bit is known.
    #[must_use]
    pub fn to_signed(&self) -> Option<i64> {
        let raw = self.to_raw()?;
        let width = self.width();
        Some(if width >= 64 {
            raw as i64
        } else {
            ((raw << (64 - width)) as i64) >> (64 - width)
        })
    }

    /// Returns `true` if every bit is known.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.bits.iter().all(|bit| !bit.is_special())
    }

    /// Returns `true` if every bit is [`Bit::Zero`].
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|&bit| bit == Bit::Zero)
    }

    /// Returns `true` if every bit is [`Bit::Bottom`].
    #[must_use]
    pub fn is_bottom(&self) -> bool {
        self.bits.iter().all(|&bit| bit == Bit::Bottom)
    }

    /// Returns the number of ⊤ and ⊥ bits.
    #[must_use]
    pub fn special_count(&self) -> usize {
        self.bits.iter().filter(|bit| bit.is_special()).count()
    }

    /// Returns `k` if the vector is exactly `2^k`.
    #[must_use]
    pub fn power_of_two(&self) -> Option<u32> {
        let raw = self.to_raw()?;
        raw.is_power_of_two().then(|| raw.trailing_zeros())
    }

    /// Number of low bits guaranteed to be zero.
    #[must_use]
    pub fn trailing_zeros(&self) -> u32 {
        self.bits.iter().take_while(|&&bit| bit == Bit::Zero).count() as u32
    }

    /// Number of high bits guaranteed to be zero.
    #[must_use]
    pub fn leading_zeros(&self) -> u32 {
        self.bits
            .iter()
            .rev()
            .take_while(|&&bit| bit == Bit::Zero)
            .count() as u32
    }

    /// Widens with zero bits or truncates to `width`.
    #[must_use]
    pub fn zero_extend(&self, width: u32) -> Self {
        self.extend_with(width, Bit::Zero)
    }

    /// Widens by replicating the top bit, or truncates to `width`.
    #[must_use]
    pub fn sign_extend(&self, width: u32) -> Self {
        let sign = self.bits.last().copied().unwrap_or(Bit::Zero);
        self.extend_with(width, sign)
    }

    fn extend_with(&self, width: u32, fill: Bit) -> Self {
        let mut bits = self.bits.clone();
        bits.resize(width as usize, fill);
        Self { bits }
    }

    /// Applies `op` to every bit.
    #[must_use]
    pub fn map(&self, op: impl Fn(Bit) -> Bit) -> Self {
        Self {
            bits: self.bits.iter().map(|&bit| op(bit)).collect(),
        }
    }
}

impl LatticeValue for BitVector {
    fn join(&self, other: &Self) -> Result<Self> {
        if self.width() != other.width() {
            return Err(Error::MismatchedDomain(format!(
                "cannot join a {}-bit vector with a {}-bit vector",
                self.width(),
                other.width()
            )));
        }
        Ok(Self {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| a.join(b))
                .collect(),
        })
    }

    fn render(&self) -> String {
        self.bits.iter().rev().map(|bit| bit.symbol()).collect()
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
