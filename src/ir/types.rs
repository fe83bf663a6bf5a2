//! Local variables and their declared types.

use std::fmt;

use strum::{Display, EnumIter};

/// The declared type of a local variable.
///
/// Only the primitive types are interesting to the analyses; every object, array
/// or string local collapses into [`LocalType::Reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum LocalType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// Any object, array or string reference.
    #[strum(serialize = "object")]
    Reference,
}

impl LocalType {
    /// Returns `true` for boolean, byte, char, short, int and long.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Byte | Self::Char | Self::Short | Self::Int | Self::Long
        )
    }

    /// Returns `true` for every integral type plus float and double.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Self::Float | Self::Double)
    }

    /// Returns the width in bits of the computational type.
    ///
    /// Sub-int types compute in 32 bits, exactly like `int`.
    #[must_use]
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::Long | Self::Double => 64,
            _ => 32,
        }
    }
}

/// A named local variable of a procedure.
///
/// Locals order by name first, which gives every map keyed by locals a stable,
/// human-friendly rendering order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Local {
    name: String,
    ty: LocalType,
}

impl Local {
    /// Creates a new local with the given name and declared type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: LocalType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn ty(&self) -> LocalType {
        self.ty
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
