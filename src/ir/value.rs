//! Operands and right-hand-side expressions.

use std::fmt;

use bitflags::bitflags;

use crate::ir::{Local, LocalType};

/// A literal constant appearing as an operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// 32-bit integer (also used for boolean, byte, char and short literals).
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// The null reference.
    Null,
    /// A string literal.
    String(String),
    /// A class literal.
    Class(String),
    /// A method handle literal.
    MethodHandle(String),
}

impl Constant {
    /// Returns `true` for constants that denote an object reference rather than a
    /// plain number (strings, classes, method handles).
    #[must_use]
    pub const fn is_object_reference(&self) -> bool {
        matches!(self, Self::String(_) | Self::Class(_) | Self::MethodHandle(_))
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Float(v) => write!(f, "{v}F"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Null => f.write_str("null"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Class(c) => write!(f, "class \"{c}\""),
            Self::MethodHandle(m) => write!(f, "methodhandle: \"{m}\""),
        }
    }
}

/// An immediate operand: either a local or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A read of a local variable.
    Local(Local),
    /// A literal constant.
    Constant(Constant),
}

impl Operand {
    /// Shorthand for an `int` constant operand.
    #[must_use]
    pub const fn int(value: i32) -> Self {
        Self::Constant(Constant::Int(value))
    }

    /// Shorthand for a `long` constant operand.
    #[must_use]
    pub const fn long(value: i64) -> Self {
        Self::Constant(Constant::Long(value))
    }

    /// Returns the local read by this operand, if any.
    #[must_use]
    pub const fn as_local(&self) -> Option<&Local> {
        match self {
            Self::Local(local) => Some(local),
            Self::Constant(_) => None,
        }
    }
}

impl From<Local> for Operand {
    fn from(local: Local) -> Self {
        Self::Local(local)
    }
}

impl From<&Local> for Operand {
    fn from(local: &Local) -> Self {
        Self::Local(local.clone())
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Self::Constant(constant)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{local}"),
            Self::Constant(constant) => write!(f, "{constant}"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>` (arithmetic)
    Shr,
    /// `>>>` (logical)
    Ushr,
    /// `cmp`: three-way compare of longs
    Cmp,
    /// `cmpl`: three-way compare of floats, NaN yields -1
    Cmpl,
    /// `cmpg`: three-way compare of floats, NaN yields 1
    Cmpg,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinOp {
    /// Returns `true` for the boolean-valued relational operators.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// Returns `true` for the three-way compare operators.
    #[must_use]
    pub const fn is_three_way(self) -> bool {
        matches!(self, Self::Cmp | Self::Cmpl | Self::Cmpg)
    }

    /// Returns `true` for the shift operators.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr | Self::Ushr)
    }

    /// Returns the textual symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Ushr => ">>>",
            Self::Cmp => "cmp",
            Self::Cmpl => "cmpl",
            Self::Cmpg => "cmpg",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Arithmetic negation.
    Neg,
    /// Array length.
    Length,
}

bitflags! {
    /// Marker tags attached to the callee of an invoke.
    ///
    /// The taint analysis recognises these as intrinsics; every other analysis
    /// treats tagged and untagged calls alike.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InvokeTags: u8 {
        /// The callee forces its single argument to tainted.
        const TAINT = 0b001;
        /// The callee sanitizes its single argument.
        const CLEAN = 0b010;
        /// The callee is a sensitive sink.
        const SENSITIVE = 0b100;
    }
}

/// A method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    /// The callee name.
    pub method: String,
    /// The call arguments.
    pub args: Vec<Operand>,
    /// Marker tags carried by the callee.
    pub tags: InvokeTags,
}

impl InvokeExpr {
    /// Creates an untagged invocation.
    #[must_use]
    pub fn new(method: impl Into<String>, args: Vec<Operand>) -> Self {
        Self {
            method: method.into(),
            args,
            tags: InvokeTags::empty(),
        }
    }

    /// Returns this invocation with the given marker tags.
    #[must_use]
    pub fn with_tags(mut self, tags: InvokeTags) -> Self {
        self.tags = tags;
        self
    }
}

impl fmt::Display for InvokeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// The right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A plain operand.
    Operand(Operand),
    /// `lhs op rhs`
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// `op operand`
    Unary {
        /// The operator.
        op: UnOp,
        /// The operand.
        operand: Operand,
    },
    /// `(ty) operand`
    Cast {
        /// Target type.
        ty: LocalType,
        /// The converted operand.
        operand: Operand,
    },
    /// `operand instanceof class`
    InstanceOf {
        /// The tested operand.
        operand: Operand,
        /// The class tested against.
        class: String,
    },
    /// The result of a method invocation.
    Invoke(InvokeExpr),
    /// A field read, static when `base` is `None`.
    Field {
        /// Receiver of an instance field.
        base: Option<Local>,
        /// Field name.
        field: String,
    },
    /// `base[index]`
    ArrayRead {
        /// The array.
        base: Local,
        /// The element index.
        index: Operand,
    },
    /// `new class`
    New(String),
    /// `newarray (element)[size]`
    NewArray {
        /// Element type name.
        element: String,
        /// Array length.
        size: Operand,
    },
}

impl Expr {
    /// Shorthand for a binary expression.
    #[must_use]
    pub fn binary(op: BinOp, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::Binary {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Shorthand for a unary expression.
    #[must_use]
    pub fn unary(op: UnOp, operand: impl Into<Operand>) -> Self {
        Self::Unary {
            op,
            operand: operand.into(),
        }
    }

    /// Shorthand for a cast.
    #[must_use]
    pub fn cast(ty: LocalType, operand: impl Into<Operand>) -> Self {
        Self::Cast {
            ty,
            operand: operand.into(),
        }
    }

    /// Returns every local read while evaluating this expression.
    #[must_use]
    pub fn used_locals(&self) -> Vec<&Local> {
        let mut used = Vec::new();
        match self {
            Self::Operand(op) | Self::Unary { operand: op, .. } | Self::Cast { operand: op, .. } => {
                used.extend(op.as_local());
            }
            Self::InstanceOf { operand, .. } => used.extend(operand.as_local()),
            Self::Binary { lhs, rhs, .. } => {
                used.extend(lhs.as_local());
                used.extend(rhs.as_local());
            }
            Self::Invoke(invoke) => used.extend(invoke.args.iter().filter_map(Operand::as_local)),
            Self::Field { base, .. } => used.extend(base.as_ref()),
            Self::ArrayRead { base, index } => {
                used.push(base);
                used.extend(index.as_local());
            }
            Self::New(_) => {}
            Self::NewArray { size, .. } => used.extend(size.as_local()),
        }
        used
    }
}

impl From<Operand> for Expr {
    fn from(operand: Operand) -> Self {
        Self::Operand(operand)
    }
}

impl From<Local> for Expr {
    fn from(local: Local) -> Self {
        Self::Operand(Operand::Local(local))
    }
}

impl From<&Local> for Expr {
    fn from(local: &Local) -> Self {
        Self::Operand(Operand::Local(local.clone()))
    }
}

impl From<Constant> for Expr {
    fn from(constant: Constant) -> Self {
        Self::Operand(Operand::Constant(constant))
    }
}

impl From<InvokeExpr> for Expr {
    fn from(invoke: InvokeExpr) -> Self {
        Self::Invoke(invoke)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(op) => write!(f, "{op}"),
            Self::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Self::Unary {
                op: UnOp::Neg,
                operand,
            } => write!(f, "neg {operand}"),
            Self::Unary {
                op: UnOp::Length,
                operand,
            } => write!(f, "lengthof {operand}"),
            Self::Cast { ty, operand } => write!(f, "({ty}) {operand}"),
            Self::InstanceOf { operand, class } => write!(f, "{operand} instanceof {class}"),
            Self::Invoke(invoke) => write!(f, "invoke {invoke}"),
            Self::Field {
                base: Some(base),
                field,
            } => write!(f, "{base}.{field}"),
            Self::Field { base: None, field } => write!(f, "<{field}>"),
            Self::ArrayRead { base, index } => write!(f, "{base}[{index}]"),
            Self::New(class) => write!(f, "new {class}"),
            Self::NewArray { element, size } => write!(f, "newarray ({element})[{size}]"),
        }
    }
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// A local variable.
    Local(Local),
    /// A field, static when `base` is `None`.
    Field {
        /// Receiver of an instance field.
        base: Option<Local>,
        /// Field name.
        field: String,
    },
    /// `base[index]`
    ArrayElement {
        /// The array.
        base: Local,
        /// The element index.
        index: Operand,
    },
}

impl From<Local> for Place {
    fn from(local: Local) -> Self {
        Self::Local(local)
    }
}

impl From<&Local> for Place {
    fn from(local: &Local) -> Self {
        Self::Local(local.clone())
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{local}"),
            Self::Field {
                base: Some(base),
                field,
            } => write!(f, "{base}.{field}"),
            Self::Field { base: None, field } => write!(f, "<{field}>"),
            Self::ArrayElement { base, index } => write!(f, "{base}[{index}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_display() {
        let x = Local::new("x", LocalType::Int);
        assert_eq!(Expr::binary(BinOp::Mul, &x, Operand::int(17)).to_string(), "x * 17");
        assert_eq!(Expr::cast(LocalType::Byte, &x).to_string(), "(byte) x");
        assert_eq!(Expr::from(Constant::Long(3)).to_string(), "3L");
        assert_eq!(
            Expr::from(InvokeExpr::new("source", vec![Operand::int(1), x.clone().into()]))
                .to_string(),
            "invoke source(1, x)"
        );
    }

    #[test]
    fn test_used_locals() {
        let a = Local::new("a", LocalType::Reference);
        let i = Local::new("i", LocalType::Int);
        let read = Expr::ArrayRead {
            base: a.clone(),
            index: Operand::from(&i),
        };
        assert_eq!(read.used_locals(), vec![&a, &i]);
        assert!(Expr::New("java.lang.Object".into()).used_locals().is_empty());
    }

    #[test]
    fn test_constant_classification() {
        assert!(Constant::String("s".into()).is_object_reference());
        assert!(Constant::Class("C".into()).is_object_reference());
        assert!(!Constant::Null.is_object_reference());
        assert!(!Constant::Int(0).is_object_reference());
    }

    #[test]
    fn test_invoke_tags() {
        let call = InvokeExpr::new("sink", vec![]).with_tags(InvokeTags::SENSITIVE);
        assert!(call.tags.contains(InvokeTags::SENSITIVE));
        assert!(!call.tags.contains(InvokeTags::TAINT));
    }
}
