//! Lattice traits and the generic variable map domain.
//!
//! Every analysis in this crate computes over a finite-height lattice. Values
//! combine at control flow merge points with a join (least upper bound):
//!
//! - **Idempotent**: `x ⊔ x = x`
//! - **Commutative**: `x ⊔ y = y ⊔ x`
//! - **Associative**: `x ⊔ (y ⊔ z) = (x ⊔ y) ⊔ z`
//!
//! Bottom (⊥) means "not reached yet" and is the identity of join. Top (⊤), where a
//! domain has one, means "any value" and absorbs.
//!
//! All built-in analyses share one element shape, [`MapElement`]: an ordered map
//! from each tracked local to a per-variable [`LatticeValue`].

use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
};

use crate::{ir::Local, Result};

/// An abstract state with a stable, human-readable rendering.
///
/// Deep copy is [`Clone`]; equality is structural.
pub trait LatticeElement: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Renders the element for presentation.
    fn render(&self) -> String;
}

/// A per-variable abstract value.
///
/// # Examples
///
/// ```rust,ignore
/// impl LatticeValue for Sign {
///     fn join(&self, other: &Self) -> Result<Self> {
///         Ok(match (self, other) {
///             (Self::Bottom, x) | (x, Self::Bottom) => *x,
///             (a, b) if a == b => *a,
///             _ => Self::Top,
///         })
///     }
///
///     fn render(&self) -> String {
///         format!("{self:?}")
///     }
/// }
/// ```
pub trait LatticeValue: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Computes the least upper bound of two values.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MismatchedDomain`] if the two values cannot belong
    /// to the same variable (e.g. bit vectors of different width).
    fn join(&self, other: &Self) -> Result<Self>;

    /// Renders the value for presentation.
    fn render(&self) -> String;
}

/// An ordered mapping from variable to abstract value.
///
/// The key set (the variable universe) is fixed at construction; [`set`](Self::set)
/// only replaces values of known variables. Iteration and rendering follow the
/// variable order, which is by name.
///
/// # Examples
///
/// ```rust
/// use dfa_replay::analysis::MapElement;
/// use dfa_replay::analysis::dataflow::ConstValue;
/// use dfa_replay::ir::{Local, LocalType};
///
/// let x = Local::new("x", LocalType::Int);
/// let y = Local::new("y", LocalType::Int);
/// let mut element = MapElement::new([y.clone(), x.clone()], |_| ConstValue::Bottom);
/// element.set(&x, ConstValue::Int(4))?;
///
/// assert_eq!(element.get(&x)?, &ConstValue::Int(4));
/// assert_eq!(element.to_string(), "{x: 4, y: ⊥}");
/// # Ok::<(), dfa_replay::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapElement<V> {
    values: BTreeMap<Local, V>,
}

impl<V> MapElement<V> {
    /// Creates an element over `universe`, mapping each variable through `init`.
    pub fn new<I, F>(universe: I, mut init: F) -> Self
    where
        I: IntoIterator<Item = Local>,
        F: FnMut(&Local) -> V,
    {
        let values = universe
            .into_iter()
            .map(|local| {
                let value = init(&local);
                (local, value)
            })
            .collect();
        Self { values }
    }

    /// Returns the value of `var`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `var` is not in the universe.
    pub fn get(&self, var: &Local) -> Result<&V> {
        self.values
            .get(var)
            .ok_or_else(|| invalid_argument!("variable `{}` is not tracked by this element", var))
    }

    /// Replaces the value of `var`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `var` is not in the universe.
    pub fn set(&mut self, var: &Local, value: V) -> Result<()> {
        match self.values.get_mut(var) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(invalid_argument!(
                "cannot set untracked variable `{}`",
                var
            )),
        }
    }

    /// Returns `true` if `var` is part of the universe.
    #[must_use]
    pub fn contains(&self, var: &Local) -> bool {
        self.values.contains_key(var)
    }

    /// Returns the variable universe in order.
    pub fn variables(&self) -> impl Iterator<Item = &Local> + '_ {
        self.values.keys()
    }

    /// Returns the `(variable, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Local, &V)> + '_ {
        self.values.iter()
    }

    /// Returns the `(variable, value)` pairs in order, with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Local, &mut V)> + '_ {
        self.values.iter_mut()
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for an element over the empty universe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if both elements have exactly the same variable universe.
    #[must_use]
    pub fn same_domain<W>(&self, other: &MapElement<W>) -> bool {
        self.values.len() == other.values.len() && self.values.keys().eq(other.values.keys())
    }
}

impl<V: LatticeValue> LatticeElement for MapElement<V> {
    fn render(&self) -> String {
        let entries: Vec<String> = self
            .values
            .iter()
            .map(|(var, value)| format!("{var}: {}", value.render()))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

impl<V: LatticeValue> fmt::Display for MapElement<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ir::LocalType, Error};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Flag {
        Bottom,
        Set,
    }

    impl LatticeValue for Flag {
        fn join(&self, other: &Self) -> Result<Self> {
            Ok(if *self == Flag::Set || *other == Flag::Set {
                Flag::Set
            } else {
                Flag::Bottom
            })
        }

        fn render(&self) -> String {
            match self {
                Flag::Bottom => "⊥".into(),
                Flag::Set => "set".into(),
            }
        }
    }

    fn locals() -> (Local, Local) {
        (
            Local::new("a", LocalType::Int),
            Local::new("b", LocalType::Long),
        )
    }

    #[test]
    fn test_set_and_get() {
        let (a, b) = locals();
        let mut element = MapElement::new([b.clone(), a.clone()], |_| Flag::Bottom);
        element.set(&b, Flag::Set).unwrap();

        assert_eq!(element.get(&a).unwrap(), &Flag::Bottom);
        assert_eq!(element.get(&b).unwrap(), &Flag::Set);
        assert_eq!(element.variables().collect::<Vec<_>>(), vec![&a, &b]);
        assert_eq!(element.render(), "{a: ⊥, b: set}");
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let (a, b) = locals();
        let mut element = MapElement::new([a], |_| Flag::Bottom);

        assert!(matches!(element.get(&b), Err(Error::InvalidArgument { .. })));
        assert!(matches!(
            element.set(&b, Flag::Set),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(!element.contains(&b));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let (a, _) = locals();
        let original = MapElement::new([a.clone()], |_| Flag::Bottom);
        let mut copy = original.clone();
        copy.set(&a, Flag::Set).unwrap();

        assert_ne!(original, copy);
        assert_eq!(original.get(&a).unwrap(), &Flag::Bottom);
    }

    #[test]
    fn test_same_domain() {
        let (a, b) = locals();
        let left = MapElement::new([a.clone(), b.clone()], |_| Flag::Bottom);
        let right = MapElement::new([b.clone(), a.clone()], |_| 0u32);
        let smaller = MapElement::new([a], |_| Flag::Bottom);

        assert!(left.same_domain(&right));
        assert!(!left.same_domain(&smaller));
    }
}
