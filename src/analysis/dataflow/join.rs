//! The join contract and its generic map implementation.

use std::marker::PhantomData;

use crate::{
    analysis::dataflow::{LatticeValue, MapElement},
    Error, Result,
};

/// Computes least upper bounds of lattice elements at merge points.
pub trait Join<E>: Send + Sync {
    /// Joins a non-empty set of elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for an empty slice, and
    /// [`Error::MismatchedDomain`] if the elements do not share a universe.
    fn join(&self, elements: &[&E]) -> Result<E>;
}

/// Joins [`MapElement`]s key by key through [`LatticeValue::join`].
///
/// # Examples
///
/// ```rust
/// use dfa_replay::analysis::{Join, MapElement, MapJoin};
/// use dfa_replay::analysis::dataflow::ConstValue;
/// use dfa_replay::ir::{Local, LocalType};
///
/// let x = Local::new("x", LocalType::Int);
/// let one = MapElement::new([x.clone()], |_| ConstValue::Int(1));
/// let zero = MapElement::new([x.clone()], |_| ConstValue::Int(0));
///
/// let joined = MapJoin::new().join(&[&one, &zero])?;
/// assert_eq!(joined.get(&x)?, &ConstValue::Top);
/// # Ok::<(), dfa_replay::Error>(())
/// ```
#[derive(Debug)]
pub struct MapJoin<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> MapJoin<V> {
    /// Creates the map join.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for MapJoin<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: LatticeValue> Join<MapElement<V>> for MapJoin<V> {
    fn join(&self, elements: &[&MapElement<V>]) -> Result<MapElement<V>> {
        let (first, rest) = elements.split_first().ok_or(Error::EmptyInput)?;

        if let Some(other) = rest.iter().find(|other| !first.same_domain(**other)) {
            return Err(Error::MismatchedDomain(format!(
                "cannot join {} variables with {} variables",
                describe(first),
                describe(other)
            )));
        }

        let mut result = (*first).clone();
        for other in rest {
            for ((_, acc), (_, value)) in result.iter_mut().zip(other.iter()) {
                *acc = acc.join(value)?;
            }
        }
        Ok(result)
    }
}

fn describe<V>(element: &MapElement<V>) -> String {
    let names: Vec<&str> = element.variables().map(|var| var.name()).collect();
    format!("[{}]", names.join(", "))
}
