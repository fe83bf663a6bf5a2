//! Dense sets of small integers.
//!
//! Definition sites of the reaching-definitions domain are instruction ids, which
//! are dense and bounded by the instruction count of the graph. A [`BitSet`] sized
//! to that count stores any set of sites in `count / 64` words.
//!
//! ```rust
//! use dfa_replay::utils::BitSet;
//!
//! let mut sites = BitSet::singleton(130, 129);
//! sites.insert(3);
//!
//! assert_eq!(sites.iter().collect::<Vec<_>>(), [3, 129]);
//! assert_eq!(sites.to_string(), "{3, 129}");
//! ```

use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-capacity set of integers in `0..capacity`.
///
/// Sets are only combined with sets of the same capacity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    blocks: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    /// An empty set over `0..capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: vec![0; capacity.div_ceil(WORD_BITS)],
            capacity,
        }
    }

    /// The set `{index}` over `0..capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[must_use]
    pub fn singleton(capacity: usize, index: usize) -> Self {
        let mut set = Self::new(capacity);
        set.insert(index);
        set
    }

    /// Size of the index range `0..capacity`. See [`BitSet::count`] for the
    /// number of members.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no member is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&block| block == 0)
    }

    /// Adds `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity.
    pub fn insert(&mut self, index: usize) {
        assert!(
            index < self.capacity,
            "{index} is outside a set of capacity {}",
            self.capacity
        );
        self.blocks[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Returns `true` if `index` is a member. Out-of-range indices never are.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.blocks
            .get(index / WORD_BITS)
            .is_some_and(|block| block >> (index % WORD_BITS) & 1 == 1)
            && index < self.capacity
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    /// Adds every member of `other`. Returns `true` if a member was added.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    pub fn union_with(&mut self, other: &Self) -> bool {
        assert_eq!(
            self.capacity, other.capacity,
            "cannot unite sets of different capacity"
        );
        self.blocks
            .iter_mut()
            .zip(&other.blocks)
            .fold(false, |grew, (mine, theirs)| {
                let before = *mine;
                *mine |= theirs;
                grew | (*mine != before)
            })
    }

    /// Returns `true` if both sets share a capacity and every member of `self`
    /// is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(mine, theirs)| mine & !theirs == 0)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            blocks: &self.blocks,
            base: 0,
            pending: self.blocks.first().copied().unwrap_or(0),
        }
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut members = self.iter();
        if let Some(first) = members.next() {
            write!(f, "{first}")?;
            for member in members {
                write!(f, ", {member}")?;
            }
        }
        f.write_str("}")
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet{self}")
    }
}

/// Ascending iterator over the members of a [`BitSet`].
pub struct BitSetIter<'a> {
    blocks: &'a [u64],
    base: usize,
    pending: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pending == 0 {
            self.base += WORD_BITS;
            self.pending = *self.blocks.get(self.base / WORD_BITS)?;
        }
        let offset = self.pending.trailing_zeros() as usize;
        // Clear the lowest member
        self.pending &= self.pending - 1;
        Some(self.base + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_across_words() {
        let mut sites = BitSet::new(200);
        assert!(sites.is_empty());
        for site in [199, 0, 64, 63] {
            sites.insert(site);
        }

        assert_eq!(sites.count(), 4);
        assert_eq!(sites.iter().collect::<Vec<_>>(), [0, 63, 64, 199]);
        assert!(sites.contains(64));
        assert!(!sites.contains(65));
        assert!(!sites.contains(1000));
    }

    #[test]
    fn test_capacity_is_not_membership() {
        let mut sites = BitSet::new(130);
        assert_eq!((sites.capacity(), sites.count()), (130, 0));
        assert!(sites.is_empty());

        sites.insert(129);
        assert_eq!((sites.capacity(), sites.count()), (130, 1));
        assert!(!sites.is_empty());
    }

    #[test]
    fn test_union_reports_growth() {
        let mut reaching = BitSet::singleton(70, 2);
        let incoming = BitSet::singleton(70, 66);

        assert!(reaching.union_with(&incoming));
        assert!(!reaching.union_with(&incoming));
        assert!(incoming.is_subset(&reaching));
        assert!(!reaching.is_subset(&incoming));
        assert!(!BitSet::new(71).is_subset(&reaching));
    }

    #[test]
    #[should_panic(expected = "outside a set of capacity")]
    fn test_insert_out_of_range() {
        BitSet::new(4).insert(4);
    }

    #[test]
    fn test_rendering() {
        let empty = BitSet::new(0);
        assert_eq!(empty.iter().next(), None);
        assert_eq!(empty.to_string(), "{}");
        assert_eq!(format!("{:?}", BitSet::singleton(9, 8)), "BitSet{8}");
    }
}
