use std::{
    collections::BTreeMap,
    ops::{
        Bound::{Excluded, Included},
        Range,
    },
};

/// A set of u64 values optimized for long runs
#[derive(Debug, Default, Clone)]
pub(crate) struct RangeSet(BTreeMap<u64, u64>);

impl RangeSet {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn contains(&self, x: u64) -> bool {
        self.pred(x).is_some_and(|(_, end)| end > x)
    }

    pub(crate) fn insert_one(&mut self, x: u64) -> bool {
        self.insert(x..x.saturating_add(1))
    }

    pub(crate) fn insert(&mut self, mut x: Range<u64>) -> bool {
        if x.is_empty() {
            return false;
        }
        if let Some((start, end)) = self.pred(x.start) {
            if end >= x.end {
                // Wholly contained
                return false;
            } else if end >= x.start {
                // Extend overlapping predecessor
                self.0.remove(&start);
                x.start = start;
            }
        }
        while let Some((next_start, next_end)) = self.succ(x.start) {
            if next_start > x.end {
                break;
            }
            // Overlaps with successor
            self.0.remove(&next_start);
            x.end = x.end.max(next_end);
        }
        self.0.insert(x.start, x.end);
        true
    }

    /// Find closest range to `x` that begins at or before it
    fn pred(&self, x: u64) -> Option<(u64, u64)> {
        self.0
            .range((Included(0), Included(x)))
            .next_back()
            .map(|(&x, &y)| (x, y))
    }

    /// Find the closest range to `x` that begins after it
    fn succ(&self, x: u64) -> Option<(u64, u64)> {
        self.0
            .range((Excluded(x), Included(u64::MAX)))
            .next()
            .map(|(&x, &y)| (x, y))
    }

    /// Fill the gap between the two lowest ranges
    ///
    /// Returns `false` if there were fewer than two ranges.
    pub(crate) fn merge_lowest(&mut self) -> bool {
        let mut ranges = self.0.iter();
        let (Some((&start, _)), Some((&next_start, _))) = (ranges.next(), ranges.next()) else {
            return false;
        };
        self.insert(start..next_start)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elts(set: &RangeSet) -> Vec<u64> {
        set.0.iter().flat_map(|(&start, &end)| start..end).collect()
    }

    #[test]
    fn merge_adjacent() {
        let mut set = RangeSet::new();
        assert!(set.insert_one(2));
        assert!(set.insert_one(4));
        assert_eq!(set.len(), 2);
        assert!(set.insert_one(3));
        assert_eq!(set.len(), 1);
        assert!(!set.insert_one(3));
        assert_eq!(elts(&set), [2, 3, 4]);
        assert!(!set.contains(1));
        assert!(!set.contains(5));
    }

    #[test]
    fn overlapping_insert() {
        let mut set = RangeSet::new();
        assert!(set.insert(0..2));
        assert!(set.insert(4..6));
        assert!(set.insert(1..5));
        assert_eq!(set.len(), 1);
        assert_eq!(elts(&set), [0, 1, 2, 3, 4, 5]);
        assert!(!set.insert(2..4));
    }

    #[test]
    fn merge_lowest() {
        let mut set = RangeSet::new();
        assert!(!set.merge_lowest());
        set.insert_one(1);
        set.insert_one(5);
        set.insert_one(9);
        assert!(set.merge_lowest());
        assert_eq!(set.len(), 2);
        assert_eq!(elts(&set), [1, 2, 3, 4, 5, 9]);
        assert!(!set.contains(8));
    }

    #[test]
    fn near_largest_value() {
        let mut set = RangeSet::new();
        set.insert_one(u64::MAX - 1);
        set.insert_one(u64::MAX - 2);
        assert!(set.contains(u64::MAX - 1));
        assert!(set.contains(u64::MAX - 2));
        assert_eq!(set.len(), 1);
    }
}
