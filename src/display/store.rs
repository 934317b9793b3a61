use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Capacity-bounded FIFO buffer. Appends go to the tail and the oldest items
/// are dropped from the front once the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct RowStore<T> {
    rows: VecDeque<T>,
    capacity: NonZeroUsize,
}

impl<T> RowStore<T> {
    /// Creates an empty store holding at most `capacity` rows.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            rows: VecDeque::with_capacity(capacity.get().min(1024)),
            capacity,
        }
    }

    /// Appends a row and trims the front. Returns how many rows were evicted.
    pub fn push(&mut self, row: T) -> usize {
        self.rows.push_back(row);
        self.trim()
    }

    /// Appends every row in order, then trims once.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = T>) -> usize {
        self.rows.extend(rows);
        self.trim()
    }

    fn trim(&mut self) -> usize {
        let excess = self.rows.len().saturating_sub(self.capacity.get());
        self.rows.drain(..excess);
        excess
    }

    /// Maximum number of rows kept.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of rows currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.rows.iter()
    }

    /// Most recently appended row.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.rows.back()
    }

    /// Drops every row.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(capacity: usize) -> RowStore<&'static str> {
        RowStore::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn evicts_oldest_first() {
        let mut rows = store(3);
        for row in ["A", "B", "C", "D"] {
            rows.push(row);
        }
        assert_eq!(rows.iter().copied().collect::<Vec<_>>(), vec!["B", "C", "D"]);
    }

    #[test]
    fn count_tracks_min_of_appended_and_capacity() {
        for capacity in 1..=5 {
            let mut rows = RowStore::new(NonZeroUsize::new(capacity).unwrap());
            for appended in 1..=12_usize {
                rows.push(appended);
                assert_eq!(rows.len(), appended.min(capacity));

                let expected: Vec<usize> =
                    (appended.saturating_sub(capacity) + 1..=appended).collect();
                assert_eq!(rows.iter().copied().collect::<Vec<_>>(), expected);
            }
        }
    }

    #[test]
    fn push_reports_eviction_count() {
        let mut rows = store(2);
        assert_eq!(rows.push("A"), 0);
        assert_eq!(rows.push("B"), 0);
        assert_eq!(rows.push("C"), 1);
        assert_eq!(rows.latest(), Some(&"C"));
    }

    #[test]
    fn extend_trims_only_the_excess() {
        let mut rows = store(4);
        rows.push("A");
        assert_eq!(rows.extend(["B", "C", "D", "E", "F"]), 2);
        assert_eq!(rows.iter().copied().collect::<Vec<_>>(), vec!["C", "D", "E", "F"]);
    }
}
