/// A set of `usize` values in the range `0..capacity`, with O(1) insertion,
/// membership test and clearing.
///
/// Values are kept in insertion order, and they can be consumed in that
/// order with [`SparseSet::next`] while new values keep being inserted,
/// which makes the set usable as a work queue where each value is queued at
/// most once between calls to [`SparseSet::clear`].
///
/// This is the classic sparse/dense pair described by Briggs and Torczon:
/// `dense` holds the values, and `sparse[v]` holds the index of `v` in
/// `dense`. `sparse` is never reset, stale entries are detected by checking
/// that `dense[sparse[v]] == v`.
#[derive(Clone, Debug, Default)]
pub(crate) struct SparseSet {
    sparse: Vec<usize>,
    dense: Vec<usize>,
    next_index: usize,
}

impl SparseSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            sparse: vec![0; capacity],
            dense: Vec::with_capacity(capacity),
            next_index: 0,
        }
    }

    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        match self.sparse.get(value) {
            Some(&i) => i < self.dense.len() && self.dense[i] == value,
            None => false,
        }
    }

    /// Adds `value` to the set. Values out of range and values already in
    /// the set are ignored.
    #[inline]
    pub fn insert(&mut self, value: usize) {
        if value < self.sparse.len() && !self.contains(value) {
            self.sparse[value] = self.dense.len();
            self.dense.push(value);
        }
    }

    /// Returns the oldest value not returned yet since the last call to
    /// [`SparseSet::clear`].
    #[inline]
    pub fn next(&mut self) -> Option<usize> {
        let value = self.dense.get(self.next_index).copied();
        if value.is_some() {
            self.next_index += 1;
        }
        value
    }

    /// Removes all values in the set.
    #[inline]
    pub fn clear(&mut self) {
        self.dense.clear();
        self.next_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::SparseSet;

    #[test]
    fn sparse_set() {
        let mut s = SparseSet::new(10);

        assert_eq!(s.next(), None);

        s.insert(4);
        s.insert(2);
        s.insert(9);
        s.insert(4);
        s.insert(10);

        assert!(s.contains(4));
        assert!(s.contains(2));
        assert!(s.contains(9));
        assert!(!s.contains(0));
        assert!(!s.contains(10));

        assert_eq!(s.next(), Some(4));
        s.insert(0);
        assert_eq!(s.next(), Some(2));
        assert_eq!(s.next(), Some(9));
        assert_eq!(s.next(), Some(0));
        assert_eq!(s.next(), None);

        s.clear();

        assert!(!s.contains(4));
        assert_eq!(s.next(), None);

        s.insert(2);
        assert!(s.contains(2));
        assert!(!s.contains(4));
    }
}
