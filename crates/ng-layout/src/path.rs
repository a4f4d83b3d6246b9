//! Index paths into the layout tree.

use std::fmt;

/// Child indices walked from the root. Never mutated by a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the parent path and the final index.
    pub fn split_last(&self) -> Option<(IndexPath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((IndexPath(parent.to_vec()), last))
    }

    pub fn cursor(&self) -> PathCursor<'_> {
        PathCursor {
            indices: &self.0,
            depth: 0,
        }
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl FromIterator<usize> for IndexPath {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Position within an [`IndexPath`] during a walk.
#[derive(Debug, Clone)]
pub struct PathCursor<'p> {
    indices: &'p [usize],
    depth: usize,
}

impl PathCursor<'_> {
    /// Number of steps taken so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn remaining(&self) -> usize {
        self.indices.len() - self.depth
    }
}

impl Iterator for PathCursor<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = *self.indices.get(self.depth)?;
        self.depth += 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_leaves_path_untouched() {
        let path = IndexPath::new(vec![2, 0, 1]);
        let mut cursor = path.cursor();
        assert_eq!(cursor.next(), Some(2));
        assert_eq!(cursor.depth(), 1);
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.collect::<Vec<_>>(), vec![0, 1]);

        // a second walk sees the same indices
        assert_eq!(path.cursor().collect::<Vec<_>>(), vec![2, 0, 1]);
    }

    #[test]
    fn split_last_gives_parent_and_position() {
        let path = IndexPath::new(vec![1, 3]);
        assert_eq!(path.split_last(), Some((IndexPath::new(vec![1]), 3)));
        assert_eq!(IndexPath::root().split_last(), None);
        assert_eq!(path.to_string(), "[1, 3]");
    }
}
