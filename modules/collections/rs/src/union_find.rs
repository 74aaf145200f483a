use eyre::{ensure, Result};

/// Marker for elements that are not part of any set yet.
const NOSET: usize = usize::MAX;

/// Disjoint sets over a fixed universe of indices 0..N.
///
/// Elements are addressed by their index and are unset until they are explicitly added with
/// [`UnionFind::make_set`] or [`UnionFind::extend_set_by_id`]. The representative of a set is
/// never chosen implicitly: `union` always keeps the root requested by the caller.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct UnionFind {
    parents: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parents: vec![NOSET; size],
        }
    }

    /// Size of the universe.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_set(&self, element: usize) -> bool {
        self.parents.get(element).is_some_and(|x| *x != NOSET)
    }

    /// Create a new singleton set.
    pub fn make_set(&mut self, element: usize) -> Result<()> {
        self.ensure_unset(element)?;
        self.parents[element] = element;
        Ok(())
    }

    /// Representative of the set containing the element or None if the element is unset.
    pub fn find(&mut self, element: usize) -> Option<usize> {
        if !self.is_set(element) {
            return None;
        }

        // Path halving
        let mut current = element;
        while self.parents[current] != current {
            let grandparent = self.parents[self.parents[current]];
            self.parents[current] = grandparent;
            current = grandparent;
        }
        Some(current)
    }

    /// Add an unset element to the set represented by `root`.
    pub fn extend_set_by_id(&mut self, root: usize, element: usize) -> Result<()> {
        self.ensure_root(root)?;
        self.ensure_unset(element)?;
        self.parents[element] = root;
        Ok(())
    }

    /// Merge the set rooted at `merged` into the set rooted at `survivor`.
    /// `survivor` stays the representative of the joined set.
    pub fn union(&mut self, merged: usize, survivor: usize) -> Result<()> {
        self.ensure_root(merged)?;
        self.ensure_root(survivor)?;
        self.parents[merged] = survivor;
        Ok(())
    }

    fn ensure_unset(&self, element: usize) -> Result<()> {
        ensure!(
            element < self.len(),
            "Element {element} is outside of the universe [0, {})",
            self.len()
        );
        ensure!(
            self.parents[element] == NOSET,
            "Element {element} already belongs to a set"
        );
        Ok(())
    }

    fn ensure_root(&self, root: usize) -> Result<()> {
        ensure!(
            self.is_set(root) && self.parents[root] == root,
            "Element {root} is not a root of any set"
        );
        Ok(())
    }
}
