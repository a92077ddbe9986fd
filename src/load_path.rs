//! Ordered load path over a resource set.
//!
//! The load path is the subset of resources a client should load, in load
//! order. It is an insertion-ordered list with set semantics: a path appears
//! at most once, and re-adding an existing path keeps its original position.

use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct LoadPath {
    order: Vec<String>,
    members: FxHashSet<String>,
}

impl LoadPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path. Returns `false` when it was already present, in which
    /// case its position is unchanged.
    pub fn append(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if !self.members.insert(path.clone()) {
            return false;
        }
        self.order.push(path);
        true
    }

    pub fn append_all<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.append(path);
        }
    }

    /// Insert paths at the front, preserving their relative order. Paths
    /// already present keep their existing position.
    pub fn prepend_all<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let novel: Vec<String> = paths
            .into_iter()
            .map(Into::into)
            .filter(|path| self.members.insert(path.clone()))
            .collect();
        self.order.splice(0..0, novel);
    }

    /// Remove a path, closing the gap. Returns `false` when absent.
    pub fn remove(&mut self, path: &str) -> bool {
        if !self.members.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    pub fn paths(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut lp = LoadPath::new();
        lp.append("/a.js");
        lp.append("/b.js");
        lp.append("/c.js");
        assert_eq!(lp.paths(), &["/a.js", "/b.js", "/c.js"]);
    }

    #[test]
    fn test_append_ignores_duplicates() {
        let mut lp = LoadPath::new();
        assert!(lp.append("/a.js"));
        assert!(lp.append("/b.js"));
        assert!(!lp.append("/a.js"));
        assert_eq!(lp.paths(), &["/a.js", "/b.js"]);
    }

    #[test]
    fn test_prepend_inserts_at_front_in_order() {
        let mut lp = LoadPath::new();
        lp.append("/c.js");
        lp.prepend_all(["/a.js", "/b.js"]);
        assert_eq!(lp.paths(), &["/a.js", "/b.js", "/c.js"]);
    }

    #[test]
    fn test_prepend_keeps_existing_positions() {
        let mut lp = LoadPath::new();
        lp.append("/a.js");
        lp.append("/b.js");
        lp.prepend_all(["/b.js", "/z.js"]);
        assert_eq!(lp.paths(), &["/z.js", "/a.js", "/b.js"]);
    }

    #[test]
    fn test_remove_closes_the_gap() {
        let mut lp = LoadPath::new();
        lp.append_all(["/a.js", "/b.js", "/c.js"]);
        assert!(lp.remove("/b.js"));
        assert_eq!(lp.paths(), &["/a.js", "/c.js"]);
        assert!(!lp.remove("/b.js"));
        assert_eq!(lp.len(), 2);
    }
}
