//! Ordered, path-keyed resource storage.
//!
//! Resources are identified by normalized path and kept in first-insertion
//! order. Re-adding a path replaces the resource in place, keeping its
//! position; removal closes the gap and shifts later entries down.
//!
//! Callers normalize paths before touching the collection.

use rustc_hash::FxHashMap;

use crate::resource::Resource;

#[derive(Debug, Clone, Default)]
pub struct Collection {
    order: Vec<Resource>,
    index: FxHashMap<String, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing any existing resource at the same path.
    /// Returns the index it now occupies.
    pub fn upsert(&mut self, resource: Resource) -> usize {
        let path = resource.path().to_string();
        match self.index.get(&path) {
            Some(&i) => {
                self.order[i] = resource;
                i
            }
            None => {
                let i = self.order.len();
                self.order.push(resource);
                self.index.insert(path, i);
                i
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&Resource> {
        self.index.get(path).map(|&i| &self.order[i])
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Resource> {
        let i = *self.index.get(path)?;
        self.order.get_mut(i)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Remove the resource at `path`, shifting later entries down one slot.
    pub fn remove(&mut self, path: &str) -> Option<Resource> {
        let i = self.index.remove(path)?;
        let removed = self.order.remove(i);
        for entry in self.index.values_mut() {
            if *entry > i {
                *entry -= 1;
            }
        }
        Some(removed)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.order.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.order.iter_mut()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(Resource::path)
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

    fn paths_of(collection: &Collection) -> Vec<&str> {
        collection.paths().collect()
    }

    #[test]
    fn test_upsert_appends_new_paths() {
        let mut c = Collection::new();
        assert_eq!(c.upsert(Resource::inline("/a.js", "a")), 0);
        assert_eq!(c.upsert(Resource::inline("/b.js", "b")), 1);
        assert_eq!(paths_of(&c), vec!["/a.js", "/b.js"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut c = Collection::new();
        c.upsert(Resource::inline("/a.js", "a"));
        c.upsert(Resource::inline("/b.js", "b"));
        let i = c.upsert(Resource::inline("/a.js", "a2"));
        assert_eq!(i, 0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("/a.js").map(|r| r.content()), Some("a2"));
        assert_eq!(paths_of(&c), vec!["/a.js", "/b.js"]);
    }

    #[test]
    fn test_remove_closes_gap_and_reindexes() {
        let mut c = Collection::new();
        c.upsert(Resource::inline("/a.js", "a"));
        c.upsert(Resource::inline("/b.js", "b"));
        c.upsert(Resource::inline("/c.js", "c"));
        let removed = c.remove("/b.js");
        assert_eq!(removed.map(|r| r.content().to_string()), Some("b".into()));
        assert_eq!(c.len(), 2);
        assert_eq!(paths_of(&c), vec!["/a.js", "/c.js"]);
        // later entries stay addressable after the shift
        assert_eq!(c.get("/c.js").map(|r| r.content()), Some("c"));
    }

    #[test]
    fn test_remove_missing_is_a_noop() {
        let mut c = Collection::new();
        c.upsert(Resource::inline("/a.js", "a"));
        assert!(c.remove("/nope.js").is_none());
        assert_eq!(c.len(), 1);
    }
}
