//! Cache manifests: which etags a consumer already holds.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Etags known to a consumer, keyed by resource path.
///
/// A manifest is handed to [`process`](crate::ResourceSet::process) to skip
/// re-processing of content the consumer has cached, and produced by
/// [`cache_manifest`](crate::ResourceSet::cache_manifest) to describe what the
/// set currently serves. Each path maps to a list because a consumer may hold
/// several historical versions of the same resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheManifest {
    entries: FxHashMap<String, Vec<String>>,
}

impl CacheManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an etag for a path. Duplicates are ignored.
    pub fn insert(&mut self, path: impl Into<String>, etag: impl Into<String>) {
        let etag = etag.into();
        let etags = self.entries.entry(path.into()).or_default();
        if !etags.contains(&etag) {
            etags.push(etag);
        }
    }

    /// True when the consumer already holds this exact version.
    pub fn contains(&self, path: &str, etag: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|etags| etags.iter().any(|e| e == etag))
    }

    pub fn etags(&self, path: &str) -> &[String] {
        self.entries.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, etags)| (path.as_str(), etags.as_slice()))
    }
}

impl<P, E, I> FromIterator<(P, I)> for CacheManifest
where
    P: Into<String>,
    E: Into<String>,
    I: IntoIterator<Item = E>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut manifest = Self::new();
        for (path, etags) in iter {
            let path = path.into();
            for etag in etags {
                manifest.insert(path.clone(), etag);
            }
        }
        manifest
    }
}
