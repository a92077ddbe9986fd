//! Wire format: serializing a settled set and rebuilding one from the wire.
//!
//! The envelope is `{ "resources": [...], "loadPath": [...] }`. Each entry
//! carries whatever the receiving side needs and nothing else: content is
//! omitted for resources the consumer's cache manifest already covers, and
//! always omitted for combined resources, which ship their member list and
//! are re-assembled on arrival.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SetError;
use crate::manifest::CacheManifest;
use crate::resource::{Alternative, DEFAULT_ENCODING, Resource, ResourceSpec};
use crate::set::{ResourceSet, join_failure};

/// Resources are serialized in sequential groups of this size; entries
/// within a group serialize concurrently.
pub const SERIALIZE_GROUP_SIZE: usize = 100;

/// One resource on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireResource {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combine: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
}

impl WireResource {
    fn into_spec(self) -> ResourceSpec {
        ResourceSpec {
            path: (!self.path.is_empty()).then_some(self.path),
            content: self.content,
            file: None,
            backend: self.backend,
            combine: self.combine,
            etag: self.etag,
            encoding: self.encoding,
            headers: self.headers,
            alternatives: self.alternatives,
        }
    }
}

/// A fully resolved set, ready for transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerializedSet {
    pub resources: Vec<WireResource>,
    pub load_path: Vec<String>,
}

fn wire_resource(mut resource: Resource, include_content: bool) -> Result<WireResource, SetError> {
    let combined = resource.is_combined();
    let ship_content = include_content && !combined && resource.has_content();
    if ship_content {
        resource.apply_processors()?;
    }
    Ok(WireResource {
        path: resource.path().to_string(),
        etag: resource.etag().map(String::from),
        encoding: (resource.encoding() != DEFAULT_ENCODING)
            .then(|| resource.encoding().to_string()),
        headers: resource.headers().clone(),
        content: ship_content.then(|| resource.content().to_string()),
        backend: resource.backend().map(String::from),
        combine: resource.combine().map(<[String]>::to_vec),
        alternatives: resource.alternatives().to_vec(),
    })
}

impl ResourceSet {
    /// Serialize the set for the wire.
    ///
    /// Waits for every outstanding addition to settle first, so the result
    /// reflects everything scheduled up to this point; a failed addition
    /// fails the serialization. Entries keep collection order. Content is
    /// omitted for entries whose etag appears in `cache`; shipped content
    /// has been run through the resource's processors.
    pub async fn serialize(&self, cache: &CacheManifest) -> Result<SerializedSet, SetError> {
        self.when_all_added().await?;
        let resources = self.resources();
        debug!(resources = resources.len(), "serializing resource set");

        let mut wire = Vec::with_capacity(resources.len());
        for group in resources.chunks(SERIALIZE_GROUP_SIZE) {
            let handles: Vec<_> = group
                .iter()
                .cloned()
                .map(|resource| {
                    let cached = resource
                        .etag()
                        .is_some_and(|etag| cache.contains(resource.path(), etag));
                    tokio::spawn(async move { wire_resource(resource, !cached) })
                })
                .collect();
            for handle in handles {
                wire.push(handle.await.map_err(join_failure)??);
            }
        }

        Ok(SerializedSet {
            resources: wire,
            load_path: self.load_path(),
        })
    }

    /// Rebuild a set from serialized data.
    ///
    /// Combined entries are inserted as placeholders at their original
    /// position and re-assembled from the deserialized members, so entry
    /// order survives the round trip; their wire etags are kept. The load
    /// path is replayed last and every entry must name a member of the set.
    pub async fn deserialize(data: SerializedSet) -> Result<ResourceSet, SetError> {
        let set = ResourceSet::new();
        let mut combines = Vec::new();
        for entry in data.resources {
            let spec = entry.into_spec();
            if let Some(sources) = spec.combine.clone() {
                let placeholder = Resource::from_spec(spec.clone())?;
                set.insert_resolved(placeholder);
                combines.push((
                    sources,
                    ResourceSpec {
                        combine: None,
                        ..spec
                    },
                ));
            } else {
                set.add(spec)?;
            }
        }
        // combines run only now, with every entry in place, so a combined
        // entry may precede its members in wire order
        let tasks: Vec<_> = combines
            .into_iter()
            .map(|(sources, spec)| set.spawn_combine(sources, spec))
            .collect();
        for task in tasks {
            task.join().await?;
        }
        set.append_load_validated(&data.load_path)?;
        Ok(set)
    }
}
