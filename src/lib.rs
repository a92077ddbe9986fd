//! # loadout
//!
//! Cache-aware resource sets: asynchronous asset collection, ordered load
//! paths, wire-ready manifests.
//!
//! A [`ResourceSet`] names a collection of content resources (inline
//! snippets, files, globs, proxied backends, combinations of other members)
//! assembled over time and delivered in a well-defined order:
//!
//! - **One path, one resource**: paths are normalized and re-adding a path
//!   replaces the resource in place, keeping its position.
//! - **Additions are scheduled, not awaited**: files and globs resolve in
//!   spawned tasks; [`ResourceSet::when_all_added`] waits until everything
//!   scheduled (including work scheduled by that work) has settled.
//! - **Etags make it incremental**: content is fingerprinted, and both
//!   processing and serialization skip what a consumer's
//!   [`CacheManifest`] already covers.
//! - **The wire format is self-contained**: `serialize` produces a
//!   `{ resources, loadPath }` envelope that `deserialize` rebuilds, member
//!   order and all.
//!
//! ## Quick start
//!
//! ```ignore
//! use loadout::{CacheManifest, ResourceSet, ResourceSpec};
//!
//! let set = ResourceSet::with_root("site/assets");
//!
//! // the glob is scheduled, not awaited; the combine waits for it
//! let _ = set.add_glob_resources(["js/**/*.js"]);
//! set.add_combined_resource(
//!     ["/js/app.js", "/js/vendor.js"],
//!     ResourceSpec { path: Some("/bundle.js".into()), ..Default::default() },
//! )
//! .join()
//! .await?;
//! set.append_load(["/bundle.js"]).join().await?;
//!
//! // serialize waits for every outstanding addition first
//! let wire = set.serialize(&CacheManifest::new()).await?;
//! let json = serde_json::to_string(&wire)?;
//! ```
//!
//! ## Modules
//!
//! - [`set`]: the engine (scheduling, convergence, serialization)
//! - [`resource`]: resources, specs, validation, processors
//! - [`manifest`]: cache manifests (path → known etags)
//! - [`load_path`]: the ordered load path
//! - [`error`]: the error type

#![forbid(unsafe_code)]

pub mod error;
pub mod load_path;
pub mod manifest;
pub mod resource;
pub mod set;

mod combine;
mod resolver;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use loadout::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AddTask, Alternative, CacheManifest, LoadPath, Processor, Resource, ResourceInput,
        ResourceSet, ResourceSpec, SerializedSet, SetError, WireResource,
    };
}

// =============================================================================
// The engine
// =============================================================================

pub use set::{AddTask, ResourceSet, SERIALIZE_GROUP_SIZE, SerializedSet, WireResource};

// =============================================================================
// Resources
// =============================================================================

pub use resource::{
    Alternative, DEFAULT_ENCODING, Processor, Resource, ResourceInput, ResourceSpec, fingerprint,
    is_qualified, normalize_path, validate_spec,
};

// =============================================================================
// Caching, ordering, errors
// =============================================================================

pub use error::SetError;
pub use load_path::LoadPath;
pub use manifest::CacheManifest;
