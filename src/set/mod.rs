//! The resource set engine.
//!
//! A [`ResourceSet`] is a named collection of resources assembled over time:
//! inline content added synchronously, files and globs resolved against a
//! root directory in spawned tasks, combined resources assembled once the
//! work they might depend on has settled. The set keeps one path-keyed,
//! insertion-ordered collection, a [load path](crate::LoadPath) of resources
//! clients should load in order, and a ledger of outstanding additions.
//!
//! Additions are scheduled by synchronous methods that register in the
//! ledger before spawning, so [`ResourceSet::when_all_added`] can always see
//! work that has been requested but not yet resolved. Waiting convergence is
//! iterative: settling one addition may schedule more (a glob fans out into
//! file additions, a combine waits for the wave before it), and the wait
//! only returns once a full pass over the ledger finds it empty, or as soon
//! as any addition has failed.
//!
//! Handles are cheap clones sharing one underlying set, in the same way
//! tokio's own primitives hand out cloneable handles.

pub(crate) mod collection;
mod pending;
mod serialize;


use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::combine;
use crate::error::SetError;
use crate::load_path::LoadPath;
use crate::manifest::CacheManifest;
use crate::resolver::{self, SetPattern};
use crate::resource::{
    Processor, Resource, ResourceInput, ResourceSpec, is_qualified, normalize_path, validate_spec,
};

use collection::Collection;
use pending::PendingOps;

pub use serialize::{SERIALIZE_GROUP_SIZE, SerializedSet, WireResource};

// ============================================================================
// Handles for scheduled additions
// ============================================================================

fn join_failure(err: JoinError) -> SetError {
    SetError::Internal(format!("addition task failed: {err}"))
}

/// Handle to a scheduled addition.
///
/// The work runs whether or not the handle is joined; dropping it only
/// drops the means of observing the outcome directly. Failures still reach
/// [`ResourceSet::when_all_added`].
#[must_use = "additions run in the background; join to observe the outcome"]
pub struct AddTask<T = Resource> {
    inner: TaskInner<T>,
}

enum TaskInner<T> {
    Ready(Result<T, SetError>),
    Spawned(JoinHandle<Result<T, SetError>>),
}

impl<T: Send + 'static> AddTask<T> {
    fn ready(result: Result<T, SetError>) -> Self {
        Self {
            inner: TaskInner::Ready(result),
        }
    }

    fn spawned(handle: JoinHandle<Result<T, SetError>>) -> Self {
        Self {
            inner: TaskInner::Spawned(handle),
        }
    }

    /// Wait for the addition to resolve.
    pub async fn join(self) -> Result<T, SetError> {
        match self.inner {
            TaskInner::Ready(result) => result,
            TaskInner::Spawned(handle) => handle.await.map_err(join_failure)?,
        }
    }
}

impl AddTask<Resource> {
    /// Widen a single-resource addition to the list shape used by the
    /// batched entry points.
    fn into_batch(self) -> AddTask<Vec<Resource>> {
        match self.inner {
            TaskInner::Ready(result) => AddTask::ready(result.map(|r| vec![r])),
            TaskInner::Spawned(handle) => AddTask::spawned(tokio::spawn(async move {
                handle.await.map_err(join_failure)?.map(|r| vec![r])
            })),
        }
    }
}

// ============================================================================
// The set
// ============================================================================

struct SetState {
    collection: Collection,
    load_path: LoadPath,
    processors: Vec<Arc<dyn Processor>>,
}

impl SetState {
    /// Insert a fully resolved resource: attach the set's processors and
    /// upsert, keeping the position of any resource already at that path.
    fn insert(&mut self, mut resource: Resource) -> Resource {
        for processor in &self.processors {
            resource.push_processor(processor.clone());
        }
        let returned = resource.clone();
        self.collection.upsert(resource);
        returned
    }
}

struct SetInner {
    root_path: PathBuf,
    state: Mutex<SetState>,
    pending: PendingOps,
}

/// A dynamic, order-preserving collection of resources with asynchronous
/// assembly. See the [module docs](self) for the overall model.
#[derive(Clone)]
pub struct ResourceSet {
    inner: Arc<SetInner>,
}

impl ResourceSet {
    /// New empty set rooted at the current working directory.
    pub fn new() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_root(root)
    }

    /// New empty set. File and glob additions resolve relative to `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(SetInner {
                root_path: root.into(),
                state: Mutex::new(SetState {
                    collection: Collection::new(),
                    load_path: LoadPath::new(),
                    processors: Vec::new(),
                }),
                pending: PendingOps::default(),
            }),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.inner.root_path
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().collection.is_empty()
    }

    /// Look up a resource; the path is normalized first, so `get("foo.js")`
    /// and `get("/foo.js")` name the same resource.
    pub fn get(&self, path: &str) -> Option<Resource> {
        let normalized = normalize_path(path);
        self.inner.state.lock().collection.get(&normalized).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.inner.state.lock().collection.contains(&normalized)
    }

    /// Snapshot of the resources in insertion order.
    pub fn resources(&self) -> Vec<Resource> {
        self.inner.state.lock().collection.resources().to_vec()
    }

    pub fn paths(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .collection
            .paths()
            .map(String::from)
            .collect()
    }

    /// Snapshot of the load path in load order.
    pub fn load_path(&self) -> Vec<String> {
        self.inner.state.lock().load_path.paths().to_vec()
    }

    // ------------------------------------------------------------------
    // Synchronous additions
    // ------------------------------------------------------------------

    /// Add a resource that needs no resolution: inline content, a backend,
    /// an etag reference or a qualified URL. Files, globs and combines
    /// resolve asynchronously and belong to [`add_resource`](Self::add_resource).
    pub fn add(&self, input: impl Into<ResourceInput>) -> Result<Resource, SetError> {
        let spec = match input.into() {
            ResourceInput::Path(path) if is_qualified(&path) => ResourceSpec {
                path: Some(path),
                ..ResourceSpec::default()
            },
            ResourceInput::Path(path) => {
                return Err(SetError::InvalidResource(format!(
                    "'{path}' requires asynchronous resolution"
                )));
            }
            ResourceInput::Spec(spec) => spec,
        };
        validate_spec(&spec)?;
        if spec.file.is_some() || spec.combine.is_some() {
            return Err(SetError::InvalidResource(
                "file and combined resources resolve asynchronously".into(),
            ));
        }
        let resource = Resource::from_spec(spec)?;
        Ok(self.insert_resolved(resource))
    }

    /// Register a processor on every current and future resource.
    pub fn add_processor(&self, processor: impl Processor + 'static) {
        let processor: Arc<dyn Processor> = Arc::new(processor);
        let mut state = self.inner.state.lock();
        state.processors.push(processor.clone());
        for resource in state.collection.iter_mut() {
            resource.push_processor(processor.clone());
        }
    }

    /// Remove the resource at `path` along with its load path entry,
    /// shifting later resources down. Returns whether anything was removed.
    pub fn remove(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        let mut state = self.inner.state.lock();
        let removed = state.collection.remove(&normalized).is_some();
        if removed {
            state.load_path.remove(&normalized);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Scheduled additions
    // ------------------------------------------------------------------

    /// Add one resource, dispatching on shape:
    ///
    /// - a qualified URL string adds a backend-style entry synchronously;
    /// - any other string is treated as a glob and may add several files;
    /// - a spec with `file` loads that file relative to the root;
    /// - a spec with `combine` assembles from other members once settled;
    /// - any other spec is added synchronously.
    ///
    /// The returned handle resolves to the resources actually added.
    /// Validation failures resolve the handle without registering work.
    pub fn add_resource(&self, input: impl Into<ResourceInput>) -> AddTask<Vec<Resource>> {
        match input.into() {
            ResourceInput::Path(path) if is_qualified(&path) => {
                let spec = ResourceSpec {
                    path: Some(path),
                    ..ResourceSpec::default()
                };
                AddTask::ready(self.add(spec).map(|r| vec![r]))
            }
            ResourceInput::Path(path) => self.add_glob_resources([path]),
            ResourceInput::Spec(spec) => {
                if let Err(err) = validate_spec(&spec) {
                    return AddTask::ready(Err(err));
                }
                if let Some(file) = spec.file.clone() {
                    return self.add_file_resource(file, spec).into_batch();
                }
                if let Some(sources) = spec.combine.clone() {
                    return self.add_combined_resource(sources, spec).into_batch();
                }
                AddTask::ready(Resource::from_spec(spec).map(|r| vec![self.insert_resolved(r)]))
            }
        }
    }

    /// Add many resources. Bare non-qualified strings are pooled into a
    /// single glob addition; everything else dispatches as
    /// [`add_resource`](Self::add_resource), in order.
    pub fn add_resources<I>(&self, inputs: I) -> AddTask<Vec<Resource>>
    where
        I: IntoIterator,
        I::Item: Into<ResourceInput>,
    {
        let mut globs = Vec::new();
        let mut tasks = Vec::new();
        for input in inputs {
            match input.into() {
                ResourceInput::Path(path) if !is_qualified(&path) => globs.push(path),
                other => tasks.push(self.add_resource(other)),
            }
        }
        if !globs.is_empty() {
            tasks.insert(0, self.add_glob_resources(globs));
        }
        AddTask::spawned(tokio::spawn(async move {
            let mut added = Vec::new();
            for task in tasks {
                added.extend(task.join().await?);
            }
            Ok(added)
        }))
    }

    /// Expand glob patterns against the root directory and add every match
    /// as a file resource. Resolves to the added resources; fails when the
    /// patterns match nothing at all.
    pub fn add_glob_resources<I, S>(&self, patterns: I) -> AddTask<Vec<Resource>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let guard = self.inner.pending.register("glob");
        let set = self.clone();
        AddTask::spawned(tokio::spawn(async move {
            let result = set.resolve_and_add_files(patterns).await;
            guard.settle(result.as_ref().map(|_| ()).map_err(SetError::clone));
            result
        }))
    }

    async fn resolve_and_add_files(&self, patterns: Vec<String>) -> Result<Vec<Resource>, SetError> {
        let resolved = self.resolve_patterns(patterns.clone()).await?;
        if resolved.is_empty() {
            return Err(SetError::NoMatches { patterns });
        }
        debug!(matched = resolved.len(), "adding glob matches");
        let tasks: Vec<AddTask<Resource>> = resolved
            .into_iter()
            .map(|path| self.add_file_resource(path, ResourceSpec::default()))
            .collect();
        let mut added = Vec::with_capacity(tasks.len());
        for task in tasks {
            added.push(task.join().await?);
        }
        Ok(added)
    }

    async fn resolve_patterns(&self, patterns: Vec<String>) -> Result<Vec<String>, SetError> {
        let root = self.inner.root_path.clone();
        tokio::task::spawn_blocking(move || resolver::resolve_paths(&root, &patterns))
            .await
            .map_err(join_failure)?
    }

    /// Add each path in `paths` as a file resource.
    pub fn add_file_resources<I, S>(&self, paths: I) -> AddTask<Vec<Resource>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks: Vec<AddTask<Resource>> = paths
            .into_iter()
            .map(|path| self.add_file_resource(path.into(), ResourceSpec::default()))
            .collect();
        AddTask::spawned(tokio::spawn(async move {
            let mut added = Vec::with_capacity(tasks.len());
            for task in tasks {
                added.push(task.join().await?);
            }
            Ok(added)
        }))
    }

    /// Load `path` (relative to the root) and add it as a resource.
    ///
    /// `options` can override the resource path and supply headers, an etag
    /// or alternatives; when `options.path` is unset the file's own path is
    /// used. The etag defaults to a fingerprint of the file content.
    pub fn add_file_resource(
        &self,
        path: impl Into<String>,
        options: ResourceSpec,
    ) -> AddTask<Resource> {
        let path = path.into();
        let guard = self.inner.pending.register("file");
        let set = self.clone();
        AddTask::spawned(tokio::spawn(async move {
            let result = set.load_file_resource(path, options).await;
            guard.settle(result.as_ref().map(|_| ()).map_err(SetError::clone));
            result
        }))
    }

    async fn load_file_resource(
        &self,
        path: String,
        mut options: ResourceSpec,
    ) -> Result<Resource, SetError> {
        let relative = path.strip_prefix('/').unwrap_or(&path);
        let full = self.inner.root_path.join(relative);
        let content = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| SetError::io(full, e))?;
        options.path = options.path.or(Some(path));
        options.file = None;
        options.content = Some(content);
        let resource = Resource::from_spec(options)?;
        Ok(self.insert_resolved(resource))
    }

    /// Add a resource whose content is the combination of other members.
    ///
    /// The combine is deferred until every addition outstanding at call time
    /// has settled (successfully or not), so members scheduled just before
    /// are available. All members must then be present in the set. Combines
    /// may reference other combined resources; each waits only on work
    /// scheduled before it, so chains still converge.
    pub fn add_combined_resource<I, S>(&self, sources: I, options: ResourceSpec) -> AddTask<Resource>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        if options.path.is_none() {
            return AddTask::ready(Err(SetError::InvalidResource(
                "combined resource needs a path".into(),
            )));
        }
        self.spawn_combine(sources, options)
    }

    /// Schedule a combine: snapshot the wave of outstanding additions, then
    /// register, so the wait never includes the combine itself.
    fn spawn_combine(&self, sources: Vec<String>, spec: ResourceSpec) -> AddTask<Resource> {
        let wave = self.inner.pending.snapshot();
        let guard = self.inner.pending.register("combine");
        let set = self.clone();
        AddTask::spawned(tokio::spawn(async move {
            for op in wave {
                // outcomes are irrelevant here; a failed member addition
                // surfaces as a missing member below
                let _ = op.settled().await;
            }
            let result = {
                let mut state = set.inner.state.lock();
                combine::combine(&state.collection, &sources, &spec)
                    .map(|resource| state.insert(resource))
            };
            guard.settle(result.as_ref().map(|_| ()).map_err(SetError::clone));
            result
        }))
    }

    // ------------------------------------------------------------------
    // Load path
    // ------------------------------------------------------------------

    /// Resolve `patterns` against the root directory and the set's own
    /// paths, add any matched files not yet present, and append the matches
    /// to the load path. Resolves to the matched paths.
    ///
    /// Patterns that match neither a file nor an existing resource fail the
    /// whole operation; `!pattern` exclusions never count as unmatched.
    pub fn append_load<I, S>(&self, patterns: I) -> AddTask<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schedule_load(patterns, false)
    }

    /// Like [`append_load`](Self::append_load), but inserts the matches at
    /// the front of the load path, keeping their relative order.
    pub fn prepend_load<I, S>(&self, patterns: I) -> AddTask<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schedule_load(patterns, true)
    }

    fn schedule_load<I, S>(&self, patterns: I, front: bool) -> AddTask<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let guard = self
            .inner
            .pending
            .register(if front { "prepend_load" } else { "append_load" });
        let set = self.clone();
        AddTask::spawned(tokio::spawn(async move {
            let result = set.resolve_load_patterns(patterns, front).await;
            guard.settle(result.as_ref().map(|_| ()).map_err(SetError::clone));
            result
        }))
    }

    async fn resolve_load_patterns(
        &self,
        patterns: Vec<String>,
        front: bool,
    ) -> Result<Vec<String>, SetError> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let file_matches = self
            .resolve_patterns(patterns.clone())
            .await
            .map_err(|err| SetError::Resolve {
                context: patterns.join(", "),
                message: err.to_string(),
            })?;

        let missing: Vec<String> = {
            let state = self.inner.state.lock();
            file_matches
                .iter()
                .filter(|path| !state.collection.contains(path.as_str()))
                .cloned()
                .collect()
        };
        if !missing.is_empty() {
            self.add_file_resources(missing).join().await?;
        }

        // patterns may also name resources that never came from disk
        let mut matched = file_matches;
        {
            let state = self.inner.state.lock();
            for pattern in &patterns {
                if pattern.starts_with('!') {
                    continue;
                }
                if is_qualified(pattern) {
                    if state.collection.contains(pattern) && !matched.contains(pattern) {
                        matched.push(pattern.clone());
                    }
                    continue;
                }
                let matcher = SetPattern::new(pattern)?;
                for path in state.collection.paths() {
                    if matcher.matches(path) && !matched.iter().any(|m| m == path) {
                        matched.push(path.to_string());
                    }
                }
            }

            let paths: Vec<&str> = state.collection.paths().collect();
            let unmatched = resolver::unmatched_patterns(&patterns, &paths);
            if !unmatched.is_empty() {
                return Err(SetError::UnmatchedPatterns {
                    label: "Failed loading configuration".into(),
                    patterns: unmatched,
                });
            }
        }

        if front {
            self.prepend_load_validated(&matched)?;
        } else {
            self.append_load_validated(&matched)?;
        }
        debug!(matched = matched.len(), front, "extended load path");
        Ok(matched)
    }

    fn append_load_validated(&self, paths: &[String]) -> Result<(), SetError> {
        let mut state = self.inner.state.lock();
        for path in paths {
            let normalized = normalize_path(path);
            if !state.collection.contains(&normalized) {
                return Err(SetError::NotInSet { path: normalized });
            }
            state.load_path.append(normalized);
        }
        Ok(())
    }

    fn prepend_load_validated(&self, paths: &[String]) -> Result<(), SetError> {
        let mut state = self.inner.state.lock();
        let mut normalized = Vec::with_capacity(paths.len());
        for path in paths {
            let path = normalize_path(path);
            if !state.collection.contains(&path) {
                return Err(SetError::NotInSet { path });
            }
            normalized.push(path);
        }
        state.load_path.prepend_all(normalized);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Wait until every scheduled addition has settled, including additions
    /// scheduled while waiting. A failure is reported as soon as it lands,
    /// leaving siblings to settle on their own.
    ///
    /// Failures are sticky: once any addition has failed, this returns the
    /// earliest failure, now and on every later call.
    pub async fn when_all_added(&self) -> Result<(), SetError> {
        self.inner.pending.converged().await
    }

    /// True when no additions are outstanding right now.
    pub fn is_settled(&self) -> bool {
        self.inner.pending.is_idle()
    }

    // ------------------------------------------------------------------
    // Queries and processing
    // ------------------------------------------------------------------

    /// Match patterns against the paths in the set, in collection order.
    ///
    /// A pattern that names a resource exactly (after normalization) yields
    /// that path; otherwise it is matched as a pattern, with bare names
    /// matching basenames.
    pub fn match_paths<I, S>(&self, patterns: I) -> Result<Vec<String>, SetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.inner.state.lock();
        let mut matched = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let normalized = normalize_path(pattern);
            if state.collection.contains(&normalized) {
                matched.push(normalized);
                continue;
            }
            if is_qualified(pattern) {
                continue;
            }
            let matcher = SetPattern::new(pattern)?;
            matched.extend(
                state
                    .collection
                    .paths()
                    .filter(|path| matcher.matches(path))
                    .map(String::from),
            );
        }
        Ok(matched)
    }

    /// Run processors over every resource the consumer does not already
    /// hold, per `manifest`, and return the manifest of what the set now
    /// serves. Resources without processors pass through untouched.
    ///
    /// Processors run on copies, outside the set's lock, so they are free
    /// to read the set they process for.
    pub fn process(&self, manifest: &CacheManifest) -> Result<CacheManifest, SetError> {
        let stale: Vec<Resource> = {
            let state = self.inner.state.lock();
            state
                .collection
                .iter()
                .filter(|resource| {
                    resource
                        .etag()
                        .is_none_or(|etag| !manifest.contains(resource.path(), etag))
                })
                .cloned()
                .collect()
        };

        let mut processed = Vec::with_capacity(stale.len());
        for mut resource in stale {
            resource.apply_processors()?;
            processed.push(resource);
        }

        {
            let mut state = self.inner.state.lock();
            for resource in processed {
                if let Some(stored) = state.collection.get_mut(resource.path()) {
                    // skip entries replaced while the processors ran
                    if *stored == resource {
                        *stored = resource;
                    }
                }
            }
        }
        Ok(self.cache_manifest())
    }

    /// Etags of everything currently in the set, keyed by path. Resources
    /// without an etag are not cacheable and are left out.
    pub fn cache_manifest(&self) -> CacheManifest {
        let state = self.inner.state.lock();
        let mut manifest = CacheManifest::new();
        for resource in state.collection.iter() {
            if let Some(etag) = resource.etag() {
                manifest.insert(resource.path(), etag);
            }
        }
        manifest
    }

    // ------------------------------------------------------------------
    // Merging
    // ------------------------------------------------------------------

    /// Merge this set with `others` into a new set rooted at this set's
    /// root. Later sets win path collisions; load paths are appended in set
    /// order. Combined resources are re-assembled against the fully merged
    /// set, which settles through [`when_all_added`](Self::when_all_added).
    pub fn concat<'a, I>(&self, others: I) -> ResourceSet
    where
        I: IntoIterator<Item = &'a ResourceSet>,
    {
        let merged = ResourceSet::with_root(&self.inner.root_path);
        let mut combines = Vec::new();
        merged.merge_from(self, &mut combines);
        for set in others {
            merged.merge_from(set, &mut combines);
        }
        // re-combines run only now, so they see members from every set
        for (sources, spec) in combines {
            let _ = merged.spawn_combine(sources, spec);
        }
        merged
    }

    fn merge_from(&self, source: &ResourceSet, combines: &mut Vec<(Vec<String>, ResourceSpec)>) {
        let (resources, load_paths) = {
            let state = source.inner.state.lock();
            (
                state.collection.resources().to_vec(),
                state.load_path.paths().to_vec(),
            )
        };
        for resource in resources {
            // this entry overrides whatever an earlier set put at its path,
            // including a scheduled re-combine
            combines.retain(|(_, spec)| spec.path.as_deref() != Some(resource.path()));
            if let Some(sources) = resource.combine() {
                let sources = sources.to_vec();
                let spec = ResourceSpec {
                    path: Some(resource.path().to_string()),
                    etag: resource.etag().map(String::from),
                    encoding: Some(resource.encoding().to_string()),
                    headers: resource.headers().clone(),
                    alternatives: resource.alternatives().to_vec(),
                    ..ResourceSpec::default()
                };
                // placeholder keeps the position; the re-combine replaces it
                // in place once every set has been merged
                self.insert_resolved(resource);
                combines.push((sources, spec));
            } else {
                self.insert_resolved(resource);
            }
        }
        let mut state = self.inner.state.lock();
        for path in load_paths {
            state.load_path.append(path);
        }
    }

    fn insert_resolved(&self, resource: Resource) -> Resource {
        self.inner.state.lock().insert(resource)
    }
}

impl Default for ResourceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ResourceSet")
            .field("root_path", &self.inner.root_path)
            .field("resources", &state.collection.len())
            .field("load_path", &state.load_path.len())
            .field("settled", &self.inner.pending.is_idle())
            .finish()
    }
}
