//! Resources and resource specs.
//!
//! A [`Resource`] is one addressable entry in a set: a normalized path plus
//! content that may be inline, loaded from disk, proxied to a backend, or
//! combined from other entries. A [`ResourceSpec`] is the loosely-typed input
//! shape accepted by the set's `add*` operations; it is validated and
//! normalized into a `Resource`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SetError;

/// Etags are truncated content hashes, long enough to make collisions
/// irrelevant for cache invalidation.
const ETAG_LEN: usize = 16;

/// Default text encoding advertised on the wire.
pub const DEFAULT_ENCODING: &str = "utf-8";

// ============================================================================
// Paths and fingerprints
// ============================================================================

/// Fingerprint of raw content, used as an etag.
pub fn fingerprint(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    let mut hex = hex::encode(hash.as_bytes());
    hex.truncate(ETAG_LEN);
    hex
}

/// True for paths that carry a URL scheme, like `http://cdn/x.js` or
/// `chrome-ext://app/load.js`.
///
/// Qualified paths are kept verbatim: they are never normalized and never
/// subject to the content requirements of set-local resources.
pub fn is_qualified(path: &str) -> bool {
    let Some((scheme, rest)) = path.split_once(':') else {
        return false;
    };
    if !rest.starts_with("//") {
        return false;
    }
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Normalize a set-local path to its canonical leading-slash form.
///
/// Qualified paths pass through untouched. Backslash separators become
/// slashes; `"foo.js"`, `"./foo.js"` and `"/foo.js"` all normalize to
/// `"/foo.js"`; a trailing slash is dropped except on the root path itself.
pub fn normalize_path(path: &str) -> String {
    if is_qualified(path) {
        return path.to_string();
    }
    let forward = path.replace('\\', "/");
    let trimmed = forward.strip_prefix("./").unwrap_or(&forward);
    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

// ============================================================================
// Processors
// ============================================================================

/// Content transform applied when a set is processed.
///
/// Processors run in registration order; each receives the output of the
/// previous one. They are shared across clones of a set, hence `Send + Sync`.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, resource: &Resource, content: &str) -> Result<String, SetError>;
}

// ============================================================================
// Specs
// ============================================================================

/// Alternative representation of a resource, keyed by mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub mime_type: String,
    pub content: String,
}

/// Loosely-typed resource description accepted by the `add*` operations.
///
/// Exactly one content source may be set: `content`, `file`, `backend` or
/// `combine`. Everything else defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSpec {
    pub path: Option<String>,
    pub content: Option<String>,
    pub file: Option<String>,
    pub backend: Option<String>,
    pub combine: Option<Vec<String>>,
    pub etag: Option<String>,
    pub encoding: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub alternatives: Vec<Alternative>,
}

impl ResourceSpec {
    /// Spec holding inline content.
    pub fn with_content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Input accepted wherever a resource can be added: either a bare path (a
/// file or glob pattern relative to the set root) or a full spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceInput {
    Path(String),
    Spec(ResourceSpec),
}

impl From<&str> for ResourceInput {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for ResourceInput {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<ResourceSpec> for ResourceInput {
    fn from(spec: ResourceSpec) -> Self {
        Self::Spec(spec)
    }
}

/// Check a spec against the resource rules before it is materialized.
pub fn validate_spec(spec: &ResourceSpec) -> Result<(), SetError> {
    let Some(path) = spec.path.as_deref() else {
        return Err(SetError::InvalidResource(format!(
            "resource must have a path: {spec:?}"
        )));
    };
    let sources = [
        spec.content.is_some(),
        spec.file.is_some(),
        spec.backend.is_some(),
        spec.combine.is_some(),
    ];
    if sources.iter().filter(|&&s| s).count() > 1 {
        return Err(SetError::InvalidResource(
            "resource can only have one of content, file, backend, combine".into(),
        ));
    }
    if let Some(backend) = spec.backend.as_deref() {
        if !is_qualified(backend) {
            return Err(SetError::InvalidResource(format!(
                "backend '{backend}' must be a fully qualified URL"
            )));
        }
    }
    let has_source = sources.iter().any(|&s| s) || spec.etag.is_some();
    if !has_source && !is_qualified(path) {
        return Err(SetError::InvalidResource(format!(
            "resource '{path}' must have content, a file, a backend, \
             members to combine or an etag"
        )));
    }
    Ok(())
}

// ============================================================================
// Resource
// ============================================================================

/// One entry in a resource set.
#[derive(Clone, Default)]
pub struct Resource {
    path: String,
    etag: Option<String>,
    encoding: String,
    headers: BTreeMap<String, String>,
    content: Option<String>,
    backend: Option<String>,
    combine: Option<Vec<String>>,
    alternatives: Vec<Alternative>,
    processors: Vec<Arc<dyn Processor>>,
    processed: Option<String>,
}

impl Resource {
    /// Materialize a validated spec.
    ///
    /// The path is normalized, the encoding defaulted and the etag resolved:
    /// an explicit etag wins, otherwise inline content is fingerprinted.
    /// Combined and backend resources get their etags later, when members or
    /// content are known.
    pub fn from_spec(spec: ResourceSpec) -> Result<Self, SetError> {
        validate_spec(&spec)?;
        let path = normalize_path(spec.path.as_deref().unwrap_or_default());
        let etag = spec
            .etag
            .or_else(|| spec.content.as_deref().map(|c| fingerprint(c.as_bytes())));
        Ok(Self {
            path,
            etag,
            encoding: spec.encoding.unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
            headers: spec.headers,
            content: spec.content,
            backend: spec.backend,
            combine: spec
                .combine
                .map(|members| members.iter().map(|m| normalize_path(m)).collect()),
            alternatives: spec.alternatives,
            processors: Vec::new(),
            processed: None,
        })
    }

    /// Resource with inline content and a fingerprinted etag.
    pub fn inline(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: normalize_path(&path.into()),
            etag: Some(fingerprint(content.as_bytes())),
            encoding: DEFAULT_ENCODING.to_string(),
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    pub fn combine(&self) -> Option<&[String]> {
        self.combine.as_deref()
    }

    pub fn is_combined(&self) -> bool {
        self.combine.is_some()
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Current deliverable content: processed output when available,
    /// otherwise the raw content, otherwise empty.
    pub fn content(&self) -> &str {
        self.processed
            .as_deref()
            .or(self.content.as_deref())
            .unwrap_or_default()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some() || self.processed.is_some()
    }

    pub(crate) fn set_combine(&mut self, members: Vec<String>) {
        self.combine = Some(members);
    }

    pub(crate) fn push_processor(&mut self, processor: Arc<dyn Processor>) {
        self.processors.push(processor);
    }

    /// Run the processor chain and cache the result. Always starts from the
    /// raw content, so re-processing cannot compound. A no-op when no
    /// processors are attached. A failing processor is reported with its
    /// name and this resource's path.
    pub(crate) fn apply_processors(&mut self) -> Result<(), SetError> {
        if self.processors.is_empty() {
            return Ok(());
        }
        let mut content = self.content.clone().unwrap_or_default();
        for processor in self.processors.clone() {
            content =
                processor
                    .process(self, &content)
                    .map_err(|err| SetError::Processor {
                        processor: processor.name().to_string(),
                        path: self.path.clone(),
                        message: err.to_string(),
                    })?;
        }
        self.processed = Some(content);
        Ok(())
    }
}

// Processor trait objects are neither Debug nor PartialEq; compare and
// format everything else.
impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("etag", &self.etag)
            .field("encoding", &self.encoding)
            .field("headers", &self.headers)
            .field("content", &self.content)
            .field("backend", &self.backend)
            .field("combine", &self.combine)
            .field("alternatives", &self.alternatives)
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.etag == other.etag
            && self.encoding == other.encoding
            && self.headers == other.headers
            && self.content == other.content
            && self.backend == other.backend
            && self.combine == other.combine
            && self.alternatives == other.alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_leading_slash() {
        assert_eq!(normalize_path("foo.js"), "/foo.js");
        assert_eq!(normalize_path("./foo.js"), "/foo.js");
        assert_eq!(normalize_path("/foo.js"), "/foo.js");
    }

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(normalize_path("/lib/"), "/lib");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_normalize_converts_backslashes() {
        assert_eq!(normalize_path("lib\\c.js"), "/lib/c.js");
    }

    #[test]
    fn test_qualified_paths_pass_through() {
        assert!(is_qualified("http://cdn.example/foo.js"));
        assert!(is_qualified("chrome-ext://blah/x.js"));
        assert!(!is_qualified("/foo.js"));
        assert!(!is_qualified("foo:bar.js"));
        // scheme-only references stay set-local; qualification needs `://`
        assert!(!is_qualified("mailto:dev@example.com"));
        assert_eq!(
            normalize_path("http://cdn.example/foo.js"),
            "http://cdn.example/foo.js"
        );
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = fingerprint(b"var a = 1;");
        let b = fingerprint(b"var a = 1;");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, fingerprint(b"var a = 2;"));
    }

    #[test]
    fn test_spec_requires_path() {
        let err = validate_spec(&ResourceSpec {
            content: Some("x".into()),
            ..ResourceSpec::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("must have a path"));
    }

    #[test]
    fn test_spec_rejects_multiple_sources() {
        let err = validate_spec(&ResourceSpec {
            path: Some("/x.js".into()),
            content: Some("x".into()),
            file: Some("x.js".into()),
            ..ResourceSpec::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("one of content, file, backend, combine"));
    }

    #[test]
    fn test_spec_rejects_relative_backend() {
        let err = validate_spec(&ResourceSpec {
            path: Some("/x.js".into()),
            backend: Some("localhost:4000/x".into()),
            ..ResourceSpec::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("fully qualified URL"));
    }

    #[test]
    fn test_spec_requires_some_source() {
        let err = validate_spec(&ResourceSpec {
            path: Some("/x.js".into()),
            ..ResourceSpec::default()
        })
        .unwrap_err();
        assert!(matches!(err, SetError::InvalidResource(_)));
    }

    #[test]
    fn test_etag_only_spec_is_a_cache_reference() {
        let spec = ResourceSpec {
            path: Some("/x.js".into()),
            etag: Some("abc123".into()),
            ..ResourceSpec::default()
        };
        let resource = Resource::from_spec(spec).unwrap();
        assert_eq!(resource.etag(), Some("abc123"));
        assert!(!resource.has_content());
    }

    #[test]
    fn test_qualified_spec_needs_no_source() {
        let spec = ResourceSpec {
            path: Some("http://cdn.example/foo.js".into()),
            ..ResourceSpec::default()
        };
        assert!(validate_spec(&spec).is_ok());
    }

    #[test]
    fn test_from_spec_fingerprints_inline_content() {
        let resource = Resource::from_spec(ResourceSpec::with_content("a.js", "var a;")).unwrap();
        assert_eq!(resource.path(), "/a.js");
        assert_eq!(resource.etag(), Some(fingerprint(b"var a;").as_str()));
        assert_eq!(resource.encoding(), "utf-8");
    }

    #[test]
    fn test_explicit_etag_wins_over_fingerprint() {
        let spec = ResourceSpec {
            etag: Some("pinned".into()),
            ..ResourceSpec::with_content("/a.js", "var a;")
        };
        let resource = Resource::from_spec(spec).unwrap();
        assert_eq!(resource.etag(), Some("pinned"));
    }

    #[test]
    fn test_combine_members_are_normalized() {
        let spec = ResourceSpec {
            path: Some("/all.js".into()),
            combine: Some(vec!["a.js".into(), "./b.js".into()]),
            ..ResourceSpec::default()
        };
        let resource = Resource::from_spec(spec).unwrap();
        assert_eq!(resource.combine(), Some(&["/a.js".to_string(), "/b.js".to_string()][..]));
    }

    #[test]
    fn test_alternative_serde_uses_camel_case() {
        let alt = Alternative {
            mime_type: "text/uppercase".into(),
            content: "VAR A;".into(),
        };
        let json = serde_json::to_value(&alt).unwrap();
        assert_eq!(json["mimeType"], "text/uppercase");
    }

    struct Upcase;

    impl Processor for Upcase {
        fn name(&self) -> &str {
            "upcase"
        }

        fn process(&self, _resource: &Resource, content: &str) -> Result<String, SetError> {
            Ok(content.to_uppercase())
        }
    }

    struct Suffix;

    impl Processor for Suffix {
        fn name(&self) -> &str {
            "suffix"
        }

        fn process(&self, _resource: &Resource, content: &str) -> Result<String, SetError> {
            Ok(format!("{content}!"))
        }
    }

    #[test]
    fn test_processors_chain_in_order() {
        let mut resource = Resource::inline("/a.js", "var a;");
        resource.push_processor(Arc::new(Upcase));
        resource.push_processor(Arc::new(Suffix));
        resource.apply_processors().unwrap();
        assert_eq!(resource.content(), "VAR A;!");
    }

    #[test]
    fn test_processing_keeps_raw_etag() {
        let mut resource = Resource::inline("/a.js", "var a;");
        let etag = resource.etag().unwrap().to_string();
        resource.push_processor(Arc::new(Upcase));
        resource.apply_processors().unwrap();
        assert_eq!(resource.etag(), Some(etag.as_str()));
    }

    struct Choke;

    impl Processor for Choke {
        fn name(&self) -> &str {
            "choke"
        }

        fn process(&self, _resource: &Resource, _content: &str) -> Result<String, SetError> {
            Err(SetError::Internal("unparseable input".into()))
        }
    }

    #[test]
    fn test_failing_processor_reports_name_and_path() {
        let mut resource = Resource::inline("/a.js", "var a;");
        resource.push_processor(Arc::new(Choke));
        let err = resource.apply_processors().unwrap_err();
        assert!(matches!(err, SetError::Processor { .. }));
        assert!(err.to_string().contains("choke"));
        assert!(err.to_string().contains("/a.js"));
        assert!(err.to_string().contains("unparseable input"));
    }
}
