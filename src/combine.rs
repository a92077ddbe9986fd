//! Assembly of combined resources.
//!
//! A combined resource's content is the concatenation of its members'
//! current content, joined with newlines, taken at the moment the combine
//! runs. The set schedules that moment after outstanding additions have
//! settled; this module only does the assembly.

use crate::error::SetError;
use crate::resource::{Resource, ResourceSpec, fingerprint, normalize_path};
use crate::set::collection::Collection;

/// Build the combined resource for `sources` out of the current collection.
///
/// Every member must already be present. The result carries the member list,
/// the concatenated content, and an etag fingerprinted from that content
/// unless the spec pins one.
pub(crate) fn combine(
    collection: &Collection,
    sources: &[String],
    spec: &ResourceSpec,
) -> Result<Resource, SetError> {
    let path = normalize_path(spec.path.as_deref().unwrap_or_default());
    let members: Vec<String> = sources.iter().map(|s| normalize_path(s)).collect();

    let mut contents = Vec::with_capacity(members.len());
    for member in &members {
        let resource = collection.get(member).ok_or_else(|| SetError::MissingMember {
            path: path.clone(),
            member: member.clone(),
        })?;
        contents.push(resource.content().to_string());
    }
    let combined = contents.join("\n");

    let mut resource = Resource::from_spec(ResourceSpec {
        path: Some(path),
        etag: spec
            .etag
            .clone()
            .or_else(|| Some(fingerprint(combined.as_bytes()))),
        content: Some(combined),
        encoding: spec.encoding.clone(),
        headers: spec.headers.clone(),
        alternatives: spec.alternatives.clone(),
        ..ResourceSpec::default()
    })?;
    resource.set_combine(members);
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> Collection {
        let mut c = Collection::new();
        c.upsert(Resource::inline("/a.js", "var a;"));
        c.upsert(Resource::inline("/b.js", "var b;"));
        c
    }

    fn spec(path: &str) -> ResourceSpec {
        ResourceSpec {
            path: Some(path.to_string()),
            ..ResourceSpec::default()
        }
    }

    #[test]
    fn test_combines_member_content_in_source_order() {
        let c = collection();
        let sources = vec!["b.js".to_string(), "a.js".to_string()];
        let resource = combine(&c, &sources, &spec("/all.js")).unwrap();
        assert_eq!(resource.content(), "var b;\nvar a;");
        assert_eq!(
            resource.combine(),
            Some(&["/b.js".to_string(), "/a.js".to_string()][..])
        );
    }

    #[test]
    fn test_etag_fingerprints_combined_content() {
        let c = collection();
        let sources = vec!["a.js".to_string(), "b.js".to_string()];
        let resource = combine(&c, &sources, &spec("/all.js")).unwrap();
        assert_eq!(
            resource.etag(),
            Some(fingerprint(b"var a;\nvar b;").as_str())
        );
    }

    #[test]
    fn test_explicit_etag_is_kept() {
        let c = collection();
        let sources = vec!["a.js".to_string()];
        let resource = combine(
            &c,
            &sources,
            &ResourceSpec {
                etag: Some("pinned".into()),
                ..spec("/all.js")
            },
        )
        .unwrap();
        assert_eq!(resource.etag(), Some("pinned"));
    }

    #[test]
    fn test_missing_member_is_an_error() {
        let c = collection();
        let sources = vec!["a.js".to_string(), "missing.js".to_string()];
        let err = combine(&c, &sources, &spec("/all.js")).unwrap_err();
        assert_eq!(
            err,
            SetError::MissingMember {
                path: "/all.js".into(),
                member: "/missing.js".into(),
            }
        );
    }

    #[test]
    fn test_options_carry_over() {
        let c = collection();
        let sources = vec!["a.js".to_string()];
        let mut options = spec("/all.js");
        options.headers.insert("X-Combined".into(), "yes".into());
        let resource = combine(&c, &sources, &options).unwrap();
        assert_eq!(resource.headers().get("X-Combined").map(String::as_str), Some("yes"));
    }
}
