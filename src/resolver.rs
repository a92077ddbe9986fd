//! Path resolution: filesystem globs and set-path pattern matching.
//!
//! Two closely related jobs live here. [`resolve_paths`] expands glob
//! patterns against a set's root directory into normalized set paths, with
//! `!pattern` exclusions. [`SetPattern`] matches patterns against paths
//! already in a set, with basename matching for bare file names, so that
//! `"jquery.js"` finds `/vendor/jquery.js`.

use std::path::Path;

use glob::MatchOptions;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::SetError;
use crate::resource::is_qualified;

/// Matching rules for set paths: `*` never crosses a slash and dotfiles
/// must be named explicitly.
fn set_path_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Filesystem walks match per component, so separators are already literal.
fn fs_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    }
}

// ============================================================================
// Set-path patterns
// ============================================================================

/// A pattern matched against normalized set paths.
///
/// A pattern without slashes matches basenames, so `"*.css"` hits
/// `/themes/dark.css`. A pattern with slashes matches the full path and is
/// given a leading slash when missing.
#[derive(Debug, Clone)]
pub struct SetPattern {
    inner: glob::Pattern,
    base_only: bool,
}

impl SetPattern {
    pub fn new(raw: &str) -> Result<Self, SetError> {
        let base_only = !raw.contains('/');
        let source = if base_only || raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/{raw}")
        };
        let inner = glob::Pattern::new(&source).map_err(|e| SetError::Pattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { inner, base_only })
    }

    pub fn matches(&self, path: &str) -> bool {
        let candidate = if self.base_only {
            path.rsplit('/').next().unwrap_or(path)
        } else {
            path
        };
        self.inner.matches_with(candidate, set_path_options())
    }
}

/// Patterns that matched nothing in `paths`, the resolve-failure check run
/// after missing resources have been added.
///
/// Exclusions are never reported unmatched. A qualified specifier matches
/// only its verbatim path. Each remaining pattern is given a leading slash
/// and matched against full paths only.
pub fn unmatched_patterns(patterns: &[String], paths: &[&str]) -> Vec<String> {
    patterns
        .iter()
        .filter(|pattern| !pattern.starts_with('!'))
        .filter(|pattern| {
            if is_qualified(pattern) {
                return !paths.contains(&pattern.as_str());
            }
            let full = if pattern.starts_with('/') {
                (*pattern).clone()
            } else {
                format!("/{pattern}")
            };
            match glob::Pattern::new(&full) {
                Ok(p) => !paths
                    .iter()
                    .any(|path| p.matches_with(path, set_path_options())),
                Err(_) => true,
            }
        })
        .cloned()
        .collect()
}

// ============================================================================
// Filesystem resolution
// ============================================================================

/// Expand patterns against `root` into normalized set paths.
///
/// Patterns are root-relative; a leading slash is allowed and means the same
/// thing. `!pattern` entries exclude previously matched files and qualified
/// specifiers are skipped, since neither names a file under the root.
/// Matches are files only, deduplicated, in pattern order with each
/// pattern's matches alphabetical. Patterns that match nothing contribute
/// nothing; the caller decides whether an empty result is an error.
pub fn resolve_paths(root: &Path, patterns: &[String]) -> Result<Vec<String>, SetError> {
    let mut excludes = Vec::new();
    for pattern in patterns {
        if let Some(stripped) = pattern.strip_prefix('!') {
            excludes.push(SetPattern::new(stripped)?);
        }
    }

    let mut seen = FxHashSet::default();
    let mut matched = Vec::new();

    for pattern in patterns {
        if pattern.starts_with('!') || is_qualified(pattern) {
            continue;
        }
        let relative = pattern.strip_prefix('/').unwrap_or(pattern);
        let full = root.join(relative);
        let entries = glob::glob_with(&full.to_string_lossy(), fs_options()).map_err(|e| {
            SetError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            }
        })?;
        for entry in entries {
            let path = entry.map_err(|e| SetError::Io {
                path: e.path().to_path_buf(),
                message: e.error().to_string(),
            })?;
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let set_path = to_set_path(relative);
            if excludes.iter().any(|e| e.matches(&set_path)) {
                continue;
            }
            if seen.insert(set_path.clone()) {
                matched.push(set_path);
            }
        }
    }

    debug!(
        patterns = patterns.len(),
        matched = matched.len(),
        root = %root.display(),
        "resolved glob patterns"
    );
    Ok(matched)
}

fn to_set_path(relative: &Path) -> String {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn fixture_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "var a;").unwrap();
        fs::write(dir.path().join("b.js"), "var b;").unwrap();
        fs::write(dir.path().join(".hidden.js"), "var h;").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/c.js"), "var c;").unwrap();
        dir
    }

    fn resolve(root: &Path, patterns: &[&str]) -> Vec<String> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        resolve_paths(root, &patterns).unwrap()
    }

    #[test]
    fn test_glob_matches_are_set_paths_in_alphabetical_order() {
        let dir = fixture_tree();
        assert_eq!(resolve(dir.path(), &["*.js"]), vec!["/a.js", "/b.js"]);
    }

    #[test]
    fn test_glob_does_not_match_dotfiles() {
        let dir = fixture_tree();
        assert!(!resolve(dir.path(), &["*.js"]).contains(&"/.hidden.js".to_string()));
    }

    #[test]
    fn test_nested_glob() {
        let dir = fixture_tree();
        assert_eq!(resolve(dir.path(), &["lib/*.js"]), vec!["/lib/c.js"]);
        assert_eq!(
            resolve(dir.path(), &["**/*.js"]),
            vec!["/a.js", "/b.js", "/lib/c.js"]
        );
    }

    #[test]
    fn test_literal_path_and_leading_slash() {
        let dir = fixture_tree();
        assert_eq!(resolve(dir.path(), &["a.js"]), vec!["/a.js"]);
        assert_eq!(resolve(dir.path(), &["/a.js"]), vec!["/a.js"]);
    }

    #[test]
    fn test_exclusion_patterns_filter_matches() {
        let dir = fixture_tree();
        assert_eq!(resolve(dir.path(), &["*.js", "!b.js"]), vec!["/a.js"]);
    }

    #[test]
    fn test_matches_are_deduplicated_in_first_match_order() {
        let dir = fixture_tree();
        assert_eq!(
            resolve(dir.path(), &["b.js", "*.js"]),
            vec!["/b.js", "/a.js"]
        );
    }

    #[test]
    fn test_missing_literal_path_matches_nothing() {
        let dir = fixture_tree();
        assert!(resolve(dir.path(), &["nope.js"]).is_empty());
    }

    #[test]
    fn test_invalid_pattern_errors() {
        let dir = fixture_tree();
        let err = resolve_paths(dir.path(), &["[".to_string()]).unwrap_err();
        assert!(matches!(err, SetError::Pattern { .. }));
    }

    #[test]
    fn test_set_pattern_basename_matching() {
        let p = SetPattern::new("c.js").unwrap();
        assert!(p.matches("/lib/c.js"));
        assert!(p.matches("/c.js"));
        assert!(!p.matches("/lib/d.js"));
    }

    #[test]
    fn test_set_pattern_full_path_matching() {
        let p = SetPattern::new("lib/*.js").unwrap();
        assert!(p.matches("/lib/c.js"));
        assert!(!p.matches("/other/c.js"));

        let starred = SetPattern::new("*.js").unwrap();
        assert!(starred.matches("/lib/c.js"));
    }

    #[test]
    fn test_unmatched_patterns_skips_exclusions() {
        let unmatched = unmatched_patterns(
            &["a.js".to_string(), "!gone.js".to_string(), "nope.js".to_string()],
            &["/a.js"],
        );
        assert_eq!(unmatched, vec!["nope.js"]);
    }

    #[test]
    fn test_unmatched_patterns_match_full_paths_only() {
        // a bare name is given a leading slash, so it only matches at the root
        let unmatched = unmatched_patterns(&["c.js".to_string()], &["/lib/c.js"]);
        assert_eq!(unmatched, vec!["c.js"]);
        assert!(unmatched_patterns(&["lib/c.js".to_string()], &["/lib/c.js"]).is_empty());
    }

    #[test]
    fn test_qualified_specifiers_skip_the_filesystem() {
        let dir = fixture_tree();
        assert_eq!(
            resolve(dir.path(), &["http://cdn.example/a.js", "a.js"]),
            vec!["/a.js"]
        );
    }

    #[test]
    fn test_qualified_specifiers_match_verbatim_paths() {
        let url = "http://cdn.example/a.js".to_string();
        assert!(unmatched_patterns(&[url.clone()], &["http://cdn.example/a.js"]).is_empty());
        assert_eq!(unmatched_patterns(&[url.clone()], &["/a.js"]), vec![url]);
    }
}
