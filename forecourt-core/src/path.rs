//! Hierarchical URL paths reconstructed from parent references.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::PathError;
use crate::model::{ContentType, Entry, LinkType};

pub const DEFAULT_MAX_DEPTH: usize = 5;

/// How far, and under which root, parent chains are walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    /// Number of ancestors visited above the entry itself.
    pub max_depth: usize,
    /// Prefix for services that have no parent, e.g. `services`.
    pub service_root: Option<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        PathPolicy {
            max_depth: DEFAULT_MAX_DEPTH,
            service_root: None,
        }
    }
}

/// Trims slashes; the home slug `/` becomes the empty string.
pub fn normalise(path: &str) -> &str {
    path.trim_matches('/')
}

/// Name of the field that links `entry` to its parent.
pub fn parent_field(entry: &Entry) -> &'static str {
    match entry.tag() {
        Some(ContentType::Service) => "parent",
        _ => "pageParent",
    }
}

/// Slugs from the outermost ancestor down to `entry`. Empty slugs (the home
/// page) are left out.
///
/// Fails when the chain cannot be followed to an entry without a parent: a
/// parent left as a link, more than `max_depth` ancestors, or a cycle.
pub fn path_segments(entry: &Entry, policy: &PathPolicy) -> Result<Vec<String>, PathError> {
    let mut segments = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(entry.id().to_string());
    push_slug(&mut segments, entry);

    let mut current = entry.clone();
    let mut depth = 0;

    loop {
        let field = parent_field(&current);
        let Some(parent) = current.entry(field) else {
            if let Some(link) = current
                .link(field)
                .filter(|link| link.link_type == LinkType::Entry)
            {
                return Err(PathError::UnresolvedParent {
                    entry_id: entry.id().to_string(),
                    parent_id: link.id,
                });
            }
            break;
        };
        if depth >= policy.max_depth {
            return Err(PathError::TooDeep {
                entry_id: entry.id().to_string(),
                max_depth: policy.max_depth,
            });
        }
        if !visited.insert(parent.id().to_string()) {
            return Err(PathError::Cycle {
                entry_id: entry.id().to_string(),
                repeated_id: parent.id().to_string(),
            });
        }
        push_slug(&mut segments, &parent);
        depth += 1;
        current = parent;
    }

    if depth == 0 && entry.tag() == Some(ContentType::Service) {
        if let Some(root) = policy.service_root.as_deref().map(normalise) {
            if !root.is_empty() {
                segments.push(root.to_string());
            }
        }
    }

    segments.reverse();
    Ok(segments)
}

fn push_slug(segments: &mut Vec<String>, entry: &Entry) {
    let slug = normalise(entry.text("slug").unwrap_or_default());
    if !slug.is_empty() {
        segments.push(slug.to_string());
    }
}

/// Slash-joined path without a leading slash.
pub fn resolve_path(entry: &Entry, policy: &PathPolicy) -> Result<String, PathError> {
    path_segments(entry, policy).map(|segments| segments.join("/"))
}

/// Site-relative link to `entry`, or `None` when its path is incomplete.
pub fn entry_href(entry: &Entry, policy: &PathPolicy) -> Option<String> {
    match resolve_path(entry, policy) {
        Ok(path) => Some(format!("/{path}")),
        Err(e) => {
            warn!(
                entry_id = %entry.id(),
                error = %e,
                "No link for entry with incomplete path"
            );
            None
        }
    }
}

/// Exact comparison of the reconstructed path against the requested one. An
/// incomplete parent chain never matches.
pub fn matches_requested_slug(entry: &Entry, requested: &str, policy: &PathPolicy) -> bool {
    let resolved = match resolve_path(entry, policy) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(
                entry_id = %entry.id(),
                requested = %requested,
                error = %e,
                "Rejected entry with incomplete path"
            );
            return false;
        }
    };
    let matched = resolved == normalise(requested);
    debug!(
        entry_id = %entry.id(),
        resolved = %resolved,
        requested = %requested,
        matched,
        "Validated requested path"
    );
    matched
}

/// Last segment of a requested path, used as the slug query. The root path
/// asks for the home slug `/`.
pub fn leaf_slug(requested: &str) -> &str {
    let trimmed = normalise(requested);
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_slug_of_nested_and_root() {
        assert_eq!(leaf_slug("/servicing/mot/"), "mot");
        assert_eq!(leaf_slug("contact"), "contact");
        assert_eq!(leaf_slug("/"), "/");
        assert_eq!(leaf_slug(""), "/");
    }
}
