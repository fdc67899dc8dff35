//! Logical folder paths.
//!
//! Backend addresses are slash-delimited strings rooted at `/`, not host
//! filesystem paths, so they are kept as `String` and manipulated here.

/// Normalize a user-typed path: leading slash, no repeated or trailing slashes.
pub fn normalize(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Append a child name to a parent path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

/// Parent path, or `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}

/// Last segment of a path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Whether `path` equals `ancestor` or lies beneath it (segment-aware).
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let ancestor = ancestor.trim_end_matches('/');
    if ancestor.is_empty() {
        return path.starts_with('/');
    }
    path == ancestor
        || (path.starts_with(ancestor) && path[ancestor.len()..].starts_with('/'))
}

/// Drop paths that lie beneath another path in the set, keeping order.
pub fn outermost(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter(|p| !paths.iter().any(|other| other != *p && is_within(p, other)))
        .cloned()
        .collect()
}

/// Replace the `old_prefix` of `path` with `new_prefix`.
///
/// Returns `path` unchanged when it does not lie under `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    if !is_within(path, old_prefix) {
        return path.to_string();
    }
    let rest = &path[old_prefix.trim_end_matches('/').len()..];
    format!("{}{}", new_prefix.trim_end_matches('/'), rest)
}

/// Breadcrumb segments `(label, path)` of `path`, starting at `root`.
///
/// The root is always the first crumb; a path outside the root yields just
/// the root crumb.
pub fn segments(path: &str, root: &str) -> Vec<(String, String)> {
    let root = normalize(root);
    let mut crumbs = vec![(file_name(&root).to_string(), root.clone())];
    if !is_within(path, &root) {
        return crumbs;
    }

    let mut accumulated = root.clone();
    for segment in path[root.len()..].split('/').filter(|s| !s.is_empty()) {
        accumulated = join(&accumulated, segment);
        crumbs.push((segment.to_string(), accumulated.clone()));
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_slashes() {
        assert_eq!(normalize("Organizations//Acme/"), "/Organizations/Acme");
        assert_eq!(normalize("  /a / b "), "/a/b");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join("/", "Organizations"), "/Organizations");
        assert_eq!(join("/Organizations", "Acme"), "/Organizations/Acme");
        assert_eq!(join("/Organizations/", "Acme"), "/Organizations/Acme");
    }

    #[test]
    fn parent_of_nested_and_top_level() {
        assert_eq!(parent("/Organizations/Acme"), Some("/Organizations"));
        assert_eq!(parent("/Organizations"), Some("/"));
        assert_eq!(parent("/"), None);
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("/Organizations/Acme/report.pdf"), "report.pdf");
        assert_eq!(file_name("/Organizations/"), "Organizations");
    }

    #[test]
    fn is_within_is_segment_aware() {
        assert!(is_within("/Root/A/x", "/Root/A"));
        assert!(is_within("/Root/A", "/Root/A"));
        assert!(!is_within("/Root/AB", "/Root/A"));
        assert!(is_within("/Root", "/"));
    }

    #[test]
    fn outermost_drops_nested_paths() {
        let paths = vec![
            "/Root/A/x".to_string(),
            "/Root/A".to_string(),
            "/Root/AB".to_string(),
        ];
        assert_eq!(outermost(&paths), vec!["/Root/A", "/Root/AB"]);
    }

    #[test]
    fn rebase_moves_prefix() {
        assert_eq!(rebase("/Root/A/x", "/Root/A", "/Root/A2"), "/Root/A2/x");
        assert_eq!(rebase("/Root/A", "/Root/A", "/Root/Dest/A"), "/Root/Dest/A");
        assert_eq!(rebase("/Root/B", "/Root/A", "/Root/A2"), "/Root/B");
    }

    #[test]
    fn segments_start_at_root() {
        let crumbs = segments("/Organizations/Acme/Finance", "/Organizations");
        let labels: Vec<&str> = crumbs.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Organizations", "Acme", "Finance"]);
        assert_eq!(crumbs[1].1, "/Organizations/Acme");
    }

    #[test]
    fn segments_outside_root_yield_root_only() {
        let crumbs = segments("/Elsewhere/x", "/Organizations");
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].1, "/Organizations");
    }
}
