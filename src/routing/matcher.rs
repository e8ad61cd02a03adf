//! Path matching against a compiled tree.
//!
//! # Responsibilities
//! - Walk a compiled tree for a request path, read-only
//! - Bind parameter and wildcard captures in order
//! - Report a miss as `None`
//!
//! # Design Decisions
//! - Priority is structural: static, then parameter, then wildcard
//! - Parameter attempts backtrack by truncating the capture list
//! - A static label only matches up to a segment boundary (`/` or end of path),
//!   unless the node continues the segment through a split edge
//! - A wildcard leaf, when present, is the match of last resort and never fails
//! - Captured text is percent-decoded into one reused buffer; names are shared
//!   with the tree, so a capture allocates nothing once the buffer has grown

use std::ops::Range;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::routing::node::{Node, NodeKind};

/// How a path with one extra trailing slash is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// `/users/` falls back to the `/users` route when nothing else matches.
    #[default]
    Lenient,
    /// `/users/` only matches a route that consumes the empty remainder.
    Strict,
}

/// Ordered name → value captures of one lookup.
#[derive(Clone, Default)]
pub struct Params {
    entries: Vec<(Arc<str>, Range<usize>)>,
    values: String,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, range)| &self.values[range.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, range)| (&**key, &self.values[range.clone()]))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every binding, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.values.clear();
    }

    /// Bind `name` to the percent-decoded form of `raw`.
    pub(crate) fn push(&mut self, name: &Arc<str>, raw: &str) {
        let start = self.values.len();
        self.values.push_str(&percent_decode_str(raw).decode_utf8_lossy());
        self.entries.push((Arc::clone(name), start..self.values.len()));
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if let Some((_, range)) = self.entries.get(len) {
            self.values.truncate(range.start);
        }
        self.entries.truncate(len);
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Params {}

impl std::fmt::Debug for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Find the terminal value for `path` below `root`.
///
/// On success the captures are appended to `params`; on a miss `params` is
/// left as it was.
pub fn find<'t, T>(
    root: &'t Node<T>,
    path: &str,
    mode: TrailingSlash,
    params: &mut Params,
) -> Option<&'t T> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let mark = params.len();

    let found = if path.is_empty() {
        root.value().or_else(|| wildcard(root, path, params))
    } else {
        Walk { mode }.segment(root, path, params)
    };

    if found.is_none() {
        params.truncate(mark);
    }
    found
}

fn wildcard<'t, T>(node: &'t Node<T>, rest: &str, params: &mut Params) -> Option<&'t T> {
    let leaf = node.wildcard()?;
    params.push(&leaf.name, rest);
    Some(&leaf.value)
}

struct Walk {
    mode: TrailingSlash,
}

impl Walk {
    /// `path` starts a new segment below `node`.
    fn segment<'t, T>(&self, node: &'t Node<T>, path: &str, params: &mut Params) -> Option<&'t T> {
        if !path.is_empty() {
            for child in node.children() {
                if let NodeKind::Static {
                    label,
                    continues: false,
                } = child.kind()
                {
                    if let Some(after) = path.strip_prefix(label.as_str()) {
                        if let Some(found) = self.after_label(child, after, params) {
                            return Some(found);
                        }
                    }
                }
            }

            let (segment, after) = match path.find('/') {
                Some(i) => (&path[..i], &path[i..]),
                None => (path, ""),
            };
            if !segment.is_empty() {
                for child in node.children() {
                    if let NodeKind::Param { name } = child.kind() {
                        let mark = params.len();
                        params.push(name, segment);
                        if let Some(found) = self.after_label(child, after, params) {
                            return Some(found);
                        }
                        params.truncate(mark);
                    }
                }
            }
        }

        if let Some(found) = wildcard(node, path, params) {
            return Some(found);
        }

        match (path.is_empty(), self.mode) {
            (true, TrailingSlash::Lenient) => node.value(),
            _ => None,
        }
    }

    /// `rest` is what remains after `node`'s label was consumed.
    fn after_label<'t, T>(&self, node: &'t Node<T>, rest: &str, params: &mut Params) -> Option<&'t T> {
        if rest.is_empty() {
            return node.value();
        }
        if let Some(next) = rest.strip_prefix('/') {
            return self.segment(node, next, params);
        }

        // Still inside a segment: only split edges may carry on.
        node.children().iter().find_map(|child| match child.kind() {
            NodeKind::Static {
                label,
                continues: true,
            } => rest
                .strip_prefix(label.as_str())
                .and_then(|after| self.after_label(child, after, params)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::parse_pattern;

    fn tree(patterns: &[&'static str]) -> Node<&'static str> {
        let mut root = Node::root();
        for pattern in patterns {
            root.insert(&parse_pattern(pattern).unwrap(), *pattern).unwrap();
        }
        root.compile(&mut |p| p)
    }

    fn lookup(root: &Node<&'static str>, path: &str) -> Option<(&'static str, Params)> {
        let mut params = Params::new();
        find(root, path, TrailingSlash::Lenient, &mut params).map(|p| (*p, params))
    }

    #[test]
    fn test_static_routes() {
        let root = tree(&["/", "/users", "/users/new", "/about"]);
        assert_eq!(lookup(&root, "/").unwrap().0, "/");
        assert_eq!(lookup(&root, "/users").unwrap().0, "/users");
        assert_eq!(lookup(&root, "/users/new").unwrap().0, "/users/new");
        assert!(lookup(&root, "/users/old").is_none());
        assert!(lookup(&root, "/contact").is_none());
    }

    #[test]
    fn test_partial_segment_prefix_rejected() {
        let root = tree(&["/user", "/user/profile"]);
        assert!(lookup(&root, "/userz").is_none());
        assert_eq!(lookup(&root, "/user/profile").unwrap().0, "/user/profile");
    }

    #[test]
    fn test_split_edges_match_whole_segments() {
        let root = tree(&["/user", "/users", "/usa", "/us/:id"]);
        assert_eq!(lookup(&root, "/user").unwrap().0, "/user");
        assert_eq!(lookup(&root, "/users").unwrap().0, "/users");
        assert_eq!(lookup(&root, "/usa").unwrap().0, "/usa");
        assert!(lookup(&root, "/use").is_none());
        assert!(lookup(&root, "/us").is_none());

        let (pattern, params) = lookup(&root, "/us/7").unwrap();
        assert_eq!(pattern, "/us/:id");
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_param_capture() {
        let root = tree(&["/users/:id", "/a/:id/b/:name"]);
        let (_, params) = lookup(&root, "/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));

        let (_, params) = lookup(&root, "/a/123/b/john").unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("id", "123"), ("name", "john")]);
    }

    #[test]
    fn test_param_requires_non_empty_segment() {
        let mut root = Node::root();
        root.insert(&parse_pattern("/users/:id").unwrap(), "p").unwrap();
        let root = root.compile(&mut |p| p);
        let mut params = Params::new();
        assert!(find(&root, "/users/", TrailingSlash::Strict, &mut params).is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_static_beats_param_beats_wildcard() {
        let root = tree(&["/users/me", "/users/:id", "/users/*rest"]);
        assert_eq!(lookup(&root, "/users/me").unwrap().0, "/users/me");

        let (pattern, params) = lookup(&root, "/users/42").unwrap();
        assert_eq!(pattern, "/users/:id");
        assert_eq!(params.get("id"), Some("42"));

        let (pattern, params) = lookup(&root, "/users/42/posts").unwrap();
        assert_eq!(pattern, "/users/*rest");
        assert_eq!(params.get("rest"), Some("42/posts"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_backtracks_out_of_param_branch() {
        // `/api/:version/users` shares its first segment with the static
        // branch; the param branch must unwind when it dead-ends.
        let root = tree(&["/api/:version/users", "/api/v1/status", "/api/*rest"]);

        let (pattern, params) = lookup(&root, "/api/v1/status").unwrap();
        assert_eq!(pattern, "/api/v1/status");
        assert!(params.is_empty());

        let (pattern, params) = lookup(&root, "/api/v1/users").unwrap();
        assert_eq!(pattern, "/api/:version/users");
        assert_eq!(params.get("version"), Some("v1"));

        let (pattern, params) = lookup(&root, "/api/v2/other").unwrap();
        assert_eq!(pattern, "/api/*rest");
        assert_eq!(params.get("rest"), Some("v2/other"));
        assert_eq!(params.get("version"), None);
    }

    #[test]
    fn test_wildcard_captures_slashes() {
        let root = tree(&["/files/*path"]);
        let (_, params) = lookup(&root, "/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("path"), Some("a/b/c.txt"));

        let (_, params) = lookup(&root, "/files/").unwrap();
        assert_eq!(params.get("path"), Some(""));
        assert!(lookup(&root, "/file").is_none());
    }

    #[test]
    fn test_root_wildcard() {
        let root = tree(&["/*all"]);
        let (_, params) = lookup(&root, "/").unwrap();
        assert_eq!(params.get("all"), Some(""));
        let (_, params) = lookup(&root, "/x/y").unwrap();
        assert_eq!(params.get("all"), Some("x/y"));
    }

    #[test]
    fn test_trailing_slash_modes() {
        let root = tree(&["/users"]);
        let mut params = Params::new();
        assert_eq!(
            find(&root, "/users/", TrailingSlash::Lenient, &mut params),
            Some(&"/users")
        );
        assert_eq!(find(&root, "/users/", TrailingSlash::Strict, &mut params), None);
        assert_eq!(find(&root, "/users", TrailingSlash::Strict, &mut params), Some(&"/users"));
    }

    #[test]
    fn test_miss_keeps_existing_params() {
        let root = tree(&["/users/:id/posts"]);
        let mut params = Params::new();
        params.push(&"keep".into(), "me");
        assert!(find(&root, "/users/9/comments", TrailingSlash::Lenient, &mut params).is_none());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("keep"), Some("me"));
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let root = tree(&["/users/:name", "/files/*path"]);
        let (_, params) = lookup(&root, "/users/John%20Doe").unwrap();
        assert_eq!(params.get("name"), Some("John Doe"));

        let (_, params) = lookup(&root, "/files/r%C3%A9sum%C3%A9/a%2Fb").unwrap();
        assert_eq!(params.get("path"), Some("résumé/a/b"));
    }

    #[test]
    fn test_backtracking_rewinds_value_buffer() {
        let root = tree(&["/a/:x/:y/end", "/a/:x/*rest"]);
        let (pattern, params) = lookup(&root, "/a/one/two/other").unwrap();
        assert_eq!(pattern, "/a/:x/*rest");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("x", "one"), ("rest", "two/other")]);
    }

    #[test]
    fn test_clear_keeps_buffer_capacity() {
        let root = tree(&["/users/:id"]);
        let mut params = Params::new();
        find(&root, "/users/12345678", TrailingSlash::Lenient, &mut params).unwrap();
        let capacity = params.values.capacity();

        params.clear();
        assert!(params.is_empty());
        find(&root, "/users/87654321", TrailingSlash::Lenient, &mut params).unwrap();
        assert_eq!(params.values.capacity(), capacity);
        assert_eq!(params.get("id"), Some("87654321"));
    }
}
