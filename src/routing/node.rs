//! Radix tree nodes and insertion.
//!
//! # Responsibilities
//! - Store static, parameter and wildcard edges of one method's route tree
//! - Insert parsed patterns, splitting static edges on their longest common prefix
//! - Reject terminal and wildcard collisions
//! - Reorder children once at compile time
//!
//! # Design Decisions
//! - Static labels never contain `/`; a label either starts a new segment or,
//!   when produced by an edge split, continues the parent's segment
//! - Wildcards live out-of-band in their own leaf type, so they cannot have children
//! - The terminal payload is generic: `Arc<Route<H>>` while building, the
//!   composed endpoint once compiled

use std::sync::Arc;

use crate::routing::pattern::Segment;

/// Edge label of a non-wildcard node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Literal text. `continues` marks an edge created by splitting, whose text
    /// belongs to the same segment as its parent's label.
    Static { label: String, continues: bool },
    /// A single segment bound to `name`.
    Param { name: Arc<str> },
}

impl NodeKind {
    /// Lower sorts first: statics are tried before parameters.
    fn priority(&self) -> u8 {
        match self {
            NodeKind::Static { .. } => 0,
            NodeKind::Param { .. } => 1,
        }
    }
}

/// Catch-all leaf. Always terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard<T> {
    pub name: Arc<str>,
    pub value: T,
}

/// Insertion failed because the final slot is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTaken;

/// A node of a per-method radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<Node<T>>,
    pub(crate) wildcard: Option<Box<Wildcard<T>>>,
    pub(crate) value: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::root()
    }
}

impl<T> Node<T> {
    /// An empty root. Its (empty) label is never compared against the path.
    pub fn root() -> Self {
        Self::with_kind(NodeKind::Static {
            label: String::new(),
            continues: false,
        })
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            wildcard: None,
            value: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub fn wildcard(&self) -> Option<&Wildcard<T>> {
        self.wildcard.as_deref()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Number of terminal values in this subtree, wildcards included.
    pub fn route_count(&self) -> usize {
        usize::from(self.value.is_some())
            + usize::from(self.wildcard.is_some())
            + self.children.iter().map(Node::route_count).sum::<usize>()
    }

    /// Insert `segments` below this node, storing `value` at the end.
    ///
    /// A slot is only ever found occupied on a node that existed before this
    /// call: splitting or creating a node always leads into fresh, empty
    /// nodes. A `SlotTaken` result therefore leaves the tree untouched.
    pub fn insert(&mut self, segments: &[Segment<'_>], value: T) -> Result<(), SlotTaken> {
        match segments.split_first() {
            None => {
                if self.value.is_some() {
                    return Err(SlotTaken);
                }
                self.value = Some(value);
                Ok(())
            }
            Some((Segment::Static(text), rest)) => self.insert_static(text, false, rest, value),
            Some((Segment::Param(name), rest)) => {
                let existing = self.children.iter().position(
                    |child| matches!(&child.kind, NodeKind::Param { name: n } if &**n == *name),
                );
                let index = match existing {
                    Some(index) => index,
                    None => {
                        self.children.push(Self::with_kind(NodeKind::Param {
                            name: Arc::from(*name),
                        }));
                        self.children.len() - 1
                    }
                };
                self.children[index].insert(rest, value)
            }
            Some((Segment::Wildcard(name), _)) => {
                if self.wildcard.is_some() {
                    return Err(SlotTaken);
                }
                self.wildcard = Some(Box::new(Wildcard {
                    name: Arc::from(*name),
                    value,
                }));
                Ok(())
            }
        }
    }

    /// Insert the static text `text` as a child edge of class `continues`,
    /// then the remaining segments below it.
    fn insert_static(
        &mut self,
        text: &str,
        continues: bool,
        rest: &[Segment<'_>],
        value: T,
    ) -> Result<(), SlotTaken> {
        let candidate = self
            .children
            .iter()
            .enumerate()
            .find_map(|(index, child)| match &child.kind {
                NodeKind::Static { label, continues: c } if *c == continues => {
                    let common = common_prefix(label, text);
                    (common > 0).then_some((index, common))
                }
                _ => None,
            });

        let Some((index, common)) = candidate else {
            let mut node = Self::with_kind(NodeKind::Static {
                label: text.to_string(),
                continues,
            });
            let result = node.insert(rest, value);
            self.children.push(node);
            return result;
        };

        let child = &mut self.children[index];
        child.split_at(common);

        if common == text.len() {
            child.insert(rest, value)
        } else {
            child.insert_static(&text[common..], true, rest, value)
        }
    }

    /// Shorten a static label to `at` bytes, moving everything the node owned
    /// into a new continuation child holding the rest of the label.
    fn split_at(&mut self, at: usize) {
        let NodeKind::Static { label, .. } = &mut self.kind else {
            return;
        };
        if at >= label.len() {
            return;
        }

        let tail = label.split_off(at);
        let moved = Node {
            kind: NodeKind::Static {
                label: tail,
                continues: true,
            },
            children: std::mem::take(&mut self.children),
            wildcard: self.wildcard.take(),
            value: self.value.take(),
        };
        self.children.push(moved);
    }

    /// Freeze the subtree: order children by priority and convert every
    /// terminal value with `f`.
    pub fn compile<U>(self, f: &mut impl FnMut(T) -> U) -> Node<U> {
        let mut children: Vec<Node<U>> =
            self.children.into_iter().map(|child| child.compile(f)).collect();
        // Stable: siblings of equal priority keep registration order.
        children.sort_by_key(|child| child.kind.priority());
        children.shrink_to_fit();

        Node {
            kind: self.kind,
            children,
            wildcard: self.wildcard.map(|w| {
                Box::new(Wildcard {
                    name: w.name,
                    value: f(w.value),
                })
            }),
            value: self.value.map(f),
        }
    }
}

/// Length in bytes of the longest common prefix, on a char boundary.
fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::parse_pattern;

    fn insert(root: &mut Node<&'static str>, pattern: &'static str) -> Result<(), SlotTaken> {
        root.insert(&parse_pattern(pattern).unwrap(), pattern)
    }

    fn static_label<T>(node: &Node<T>) -> (&str, bool) {
        match &node.kind {
            NodeKind::Static { label, continues } => (label.as_str(), *continues),
            NodeKind::Param { name } => panic!("expected static node, got param {name}"),
        }
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix("users", "user"), 4);
        assert_eq!(common_prefix("users", "usa"), 2);
        assert_eq!(common_prefix("abc", "xyz"), 0);
        assert_eq!(common_prefix("héllo", "hélp"), 4);
    }

    #[test]
    fn test_split_on_divergence() {
        let mut root = Node::root();
        insert(&mut root, "/users").unwrap();
        insert(&mut root, "/usa").unwrap();

        assert_eq!(root.children.len(), 1);
        let us = &root.children[0];
        assert_eq!(static_label(us), ("us", false));
        assert!(us.value.is_none());

        let labels: Vec<_> = us.children.iter().map(static_label).collect();
        assert_eq!(labels, vec![("ers", true), ("a", true)]);
        assert_eq!(us.children[0].value, Some("/users"));
        assert_eq!(us.children[1].value, Some("/usa"));
    }

    #[test]
    fn test_prefix_extension_becomes_continuation() {
        let mut root = Node::root();
        insert(&mut root, "/user").unwrap();
        insert(&mut root, "/users").unwrap();
        insert(&mut root, "/user/profile").unwrap();

        let user = &root.children[0];
        assert_eq!(static_label(user), ("user", false));
        assert_eq!(user.value, Some("/user"));
        let labels: Vec<_> = user.children.iter().map(static_label).collect();
        assert_eq!(labels, vec![("s", true), ("profile", false)]);
    }

    #[test]
    fn test_split_moves_wildcard_and_children() {
        let mut root = Node::root();
        insert(&mut root, "/files/*path").unwrap();
        insert(&mut root, "/files/:id/meta").unwrap();
        insert(&mut root, "/fi").unwrap();

        let fi = &root.children[0];
        assert_eq!(static_label(fi), ("fi", false));
        assert_eq!(fi.value, Some("/fi"));
        let les = &fi.children[0];
        assert_eq!(static_label(les), ("les", true));
        assert_eq!(les.wildcard().map(|w| w.value), Some("/files/*path"));
        assert!(matches!(les.children[0].kind, NodeKind::Param { .. }));
    }

    #[test]
    fn test_param_children_reused_by_name_only() {
        let mut root = Node::root();
        insert(&mut root, "/users/:id").unwrap();
        insert(&mut root, "/users/:id/posts").unwrap();
        insert(&mut root, "/users/:name/tags").unwrap();

        let users = &root.children[0];
        assert_eq!(users.children.len(), 2);
    }

    #[test]
    fn test_conflicts_leave_tree_untouched() {
        let mut root = Node::root();
        insert(&mut root, "/users/:id").unwrap();
        insert(&mut root, "/files/*path").unwrap();
        let before = root.clone();

        assert_eq!(insert(&mut root, "/users/:id"), Err(SlotTaken));
        assert_eq!(insert(&mut root, "/files/*other"), Err(SlotTaken));
        assert_eq!(root, before);
    }

    #[test]
    fn test_compile_orders_static_before_param() {
        let mut root = Node::root();
        insert(&mut root, "/users/:id").unwrap();
        insert(&mut root, "/users/me").unwrap();

        let compiled = root.compile(&mut |pattern| pattern.len());
        let users = &compiled.children[0];
        assert!(matches!(users.children[0].kind, NodeKind::Static { .. }));
        assert!(matches!(users.children[1].kind, NodeKind::Param { .. }));
        assert_eq!(users.children[1].value, Some("/users/:id".len()));
        assert_eq!(compiled.route_count(), 2);
    }
}
