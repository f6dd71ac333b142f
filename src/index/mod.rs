//! Ordered title index.
//!
//! An unbalanced binary search tree of [`Track`]s keyed by title. Placement
//! uses ordinal (codepoint, case-sensitive) comparison; lookup descends by the
//! same comparison but accepts the first node on the path whose title is
//! case-insensitively equal to the query.
//!
//! There is no rebalancing: titles inserted in sorted order produce a tree of
//! depth `n`. All walks are iterative so that depth never turns into call-stack
//! depth.

use std::cmp::Ordering;

use crate::models::Track;

struct Node {
    track: Track,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(track: Track) -> Self {
        Self {
            track,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree of tracks keyed by title
#[derive(Default)]
pub struct TitleIndex {
    root: Option<Box<Node>>,
    len: usize,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track. A track whose title is ordinally equal to one already
    /// present is discarded and the existing node is kept as is.
    ///
    /// Returns `true` when a node was added.
    pub fn insert(&mut self, track: Track) -> bool {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            match track.title().cmp(node.track.title()) {
                Ordering::Less => slot = &mut node.left,
                Ordering::Greater => slot = &mut node.right,
                Ordering::Equal => return false,
            }
        }

        *slot = Some(Box::new(Node::new(track)));
        self.len += 1;
        true
    }

    /// Look up a track by title.
    ///
    /// Every node on the descent path is tested for a case-insensitive match
    /// before the next branch is taken; the branch itself is chosen by ordinal
    /// comparison (strictly less goes left, anything else goes right). A
    /// case variant stored on the branch the ordinal path never visits is
    /// therefore not found.
    pub fn search(&self, title: &str) -> Option<&Track> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            if node.track.title_matches(title) {
                return Some(&node.track);
            }

            cursor = if title < node.track.title() {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
        }
        None
    }

    /// All tracks in ascending ordinal title order
    pub fn traverse(&self) -> Vec<Track> {
        self.iter().cloned().collect()
    }

    /// Borrowing in-order iterator
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path (0 for an empty tree)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }

        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
        }
        height
    }
}

impl Drop for TitleIndex {
    // Unlink iteratively; the default recursive drop would follow a degenerate
    // tree all the way down the call stack.
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl<'a> IntoIterator for &'a TitleIndex {
    type Item = &'a Track;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a [`TitleIndex`], holding at most `height` nodes
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Track;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.track)
    }
}
