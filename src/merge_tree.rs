//! Merge trees: rank-labelled binomial trees stored in a slotmap arena
//!
//! A merge tree of rank `r` has exactly `r` children whose ranks are
//! `0, 1, ..., r-1` in that order, and every node's key is no greater than the
//! keys in its subtree. The only way to grow a tree is [`TreeArena::merge`],
//! which links two trees of equal rank into one of rank `r + 1`.
//!
//! # Ownership
//!
//! All nodes of all trees live in one [`TreeArena`]. A node owns its children
//! (their keys are listed in `children`), while `parent` is a plain
//! [`TreeKey`] back-reference that never keeps anything alive. Keys are
//! generational, so a key for a node that was extracted simply stops resolving.
//!
//! # Example
//!
//! ```rust
//! use keyed_heaps::merge_tree::TreeArena;
//!
//! let mut arena = TreeArena::new();
//! let a = arena.plant("a", 3);
//! let b = arena.plant("b", 1);
//! let root = arena.merge(a, b).unwrap();
//! assert_eq!(root, b);
//! assert_eq!(arena.rank(root), Some(1));
//! assert_eq!(arena.children(root), &[a]);
//! ```

use crate::rank::{checked_increment, Rank};
use crate::traits::HeapError;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;

new_key_type! {
    /// Arena key identifying one merge tree node
    pub struct TreeKey;
}

/// Child list of a node; ranks up to 8 stay inline
pub type Children = SmallVec<[TreeKey; 8]>;

/// A single merge tree node
#[derive(Debug, Clone)]
pub struct TreeNode<E, K> {
    element: E,
    key: K,
    rank: Rank,
    /// Back-reference for decrease-key bubbling (None for roots)
    parent: Option<TreeKey>,
    /// Children in increasing rank order; the newest child is last
    children: Children,
}

impl<E, K> TreeNode<E, K> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn parent(&self) -> Option<TreeKey> {
        self.parent
    }

    pub fn children(&self) -> &[TreeKey] {
        &self.children
    }
}

/// Payload and orphaned children of an extracted root
#[derive(Debug)]
pub struct Extracted<E, K> {
    pub element: E,
    pub key: K,
    /// Former children, now free-standing roots of ranks `0..rank`
    pub children: Children,
}

/// Arena holding the nodes of any number of merge trees
#[derive(Debug, Clone)]
pub struct TreeArena<E, K> {
    nodes: SlotMap<TreeKey, TreeNode<E, K>>,
}

impl<E, K> Default for TreeArena<E, K> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<E, K: Ord> TreeArena<E, K> {
    /// Creates an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes across all trees
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a free-standing rank-0 tree
    pub fn plant(&mut self, element: E, key: K) -> TreeKey {
        self.nodes.insert(TreeNode {
            element,
            key,
            rank: 0,
            parent: None,
            children: Children::new(),
        })
    }

    pub fn get(&self, tree: TreeKey) -> Option<&TreeNode<E, K>> {
        self.nodes.get(tree)
    }

    pub fn contains(&self, tree: TreeKey) -> bool {
        self.nodes.contains_key(tree)
    }

    pub fn element(&self, tree: TreeKey) -> Option<&E> {
        self.nodes.get(tree).map(|n| &n.element)
    }

    pub fn key(&self, tree: TreeKey) -> Option<&K> {
        self.nodes.get(tree).map(|n| &n.key)
    }

    pub fn rank(&self, tree: TreeKey) -> Option<Rank> {
        self.nodes.get(tree).map(|n| n.rank)
    }

    pub fn parent(&self, tree: TreeKey) -> Option<TreeKey> {
        self.nodes.get(tree).and_then(|n| n.parent)
    }

    /// Children of `tree` in increasing rank order (empty for unknown keys)
    pub fn children(&self, tree: TreeKey) -> &[TreeKey] {
        self.nodes
            .get(tree)
            .map_or(&[][..], |n| n.children.as_slice())
    }

    /// Walks parent links up to the root of the tree containing `node`
    pub fn root_of(&self, node: TreeKey) -> TreeKey {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Links two free-standing trees of equal rank into one tree of rank + 1
    ///
    /// **Time Complexity**: O(1)
    ///
    /// The root with the smaller key survives and adopts the other root as its
    /// newest (last) child. On equal keys `left` survives. No payload moves.
    ///
    /// # Errors
    /// - [`HeapError::RankMismatch`] if the two ranks differ
    /// - [`HeapError::NotFound`] if either key does not resolve
    pub fn merge(&mut self, left: TreeKey, right: TreeKey) -> Result<TreeKey, HeapError> {
        let (left_rank, right_rank, left_wins) = {
            let l = self.nodes.get(left).ok_or(HeapError::NotFound)?;
            let r = self.nodes.get(right).ok_or(HeapError::NotFound)?;
            (l.rank, r.rank, l.key <= r.key)
        };
        if left_rank != right_rank {
            return Err(HeapError::RankMismatch {
                left: left_rank,
                right: right_rank,
            });
        }
        debug_assert_ne!(left, right, "cannot merge a tree with itself");
        debug_assert!(self.parent(left).is_none() && self.parent(right).is_none());

        let (root, child) = if left_wins { (left, right) } else { (right, left) };

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(root);
        }
        if let Some(root_node) = self.nodes.get_mut(root) {
            root_node.children.push(child);
            root_node.rank = checked_increment(root_node.rank);
        }
        Ok(root)
    }

    /// Removes a root from the arena, orphaning its children
    ///
    /// Each returned child is a valid free-standing tree of its own rank; its
    /// parent link is cleared here. Returns `None` if `root` is unknown or is
    /// not a root.
    pub fn extract_root(&mut self, root: TreeKey) -> Option<Extracted<E, K>> {
        if self.nodes.get(root)?.parent.is_some() {
            return None;
        }
        let node = self.nodes.remove(root)?;
        for &child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        Some(Extracted {
            element: node.element,
            key: node.key,
            children: node.children,
        })
    }

    /// Replaces the key of `node` without restoring heap order
    pub(crate) fn set_key(&mut self, node: TreeKey, key: K) -> Option<K> {
        self.nodes
            .get_mut(node)
            .map(|n| std::mem::replace(&mut n.key, key))
    }

    /// Moves the payload of `node` up while its parent has a strictly larger key
    ///
    /// Tree shape never changes: element and key are swapped with the parent's.
    /// `relocate` is called with every element whose node changed, so callers
    /// can keep element-to-node maps in step. Returns the node that finally
    /// holds the payload.
    pub fn bubble_up(&mut self, node: TreeKey, relocate: impl FnMut(&E, TreeKey)) -> TreeKey {
        self.sift_up(node, false, relocate)
    }

    /// Moves the payload of `node` all the way to the root of its tree
    ///
    /// Used to remove an arbitrary element: once its payload sits at the root
    /// it can be extracted like a minimum. The displaced ancestors shift down
    /// one level each, which keeps heap order among them.
    pub fn promote_to_root(
        &mut self,
        node: TreeKey,
        relocate: impl FnMut(&E, TreeKey),
    ) -> TreeKey {
        self.sift_up(node, true, relocate)
    }

    fn sift_up(
        &mut self,
        node: TreeKey,
        force: bool,
        mut relocate: impl FnMut(&E, TreeKey),
    ) -> TreeKey {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            let Some([child_node, parent_node]) = self.nodes.get_disjoint_mut([current, parent])
            else {
                break;
            };
            if !force && child_node.key >= parent_node.key {
                break;
            }
            std::mem::swap(&mut child_node.key, &mut parent_node.key);
            std::mem::swap(&mut child_node.element, &mut parent_node.element);
            relocate(&child_node.element, current);
            relocate(&parent_node.element, parent);
            current = parent;
        }
        current
    }

    /// Moves a whole tree out of `source` into this arena
    ///
    /// Shape, ranks and payloads are preserved; `relocate` receives every
    /// element together with its new node key. Returns the new root key.
    pub fn transplant(
        &mut self,
        source: &mut TreeArena<E, K>,
        root: TreeKey,
        relocate: &mut impl FnMut(&E, TreeKey),
    ) -> Option<TreeKey> {
        let node = source.nodes.remove(root)?;
        let new_root = self.nodes.insert(TreeNode {
            element: node.element,
            key: node.key,
            rank: node.rank,
            parent: None,
            children: Children::new(),
        });
        for child in node.children {
            if let Some(new_child) = self.transplant(source, child, relocate) {
                if let Some(child_node) = self.nodes.get_mut(new_child) {
                    child_node.parent = Some(new_root);
                }
                if let Some(root_node) = self.nodes.get_mut(new_root) {
                    root_node.children.push(new_child);
                }
            }
        }
        if let Some(root_node) = self.nodes.get(new_root) {
            relocate(&root_node.element, new_root);
        }
        Some(new_root)
    }

    /// Renders the tree rooted at `root` one level per line
    pub fn display(&self, root: TreeKey) -> TreeDisplay<'_, E, K> {
        TreeDisplay { arena: self, root }
    }
}

/// Level-order rendering of one merge tree, see [`TreeArena::display`]
pub struct TreeDisplay<'a, E, K> {
    arena: &'a TreeArena<E, K>,
    root: TreeKey,
}

impl<E: fmt::Display, K: fmt::Display + Ord> fmt::Display for TreeDisplay<'_, E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut level: VecDeque<TreeKey> = VecDeque::new();
        if self.arena.contains(self.root) {
            level.push_back(self.root);
        }
        f.write_str("{")?;
        let mut first_line = true;
        while !level.is_empty() {
            if !first_line {
                f.write_str("\n")?;
            }
            first_line = false;
            let mut next = VecDeque::new();
            let mut first = true;
            while let Some(tree) = level.pop_front() {
                let Some(node) = self.arena.get(tree) else {
                    continue;
                };
                if !first {
                    f.write_str(" ")?;
                }
                first = false;
                write!(f, "*B{}({}, {})", node.rank, node.element, node.key)?;
                next.extend(node.children.iter().copied());
            }
            level = next;
        }
        f.write_str("}")
    }
}
