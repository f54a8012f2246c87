//! Mergeable forest heap
//!
//! A forest of merge trees (binomial trees) filed by rank in a fixed-size
//! rank ledger. Each ledger slot holds up to two roots, a *primary* and an
//! *overflow*. Writing a second root into a slot marks it for consolidation,
//! which links pairs of equal rank and carries the result one rank up,
//! exactly like incrementing a binary counter.
//!
//! # Algorithm Overview
//!
//! - **Insert**: plant a rank-0 tree; if rank 0 is taken it becomes the
//!   overflow and consolidation runs.
//! - **Consolidation**: scan ranks upwards, linking any two roots found at the
//!   same rank and carrying the product to the next rank. Afterwards every
//!   rank holds at most one root.
//! - **Delete-min**: remove the smallest root; its children (ranks
//!   `0..r`) are filed back into the ledger and consolidated.
//! - **Decrease-key**: lower the key in place and swap payloads with ancestors
//!   until heap order holds. Tree shape never changes.
//! - **Increase-key**: promote the element's payload to its root, extract it
//!   like a minimum, then insert it again with the new key.
//!
//! An element-to-node map is rewritten on every payload swap, extraction and
//! meld, so key changes always find the node that actually holds the element.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity         |
//! |----------------|--------------------|
//! | `insert`       | O(1) amortized     |
//! | `find_min`     | O(1)               |
//! | `delete_min`   | O(log n)           |
//! | `decrease_key` | O(log n)           |
//! | `increase_key` | O(log n)           |
//! | `meld`         | O(m + log n)       |
//!
//! # Example
//!
//! ```rust
//! use keyed_heaps::forest::MergeableForestHeap;
//! use keyed_heaps::PriorityQueue;
//!
//! let mut heap = MergeableForestHeap::new();
//! for i in 0..8 {
//!     heap.insert(i, i).unwrap();
//! }
//! heap.decrease_key(&5, -1).unwrap();
//! assert_eq!(heap.delete_min(), Some((5, -1)));
//! assert_eq!(heap.delete_min(), Some((0, 0)));
//! ```

use crate::merge_tree::{TreeArena, TreeKey};
use crate::rank::{slot, MAX_RANK};
use crate::traits::{Handle, HeapError, PriorityQueue};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace};

/// Roots filed under one rank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RankSlot {
    primary: Option<TreeKey>,
    overflow: Option<TreeKey>,
}

impl RankSlot {
    const EMPTY: RankSlot = RankSlot {
        primary: None,
        overflow: None,
    };

    fn roots(&self) -> impl Iterator<Item = TreeKey> {
        self.primary.into_iter().chain(self.overflow)
    }
}

/// Fixed-capacity table of roots indexed by rank
#[derive(Debug, Clone)]
struct RankLedger {
    slots: [RankSlot; MAX_RANK],
}

impl Default for RankLedger {
    fn default() -> Self {
        Self {
            slots: [RankSlot::EMPTY; MAX_RANK],
        }
    }
}

impl RankLedger {
    fn roots(&self) -> impl Iterator<Item = TreeKey> + '_ {
        self.slots.iter().flat_map(|entry| entry.roots())
    }

    /// Clears whichever slot at `rank` holds `root`
    fn vacate(&mut self, rank: usize, root: TreeKey) {
        let entry = &mut self.slots[rank];
        if entry.primary == Some(root) {
            entry.primary = entry.overflow.take();
        } else if entry.overflow == Some(root) {
            entry.overflow = None;
        }
    }
}

/// Mergeable forest heap
pub struct MergeableForestHeap<E, K> {
    arena: TreeArena<E, K>,
    ledger: RankLedger,
    /// Element to the node currently holding it
    locations: FxHashMap<E, TreeKey>,
    /// Root with the smallest key
    min: Option<TreeKey>,
}

impl<E, K> PriorityQueue<E, K> for MergeableForestHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    fn new() -> Self {
        Self {
            arena: TreeArena::new(),
            ledger: RankLedger::default(),
            locations: FxHashMap::default(),
            min: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    /// Files a fresh rank-0 tree, consolidating if rank 0 was occupied
    fn insert(&mut self, element: E, key: K) -> Result<Handle<E>, HeapError> {
        if self.locations.contains_key(&element) {
            debug!(operation = "insert", "rejected duplicate element");
            return Err(HeapError::DuplicateElement);
        }
        let handle = Handle::new(element.clone());
        let tree = self.arena.plant(element.clone(), key);
        self.locations.insert(element, tree);

        let needs_rebuild = self.stage(tree);
        if needs_rebuild {
            self.rebuild();
            self.refresh_min();
        } else {
            self.update_min_if_needed(tree);
        }
        Ok(handle)
    }

    fn find_min(&self) -> Option<(&E, &K)> {
        let node = self.arena.get(self.min?)?;
        Some((node.element(), node.key()))
    }

    /// Removes the smallest root and files its children back into the ledger
    fn delete_min(&mut self) -> Option<(E, K)> {
        let root = self.min?;
        self.remove_root(root)
    }

    fn decrease_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError> {
        let node = self.locate(element)?;
        if self.arena.key(node).is_some_and(|current| new_key > *current) {
            debug!(operation = "decrease_key", "rejected key moving upwards");
            return Err(HeapError::InvalidKey);
        }
        self.arena.set_key(node, new_key);

        let locations = &mut self.locations;
        let settled = self.arena.bubble_up(node, |moved, at| {
            if let Some(location) = locations.get_mut(moved) {
                *location = at;
            }
        });
        self.update_min_if_needed(settled);
        Ok(())
    }

    /// Removes the element and inserts it again under `new_key`
    fn increase_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError> {
        let node = self.locate(element)?;
        if self.arena.key(node).is_some_and(|current| new_key < *current) {
            debug!(operation = "increase_key", "rejected key moving downwards");
            return Err(HeapError::InvalidKey);
        }
        let (element, _) = self.remove_node(node).ok_or(HeapError::NotFound)?;
        self.insert(element, new_key)?;
        Ok(())
    }

    fn contains(&self, element: &E) -> bool {
        self.locations.contains_key(element)
    }

    fn key_of(&self, element: &E) -> Option<&K> {
        self.arena.key(*self.locations.get(element)?)
    }
}

impl<E, K> MergeableForestHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    /// Removes `element` regardless of its position, returning it with its key
    ///
    /// # Errors
    /// Returns [`HeapError::NotFound`] if the element is not in the heap.
    pub fn remove(&mut self, element: &E) -> Result<(E, K), HeapError> {
        let node = self.locate(element)?;
        self.remove_node(node).ok_or(HeapError::NotFound)
    }

    /// Moves every element of `other` into this heap, leaving `other` empty
    ///
    /// Trees keep their shape; the two ledgers are combined and consolidated.
    ///
    /// # Errors
    /// Returns [`HeapError::DuplicateElement`] if the heaps share an element.
    /// Neither heap is modified in that case.
    pub fn meld(&mut self, other: &mut Self) -> Result<(), HeapError> {
        if other.locations.keys().any(|e| self.locations.contains_key(e)) {
            debug!(operation = "meld", "rejected overlapping element sets");
            return Err(HeapError::DuplicateElement);
        }
        trace!(
            incoming = other.len(),
            existing = self.len(),
            "melding forest heaps"
        );

        let incoming: SmallVec<[TreeKey; 16]> = other.ledger.roots().collect();
        let mut planted: SmallVec<[TreeKey; 16]> = SmallVec::new();
        {
            let locations = &mut self.locations;
            let mut relocate = |moved: &E, at: TreeKey| {
                locations.insert(moved.clone(), at);
            };
            for root in incoming {
                if let Some(new_root) = self.arena.transplant(&mut other.arena, root, &mut relocate)
                {
                    planted.push(new_root);
                }
            }
        }
        for root in planted {
            self.stage(root);
        }

        other.ledger = RankLedger::default();
        other.locations.clear();
        other.min = None;

        self.rebuild();
        self.refresh_min();
        Ok(())
    }

    /// Free-standing roots in rank order
    pub fn roots(&self) -> impl Iterator<Item = TreeKey> + '_ {
        self.ledger.roots()
    }

    /// Read access to the tree nodes
    pub fn arena(&self) -> &TreeArena<E, K> {
        &self.arena
    }

    fn locate(&self, element: &E) -> Result<TreeKey, HeapError> {
        match self.locations.get(element) {
            Some(&node) => Ok(node),
            None => {
                debug!("key change on element not in heap");
                Err(HeapError::NotFound)
            }
        }
    }

    /// Files a free-standing root under its rank
    ///
    /// Goes to the primary slot if free, else the overflow. A slot that is
    /// already full links its overflow with `tree` and carries the product
    /// upwards. Returns true when consolidation is needed.
    fn stage(&mut self, tree: TreeKey) -> bool {
        let Some(rank) = self.arena.rank(tree).map(slot) else {
            return false;
        };
        let entry = &mut self.ledger.slots[rank];
        match (entry.primary, entry.overflow) {
            (None, _) => {
                entry.primary = Some(tree);
                false
            }
            (Some(_), None) => {
                entry.overflow = Some(tree);
                true
            }
            (Some(_), Some(overflow)) => {
                entry.overflow = None;
                trace!(rank, "slot full while staging, carrying");
                let carried = self.link(overflow, tree);
                self.stage(carried);
                true
            }
        }
    }

    /// Consolidates the ledger so every rank holds at most one root
    ///
    /// **Time Complexity**: O(MAX_RANK), one left-to-right pass
    ///
    /// A rank holding two roots links them (the primary is the left operand)
    /// and carries the product to the next rank. A rank that receives a carry
    /// while still holding a primary links those two in turn, like binary
    /// addition with carry.
    fn rebuild(&mut self) {
        let mut carry: Option<TreeKey> = None;
        for rank in 0..MAX_RANK {
            let entry = self.ledger.slots[rank];
            let mut trees: SmallVec<[TreeKey; 3]> = entry.roots().collect();
            trees.extend(carry.take());
            self.ledger.slots[rank] = RankSlot::EMPTY;

            if trees.len() >= 2 {
                let left = trees.remove(0);
                let right = trees.remove(0);
                trace!(rank, "linking equal-rank roots");
                carry = Some(self.link(left, right));
            }
            self.ledger.slots[rank].primary = trees.pop();
        }
        assert!(carry.is_none(), "rank overflow");
    }

    /// Links two roots filed under the same rank
    fn link(&mut self, left: TreeKey, right: TreeKey) -> TreeKey {
        self.arena
            .merge(left, right)
            .expect("roots filed under one rank share that rank")
    }

    /// Removes an arbitrary node by promoting its payload to the root first
    fn remove_node(&mut self, node: TreeKey) -> Option<(E, K)> {
        let locations = &mut self.locations;
        let root = self.arena.promote_to_root(node, |moved, at| {
            if let Some(location) = locations.get_mut(moved) {
                *location = at;
            }
        });
        self.remove_root(root)
    }

    /// Extracts a root, refiles its children and restores canonical form
    fn remove_root(&mut self, root: TreeKey) -> Option<(E, K)> {
        let rank = slot(self.arena.rank(root)?);
        let extracted = self.arena.extract_root(root)?;
        self.ledger.vacate(rank, root);
        self.locations.remove(&extracted.element);

        for child in extracted.children {
            self.stage(child);
        }
        self.rebuild();
        self.refresh_min();
        Some((extracted.element, extracted.key))
    }

    fn update_min_if_needed(&mut self, node: TreeKey) {
        if self.arena.parent(node).is_some() {
            return;
        }
        let smaller = match (self.min.and_then(|m| self.arena.key(m)), self.arena.key(node)) {
            (Some(current), Some(candidate)) => candidate < current,
            (None, Some(_)) => true,
            _ => false,
        };
        if smaller {
            self.min = Some(node);
        }
    }

    /// Scans every root for the smallest key; ties go to the lowest rank
    fn refresh_min(&mut self) {
        let mut best: Option<TreeKey> = None;
        for root in self.ledger.roots() {
            let better = match best {
                None => true,
                Some(b) => self.arena.key(root) < self.arena.key(b),
            };
            if better {
                best = Some(root);
            }
        }
        self.min = best;
    }
}

impl<E, K> Default for MergeableForestHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    fn default() -> Self {
        <Self as PriorityQueue<E, K>>::new()
    }
}

impl<E: fmt::Debug, K: fmt::Debug> fmt::Debug for MergeableForestHeap<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeableForestHeap")
            .field("len", &self.locations.len())
            .field("roots", &self.ledger.roots().collect::<Vec<_>>())
            .field("arena", &self.arena)
            .finish()
    }
}

/// Renders every tree in rank order, one tree level per line
impl<E: fmt::Display, K: fmt::Display + Ord> fmt::Display for MergeableForestHeap<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, root) in self.ledger.roots().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", self.arena.display(root))?;
        }
        f.write_str("}")
    }
}
