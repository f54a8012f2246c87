//! Indexed d-ary heap
//!
//! An array-backed min-heap with configurable fan-out `d` whose elements can be
//! re-keyed in place. A side map from element to array slot turns
//! `decrease_key` / `increase_key` into a hash lookup followed by a sift,
//! instead of a linear search.
//!
//! # Layout
//!
//! Slot `0` is the root. The parent of slot `i` is `(i - 1) / d` and its
//! children are slots `d*i + 1 ..= d*i + d`. Larger `d` gives a shallower tree
//! (cheaper inserts and decrease-key) at the cost of scanning more children
//! on the way down.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity        |
//! |----------------|-------------------|
//! | `insert`       | O(log_d n)        |
//! | `find_min`     | O(1)              |
//! | `delete_min`   | O(d log_d n)      |
//! | `decrease_key` | O(log_d n)        |
//! | `increase_key` | O(d log_d n)      |
//!
//! # Example
//!
//! ```rust
//! use keyed_heaps::dary::IndexedDHeap;
//! use keyed_heaps::PriorityQueue;
//!
//! let mut heap = IndexedDHeap::with_arity(3).unwrap();
//! heap.insert('a', 5).unwrap();
//! heap.insert('b', 2).unwrap();
//! heap.insert('c', 8).unwrap();
//! heap.increase_key(&'b', 9).unwrap();
//! assert_eq!(heap.delete_min(), Some(('a', 5)));
//! assert_eq!(heap.delete_min(), Some(('c', 8)));
//! assert_eq!(heap.delete_min(), Some(('b', 9)));
//! assert_eq!(heap.delete_min(), None);
//! ```

use crate::traits::{Handle, HeapError, PriorityQueue};
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Fan-out used by [`IndexedDHeap::new`]
pub const DEFAULT_ARITY: usize = 4;

/// One heap slot
///
/// Invariant: `heap[node.position]` is this node.
#[derive(Debug, Clone)]
struct HeapNode<E, K> {
    element: E,
    key: K,
    position: usize,
}

/// Indexed d-ary min-heap
pub struct IndexedDHeap<E, K> {
    heap: Vec<HeapNode<E, K>>,
    arity: usize,
    /// Element to slot; rewritten on every swap
    positions: FxHashMap<E, usize>,
}

impl<E, K> PriorityQueue<E, K> for IndexedDHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    fn new() -> Self {
        Self {
            heap: Vec::new(),
            arity: DEFAULT_ARITY,
            positions: FxHashMap::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    /// Appends a new node in the last slot and bubbles it up
    fn insert(&mut self, element: E, key: K) -> Result<Handle<E>, HeapError> {
        if self.positions.contains_key(&element) {
            debug!(operation = "insert", "rejected duplicate element");
            return Err(HeapError::DuplicateElement);
        }
        let position = self.heap.len();
        self.positions.insert(element.clone(), position);
        let handle = Handle::new(element.clone());
        self.heap.push(HeapNode {
            element,
            key,
            position,
        });
        self.bubble_up(position);
        Ok(handle)
    }

    fn find_min(&self) -> Option<(&E, &K)> {
        self.heap.first().map(|node| (&node.element, &node.key))
    }

    /// Swaps the root into the last slot, removes it, and bubbles the
    /// relocated node down from the root
    fn delete_min(&mut self) -> Option<(E, K)> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);
        let node = self.heap.pop()?;
        self.positions.remove(&node.element);
        if !self.heap.is_empty() {
            self.bubble_down(0);
        }
        Some((node.element, node.key))
    }

    fn decrease_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError> {
        let position = self.locate(element)?;
        let node = &mut self.heap[position];
        if new_key > node.key {
            debug!(operation = "decrease_key", "rejected key moving upwards");
            return Err(HeapError::InvalidKey);
        }
        node.key = new_key;
        self.bubble_up(position);
        Ok(())
    }

    fn increase_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError> {
        let position = self.locate(element)?;
        let node = &mut self.heap[position];
        if new_key < node.key {
            debug!(operation = "increase_key", "rejected key moving downwards");
            return Err(HeapError::InvalidKey);
        }
        node.key = new_key;
        self.bubble_down(position);
        Ok(())
    }

    fn contains(&self, element: &E) -> bool {
        self.positions.contains_key(element)
    }

    fn key_of(&self, element: &E) -> Option<&K> {
        let position = *self.positions.get(element)?;
        self.heap.get(position).map(|node| &node.key)
    }
}

impl<E, K> IndexedDHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    /// Creates an empty heap where every node has up to `arity` children
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidArity`] if `arity` is zero.
    pub fn with_arity(arity: usize) -> Result<Self, HeapError> {
        Self::with_capacity(arity, 0)
    }

    /// Creates an empty heap with room for `capacity` elements
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidArity`] if `arity` is zero.
    pub fn with_capacity(arity: usize, capacity: usize) -> Result<Self, HeapError> {
        if arity == 0 {
            return Err(HeapError::InvalidArity(arity));
        }
        let mut positions = FxHashMap::default();
        positions.reserve(capacity);
        Ok(Self {
            heap: Vec::with_capacity(capacity),
            arity,
            positions,
        })
    }

    /// Fan-out of this heap
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Current array slot of `element`
    pub fn position_of(&self, element: &E) -> Option<usize> {
        self.positions.get(element).copied()
    }

    /// Removes `element` from any slot, returning it with its key
    ///
    /// The last node fills the vacated slot and is sifted whichever way its
    /// key requires.
    ///
    /// # Errors
    /// Returns [`HeapError::NotFound`] if the element is not in the heap.
    pub fn remove(&mut self, element: &E) -> Result<(E, K), HeapError> {
        let position = self.locate(element)?;
        let last = self.heap.len() - 1;
        self.swap(position, last);
        let node = self.heap.pop().ok_or(HeapError::NotFound)?;
        self.positions.remove(&node.element);
        if position < self.heap.len() && self.bubble_up(position) == position {
            self.bubble_down(position);
        }
        Ok((node.element, node.key))
    }

    fn locate(&self, element: &E) -> Result<usize, HeapError> {
        match self.positions.get(element) {
            Some(&position) => Ok(position),
            None => {
                debug!("key change on element not in heap");
                Err(HeapError::NotFound)
            }
        }
    }

    fn parent_of(&self, index: usize) -> usize {
        (index - 1) / self.arity
    }

    /// Moves the node at `index` up while its parent's key is strictly greater,
    /// returning the slot where it settles
    fn bubble_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = self.parent_of(index);
            if self.heap[parent].key > self.heap[index].key {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    /// Moves the node at `index` down while its smallest child is strictly smaller
    ///
    /// Ties between children go to the lowest child slot.
    fn bubble_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let first = self.arity.saturating_mul(index).saturating_add(1);
            if first >= len {
                break;
            }
            let end = first.saturating_add(self.arity).min(len);

            let mut smallest = first;
            for child in first + 1..end {
                if self.heap[child].key < self.heap[smallest].key {
                    smallest = child;
                }
            }

            if self.heap[smallest].key < self.heap[index].key {
                self.swap(index, smallest);
                index = smallest;
            } else {
                break;
            }
        }
    }

    /// Swaps two slots, rewriting both nodes' positions and both map entries
    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        for index in [a, b] {
            let node = &mut self.heap[index];
            node.position = index;
            if let Some(slot) = self.positions.get_mut(&node.element) {
                *slot = index;
            }
        }
    }
}

impl<E, K> Default for IndexedDHeap<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    fn default() -> Self {
        <Self as PriorityQueue<E, K>>::new()
    }
}

impl<E: fmt::Debug, K: fmt::Debug> fmt::Debug for IndexedDHeap<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedDHeap")
            .field("arity", &self.arity)
            .field("heap", &self.heap)
            .finish()
    }
}

/// Renders the heap array in slot order as `[*(element, key), ...]`
impl<E: fmt::Display, K: fmt::Display> fmt::Display for IndexedDHeap<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, node) in self.heap.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "*({}, {})", node.element, node.key)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::FloatKey;

    /// Checks heap order and that every map entry points at its node
    fn assert_consistent<E, K>(heap: &IndexedDHeap<E, K>)
    where
        E: Clone + Hash + Eq + fmt::Debug,
        K: Ord + fmt::Debug,
    {
        assert_eq!(heap.positions.len(), heap.heap.len());
        for (i, node) in heap.heap.iter().enumerate() {
            assert_eq!(node.position, i);
            assert_eq!(heap.positions.get(&node.element), Some(&i));
            if i > 0 {
                let parent = &heap.heap[heap.parent_of(i)];
                assert!(parent.key <= node.key, "{parent:?} above {node:?}");
            }
        }
    }

    #[test]
    fn test_scenario_float_keys() {
        let mut heap = IndexedDHeap::new();
        heap.insert('a', FloatKey(5.0)).unwrap();
        heap.insert('b', FloatKey(2.0)).unwrap();
        heap.insert('c', FloatKey(8.0)).unwrap();
        heap.insert('d', FloatKey(1.0)).unwrap();

        assert_eq!(heap.find_min(), Some((&'d', &FloatKey(1.0))));
        assert_eq!(heap.delete_min(), Some(('d', FloatKey(1.0))));
        assert_eq!(heap.find_min(), Some((&'b', &FloatKey(2.0))));

        heap.decrease_key(&'c', FloatKey(0.0)).unwrap();
        assert_eq!(heap.find_min(), Some((&'c', &FloatKey(0.0))));
        assert_consistent(&heap);
    }

    #[test]
    fn test_parent_child_arithmetic() {
        let heap: IndexedDHeap<u32, u32> = IndexedDHeap::with_arity(4).unwrap();
        assert_eq!(heap.parent_of(1), 0);
        assert_eq!(heap.parent_of(4), 0);
        assert_eq!(heap.parent_of(5), 1);
        assert_eq!(heap.parent_of(8), 1);
        assert_eq!(heap.parent_of(9), 2);
    }

    #[test]
    fn test_last_child_is_considered() {
        // After the root is removed, only the fourth child of the new root is smaller
        let mut heap = IndexedDHeap::with_arity(4).unwrap();
        for (e, k) in [(0, 0), (1, 10), (2, 11), (3, 12), (4, 5), (5, 20)] {
            heap.insert(e, k).unwrap();
        }
        assert_eq!(heap.delete_min(), Some((0, 0)));
        assert_eq!(heap.find_min(), Some((&4, &5)));
        assert_consistent(&heap);
    }

    #[test]
    fn test_child_ties_pick_lowest_slot() {
        let mut heap = IndexedDHeap::with_arity(3).unwrap();
        for (e, k) in [("root", 0), ("x", 4), ("y", 4), ("z", 4), ("tail", 9)] {
            heap.insert(e, k).unwrap();
        }
        heap.increase_key(&"root", 7).unwrap();
        // x held slot 1, the first of the tied children
        assert_eq!(heap.position_of(&"x"), Some(0));
        assert_consistent(&heap);
    }

    #[test]
    fn test_zero_arity_rejected() {
        let result: Result<IndexedDHeap<u8, u8>, _> = IndexedDHeap::with_arity(0);
        assert_eq!(result.err(), Some(HeapError::InvalidArity(0)));
    }

    #[test]
    fn test_default_arity() {
        let heap: IndexedDHeap<u8, u8> = IndexedDHeap::default();
        assert_eq!(heap.arity(), DEFAULT_ARITY);
        let heap: IndexedDHeap<u8, u8> = IndexedDHeap::with_capacity(3, 16).unwrap();
        assert_eq!(heap.arity(), 3);
    }

    #[test]
    fn test_unary_heap_is_sorted_list() {
        let mut heap = IndexedDHeap::with_arity(1).unwrap();
        for k in [5, 3, 9, 1, 7] {
            heap.insert(k, k).unwrap();
        }
        assert_consistent(&heap);
        let drained: Vec<_> = std::iter::from_fn(|| heap.delete_min().map(|(_, k)| k)).collect();
        assert_eq!(drained, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_duplicate_insert_leaves_heap_untouched() {
        let mut heap = IndexedDHeap::new();
        heap.insert("a", 3).unwrap();
        assert_eq!(heap.insert("a", 1), Err(HeapError::DuplicateElement));
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.key_of(&"a"), Some(&3));
    }

    #[test]
    fn test_key_change_errors() {
        let mut heap = IndexedDHeap::new();
        heap.insert("a", 3).unwrap();
        assert_eq!(heap.decrease_key(&"a", 4), Err(HeapError::InvalidKey));
        assert_eq!(heap.increase_key(&"a", 2), Err(HeapError::InvalidKey));
        assert_eq!(heap.decrease_key(&"b", 1), Err(HeapError::NotFound));
        assert_eq!(heap.increase_key(&"b", 9), Err(HeapError::NotFound));
        // Equal keys are accepted in both directions
        assert_eq!(heap.decrease_key(&"a", 3), Ok(()));
        assert_eq!(heap.increase_key(&"a", 3), Ok(()));
        assert_eq!(heap.key_of(&"a"), Some(&3));
    }

    #[test]
    fn test_positions_survive_churn() {
        let mut heap = IndexedDHeap::with_arity(3).unwrap();
        for i in 0..200u32 {
            heap.insert(i, (i * 7919) % 211).unwrap();
        }
        for i in (0..200u32).step_by(3) {
            let current = *heap.key_of(&i).unwrap();
            heap.decrease_key(&i, current / 2).unwrap();
        }
        for i in (1..200u32).step_by(5) {
            let current = *heap.key_of(&i).unwrap();
            heap.increase_key(&i, current + 300).unwrap();
        }
        assert_consistent(&heap);
        for _ in 0..50 {
            heap.delete_min();
        }
        assert_consistent(&heap);
        assert_eq!(heap.len(), 150);
    }

    #[test]
    fn test_deleted_element_is_forgotten() {
        let mut heap = IndexedDHeap::new();
        heap.insert(1, 1).unwrap();
        heap.insert(2, 2).unwrap();
        heap.delete_min();
        assert!(!heap.contains(&1));
        assert_eq!(heap.decrease_key(&1, 0), Err(HeapError::NotFound));
        // The identity can be reused once removed
        heap.insert(1, 0).unwrap();
        assert_eq!(heap.find_min(), Some((&1, &0)));
    }

    #[test]
    fn test_remove_from_middle() {
        let mut heap = IndexedDHeap::with_arity(2).unwrap();
        for k in [1, 5, 2, 6, 7, 3, 4] {
            heap.insert(k, k).unwrap();
        }
        assert_eq!(heap.remove(&5), Ok((5, 5)));
        assert_eq!(heap.remove(&5), Err(HeapError::NotFound));
        assert_consistent(&heap);
        assert_eq!(heap.remove(&4), Ok((4, 4)));
        assert_consistent(&heap);
        let drained: Vec<_> = std::iter::from_fn(|| heap.delete_min().map(|(_, k)| k)).collect();
        assert_eq!(drained, vec![1, 2, 3, 6, 7]);
    }

    #[test]
    fn test_display() {
        let mut heap = IndexedDHeap::new();
        assert_eq!(heap.to_string(), "[]");
        heap.insert("a", 5).unwrap();
        heap.insert("b", 2).unwrap();
        assert_eq!(heap.to_string(), "[*(b, 2), *(a, 5)]");
    }
}
