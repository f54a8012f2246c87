//! Common contract for element-keyed priority queues
//!
//! Both engines in this crate implement [`PriorityQueue`]:
//!
//! - [`IndexedDHeap`](crate::dary::IndexedDHeap): array-backed d-ary heap
//! - [`MergeableForestHeap`](crate::forest::MergeableForestHeap): binomial forest
//!
//! Elements double as their own lookup keys. Every heap keeps a side map from
//! element to its current location, so `decrease_key` and `increase_key` take
//! the element itself rather than a positional handle that could go stale.

use crate::rank::Rank;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new key moves in the wrong direction for the requested operation
    #[error("new key is not valid for this operation (wrong direction)")]
    InvalidKey,
    /// The element is not currently stored in the heap
    #[error("element not found in heap")]
    NotFound,
    /// Two trees of different rank were handed to `merge`
    #[error("cannot merge trees of rank {left} and rank {right}")]
    RankMismatch { left: Rank, right: Rank },
    /// The element is already stored in the heap
    #[error("element is already present in heap")]
    DuplicateElement,
    /// A d-ary heap needs at least one child per node
    #[error("invalid heap arity {0}: must be at least 1")]
    InvalidArity(usize),
}

/// Handle to an element in a heap
///
/// Handles carry the element identity, not a position: they stay valid across
/// swaps, merges and consolidation, and go stale only once the element has
/// been removed (at which point lookups fail with [`HeapError::NotFound`]).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Handle<E> {
    element: E,
}

impl<E> Handle<E> {
    pub(crate) fn new(element: E) -> Self {
        Handle { element }
    }

    /// The element this handle refers to
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Consumes the handle, returning the element identity
    pub fn into_element(self) -> E {
        self.element
    }
}

impl<E: fmt::Debug> fmt::Debug for Handle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.element).finish()
    }
}

/// Priority queue keyed by element identity
///
/// Elements must be hashable and unique within one heap; keys only need a
/// total order. Use [`FloatKey`](crate::key::FloatKey) for `f64` priorities.
///
/// # Example
///
/// ```rust
/// use keyed_heaps::dary::IndexedDHeap;
/// use keyed_heaps::PriorityQueue;
///
/// let mut heap = IndexedDHeap::new();
/// heap.insert("a", 5).unwrap();
/// heap.insert("b", 2).unwrap();
/// heap.decrease_key(&"a", 1).unwrap();
/// assert_eq!(heap.find_min(), Some((&"a", &1)));
/// assert_eq!(heap.delete_min(), Some(("a", 1)));
/// ```
pub trait PriorityQueue<E, K>
where
    E: Clone + Hash + Eq,
    K: Ord,
{
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap holds no elements
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts `element` with priority `key`
    ///
    /// # Errors
    /// Returns [`HeapError::DuplicateElement`] if the element is already
    /// present; the heap is left unchanged.
    fn insert(&mut self, element: E, key: K) -> Result<Handle<E>, HeapError>;

    /// Returns the element with the minimum key, or `None` when empty
    fn find_min(&self) -> Option<(&E, &K)>;

    /// Removes and returns the element with the minimum key, or `None` when empty
    fn delete_min(&mut self) -> Option<(E, K)>;

    /// Lowers the key of `element` to `new_key`
    ///
    /// # Errors
    /// - [`HeapError::NotFound`] if the element is not in the heap
    /// - [`HeapError::InvalidKey`] if `new_key` is greater than the current key
    fn decrease_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError>;

    /// Raises the key of `element` to `new_key`
    ///
    /// # Errors
    /// - [`HeapError::NotFound`] if the element is not in the heap
    /// - [`HeapError::InvalidKey`] if `new_key` is less than the current key
    fn increase_key(&mut self, element: &E, new_key: K) -> Result<(), HeapError>;

    /// Returns true if `element` is currently stored in the heap
    fn contains(&self, element: &E) -> bool;

    /// Returns the current key of `element`
    fn key_of(&self, element: &E) -> Option<&K>;
}
