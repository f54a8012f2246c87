//! Element-keyed priority queues for Rust
//!
//! This crate provides two priority queues whose elements can be re-keyed after
//! insertion. Both track where every element lives, so callers address
//! elements directly, as graph searches and schedulers do.
//!
//! # Features
//!
//! - **Indexed d-ary Heap**: array-backed, configurable fan-out; O(log_d n) insert and decrease_key
//! - **Mergeable Forest Heap**: binomial forest with a two-slot rank ledger; O(1) amortized insert,
//!   O(log n) delete-min and key changes, O(1) merge of equal-rank trees
//!
//! Both implement the [`PriorityQueue`] trait: `insert`, `find_min`, `delete_min`,
//! `decrease_key` and `increase_key`, addressed by element.
//!
//! # Example
//!
//! ```rust
//! use keyed_heaps::forest::MergeableForestHeap;
//! use keyed_heaps::key::FloatKey;
//! use keyed_heaps::{HeapError, PriorityQueue};
//!
//! let mut heap = MergeableForestHeap::new();
//! heap.insert("item1", FloatKey(5.0)).unwrap();
//! heap.insert("item2", FloatKey(3.0)).unwrap();
//! heap.decrease_key(&"item1", FloatKey(1.0)).unwrap();
//! assert_eq!(heap.find_min(), Some((&"item1", &FloatKey(1.0))));
//! assert_eq!(
//!     heap.decrease_key(&"item2", FloatKey(4.0)),
//!     Err(HeapError::InvalidKey)
//! );
//! ```

pub mod dary;
pub mod forest;
pub mod key;
pub mod merge_tree;
pub mod rank;
pub mod traits;

// Re-export the main trait for convenience
pub use traits::{Handle, HeapError, PriorityQueue};
