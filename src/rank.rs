//! Rank type and ledger capacity for merge trees.
//!
//! The rank of a merge tree is the number of children of its root. A tree of
//! rank `r` holds exactly `2^r` nodes, so a heap holding `n` elements never
//! produces a rank above `log₂(n)`.
//!
//! `Rank` is a `u8`: ranks stay far below 255 for any heap that fits in
//! memory, and the narrow field keeps tree nodes small.

/// Type alias for tree rank.
pub type Rank = u8;

/// Number of slots in the rank ledger of a forest heap.
///
/// Ranks `0..MAX_RANK` are representable. Sixty-four slots cover any element
/// count addressable by `usize` on 64-bit targets.
pub const MAX_RANK: usize = 64;

/// Increment a rank value, panicking on overflow.
///
/// # Panics
///
/// Panics if `rank` is already `MAX_RANK - 1`. Reaching that would need a heap
/// with more than 2⁶³ elements, so a panic here means consolidation is broken.
///
/// # Example
///
/// ```rust
/// use keyed_heaps::rank::{checked_increment, Rank};
///
/// let rank: Rank = 5;
/// assert_eq!(checked_increment(rank), 6);
/// ```
#[inline]
pub fn checked_increment(rank: Rank) -> Rank {
    let next = usize::from(rank) + 1;
    assert!(
        next < MAX_RANK,
        "rank overflow: rank {next} exceeds the ledger capacity of {MAX_RANK}"
    );
    // MAX_RANK fits in u8, checked by the assert above
    next as Rank
}

/// Converts a rank to a ledger slot index.
#[inline]
pub fn slot(rank: Rank) -> usize {
    usize::from(rank)
}
