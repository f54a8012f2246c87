//! Totally ordered float keys
//!
//! The heaps require `K: Ord`, which `f64` does not implement. [`FloatKey`]
//! orders floats with [`f64::total_cmp`], so every value including NaN and
//! the infinities has a well defined position: `-inf < finite < +inf < NaN`
//! for positive NaN.

use std::cmp::Ordering;
use std::fmt;

/// An `f64` priority with a total order
///
/// # Example
///
/// ```rust
/// use keyed_heaps::key::FloatKey;
///
/// assert!(FloatKey(1.5) < FloatKey(2.0));
/// assert!(FloatKey(f64::NEG_INFINITY) < FloatKey(-1e300));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatKey(pub f64);

impl FloatKey {
    /// The smallest possible key
    pub const MIN: FloatKey = FloatKey(f64::NEG_INFINITY);

    /// Returns the wrapped value
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        FloatKey(value)
    }
}

impl From<FloatKey> for f64 {
    fn from(key: FloatKey) -> Self {
        key.0
    }
}

impl fmt::Display for FloatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
