//! Process-unique object identities.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier handed to every framework object at construction.
///
/// Identifiers come from a single monotonically increasing counter and are
/// never reused for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocates the next identifier from the process-wide counter.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_increase_monotonically() {
        let first = ObjectId::next();
        let second = ObjectId::next();
        assert!(second > first);
        assert_ne!(first, second);
    }
}
