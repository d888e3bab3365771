//! Sync Generations
//!
//! The renderer bumps its generation once per top-level sync and stamps
//! every identity it visits. Anything stamped with an older generation
//! after the pass was not visited and is garbage.

/// Generation counter - incremented once per sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Generation(u32);

impl Generation {
    /// Initial generation (never synced)
    pub const INITIAL: Self = Generation(0);

    /// Create a new generation
    #[inline]
    pub const fn new(value: u32) -> Self {
        Generation(value)
    }

    /// Get the raw value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Get the next generation
    #[inline]
    pub const fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    /// Check if this generation is newer than another
    #[inline]
    pub fn is_newer_than(self, other: Self) -> bool {
        // Handle wraparound
        let diff = self.0.wrapping_sub(other.0);
        diff > 0 && diff < u32::MAX / 2
    }

    /// Check if a stamp taken at `self` is behind `current`
    #[inline]
    pub fn is_stale(self, current: Self) -> bool {
        current.is_newer_than(self)
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen{}", self.0)
    }
}
