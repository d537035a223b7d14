//! Simulation time model.
//!
//! The engine is driven once per tick by an external scheduler, so time is a
//! plain monotonically increasing `Tick` counter.  All per-tick quantities
//! (velocity, acceleration, gravity threshold, jump impulse) are expressed
//! "per tick"; there is no wall-clock mapping inside the engine.

use std::fmt;

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick immediately after `self`.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
