//! Type-erased, strategy-owned per-agent data.
//!
//! # Design
//!
//! A behaviour strategy is shared by many agents, so per-agent progress
//! (distance along a path, a wander angle, …) cannot live in the strategy
//! itself.  Instead every [`AgentState`][crate::AgentState] carries one
//! `BehaviourData` slot holding a `Box<dyn Any>` that only the currently
//! assigned strategy knows the concrete type of.  Access is by downcast, so a
//! strategy that finds someone else's data simply sees `None`.
//!
//! # Usage
//!
//! ```rust
//! use swarm_agent::BehaviourData;
//!
//! #[derive(Default)]
//! struct PathProgress { distance: f32 }
//!
//! let mut data = BehaviourData::default();
//! data.set(PathProgress::default());
//! if let Some(progress) = data.get_mut::<PathProgress>() {
//!     progress.distance += 1.5;
//! }
//! assert_eq!(data.get::<PathProgress>().map(|p| p.distance), Some(1.5));
//! assert!(data.get::<u32>().is_none());
//! ```

use std::any::Any;
use std::fmt;

/// One per-agent slot of strategy-defined data.
///
/// `Send + Sync` so agent states can be read from Rayon workers.
#[derive(Default)]
pub struct BehaviourData(Option<Box<dyn Any + Send + Sync>>);

impl BehaviourData {
    /// Replace the slot's contents with `value`.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.0 = Some(Box::new(value));
    }

    /// Shared reference to the contents if they are a `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|b| b.downcast_ref::<T>())
    }

    /// Mutable reference to the contents if they are a `T`.
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.0.as_mut().and_then(|b| b.downcast_mut::<T>())
    }

    /// `true` if the slot currently holds a `T`.
    pub fn holds<T: Any + Send + Sync>(&self) -> bool {
        self.0.as_ref().is_some_and(|b| b.is::<T>())
    }

    /// Drop whatever the slot holds.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for BehaviourData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("BehaviourData(<empty>)")
        } else {
            f.write_str("BehaviourData(<set>)")
        }
    }
}
