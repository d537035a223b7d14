//! `swarm-sim` — tick loop orchestrator for the swarm engine.
//!
//! # Four-phase tick
//!
//! ```text
//! for each tick:
//!   ① Update    — read every agent's position from the PositionSource;
//!                 refresh velocity, acceleration and the grounded flag
//!                 (parallel with the `parallel` feature).
//!   ② Classify  — build nearby / crowded / collided lists and averages
//!                 for every agent (always sequential).
//!   ③ Calculate — plan each agent's desired acceleration against a
//!                 read-only view of the flock (parallel), then store the
//!                 results and apply queued jump / stop requests.
//!   ④ Commit    — write velocity + desired acceleration to the
//!                 VelocitySink for every agent with a pending commit,
//!                 in ascending AgentId order.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Runs the update and planning phases on Rayon's pool.       |
//! | `fx-hash`  | FxHash for the per-tick reciprocal-check sets.             |
//! | `serde`    | Serialize / Deserialize for `FlockConfig` and core types.  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use swarm_behavior::NoopBehaviour;
//! use swarm_sim::{FlockBuilder, NoopObserver};
//!
//! let mut flock = FlockBuilder::new(config)
//!     .agents(ids, Arc::new(NoopBehaviour))
//!     .build()?;
//! flock.run_ticks(100, &mut scene, &mut scene_velocities, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod flock;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::FlockBuilder;
pub use error::{FlockError, FlockResult};
pub use flock::{Flock, TickReport};
pub use observer::{FlockObserver, NoopObserver};
