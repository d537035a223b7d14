//! `swarm-core` — foundational types for the `swarm` flocking engine.
//!
//! This crate is a dependency of every other `swarm-*` crate.  It has no
//! `swarm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `AgentId`                                                 |
//! | [`time`]      | `Tick`                                                    |
//! | [`vector2`]   | `Vector2` — 2D vector with cached magnitude               |
//! | [`vector3`]   | `Vector3` — 3D vector with cached magnitude               |
//! | [`config`]    | `FlockConfig` and its validation                          |
//! | [`host`]      | `PositionSource` / `VelocitySink` boundary traits         |
//! | [`rng`]       | `AgentRng` (per-agent deterministic RNG)                  |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, ticks, vectors and  |
//! |         | `FlockConfig`.                                             |

mod cache;

pub mod config;
pub mod error;
pub mod host;
pub mod ids;
pub mod rng;
pub mod time;
pub mod vector2;
pub mod vector3;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::FlockConfig;
pub use error::{CoreError, CoreResult};
pub use host::{PositionSource, VelocitySink};
pub use ids::AgentId;
pub use rng::AgentRng;
pub use time::Tick;
pub use vector2::Vector2;
pub use vector3::Vector3;
