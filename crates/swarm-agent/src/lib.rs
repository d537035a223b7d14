//! `swarm-agent` — per-agent kinematic state and neighbourhood classification.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                      |
//! |--------------------|---------------------------------------------------------------|
//! | [`state`]          | `AgentState`, `Kinematics` — kinematics, lists, averages      |
//! | [`neighbourhood`]  | `build_neighbourhoods`, `ClassificationStats`, `HasAgentState` |
//! | [`data`]           | `BehaviourData` — type-erased per-agent strategy data         |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                        |
//! |-----------|---------------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the per-tick reciprocal sets.   |

pub mod data;
pub mod neighbourhood;
pub mod state;


pub use data::BehaviourData;
pub use neighbourhood::{ClassificationStats, HasAgentState, build_neighbourhoods};
pub use state::{AgentState, Kinematics};
