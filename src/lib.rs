//! Follow-target AI controller for simulated vehicles.
//!
//! Steers a vehicle toward a moving target or along a waypoint chain,
//! manages speed and braking, and recovers from stuck or rolled-over
//! states. The host owns the vehicle physics and the world; this crate
//! only reads pose through the [`Vehicle`] and [`Scene`] traits and writes
//! normalized control inputs once per fixed step.

pub mod config;
pub mod constants;
pub mod follow;
pub mod geometry;
pub mod recovery;
pub mod scene;
pub mod target;
pub mod vehicle;

#[cfg(test)]
mod mock;

pub use config::{ConfigError, FollowConfig};
pub use follow::{FollowController, StepReport};
pub use recovery::PoseCorrection;
pub use scene::{BodyId, ObstructionMask, Scene, TargetId, WaypointInfo};
pub use vehicle::Vehicle;
