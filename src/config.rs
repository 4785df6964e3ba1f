//! Controller configuration: the surface the host or tooling sets up front.
//! The core never mutates it at runtime.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::scene::ObstructionMask;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Tuning for one [`FollowController`](crate::follow::FollowController).
///
/// Defaults mirror the stock follow component: one second of stall before a
/// one-second reverse attempt, a single attempt before relocation, three
/// seconds rolled over before righting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Radius under which a non-waypoint target counts as reached.
    pub follow_distance: f64,

    /// Fraction of maximum speed to drive at, in [0, 1].
    pub speed: f64,

    /// Forward-velocity cap. Absent or non-positive leaves speed uncapped.
    pub target_velocity: Option<f64>,

    /// Which scene geometry can block the view of the target.
    pub view_block_mask: ObstructionMask,

    /// Seconds of no forward progress before attempting to reverse.
    pub stop_time_reverse: f64,

    /// Seconds the vehicle reverses per attempt.
    pub reverse_attempt_time: f64,

    /// Reverse attempts tolerated before the vehicle is relocated onto its
    /// target. Negative disables relocation.
    pub reset_reverse_count: i32,

    /// Seconds rolled over before the vehicle is set upright. Negative
    /// disables righting.
    pub roll_reset_time: f64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            follow_distance: 10.0,
            speed: 1.0,
            target_velocity: None,
            view_block_mask: ObstructionMask::default(),
            stop_time_reverse: 1.0,
            reverse_attempt_time: 1.0,
            reset_reverse_count: 1,
            roll_reset_time: 3.0,
        }
    }
}

impl FollowConfig {
    /// Load and validate a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.follow_distance.is_finite() || self.follow_distance < 0.0 {
            return Err(ConfigError::Invalid(
                "follow_distance must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.speed) {
            return Err(ConfigError::Invalid("speed must be within [0, 1]"));
        }
        if let Some(cap) = self.target_velocity {
            if !cap.is_finite() {
                return Err(ConfigError::Invalid("target_velocity must be finite"));
            }
        }
        if !self.stop_time_reverse.is_finite() || self.stop_time_reverse < 0.0 {
            return Err(ConfigError::Invalid(
                "stop_time_reverse must be finite and non-negative",
            ));
        }
        if !self.reverse_attempt_time.is_finite() || self.reverse_attempt_time < 0.0 {
            return Err(ConfigError::Invalid(
                "reverse_attempt_time must be finite and non-negative",
            ));
        }
        if !self.roll_reset_time.is_finite() {
            return Err(ConfigError::Invalid("roll_reset_time must be finite"));
        }
        Ok(())
    }
}
