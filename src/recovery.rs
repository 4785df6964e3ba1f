//! Stuck detection, rollover monitoring, and the deferred pose corrections
//! that recover a vehicle which cannot drive itself free.

use log::{info, warn};
use nalgebra::{Point3, Vector3};

use crate::constants::UPRIGHT_LIFT_M;
use crate::geometry::{look_rotation, upright_rotation};
use crate::scene::Scene;
use crate::vehicle::Vehicle;

/// A one-shot pose fix. Armed during a tick, executed by the host strictly
/// after that tick's physics step so it never fights the solver mid-step.
#[derive(Debug, Clone, PartialEq)]
pub enum PoseCorrection {
    /// Teleport to `position`, face `heading` (world forward when `None`)
    /// with world up as the vertical reference, and stop dead.
    Relocate {
        position: Point3<f64>,
        heading: Option<Vector3<f64>>,
    },
    /// Zero pitch and roll while keeping yaw, lift the vehicle one unit
    /// along world up, and stop dead.
    Upright,
}

impl PoseCorrection {
    fn apply<V: Vehicle, S: Scene>(&self, vehicle: &mut V, scene: &S) {
        let up = scene.world_up();
        match self {
            PoseCorrection::Relocate { position, heading } => {
                let dir = heading.unwrap_or_else(Vector3::z);
                vehicle.set_position(*position);
                vehicle.set_rotation(look_rotation(&dir, &up));
                vehicle.zero_velocities();
            }
            PoseCorrection::Upright => {
                vehicle.set_rotation(upright_rotation(&vehicle.forward_dir(), &up));
                let lifted = vehicle.position() + up.into_inner() * UPRIGHT_LIFT_M;
                vehicle.set_position(lifted);
                vehicle.zero_velocities();
            }
        }
    }
}

/// Accumulates the stuck and rollover timers and owns the reverse maneuver
/// state plus the queue of armed corrections.
///
/// The reverse-attempt counter only ever resets through
/// [`trigger_relocate`](Self::trigger_relocate); a vehicle that frees itself
/// keeps its elevated count.
#[derive(Debug, Default)]
pub struct RecoveryMonitor {
    stopped_time: f64,
    reverse_time: f64,
    reverse_attempts: i32,
    rolled_over_time: f64,
    armed: Vec<PoseCorrection>,
}

impl RecoveryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reversing(&self) -> bool {
        self.reverse_time > 0.0
    }

    pub fn reverse_attempts(&self) -> i32 {
        self.reverse_attempts
    }

    #[cfg(test)]
    pub(crate) fn stopped_time(&self) -> f64 {
        self.stopped_time
    }

    #[cfg(test)]
    pub(crate) fn armed(&self) -> &[PoseCorrection] {
        &self.armed
    }

    /// Accumulate stall time, or clear it the moment the vehicle is making
    /// progress again. Crossing `stop_time_reverse` while no reverse is
    /// active arms a reverse maneuver and counts the attempt.
    pub fn note_progress(
        &mut self,
        stalled: bool,
        dt: f64,
        stop_time_reverse: f64,
        reverse_attempt_time: f64,
    ) {
        self.stopped_time = if stalled { self.stopped_time + dt } else { 0.0 };

        if self.stopped_time > stop_time_reverse && self.reverse_time == 0.0 {
            self.reverse_time = reverse_attempt_time;
            self.reverse_attempts += 1;
            info!("vehicle stuck, reverse attempt {}", self.reverse_attempts);
        }
    }

    /// Whether the attempt counter has exceeded `cap`. A negative cap
    /// disables relocation entirely.
    pub fn relocation_due(&self, cap: i32) -> bool {
        cap >= 0 && self.reverse_attempts > cap
    }

    /// Clear the reverse state and arm a relocate correction. Clearing at
    /// trigger time keeps the trigger from firing again before the
    /// correction lands.
    pub fn trigger_relocate(&mut self, position: Point3<f64>, heading: Option<Vector3<f64>>) {
        self.reverse_attempts = 0;
        self.reverse_time = 0.0;
        warn!("reverse attempts exhausted, relocating vehicle to target");
        self.armed.push(PoseCorrection::Relocate { position, heading });
    }

    /// Count down the active reverse maneuver.
    pub fn tick_reverse(&mut self, dt: f64) {
        self.reverse_time = (self.reverse_time - dt).max(0.0);
    }

    /// Accumulate rolled-over time, or clear it while the vehicle is on its
    /// wheels. Crossing a non-negative `roll_reset_time` arms an upright
    /// correction and clears the accumulator.
    pub fn note_rollover(&mut self, rolled_over: bool, dt: f64, roll_reset_time: f64) {
        self.rolled_over_time = if rolled_over {
            self.rolled_over_time + dt
        } else {
            0.0
        };

        if self.rolled_over_time > roll_reset_time && roll_reset_time >= 0.0 {
            self.rolled_over_time = 0.0;
            warn!("vehicle rolled over too long, setting upright");
            self.armed.push(PoseCorrection::Upright);
        }
    }

    /// Execute every armed correction in trigger order. Returns how many
    /// were applied.
    pub fn apply_armed<V: Vehicle, S: Scene>(&mut self, vehicle: &mut V, scene: &S) -> usize {
        let applied = self.armed.len();
        for correction in self.armed.drain(..) {
            correction.apply(vehicle, scene);
        }
        applied
    }
}
