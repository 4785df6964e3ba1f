//! The per-tick follow controller: target tracking, the steer/accel/brake
//! control law, and stuck/rollover recovery, composed in one deterministic
//! pass per fixed simulation step.

use log::debug;

use crate::config::{ConfigError, FollowConfig};
use crate::constants::{
    CORNER_BRAKE_LOOK_DOT, CORNER_BRAKE_SPEED_MS, HOLD_SPEED_MS, MIN_DIVISOR,
    MISALIGNED_ACCEL_SPEED_MS, SHARP_STEER_DIST_SQ_M2, SPIN_EBRAKE_SPEED_MS, STUCK_SPEED_MS,
    TRANSITION_BRAKE_GAIN,
};
use crate::geometry::{clamp01, direction_or_zero};
use crate::recovery::RecoveryMonitor;
use crate::scene::{Scene, TargetId};
use crate::target::TargetTracker;
use crate::vehicle::Vehicle;

/// Per-tick telemetry describing the decisions taken. Pure observability;
/// hosts may ignore it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Whether a target was assigned and control outputs were written.
    pub tracking: bool,
    pub waypoint_mode: bool,
    pub target_visible: bool,
    /// Within follow distance of a non-waypoint target.
    pub close: bool,
    /// Alignment of the vehicle forward axis with the direction to the
    /// tracking point.
    pub look_dot: f64,
    /// Alignment of the vehicle right axis with the direction to the
    /// tracking point.
    pub steer_dot: f64,
    /// Whether the control law ran its reversing branches this tick.
    pub reversing: bool,
    pub steer: f64,
    pub accel: f64,
    pub brake: f64,
    pub ebrake: f64,
}

/// Drives one vehicle toward its assigned target every fixed step.
///
/// The host loop calls [`step`](Self::step) once per tick before integrating
/// physics, then [`apply_deferred`](Self::apply_deferred) after the step
/// completes so armed pose corrections never fight the solver.
#[derive(Debug)]
pub struct FollowController {
    config: FollowConfig,
    tracker: TargetTracker,
    recovery: RecoveryMonitor,
    /// Current speed fraction; changes on waypoint transitions.
    speed: f64,
    initial_speed: f64,
    prev_speed: f64,
    speed_limit: f64,
    /// Countdown armed by a waypoint deceleration, drives graduated braking.
    brake_time: f64,
}

impl FollowController {
    pub fn new(config: FollowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let speed = config.speed;
        Ok(Self {
            config,
            tracker: TargetTracker::new(),
            recovery: RecoveryMonitor::new(),
            speed,
            initial_speed: speed,
            prev_speed: 0.0,
            speed_limit: 1.0,
            brake_time: 0.0,
        })
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    /// Assign or clear the target to follow.
    pub fn set_target(&mut self, target: Option<TargetId>) {
        self.tracker.set_target(target);
    }

    pub fn target(&self) -> Option<TargetId> {
        self.tracker.target()
    }

    /// Current speed fraction, after any waypoint transitions.
    pub fn speed_fraction(&self) -> f64 {
        self.speed
    }

    /// Reverse attempts since the last relocation.
    pub fn reverse_attempts(&self) -> i32 {
        self.recovery.reverse_attempts()
    }

    /// Run one control pass for a fixed step of `dt` seconds.
    ///
    /// With no target assigned the vehicle inputs are left untouched; only
    /// the rollover monitor runs.
    pub fn step<V: Vehicle, S: Scene>(
        &mut self,
        dt: f64,
        vehicle: &mut V,
        scene: &S,
    ) -> StepReport {
        assert!(dt > 0.0);

        let mut report = StepReport::default();

        if self.tracker.target().is_some() {
            self.drive(dt, vehicle, scene, &mut report);
        }

        // Rollover monitoring runs even without a target.
        self.recovery
            .note_rollover(vehicle.rolled_over(), dt, self.config.roll_reset_time);

        report
    }

    /// Execute pose corrections armed during the last [`step`](Self::step).
    /// The host calls this after the physics step completes. Returns how
    /// many corrections were applied.
    pub fn apply_deferred<V: Vehicle, S: Scene>(&mut self, vehicle: &mut V, scene: &S) -> usize {
        self.recovery.apply_armed(vehicle, scene)
    }

    fn drive<V: Vehicle, S: Scene>(
        &mut self,
        dt: f64,
        vehicle: &mut V,
        scene: &S,
        report: &mut StepReport,
    ) {
        let position = vehicle.position();

        if let Some(seeded) =
            self.tracker
                .refresh(scene, &position, self.config.view_block_mask, dt)
        {
            self.prev_speed = seeded;
        }

        if let Some(next_speed) = self.tracker.try_advance(scene, &position) {
            self.prev_speed = self.speed;
            self.speed = clamp01(next_speed * self.initial_speed);
            let ratio = self.prev_speed / self.speed.max(MIN_DIVISOR);
            self.brake_time = if ratio > 1.0 { ratio } else { 0.0 };
            debug!("waypoint reached, speed fraction now {:.2}", self.speed);
        }

        self.brake_time = (self.brake_time - dt).max(0.0);

        // Geometry against the (possibly just advanced) target position; the
        // tracking point trails it by one tick across an advance.
        let target = match self.tracker.target() {
            Some(target) => target,
            None => return,
        };
        let target_pos = scene.target_position(target);
        let dist_sq = (position - target_pos).norm_squared();
        let close =
            dist_sq <= self.config.follow_distance.powi(2) && !self.tracker.is_waypoint();

        let dir = direction_or_zero(&position, &self.tracker.tracking_point());
        let look_dot = vehicle.forward_dir().dot(&dir);
        let steer_dot = vehicle.right_dir().dot(&dir);

        let local_velocity = vehicle.local_velocity();
        let forward_speed = local_velocity.z;
        let grounded = vehicle.grounded_wheels() > 0;

        // Stuck accumulation precedes the steer decision; the reverse state
        // it may arm gates this very tick's outputs.
        let stalled = forward_speed.abs() < STUCK_SPEED_MS && !close && grounded;
        self.recovery.note_progress(
            stalled,
            dt,
            self.config.stop_time_reverse,
            self.config.reverse_attempt_time,
        );

        if self.recovery.relocation_due(self.config.reset_reverse_count) {
            let heading = self
                .tracker
                .waypoint()
                .map(|wp| scene.target_position(wp.next) - self.tracker.tracking_point());
            self.recovery
                .trigger_relocate(self.tracker.tracking_point(), heading);
        }

        let steer = if !self.recovery.is_reversing() {
            let exponent = if dist_sq > SHARP_STEER_DIST_SQ_M2 { 1 } else { 2 };
            steer_dot.powi(exponent).abs() * steer_dot.signum()
        } else {
            -steer_dot.signum() * if close { 0.0 } else { 1.0 }
        };

        // The reverse timer counts down between the steer and accel
        // decisions: the tick that arms it steers backward immediately, the
        // tick it expires on already accelerates again.
        self.recovery.tick_reverse(dt);
        let reversing = self.recovery.is_reversing();

        self.speed_limit = match self.config.target_velocity {
            Some(cap) if cap > 0.0 => clamp01(cap - forward_speed),
            _ => 1.0,
        };

        let accel = if !close
            && (look_dot > 0.0 || forward_speed < MISALIGNED_ACCEL_SPEED_MS)
            && grounded
            && !reversing
        {
            self.speed * self.speed_limit
        } else {
            0.0
        };

        let brake = if !reversing
            && self.brake_time == 0.0
            && !(close && forward_speed > HOLD_SPEED_MS)
        {
            if look_dot < CORNER_BRAKE_LOOK_DOT
                && look_dot > 0.0
                && forward_speed > CORNER_BRAKE_SPEED_MS
            {
                CORNER_BRAKE_LOOK_DOT - look_dot
            } else {
                0.0
            }
        } else if reversing {
            1.0
        } else if self.brake_time > 0.0 {
            self.brake_time * TRANSITION_BRAKE_GAIN
        } else {
            // Close and still rolling forward: brake harder the deeper the
            // vehicle is inside its follow distance.
            let distance = dist_sq.sqrt();
            1.0 - clamp01(distance / self.config.follow_distance.max(MIN_DIVISOR))
        };

        let ebrake = if (close && forward_speed <= HOLD_SPEED_MS)
            || (look_dot <= 0.0 && vehicle.speed() > SPIN_EBRAKE_SPEED_MS)
        {
            1.0
        } else {
            0.0
        };

        let steer = steer.clamp(-1.0, 1.0);
        let accel = clamp01(accel);
        let brake = clamp01(brake);
        let ebrake = clamp01(ebrake);

        vehicle.set_steer(steer);
        vehicle.set_accel(accel);
        vehicle.set_brake(brake);
        vehicle.set_ebrake(ebrake);

        report.tracking = true;
        report.waypoint_mode = self.tracker.is_waypoint();
        report.target_visible = self.tracker.visible();
        report.close = close;
        report.look_dot = look_dot;
        report.steer_dot = steer_dot;
        report.reversing = reversing;
        report.steer = steer;
        report.accel = accel;
        report.brake = brake;
        report.ebrake = ebrake;
    }
}
