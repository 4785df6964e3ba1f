//! Host-vehicle collaborator interface.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

/// The vehicle being driven. The host owns the physics; the controller reads
/// pose and velocity and writes normalized control inputs once per tick.
///
/// Local-frame convention: x = right, y = up, z = forward.
pub trait Vehicle {
    fn position(&self) -> Point3<f64>;

    /// Unit forward axis of the vehicle body.
    fn forward_dir(&self) -> Unit<Vector3<f64>>;

    /// Unit right axis of the vehicle body.
    fn right_dir(&self) -> Unit<Vector3<f64>>;

    /// Velocity expressed in the vehicle frame; `z` is the forward
    /// component.
    fn local_velocity(&self) -> Vector3<f64>;

    /// Overall speed magnitude.
    fn speed(&self) -> f64;

    /// Number of wheels currently touching the ground.
    fn grounded_wheels(&self) -> usize;

    /// Whether the host's assist logic reports the vehicle rolled over.
    fn rolled_over(&self) -> bool;

    /// Steering input in [-1, 1]; positive steers toward the right axis.
    fn set_steer(&mut self, steer: f64);

    /// Throttle input in [0, 1].
    fn set_accel(&mut self, accel: f64);

    /// Brake input in [0, 1].
    fn set_brake(&mut self, brake: f64);

    /// Emergency brake input in [0, 1].
    fn set_ebrake(&mut self, ebrake: f64);

    /// Teleport the vehicle. Only called from deferred pose corrections,
    /// never mid-tick.
    fn set_position(&mut self, position: Point3<f64>);

    /// Reorient the vehicle. Only called from deferred pose corrections.
    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>);

    /// Clear linear and angular velocity.
    fn zero_velocities(&mut self);
}
