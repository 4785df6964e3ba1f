use anyhow::Result;
use clap::Parser;
use follow_ai::{
    BodyId, FollowConfig, FollowController, ObstructionMask, Scene, TargetId, Vehicle,
    WaypointInfo,
};
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use rand::prelude::*;

#[derive(Parser)]
struct Opts {
    /// Fixed simulation step in seconds
    #[clap(long, default_value_t = 0.02)]
    step: f64,
    /// Number of steps to simulate
    #[clap(long, default_value_t = 3000)]
    ticks: u32,
    /// Waypoints on the circuit
    #[clap(long, default_value_t = 6)]
    waypoints: u64,
}

/// Kinematic stand-in for a host physics vehicle, just enough to watch the
/// controller drive a circuit.
struct ToyVehicle {
    position: Point3<f64>,
    rotation: UnitQuaternion<f64>,
    forward_speed: f64,
    steer: f64,
    accel: f64,
    brake: f64,
    ebrake: f64,
}

impl ToyVehicle {
    const MAX_SPEED: f64 = 30.0;
    const ENGINE_ACCEL: f64 = 8.0;
    const BRAKE_DECEL: f64 = 12.0;
    const EBRAKE_DECEL: f64 = 25.0;
    const DRAG: f64 = 0.4;
    const YAW_RATE: f64 = 1.6;

    fn new() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            forward_speed: 0.0,
            steer: 0.0,
            accel: 0.0,
            brake: 0.0,
            ebrake: 0.0,
        }
    }

    fn integrate(&mut self, dt: f64) {
        // Brakes act against the current motion and never push through zero.
        let braking = (self.brake * Self::BRAKE_DECEL + self.ebrake * Self::EBRAKE_DECEL) * dt;
        let braked = if self.forward_speed >= 0.0 {
            (self.forward_speed - braking).max(0.0)
        } else {
            (self.forward_speed + braking).min(0.0)
        };
        let drive = self.accel * Self::ENGINE_ACCEL - Self::DRAG * braked;
        self.forward_speed = (braked + drive * dt).clamp(-Self::MAX_SPEED, Self::MAX_SPEED);

        let authority = (self.forward_speed / 5.0).clamp(-1.0, 1.0);
        let yaw = self.steer * Self::YAW_RATE * authority * dt;
        self.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw) * self.rotation;

        let forward = self.rotation * Vector3::z();
        self.position += forward * self.forward_speed * dt;
    }
}

impl Vehicle for ToyVehicle {
    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn forward_dir(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.rotation * Vector3::z())
    }

    fn right_dir(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.rotation * Vector3::x())
    }

    fn local_velocity(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.forward_speed)
    }

    fn speed(&self) -> f64 {
        self.forward_speed.abs()
    }

    fn grounded_wheels(&self) -> usize {
        4
    }

    fn rolled_over(&self) -> bool {
        false
    }

    fn set_steer(&mut self, steer: f64) {
        self.steer = steer;
    }

    fn set_accel(&mut self, accel: f64) {
        self.accel = accel;
    }

    fn set_brake(&mut self, brake: f64) {
        self.brake = brake;
    }

    fn set_ebrake(&mut self, ebrake: f64) {
        self.ebrake = ebrake;
    }

    fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    fn zero_velocities(&mut self) {
        self.forward_speed = 0.0;
    }
}

/// A ring of waypoints with jittered positions and per-leg speed fractions.
struct RingScene {
    points: Vec<Point3<f64>>,
    waypoints: Vec<WaypointInfo>,
}

impl RingScene {
    fn circuit(count: u64, rng: &mut impl Rng) -> Self {
        let mut points = Vec::new();
        let mut waypoints = Vec::new();

        for i in 0..count {
            let angle = i as f64 / count as f64 * std::f64::consts::TAU;
            let radius = 60.0 + rng.gen_range(-8.0..8.0);
            points.push(Point3::new(
                angle.cos() * radius,
                0.0,
                angle.sin() * radius,
            ));
            waypoints.push(WaypointInfo {
                radius: 5.0,
                speed: rng.gen_range(0.4..1.0),
                next: TargetId((i + 1) % count),
            });
        }

        Self { points, waypoints }
    }
}

impl Scene for RingScene {
    fn target_position(&self, target: TargetId) -> Point3<f64> {
        self.points[target.0 as usize]
    }

    fn resolve_body(&self, _target: TargetId) -> Option<BodyId> {
        None
    }

    fn body_velocity(&self, _body: BodyId) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn waypoint(&self, target: TargetId) -> Option<WaypointInfo> {
        self.waypoints.get(target.0 as usize).copied()
    }

    fn segment_blocked(
        &self,
        _from: &Point3<f64>,
        _to: &Point3<f64>,
        _mask: ObstructionMask,
    ) -> bool {
        false
    }

    fn world_up(&self) -> Unit<Vector3<f64>> {
        Vector3::y_axis()
    }
}

fn main() -> Result<()> {
    let Opts {
        step,
        ticks,
        waypoints,
    } = Opts::parse();

    let mut rng = rand::thread_rng();
    let scene = RingScene::circuit(waypoints.max(2), &mut rng);
    let mut vehicle = ToyVehicle::new();

    let mut controller = FollowController::new(FollowConfig {
        follow_distance: 6.0,
        ..FollowConfig::default()
    })?;
    controller.set_target(Some(TargetId(0)));

    for tick in 0..ticks {
        let report = controller.step(step, &mut vehicle, &scene);
        vehicle.integrate(step);
        controller.apply_deferred(&mut vehicle, &scene);

        if tick % 50 == 0 {
            let p = vehicle.position;
            println!(
                "t={:7.2}s pos=({:7.2}, {:7.2}) speed={:5.2} steer={:+.2} accel={:.2} brake={:.2} target={:?}",
                tick as f64 * step,
                p.x,
                p.z,
                vehicle.forward_speed,
                report.steer,
                report.accel,
                report.brake,
                controller.target(),
            );
        }
    }

    Ok(())
}
