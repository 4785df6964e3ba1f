//! In-memory scene and vehicle doubles shared by the module tests.

use std::collections::HashMap;

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::scene::{BodyId, ObstructionMask, Scene, TargetId, WaypointInfo};
use crate::vehicle::Vehicle;

pub struct MockScene {
    pub positions: HashMap<TargetId, Point3<f64>>,
    pub bodies: HashMap<TargetId, BodyId>,
    pub velocities: HashMap<BodyId, Vector3<f64>>,
    pub waypoints: HashMap<TargetId, WaypointInfo>,
    pub blocked: bool,
    pub up: Unit<Vector3<f64>>,
}

impl MockScene {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            bodies: HashMap::new(),
            velocities: HashMap::new(),
            waypoints: HashMap::new(),
            blocked: false,
            up: Vector3::y_axis(),
        }
    }

    pub fn add_point(&mut self, id: u64, position: Point3<f64>) -> TargetId {
        let target = TargetId(id);
        self.positions.insert(target, position);
        target
    }

    pub fn add_body(
        &mut self,
        id: u64,
        position: Point3<f64>,
        velocity: Vector3<f64>,
    ) -> TargetId {
        let target = self.add_point(id, position);
        let body = BodyId(id);
        self.bodies.insert(target, body);
        self.velocities.insert(body, velocity);
        target
    }

    pub fn add_waypoint(
        &mut self,
        id: u64,
        position: Point3<f64>,
        radius: f64,
        speed: f64,
        next: u64,
    ) -> TargetId {
        let target = self.add_point(id, position);
        self.waypoints.insert(
            target,
            WaypointInfo {
                radius,
                speed,
                next: TargetId(next),
            },
        );
        target
    }
}

impl Scene for MockScene {
    fn target_position(&self, target: TargetId) -> Point3<f64> {
        self.positions[&target]
    }

    fn resolve_body(&self, target: TargetId) -> Option<BodyId> {
        self.bodies.get(&target).copied()
    }

    fn body_velocity(&self, body: BodyId) -> Vector3<f64> {
        self.velocities[&body]
    }

    fn waypoint(&self, target: TargetId) -> Option<WaypointInfo> {
        self.waypoints.get(&target).copied()
    }

    fn segment_blocked(
        &self,
        _from: &Point3<f64>,
        _to: &Point3<f64>,
        _mask: ObstructionMask,
    ) -> bool {
        self.blocked
    }

    fn world_up(&self) -> Unit<Vector3<f64>> {
        self.up
    }
}

pub struct MockVehicle {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub local_velocity: Vector3<f64>,
    pub speed_override: Option<f64>,
    pub grounded_wheels: usize,
    pub rolled_over: bool,
    pub steer: Option<f64>,
    pub accel: Option<f64>,
    pub brake: Option<f64>,
    pub ebrake: Option<f64>,
    pub velocities_zeroed: bool,
}

impl MockVehicle {
    pub fn new() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            local_velocity: Vector3::zeros(),
            speed_override: None,
            grounded_wheels: 4,
            rolled_over: false,
            steer: None,
            accel: None,
            brake: None,
            ebrake: None,
            velocities_zeroed: false,
        }
    }
}

impl Vehicle for MockVehicle {
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
        self.local_velocity
    }

    fn speed(&self) -> f64 {
        self.speed_override
            .unwrap_or_else(|| self.local_velocity.norm())
    }

    fn grounded_wheels(&self) -> usize {
        self.grounded_wheels
    }

    fn rolled_over(&self) -> bool {
        self.rolled_over
    }

    fn set_steer(&mut self, steer: f64) {
        self.steer = Some(steer);
    }

    fn set_accel(&mut self, accel: f64) {
        self.accel = Some(accel);
    }

    fn set_brake(&mut self, brake: f64) {
        self.brake = Some(brake);
    }

    fn set_ebrake(&mut self, ebrake: f64) {
        self.ebrake = Some(ebrake);
    }

    fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    fn zero_velocities(&mut self) {
        self.local_velocity = Vector3::zeros();
        self.velocities_zeroed = true;
    }
}
