//! Target tracking: retarget detection, visibility, the velocity-led
//! tracking point, and waypoint chain advance.

use nalgebra::Point3;

use crate::scene::{BodyId, ObstructionMask, Scene, TargetId, WaypointInfo};

/// Per-vehicle tracking state for the assigned target.
///
/// The tracking point is the world position the control law steers toward.
/// It leads a moving target by one tick of its velocity and freezes in place
/// while a non-waypoint target is out of sight.
#[derive(Debug)]
pub struct TargetTracker {
    target: Option<TargetId>,
    prev_target: Option<TargetId>,
    body: Option<BodyId>,
    waypoint: Option<WaypointInfo>,
    tracking_point: Point3<f64>,
    visible: bool,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self {
            target: None,
            prev_target: None,
            body: None,
            waypoint: None,
            tracking_point: Point3::origin(),
            visible: false,
        }
    }

    /// Assign or clear the tracked target. A change of identity is picked up
    /// by the next [`refresh`](Self::refresh).
    pub fn set_target(&mut self, target: Option<TargetId>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn is_waypoint(&self) -> bool {
        self.waypoint.is_some()
    }

    pub fn waypoint(&self) -> Option<&WaypointInfo> {
        self.waypoint.as_ref()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn tracking_point(&self) -> Point3<f64> {
        self.tracking_point
    }

    /// Per-tick refresh, run before any control decision.
    ///
    /// Re-resolves the attached body on a target identity change, recomputes
    /// the waypoint and visibility flags, and updates the tracking point
    /// unless a free target is out of sight. Returns the waypoint's speed
    /// attribute when the identity changed onto a waypoint, so the caller
    /// can seed its previous-speed fraction.
    pub fn refresh<S: Scene>(
        &mut self,
        scene: &S,
        vehicle_pos: &Point3<f64>,
        mask: ObstructionMask,
        dt: f64,
    ) -> Option<f64> {
        let target = self.target?;

        let mut seeded_speed = None;
        if self.prev_target != Some(target) {
            self.body = scene.resolve_body(target);
            self.waypoint = scene.waypoint(target);
            seeded_speed = self.waypoint.map(|wp| wp.speed);
        }
        self.prev_target = Some(target);

        self.waypoint = scene.waypoint(target);
        let target_pos = scene.target_position(target);
        self.visible = !scene.segment_blocked(vehicle_pos, &target_pos, mask);

        if self.visible || self.waypoint.is_some() {
            self.tracking_point = match self.body {
                Some(body) => target_pos + scene.body_velocity(body) * dt,
                None => target_pos,
            };
        }

        seeded_speed
    }

    /// Advance the waypoint chain by exactly one hop when the vehicle is
    /// inside the current node's acceptance radius. Returns the successor's
    /// speed attribute when a hop happened.
    pub fn try_advance<S: Scene>(
        &mut self,
        scene: &S,
        vehicle_pos: &Point3<f64>,
    ) -> Option<f64> {
        let target = self.target?;
        let waypoint = self.waypoint?;

        let target_pos = scene.target_position(target);
        if (*vehicle_pos - target_pos).norm_squared() > waypoint.radius * waypoint.radius {
            return None;
        }

        self.target = Some(waypoint.next);
        self.waypoint = scene.waypoint(waypoint.next);

        // A successor without waypoint data degrades to a free target at
        // full speed fraction.
        Some(self.waypoint.map_or(1.0, |next| next.speed))
    }
}

impl Default for TargetTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockScene;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const DT: f64 = 0.02;

    #[test]
    fn retarget_onto_waypoint_seeds_previous_speed() {
        let mut scene = MockScene::new();
        let a = scene.add_point(1, Point3::new(5.0, 0.0, 0.0));
        let b = scene.add_waypoint(2, Point3::new(0.0, 0.0, 20.0), 2.0, 0.7, 1);

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(a));
        assert_eq!(
            tracker.refresh(&scene, &Point3::origin(), Default::default(), DT),
            None
        );

        tracker.set_target(Some(b));
        assert_eq!(
            tracker.refresh(&scene, &Point3::origin(), Default::default(), DT),
            Some(0.7)
        );
        assert!(tracker.is_waypoint());

        // Same identity next tick: no reseed.
        assert_eq!(
            tracker.refresh(&scene, &Point3::origin(), Default::default(), DT),
            None
        );
    }

    #[test]
    fn tracking_point_leads_a_moving_body_by_one_tick() {
        let mut scene = MockScene::new();
        let prey = scene.add_body(1, Point3::new(0.0, 0.0, 10.0), Vector3::new(5.0, 0.0, 0.0));

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(prey));
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);

        assert_relative_eq!(
            tracker.tracking_point(),
            Point3::new(5.0 * DT, 0.0, 10.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn lost_free_target_freezes_tracking_point() {
        let mut scene = MockScene::new();
        let prey = scene.add_point(1, Point3::new(0.0, 0.0, 10.0));

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(prey));
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);
        assert!(tracker.visible());

        scene.positions.insert(prey, Point3::new(50.0, 0.0, -10.0));
        scene.blocked = true;
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);

        assert!(!tracker.visible());
        assert_relative_eq!(
            tracker.tracking_point(),
            Point3::new(0.0, 0.0, 10.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn blocked_waypoint_still_updates_tracking_point() {
        let mut scene = MockScene::new();
        let wp = scene.add_waypoint(1, Point3::new(0.0, 0.0, 10.0), 2.0, 1.0, 1);
        scene.blocked = true;

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(wp));
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);

        assert_relative_eq!(
            tracker.tracking_point(),
            Point3::new(0.0, 0.0, 10.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn advances_one_hop_per_call_even_when_overshooting_several_radii() {
        let mut scene = MockScene::new();
        // Three nodes all within reach of the vehicle.
        let w1 = scene.add_waypoint(1, Point3::new(0.0, 0.0, 1.0), 5.0, 1.0, 2);
        scene.add_waypoint(2, Point3::new(0.0, 0.0, 2.0), 5.0, 0.5, 3);
        scene.add_waypoint(3, Point3::new(0.0, 0.0, 3.0), 5.0, 1.0, 1);

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(w1));
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);

        assert_eq!(tracker.try_advance(&scene, &Point3::origin()), Some(0.5));
        assert_eq!(tracker.target(), Some(TargetId(2)));
        // Second hop only happens on the next call.
        assert_eq!(tracker.try_advance(&scene, &Point3::origin()), Some(1.0));
        assert_eq!(tracker.target(), Some(TargetId(3)));
    }

    #[test]
    fn does_not_advance_outside_the_acceptance_radius() {
        let mut scene = MockScene::new();
        let w1 = scene.add_waypoint(1, Point3::new(0.0, 0.0, 10.0), 2.0, 1.0, 2);
        scene.add_waypoint(2, Point3::new(0.0, 0.0, 20.0), 2.0, 1.0, 1);

        let mut tracker = TargetTracker::new();
        tracker.set_target(Some(w1));
        tracker.refresh(&scene, &Point3::origin(), Default::default(), DT);

        assert_eq!(tracker.try_advance(&scene, &Point3::origin()), None);
        assert_eq!(tracker.target(), Some(w1));
    }
}
