//! Host-world collaborator interface: target resolution, waypoint reads, and
//! the visibility query.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a target owned by the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Opaque handle to a dynamic body owned by the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Filter selecting which scene geometry can block the view of a target.
/// The controller only passes it through to [`Scene::segment_blocked`]; the
/// bit layout belongs to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstructionMask(pub u32);

/// Attributes of one waypoint chain node. Chains must be cyclic or
/// terminated so traversal never blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointInfo {
    /// Acceptance radius; the chain advances once the vehicle is inside it.
    pub radius: f64,
    /// Speed fraction requested along the leg toward this waypoint.
    pub speed: f64,
    /// Successor node.
    pub next: TargetId,
}

/// Read access to the world the vehicle drives in. All queries are answered
/// by the host; the controller holds only non-owning [`TargetId`]s.
pub trait Scene {
    /// World position of a target.
    fn target_position(&self, target: TargetId) -> Point3<f64>;

    /// Topmost dynamic body attached to a target, if any. Replaces an
    /// ownership-hierarchy walk with an explicit capability query.
    fn resolve_body(&self, target: TargetId) -> Option<BodyId>;

    /// Current velocity of a resolved body.
    fn body_velocity(&self, body: BodyId) -> Vector3<f64>;

    /// Waypoint attributes when the target is a chain node, `None` for free
    /// targets.
    fn waypoint(&self, target: TargetId) -> Option<WaypointInfo>;

    /// Whether geometry selected by `mask` obstructs the segment between two
    /// points.
    fn segment_blocked(&self, from: &Point3<f64>, to: &Point3<f64>, mask: ObstructionMask)
        -> bool;

    /// World up reference used by pose corrections.
    fn world_up(&self) -> Unit<Vector3<f64>>;
}
