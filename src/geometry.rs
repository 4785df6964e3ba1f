//! Vector and rotation helpers shared by the control law and pose resets.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

const NORM_EPS: f64 = 1e-9;

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Unit vector from `from` to `to`, or zero when the points coincide and no
/// direction exists.
pub fn direction_or_zero(from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    (to - from).try_normalize(NORM_EPS).unwrap_or_else(Vector3::zeros)
}

/// Rotation whose forward (z) axis points along `dir`, with `up` as the
/// vertical reference. Degenerate directions fall back to a world axis so
/// the result is always a valid rotation.
pub fn look_rotation(dir: &Vector3<f64>, up: &Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    let up = up.into_inner();
    let forward = dir
        .try_normalize(NORM_EPS)
        .filter(|f| f.cross(&up).norm_squared() > NORM_EPS)
        .unwrap_or_else(|| fallback_forward(&up));
    UnitQuaternion::face_towards(&forward, &up)
}

/// Rotation with zero pitch and roll that keeps the heading of `forward`
/// about `up`.
pub fn upright_rotation(
    forward: &Unit<Vector3<f64>>,
    up: &Unit<Vector3<f64>>,
) -> UnitQuaternion<f64> {
    let up_v = up.into_inner();
    let flat = forward.into_inner() - up_v * forward.into_inner().dot(&up_v);
    look_rotation(&flat, up)
}

fn fallback_forward(up: &Vector3<f64>) -> Vector3<f64> {
    if up.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    }
}
