/// Forward speed below which the vehicle counts as making no progress.
pub const STUCK_SPEED_MS: f64 = 1.0;

/// Forward speed below which acceleration is allowed even when the vehicle
/// is not yet facing the target.
pub const MISALIGNED_ACCEL_SPEED_MS: f64 = 5.0;

/// Forward speed at or below which a close vehicle counts as holding
/// position.
pub const HOLD_SPEED_MS: f64 = 0.1;

/// Forward speed above which moderate misalignment applies cornering brake.
pub const CORNER_BRAKE_SPEED_MS: f64 = 10.0;

/// Upper bound of the look-dot window for cornering brake; also the brake
/// value at perfect misalignment within the window.
pub const CORNER_BRAKE_LOOK_DOT: f64 = 0.5;

/// Speed magnitude above which facing away from the target engages the
/// emergency brake.
pub const SPIN_EBRAKE_SPEED_MS: f64 = 20.0;

/// Squared distance to the target beyond which steering uses the sharper
/// linear curve instead of the squared one.
pub const SHARP_STEER_DIST_SQ_M2: f64 = 20.0;

/// Floor applied to divisors derived from configuration.
pub const MIN_DIVISOR: f64 = 0.01;

/// Fraction of the brake-transition timer applied as brake input.
pub const TRANSITION_BRAKE_GAIN: f64 = 0.2;

/// Height the rollover reset lifts the vehicle along world up.
pub const UPRIGHT_LIFT_M: f64 = 1.0;
