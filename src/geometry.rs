//! Shared geometry and clamping helpers.
//!
//! Small pure functions used by both the motion and look controllers. They
//! take and return plain floats / glam types so they can be tested without an
//! ECS world.

use bevy::prelude::*;

/// Velocity applied while grounded and falling (units/second).
///
/// Keeps the body pressed against the surface without letting gravity build
/// up an ever larger downward velocity across grounded ticks.
pub const GROUNDED_STICK_VELOCITY: f32 = -2.0;

/// Pitch limit in degrees, applied symmetrically (looking up and down).
pub const PITCH_LIMIT_DEGREES: f32 = 80.0;

/// Clamp a value to `[0, 1]`.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation from `from` to `to`, with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    let t = clamp01(t);
    from + (to - from) * t
}

/// Quadratic ease-in curve (`t²`).
///
/// Not clamped: callers compare the raw value against 1 to detect completion.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Initial upward speed needed to reach `jump_height` under constant
/// deceleration `|gravity|`.
///
/// `v = sqrt(2 * h * |g|)`. The sign of `gravity` is ignored.
#[inline]
pub fn jump_velocity(jump_height: f32, gravity: f32) -> f32 {
    (jump_height * 2.0 * gravity.abs()).sqrt()
}

/// Clamp a pitch angle (degrees) to `[-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES]`.
#[inline]
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES)
}

/// Rotate a 2D movement intent into the body's facing frame.
///
/// `intent.x` strafes along the body's right, `intent.y` moves along its
/// forward (`-Z` in Bevy). The result is not normalized; an intent inside the
/// unit square stays inside it.
#[inline]
pub fn facing_direction(rotation: Quat, intent: Vec2) -> Vec3 {
    rotation * Vec3::new(intent.x, 0.0, -intent.y)
}

/// Camera local rotation for a pitch angle in degrees.
///
/// Positive pitch looks down, matching the subtraction in
/// [`LookController::process_look`](crate::look::LookController::process_look).
#[inline]
pub fn pitch_rotation(pitch_degrees: f32) -> Quat {
    Quat::from_rotation_x(-pitch_degrees.to_radians())
}

/// Incremental yaw rotation around world up for an angle in degrees.
///
/// Positive angles turn the body to the right (clockwise seen from above).
#[inline]
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_rotation_y(-yaw_degrees.to_radians())
}
