//! Movement intent.
//!
//! The intent is the desired forward/strafe direction as reported by whatever
//! routes input to the controller (keyboard, gamepad, AI, network). It is
//! stored as-is and reinterpreted in the body's facing frame every tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Desired planar movement on two axes.
///
/// `x` strafes (-1 = left, 1 = right), `y` moves (-1 = back, 1 = forward).
/// A zero vector means "no input".
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// let intent = MovementIntent::new(Vec2::new(0.0, 3.0));
/// assert_eq!(intent.axes(), Vec2::new(0.0, 1.0));
/// assert!(intent.is_active());
/// assert!(!MovementIntent::default().is_active());
/// ```
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementIntent {
    axes: Vec2,
}

impl MovementIntent {
    /// Create an intent, clamping each axis to `[-1, 1]`.
    ///
    /// Non-finite components are treated as no input on that axis.
    pub fn new(axes: Vec2) -> Self {
        Self {
            axes: Vec2::new(clamp_axis(axes.x), clamp_axis(axes.y)),
        }
    }

    /// The stored axes.
    #[inline]
    pub fn axes(&self) -> Vec2 {
        self.axes
    }

    /// Strafe axis.
    #[inline]
    pub fn strafe(&self) -> f32 {
        self.axes.x
    }

    /// Forward axis.
    #[inline]
    pub fn forward(&self) -> f32 {
        self.axes.y
    }

    /// Whether any axis is non-zero.
    pub fn is_active(&self) -> bool {
        self.axes != Vec2::ZERO
    }

    /// Reset to no input.
    pub fn clear(&mut self) {
        self.axes = Vec2::ZERO;
    }
}

impl From<Vec2> for MovementIntent {
    fn from(axes: Vec2) -> Self {
        Self::new(axes)
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
