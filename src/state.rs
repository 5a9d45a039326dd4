//! State marker components.
//!
//! These components reflect the current state of a controlled character so
//! other systems can filter on them. They are added and removed by the
//! controller systems; do not insert them by hand.

use bevy::prelude::*;

/// Marker component indicating the character is grounded.
///
/// Mirrors [`MotionController::is_grounded`](crate::motion::MotionController::is_grounded)
/// after each fixed tick.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// fn footstep_sounds(q_walkers: Query<&Transform, (With<Grounded>, Without<Crouched>)>) {
///     for transform in &q_walkers {
///         // play a step at transform.translation
///     }
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the crouch stance is selected.
///
/// Present from the crouch toggle on, even while the height is still blending.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Crouched;

/// The [`MotionController`](crate::motion::MotionController) on this entity
/// passed attach-time validation and is advanced every fixed tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MotionAttached;

/// The [`LookController`](crate::look::LookController) on this entity passed
/// attach-time validation and receives look input every frame.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct LookAttached;

/// A motion controller whose body or configuration failed validation.
///
/// Only motion is switched off; a look controller on the same entity is
/// validated and driven on its own. The failure is logged once when this is
/// inserted. Replacing the [`MotionController`](crate::motion::MotionController)
/// clears it and validates again.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotionInert {
    /// Human-readable cause.
    pub reason: String,
}

impl MotionInert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A look controller whose camera or configuration failed validation.
///
/// Look input is ignored while this is present; motion keeps running.
/// Replacing the [`LookController`](crate::look::LookController) clears it and
/// validates again.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct LookInert {
    /// Human-readable cause.
    pub reason: String,
}

impl LookInert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
