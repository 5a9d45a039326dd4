//! Controller configuration.
//!
//! Configuration is supplied once, when a controller is constructed, and is
//! never mutated afterwards. All values use world units and seconds unless
//! noted otherwise.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// Configuration for a [`MotionController`](crate::motion::MotionController).
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    // === Physics ===
    /// Vertical acceleration (units/second², negative = down).
    pub gravity: f32,

    /// Apex height of a jump from flat ground.
    pub jump_height: f32,

    // === Stance ===
    /// Body height while crouched.
    pub crouch_height: f32,

    /// Body height while standing.
    pub standing_height: f32,

    /// Time for the crouch blend to reach its target (seconds).
    pub crouch_duration: f32,

    // === Speeds ===
    /// Horizontal speed while sprinting (units/second).
    pub sprint_speed: f32,

    /// Horizontal speed while walking (units/second).
    pub walk_speed: f32,

    /// Horizontal speed while crouched (units/second).
    pub crouch_speed: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            jump_height: 3.0,
            crouch_height: 1.0,
            standing_height: 2.0,
            crouch_duration: 1.0,
            sprint_speed: 8.0,
            walk_speed: 5.0,
            crouch_speed: 2.0,
        }
    }
}

impl MotionConfig {
    /// Slower, lower-jumping movement.
    pub fn tactical() -> Self {
        Self {
            jump_height: 1.0,
            crouch_duration: 0.35,
            sprint_speed: 5.5,
            walk_speed: 3.5,
            crouch_speed: 1.5,
            ..default()
        }
    }

    /// Fast movement with heavier gravity and snappy crouching.
    pub fn arcade() -> Self {
        Self {
            gravity: -20.0,
            jump_height: 1.5,
            crouch_duration: 0.15,
            sprint_speed: 12.0,
            walk_speed: 7.0,
            crouch_speed: 3.0,
            ..default()
        }
    }

    /// Builder: set gravity (should be negative).
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set jump height.
    pub fn with_jump_height(mut self, height: f32) -> Self {
        self.jump_height = height;
        self
    }

    /// Builder: set standing and crouch heights.
    pub fn with_heights(mut self, standing: f32, crouch: f32) -> Self {
        self.standing_height = standing;
        self.crouch_height = crouch;
        self
    }

    /// Builder: set crouch blend duration.
    pub fn with_crouch_duration(mut self, duration: f32) -> Self {
        self.crouch_duration = duration;
        self
    }

    /// Builder: set walk, sprint and crouch speeds.
    pub fn with_speeds(mut self, walk: f32, sprint: f32, crouch: f32) -> Self {
        self.walk_speed = walk;
        self.sprint_speed = sprint;
        self.crouch_speed = crouch;
        self
    }

    /// Check every value against its valid range.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !self.gravity.is_finite() || self.gravity >= 0.0 {
            return Err(ControllerError::invalid(
                "gravity",
                self.gravity,
                "must be negative and finite",
            ));
        }
        non_negative("jump_height", self.jump_height)?;
        positive("crouch_height", self.crouch_height)?;
        positive("standing_height", self.standing_height)?;
        positive("crouch_duration", self.crouch_duration)?;
        if self.crouch_height > self.standing_height {
            return Err(ControllerError::invalid(
                "crouch_height",
                self.crouch_height,
                "must not exceed standing_height",
            ));
        }
        non_negative("sprint_speed", self.sprint_speed)?;
        non_negative("walk_speed", self.walk_speed)?;
        non_negative("crouch_speed", self.crouch_speed)?;
        Ok(())
    }
}

/// Configuration for a [`LookController`](crate::look::LookController).
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Yaw rate per unit of horizontal look input (degrees/second).
    pub sensitivity_x: f32,

    /// Pitch rate per unit of vertical look input (degrees/second).
    pub sensitivity_y: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            sensitivity_x: 30.0,
            sensitivity_y: 30.0,
        }
    }
}

impl LookConfig {
    /// Builder: set both sensitivities.
    pub fn with_sensitivity(mut self, x: f32, y: f32) -> Self {
        self.sensitivity_x = x;
        self.sensitivity_y = y;
        self
    }

    /// Sensitivities only need to be finite; negative values invert an axis.
    pub fn validate(&self) -> Result<(), ControllerError> {
        finite("sensitivity_x", self.sensitivity_x)?;
        finite("sensitivity_y", self.sensitivity_y)?;
        Ok(())
    }
}

/// Both configurations, loadable from a RON document.
///
/// ```rust
/// use fps_character_controller::prelude::*;
///
/// let settings = ControllerSettings::from_ron(
///     "(motion: (walk_speed: 4.0), look: (sensitivity_y: 20.0))",
/// )
/// .unwrap();
/// assert_eq!(settings.motion.walk_speed, 4.0);
/// assert_eq!(settings.motion.sprint_speed, 8.0);
/// assert_eq!(settings.look.sensitivity_x, 30.0);
/// ```
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub motion: MotionConfig,
    pub look: LookConfig,
}

impl ControllerSettings {
    /// Parse and validate settings. Omitted fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ControllerError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate both halves.
    pub fn validate(&self) -> Result<(), ControllerError> {
        self.motion.validate()?;
        self.look.validate()
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ControllerError::invalid(field, value, "must be finite"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControllerError::invalid(field, value, "must be positive and finite"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControllerError::invalid(field, value, "must be non-negative and finite"))
    }
}
