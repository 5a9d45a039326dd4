//! Look controller core.
//!
//! [`LookController`] accumulates camera pitch and turns the body. Pitch is
//! clamped to [`PITCH_LIMIT_DEGREES`] either way; yaw is applied to the body
//! incrementally and never stored, so it has no range to maintain.

use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;

use crate::config::LookConfig;
use crate::error::ControllerError;
use crate::geometry::{self, PITCH_LIMIT_DEGREES};
use crate::state::{LookAttached, LookInert};

/// Camera pitch and body yaw from two-axis look input.
///
/// The camera is injected as an entity handle. It is checked when the
/// controller is attached; a handle that cannot be resolved leaves the
/// controller inert.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// let mut look = LookController::new(Entity::PLACEHOLDER, LookConfig::default());
/// let mut camera = Transform::default();
/// let mut body = Transform::default();
///
/// // Push the view all the way up
/// look.process_look(Vec2::new(0.0, 100.0), 1.0, &mut camera, &mut body);
/// assert_eq!(look.pitch(), -80.0);
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(LookInput)]
#[component(on_insert = revalidate_look)]
pub struct LookController {
    camera: Entity,
    config: LookConfig,
    pitch: f32,
}

impl LookController {
    /// Create a controller driving `camera`, starting level. The camera and
    /// configuration are checked when the controller is attached.
    pub fn new(camera: Entity, config: LookConfig) -> Self {
        Self {
            camera,
            config,
            pitch: 0.0,
        }
    }

    /// Create a controller, validating the configuration up front.
    pub fn try_new(camera: Entity, config: LookConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        Ok(Self::new(camera, config))
    }

    /// Apply one frame of look input.
    ///
    /// Does nothing when `input` is exactly zero. Otherwise subtracts
    /// `input.y * sensitivity_y * dt` from pitch, clamps it, writes the
    /// camera's local rotation as pure pitch, and turns `body` by
    /// `input.x * sensitivity_x * dt` degrees around world up (positive =
    /// right). A non-finite step on either axis is dropped.
    pub fn process_look(
        &mut self,
        input: Vec2,
        dt: f32,
        camera: &mut Transform,
        body: &mut Transform,
    ) {
        if input == Vec2::ZERO {
            return;
        }

        let pitch = self.pitch - input.y * self.config.sensitivity_y * dt;
        if pitch.is_finite() {
            self.pitch = geometry::clamp_pitch(pitch);
        }
        camera.rotation = geometry::pitch_rotation(self.pitch);

        let yaw = input.x * self.config.sensitivity_x * dt;
        if yaw.is_finite() {
            body.rotate(geometry::yaw_rotation(yaw));
        }
    }

    /// Current pitch in degrees (positive = looking down).
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// The injected camera entity.
    pub fn camera(&self) -> Entity {
        self.camera
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &LookConfig {
        &self.config
    }

    /// Symmetric pitch limit in degrees.
    pub const fn pitch_limit() -> f32 {
        PITCH_LIMIT_DEGREES
    }
}

/// A newly inserted controller must pass attach validation again.
fn revalidate_look(mut world: DeferredWorld, HookContext { entity, .. }: HookContext) {
    world.commands().queue(move |world: &mut World| {
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.remove::<(LookAttached, LookInert)>();
        }
    });
}

/// Look axes for the current frame, written by the input router.
///
/// `x` turns (positive = right), `y` pitches (positive = up). The value is
/// consumed as-is every frame; set it back to zero when the input stops.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct LookInput(pub Vec2);

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> LookController {
        LookController::new(Entity::PLACEHOLDER, LookConfig::default())
    }

    #[test]
    fn zero_input_is_a_no_op() {
        let mut look = controller();
        let mut camera = Transform::from_rotation(Quat::from_rotation_z(0.3));
        let mut body = Transform::from_rotation(Quat::from_rotation_y(1.0));
        let (camera_before, body_before) = (camera, body);

        look.process_look(Vec2::ZERO, 0.016, &mut camera, &mut body);

        assert_eq!(look.pitch(), 0.0);
        assert_eq!(camera, camera_before);
        assert_eq!(body, body_before);
    }

    #[test]
    fn upward_input_decreases_pitch() {
        let mut look = controller();
        let mut camera = Transform::default();
        let mut body = Transform::default();

        look.process_look(Vec2::new(0.0, 1.0), 0.1, &mut camera, &mut body);

        assert!((look.pitch() + 3.0).abs() < 1e-5);
        // Camera looks up
        assert!((camera.rotation * Vec3::NEG_Z).y > 0.0);
        // No yaw from a purely vertical input
        assert_eq!(body.rotation, Quat::IDENTITY);
    }

    #[test]
    fn pitch_stays_clamped_for_any_input() {
        let mut look = controller();
        let mut camera = Transform::default();
        let mut body = Transform::default();

        let inputs = [
            Vec2::new(0.0, 1.0e6),
            Vec2::new(3.0, -2.5e5),
            Vec2::new(-1.0, 0.01),
            Vec2::new(0.0, -1.0e9),
            Vec2::new(0.5, 7.0),
        ];
        for input in inputs {
            look.process_look(input, 0.5, &mut camera, &mut body);
            assert!(look.pitch() >= -80.0 && look.pitch() <= 80.0, "pitch {}", look.pitch());
        }
    }

    #[test]
    fn camera_rotation_is_pure_pitch() {
        let mut look = controller();
        let mut camera = Transform::default();
        let mut body = Transform::default();

        look.process_look(Vec2::new(2.0, -1.0), 0.5, &mut camera, &mut body);

        let (yaw, pitch, roll) = camera.rotation.to_euler(EulerRot::YXZ);
        assert!(yaw.abs() < 1e-5);
        assert!(roll.abs() < 1e-5);
        assert!((pitch + look.pitch().to_radians()).abs() < 1e-5);
    }

    #[test]
    fn yaw_accumulates_on_body() {
        let mut look = controller();
        let mut camera = Transform::default();
        let mut body = Transform::default();

        // 30 deg/s * 1s = 30 degrees, three times
        for _ in 0..3 {
            look.process_look(Vec2::new(1.0, 0.0), 1.0, &mut camera, &mut body);
        }

        let forward = body.rotation * Vec3::NEG_Z;
        // 90 degrees to the right faces +X
        assert!((forward - Vec3::X).length() < 1e-4, "got {forward:?}");
        assert_eq!(look.pitch(), 0.0);
    }

    #[test]
    fn yaw_keeps_turning_past_full_circle() {
        let mut look = controller();
        let mut camera = Transform::default();
        let mut body = Transform::default();

        // 12 * 30 = 360 degrees
        for _ in 0..12 {
            look.process_look(Vec2::new(1.0, 0.0), 1.0, &mut camera, &mut body);
        }

        let forward = body.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-3, "got {forward:?}");
    }

    #[test]
    fn inverted_sensitivity_flips_pitch() {
        let config = LookConfig::default().with_sensitivity(30.0, -30.0);
        let mut look = LookController::new(Entity::PLACEHOLDER, config);
        let mut camera = Transform::default();
        let mut body = Transform::default();

        look.process_look(Vec2::new(0.0, 1.0), 0.1, &mut camera, &mut body);

        assert!(look.pitch() > 0.0);
    }

    #[test]
    fn non_finite_pitch_step_keeps_previous_pitch() {
        let config = LookConfig::default().with_sensitivity(30.0, f32::NAN);
        let mut look = LookController::new(Entity::PLACEHOLDER, config);
        let mut camera = Transform::default();
        let mut body = Transform::default();

        look.process_look(Vec2::new(0.0, 1.0), 0.1, &mut camera, &mut body);

        assert_eq!(look.pitch(), 0.0);
    }

    #[test]
    fn try_new_rejects_non_finite_sensitivity() {
        let config = LookConfig::default().with_sensitivity(f32::NAN, 1.0);
        assert!(LookController::try_new(Entity::PLACEHOLDER, config).is_err());
    }
}
