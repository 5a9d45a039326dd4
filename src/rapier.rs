//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D, built on
//! Rapier's [`KinematicCharacterController`]. Enable with the `rapier3d`
//! feature.
//!
//! Rapier resolves character moves during its physics step, so the grounded
//! flag sampled by the motion controller is the one reported by the previous
//! step. Add the physics plugin with `in_fixed_schedule()` to get one resolved
//! move per controller tick; otherwise moves issued by several fixed ticks in
//! the same frame are accumulated and resolved together.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::MotionConfig;
use crate::error::ControllerError;
use crate::FirstPersonControllerSet;

/// Rapier3D physics backend for the character controller.
///
/// The body is a kinematic rigid body with a Y-aligned capsule collider and a
/// [`KinematicCharacterController`]. Moves are written to the character
/// controller's `translation`, height changes rebuild the capsule, and the
/// grounded flag comes from [`KinematicCharacterControllerOutput`].
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn validate_body(world: &World, entity: Entity) -> Result<(), ControllerError> {
        let missing = |reason: &str| ControllerError::MissingBody {
            entity,
            reason: reason.to_string(),
        };

        if world.get::<Transform>(entity).is_none() {
            return Err(missing("no Transform"));
        }
        if world.get::<KinematicCharacterController>(entity).is_none() {
            return Err(missing("no KinematicCharacterController"));
        }
        let Some(collider) = world.get::<Collider>(entity) else {
            return Err(missing("no Collider"));
        };
        if capsule_dimensions(collider).is_none() {
            return Err(missing("collider is not a capsule"));
        }
        Ok(())
    }

    fn is_grounded(world: &World, entity: Entity) -> bool {
        world
            .get::<KinematicCharacterControllerOutput>(entity)
            .map(|output| output.grounded)
            .unwrap_or(false)
    }

    fn get_height(world: &World, entity: Entity) -> f32 {
        world
            .get::<Collider>(entity)
            .and_then(capsule_dimensions)
            .map(|(half_height, radius)| capsule_total_height(half_height, radius))
            .unwrap_or(0.0)
    }

    fn set_height(world: &mut World, entity: Entity, height: f32) {
        let Some(mut collider) = world.get_mut::<Collider>(entity) else {
            return;
        };
        let Some((_, radius)) = capsule_dimensions(&collider) else {
            return;
        };
        *collider = capsule_for_height(height, radius);
    }

    fn move_and_collide(world: &mut World, entity: Entity, delta: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            // Accumulate until Rapier consumes the translation in its step
            let pending = controller.translation.unwrap_or(Vec3::ZERO);
            controller.translation = Some(pending + delta);
        }
    }
}

/// Orders controller motion ahead of Rapier's step.
///
/// With Rapier in `FixedPostUpdate` (`in_fixed_schedule()`) the schedules
/// already run in this order. When Rapier is scheduled in `FixedUpdate`
/// itself, this keeps each tick's move in the same physics step.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            FirstPersonControllerSet::Motion.before(PhysicsSet::SyncBackend),
        );
    }
}

/// Segment half-height and radius of a Y-aligned capsule collider.
pub fn capsule_dimensions(collider: &Collider) -> Option<(f32, f32)> {
    let capsule = collider.as_capsule()?;
    // For capsule_y(half_height, radius), the segment endpoints are at y = ±half_height
    let segment = capsule.segment();
    let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
    Some((half_height, capsule.radius()))
}

/// Total height of a capsule: both hemispheres plus the segment.
#[inline]
pub fn capsule_total_height(half_height: f32, radius: f32) -> f32 {
    2.0 * (half_height + radius)
}

/// Build a Y-aligned capsule of the given total height.
///
/// Heights below the capsule's diameter collapse to a sphere of `radius`.
pub fn capsule_for_height(height: f32, radius: f32) -> Collider {
    let half_height = (height / 2.0 - radius).max(0.0);
    Collider::capsule_y(half_height, radius)
}

/// Bundle for creating a character body with Rapier3D physics.
///
/// Contains a kinematic rigid body, a standing-height capsule and Rapier's
/// kinematic character controller. Add it next to a
/// [`MotionController`](crate::motion::MotionController) built from the same
/// config.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let config = MotionConfig::default();
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         MotionController::new(config),
///         Rapier3dCharacterBundle::new(&config, 0.4),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type (kinematic position based).
    pub rigid_body: RigidBody,
    /// The capsule collider sized for standing height.
    pub collider: Collider,
    /// Rapier's collide-and-slide character controller.
    pub character_controller: KinematicCharacterController,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new(&MotionConfig::default(), 0.5)
    }
}

impl Rapier3dCharacterBundle {
    /// Create a character body for `config` with capsule `radius`.
    pub fn new(config: &MotionConfig, radius: f32) -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            collider: capsule_for_height(config.standing_height, radius),
            character_controller: KinematicCharacterController::default(),
        }
    }

    /// Set how far below the body Rapier snaps it down onto the ground.
    ///
    /// `None` disables snapping.
    pub fn with_snap_to_ground(mut self, distance: Option<f32>) -> Self {
        self.character_controller.snap_to_ground = distance.map(CharacterLength::Absolute);
        self
    }

    /// Set the steepest slope (radians) the body can walk up.
    pub fn with_max_slope_climb_angle(mut self, angle: f32) -> Self {
        self.character_controller.max_slope_climb_angle = angle;
        self
    }
}
