//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to drive a character body from the controller systems. This allows
//! swapping the collision engine (Rapier3D, a custom sweep, a test double)
//! without touching the controller logic.

use bevy::prelude::*;

use crate::error::ControllerError;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a collision engine with the character
/// controller. All functions are static and take the ECS [`World`] so the
/// backend is free to store body state in whatever components it likes.
///
/// # Example
///
/// For an example implementation, see the `rapier` module's `Rapier3dBackend`
/// which implements this trait on top of Rapier's kinematic character
/// controller.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Check that `entity` carries everything this backend needs to move it.
    ///
    /// Called once when a motion controller is attached. An error makes the
    /// controller permanently inert.
    fn validate_body(world: &World, entity: Entity) -> Result<(), ControllerError>;

    /// Whether the last resolved move left the body on walkable ground.
    fn is_grounded(world: &World, entity: Entity) -> bool;

    /// Current body height.
    fn get_height(world: &World, entity: Entity) -> f32;

    /// Set the body height.
    fn set_height(world: &mut World, entity: Entity, height: f32);

    /// Move the body by `delta` with collision resolution.
    ///
    /// Backends that resolve moves later in the frame should accumulate
    /// multiple calls made before resolution.
    fn move_and_collide(world: &mut World, entity: Entity, delta: Vec3);

    /// Get the current rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .or_else(|| {
                world.get::<GlobalTransform>(entity).map(|t| {
                    let (_, rotation, _) = t.to_scale_rotation_translation();
                    rotation
                })
            })
            .unwrap_or(Quat::IDENTITY)
    }

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
