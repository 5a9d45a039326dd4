//! The physical body capability.
//!
//! The motion core never talks to a physics engine directly. It talks to a
//! [`CharacterBody`]: something that can report whether it is standing on
//! ground, change its height, and move with collision resolution.
//!
//! [`BackendBody`] adapts an entity in an ECS [`World`] to this trait through a
//! [`CharacterPhysicsBackend`].

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;

/// Capabilities the motion controller needs from its physical body.
pub trait CharacterBody {
    /// Whether the last resolved move left the body on walkable ground.
    fn is_grounded(&self) -> bool;

    /// Current body height.
    fn height(&self) -> f32;

    /// Set the body height.
    fn set_height(&mut self, height: f32);

    /// Current world-space orientation, used as the facing frame for movement.
    fn rotation(&self) -> Quat;

    /// Move by `delta`, resolving collisions against the environment.
    ///
    /// The resulting contact state is reported by [`is_grounded`](Self::is_grounded)
    /// on the next tick.
    fn move_and_collide(&mut self, delta: Vec3);
}

/// A [`CharacterBody`] backed by an entity and a physics backend.
pub struct BackendBody<'w, B: CharacterPhysicsBackend> {
    world: &'w mut World,
    entity: Entity,
    _marker: PhantomData<B>,
}

impl<'w, B: CharacterPhysicsBackend> BackendBody<'w, B> {
    /// Borrow `world` to drive `entity` through backend `B`.
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self {
            world,
            entity,
            _marker: PhantomData,
        }
    }

    /// The entity this body drives.
    pub fn entity(&self) -> Entity {
        self.entity
    }
}

impl<B: CharacterPhysicsBackend> CharacterBody for BackendBody<'_, B> {
    fn is_grounded(&self) -> bool {
        B::is_grounded(self.world, self.entity)
    }

    fn height(&self) -> f32 {
        B::get_height(self.world, self.entity)
    }

    fn set_height(&mut self, height: f32) {
        B::set_height(self.world, self.entity, height);
    }

    fn rotation(&self) -> Quat {
        B::get_rotation(self.world, self.entity)
    }

    fn move_and_collide(&mut self, delta: Vec3) {
        B::move_and_collide(self.world, self.entity, delta);
    }
}
