//! Controller systems.
//!
//! These systems connect the pure controller cores to the ECS. They are
//! generic over the physics backend so the same motion logic drives any
//! collision engine.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::body::BackendBody;
use crate::error::ControllerError;
use crate::look::{LookController, LookInput};
use crate::motion::MotionController;
use crate::state::{
    Airborne, Crouched, Grounded, LookAttached, LookInert, MotionAttached, MotionInert,
};

/// Validate newly inserted controllers once.
///
/// Each controller is checked on its own. A [`MotionController`] that is
/// neither [`MotionAttached`] nor [`MotionInert`] has its configuration and
/// the backend's body requirements checked; a [`LookController`] that is
/// neither [`LookAttached`] nor [`LookInert`] has its configuration and camera
/// handle checked. A failure is logged and switches off only that controller.
///
/// Inserting a controller (including replacing an existing one) clears its
/// markers, so it is validated again on the next run.
pub fn attach_controllers<B: CharacterPhysicsBackend>(world: &mut World) {
    let pending_motion: Vec<(Entity, MotionController)> = world
        .query_filtered::<
            (Entity, &MotionController),
            (Without<MotionAttached>, Without<MotionInert>),
        >()
        .iter(world)
        .map(|(e, motion)| (e, motion.clone()))
        .collect();

    for (entity, motion) in pending_motion {
        match validate_motion::<B>(world, entity, &motion) {
            Ok(()) => {
                debug!("motion controller attached to {entity}");
                world.entity_mut(entity).insert(MotionAttached);
            }
            Err(err) => {
                error!("motion controller on {entity} disabled: {err}");
                world
                    .entity_mut(entity)
                    .insert(MotionInert::new(err.to_string()));
            }
        }
    }

    let pending_look: Vec<(Entity, LookController)> = world
        .query_filtered::<
            (Entity, &LookController),
            (Without<LookAttached>, Without<LookInert>),
        >()
        .iter(world)
        .map(|(e, look)| (e, look.clone()))
        .collect();

    for (entity, look) in pending_look {
        match validate_look(world, entity, &look) {
            Ok(()) => {
                debug!("look controller attached to {entity}");
                world.entity_mut(entity).insert(LookAttached);
            }
            Err(err) => {
                error!("look controller on {entity} disabled: {err}");
                world
                    .entity_mut(entity)
                    .insert(LookInert::new(err.to_string()));
            }
        }
    }
}

fn validate_motion<B: CharacterPhysicsBackend>(
    world: &World,
    entity: Entity,
    motion: &MotionController,
) -> Result<(), ControllerError> {
    motion.config().validate()?;
    B::validate_body(world, entity)
}

fn validate_look(
    world: &World,
    entity: Entity,
    look: &LookController,
) -> Result<(), ControllerError> {
    look.config().validate()?;

    let camera = look.camera();
    let reason = if camera == entity {
        Some("camera must be a separate entity from the body")
    } else if world.get_entity(camera).is_err() {
        Some("entity does not exist")
    } else if world.get::<Transform>(camera).is_none() {
        Some("entity has no Transform")
    } else if world.get::<LookController>(camera).is_some() {
        Some("camera carries its own LookController")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ControllerError::MissingCamera {
            entity,
            camera,
            reason,
        }),
        None => Ok(()),
    }
}

/// Advance every attached motion controller by one fixed tick.
///
/// Each controller is copied out, advanced against a [`BackendBody`] for its
/// entity, and written back, so the backend has full world access during the
/// tick.
pub fn advance_motion<B: CharacterPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, MotionController)> = world
        .query_filtered::<
            (Entity, &MotionController),
            (With<MotionAttached>, Without<MotionInert>),
        >()
        .iter(world)
        .map(|(e, controller)| (e, controller.clone()))
        .collect();

    for (entity, mut controller) in entities {
        let mut body = BackendBody::<B>::new(world, entity);
        controller.advance(dt, &mut body);

        if let Some(mut slot) = world.get_mut::<MotionController>(entity) {
            *slot = controller;
        }
    }
}

/// Sync state marker components with the motion controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<
        (
            Entity,
            &MotionController,
            Has<Grounded>,
            Has<Airborne>,
            Has<Crouched>,
        ),
        (With<MotionAttached>, Without<MotionInert>),
    >,
) {
    for (entity, controller, has_grounded, has_airborne, has_crouched) in &q_controllers {
        // Sync Grounded/Airborne
        if controller.is_grounded() && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !controller.is_grounded() && !has_airborne {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        }

        // Sync Crouched
        if controller.is_crouching() && !has_crouched {
            commands.entity(entity).insert(Crouched);
        } else if !controller.is_crouching() && has_crouched {
            commands.entity(entity).remove::<Crouched>();
        }
    }
}

/// Apply this frame's [`LookInput`] to every attached look controller.
///
/// Runs once per rendered frame, after the fixed-tick motion for the frame
/// has been resolved.
pub fn apply_look_input(
    time: Res<Time>,
    mut q_bodies: Query<
        (&mut LookController, &LookInput, &mut Transform),
        (With<LookAttached>, Without<LookInert>),
    >,
    mut q_cameras: Query<&mut Transform, Without<LookController>>,
) {
    let dt = time.delta_secs();

    for (mut look, input, mut body) in &mut q_bodies {
        if input.0 == Vec2::ZERO {
            continue;
        }
        let Ok(mut camera) = q_cameras.get_mut(look.camera()) else {
            continue;
        };
        look.process_look(input.0, dt, &mut camera, &mut body);
    }
}
