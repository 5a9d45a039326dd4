//! # `fps_character_controller`
//!
//! A first-person kinematic character controller with physics backend abstraction.
//!
//! This crate provides a small, predictable controller that:
//! - Integrates gravity explicitly and keeps grounded bodies pressed to the floor
//! - Jumps to an exact apex height derived from the configured gravity
//! - Blends the body height between standing and crouching with an ease-in curve
//! - Switches between walk, sprint and crouch speeds
//! - Clamps camera pitch and turns the body for yaw
//! - Abstracts the collision engine for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! Two components hold all controller state:
//! 1. [`MotionController`](motion::MotionController) lives on the body. Your
//!    input router calls its intent methods (`jump`, `toggle_crouch`,
//!    `start_sprint`, `stop_sprint`, `set_movement_intent`) whenever it likes.
//!    Once per fixed tick the plugin advances it, producing a single
//!    collision-aware move of the body.
//! 2. [`LookController`](look::LookController) lives on the body too, holding
//!    a handle to the camera entity. Write the frame's look axes into its
//!    [`LookInput`](look::LookInput) and the plugin pitches the camera and
//!    turns the body, after the frame's fixed ticks have run.
//!
//! Each controller is checked once when it is inserted. A body the backend
//! cannot drive or an invalid motion configuration is logged and leaves the
//! motion controller [`MotionInert`](state::MotionInert); a missing camera or
//! an invalid look configuration leaves the look controller
//! [`LookInert`](state::LookInert). The other controller keeps running.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fps_character_controller::prelude::*;
//!
//! // Create controller components for a player
//! let motion = MotionController::new(MotionConfig::default());
//! let look = LookController::new(Entity::PLACEHOLDER, LookConfig::default());
//!
//! // These can be spawned on a body entity together with backend components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod body;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intent;
pub mod look;
pub mod motion;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::body::CharacterBody;
    pub use crate::config::{ControllerSettings, LookConfig, MotionConfig};
    pub use crate::error::ControllerError;
    pub use crate::intent::MovementIntent;
    pub use crate::look::{LookController, LookInput};
    pub use crate::motion::{MotionController, SpeedMode};
    pub use crate::state::{
        Airborne, Crouched, Grounded, LookAttached, LookInert, MotionAttached, MotionInert,
    };
    pub use crate::{FirstPersonControllerPlugin, FirstPersonControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dBackendPlugin, Rapier3dCharacterBundle};
}

/// System sets used by the controller, in execution order within a schedule.
///
/// `Attach`, `Motion` and `Markers` run chained in `FixedUpdate`. `Attach`
/// and `Look` run chained in `Update`, which Bevy runs after the fixed loop,
/// so the camera always sees the body's resolved transform for the frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FirstPersonControllerSet {
    /// Attach-time validation of new controllers.
    Attach,
    /// Fixed-tick motion advance.
    Motion,
    /// State marker sync.
    Markers,
    /// Per-frame look processing.
    Look,
}

/// Main plugin for the first-person controller.
///
/// This plugin is generic over a physics backend `B` which provides the
/// collision-aware body operations.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for FirstPersonControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for FirstPersonControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MotionConfig>();
        app.register_type::<config::LookConfig>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<motion::MotionController>();
        app.register_type::<motion::SpeedMode>();
        app.register_type::<look::LookController>();
        app.register_type::<look::LookInput>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Crouched>();
        app.register_type::<state::MotionAttached>();
        app.register_type::<state::MotionInert>();
        app.register_type::<state::LookAttached>();
        app.register_type::<state::LookInert>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                FirstPersonControllerSet::Attach,
                FirstPersonControllerSet::Motion,
                FirstPersonControllerSet::Markers,
            )
                .chain(),
        );
        app.configure_sets(
            Update,
            (FirstPersonControllerSet::Attach, FirstPersonControllerSet::Look).chain(),
        );

        // Motion runs in FixedUpdate for consistent integration
        app.add_systems(
            FixedUpdate,
            (
                systems::attach_controllers::<B>.in_set(FirstPersonControllerSet::Attach),
                systems::advance_motion::<B>.in_set(FirstPersonControllerSet::Motion),
                systems::sync_state_markers.in_set(FirstPersonControllerSet::Markers),
            ),
        );

        // Look runs once per frame, after the fixed loop
        app.add_systems(
            Update,
            (
                systems::attach_controllers::<B>.in_set(FirstPersonControllerSet::Attach),
                systems::apply_look_input.in_set(FirstPersonControllerSet::Look),
            ),
        );
    }
}
