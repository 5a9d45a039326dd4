//! Motion controller core.
//!
//! [`MotionController`] turns movement intent and discrete actions (jump,
//! crouch, sprint) into one collision-aware displacement per fixed tick.
//!
//! # Tick order
//!
//! [`MotionController::advance`] always runs the same four steps:
//!
//! 1. **Ground sample**: read the grounded flag from the body. When grounded
//!    and falling, vertical velocity is reset to
//!    [`GROUNDED_STICK_VELOCITY`].
//! 2. **Crouch blend**: move the body height toward the stance target with an
//!    ease-in curve.
//! 3. **Gravity**: when airborne, integrate gravity into vertical velocity.
//! 4. **Displacement**: combine vertical velocity and the intent rotated into
//!    the body's facing frame, and submit it to the body in a single move.
//!
//! # Crouch blending
//!
//! Each tick interpolates from the body's *current* height toward the target,
//! so the approach decelerates. Toggling mid-blend restarts the timer from
//! whatever height the body has reached, which makes interrupted transitions
//! take a different amount of time than uninterrupted ones.

use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body::CharacterBody;
use crate::config::MotionConfig;
use crate::error::ControllerError;
use crate::geometry::{self, GROUNDED_STICK_VELOCITY};
use crate::intent::MovementIntent;
use crate::state::{MotionAttached, MotionInert};

/// Which configured speed drives horizontal movement.
///
/// Exactly one mode is active. The most recent of sprint start, sprint stop
/// and crouch toggle decides it.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMode {
    #[default]
    Walk,
    Sprint,
    Crouch,
}

impl SpeedMode {
    /// The configured speed for this mode.
    pub fn speed(self, config: &MotionConfig) -> f32 {
        match self {
            SpeedMode::Walk => config.walk_speed,
            SpeedMode::Sprint => config.sprint_speed,
            SpeedMode::Crouch => config.crouch_speed,
        }
    }
}

/// Kinematic first-person motion state.
///
/// Owns vertical velocity, the grounded flag, the speed mode and the crouch
/// blend. The configuration is fixed at construction.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_character_controller::prelude::*;
///
/// let mut motion = MotionController::new(MotionConfig::default());
/// motion.set_movement_intent(Vec2::new(0.0, 1.0));
/// motion.start_sprint();
/// assert_eq!(motion.horizontal_speed(), 8.0);
/// motion.toggle_crouch();
/// assert_eq!(motion.speed_mode(), SpeedMode::Crouch);
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[component(on_insert = revalidate_motion)]
pub struct MotionController {
    config: MotionConfig,
    intent: MovementIntent,
    vertical_velocity: f32,
    grounded: bool,
    speed_mode: SpeedMode,
    sprint_held: bool,
    crouching: bool,
    crouch_blend_active: bool,
    crouch_blend_elapsed: f32,
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl MotionController {
    /// Create a controller. The configuration is validated when the
    /// controller is attached to an entity.
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            intent: MovementIntent::default(),
            vertical_velocity: 0.0,
            grounded: false,
            speed_mode: SpeedMode::Walk,
            sprint_held: false,
            crouching: false,
            crouch_blend_active: false,
            crouch_blend_elapsed: 0.0,
        }
    }

    /// Create a controller, validating the configuration up front.
    pub fn try_new(config: MotionConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // === Intent ===

    /// Store the latest movement axes (x = strafe, y = forward).
    pub fn set_movement_intent(&mut self, axes: Vec2) {
        self.intent = MovementIntent::new(axes);
    }

    /// Launch upward with the speed needed to reach the configured jump
    /// height. Ignored while airborne.
    pub fn jump(&mut self) {
        if !self.grounded {
            return;
        }
        self.vertical_velocity =
            geometry::jump_velocity(self.config.jump_height, self.config.gravity);
        debug!("jump: vertical velocity {:.3}", self.vertical_velocity);
    }

    /// Flip the crouch stance and (re)start the height blend.
    ///
    /// Speed switches immediately to crouch speed when crouching, walk speed
    /// otherwise, overriding any sprint.
    pub fn toggle_crouch(&mut self) {
        self.crouching = !self.crouching;
        self.crouch_blend_elapsed = 0.0;
        self.crouch_blend_active = true;
        self.speed_mode = if self.crouching {
            SpeedMode::Crouch
        } else {
            SpeedMode::Walk
        };
        debug!(
            "crouch toggled: crouching={} target height {:.2}",
            self.crouching,
            self.target_height()
        );
    }

    /// Switch to sprint speed. Does not check the crouch stance.
    pub fn start_sprint(&mut self) {
        self.sprint_held = true;
        self.speed_mode = SpeedMode::Sprint;
    }

    /// Switch back to walk speed. Does not check the crouch stance.
    pub fn stop_sprint(&mut self) {
        self.sprint_held = false;
        self.speed_mode = SpeedMode::Walk;
    }

    // === Tick ===

    /// Advance one fixed tick of `dt` seconds against `body`.
    pub fn advance(&mut self, dt: f32, body: &mut impl CharacterBody) {
        let dt = dt.max(0.0);

        self.sample_ground(&*body);
        self.blend_crouch(dt, body);
        self.apply_gravity(dt);
        self.issue_displacement(dt, body);
    }

    fn sample_ground(&mut self, body: &impl CharacterBody) {
        let was_grounded = self.grounded;
        self.grounded = body.is_grounded();

        if self.grounded && self.vertical_velocity < 0.0 {
            if !was_grounded {
                debug!("landed at vertical velocity {:.3}", self.vertical_velocity);
            }
            self.vertical_velocity = GROUNDED_STICK_VELOCITY;
        }
    }

    fn blend_crouch(&mut self, dt: f32, body: &mut impl CharacterBody) {
        if !self.crouch_blend_active {
            return;
        }

        self.crouch_blend_elapsed += dt;
        // A non-positive duration blends instantly
        let t = if self.config.crouch_duration > 0.0 {
            self.crouch_blend_elapsed / self.config.crouch_duration
        } else {
            1.0
        };
        let progress = geometry::ease_in(t);

        let target = self.target_height();
        let height = geometry::lerp(body.height(), target, progress);
        body.set_height(height);

        if t >= 1.0 {
            self.crouch_blend_active = false;
            self.crouch_blend_elapsed = 0.0;
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        if !self.grounded {
            self.vertical_velocity += self.config.gravity * dt;
        }
    }

    fn issue_displacement(&mut self, dt: f32, body: &mut impl CharacterBody) {
        let horizontal =
            geometry::facing_direction(body.rotation(), self.intent.axes()) * self.horizontal_speed();
        let displacement = (Vec3::Y * self.vertical_velocity + horizontal) * dt;

        if displacement != Vec3::ZERO {
            trace!("displacement {:?}", displacement);
            body.move_and_collide(displacement);
        }
    }

    // === Queries ===

    /// The configuration this controller was built with.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// The stored movement intent.
    pub fn movement_intent(&self) -> MovementIntent {
        self.intent
    }

    /// Signed vertical speed (negative = falling).
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Grounded flag from the last ground sample.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Active speed mode.
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Horizontal speed for the active mode.
    pub fn horizontal_speed(&self) -> f32 {
        self.speed_mode.speed(&self.config)
    }

    /// Whether sprint is currently held (started and not stopped).
    ///
    /// A crouch toggle overrides the sprint speed without releasing the hold.
    pub fn is_sprint_held(&self) -> bool {
        self.sprint_held
    }

    /// Whether the crouch stance is selected.
    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    /// Whether a crouch height blend is in progress.
    pub fn crouch_blend_active(&self) -> bool {
        self.crouch_blend_active
    }

    /// Time spent in the current crouch blend (seconds).
    pub fn crouch_blend_elapsed(&self) -> f32 {
        self.crouch_blend_elapsed
    }

    /// Height the crouch blend is heading toward.
    pub fn target_height(&self) -> f32 {
        if self.crouching {
            self.config.crouch_height
        } else {
            self.config.standing_height
        }
    }

    #[cfg(test)]
    pub(crate) fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }
}

/// A newly inserted controller must pass attach validation again.
fn revalidate_motion(mut world: DeferredWorld, HookContext { entity, .. }: HookContext) {
    world.commands().queue(move |world: &mut World| {
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.remove::<(MotionAttached, MotionInert)>();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Body double that records moves and lets tests script contact.
    struct TestBody {
        grounded: bool,
        height: f32,
        rotation: Quat,
        moves: Vec<Vec3>,
    }

    impl TestBody {
        fn grounded() -> Self {
            Self {
                grounded: true,
                height: 2.0,
                rotation: Quat::IDENTITY,
                moves: Vec::new(),
            }
        }

        fn airborne() -> Self {
            Self {
                grounded: false,
                ..Self::grounded()
            }
        }
    }

    impl CharacterBody for TestBody {
        fn is_grounded(&self) -> bool {
            self.grounded
        }

        fn height(&self) -> f32 {
            self.height
        }

        fn set_height(&mut self, height: f32) {
            self.height = height;
        }

        fn rotation(&self) -> Quat {
            self.rotation
        }

        fn move_and_collide(&mut self, delta: Vec3) {
            self.moves.push(delta);
        }
    }

    fn grounded_controller(body: &mut TestBody) -> MotionController {
        let mut motion = MotionController::default();
        motion.advance(0.0, body);
        motion
    }

    // ==================== Gravity ====================

    #[test]
    fn airborne_tick_integrates_gravity() {
        let mut body = TestBody::airborne();
        let mut motion = MotionController::default();

        motion.advance(0.1, &mut body);

        assert!((motion.vertical_velocity() + 0.981).abs() < 1e-5);
        assert!(!motion.is_grounded());
    }

    #[test]
    fn airborne_velocity_strictly_decreases() {
        let mut body = TestBody::airborne();
        let mut motion = MotionController::default();

        let mut previous = motion.vertical_velocity();
        for _ in 0..20 {
            motion.advance(1.0 / 60.0, &mut body);
            assert!(motion.vertical_velocity() < previous);
            previous = motion.vertical_velocity();
        }
    }

    #[test]
    fn grounded_tick_does_not_accumulate_gravity() {
        let mut body = TestBody::grounded();
        let mut motion = MotionController::default();

        for _ in 0..10 {
            motion.advance(1.0 / 60.0, &mut body);
        }

        assert_eq!(motion.vertical_velocity(), 0.0);
    }

    #[test]
    fn landing_clamps_to_stick_velocity() {
        let mut body = TestBody::airborne();
        let mut motion = MotionController::default();

        for _ in 0..30 {
            motion.advance(1.0 / 60.0, &mut body);
        }
        assert!(motion.vertical_velocity() < GROUNDED_STICK_VELOCITY);

        body.grounded = true;
        motion.advance(1.0 / 60.0, &mut body);

        assert!(motion.is_grounded());
        assert_eq!(motion.vertical_velocity(), GROUNDED_STICK_VELOCITY);
    }

    #[test]
    fn landing_with_slow_fall_also_clamps() {
        // Even a slower fall than the stick velocity is reset to it
        let mut body = TestBody::grounded();
        let mut motion = MotionController::default();
        motion.set_vertical_velocity(-0.5);

        motion.advance(1.0 / 60.0, &mut body);

        assert_eq!(motion.vertical_velocity(), GROUNDED_STICK_VELOCITY);
    }

    #[test]
    fn grounded_rising_velocity_is_kept() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.jump();
        let launch = motion.vertical_velocity();

        // Body still reports contact on the launch tick
        motion.advance(1.0 / 60.0, &mut body);

        assert_eq!(motion.vertical_velocity(), launch);
    }

    // ==================== Jump ====================

    #[test]
    fn grounded_jump_sets_launch_velocity() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);

        motion.jump();

        let expected = (2.0_f32 * 3.0 * 9.81).sqrt();
        assert_eq!(motion.vertical_velocity(), expected);
        assert!((motion.vertical_velocity() - 7.67).abs() < 0.01);
    }

    #[test]
    fn airborne_jump_is_ignored() {
        let mut body = TestBody::airborne();
        let mut motion = MotionController::default();
        motion.advance(0.1, &mut body);
        let before = motion.vertical_velocity();

        motion.jump();

        assert_eq!(motion.vertical_velocity(), before);
    }

    #[test]
    fn jump_before_first_ground_sample_is_ignored() {
        let mut motion = MotionController::default();
        motion.jump();
        assert_eq!(motion.vertical_velocity(), 0.0);
    }

    #[test]
    fn jump_is_submitted_as_upward_move() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        body.moves.clear();
        motion.jump();

        body.grounded = false;
        motion.advance(0.1, &mut body);

        let delta = body.moves.last().copied().unwrap();
        assert!(delta.y > 0.0);
        assert_eq!(delta.x, 0.0);
        assert_eq!(delta.z, 0.0);
    }

    // ==================== Speed modes ====================

    #[test]
    fn starts_walking() {
        let motion = MotionController::default();
        assert_eq!(motion.speed_mode(), SpeedMode::Walk);
        assert_eq!(motion.horizontal_speed(), 5.0);
    }

    #[test]
    fn sprint_start_and_stop() {
        let mut motion = MotionController::default();

        motion.start_sprint();
        assert_eq!(motion.horizontal_speed(), 8.0);
        assert!(motion.is_sprint_held());

        motion.stop_sprint();
        assert_eq!(motion.horizontal_speed(), 5.0);
        assert!(!motion.is_sprint_held());
    }

    #[test]
    fn crouch_overrides_sprint() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.start_sprint();

        motion.toggle_crouch();

        assert_eq!(motion.horizontal_speed(), motion.config().crouch_speed);
        assert_eq!(motion.speed_mode(), SpeedMode::Crouch);
        // The hold is still tracked
        assert!(motion.is_sprint_held());
    }

    #[test]
    fn sprint_overrides_crouch_speed() {
        let mut motion = MotionController::default();
        motion.toggle_crouch();

        motion.start_sprint();

        assert!(motion.is_crouching());
        assert_eq!(motion.speed_mode(), SpeedMode::Sprint);
    }

    #[test]
    fn uncrouch_returns_to_walk_even_while_sprint_held() {
        let mut motion = MotionController::default();
        motion.start_sprint();
        motion.toggle_crouch();

        motion.toggle_crouch();

        assert_eq!(motion.speed_mode(), SpeedMode::Walk);
    }

    // ==================== Crouch blend ====================

    #[test]
    fn toggle_crouch_starts_blend() {
        let mut motion = MotionController::default();

        motion.toggle_crouch();

        assert!(motion.is_crouching());
        assert!(motion.crouch_blend_active());
        assert_eq!(motion.crouch_blend_elapsed(), 0.0);
        assert_eq!(motion.target_height(), 1.0);
    }

    #[test]
    fn crouch_blend_eases_toward_target() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();

        motion.advance(0.5, &mut body);

        // t = 0.5, progress = 0.25, lerp(2, 1, 0.25) = 1.75
        assert!((body.height - 1.75).abs() < 1e-5);
        assert!(motion.crouch_blend_active());
        assert!((motion.crouch_blend_elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn crouch_blend_interpolates_from_current_height() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();

        motion.advance(0.5, &mut body); // 1.75
        motion.advance(0.25, &mut body);

        // t = 0.75, progress = 0.5625, lerp(1.75, 1, 0.5625)
        let expected = 1.75 + (1.0 - 1.75) * 0.5625;
        assert!((body.height - expected).abs() < 1e-5);
    }

    #[test]
    fn crouch_blend_completes_at_target() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();

        motion.advance(0.5, &mut body);
        motion.advance(0.5, &mut body);

        assert_eq!(body.height, 1.0);
        assert!(!motion.crouch_blend_active());
        assert_eq!(motion.crouch_blend_elapsed(), 0.0);

        // Further ticks leave the height alone
        body.height = 1.3;
        motion.advance(0.5, &mut body);
        assert_eq!(body.height, 1.3);
    }

    #[test]
    fn zero_crouch_duration_blends_instantly() {
        let mut body = TestBody::grounded();
        let config = MotionConfig::default().with_crouch_duration(0.0);
        let mut motion = MotionController::new(config);
        motion.advance(0.0, &mut body);
        motion.toggle_crouch();

        motion.advance(0.0, &mut body);

        assert_eq!(body.height, 1.0);
        assert!(!motion.crouch_blend_active());
    }

    #[test]
    fn crouch_blend_overshooting_tick_snaps_to_target() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();

        motion.advance(2.0, &mut body);

        assert_eq!(body.height, 1.0);
        assert!(!motion.crouch_blend_active());
    }

    #[test]
    fn retoggle_mid_blend_restarts_from_current_height() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();
        motion.advance(0.5, &mut body);
        let interrupted = body.height;

        motion.toggle_crouch();

        assert!(!motion.is_crouching());
        assert_eq!(motion.crouch_blend_elapsed(), 0.0);
        assert!(motion.crouch_blend_active());
        // No snap on toggle
        assert_eq!(body.height, interrupted);

        motion.advance(0.5, &mut body);
        let expected = interrupted + (2.0 - interrupted) * 0.25;
        assert!((body.height - expected).abs() < 1e-5);
    }

    #[test]
    fn jump_mid_blend_keeps_blending() {
        let mut body = TestBody::grounded();
        let mut motion = grounded_controller(&mut body);
        motion.toggle_crouch();
        motion.advance(0.25, &mut body);

        motion.jump();

        assert!(motion.crouch_blend_active());
        assert!(motion.vertical_velocity() > 0.0);
    }

    // ==================== Displacement ====================

    #[test]
    fn idle_tick_issues_no_move() {
        let mut body = TestBody::grounded();
        let mut motion = MotionController::default();

        motion.advance(1.0 / 60.0, &mut body);

        assert!(body.moves.is_empty());
    }

    #[test]
    fn forward_intent_moves_along_facing() {
        let mut body = TestBody::grounded();
        body.rotation = geometry::yaw_rotation(90.0);
        let mut motion = MotionController::default();
        motion.set_movement_intent(Vec2::new(0.0, 1.0));

        motion.advance(0.1, &mut body);

        assert_eq!(body.moves.len(), 1);
        let delta = body.moves[0];
        // Facing +X after a right turn; walk speed 5 for 0.1s
        assert!((delta - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5, "got {delta:?}");
    }

    #[test]
    fn falling_and_moving_is_one_move() {
        let mut body = TestBody::airborne();
        let mut motion = MotionController::default();
        motion.set_movement_intent(Vec2::new(1.0, 0.0));
        motion.start_sprint();

        motion.advance(0.1, &mut body);

        assert_eq!(body.moves.len(), 1);
        let delta = body.moves[0];
        assert!((delta.x - 0.8).abs() < 1e-5);
        assert!((delta.y - (-0.981 * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn grounded_stick_velocity_presses_into_ground() {
        let mut body = TestBody::grounded();
        let mut motion = MotionController::default();
        motion.set_vertical_velocity(-10.0);

        motion.advance(0.1, &mut body);

        let delta = body.moves[0];
        assert!((delta.y - GROUNDED_STICK_VELOCITY * 0.1).abs() < 1e-6);
    }

    #[test]
    fn zero_intent_after_motion_stops_horizontal_movement() {
        let mut body = TestBody::grounded();
        let mut motion = MotionController::default();
        motion.set_movement_intent(Vec2::new(0.0, 1.0));
        motion.advance(0.1, &mut body);

        motion.set_movement_intent(Vec2::ZERO);
        motion.advance(0.1, &mut body);

        assert_eq!(body.moves.len(), 1);
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let config = MotionConfig::default().with_crouch_duration(-1.0);
        assert!(MotionController::try_new(config).is_err());
        assert!(MotionController::try_new(MotionConfig::default()).is_ok());
    }
}
