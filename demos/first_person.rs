//! First Person Example
//!
//! A walkable arena with the Rapier3D backend. Click the window to capture the
//! mouse, press Escape to release it.
//!
//! Controls:
//! - **WASD/Arrow Keys**: Move
//! - **Mouse**: Look
//! - **Space**: Jump
//! - **Left Shift** (hold): Sprint
//! - **C**: Toggle crouch

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;
use fps_character_controller::prelude::*;

const PLAYER_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 0.7;
/// Mouse pixels to look axis units.
const MOUSE_SCALE: f32 = 0.1;

const SETTINGS: &str = r#"(
    motion: (
        jump_height: 1.2,
        standing_height: 1.8,
        crouch_height: 1.0,
        crouch_duration: 0.25,
    ),
    look: (
        sensitivity_x: 240.0,
        sensitivity_y: 240.0,
    ),
)"#;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "First Person - Character Controller".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics steps once per controller tick
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(RapierDebugRenderPlugin::default())
        .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_systems(Startup, (setup_world, spawn_player))
        .add_systems(
            Update,
            (grab_cursor, handle_input)
                .chain()
                .before(FirstPersonControllerSet::Look),
        )
        .run();
}

#[derive(Component)]
struct Player;

fn load_settings() -> ControllerSettings {
    match ControllerSettings::from_ron(SETTINGS) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("using default controller settings: {err}");
            ControllerSettings::default()
        }
    }
}

fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Floor
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(60.0, 1.0, 60.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.4, 0.35))),
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(30.0, 0.5, 30.0),
    ));

    // Crates to jump on and a low beam to crouch under
    let crate_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let crate_material = materials.add(Color::srgb(0.6, 0.45, 0.3));
    for (i, x) in [-4.0, 0.0, 4.0].into_iter().enumerate() {
        let height = 0.5 + i as f32 * 0.4;
        commands.spawn((
            Mesh3d(crate_mesh.clone()),
            MeshMaterial3d(crate_material.clone()),
            Transform::from_xyz(x, height / 2.0, -8.0).with_scale(Vec3::new(2.0, height, 2.0)),
            RigidBody::Fixed,
            Collider::cuboid(0.5, 0.5, 0.5),
        ));
    }

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(6.0, 0.4, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.5))),
        Transform::from_xyz(0.0, 1.5, 6.0),
        RigidBody::Fixed,
        Collider::cuboid(3.0, 0.2, 0.5),
    ));
}

fn spawn_player(mut commands: Commands) {
    let settings = load_settings();
    let spawn_height = settings.motion.standing_height / 2.0 + 0.1;

    let camera = commands
        .spawn((Camera3d::default(), Transform::from_xyz(0.0, EYE_HEIGHT, 0.0)))
        .id();

    commands
        .spawn((
            Player,
            Transform::from_xyz(0.0, spawn_height, 0.0),
            MotionController::new(settings.motion),
            LookController::new(camera, settings.look),
            Rapier3dCharacterBundle::new(&settings.motion, PLAYER_RADIUS)
                .with_snap_to_ground(Some(0.2)),
        ))
        .add_child(camera);
}

fn grab_cursor(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut q_windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = q_windows.single_mut() else {
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Route keyboard and mouse into the controllers.
///
/// Look input is only forwarded while the cursor is captured.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    q_windows: Query<&Window, With<PrimaryWindow>>,
    mut q_player: Query<(&mut MotionController, &mut LookInput), With<Player>>,
) {
    let captured = q_windows
        .single()
        .is_ok_and(|window| window.cursor_options.grab_mode != CursorGrabMode::None);

    for (mut motion, mut look) in &mut q_player {
        let mut axes = Vec2::ZERO;
        if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
            axes.x -= 1.0;
        }
        if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
            axes.x += 1.0;
        }
        if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
            axes.y += 1.0;
        }
        if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
            axes.y -= 1.0;
        }
        motion.set_movement_intent(axes);

        if keyboard.just_pressed(KeyCode::Space) {
            motion.jump();
        }
        if keyboard.just_pressed(KeyCode::KeyC) {
            motion.toggle_crouch();
        }
        if keyboard.just_pressed(KeyCode::ShiftLeft) {
            motion.start_sprint();
        }
        if keyboard.just_released(KeyCode::ShiftLeft) {
            motion.stop_sprint();
        }

        // Screen y grows downward, look input y is positive up
        look.0 = if captured {
            Vec2::new(mouse_motion.delta.x, -mouse_motion.delta.y) * MOUSE_SCALE
        } else {
            Vec2::ZERO
        };
    }
}
