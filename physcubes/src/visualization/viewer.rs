use std::collections::HashSet;

use bevy::log::LogPlugin;
use bevy::math::primitives::Cuboid;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::simulation::engine::TimeSource;
use crate::simulation::entity::{BoxKind, Pose};
use crate::simulation::scenario::Scenario;
use crate::simulation::states::NVec3;
use crate::simulation::world::{BoxHandle, WorldCommand};

/// Component tagging each cube mesh with the box it draws
#[derive(Component)]
struct BoxMarker(pub BoxHandle);

/// Shared cube mesh, spans [-1, 1] on every axis so the transform scale is the box scale
#[derive(Resource)]
struct CubeMesh(Handle<Mesh>);

#[derive(Resource, Default)]
struct ViewerState {
    show_bounds: bool, // draw each box's AABB
}

/// Frame delta handed to the world as its time source
struct FrameDelta(f64);

impl TimeSource for FrameDelta {
    fn elapsed(&mut self) -> f64 {
        self.0
    }
}

const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 50.0);
const CAMERA_SPEED: f32 = 1.0;

/// Frames between two spawns while the left button is held
const SPAWN_INTERVAL: u32 = 15;

/// Distance in front of the camera where spawned boxes appear
const SPAWN_DISTANCE: f32 = 5.0;

const LIVE_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const FROZEN_COLOR: Color = Color::srgb(0.45, 0.45, 0.5);
const BOUNDS_COLOR: Color = Color::srgb(0.5, 0.5, 1.0);

pub fn run_3d(scenario: Scenario) {
    log::info!("run_3d: starting Bevy 3D viewer with {} boxes", scenario.world.len());

    App::new()
        .insert_resource(scenario)
        .init_resource::<ViewerState>()
        // logging goes through simple_logger, set up in main
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_3d)
        .add_systems(
            Update,
            (input_3d, physics_step_3d, sync_box_entities, sync_transforms_3d, draw_bounds).chain(),
        )
        .run();
}

/// Startup system: camera, light and the shared cube mesh
fn setup_3d(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        transform: Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 4_000_000.0,
            range: 200.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(10.0, 30.0, 30.0),
        ..Default::default()
    });

    commands.insert_resource(CubeMesh(meshes.add(Cuboid::new(2.0, 2.0, 2.0))));
}

/// Keyboard and mouse: camera motion plus world commands
fn input_3d(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut camera: Query<&mut Transform, With<Camera3d>>,
    mut scenario: ResMut<Scenario>,
    mut viewer: ResMut<ViewerState>,
    mut spawn_frames: Local<u32>,
) {
    let Ok(mut cam) = camera.get_single_mut() else {
        return;
    };

    let mut motion = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        motion += *cam.forward();
    }
    if keys.pressed(KeyCode::KeyS) {
        motion -= *cam.forward();
    }
    if keys.pressed(KeyCode::KeyD) {
        motion += *cam.right();
    }
    if keys.pressed(KeyCode::KeyA) {
        motion -= *cam.right();
    }
    if keys.pressed(KeyCode::KeyE) {
        motion += *cam.up();
    }
    if keys.pressed(KeyCode::KeyQ) {
        motion -= *cam.up();
    }
    cam.translation += motion * CAMERA_SPEED;

    if keys.just_pressed(KeyCode::KeyR) {
        *cam = Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y);
    }
    if keys.just_pressed(KeyCode::KeyL) {
        viewer.show_bounds = !viewer.show_bounds;
    }

    let world = &mut scenario.world;
    if keys.just_pressed(KeyCode::KeyP) {
        world.defer(WorldCommand::TogglePause);
    }
    if keys.just_pressed(KeyCode::Space) {
        world.defer(WorldCommand::ResetAll);
    }
    if keys.just_pressed(KeyCode::Escape) {
        world.defer(WorldCommand::ClearSpawned);
    }

    // Right click: push the first scenario box away from the camera
    if mouse.just_pressed(MouseButton::Right) {
        if let Some(handle) = world.first_of_kind(BoxKind::Scenario) {
            if let Some(b) = world.get_mut(handle) {
                let from_camera = b.curr_state().position - to_nvec(cam.translation);
                let dir = from_camera.try_normalize(f64::EPSILON).unwrap_or_else(NVec3::zeros);
                b.apply_force(dir, NVec3::new(0.0, 1.0, 1.0));
            }
        }
    }

    // Left held: throw a new box toward the cursor every SPAWN_INTERVAL frames
    if mouse.pressed(MouseButton::Left) && *spawn_frames > SPAWN_INTERVAL {
        *spawn_frames = 0;
        let Ok(window) = windows.get_single() else {
            return;
        };
        let Some(cursor) = window.cursor_position() else {
            return;
        };
        let size = Vec2::new(window.width(), window.height());
        let center_dist = (size - cursor) / size;

        let right = *cam.right();
        let up = *cam.up();
        let position = cam.translation
            + *cam.forward() * SPAWN_DISTANCE
            + (-right * center_dist.x + right / 2.0)
            + (up * center_dist.y - up / 2.0);

        world.defer(WorldCommand::Launch {
            position: to_nvec(position),
            launch: to_nvec(position - cam.translation),
            forward: to_nvec(*cam.forward()),
        });
    } else {
        *spawn_frames += 1;
    }
}

/// Per-frame fixed-step update of the world
fn physics_step_3d(time: Res<Time>, mut scenario: ResMut<Scenario>) {
    let mut frame = FrameDelta(time.delta_seconds_f64());
    scenario.world.update(&mut frame);
}

/// Keep one cube entity per box: spawn for new boxes, despawn for removed ones
fn sync_box_entities(
    mut commands: Commands,
    scenario: Res<Scenario>,
    cube: Res<CubeMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(Entity, &BoxMarker)>,
) {
    let mut drawn = HashSet::new();
    for (entity, BoxMarker(handle)) in &query {
        if scenario.world.get(*handle).is_some() {
            drawn.insert(*handle);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (handle, _) in scenario.world.iter() {
        if drawn.contains(&handle) {
            continue;
        }
        commands.spawn((
            PbrBundle {
                mesh: cube.0.clone(),
                material: materials.add(StandardMaterial {
                    base_color: LIVE_COLOR,
                    ..Default::default()
                }),
                ..Default::default()
            },
            BoxMarker(handle),
        ));
    }
}

/// Place every cube at its interpolated pose and tint it by live status
fn sync_transforms_3d(
    scenario: Res<Scenario>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&BoxMarker, &mut Transform, &Handle<StandardMaterial>)>,
) {
    let world = &scenario.world;
    for (BoxMarker(handle), mut transform, material) in &mut query {
        let (Some(pose), Some(b)) = (world.pose(*handle), world.get(*handle)) else {
            continue;
        };
        *transform = pose_to_transform(&pose);

        let color = if b.is_live() { LIVE_COLOR } else { FROZEN_COLOR };
        if let Some(mat) = materials.get_mut(material) {
            if mat.base_color != color {
                mat.base_color = color;
            }
        }
    }
}

/// Debug overlay of the collision bounds
fn draw_bounds(scenario: Res<Scenario>, viewer: Res<ViewerState>, mut gizmos: Gizmos) {
    if !viewer.show_bounds {
        return;
    }
    for (_, b) in scenario.world.iter() {
        let bounds = b.bounds();
        let transform = Transform::from_translation(to_vec3(&bounds.center())).with_scale(to_vec3(&bounds.size()));
        gizmos.cuboid(transform, BOUNDS_COLOR);
    }
}

fn pose_to_transform(pose: &Pose) -> Transform {
    let q = pose.orientation.quaternion();
    Transform {
        translation: to_vec3(&pose.position),
        rotation: Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32),
        scale: to_vec3(&pose.scale),
    }
}

fn to_vec3(v: &NVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn to_nvec(v: Vec3) -> NVec3 {
    NVec3::new(v.x as f64, v.y as f64, v.z as f64)
}
