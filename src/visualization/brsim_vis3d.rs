use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::log::LogPlugin;
use bevy::math::primitives::{Sphere, Torus};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::simulation::animation::AnimationKind;
use crate::simulation::animator::TickOutcome;
use crate::simulation::scenario::Scenario;
use crate::simulation::scene::{Rgb, Scene as _, Shape, Visual, VisualId};
use crate::simulation::states::{NVec3, ParticleKind};

/// World-space → screen-space scaling factor for positions and radii
const SCALE3D: f32 = 30.0;

/// Distance of the camera from the origin along +Z
const CAMERA_DISTANCE: f32 = 900.0;

const STAR_COUNT: usize = 400;

/// Root entity mirroring one scene visual
#[derive(Component)]
struct VisualTag(VisualId);

/// Child entity mirroring one mesh part of a scene visual
#[derive(Component)]
struct PartTag {
    visual: VisualId,
    index: usize,
}

/// Scene visual -> bevy root entity
#[derive(Resource, Default)]
struct Spawned(HashMap<VisualId, Entity>);

/// Viewer state that is not part of the animation itself
#[derive(Resource)]
struct AppContext {
    last_outcome: TickOutcome,
}

pub fn run_3d(mut scenario: Scenario) {
    info!(
        reaction = ?scenario.engine.reaction,
        projectile = scenario.engine.projectile.label(),
        "starting Bevy 3D viewer"
    );
    if let Err(e) = scenario.start() {
        warn!(error = %e, "could not start animation");
    }

    App::new()
        .insert_resource(scenario)
        .insert_resource(AppContext {
            last_outcome: TickOutcome::Idle,
        })
        .init_resource::<Spawned>()
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Nuclear breakup reactions".into(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
        )
        .add_systems(Startup, (setup_3d, spawn_starfield))
        .add_systems(
            Update,
            (keyboard_controls, animation_step_3d, sync_scene_3d, draw_lines_3d).chain(),
        )
        .run();
}

fn to_screen(v: &NVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32) * SCALE3D
}

fn to_color(c: Rgb, alpha: f64) -> Color {
    Color::srgba(c.0, c.1, c.2, alpha.clamp(0.0, 1.0) as f32)
}

/// Startup system: camera and light
fn setup_3d(mut commands: Commands) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.02)),
            ..Default::default()
        },
        transform: Transform::from_xyz(0.0, 60.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 1500.0,
            range: 2000.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(100.0, 100.0, CAMERA_DISTANCE),
        ..Default::default()
    });
}

/// Background stars on a far shell; purely decorative
fn spawn_starfield(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<StandardMaterial>>) {
    let mesh = meshes.add(Sphere::new(1.5).mesh());
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.8, 0.9),
        unlit: true,
        ..Default::default()
    });

    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..STAR_COUNT {
        let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..-0.2)).normalize();
        let r: f32 = rng.gen_range(1500.0..2500.0);
        commands.spawn(PbrBundle {
            mesh: mesh.clone(),
            material: material.clone(),
            transform: Transform::from_translation(dir * r),
            ..Default::default()
        });
    }
}

/// Keyboard bindings standing in for the page controls
fn keyboard_controls(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>, mut ctx: ResMut<AppContext>) {
    let mut restart = None;
    if keys.just_pressed(KeyCode::Digit1) {
        restart = Some(AnimationKind::Elastic);
    }
    if keys.just_pressed(KeyCode::Digit2) {
        restart = Some(AnimationKind::Nonelastic);
    }
    if keys.just_pressed(KeyCode::Digit3) {
        restart = Some(AnimationKind::Inelastic);
    }

    if keys.just_pressed(KeyCode::KeyP) {
        let species = ParticleKind::PROJECTILES;
        let i = species.iter().position(|k| *k == scenario.engine.projectile).unwrap_or(0);
        scenario.engine.projectile = species[(i + 1) % species.len()];
        info!(projectile = scenario.engine.projectile.label(), "projectile");
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        scenario.engine.impact_parameter = (scenario.engine.impact_parameter + 0.25).min(6.0);
        info!(impact_parameter = scenario.engine.impact_parameter, "impact parameter");
    }
    if keys.just_pressed(KeyCode::ArrowDown) {
        scenario.engine.impact_parameter = (scenario.engine.impact_parameter - 0.25).max(0.0);
        info!(impact_parameter = scenario.engine.impact_parameter, "impact parameter");
    }
    if keys.just_pressed(KeyCode::Equal) || keys.just_pressed(KeyCode::NumpadAdd) {
        let speed = (scenario.animator.speed() * 1.25).min(8.0);
        scenario.animator.set_speed(speed);
        info!(speed, "speed");
    }
    if keys.just_pressed(KeyCode::Minus) || keys.just_pressed(KeyCode::NumpadSubtract) {
        let speed = scenario.animator.speed() / 1.25;
        scenario.animator.set_speed(speed);
        info!(speed, "speed");
    }
    if keys.just_pressed(KeyCode::KeyT) {
        let enabled = !scenario.animator.trails_enabled();
        scenario.animator.set_trails_enabled(enabled);
        info!(enabled, "trails");
    }
    if keys.just_pressed(KeyCode::Space) {
        scenario.animator.stop();
    }
    if keys.just_pressed(KeyCode::KeyR) {
        scenario.animator.reset();
    }

    if let Some(kind) = restart {
        info!(reaction = ?kind, previous = ?ctx.last_outcome, "restart");
        ctx.last_outcome = TickOutcome::Idle;
        scenario.engine.reaction = kind;
        scenario.animator.reset();
        if let Err(e) = scenario.start() {
            warn!(error = %e, "could not start animation");
        }
    }
}

/// One animator tick per frame with the configured fixed delta
fn animation_step_3d(mut scenario: ResMut<Scenario>, mut ctx: ResMut<AppContext>) {
    let delta = scenario.engine.delta;
    let outcome = scenario.animator.update(delta);
    if outcome.is_finished() {
        info!(?outcome, "animation finished");
        ctx.last_outcome = outcome;
    }
}

fn spawn_visual(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    id: VisualId,
    visual: &Visual,
) -> Entity {
    // lines are drawn with gizmos every frame, only solids get meshes
    let mut children = Vec::new();
    for (index, part) in visual.parts.iter().enumerate() {
        let (mesh, rotation) = match part.shape {
            Shape::Sphere { radius } => (meshes.add(Sphere::new(radius as f32 * SCALE3D).mesh()), Quat::IDENTITY),
            Shape::Ring { inner, outer } => (
                meshes.add(Torus::new(inner as f32 * SCALE3D, outer as f32 * SCALE3D).mesh()),
                Quat::from_rotation_x(FRAC_PI_2),
            ),
            Shape::Line { .. } => continue,
        };
        let material = materials.add(StandardMaterial {
            base_color: to_color(part.color, part.opacity * visual.opacity),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..Default::default()
        });
        children.push((
            PbrBundle {
                mesh,
                material,
                transform: Transform::from_translation(to_screen(&part.offset)).with_rotation(rotation),
                ..Default::default()
            },
            PartTag { visual: id, index },
        ));
    }

    commands
        .spawn((
            SpatialBundle {
                transform: Transform::from_translation(to_screen(&visual.position)).with_scale(Vec3::splat(visual.scale as f32)),
                visibility: if visual.visible { Visibility::Visible } else { Visibility::Hidden },
                ..Default::default()
            },
            VisualTag(id),
        ))
        .with_children(|parent| {
            for child in children {
                parent.spawn(child);
            }
        })
        .id()
}

/// Mirror the animator's scene into bevy entities
fn sync_scene_3d(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<Scenario>,
    mut spawned: ResMut<Spawned>,
    mut roots: Query<(&VisualTag, &mut Transform, &mut Visibility)>,
    mut parts: Query<(&PartTag, &mut Transform, &Handle<StandardMaterial>), Without<VisualTag>>,
) {
    let scene = scenario.animator.scene();

    // removed from the scene -> despawn
    spawned.0.retain(|id, entity| {
        if scene.contains(*id) {
            true
        } else {
            commands.entity(*entity).despawn_recursive();
            false
        }
    });

    for (id, visual) in scene.iter() {
        if !spawned.0.contains_key(&id) {
            let entity = spawn_visual(&mut commands, &mut meshes, &mut materials, id, visual);
            spawned.0.insert(id, entity);
        }
    }

    for (VisualTag(id), mut transform, mut visibility) in &mut roots {
        if let Some(visual) = scene.get(*id) {
            transform.translation = to_screen(&visual.position);
            transform.scale = Vec3::splat(visual.scale as f32);
            *visibility = if visual.visible { Visibility::Visible } else { Visibility::Hidden };
        }
    }

    for (tag, mut transform, material) in &mut parts {
        let Some(visual) = scene.get(tag.visual) else { continue };
        let Some(part) = visual.parts.get(tag.index) else { continue };
        transform.translation = to_screen(&part.offset);
        transform.scale = Vec3::splat(part.scale as f32);
        if let Some(mat) = materials.get_mut(material) {
            mat.base_color = to_color(part.color, part.opacity * visual.opacity);
        }
    }
}

/// Trails and gamma-ray streaks
fn draw_lines_3d(scenario: Res<Scenario>, mut gizmos: Gizmos) {
    for (_, visual) in scenario.animator.scene().iter() {
        if !visual.visible {
            continue;
        }
        for part in &visual.parts {
            let Shape::Line { points } = &part.shape else { continue };
            if points.len() < 2 {
                continue;
            }
            let k = visual.scale * part.scale;
            let screen = points
                .iter()
                .map(|p| to_screen(&(visual.position + part.offset + p * k)));
            gizmos.linestrip(screen, to_color(part.color, part.opacity * visual.opacity));
        }
    }
}
