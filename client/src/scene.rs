use crate::{
    AppState,
    physics::{Physics, PhysicsBody, SceneBodies, pose_to_transform},
};
use bevy::prelude::*;
use scene_physics::{BodyId, demo};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Running), spawn_scene);
}

const SPHERE_SEGMENTS: u32 = 50;

/// Marker for the meshes driven by physics, mostly for queries in tools and tests.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneObject {
    Ground,
    Sphere,
    Cube,
}

fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    physics: Option<Res<Physics>>,
    bodies: Option<Res<SceneBodies>>,
) {
    let (Some(physics), Some(bodies)) = (physics, bodies) else {
        error!("physics world missing; scene left empty");
        return;
    };
    let bodies = bodies.0;

    // Glossy white picks up the environment map reflections.
    let glossy = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.0,
        metallic: 0.0,
        ..default()
    });

    let ground_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let [half_x, half_y, _] = demo::GROUND_HALF_EXTENTS;
    // Normal +Z: the ground body's rotation turns it to face up.
    let ground_mesh = meshes.add(Plane3d::new(Vec3::Z, Vec2::new(half_x, half_y)));
    let sphere_mesh = meshes.add(
        Sphere::new(demo::SPHERE_RADIUS)
            .mesh()
            .uv(SPHERE_SEGMENTS, SPHERE_SEGMENTS),
    );
    let box_mesh = meshes.add(Cuboid::from_length(demo::BOX_HALF_EXTENT * 2.0));

    let initial = |id: BodyId| match physics.pose(id) {
        Ok(pose) => pose_to_transform(&pose, Vec3::ONE),
        Err(err) => {
            warn!("no initial pose: {err}");
            Transform::default()
        }
    };

    commands.spawn((
        Name::new("Sphere"),
        SceneObject::Sphere,
        PhysicsBody(bodies.sphere),
        Mesh3d(sphere_mesh),
        MeshMaterial3d(glossy.clone()),
        initial(bodies.sphere),
    ));

    commands.spawn((
        Name::new("Ground"),
        SceneObject::Ground,
        PhysicsBody(bodies.ground),
        Mesh3d(ground_mesh),
        MeshMaterial3d(ground_material),
        initial(bodies.ground),
    ));

    commands.spawn((
        Name::new("Box"),
        SceneObject::Cube,
        PhysicsBody(bodies.cube),
        Mesh3d(box_mesh),
        MeshMaterial3d(glossy),
        initial(bodies.cube),
    ));

    // light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("scene spawned");
}
