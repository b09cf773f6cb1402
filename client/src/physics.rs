//! Per-frame scene synchronization.
//!
//! Each frame, while the scene is running:
//! 1. `step_physics` advances the Rapier world,
//! 2. `sync_transforms` copies every body's pose onto the `Transform` of the entity that names
//!    it through [`PhysicsBody`],
//! 3. Bevy renders the frame and schedules the next one.
//!
//! The physics body is the only source of truth for a synced entity's translation and rotation.
//! Nothing else should write those two fields.

use crate::{
    AppState,
    settings::{SceneSettings, TickMode},
};
use bevy::{platform::collections::HashSet, prelude::*};
use scene_physics::{
    BodyId, BodyPose, DemoBodies, PhysicsWorld, StepSettings, build_demo_world,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup_physics);
    app.add_systems(
        Update,
        (step_physics, sync_transforms)
            .chain()
            .run_if(in_state(AppState::Running).and(resource_exists::<Physics>)),
    );
}

/// The simulated world, owned by the ECS.
#[derive(Resource, Deref, DerefMut)]
pub struct Physics(pub PhysicsWorld);

/// Ids of the demo bodies, available once [`Physics`] is built.
#[derive(Resource, Clone, Copy, Debug)]
pub struct SceneBodies(pub DemoBodies);

/// Names the physics body whose pose this entity mirrors.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsBody(pub BodyId);

/// Convert a body pose into a render transform, keeping the caller's scale.
pub fn pose_to_transform(pose: &BodyPose, scale: Vec3) -> Transform {
    let t = pose.translation;
    let q = pose.rotation.quaternion().coords;
    Transform {
        translation: Vec3::new(t.x, t.y, t.z),
        rotation: Quat::from_xyzw(q.x, q.y, q.z, q.w),
        scale,
    }
}

fn setup_physics(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    match build_demo_world(StepSettings::default()) {
        Ok((world, bodies)) => {
            info!(bodies = world.len(), "physics world ready");
            commands.insert_resource(Physics(world));
            commands.insert_resource(SceneBodies(bodies));
        }
        Err(err) => {
            error!("failed to build physics world: {err}");
            exit.write(AppExit::error());
        }
    }
}

pub(crate) fn step_physics(
    mut physics: ResMut<Physics>,
    settings: Res<SceneSettings>,
    time: Res<Time>,
) {
    match settings.tick_mode {
        TickMode::SingleStep => physics.step(),
        TickMode::Accumulated => {
            physics.advance(time.delta_secs());
        }
    }
}

/// Copy body poses onto their entities. Safe to run any number of times per step.
pub(crate) fn sync_transforms(
    physics: Res<Physics>,
    mut bodies_q: Query<(Entity, &PhysicsBody, &mut Transform)>,
    mut reported: Local<HashSet<Entity>>,
) {
    for (entity, body, mut transform) in &mut bodies_q {
        match physics.pose(body.0) {
            Ok(pose) => {
                let synced = pose_to_transform(&pose, transform.scale);
                transform.set_if_neq(synced);
            }
            Err(err) => {
                // Warn once; the entity keeps its last transform.
                if reported.insert(entity) {
                    warn!(?entity, "skipping transform sync: {err}");
                }
            }
        }
    }
}
