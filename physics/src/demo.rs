//! The three bodies of the demo scene and the contact pairs between them.

use std::f32::consts::FRAC_PI_2;

use rapier3d::na::{UnitQuaternion, Vector3};

use crate::{
    BodyDef, BodyId, BodyKind, ContactMaterial, ContactMaterialTable, PhysicsError, PhysicsWorld,
    ShapeDef, StepSettings, SurfaceId, default_gravity,
};

/// Half-extents of the ground slab *before* its rotation: 20 x 20 m, 0.2 m thick.
pub const GROUND_HALF_EXTENTS: [f32; 3] = [10.0, 10.0, 0.1];

pub const SPHERE_RADIUS: f32 = 1.0;
pub const SPHERE_MASS: f32 = 1.0;
pub const SPHERE_START: [f32; 3] = [0.0, 7.0, 0.0];
pub const SPHERE_LINEAR_DAMPING: f32 = 0.6;

pub const BOX_HALF_EXTENT: f32 = 1.0;
pub const BOX_MASS: f32 = 1.0;
pub const BOX_START: [f32; 3] = [1.0, 10.0, 0.0];

pub const GROUND_SPHERE_MATERIAL: ContactMaterial = ContactMaterial {
    friction: 0.3,
    restitution: 0.9,
};

pub const GROUND_BOX_MATERIAL: ContactMaterial = ContactMaterial {
    friction: 0.025,
    restitution: 0.3,
};

/// Height of the ground's top face above the world origin.
pub fn ground_top() -> f32 {
    GROUND_HALF_EXTENTS[2]
}

/// Rotation that lays the ground slab flat: its local +Z becomes world +Y.
pub fn ground_rotation() -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

pub fn ground_def() -> BodyDef {
    let [x, y, z] = GROUND_HALF_EXTENTS;
    BodyDef::new(
        "ground",
        BodyKind::Static,
        ShapeDef::Cuboid {
            half_extents: Vector3::new(x, y, z),
        },
    )
    .with_rotation(ground_rotation())
    .with_surface(SurfaceId::Ground)
}

pub fn sphere_def() -> BodyDef {
    BodyDef::new(
        "sphere",
        BodyKind::Dynamic { mass: SPHERE_MASS },
        ShapeDef::Sphere {
            radius: SPHERE_RADIUS,
        },
    )
    .with_translation(Vector3::from(SPHERE_START))
    .with_surface(SurfaceId::Sphere)
    .with_linear_damping(SPHERE_LINEAR_DAMPING)
}

pub fn box_def() -> BodyDef {
    BodyDef::new(
        "box",
        BodyKind::Dynamic { mass: BOX_MASS },
        ShapeDef::Cuboid {
            half_extents: Vector3::repeat(BOX_HALF_EXTENT),
        },
    )
    .with_translation(Vector3::from(BOX_START))
    .with_surface(SurfaceId::Box)
}

pub fn demo_contact_materials() -> ContactMaterialTable {
    ContactMaterialTable::default()
        .with(SurfaceId::Ground, SurfaceId::Sphere, GROUND_SPHERE_MATERIAL)
        .with(SurfaceId::Ground, SurfaceId::Box, GROUND_BOX_MATERIAL)
}

/// Ids of the demo bodies, handed to the renderer so each mesh can name its body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoBodies {
    pub ground: BodyId,
    pub sphere: BodyId,
    pub cube: BodyId,
}

/// Build a world holding the ground, sphere and box with the demo contact table installed.
pub fn build_demo_world(settings: StepSettings) -> Result<(PhysicsWorld, DemoBodies), PhysicsError> {
    let mut world = PhysicsWorld::new(default_gravity(), settings)?;
    world.set_contact_materials(demo_contact_materials());

    let ground = world.insert(ground_def())?;
    let sphere = world.insert(sphere_def())?;
    let cube = world.insert(box_def())?;

    Ok((world, DemoBodies { ground, sphere, cube }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_rotation_maps_local_z_to_world_up() {
        let up = ground_rotation() * Vector3::z();
        assert!((up - Vector3::y()).norm() < 1.0e-6);
    }

    #[test]
    fn demo_world_has_three_bodies() {
        let (world, bodies) = build_demo_world(StepSettings::default()).unwrap();
        assert_eq!(world.len(), 3);
        assert_eq!(
            world.ids().collect::<Vec<_>>(),
            vec![bodies.ground, bodies.sphere, bodies.cube]
        );
        let sphere = world.pose(bodies.sphere).unwrap();
        assert_eq!(sphere.translation, Vector3::from(SPHERE_START));
    }

    #[test]
    fn demo_contact_table_matches_pairs() {
        let table = demo_contact_materials();
        assert_eq!(
            table.get(SurfaceId::Sphere, SurfaceId::Ground),
            GROUND_SPHERE_MATERIAL
        );
        assert_eq!(
            table.get(SurfaceId::Box, SurfaceId::Ground),
            GROUND_BOX_MATERIAL
        );
        assert_eq!(table.get(SurfaceId::Sphere, SurfaceId::Box), table.fallback());
    }

    /// Ground + sphere only, so the box can't land on the sphere and knock it around.
    fn sphere_drop(materials: ContactMaterialTable) -> (PhysicsWorld, BodyId, BodyId) {
        let mut world = PhysicsWorld::new(default_gravity(), StepSettings::default()).unwrap();
        world.set_contact_materials(materials);
        let ground = world.insert(ground_def()).unwrap();
        let sphere = world.insert(sphere_def()).unwrap();
        (world, ground, sphere)
    }

    /// Highest point the sphere reaches after it first comes within half a meter of the ground.
    fn rebound_apex(materials: ContactMaterialTable) -> f32 {
        let (mut world, _, sphere) = sphere_drop(materials);
        let near_ground = ground_top() + SPHERE_RADIUS + 0.5;

        let mut apex: Option<f32> = None;
        for _ in 0..300 {
            world.step();
            let y = world.pose(sphere).unwrap().translation.y;
            apex = match apex {
                Some(top) => Some(top.max(y)),
                None if y < near_ground => Some(y),
                None => None,
            };
        }
        apex.unwrap()
    }

    #[test]
    fn ground_sphere_restitution_bounces_the_sphere() {
        let clearance = ground_top() + SPHERE_RADIUS + 1.0;

        let bouncy = rebound_apex(demo_contact_materials());
        assert!(bouncy > clearance, "rebound apex {bouncy} should clear {clearance}");

        // Same drop with the zero-restitution fallback for every pair.
        let dead = rebound_apex(ContactMaterialTable::default());
        assert!(dead < clearance, "rebound apex {dead} should stay below {clearance}");
    }

    #[test]
    fn dropped_sphere_settles_on_ground() {
        let (mut world, ground, sphere) = sphere_drop(demo_contact_materials());
        for _ in 0..3600 {
            world.step();
        }

        let rest = ground_top() + SPHERE_RADIUS;
        let y = world.pose(sphere).unwrap().translation.y;
        assert!((y - rest).abs() < 0.05, "sphere rests at {y}, expected {rest}");
        assert_eq!(
            world.pose(ground).unwrap().translation,
            Vector3::zeros()
        );
    }

    /// Speed and distance of a box launched along +X across the ground for two seconds.
    fn box_slide(materials: ContactMaterialTable) -> (f32, f32) {
        let start_x = -8.0;
        let mut world = PhysicsWorld::new(default_gravity(), StepSettings::default()).unwrap();
        world.set_contact_materials(materials);
        world.insert(ground_def()).unwrap();
        let cube = world
            .insert(
                box_def()
                    .with_translation(Vector3::new(start_x, ground_top() + BOX_HALF_EXTENT, 0.0))
                    .with_linear_velocity(Vector3::new(5.0, 0.0, 0.0)),
            )
            .unwrap();

        for _ in 0..120 {
            world.step();
        }
        let speed = world.linear_velocity(cube).unwrap().x;
        let travelled = world.pose(cube).unwrap().translation.x - start_x;
        (speed, travelled)
    }

    #[test]
    fn ground_box_friction_lets_the_box_slide() {
        let (slick_speed, slick_travel) = box_slide(demo_contact_materials());
        let (rough_speed, rough_travel) = box_slide(ContactMaterialTable::default());

        // mu = 0.025 loses about 0.5 m/s in two seconds; mu = 0.3 stops the box in under two.
        assert!(slick_speed > 4.0, "slick box slowed to {slick_speed}");
        assert!(rough_speed.abs() < 1.0, "rough box still moving at {rough_speed}");
        assert!(slick_travel > rough_travel + 3.0);
    }
}
