pub mod body;
pub mod constants;
pub mod demo;
pub mod error;
pub mod material;
pub mod world;

// Re-export the math crate so the client converts poses without its own nalgebra pin.
pub use rapier3d::na;

pub use body::{BodyDef, BodyId, BodyKind, BodyPose, ShapeDef};
pub use constants::{
    DEFAULT_DAMPING, DEFAULT_FRICTION, DEFAULT_RESTITUTION, FIXED_TIMESTEP, GRAVITY_MPS2,
    MAX_SUBSTEPS, UNIT_QUAT_EPS,
};
pub use demo::{DemoBodies, build_demo_world};
pub use error::PhysicsError;
pub use material::{ContactMaterial, ContactMaterialTable, SurfaceId};
pub use world::{PhysicsWorld, StepSettings, default_gravity};
