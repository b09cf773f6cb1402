//! Rapier-backed dynamic world for the scene.
//!
//! Owns every Rapier set and pipeline needed to simulate a handful of rigid bodies, and
//! exposes the two operations the renderer needs: advance time, and read a body's pose by id.
//!
//! Design goals
//! - Renderer-agnostic: nothing here knows about meshes or frames.
//! - Explicit association: callers keep the [`BodyId`] returned by [`PhysicsWorld::insert`].
//! - Bounded catch-up: [`PhysicsWorld::advance`] never runs more than `max_substeps` steps.

use rapier3d::{na::Vector3, prelude::*};
use tracing::{debug, trace};

use crate::{
    BodyDef, BodyId, BodyPose, ContactMaterialTable, FIXED_TIMESTEP, GRAVITY_MPS2, MAX_SUBSTEPS,
    PhysicsError,
};

/// Stepping parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSettings {
    /// Seconds per internal step.
    pub timestep: f32,
    /// Cap on internal steps per [`PhysicsWorld::advance`] call.
    pub max_substeps: usize,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            timestep: FIXED_TIMESTEP,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl StepSettings {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidSettings(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidSettings(
                "max_substeps must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Default downward gravity vector.
pub fn default_gravity() -> Vector3<f32> {
    Vector3::new(0.0, -GRAVITY_MPS2, 0.0)
}

pub struct PhysicsWorld {
    gravity: Vector3<f32>,
    settings: StepSettings,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    materials: ContactMaterialTable,
    /// Insertion order, used only for deterministic iteration in [`PhysicsWorld::ids`].
    order: Vec<BodyId>,
    accumulator: f32,
    elapsed: f32,
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(gravity: Vector3<f32>, settings: StepSettings) -> Result<Self, PhysicsError> {
        if !gravity.iter().all(|g| g.is_finite()) {
            return Err(PhysicsError::InvalidSettings(
                "gravity is not finite".to_owned(),
            ));
        }
        settings.validate()?;

        let integration_parameters = IntegrationParameters {
            dt: settings.timestep,
            ..IntegrationParameters::default()
        };

        Ok(Self {
            gravity,
            settings,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            materials: ContactMaterialTable::default(),
            order: Vec::new(),
            accumulator: 0.0,
            elapsed: 0.0,
            steps: 0,
        })
    }

    pub fn settings(&self) -> StepSettings {
        self.settings
    }

    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    pub fn set_contact_materials(&mut self, materials: ContactMaterialTable) {
        self.materials = materials;
    }

    pub fn contact_materials(&self) -> &ContactMaterialTable {
        &self.materials
    }

    /// Validate `def`, then insert it as a rigid body with one attached collider.
    pub fn insert(&mut self, def: BodyDef) -> Result<BodyId, PhysicsError> {
        def.validate()?;

        let handle = self.bodies.insert(def.rigid_body());
        self.colliders
            .insert_with_parent(def.collider(), handle, &mut self.bodies);

        let id = BodyId(handle);
        self.order.push(id);
        debug!(body = %def.label, %id, kind = ?def.kind, "inserted rigid body");
        Ok(id)
    }

    /// Advance the simulation by exactly one fixed step.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &self.materials,
            &(),
        );
        self.elapsed += self.settings.timestep;
        self.steps += 1;
    }

    /// Feed `delta` seconds of wall-clock time and run as many fixed steps as fit.
    ///
    /// At most `max_substeps` steps run per call. Whatever backlog remains afterwards is
    /// reduced modulo one timestep, so a slow frame is never "paid back" later.
    /// Negative or non-finite deltas count as zero. Returns the number of steps taken.
    pub fn advance(&mut self, delta: f32) -> usize {
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }

        let dt = self.settings.timestep;
        let mut substeps = 0;
        while self.accumulator >= dt && substeps < self.settings.max_substeps {
            self.step();
            self.accumulator -= dt;
            substeps += 1;
        }
        self.accumulator %= dt;

        trace!(delta, substeps, accumulator = self.accumulator, "advanced physics");
        substeps
    }

    /// Current world transform of the body.
    pub fn pose(&self, id: BodyId) -> Result<BodyPose, PhysicsError> {
        self.bodies
            .get(id.0)
            .map(BodyPose::of)
            .ok_or(PhysicsError::UnknownBody(id))
    }

    /// Linear velocity of the body (m/s).
    pub fn linear_velocity(&self, id: BodyId) -> Result<Vector3<f32>, PhysicsError> {
        self.bodies
            .get(id.0)
            .map(|body| *body.linvel())
            .ok_or(PhysicsError::UnknownBody(id))
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id.0)
    }

    /// Body ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Total internal steps taken.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Time carried over to the next [`PhysicsWorld::advance`] call.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }
}
