use std::fmt;

use rapier3d::{
    na::{Isometry3, Translation3, UnitQuaternion, Vector3},
    prelude::*,
};

use crate::{DEFAULT_DAMPING, PhysicsError, UNIT_QUAT_EPS, material::SurfaceId};

/// Stable handle for a body inside a [`crate::PhysicsWorld`].
///
/// Visual entities hold one of these to name the body they mirror. Pairing is always by id,
/// never by insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub(crate) RigidBodyHandle);

impl BodyId {
    pub fn handle(self) -> RigidBodyHandle {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        write!(f, "{index}v{generation}")
    }
}

/// How the solver treats the body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyKind {
    /// Never moves; infinite mass.
    Static,
    /// Integrated under gravity and contacts. Mass in kilograms.
    Dynamic { mass: f32 },
}

/// Collision shape parameters (meters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeDef {
    Sphere { radius: f32 },
    /// Oriented box with the given half-extents along local X/Y/Z.
    Cuboid { half_extents: Vector3<f32> },
}

/// Everything needed to insert one rigid body and its collider.
///
/// Conventions
/// - Units are meters, kilograms, seconds.
/// - Rotation is a unit quaternion.
/// - The collider sits at the body origin with identity local transform.
#[derive(Clone, Debug)]
pub struct BodyDef {
    /// Human-readable name, used in logs and errors.
    pub label: String,
    pub kind: BodyKind,
    pub shape: ShapeDef,
    /// World-space translation.
    pub translation: Vector3<f32>,
    /// World-space rotation.
    pub rotation: UnitQuaternion<f32>,
    /// Material tag resolved through the world's contact table.
    pub surface: SurfaceId,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Initial linear velocity (m/s). Ignored for static bodies.
    pub linear_velocity: Vector3<f32>,
}

impl BodyDef {
    pub fn new(label: impl Into<String>, kind: BodyKind, shape: ShapeDef) -> Self {
        Self {
            label: label.into(),
            kind,
            shape,
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            surface: SurfaceId::Default,
            linear_damping: DEFAULT_DAMPING,
            angular_damping: DEFAULT_DAMPING,
            linear_velocity: Vector3::zeros(),
        }
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceId) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vector3<f32>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Reject definitions Rapier would accept but that produce NaNs or panics later.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fail = |reason: &str| Err(PhysicsError::invalid_body(&self.label, reason));

        if !self.translation.iter().all(|c| c.is_finite()) {
            return fail("translation is not finite");
        }

        if !self.linear_velocity.iter().all(|c| c.is_finite()) {
            return fail("linear velocity is not finite");
        }

        let q = self.rotation.quaternion();
        if !q.coords.iter().all(|c| c.is_finite()) {
            return fail("rotation is not finite");
        }
        if (q.norm() - 1.0).abs() > UNIT_QUAT_EPS {
            return fail("rotation is not a unit quaternion");
        }

        match self.shape {
            ShapeDef::Sphere { radius } if !(radius.is_finite() && radius > 0.0) => {
                return fail("sphere radius must be positive");
            }
            ShapeDef::Cuboid { half_extents }
                if !half_extents.iter().all(|e| e.is_finite() && *e > 0.0) =>
            {
                return fail("cuboid half-extents must be positive");
            }
            _ => {}
        }

        if let BodyKind::Dynamic { mass } = self.kind {
            if !(mass.is_finite() && mass > 0.0) {
                return fail("dynamic body mass must be positive");
            }
        }

        let damping_ok = |d: f32| d.is_finite() && d >= 0.0;
        if !damping_ok(self.linear_damping) || !damping_ok(self.angular_damping) {
            return fail("damping must be non-negative");
        }

        Ok(())
    }

    pub(crate) fn rigid_body(&self) -> RigidBody {
        let iso = Isometry3::from_parts(Translation3::from(self.translation), self.rotation);
        let builder = match self.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic { .. } => RigidBodyBuilder::dynamic().linvel(self.linear_velocity),
        };

        builder
            .pose(iso)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .build()
    }

    /// Build the collider attached to this body.
    ///
    /// Friction and restitution on the collider are placeholders: the contact table overrides
    /// them per pair through the solver-contact hook, which is enabled here.
    pub(crate) fn collider(&self) -> Collider {
        let builder = match self.shape {
            ShapeDef::Sphere { radius } => ColliderBuilder::ball(radius),
            ShapeDef::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        };

        let builder = builder
            .user_data(self.surface.to_user_data())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);

        match self.kind {
            BodyKind::Dynamic { mass } => builder.mass(mass).build(),
            BodyKind::Static => builder.build(),
        }
    }
}

/// World transform of a body at the time it was read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyPose {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl BodyPose {
    pub(crate) fn of(body: &RigidBody) -> Self {
        Self {
            translation: *body.translation(),
            rotation: *body.rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> BodyDef {
        BodyDef::new(
            "sphere",
            BodyKind::Dynamic { mass: 1.0 },
            ShapeDef::Sphere { radius: 1.0 },
        )
    }

    #[test]
    fn valid_definition_passes() {
        assert_eq!(sphere().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_finite_translation() {
        let def = sphere().with_translation(Vector3::new(0.0, f32::NAN, 0.0));
        assert!(matches!(
            def.validate(),
            Err(PhysicsError::InvalidBody { ref label, .. }) if label == "sphere"
        ));
    }

    #[test]
    fn rejects_degenerate_shapes_and_mass() {
        let zero_radius = BodyDef::new(
            "ball",
            BodyKind::Dynamic { mass: 1.0 },
            ShapeDef::Sphere { radius: 0.0 },
        );
        assert!(zero_radius.validate().is_err());

        let flat_box = BodyDef::new(
            "box",
            BodyKind::Static,
            ShapeDef::Cuboid {
                half_extents: Vector3::new(1.0, 0.0, 1.0),
            },
        );
        assert!(flat_box.validate().is_err());

        let massless = BodyDef::new(
            "ghost",
            BodyKind::Dynamic { mass: 0.0 },
            ShapeDef::Sphere { radius: 1.0 },
        );
        assert!(massless.validate().is_err());
    }

    #[test]
    fn rejects_negative_damping() {
        let def = sphere().with_linear_damping(-0.1);
        assert!(def.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_velocity() {
        let def = sphere().with_linear_velocity(Vector3::new(f32::INFINITY, 0.0, 0.0));
        assert!(def.validate().is_err());
    }

    #[test]
    fn rejects_non_unit_rotation() {
        let q = rapier3d::na::Quaternion::new(2.0, 0.0, 0.0, 0.0);
        let def = sphere().with_rotation(UnitQuaternion::new_unchecked(q));
        assert!(def.validate().is_err());
    }

    #[test]
    fn collider_carries_surface_tag() {
        let def = sphere().with_surface(SurfaceId::Sphere);
        let collider = def.collider();
        assert_eq!(SurfaceId::from_user_data(collider.user_data), SurfaceId::Sphere);
    }
}
