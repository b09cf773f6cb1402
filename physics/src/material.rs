//! Per-pair contact coefficients.
//!
//! Rapier stores friction/restitution on each collider and merges them with a combine rule.
//! The demo instead wants coefficients defined per *pair* of surfaces (ground vs. sphere is
//! bouncy, ground vs. box is slippery). The table below holds those pairs and is plugged into
//! the solver as a [`PhysicsHooks`] implementation, overwriting the coefficients of every
//! solver contact before it is resolved.

use std::collections::HashMap;

use rapier3d::prelude::*;

use crate::{DEFAULT_FRICTION, DEFAULT_RESTITUTION};

/// Material tag stored in each collider's `user_data`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    #[default]
    Default = 0,
    Ground = 1,
    Sphere = 2,
    Box = 3,
}

impl SurfaceId {
    pub(crate) fn to_user_data(self) -> u128 {
        self as u128
    }

    /// Unknown tags fall back to [`SurfaceId::Default`].
    pub(crate) fn from_user_data(data: u128) -> Self {
        match data {
            1 => Self::Ground,
            2 => Self::Sphere,
            3 => Self::Box,
            _ => Self::Default,
        }
    }
}

/// Coefficients applied to contacts between two surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

/// Symmetric `(SurfaceId, SurfaceId) -> ContactMaterial` lookup with a fallback entry.
#[derive(Clone, Debug, Default)]
pub struct ContactMaterialTable {
    fallback: ContactMaterial,
    pairs: HashMap<(SurfaceId, SurfaceId), ContactMaterial>,
}

impl ContactMaterialTable {
    pub fn new(fallback: ContactMaterial) -> Self {
        Self {
            fallback,
            pairs: HashMap::new(),
        }
    }

    /// Register (or replace) the material for a pair. Order of `a`/`b` does not matter.
    pub fn insert(&mut self, a: SurfaceId, b: SurfaceId, material: ContactMaterial) {
        self.pairs.insert(Self::key(a, b), material);
    }

    pub fn with(mut self, a: SurfaceId, b: SurfaceId, material: ContactMaterial) -> Self {
        self.insert(a, b, material);
        self
    }

    pub fn get(&self, a: SurfaceId, b: SurfaceId) -> ContactMaterial {
        self.pairs
            .get(&Self::key(a, b))
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> ContactMaterial {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn key(a: SurfaceId, b: SurfaceId) -> (SurfaceId, SurfaceId) {
        if (a as u8) <= (b as u8) { (a, b) } else { (b, a) }
    }
}

impl PhysicsHooks for ContactMaterialTable {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext<'_>) {
        let a = SurfaceId::from_user_data(context.colliders[context.collider1].user_data);
        let b = SurfaceId::from_user_data(context.colliders[context.collider2].user_data);
        let material = self.get(a, b);

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = material.friction;
            contact.restitution = material.restitution;
        }
    }
}
