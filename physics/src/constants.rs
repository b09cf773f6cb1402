/// Gravity magnitude in meters per second squared (positive value).
/// Applied as a downward acceleration along -Y.
pub const GRAVITY_MPS2: f32 = 9.81;

/// Length of one internal physics step, in seconds.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Upper bound on internal steps taken by a single [`crate::PhysicsWorld::advance`] call.
///
/// Anything the accumulator still holds after this many steps is dropped, so a long stall
/// (tab in background, debugger pause) doesn't turn into a burst of catch-up steps.
pub const MAX_SUBSTEPS: usize = 3;

/// Friction used for surface pairs that have no entry in the contact table.
pub const DEFAULT_FRICTION: f32 = 0.3;

/// Restitution used for surface pairs that have no entry in the contact table.
pub const DEFAULT_RESTITUTION: f32 = 0.0;

/// Linear/angular damping for bodies that don't override it.
///
/// Damping is applied by Rapier as `v *= 1 / (1 + dt * damping)` each step.
pub const DEFAULT_DAMPING: f32 = 0.01;

/// Tolerance used when checking that an input quaternion is unit length.
pub const UNIT_QUAT_EPS: f32 = 1.0e-4;
