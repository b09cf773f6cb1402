use crate::BodyId;

/// Errors raised while building or querying a [`crate::PhysicsWorld`].
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// The id does not name a body in this world.
    #[error("no rigid body with id {0}")]
    UnknownBody(BodyId),

    /// A body definition failed validation.
    #[error("invalid body `{label}`: {reason}")]
    InvalidBody { label: String, reason: String },

    /// World settings (timestep, substeps, gravity) are unusable.
    #[error("invalid physics settings: {0}")]
    InvalidSettings(String),
}

impl PhysicsError {
    pub(crate) fn invalid_body(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            label: label.to_owned(),
            reason: reason.into(),
        }
    }
}
