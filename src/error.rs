//! Controller error types.
//!
//! Only initialization can fail. Once a controller is attached, every
//! operation is either applied or silently ignored.

use bevy::prelude::*;
use thiserror::Error;

/// Errors reported when attaching or configuring a controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The physical body backing a motion controller is missing a capability.
    #[error("entity {entity} has no usable character body: {reason}")]
    MissingBody { entity: Entity, reason: String },

    /// The camera handed to a look controller cannot be resolved.
    #[error("look controller on {entity} cannot use camera {camera}: {reason}")]
    MissingCamera {
        entity: Entity,
        camera: Entity,
        reason: &'static str,
    },

    /// A configuration value is outside its valid range.
    #[error("invalid `{field}` = {value}: {reason}")]
    InvalidConfig {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// Settings text could not be parsed.
    #[error("failed to parse controller settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl ControllerError {
    pub(crate) fn invalid(field: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidConfig {
            field,
            value,
            reason,
        }
    }
}
