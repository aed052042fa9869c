//! # ECS Error Types
//!
//! Every failure the ECS can report. None of them are transient: each one is a
//! broken caller contract and is handed straight back with `?`.

use thiserror::Error;

use crate::ecs::Entity;

/// Coarse classification of an [`EcsError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A fixed capacity (live entities, component types) was reached.
    CapacityExceeded,
    /// An entity id outside `[0, capacity)`.
    OutOfRange,
    /// Something was registered or inserted twice.
    DuplicateRegistration,
    /// The requested component, type, system or entity does not exist.
    NotFound,
}

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity creation attempted with every id already live.
    #[error("too many entities in existence: capacity {capacity} reached")]
    EntityCapacityExceeded {
        /// The live-entity capacity.
        capacity: usize,
    },

    /// All signature bits are already assigned to component types.
    #[error("cannot register component {name}: all {max} component slots are in use")]
    ComponentCapacityExceeded {
        /// The component type that did not fit.
        name: &'static str,
        /// Maximum number of component types.
        max: usize,
    },

    /// Entity id outside the valid range.
    #[error("entity {entity} out of range: ids must be below {capacity}")]
    EntityOutOfRange {
        /// The offending entity.
        entity: Entity,
        /// The exclusive upper bound for ids.
        capacity: usize,
    },

    /// The entity id is in range but not currently live.
    #[error("entity {0} is not alive")]
    EntityNotAlive(Entity),

    /// Component type registered more than once.
    #[error("component type {0} registered more than once")]
    ComponentAlreadyRegistered(&'static str),

    /// Component added to the same entity more than once.
    #[error("component {component} added to entity {entity} more than once")]
    DuplicateComponent {
        /// The entity that already holds the component.
        entity: Entity,
        /// The component type name.
        component: &'static str,
    },

    /// System type registered more than once.
    #[error("system {0} registered more than once")]
    SystemAlreadyRegistered(&'static str),

    /// The entity does not hold the requested component.
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        /// The entity queried.
        entity: Entity,
        /// The component type name.
        component: &'static str,
    },

    /// Component type used before registration.
    #[error("component type {0} used before registration")]
    ComponentNotRegistered(&'static str),

    /// System type used before registration.
    #[error("system {0} used before registration")]
    SystemNotRegistered(&'static str),
}

impl EcsError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityCapacityExceeded { .. } | Self::ComponentCapacityExceeded { .. } => {
                ErrorKind::CapacityExceeded
            }
            Self::EntityOutOfRange { .. } => ErrorKind::OutOfRange,
            Self::ComponentAlreadyRegistered(_)
            | Self::DuplicateComponent { .. }
            | Self::SystemAlreadyRegistered(_) => ErrorKind::DuplicateRegistration,
            Self::EntityNotAlive(_)
            | Self::ComponentNotFound { .. }
            | Self::ComponentNotRegistered(_)
            | Self::SystemNotRegistered(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
