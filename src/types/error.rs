use thiserror::Error;

use super::action::EntityAction;

/// Schema errors that abort a compilation. No grants are returned when any
/// of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(
        "permission field '{field}' of {action} permission on entity '{entity}' must list its permissionFieldRoles"
    )]
    MalformedPermissionField {
        entity: String,
        action: EntityAction,
        field: String,
    },

    #[error("granular {action} permission on entity '{entity}' must define permissionRoles")]
    MissingGranularRoles {
        entity: String,
        action: EntityAction,
    },

    #[error("unexpected permission type '{kind}' for {action} on entity '{entity}'")]
    UnrecognizedPermissionType {
        entity: String,
        action: EntityAction,
        kind: String,
    },
}

impl CompileError {
    /// Name of the entity whose permission failed.
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            CompileError::MalformedPermissionField { entity, .. }
            | CompileError::MissingGranularRoles { entity, .. }
            | CompileError::UnrecognizedPermissionType { entity, .. } => entity,
        }
    }

    /// Action of the permission that failed.
    #[must_use]
    pub fn action(&self) -> EntityAction {
        match self {
            CompileError::MalformedPermissionField { action, .. }
            | CompileError::MissingGranularRoles { action, .. }
            | CompileError::UnrecognizedPermissionType { action, .. } => *action,
        }
    }
}
