use serde::{Deserialize, Serialize};

use super::action::EntityAction;
use super::role::{Field, Role};

/// A protected resource type together with its permission declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl Entity {
    pub fn new(name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }
}

/// The access rule for one action on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub action: EntityAction,
    pub kind: PermissionKind,
}

impl Permission {
    pub fn disabled(action: EntityAction) -> Self {
        Self {
            action,
            kind: PermissionKind::Disabled,
        }
    }

    pub fn all_roles(action: EntityAction) -> Self {
        Self {
            action,
            kind: PermissionKind::AllRoles { fields: Vec::new() },
        }
    }

    pub fn granular(
        action: EntityAction,
        roles: Vec<PermissionRole>,
        fields: Vec<PermissionField>,
    ) -> Self {
        Self {
            action,
            kind: PermissionKind::Granular { roles, fields },
        }
    }
}

/// How a permission resolves to roles.
///
/// `AllRoles` keeps its field declarations so a schema round-trips, but they
/// never restrict the grants it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionKind {
    Disabled,
    AllRoles {
        fields: Vec<PermissionField>,
    },
    Granular {
        roles: Vec<PermissionRole>,
        fields: Vec<PermissionField>,
    },
}

/// Binds a role to a granular permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRole {
    pub app_role: Role,
}

impl PermissionRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            app_role: Role::new(role),
        }
    }
}

/// Declares which roles may access one field under a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionField {
    pub field: Field,
    pub permission_field_roles: Vec<PermissionFieldRole>,
}

impl PermissionField {
    pub fn new<I, S>(field: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: Field::new(field),
            permission_field_roles: roles.into_iter().map(PermissionFieldRole::new).collect(),
        }
    }
}

/// Binds a role to a field-level exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFieldRole {
    pub app_role: Role,
}

impl PermissionFieldRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            app_role: Role::new(role),
        }
    }
}
