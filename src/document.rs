//! JSON schema documents.
//!
//! A [`SchemaDocument`] mirrors the permission model as the upstream schema
//! service produces it: permission types are free-form strings and the role
//! and field lists are kept as raw JSON until the permission type says they
//! matter. [`SchemaDocument::lower`] turns it into the typed
//! [`Schema`](crate::Schema), rejecting the shapes the compiler cannot
//! express.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::{
    CompileError, Entity, EntityAction, Field, GrantcError, Permission, PermissionField,
    PermissionKind, Role, Schema,
};

const DISABLED: &str = "Disabled";
const ALL_ROLES: &str = "AllRoles";
const GRANULAR: &str = "Granular";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDocument {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionDocument>,
}

/// One permission as declared upstream. Only `type` and `action` are typed
/// eagerly; a disabled permission never looks at the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: EntityAction,
    #[serde(default)]
    pub permission_roles: Option<Value>,
    #[serde(default)]
    pub permission_fields: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFieldDocument {
    pub field: Field,
    #[serde(default)]
    pub permission_field_roles: Option<Value>,
}

/// Decode `value` as a list of `T`. Absent, `null`, non-array values and
/// arrays with badly shaped elements all yield `None`.
fn sequence<T: DeserializeOwned>(value: Option<Value>) -> Option<Vec<T>> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

impl SchemaDocument {
    /// Convert into a typed [`Schema`]. Fails on the first invalid permission.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedPermissionField`] when a field's role
    /// list is missing or not a list of role bindings,
    /// [`CompileError::MissingGranularRoles`] when a granular permission has no
    /// usable `permissionRoles`, and [`CompileError::UnrecognizedPermissionType`]
    /// for any other type string. A `permissionFields` value that is not a list
    /// of field declarations fails with [`GrantcError::Json`].
    pub fn lower(self) -> Result<Schema, GrantcError> {
        let entities = self
            .entities
            .into_iter()
            .map(EntityDocument::lower)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::new(entities, self.roles))
    }
}

impl EntityDocument {
    fn lower(self) -> Result<Entity, GrantcError> {
        let permissions = self
            .permissions
            .into_iter()
            .map(|p| p.lower(&self.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Entity::new(self.name, permissions))
    }
}

impl PermissionDocument {
    fn lower(self, entity: &str) -> Result<Permission, GrantcError> {
        let action = self.action;
        if self.kind == DISABLED {
            trace!(entity, %action, "disabled permission, payload ignored");
            return Ok(Permission::disabled(action));
        }

        let declared: Vec<PermissionFieldDocument> = match self.permission_fields {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        let fields = declared
            .into_iter()
            .map(|f| f.lower(entity, action))
            .collect::<Result<Vec<_>, _>>()?;

        let kind = match self.kind.as_str() {
            ALL_ROLES => PermissionKind::AllRoles { fields },
            GRANULAR => {
                let roles = sequence(self.permission_roles).ok_or_else(|| {
                    CompileError::MissingGranularRoles {
                        entity: entity.to_owned(),
                        action,
                    }
                })?;
                PermissionKind::Granular { roles, fields }
            }
            _ => {
                return Err(CompileError::UnrecognizedPermissionType {
                    entity: entity.to_owned(),
                    action,
                    kind: self.kind,
                }
                .into());
            }
        };
        trace!(entity, %action, kind = %self.kind, "lowered permission");
        Ok(Permission { action, kind })
    }
}

impl PermissionFieldDocument {
    fn lower(self, entity: &str, action: EntityAction) -> Result<PermissionField, CompileError> {
        let Some(permission_field_roles) = sequence(self.permission_field_roles) else {
            return Err(CompileError::MalformedPermissionField {
                entity: entity.to_owned(),
                action,
                field: self.field.name,
            });
        };
        Ok(PermissionField {
            field: self.field,
            permission_field_roles,
        })
    }
}
