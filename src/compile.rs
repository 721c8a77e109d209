use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::{
    Attributes, CompileError, Entity, Grant, Grants, Permission, PermissionField, PermissionKind,
    PermissionRole, Role,
};

pub(crate) fn compile(entities: &[Entity], roles: &[Role]) -> Result<Grants, CompileError> {
    debug!(
        entities = entities.len(),
        roles = roles.len(),
        "compiling grants"
    );

    let mut grants = Vec::new();
    for entity in entities {
        for permission in &entity.permissions {
            if let Err(err) = compile_permission(entity, permission, roles, &mut grants) {
                warn!(
                    entity = %entity.name,
                    action = %permission.action,
                    error = %err,
                    "grant compilation failed"
                );
                return Err(err);
            }
        }
    }

    debug!(grants = grants.len(), "compiled grants");
    Ok(Grants::from_vec(grants))
}

fn compile_permission(
    entity: &Entity,
    permission: &Permission,
    roles: &[Role],
    out: &mut Vec<Grant>,
) -> Result<(), CompileError> {
    let action = permission.action.acl_action();
    match &permission.kind {
        PermissionKind::Disabled => {
            trace!(entity = %entity.name, action = %permission.action, "permission disabled");
        }
        PermissionKind::AllRoles { fields } => {
            if !fields.is_empty() {
                trace!(
                    entity = %entity.name,
                    action = %permission.action,
                    fields = fields.len(),
                    "field restrictions do not apply to all-roles permission"
                );
            }
            let attributes = Attributes::all();
            out.extend(
                roles
                    .iter()
                    .map(|role| Grant::new(&role.name, &entity.name, action, &attributes)),
            );
        }
        PermissionKind::Granular {
            roles: permitted,
            fields,
        } => {
            if permitted.is_empty() {
                return Err(CompileError::MissingGranularRoles {
                    entity: entity.name.clone(),
                    action: permission.action,
                });
            }
            let restrictions = FieldRestrictions::collect(fields);
            trace!(
                entity = %entity.name,
                action = %permission.action,
                roles = permitted.len(),
                restricted_fields = restrictions.fields_with_roles.len(),
                "granular permission"
            );
            out.extend(permitted.iter().map(|PermissionRole { app_role }| {
                let attributes = Attributes::all_except(restrictions.forbidden_for(&app_role.name));
                Grant::new(&app_role.name, &entity.name, action, &attributes)
            }));
        }
    }
    Ok(())
}

/// Field-level role bindings of a single permission.
struct FieldRestrictions<'a> {
    role_to_fields: HashMap<&'a str, HashSet<&'a str>>,
    /// Every field restricted to at least one role, in first-declaration order.
    fields_with_roles: Vec<&'a str>,
}

impl<'a> FieldRestrictions<'a> {
    fn collect(fields: &'a [PermissionField]) -> Self {
        let mut role_to_fields: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut fields_with_roles = Vec::new();
        let mut seen = HashSet::new();

        for permission_field in fields {
            let field = permission_field.field.name.as_str();
            for field_role in &permission_field.permission_field_roles {
                role_to_fields
                    .entry(field_role.app_role.name.as_str())
                    .or_default()
                    .insert(field);
                if seen.insert(field) {
                    fields_with_roles.push(field);
                }
            }
        }

        Self {
            role_to_fields,
            fields_with_roles,
        }
    }

    /// Restricted fields that do not name `role`.
    fn forbidden_for<'s>(&'s self, role: &str) -> impl Iterator<Item = &'a str> + 's {
        let allowed = self.role_to_fields.get(role);
        self.fields_with_roles
            .iter()
            .copied()
            .filter(move |field| allowed.is_none_or(|allowed| !allowed.contains(field)))
    }
}
