use std::fmt;

use super::action::EntityAction;
use super::entity::{Entity, Permission, PermissionField, PermissionRole};
use super::error::CompileError;
use super::grant::Grants;
use super::role::Role;

/// Builder for constructing a [`Schema`].
///
/// Entities are defined via closures, in the order their grants should be
/// emitted.
///
/// # Example
///
/// ```
/// use grantc::{EntityAction, SchemaBuilder};
///
/// let grants = SchemaBuilder::new()
///     .role("Admin")
///     .role("User")
///     .entity("Widget", |e| {
///         e.all_roles(EntityAction::Create)
///             .disabled(EntityAction::Delete)
///             .granular(EntityAction::Update, |p| {
///                 p.role("Admin").role("User").field("secret", ["Admin"])
///             })
///     })
///     .compile()
///     .unwrap();
///
/// assert_eq!(grants.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<Entity>,
    roles: Vec<Role>,
}

/// Intermediate builder passed to the entity definition closure.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    permissions: Vec<Permission>,
}

/// Intermediate builder passed to the granular permission closure.
#[derive(Debug, Default)]
pub struct GranularBuilder {
    roles: Vec<PermissionRole>,
    fields: Vec<PermissionField>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a role to the full role list.
    #[must_use]
    pub fn role(mut self, name: &str) -> Self {
        self.roles.push(Role::new(name));
        self
    }

    /// Define an entity and its permissions.
    #[must_use]
    pub fn entity(mut self, name: &str, f: impl FnOnce(EntityBuilder) -> EntityBuilder) -> Self {
        let builder = f(EntityBuilder::default());
        self.entities.push(Entity::new(name, builder.permissions));
        self
    }

    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            entities: self.entities,
            roles: self.roles,
        }
    }

    /// Build the schema and compile it in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a permission is invalid.
    pub fn compile(self) -> Result<Grants, CompileError> {
        self.build().compile()
    }
}

impl EntityBuilder {
    #[must_use]
    pub fn disabled(self, action: EntityAction) -> Self {
        self.permission(Permission::disabled(action))
    }

    #[must_use]
    pub fn all_roles(self, action: EntityAction) -> Self {
        self.permission(Permission::all_roles(action))
    }

    /// Add a granular permission. The closure lists the permitted roles and
    /// any field-level restrictions.
    #[must_use]
    pub fn granular(
        self,
        action: EntityAction,
        f: impl FnOnce(GranularBuilder) -> GranularBuilder,
    ) -> Self {
        let builder = f(GranularBuilder::default());
        self.permission(Permission::granular(action, builder.roles, builder.fields))
    }

    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }
}

impl GranularBuilder {
    #[must_use]
    pub fn role(mut self, name: &str) -> Self {
        self.roles.push(PermissionRole::new(name));
        self
    }

    /// Restrict `field` to the listed roles. An empty list restricts nobody.
    #[must_use]
    pub fn field<I, S>(mut self, field: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.push(PermissionField::new(field, roles));
        self
    }
}

/// The compiler's complete input: every entity with its permissions, plus
/// every role known to the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub entities: Vec<Entity>,
    pub roles: Vec<Role>,
}

impl Schema {
    pub fn new(entities: Vec<Entity>, roles: Vec<Role>) -> Self {
        Self { entities, roles }
    }

    /// Compile the schema into grants.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a permission is invalid.
    pub fn compile(&self) -> Result<Grants, CompileError> {
        crate::compile::compile(&self.entities, &self.roles)
    }

    /// Decode a JSON schema document.
    ///
    /// # Errors
    ///
    /// Returns [`GrantcError`](crate::GrantcError) if the JSON is invalid or a
    /// permission cannot be lowered.
    pub fn from_json(input: &str) -> Result<Self, crate::GrantcError> {
        let document: crate::document::SchemaDocument = serde_json::from_str(input)?;
        document.lower()
    }

    /// Read and decode a JSON schema document.
    ///
    /// # Errors
    ///
    /// Returns [`GrantcError`](crate::GrantcError) on I/O, JSON or lowering failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::GrantcError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let permissions: usize = self.entities.iter().map(|e| e.permissions.len()).sum();
        write!(
            f,
            "Schema({} entities, {} permissions, {} roles)",
            self.entities.len(),
            permissions,
            self.roles.len(),
        )
    }
}
