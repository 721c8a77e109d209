//! Compiles per-entity, role-based permission models into flat
//! `(role, resource, action, attributes)` grants for an attribute-based
//! access-control layer.
//!
//! ```
//! use grantc::{AclAction, EntityAction, SchemaBuilder};
//!
//! let grants = SchemaBuilder::new()
//!     .role("Admin")
//!     .role("User")
//!     .entity("Widget", |e| {
//!         e.granular(EntityAction::Update, |p| {
//!             p.role("Admin").role("User").field("secret", ["Admin"])
//!         })
//!     })
//!     .compile()
//!     .unwrap();
//!
//! let user = grants.find("User", "Widget", AclAction::UpdateAny).unwrap();
//! assert_eq!(user.attributes, "*,!secret");
//! ```

mod compile;
pub mod document;
mod error;
mod module;
pub mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use error::GrantcError;
pub use module::{GRANTS_MODULE_PATH, GrantsModule};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    ALL_ATTRIBUTES_MATCHER, AclAction, AttributeMatcher, Attributes, CompileError, Entity,
    EntityAction, EntityBuilder, Field, Grant, GranularBuilder, Grants, Permission,
    PermissionField, PermissionFieldRole, PermissionKind, PermissionRole, Role, Schema,
    SchemaBuilder, UnknownAclAction,
};

/// Compile `entities` into grants, resolving all-roles permissions against
/// the full `roles` list.
///
/// Output order follows the input: entity, then permission, then role.
///
/// # Errors
///
/// Returns [`CompileError`] on the first invalid permission; no partial
/// output is produced.
pub fn compile(entities: &[Entity], roles: &[Role]) -> Result<Grants, CompileError> {
    compile::compile(entities, roles)
}
