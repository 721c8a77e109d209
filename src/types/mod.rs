mod action;
mod attributes;
mod entity;
mod error;
mod grant;
mod role;
mod schema;

pub use action::{AclAction, EntityAction, UnknownAclAction};
pub use attributes::{ALL_ATTRIBUTES_MATCHER, AttributeMatcher, Attributes};
pub use entity::{
    Entity, Permission, PermissionField, PermissionFieldRole, PermissionKind, PermissionRole,
};
pub use error::CompileError;
pub use grant::{Grant, Grants};
pub use role::{Field, Role};
pub use schema::{EntityBuilder, GranularBuilder, Schema, SchemaBuilder};
