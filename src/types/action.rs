use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An action declared on an entity permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityAction {
    Create,
    Delete,
    Search,
    Update,
    View,
}

impl EntityAction {
    pub const ALL: [EntityAction; 5] = [
        EntityAction::Create,
        EntityAction::Delete,
        EntityAction::Search,
        EntityAction::Update,
        EntityAction::View,
    ];

    /// The ACL action a grant for this entity action is emitted with.
    #[must_use]
    pub fn acl_action(self) -> AclAction {
        match self {
            EntityAction::Create => AclAction::CreateAny,
            EntityAction::Delete => AclAction::DeleteAny,
            EntityAction::Search => AclAction::ReadAny,
            EntityAction::Update => AclAction::UpdateAny,
            EntityAction::View => AclAction::ReadOwn,
        }
    }
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityAction::Create => "Create",
            EntityAction::Delete => "Delete",
            EntityAction::Search => "Search",
            EntityAction::Update => "Update",
            EntityAction::View => "View",
        };
        f.write_str(name)
    }
}

/// Action vocabulary of the attribute-based enforcement layer: a verb paired
/// with a possession scope (`any` or `own`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AclAction {
    #[serde(rename = "create:any")]
    CreateAny,
    #[serde(rename = "read:any")]
    ReadAny,
    #[serde(rename = "update:any")]
    UpdateAny,
    #[serde(rename = "delete:any")]
    DeleteAny,
    #[serde(rename = "create:own")]
    CreateOwn,
    #[serde(rename = "read:own")]
    ReadOwn,
    #[serde(rename = "update:own")]
    UpdateOwn,
    #[serde(rename = "delete:own")]
    DeleteOwn,
}

impl AclAction {
    pub const ALL: [AclAction; 8] = [
        AclAction::CreateAny,
        AclAction::ReadAny,
        AclAction::UpdateAny,
        AclAction::DeleteAny,
        AclAction::CreateOwn,
        AclAction::ReadOwn,
        AclAction::UpdateOwn,
        AclAction::DeleteOwn,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AclAction::CreateAny => "create:any",
            AclAction::ReadAny => "read:any",
            AclAction::UpdateAny => "update:any",
            AclAction::DeleteAny => "delete:any",
            AclAction::CreateOwn => "create:own",
            AclAction::ReadOwn => "read:own",
            AclAction::UpdateOwn => "update:own",
            AclAction::DeleteOwn => "delete:own",
        }
    }
}

impl fmt::Display for AclAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the eight ACL actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ACL action '{0}'")]
pub struct UnknownAclAction(pub String);

impl FromStr for AclAction {
    type Err = UnknownAclAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AclAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAclAction(s.to_owned()))
    }
}
