use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::action::AclAction;
use super::attributes::Attributes;
use crate::parse::ParseError;

/// One compiled authorization rule: `role` may perform `action` on
/// `resource`, limited to the attributes matched by `attributes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub role: String,
    pub resource: String,
    pub action: AclAction,
    pub attributes: String,
}

impl Grant {
    pub fn new(
        role: impl Into<String>,
        resource: impl Into<String>,
        action: AclAction,
        attributes: &Attributes,
    ) -> Self {
        Self {
            role: role.into(),
            resource: resource.into(),
            action,
            attributes: attributes.to_string(),
        }
    }

    /// Parse this grant's attributes expression.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the stored expression is not valid glob notation.
    pub fn parsed_attributes(&self) -> Result<Attributes, ParseError> {
        Attributes::parse(&self.attributes)
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} may {} {} [{}]",
            self.role, self.action, self.resource, self.attributes
        )
    }
}

/// The ordered output of a compilation.
///
/// Order is entity, then permission, then role, exactly as declared in the
/// compiled schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    grants: Vec<Grant>,
}

impl Grants {
    pub(crate) fn from_vec(grants: Vec<Grant>) -> Self {
        Self { grants }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Grant> {
        self.grants
    }

    /// Grants whose resource is `resource`, in output order.
    pub fn for_resource<'a>(&'a self, resource: &'a str) -> impl Iterator<Item = &'a Grant> {
        self.grants.iter().filter(move |g| g.resource == resource)
    }

    /// Grants issued to `role`, in output order.
    pub fn for_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Grant> {
        self.grants.iter().filter(move |g| g.role == role)
    }

    /// The first grant matching role, resource and action.
    #[must_use]
    pub fn find(&self, role: &str, resource: &str, action: AclAction) -> Option<&Grant> {
        self.grants
            .iter()
            .find(|g| g.role == role && g.resource == resource && g.action == action)
    }

    /// Render the reference `grants.json` module.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if encoding fails.
    pub fn to_module(&self) -> Result<crate::GrantsModule, serde_json::Error> {
        crate::GrantsModule::new(&self.grants)
    }
}

impl Deref for Grants {
    type Target = [Grant];

    fn deref(&self) -> &[Grant] {
        &self.grants
    }
}

impl From<Grants> for Vec<Grant> {
    fn from(grants: Grants) -> Self {
        grants.grants
    }
}

impl IntoIterator for Grants {
    type Item = Grant;
    type IntoIter = std::vec::IntoIter<Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.into_iter()
    }
}

impl<'a> IntoIterator for &'a Grants {
    type Item = &'a Grant;
    type IntoIter = std::slice::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}

impl fmt::Display for Grants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: HashSet<&str> = self.grants.iter().map(|g| g.role.as_str()).collect();
        let resources: HashSet<&str> = self.grants.iter().map(|g| g.resource.as_str()).collect();
        write!(
            f,
            "Grants({} grants, {} roles, {} resources)",
            self.grants.len(),
            roles.len(),
            resources.len(),
        )
    }
}
