//! The `grants.json` module consumed by the enforcement layer.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Attributes, Grant, GrantcError};

/// Default path of the grants module.
pub const GRANTS_MODULE_PATH: &str = "grants.json";

/// A rendered grants module: a relative path and its file contents.
///
/// The contents are a JSON array of `{role, resource, action, attributes}`
/// objects indented with two spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantsModule {
    path: PathBuf,
    code: String,
}

impl GrantsModule {
    /// Render `grants` at the default [`GRANTS_MODULE_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if encoding fails.
    pub fn new(grants: &[Grant]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            path: PathBuf::from(GRANTS_MODULE_PATH),
            code: serde_json::to_string_pretty(grants)?,
        })
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Write the module below `dir`, creating parent directories as needed.
    /// Returns the full path written.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if a directory cannot be created or the file
    /// cannot be written.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let target = dir.as_ref().join(&self.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &self.code)?;
        debug!(path = %target.display(), bytes = self.code.len(), "wrote grants module");
        Ok(target)
    }

    /// Read grants back from module contents, checking every action and
    /// attributes expression.
    ///
    /// # Errors
    ///
    /// Returns [`GrantcError::Json`] for malformed JSON or an unknown action,
    /// and [`GrantcError::Parse`] for an invalid attributes expression.
    pub fn parse_grants(code: &str) -> Result<Vec<Grant>, GrantcError> {
        let grants: Vec<Grant> = serde_json::from_str(code)?;
        for grant in &grants {
            Attributes::parse(&grant.attributes)?;
        }
        Ok(grants)
    }
}
