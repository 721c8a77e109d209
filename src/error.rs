use thiserror::Error;

use crate::parse::ParseError;
use crate::CompileError;

/// Unified error type covering schema loading, compilation, attribute parsing,
/// and I/O.
///
/// Returned by convenience methods like [`Schema::from_json()`](crate::Schema::from_json)
/// and [`GrantsModule::parse_grants()`](crate::GrantsModule::parse_grants).
#[derive(Debug, Error)]
pub enum GrantcError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
