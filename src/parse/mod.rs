//! Parser for glob attribute expressions.
//!
//! An expression is a comma-separated list of matchers. Each matcher is an
//! optional `!` followed by a dotted pattern whose segments are identifiers
//! or `*`:
//!
//! ```text
//! *
//! *,!secret,!owner.email
//! profile.*,!profile.password
//! ```

mod error;
mod grammar;

pub use error::ParseError;

use crate::Attributes;

/// Parse an attributes expression into its matchers.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid attributes expression.
pub fn parse_attributes(input: &str) -> Result<Attributes, ParseError> {
    use winnow::Parser;
    grammar::attributes
        .parse(input)
        .map(Attributes::from_matchers)
        .map_err(|e| ParseError::new(input, e.to_string()))
}
