use std::fmt;
use std::str::FromStr;

use crate::parse::ParseError;

/// Matches every attribute of a resource (glob notation).
pub const ALL_ATTRIBUTES_MATCHER: &str = "*";

/// A single glob matcher inside an attributes expression, such as `*` or
/// `!secret`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeMatcher {
    negated: bool,
    pattern: String,
}

impl AttributeMatcher {
    /// The `*` matcher.
    pub fn all() -> Self {
        Self::include(ALL_ATTRIBUTES_MATCHER)
    }

    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            negated: false,
            pattern: pattern.into(),
        }
    }

    /// A matcher which unmatches a specific attribute, rendered as `!attribute`.
    pub fn exclude(attribute: impl Into<String>) -> Self {
        Self {
            negated: true,
            pattern: attribute.into(),
        }
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for AttributeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(&self.pattern)
    }
}

/// A comma-joined sequence of glob matchers describing which attributes a
/// grant covers. Matchers are read left to right; a later exclusion overrides
/// an earlier wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attributes {
    matchers: Vec<AttributeMatcher>,
}

impl Attributes {
    /// `*`: every attribute.
    pub fn all() -> Self {
        Self {
            matchers: vec![AttributeMatcher::all()],
        }
    }

    /// `*` followed by one `!field` matcher per excluded field, in iteration order.
    pub fn all_except<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut matchers = vec![AttributeMatcher::all()];
        matchers.extend(fields.into_iter().map(AttributeMatcher::exclude));
        Self { matchers }
    }

    pub fn from_matchers(matchers: Vec<AttributeMatcher>) -> Self {
        Self { matchers }
    }

    /// Parse an attributes expression such as `*,!secret`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the expression is empty or a matcher is not
    /// valid glob notation.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parse::parse_attributes(input)
    }

    #[must_use]
    pub fn matchers(&self) -> &[AttributeMatcher] {
        &self.matchers
    }

    /// Patterns of the negated matchers, in expression order.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.matchers
            .iter()
            .filter(|m| m.negated)
            .map(|m| m.pattern.as_str())
    }

    /// True when the expression is exactly `*`.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(
            self.matchers.as_slice(),
            [only] if !only.negated && only.pattern == ALL_ATTRIBUTES_MATCHER
        )
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, matcher) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

impl FromStr for Attributes {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_renders_star() {
        assert_eq!(Attributes::all().to_string(), "*");
        assert!(Attributes::all().is_unrestricted());
    }

    #[test]
    fn all_except_renders_negations_in_order() {
        let attrs = Attributes::all_except(["b", "a"]);
        assert_eq!(attrs.to_string(), "*,!b,!a");
        assert_eq!(attrs.excluded().collect::<Vec<_>>(), ["b", "a"]);
        assert!(!attrs.is_unrestricted());
    }

    #[test]
    fn all_except_nothing_is_star() {
        let attrs = Attributes::all_except(Vec::<String>::new());
        assert_eq!(attrs, Attributes::all());
    }

    #[test]
    fn negative_matcher_display() {
        assert_eq!(AttributeMatcher::exclude("password").to_string(), "!password");
        assert_eq!(AttributeMatcher::include("profile.*").to_string(), "profile.*");
    }

    #[test]
    fn from_str_uses_parser() {
        let attrs: Attributes = "*,!secret".parse().unwrap();
        assert_eq!(attrs, Attributes::all_except(["secret"]));
    }
}
