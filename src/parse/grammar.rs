use winnow::combinator::{alt, cut_err, opt, repeat, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::AttributeMatcher;

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '-'
        }),
    )
        .take()
        .parse_next(input)
}

// -- Patterns ---------------------------------------------------------------

fn segment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt(("*", ident)).parse_next(input)
}

fn pattern<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (segment, repeat(0.., ('.', cut_err(segment))).map(|(): ()| ()))
        .take()
        .parse_next(input)
}

fn matcher(input: &mut &str) -> ModalResult<AttributeMatcher> {
    let negated = opt('!').parse_next(input)?.is_some();
    let pattern = cut_err(pattern)
        .context(StrContext::Expected(StrContextValue::Description(
            "attribute pattern",
        )))
        .parse_next(input)?;
    Ok(if negated {
        AttributeMatcher::exclude(pattern)
    } else {
        AttributeMatcher::include(pattern)
    })
}

// -- Top-level parser -------------------------------------------------------

pub fn attributes(input: &mut &str) -> ModalResult<Vec<AttributeMatcher>> {
    separated(1.., matcher, ',').parse_next(input)
}
