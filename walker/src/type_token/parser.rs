//! Parser for type expressions with support for nested generics
//!
//! This module uses nom to parse expressions like:
//! - `Task`
//! - `com::acme::Task`
//! - `Provider<List<Task>>`
//! - `Map<String, com::acme::Task>`

use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair};
use nom::{IResult, Parser};

use super::TypeToken;
use crate::error::{Error, Result};
use crate::type_name::TypeName;

/// Parse an identifier (alphanumeric + underscore)
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Parse a raw type name with an optional module path
fn raw_name(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(tag("::"), identifier)).parse(input)
}

/// Parse a generic argument list recursively
fn arguments(input: &str) -> IResult<&str, Vec<TypeToken>> {
    delimited(char('<'), separated_list1(char(','), type_token), char('>')).parse(input)
}

/// Parse one type expression, ignoring surrounding whitespace
fn type_token(input: &str) -> IResult<&str, TypeToken> {
    map(
        delimited(multispace0, pair(raw_name, opt(arguments)), multispace0),
        |(raw, arguments)| TypeToken::Class {
            raw:       TypeName::from(raw),
            arguments: arguments.unwrap_or_default(),
        },
    )
    .parse(input)
}

/// Parse a complete type expression
pub fn parse_type_token(input: &str) -> Result<TypeToken> {
    all_consuming(type_token)
        .parse(input)
        .map(|(_, token)| token)
        .map_err(|e| {
            Error::InvalidTypeExpression {
                input:   input.to_string(),
                message: format!("{e:?}"),
            }
            .into()
        })
}
