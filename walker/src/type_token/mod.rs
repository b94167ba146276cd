//! Type descriptors carrying generic argument information
//!
//! A `TypeToken` is what the static walk uses as its node: a raw type plus the
//! arguments it was declared with, e.g. `Map<String, List<Task>>`. Type
//! variables (`T`) only appear inside declarations and are substituted away
//! before a walk reaches them.

mod parser;

use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::type_name::TypeName;

/// A declared type, optionally parameterized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// A concrete type with its (possibly empty) argument list
    Class {
        /// Erased type identity
        raw:       TypeName,
        /// Generic arguments in declaration order
        arguments: Vec<TypeToken>,
    },
    /// A type parameter of an enclosing declaration
    Variable(String),
}

impl TypeToken {
    /// A non-generic type, or a raw use of a generic one
    pub fn of(raw: impl Into<TypeName>) -> Self {
        Self::Class {
            raw:       raw.into(),
            arguments: Vec::new(),
        }
    }

    /// A parameterized type such as `List<Task>`
    pub fn parameterized(raw: impl Into<TypeName>, arguments: Vec<Self>) -> Self {
        Self::Class {
            raw: raw.into(),
            arguments,
        }
    }

    /// A type variable
    pub fn variable(name: impl Into<String>) -> Self { Self::Variable(name.into()) }

    /// Parse a type expression like `Provider<Map<String, Task>>`
    ///
    /// Every identifier parses as a class; use [`TypeToken::bind_parameters`] to
    /// turn the names of enclosing type parameters into variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTypeExpression`] when the input is not a single
    /// well-formed type expression.
    pub fn parse(input: &str) -> Result<Self> { parser::parse_type_token(input) }

    /// Raw type name, `None` for variables
    #[must_use]
    pub const fn raw(&self) -> Option<&TypeName> {
        match self {
            Self::Class { raw, .. } => Some(raw),
            Self::Variable(_) => None,
        }
    }

    /// Generic arguments, empty for variables and non-generic types
    #[must_use]
    pub fn arguments(&self) -> &[Self] {
        match self {
            Self::Class { arguments, .. } => arguments,
            Self::Variable(_) => &[],
        }
    }

    /// The raw type name, failing for a variable nothing has bound
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGenericShape`] for a type variable.
    pub fn require_raw(&self) -> Result<&TypeName> {
        match self {
            Self::Class { raw, .. } => Ok(raw),
            Self::Variable(name) => Err(Error::unresolved_variable(name).into()),
        }
    }

    /// Replace argument-less classes named like one of `parameters` with variables
    #[must_use]
    pub fn bind_parameters(self, parameters: &[String]) -> Self {
        match self {
            Self::Class { raw, arguments }
                if arguments.is_empty() && parameters.iter().any(|p| raw == p.as_str()) =>
            {
                Self::Variable(raw.into())
            }
            Self::Class { raw, arguments } => Self::Class {
                raw,
                arguments: arguments
                    .into_iter()
                    .map(|argument| argument.bind_parameters(parameters))
                    .collect(),
            },
            variable @ Self::Variable(_) => variable,
        }
    }

    /// Substitute bound variables, leaving unbound ones in place
    #[must_use]
    pub fn substitute(&self, bindings: &HashMap<String, Self>) -> Self {
        match self {
            Self::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Class { raw, arguments } => Self::Class {
                raw:       raw.clone(),
                arguments: arguments.iter().map(|a| a.substitute(bindings)).collect(),
            },
        }
    }

    /// Whether the token is free of type variables
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::Class { arguments, .. } => arguments.iter().all(Self::is_resolved),
        }
    }
}

impl Display for TypeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Class { raw, arguments } if arguments.is_empty() => write!(f, "{raw}"),
            Self::Class { raw, arguments } => write!(f, "{raw}<{}>", arguments.iter().join(", ")),
        }
    }
}

impl From<TypeName> for TypeToken {
    fn from(raw: TypeName) -> Self { Self::of(raw) }
}

impl Serialize for TypeToken {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Parses the rendered form; type variables come back as plain classes
impl<'de> Deserialize<'de> for TypeToken {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let expression = String::deserialize(deserializer)?;
        Self::parse(&expression).map_err(|report| D::Error::custom(report.current_context()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested_generics() {
        let token = TypeToken::parameterized(
            "Map",
            vec![
                TypeToken::of("String"),
                TypeToken::parameterized("List", vec![TypeToken::of("Task")]),
            ],
        );
        assert_eq!(token.to_string(), "Map<String, List<Task>>");
    }

    #[test]
    fn test_bind_parameters_only_touches_bare_names() {
        let token = TypeToken::parse("Map<K, List<V>>").unwrap();
        let bound = token.bind_parameters(&["K".to_string(), "V".to_string()]);
        assert_eq!(
            bound,
            TypeToken::parameterized(
                "Map",
                vec![
                    TypeToken::variable("K"),
                    TypeToken::parameterized("List", vec![TypeToken::variable("V")]),
                ],
            )
        );
        assert!(!bound.is_resolved());
    }

    #[test]
    fn test_substitute_leaves_unbound_variables() {
        let token = TypeToken::parameterized(
            "Map",
            vec![TypeToken::variable("K"), TypeToken::variable("V")],
        );
        let bindings = HashMap::from([("V".to_string(), TypeToken::of("Task"))]);
        let substituted = token.substitute(&bindings);
        assert_eq!(substituted.to_string(), "Map<K, Task>");
        assert!(!substituted.is_resolved());
    }

    #[test]
    fn test_require_raw_rejects_variables() {
        let error = TypeToken::variable("T").require_raw().unwrap_err();
        assert!(matches!(
            error.current_context(),
            Error::MalformedGenericShape { .. }
        ));
    }

    #[test]
    fn test_serializes_as_expression() {
        let token = TypeToken::parse("Provider<List<Task>>").unwrap();
        assert_eq!(
            serde_json::to_string(&token).unwrap(),
            "\"Provider<List<Task>>\""
        );
    }

    #[test]
    fn test_deserializes_from_expression() {
        let token: TypeToken = serde_json::from_str("\"Map<String, Input>\"").unwrap();
        assert_eq!(token.to_string(), "Map<String, Input>");
        assert!(serde_json::from_str::<TypeToken>("\"Map<\"").is_err());
    }
}
