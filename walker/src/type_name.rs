//! A newtype wrapper for raw type names used throughout the walker
//!
//! A `TypeName` is the erased identity of a declared type (e.g. `Provider`,
//! `com::acme::CompileTask`). Generic arguments never appear in a `TypeName`;
//! those live on [`TypeToken`](crate::TypeToken).

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// A raw type name used as the key of the type metadata registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Create a type name from anything string-like
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    /// Get the underlying string reference
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Get the short name (last segment after ::)
    /// For example: `com::acme::CompileTask` returns `CompileTask`
    #[must_use]
    pub fn short_name(&self) -> &str { self.0.rsplit("::").next().unwrap_or(&self.0) }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self { Self(s) }
}

impl From<&String> for TypeName {
    fn from(s: &String) -> Self { Self(s.clone()) }
}

impl From<TypeName> for String {
    fn from(type_name: TypeName) -> Self { type_name.0 }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}
