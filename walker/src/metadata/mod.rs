//! Declared property metadata for model types
//!
//! `TypeMetadata` describes one registered type: its type parameters, the
//! generic supertypes it was declared with, the capabilities derived from
//! them, and its annotated properties in declaration order. Metadata is built
//! once by [`TypeRegistryBuilder`] and shared by reference across walks.

mod builtin;
mod declaration;
mod registry;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub use declaration::{PropertyDeclaration, TypeDeclaration};
pub use registry::{TypeMetadataStore, TypeRegistry, TypeRegistryBuilder};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::constants::{TYPE_ITERABLE, TYPE_MAP, TYPE_NAMED, TYPE_PROVIDER};
use crate::error::{BoxedError, Error, Result};
use crate::instance::InstanceNode;
use crate::instance::ModelValue;
use crate::type_name::TypeName;
use crate::type_token::TypeToken;

/// Whether a property is walked into or only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropertyKind {
    /// The property's value is itself a model node and is recursed into
    Nested,
    /// The property is reported to the visitor without recursion
    Leaf,
}

/// Structural capability a type inherits from one of the built-in roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TypeCapability {
    /// A single value resolved lazily (`Provider<T>`)
    Deferred,
    /// Keyed entries (`Map<K, V>`)
    Map,
    /// A sequence of elements (`Iterable<T>`)
    Iterable,
    /// Elements carry a display name (`Named`)
    DisplayName,
}

impl TypeCapability {
    /// Every capability, in the order the walker tests them
    pub const ALL: [Self; 4] = [Self::Deferred, Self::Map, Self::Iterable, Self::DisplayName];

    /// Name of the built-in type that grants this capability
    #[must_use]
    pub const fn root_type(self) -> &'static str {
        match self {
            Self::Deferred => TYPE_PROVIDER,
            Self::Map => TYPE_MAP,
            Self::Iterable => TYPE_ITERABLE,
            Self::DisplayName => TYPE_NAMED,
        }
    }

    /// Index of the root's type argument holding the walked value type
    ///
    /// `Provider<T>` and `Iterable<T>` walk their only argument, `Map<K, V>`
    /// walks its value type.
    #[must_use]
    pub const fn walked_argument(self) -> Option<usize> {
        match self {
            Self::Deferred | Self::Iterable => Some(0),
            Self::Map => Some(1),
            Self::DisplayName => None,
        }
    }
}

/// Getter bound to a parent value, captured when a property is declared
pub type GetterFn =
    dyn Fn(&dyn ModelValue) -> std::result::Result<InstanceNode, BoxedError> + Send + Sync;

/// Metadata for one declared property
#[derive(Clone)]
pub struct PropertyMetadata {
    name:          String,
    kind:          PropertyKind,
    declared_type: TypeToken,
    getter:        Option<Arc<GetterFn>>,
}

impl PropertyMetadata {
    pub(crate) fn new(
        name: String,
        kind: PropertyKind,
        declared_type: TypeToken,
        getter: Option<Arc<GetterFn>>,
    ) -> Self {
        Self {
            name,
            kind,
            declared_type,
            getter,
        }
    }

    /// The same property seen through a supertype use with bound arguments
    pub(crate) fn with_declared_type(&self, declared_type: TypeToken) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            declared_type,
            getter: self.getter.clone(),
        }
    }

    /// Declared property name, unique among its siblings
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Nested or leaf
    #[must_use]
    pub const fn kind(&self) -> PropertyKind { self.kind }

    /// Declared generic type of the property's accessor
    ///
    /// May reference the owning type's parameters as [`TypeToken::Variable`].
    #[must_use]
    pub const fn declared_type(&self) -> &TypeToken { &self.declared_type }

    /// Whether a getter was registered for live values
    #[must_use]
    pub const fn has_getter(&self) -> bool { self.getter.is_some() }

    /// Invoke the getter against a live parent
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessorInvocation`] when no getter was registered or
    /// the getter itself fails.
    pub fn invoke(&self, parent: &dyn ModelValue, qualified_name: &str) -> Result<InstanceNode> {
        let Some(getter) = &self.getter else {
            return Err(Error::accessor_failed(
                qualified_name,
                &self.name,
                format!("no getter registered on {}", parent.type_name()).into(),
            )
            .into());
        };
        getter(parent).map_err(|source| Error::accessor_failed(qualified_name, &self.name, source).into())
    }
}

impl Debug for PropertyMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared_type", &self.declared_type)
            .field("getter", &self.getter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Metadata for one registered type
#[derive(Debug)]
pub struct TypeMetadata {
    type_name:       TypeName,
    type_parameters: Vec<String>,
    supertypes:      Vec<TypeToken>,
    ancestors:       Vec<TypeName>,
    capabilities:    Vec<TypeCapability>,
    properties:      Vec<PropertyMetadata>,
}

impl TypeMetadata {
    pub(crate) fn new(
        type_name: TypeName,
        type_parameters: Vec<String>,
        supertypes: Vec<TypeToken>,
        ancestors: Vec<TypeName>,
        properties: Vec<PropertyMetadata>,
    ) -> Self {
        let capabilities = TypeCapability::ALL
            .into_iter()
            .filter(|capability| {
                let root = capability.root_type();
                type_name == root || ancestors.iter().any(|ancestor| ancestor == root)
            })
            .collect();

        Self {
            type_name,
            type_parameters,
            supertypes,
            ancestors,
            capabilities,
            properties,
        }
    }

    /// The registered type
    #[must_use]
    pub const fn type_name(&self) -> &TypeName { &self.type_name }

    /// Declared type parameter names, in order
    #[must_use]
    pub fn type_parameters(&self) -> &[String] { &self.type_parameters }

    /// Direct generic supertypes as declared
    #[must_use]
    pub fn supertypes(&self) -> &[TypeToken] { &self.supertypes }

    /// Capabilities inherited from the built-in roots
    #[must_use]
    pub fn capabilities(&self) -> &[TypeCapability] { &self.capabilities }

    /// Whether the type has the given capability
    #[must_use]
    pub fn has_capability(&self, capability: TypeCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether `other` is this type or one of its transitive supertypes
    #[must_use]
    pub fn is_subtype_of(&self, other: &TypeName) -> bool {
        &self.type_name == other || self.ancestors.contains(other)
    }

    /// Whether the type declares or inherits any annotated property
    #[must_use]
    pub fn has_annotated_properties(&self) -> bool { !self.properties.is_empty() }

    /// Annotated properties, inherited ones first in supertype order
    #[must_use]
    pub fn properties(&self) -> &[PropertyMetadata] { &self.properties }

    /// Look up a property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Bind this type's parameters to the arguments of a use site
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGenericShape`] for a raw use of a generic type
    /// or an argument count that does not match the declaration.
    pub fn bind_arguments(&self, arguments: &[TypeToken]) -> Result<HashMap<String, TypeToken>> {
        if arguments.len() != self.type_parameters.len() {
            let use_site = TypeToken::parameterized(self.type_name.clone(), arguments.to_vec());
            let message = if arguments.is_empty() {
                format!(
                    "raw use of generic type declared with parameters <{}>",
                    self.type_parameters.join(", ")
                )
            } else {
                format!(
                    "expected {} type argument(s), found {}",
                    self.type_parameters.len(),
                    arguments.len()
                )
            };
            return Err(Error::malformed(use_site, message).into());
        }

        Ok(self
            .type_parameters
            .iter()
            .cloned()
            .zip(arguments.iter().cloned())
            .collect())
    }
}
