//! Builder-style declarations fed to [`TypeRegistryBuilder`](super::TypeRegistryBuilder)
//!
//! Declarations hold type expressions as written; they are parsed and checked
//! when the registry is built so every problem surfaces in one place.

use std::sync::Arc;

use super::{GetterFn, PropertyKind};
use crate::error::BoxedError;
use crate::instance::{InstanceNode, ModelValue};
use crate::type_name::TypeName;

/// Declaration of one annotated property
#[derive(Clone)]
pub struct PropertyDeclaration {
    pub(super) name:            String,
    pub(super) kind:            PropertyKind,
    pub(super) type_expression: String,
    pub(super) getter:          Option<Arc<GetterFn>>,
}

impl PropertyDeclaration {
    /// A property recursed into by the walker
    pub fn nested(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Nested, type_expression)
    }

    /// A property reported to visitors without recursion
    pub fn leaf(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Leaf, type_expression)
    }

    fn new(name: impl Into<String>, kind: PropertyKind, type_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_expression: type_expression.into(),
            getter: None,
        }
    }

    /// Attach an infallible getter for live values of type `T`
    #[must_use]
    pub fn getter<T, F>(self, getter: F) -> Self
    where
        T: ModelValue,
        F: Fn(&T) -> InstanceNode + Send + Sync + 'static,
    {
        self.try_getter(move |parent: &T| Ok(getter(parent)))
    }

    /// Attach a fallible getter for live values of type `T`
    ///
    /// A parent that is not a `T` is reported as a getter failure.
    #[must_use]
    pub fn try_getter<T, F>(mut self, getter: F) -> Self
    where
        T: ModelValue,
        F: Fn(&T) -> std::result::Result<InstanceNode, BoxedError> + Send + Sync + 'static,
    {
        let erased = move |parent: &dyn ModelValue| {
            parent.downcast_ref::<T>().map_or_else(
                || {
                    Err(format!(
                        "expected a {} parent but found {}",
                        std::any::type_name::<T>(),
                        parent.type_name()
                    )
                    .into())
                },
                |typed| getter(typed),
            )
        };
        self.getter = Some(Arc::new(erased));
        self
    }
}

/// Declaration of one model type
#[derive(Clone)]
pub struct TypeDeclaration {
    pub(super) type_name:       TypeName,
    pub(super) type_parameters: Vec<String>,
    pub(super) supertypes:      Vec<String>,
    pub(super) properties:      Vec<PropertyDeclaration>,
}

impl TypeDeclaration {
    /// Start declaring a type
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name:       type_name.into(),
            type_parameters: Vec::new(),
            supertypes:      Vec::new(),
            properties:      Vec::new(),
        }
    }

    /// Declare the type's generic parameters, e.g. `["K", "V"]`
    #[must_use]
    pub fn type_parameters(mut self, parameters: &[&str]) -> Self {
        self.type_parameters = parameters.iter().map(ToString::to_string).collect();
        self
    }

    /// Declare a generic supertype, e.g. `Iterable<T>` or `Provider<String>`
    #[must_use]
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Append a property; declaration order is walk order
    #[must_use]
    pub fn property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    /// Shorthand for a nested property without a getter
    #[must_use]
    pub fn nested(self, name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        self.property(PropertyDeclaration::nested(name, type_expression))
    }

    /// Shorthand for a leaf property without a getter
    #[must_use]
    pub fn leaf(self, name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        self.property(PropertyDeclaration::leaf(name, type_expression))
    }

    /// The declared type name
    #[must_use]
    pub const fn type_name(&self) -> &TypeName { &self.type_name }
}
