//! Walking declared types without instances
//!
//! The node is a [`TypeToken`]. Containers are never enumerated: a deferred
//! wrapper, map or iterable yields exactly one representative child, its
//! declared value or element type, under a placeholder segment.

use crate::constants::{ELEMENT_PLACEHOLDER, MAP_KEY_PLACEHOLDER, NAMED_ELEMENT_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::metadata::{PropertyMetadata, TypeCapability, TypeMetadataStore};
use crate::traversal::NodeStrategy;
use crate::type_name::TypeName;
use crate::type_token::TypeToken;

/// Node capabilities over declared types
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTypeStrategy;

impl StaticTypeStrategy {
    /// The argument of `capability`'s root type that `node` is walked through
    fn extract_nested_type(
        node: &TypeToken,
        capability: TypeCapability,
        store: &dyn TypeMetadataStore,
    ) -> Result<TypeToken> {
        let root = TypeName::from(capability.root_type());
        let parameterized = store.generic_supertype(node, &root)?;
        capability
            .walked_argument()
            .and_then(|index| parameterized.arguments().get(index))
            .cloned()
            .ok_or_else(|| {
                Error::malformed(node, format!("{parameterized} has no walked type argument")).into()
            })
    }

    /// Segment for the representative element of an iterable
    fn element_segment(element: &TypeToken, store: &dyn TypeMetadataStore) -> Result<&'static str> {
        let Some(raw) = element.raw() else {
            return Ok(ELEMENT_PLACEHOLDER);
        };
        let metadata = store.type_metadata(raw)?;
        Ok(if metadata.has_capability(TypeCapability::DisplayName) {
            NAMED_ELEMENT_PLACEHOLDER
        } else {
            ELEMENT_PLACEHOLDER
        })
    }
}

impl NodeStrategy for StaticTypeStrategy {
    type Node = TypeToken;

    const NAME: &'static str = "static";

    fn resolve_type(&self, node: &TypeToken) -> Result<TypeName> { node.require_raw().cloned() }

    fn unwrap_deferred(&self, node: &TypeToken, store: &dyn TypeMetadataStore) -> Result<TypeToken> {
        Self::extract_nested_type(node, TypeCapability::Deferred, store)
    }

    fn map_entries(
        &self,
        node: &TypeToken,
        store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, TypeToken)>> {
        let value_type = Self::extract_nested_type(node, TypeCapability::Map, store)?;
        Ok(vec![(MAP_KEY_PLACEHOLDER.to_string(), value_type)])
    }

    fn iterable_elements(
        &self,
        node: &TypeToken,
        store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, TypeToken)>> {
        let element_type = Self::extract_nested_type(node, TypeCapability::Iterable, store)?;
        let segment = Self::element_segment(&element_type, store)?;
        Ok(vec![(segment.to_string(), element_type)])
    }

    fn child(
        &self,
        parent: &TypeToken,
        property: &PropertyMetadata,
        store: &dyn TypeMetadataStore,
        _qualified_name: &str,
    ) -> Result<TypeToken> {
        let metadata = store.type_metadata(parent.require_raw()?)?;
        let bindings = metadata.bind_arguments(parent.arguments())?;
        Ok(property.declared_type().substitute(&bindings))
    }
}
