//! Walking live values
//!
//! Live values implement [`ModelValue`] and report their runtime type name.
//! Container values additionally expose a deferred, map or iterable view,
//! which the [`InstanceStrategy`] uses once the registry says the type has the
//! matching capability.

mod values;

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

pub use values::{ModelList, ModelMap, Provider};

use crate::constants::ELEMENT_ORDINAL_PREFIX;
use crate::error::{BoxedError, Error, Result};
use crate::metadata::{PropertyMetadata, TypeCapability, TypeMetadataStore};
use crate::traversal::NodeStrategy;
use crate::type_name::TypeName;

/// A live node of the model graph
pub type InstanceNode = Arc<dyn ModelValue>;

/// A live value the walker can visit
pub trait ModelValue: Any + Send + Sync + Debug + 'static {
    /// Runtime type, used to look up the value's metadata
    fn type_name(&self) -> TypeName;

    /// Access for downcasting in getters
    fn as_any(&self) -> &dyn Any;

    /// The deferred view, for values of `Provider` types
    fn as_deferred(&self) -> Option<&dyn DeferredValue> { None }

    /// The map view, for values of `Map` types
    fn as_map(&self) -> Option<&dyn MapValue> { None }

    /// The iterable view, for values of `Iterable` types
    fn as_iterable(&self) -> Option<&dyn IterableValue> { None }
}

impl dyn ModelValue + '_ {
    /// Downcast to a concrete value type
    #[must_use]
    pub fn downcast_ref<T: ModelValue>(&self) -> Option<&T> { self.as_any().downcast_ref::<T>() }
}

/// A single value resolved on demand
pub trait DeferredValue {
    /// Current value of the wrapper
    ///
    /// # Errors
    ///
    /// Whatever prevents the value from being produced.
    fn get(&self) -> std::result::Result<InstanceNode, BoxedError>;
}

/// Keyed entries in their natural iteration order
pub trait MapValue {
    /// Entries with their keys in string form
    fn entries(&self) -> Vec<(String, InstanceNode)>;
}

/// Elements in sequence order
pub trait IterableValue {
    /// Current elements
    fn elements(&self) -> Vec<InstanceNode>;
}

/// Node capabilities over live values
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceStrategy;

impl InstanceStrategy {
    fn mismatch(node: &InstanceNode, capability: TypeCapability) -> error_stack::Report<Error> {
        Error::CapabilityMismatch {
            type_name: node.type_name(),
            capability,
        }
        .into()
    }
}

impl NodeStrategy for InstanceStrategy {
    type Node = InstanceNode;

    const NAME: &'static str = "instance";

    fn resolve_type(&self, node: &InstanceNode) -> Result<TypeName> { Ok(node.type_name()) }

    fn unwrap_deferred(
        &self,
        node: &InstanceNode,
        _store: &dyn TypeMetadataStore,
    ) -> Result<InstanceNode> {
        let deferred = node
            .as_deferred()
            .ok_or_else(|| Self::mismatch(node, TypeCapability::Deferred))?;
        deferred.get().map_err(|source| {
            Error::DeferredValueUnavailable {
                type_name: node.type_name(),
                source,
            }
            .into()
        })
    }

    fn map_entries(
        &self,
        node: &InstanceNode,
        _store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, InstanceNode)>> {
        node.as_map()
            .map(MapValue::entries)
            .ok_or_else(|| Self::mismatch(node, TypeCapability::Map))
    }

    fn iterable_elements(
        &self,
        node: &InstanceNode,
        _store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, InstanceNode)>> {
        let iterable = node
            .as_iterable()
            .ok_or_else(|| Self::mismatch(node, TypeCapability::Iterable))?;
        Ok(iterable
            .elements()
            .into_iter()
            .enumerate()
            .map(|(index, element)| (format!("{ELEMENT_ORDINAL_PREFIX}{}", index + 1), element))
            .collect())
    }

    fn child(
        &self,
        parent: &InstanceNode,
        property: &PropertyMetadata,
        _store: &dyn TypeMetadataStore,
        qualified_name: &str,
    ) -> Result<InstanceNode> {
        property.invoke(parent.as_ref(), qualified_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::metadata::TypeRegistry;

    #[test]
    fn test_iterable_segments_start_at_one() {
        let registry = TypeRegistry::builder().build().unwrap();
        let list: InstanceNode = Arc::new(ModelList::new().with(1_i32).with(2_i32));
        let names: Vec<String> = InstanceStrategy
            .iterable_elements(&list, &registry)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["$1", "$2"]);
    }

    #[test]
    fn test_missing_view_is_capability_mismatch() {
        let registry = TypeRegistry::builder().build().unwrap();
        let value: InstanceNode = Arc::new("plain".to_string());
        let error = InstanceStrategy.map_entries(&value, &registry).unwrap_err();
        assert!(matches!(
            error.current_context(),
            Error::CapabilityMismatch {
                capability: TypeCapability::Map,
                ..
            }
        ));
    }

    #[test]
    fn test_failing_provider_reports_type() {
        let registry = TypeRegistry::builder().build().unwrap();
        let provider: InstanceNode = Arc::new(Provider::from_fn(|| Err("unset".into())));
        let error = InstanceStrategy.unwrap_deferred(&provider, &registry).unwrap_err();
        assert!(matches!(
            error.current_context(),
            Error::DeferredValueUnavailable { type_name, .. } if type_name == "Provider"
        ));
    }
}
