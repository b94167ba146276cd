//! Built-in live values: deferred providers, ordered maps, lists and scalars

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::{DeferredValue, InstanceNode, IterableValue, MapValue, ModelValue};
use crate::constants::{
    TYPE_BOOL, TYPE_F64, TYPE_I32, TYPE_I64, TYPE_LIST, TYPE_MAP, TYPE_PROVIDER, TYPE_STRING,
    TYPE_U32, TYPE_U64,
};
use crate::error::BoxedError;
use crate::type_name::TypeName;

type Supplier = dyn Fn() -> std::result::Result<InstanceNode, BoxedError> + Send + Sync;

enum ProviderSource {
    Fixed(InstanceNode),
    Supplier(Arc<Supplier>),
}

/// A deferred value of type `Provider`
pub struct Provider {
    source: ProviderSource,
}

impl Provider {
    /// A provider that always yields `value`
    pub fn of(value: impl ModelValue) -> Self { Self::of_node(Arc::new(value)) }

    /// A provider that always yields an existing node
    #[must_use]
    pub const fn of_node(node: InstanceNode) -> Self {
        Self {
            source: ProviderSource::Fixed(node),
        }
    }

    /// A provider computing its value on every `get`
    pub fn from_fn<F>(supplier: F) -> Self
    where
        F: Fn() -> std::result::Result<InstanceNode, BoxedError> + Send + Sync + 'static,
    {
        Self {
            source: ProviderSource::Supplier(Arc::new(supplier)),
        }
    }
}

impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            ProviderSource::Fixed(node) => f.debug_tuple("Provider").field(node).finish(),
            ProviderSource::Supplier(_) => f.debug_tuple("Provider").field(&"<fn>").finish(),
        }
    }
}

impl DeferredValue for Provider {
    fn get(&self) -> std::result::Result<InstanceNode, BoxedError> {
        match &self.source {
            ProviderSource::Fixed(node) => Ok(Arc::clone(node)),
            ProviderSource::Supplier(supplier) => supplier(),
        }
    }
}

impl ModelValue for Provider {
    fn type_name(&self) -> TypeName { TypeName::from(TYPE_PROVIDER) }

    fn as_any(&self) -> &dyn Any { self }

    fn as_deferred(&self) -> Option<&dyn DeferredValue> { Some(self) }
}

/// An insertion-ordered map of type `Map`
#[derive(Debug, Default)]
pub struct ModelMap {
    entries: Vec<(String, InstanceNode)>,
}

impl ModelMap {
    /// An empty map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace an entry, keeping the original position on replace
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ModelValue) -> Self {
        self.insert(key, Arc::new(value));
        self
    }

    /// Insert or replace an entry, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: InstanceNode) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl FromIterator<(String, InstanceNode)> for ModelMap {
    fn from_iter<I: IntoIterator<Item = (String, InstanceNode)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl MapValue for ModelMap {
    fn entries(&self) -> Vec<(String, InstanceNode)> { self.entries.clone() }
}

impl ModelValue for ModelMap {
    fn type_name(&self) -> TypeName { TypeName::from(TYPE_MAP) }

    fn as_any(&self) -> &dyn Any { self }

    fn as_map(&self) -> Option<&dyn MapValue> { Some(self) }
}

/// A sequence of type `List`
#[derive(Debug, Default)]
pub struct ModelList {
    elements: Vec<InstanceNode>,
}

impl ModelList {
    /// An empty list
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Append an element
    #[must_use]
    pub fn with(mut self, value: impl ModelValue) -> Self {
        self.elements.push(Arc::new(value));
        self
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize { self.elements.len() }

    /// Whether the list has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool { self.elements.is_empty() }
}

impl FromIterator<InstanceNode> for ModelList {
    fn from_iter<I: IntoIterator<Item = InstanceNode>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IterableValue for ModelList {
    fn elements(&self) -> Vec<InstanceNode> { self.elements.clone() }
}

impl ModelValue for ModelList {
    fn type_name(&self) -> TypeName { TypeName::from(TYPE_LIST) }

    fn as_any(&self) -> &dyn Any { self }

    fn as_iterable(&self) -> Option<&dyn IterableValue> { Some(self) }
}

macro_rules! scalar_model_value {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl ModelValue for $ty {
                fn type_name(&self) -> TypeName { TypeName::from($name) }

                fn as_any(&self) -> &dyn Any { self }
            }
        )*
    };
}

scalar_model_value! {
    String => TYPE_STRING,
    bool => TYPE_BOOL,
    i32 => TYPE_I32,
    i64 => TYPE_I64,
    u32 => TYPE_U32,
    u64 => TYPE_U64,
    f64 => TYPE_F64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn test_map_replace_keeps_position() {
        let map = ModelMap::new()
            .with("a", 1_i32)
            .with("b", 2_i32)
            .with("a", 3_i32);
        let entries = map.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert_eq!(entries[0].1.downcast_ref::<i32>(), Some(&3));
        assert_eq!(entries[1].0, "b");
    }

    #[test]
    fn test_provider_supplier_runs_on_get() {
        let provider = Provider::from_fn(|| Ok(Arc::new("late".to_string()) as InstanceNode));
        let value = provider.get().unwrap();
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("late"));
    }

    #[test]
    fn test_provider_failure_is_returned() {
        let provider = Provider::from_fn(|| Err("not configured".into()));
        assert_eq!(provider.get().unwrap_err().to_string(), "not configured");
    }

    #[test]
    fn test_scalar_type_names() {
        assert_eq!(true.type_name(), "bool");
        assert_eq!("x".to_string().type_name(), "String");
        assert_eq!(ModelList::new().type_name(), "List");
    }
}
