//! Callbacks receiving the nodes and leaves of a walk

use crate::error::Result;
use crate::metadata::{PropertyMetadata, TypeMetadata};

/// Receives the walk in depth-first pre-order
///
/// `visit_nested` is called for every bean node before any of its
/// descendants; `visit_leaf` for every leaf property in declaration order.
pub trait NodeMetadataVisitor<N> {
    /// A bean node; `qualified_name` is `None` for the root
    fn visit_nested(&mut self, type_metadata: &TypeMetadata, qualified_name: Option<&str>, node: &N);

    /// A leaf property; its value is only fetched if the visitor asks for it
    fn visit_leaf(&mut self, qualified_name: &str, property: &PropertyMetadata, value: LazyValue<'_, N>);
}

/// Deferred fetch of a leaf property's value
///
/// The walker never calls [`LazyValue::get`] itself; the visitor decides
/// whether and when the getter runs.
pub struct LazyValue<'a, N> {
    supplier: &'a dyn Fn() -> Result<N>,
}

impl<'a, N> LazyValue<'a, N> {
    pub(crate) fn new(supplier: &'a dyn Fn() -> Result<N>) -> Self { Self { supplier } }

    /// Fetch the value now
    ///
    /// # Errors
    ///
    /// Returns whatever the node strategy's child fetch returns, e.g.
    /// [`Error::AccessorInvocation`](crate::Error::AccessorInvocation).
    pub fn get(&self) -> Result<N> { (self.supplier)() }
}

impl<N> Clone for LazyValue<'_, N> {
    fn clone(&self) -> Self { *self }
}

impl<N> Copy for LazyValue<'_, N> {}

impl<N> std::fmt::Debug for LazyValue<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LazyValue(<deferred>)")
    }
}
