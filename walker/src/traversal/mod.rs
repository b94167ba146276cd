//! The shared recursive walk
//!
//! One algorithm, written against [`NodeStrategy`], walks both live values
//! ([`InstanceStrategy`](crate::InstanceStrategy)) and declared types
//! ([`StaticTypeStrategy`](crate::StaticTypeStrategy)). The strategies only
//! decide how to resolve a node's type, unwrap a deferred value, enumerate map
//! entries and iterable elements, and fetch a property's child. Dispatch,
//! ordering and naming live here so both walks name the same model the same
//! way.
//!
//! The walk assumes the model graph is acyclic and does not bound its own
//! depth. Callers walking models that may contain cycles can set a depth
//! limit in [`WalkOptions`]; there is no identity tracking.

mod visitor;
mod walk_context;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use strum::{AsRefStr, Display};
use tracing::{debug, debug_span, trace};
pub use visitor::{LazyValue, NodeMetadataVisitor};
pub use walk_context::{RecursionDepth, WalkContext};

use crate::config::WalkOptions;
use crate::error::{Error, Result};
use crate::instance::InstanceStrategy;
use crate::metadata::{PropertyKind, PropertyMetadata, TypeCapability, TypeMetadata, TypeMetadataStore};
use crate::static_type::StaticTypeStrategy;
use crate::type_name::TypeName;

/// The capabilities the walk requires of a kind of node
pub trait NodeStrategy {
    /// The node representation, a live value or a type descriptor
    type Node;

    /// Short label used in logs
    const NAME: &'static str;

    /// Raw type used to look up the node's metadata
    ///
    /// # Errors
    ///
    /// Returns an error when the node has no resolvable raw type.
    fn resolve_type(&self, node: &Self::Node) -> Result<TypeName>;

    /// The single node behind a deferred wrapper
    ///
    /// # Errors
    ///
    /// Returns an error when the wrapper cannot be unwrapped.
    fn unwrap_deferred(&self, node: &Self::Node, store: &dyn TypeMetadataStore) -> Result<Self::Node>;

    /// Map entries as `(segment, value)` pairs in iteration order
    ///
    /// # Errors
    ///
    /// Returns an error when the entries cannot be enumerated.
    fn map_entries(
        &self,
        node: &Self::Node,
        store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, Self::Node)>>;

    /// Iterable elements as `(segment, element)` pairs in iteration order
    ///
    /// # Errors
    ///
    /// Returns an error when the elements cannot be enumerated.
    fn iterable_elements(
        &self,
        node: &Self::Node,
        store: &dyn TypeMetadataStore,
    ) -> Result<Vec<(String, Self::Node)>>;

    /// The child held by `property` of `parent`
    ///
    /// # Errors
    ///
    /// Returns an error when the child cannot be fetched; `qualified_name` is
    /// the child's own name, for error reporting.
    fn child(
        &self,
        parent: &Self::Node,
        property: &PropertyMetadata,
        store: &dyn TypeMetadataStore,
        qualified_name: &str,
    ) -> Result<Self::Node>;
}

/// How a node is walked, decided from its type's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeShape {
    /// Unwrapped transparently
    Deferred,
    /// Expanded entry by entry
    Map,
    /// Expanded element by element
    Iterable,
    /// Reported and walked property by property
    Bean,
}

impl NodeShape {
    /// Classify a type
    ///
    /// Deferred wins over everything. Map and iterable types that declare
    /// annotated properties of their own are beans.
    #[must_use]
    pub fn of(metadata: &TypeMetadata) -> Self {
        if metadata.has_capability(TypeCapability::Deferred) {
            Self::Deferred
        } else if metadata.has_annotated_properties() {
            Self::Bean
        } else if metadata.has_capability(TypeCapability::Map) {
            Self::Map
        } else if metadata.has_capability(TypeCapability::Iterable) {
            Self::Iterable
        } else {
            Self::Bean
        }
    }
}

/// Walks a model from a root node, reporting to a visitor
pub struct TypeMetadataWalker<S: NodeStrategy> {
    store:    Arc<dyn TypeMetadataStore>,
    strategy: S,
    options:  WalkOptions,
}

/// Walker over live values
pub type InstanceWalker = TypeMetadataWalker<InstanceStrategy>;

/// Walker over declared types
pub type StaticTypeWalker = TypeMetadataWalker<StaticTypeStrategy>;

impl TypeMetadataWalker<InstanceStrategy> {
    /// A walker over live values
    #[must_use]
    pub fn instance_walker(store: Arc<dyn TypeMetadataStore>) -> Self {
        Self::new(store, InstanceStrategy)
    }
}

impl TypeMetadataWalker<StaticTypeStrategy> {
    /// A walker over declared types
    #[must_use]
    pub fn static_type_walker(store: Arc<dyn TypeMetadataStore>) -> Self {
        Self::new(store, StaticTypeStrategy)
    }
}

impl<S: NodeStrategy> TypeMetadataWalker<S> {
    /// A walker with a custom strategy and default options
    #[must_use]
    pub fn new(store: Arc<dyn TypeMetadataStore>, strategy: S) -> Self {
        Self {
            store,
            strategy,
            options: WalkOptions::default(),
        }
    }

    /// Replace the walk options
    #[must_use]
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WalkOptions { &self.options }

    /// Walk from `root`, which has no qualified name
    ///
    /// Runs to completion on the calling thread. The only effects are the
    /// calls made into `visitor`.
    ///
    /// # Errors
    ///
    /// Any failure resolving a type, unwrapping a deferred value, enumerating
    /// a collection or fetching a nested child aborts the walk and is
    /// returned as is. Exceeding a [`WalkOptions::max_depth`] limit returns
    /// [`Error::RecursionLimitExceeded`].
    pub fn walk<V>(&self, root: &S::Node, visitor: &mut V) -> Result<()>
    where
        V: NodeMetadataVisitor<S::Node> + ?Sized,
    {
        let _span = debug_span!("walk", strategy = S::NAME).entered();
        let result = self.walk_node(root, &WalkContext::root(), visitor);
        if let Err(report) = &result {
            debug!(error = %report.current_context(), "Walk aborted");
        }
        result
    }

    fn walk_node<V>(&self, node: &S::Node, context: &WalkContext, visitor: &mut V) -> Result<()>
    where
        V: NodeMetadataVisitor<S::Node> + ?Sized,
    {
        let depth = context.depth();
        if let Some(limit) = self.options.max_depth.filter(|&limit| depth.exceeds(limit)) {
            return Err(Error::RecursionLimitExceeded {
                qualified_name: context.display_name().to_string(),
                limit,
            }
            .into());
        }

        let type_name = self.strategy.resolve_type(node)?;
        let metadata = self.store.type_metadata(&type_name)?;
        let shape = NodeShape::of(&metadata);
        trace!(
            qualified_name = context.display_name(),
            type_name = %type_name,
            shape = %shape,
            "Visiting node"
        );

        match shape {
            NodeShape::Deferred => {
                let child = self.strategy.unwrap_deferred(node, self.store.as_ref())?;
                self.walk_node(&child, &context.unwrapped(), visitor)
            }
            NodeShape::Map => {
                let entries = self.strategy.map_entries(node, self.store.as_ref())?;
                self.walk_children(entries, context, visitor)
            }
            NodeShape::Iterable => {
                let elements = self.strategy.iterable_elements(node, self.store.as_ref())?;
                self.walk_children(elements, context, visitor)
            }
            NodeShape::Bean => self.walk_bean(node, &metadata, context, visitor),
        }
    }

    fn walk_children<V>(
        &self,
        children: Vec<(String, S::Node)>,
        context: &WalkContext,
        visitor: &mut V,
    ) -> Result<()>
    where
        V: NodeMetadataVisitor<S::Node> + ?Sized,
    {
        for (segment, child) in children {
            self.walk_node(&child, &context.child(&segment), visitor)?;
        }
        Ok(())
    }

    fn walk_bean<V>(
        &self,
        node: &S::Node,
        metadata: &TypeMetadata,
        context: &WalkContext,
        visitor: &mut V,
    ) -> Result<()>
    where
        V: NodeMetadataVisitor<S::Node> + ?Sized,
    {
        if metadata.has_annotated_properties()
            && (metadata.has_capability(TypeCapability::Map)
                || metadata.has_capability(TypeCapability::Iterable))
        {
            debug!(
                type_name = %metadata.type_name(),
                "Collection type declares properties, walking it as a bean"
            );
        }

        visitor.visit_nested(metadata, context.qualified_name(), node);

        for property in metadata.properties() {
            let child_context = context.child(property.name());
            let qualified_name = child_context.display_name();
            match property.kind() {
                PropertyKind::Nested => {
                    let child =
                        self.strategy
                            .child(node, property, self.store.as_ref(), qualified_name)?;
                    self.walk_node(&child, &child_context, visitor)?;
                }
                PropertyKind::Leaf => {
                    let supplier =
                        || self.strategy.child(node, property, self.store.as_ref(), qualified_name);
                    visitor.visit_leaf(qualified_name, property, LazyValue::new(&supplier));
                }
            }
        }
        Ok(())
    }
}
