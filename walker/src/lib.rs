//! # Property Walker
//!
//! Walks a model of nested, annotated properties and reports every bean and
//! leaf property to a visitor under a dotted qualified name.
//!
//! The same walk runs over two kinds of node:
//! - live values ([`InstanceWalker`]), where map entries are named by key and
//!   iterable elements by their 1-based ordinal (`$1`, `$2`, ...)
//! - declared types ([`StaticTypeWalker`]), where containers produce a single
//!   representative child named `<key>`, `<name>` or `*`
//!
//! Deferred values (`Provider<T>`) are unwrapped transparently and never
//! appear as path segments. Leaf values are handed to the visitor unfetched;
//! a getter only runs when the visitor asks for the value.
//!
//! ```
//! use std::sync::Arc;
//!
//! use property_walker::{PathCollector, StaticTypeWalker, TypeDeclaration, TypeRegistry, TypeToken};
//!
//! let registry = TypeRegistry::builder()
//!     .register(
//!         TypeDeclaration::new("Config")
//!             .leaf("name", "Provider<String>")
//!             .nested("items", "Map<String, Item>"),
//!     )
//!     .register(TypeDeclaration::new("Item").leaf("enabled", "Provider<bool>"))
//!     .build()?;
//!
//! let walker = StaticTypeWalker::static_type_walker(Arc::new(registry));
//! let mut collector = PathCollector::new();
//! walker.walk(&TypeToken::of("Config"), &mut collector)?;
//!
//! assert_eq!(
//!     collector.qualified_names(),
//!     ["name", "items.<key>", "items.<key>.enabled"]
//! );
//! # Ok::<(), error_stack::Report<property_walker::Error>>(())
//! ```

mod collector;
mod config;
mod constants;
mod error;
mod instance;
mod metadata;
mod static_type;
mod traversal;
mod type_name;
mod type_token;

pub use collector::{PathCollector, PathReport, WalkEvent};
pub use config::WalkOptions;
pub use error::{BoxedError, Error, Result};
pub use instance::{
    DeferredValue, InstanceNode, InstanceStrategy, IterableValue, MapValue, ModelList, ModelMap,
    ModelValue, Provider,
};
pub use metadata::{
    GetterFn, PropertyDeclaration, PropertyKind, PropertyMetadata, TypeCapability,
    TypeDeclaration, TypeMetadata, TypeMetadataStore, TypeRegistry, TypeRegistryBuilder,
};
pub use static_type::StaticTypeStrategy;
pub use traversal::{
    InstanceWalker, LazyValue, NodeMetadataVisitor, NodeShape, NodeStrategy, RecursionDepth,
    StaticTypeWalker, TypeMetadataWalker, WalkContext,
};
pub use type_name::TypeName;
pub use type_token::TypeToken;
