//! End-to-end walks over live values and declared types

#![allow(clippy::unwrap_used, clippy::panic, reason = "tests")]

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::collector::PathCollector;
use crate::instance::{InstanceNode, ModelList, ModelMap, ModelValue, Provider};
use crate::metadata::{PropertyDeclaration, TypeDeclaration, TypeRegistry};
use crate::type_token::TypeToken;

macro_rules! model_type {
    ($ty:ident { $($field:ident),* }) => {
        #[derive(Debug)]
        struct $ty {
            $($field: InstanceNode),*
        }

        impl ModelValue for $ty {
            fn type_name(&self) -> TypeName { TypeName::from(stringify!($ty)) }

            fn as_any(&self) -> &dyn Any { self }
        }
    };
}

model_type!(Config { name, sub });
model_type!(OtherBean { flag });
model_type!(Inventory { items });
model_type!(Item { enabled });
model_type!(Playlist { values });
model_type!(Wrapped { name, sub });
model_type!(Chain {});
model_type!(Outer { inner });
model_type!(Broken {});
model_type!(Stranger {});

impl Item {
    fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(enabled),
        }
    }
}

/// An iterable that also declares a property of its own
#[derive(Debug)]
struct TaggedList {
    label:    InstanceNode,
    elements: ModelList,
}

impl ModelValue for TaggedList {
    fn type_name(&self) -> TypeName { TypeName::from("TaggedList") }

    fn as_any(&self) -> &dyn Any { self }

    fn as_iterable(&self) -> Option<&dyn crate::instance::IterableValue> { Some(&self.elements) }
}

/// A map that also declares a property of its own
#[derive(Debug)]
struct Catalog {
    label:   InstanceNode,
    entries: ModelMap,
}

impl ModelValue for Catalog {
    fn type_name(&self) -> TypeName { TypeName::from("Catalog") }

    fn as_any(&self) -> &dyn Any { self }

    fn as_map(&self) -> Option<&dyn crate::instance::MapValue> { Some(&self.entries) }
}

struct Fixture {
    store:      Arc<dyn TypeMetadataStore>,
    name_reads: Arc<AtomicUsize>,
}

fn fixture() -> Fixture {
    init_tracing();
    let name_reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&name_reads);

    let registry = TypeRegistry::builder()
        .register(
            TypeDeclaration::new("Config")
                .property(PropertyDeclaration::leaf("name", "String").getter(
                    move |config: &Config| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Arc::clone(&config.name)
                    },
                ))
                .property(
                    PropertyDeclaration::nested("sub", "OtherBean")
                        .getter(|config: &Config| Arc::clone(&config.sub)),
                ),
        )
        .register(
            TypeDeclaration::new("OtherBean").property(
                PropertyDeclaration::leaf("flag", "bool")
                    .getter(|bean: &OtherBean| Arc::clone(&bean.flag)),
            ),
        )
        .register(
            TypeDeclaration::new("Inventory").property(
                PropertyDeclaration::nested("items", "Map<String, Item>")
                    .getter(|inventory: &Inventory| Arc::clone(&inventory.items)),
            ),
        )
        .register(
            TypeDeclaration::new("Item").property(
                PropertyDeclaration::leaf("enabled", "bool")
                    .getter(|item: &Item| Arc::clone(&item.enabled)),
            ),
        )
        .register(
            TypeDeclaration::new("Playlist").property(
                PropertyDeclaration::nested("values", "List<Item>")
                    .getter(|playlist: &Playlist| Arc::clone(&playlist.values)),
            ),
        )
        .register(
            TypeDeclaration::new("Task")
                .extends("Named")
                .leaf("title", "String"),
        )
        .register(TypeDeclaration::new("Plan").nested("tasks", "List<Task>"))
        .register(
            TypeDeclaration::new("Wrapped")
                .property(
                    PropertyDeclaration::leaf("name", "Provider<String>")
                        .getter(|wrapped: &Wrapped| Arc::clone(&wrapped.name)),
                )
                .property(
                    PropertyDeclaration::nested("sub", "Provider<OtherBean>")
                        .getter(|wrapped: &Wrapped| Arc::clone(&wrapped.sub)),
                ),
        )
        .register(
            TypeDeclaration::new("TaggedList")
                .extends("List<Item>")
                .property(
                    PropertyDeclaration::leaf("label", "String")
                        .getter(|tagged: &TaggedList| Arc::clone(&tagged.label)),
                ),
        )
        .register(
            TypeDeclaration::new("Catalog")
                .extends("Map<String, Item>")
                .property(
                    PropertyDeclaration::leaf("label", "String")
                        .getter(|catalog: &Catalog| Arc::clone(&catalog.label)),
                ),
        )
        .register(TypeDeclaration::new("Base").leaf("origin", "String"))
        .register(
            TypeDeclaration::new("Derived")
                .extends("Base")
                .nested("items", "Map<String, Item>"),
        )
        .register(
            TypeDeclaration::new("Chain").property(
                PropertyDeclaration::nested("next", "Provider<Chain>").getter(|_: &Chain| {
                    Arc::new(Provider::from_fn(|| Ok(Arc::new(Chain {}) as InstanceNode)))
                        as InstanceNode
                }),
            ),
        )
        .register(
            TypeDeclaration::new("Outer").property(
                PropertyDeclaration::nested("inner", "Broken")
                    .getter(|outer: &Outer| Arc::clone(&outer.inner)),
            ),
        )
        .register(
            TypeDeclaration::new("Broken").property(
                PropertyDeclaration::nested("sub", "OtherBean")
                    .try_getter(|_: &Broken| Err("boom".into())),
            ),
        )
        .build()
        .unwrap();

    Fixture {
        store: Arc::new(registry),
        name_reads,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(name: &str, flag: bool) -> InstanceNode {
    Arc::new(Config {
        name: Arc::new(name.to_string()),
        sub:  Arc::new(OtherBean {
            flag: Arc::new(flag),
        }),
    })
}

fn instance_names(fixture: &Fixture, root: &InstanceNode) -> Vec<String> {
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    let mut collector = PathCollector::new();
    walker.walk(root, &mut collector).unwrap();
    collector.qualified_names().into_iter().map(String::from).collect()
}

fn static_names(fixture: &Fixture, root: &str) -> Vec<String> {
    let walker = StaticTypeWalker::static_type_walker(Arc::clone(&fixture.store));
    let mut collector = PathCollector::new();
    walker.walk(&TypeToken::parse(root).unwrap(), &mut collector).unwrap();
    collector.qualified_names().into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Nested {
        type_name:      String,
        qualified_name: Option<String>,
    },
    Leaf {
        qualified_name: String,
        value:          Option<String>,
    },
}

/// Records callbacks, optionally forcing every leaf value
#[derive(Default)]
struct RecordingVisitor {
    calls:        Vec<Call>,
    fetch_leaves: bool,
}

impl RecordingVisitor {
    fn fetching() -> Self {
        Self {
            calls:        Vec::new(),
            fetch_leaves: true,
        }
    }
}

fn render(node: &InstanceNode) -> String {
    if let Some(text) = node.downcast_ref::<String>() {
        text.clone()
    } else if let Some(flag) = node.downcast_ref::<bool>() {
        flag.to_string()
    } else {
        format!("{node:?}")
    }
}

impl NodeMetadataVisitor<InstanceNode> for RecordingVisitor {
    fn visit_nested(
        &mut self,
        type_metadata: &TypeMetadata,
        qualified_name: Option<&str>,
        node: &InstanceNode,
    ) {
        assert_eq!(type_metadata.type_name(), &node.type_name());
        self.calls.push(Call::Nested {
            type_name:      node.type_name().to_string(),
            qualified_name: qualified_name.map(String::from),
        });
    }

    fn visit_leaf(
        &mut self,
        qualified_name: &str,
        _property: &PropertyMetadata,
        value: LazyValue<'_, InstanceNode>,
    ) {
        let value = self.fetch_leaves.then(|| {
            value.get().map_or_else(
                |report| format!("error: {}", report.current_context()),
                |node| render(&node),
            )
        });
        self.calls.push(Call::Leaf {
            qualified_name: qualified_name.to_string(),
            value,
        });
    }
}

fn nested(type_name: &str, qualified_name: Option<&str>) -> Call {
    Call::Nested {
        type_name:      type_name.to_string(),
        qualified_name: qualified_name.map(String::from),
    }
}

fn leaf(qualified_name: &str, value: Option<&str>) -> Call {
    Call::Leaf {
        qualified_name: qualified_name.to_string(),
        value:          value.map(String::from),
    }
}

#[test]
fn test_end_to_end_call_order() {
    let fixture = fixture();
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    let mut visitor = RecordingVisitor::fetching();

    walker.walk(&config("x", true), &mut visitor).unwrap();

    assert_eq!(
        visitor.calls,
        vec![
            nested("Config", None),
            leaf("name", Some("x")),
            nested("OtherBean", Some("sub")),
            leaf("sub.flag", Some("true")),
        ]
    );
}

#[test]
fn test_static_names_match_instance_names() {
    let fixture = fixture();
    let instance = instance_names(&fixture, &config("x", true));
    let declared = static_names(&fixture, "Config");
    assert_eq!(instance, ["name", "sub", "sub.flag"]);
    assert_eq!(declared, instance);
}

#[test]
fn test_map_entries_named_by_key() {
    let fixture = fixture();
    let inventory: InstanceNode = Arc::new(Inventory {
        items: Arc::new(
            ModelMap::new()
                .with("a", Item::new(true))
                .with("b", Item::new(false)),
        ),
    });

    assert_eq!(
        instance_names(&fixture, &inventory),
        ["items.a", "items.a.enabled", "items.b", "items.b.enabled"]
    );
    assert_eq!(
        static_names(&fixture, "Inventory"),
        ["items.<key>", "items.<key>.enabled"]
    );
}

#[test]
fn test_iterable_elements_named_by_ordinal() {
    let fixture = fixture();
    let playlist: InstanceNode = Arc::new(Playlist {
        values: Arc::new(
            ModelList::new()
                .with(Item::new(true))
                .with(Item::new(false))
                .with(Item::new(true)),
        ),
    });

    assert_eq!(
        instance_names(&fixture, &playlist),
        [
            "values.$1",
            "values.$1.enabled",
            "values.$2",
            "values.$2.enabled",
            "values.$3",
            "values.$3.enabled",
        ]
    );
    assert_eq!(
        static_names(&fixture, "Playlist"),
        ["values.*", "values.*.enabled"]
    );
}

#[test]
fn test_named_elements_use_name_placeholder() {
    let fixture = fixture();
    assert_eq!(
        static_names(&fixture, "Plan"),
        ["tasks.<name>", "tasks.<name>.title"]
    );
}

#[test]
fn test_deferred_values_are_transparent() {
    let fixture = fixture();
    let wrapped: InstanceNode = Arc::new(Wrapped {
        name: Arc::new(Provider::of("x".to_string())),
        sub:  Arc::new(Provider::of(OtherBean {
            flag: Arc::new(true),
        })),
    });

    let plain = instance_names(&fixture, &config("x", true));
    assert_eq!(instance_names(&fixture, &wrapped), plain);
    assert_eq!(static_names(&fixture, "Wrapped"), plain);
}

#[test]
fn test_deferred_root_is_unwrapped() {
    let fixture = fixture();
    let root: InstanceNode = Arc::new(Provider::of_node(config("x", true)));
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    let mut visitor = RecordingVisitor::default();

    walker.walk(&root, &mut visitor).unwrap();

    assert_eq!(visitor.calls[0], nested("Config", None));
    assert_eq!(static_names(&fixture, "Provider<Config>"), ["name", "sub", "sub.flag"]);
}

#[test]
fn test_collection_with_properties_is_a_bean() {
    let fixture = fixture();
    let tagged: InstanceNode = Arc::new(TaggedList {
        label:    Arc::new("favourites".to_string()),
        elements: ModelList::new().with(Item::new(true)).with(Item::new(false)),
    });
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    let mut visitor = RecordingVisitor::fetching();

    walker.walk(&tagged, &mut visitor).unwrap();

    assert_eq!(
        visitor.calls,
        vec![nested("TaggedList", None), leaf("label", Some("favourites"))]
    );
    assert_eq!(static_names(&fixture, "TaggedList"), ["label"]);
}

#[test]
fn test_map_with_properties_is_a_bean() {
    let fixture = fixture();
    let catalog: InstanceNode = Arc::new(Catalog {
        label:   Arc::new("spring".to_string()),
        entries: ModelMap::new().with("a", Item::new(true)),
    });
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    let mut visitor = RecordingVisitor::fetching();

    walker.walk(&catalog, &mut visitor).unwrap();

    assert_eq!(
        visitor.calls,
        vec![nested("Catalog", None), leaf("label", Some("spring"))]
    );
    assert_eq!(static_names(&fixture, "Catalog"), ["label"]);
}

#[test]
fn test_empty_containers_produce_no_children() {
    let fixture = fixture();
    let playlist: InstanceNode = Arc::new(Playlist {
        values: Arc::new(ModelList::new()),
    });
    let inventory: InstanceNode = Arc::new(Inventory {
        items: Arc::new(ModelMap::new()),
    });
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));

    let mut visitor = RecordingVisitor::default();
    walker.walk(&playlist, &mut visitor).unwrap();
    assert_eq!(visitor.calls, vec![nested("Playlist", None)]);

    let mut visitor = RecordingVisitor::default();
    walker.walk(&inventory, &mut visitor).unwrap();
    assert_eq!(visitor.calls, vec![nested("Inventory", None)]);

    assert!(instance_names(&fixture, &playlist).is_empty());
    assert!(instance_names(&fixture, &inventory).is_empty());
    assert_eq!(
        static_names(&fixture, "Playlist"),
        ["values.*", "values.*.enabled"]
    );
}

#[test]
fn test_inherited_properties_walk_first() {
    let fixture = fixture();
    assert_eq!(
        static_names(&fixture, "Derived"),
        ["origin", "items.<key>", "items.<key>.enabled"]
    );
}

#[test]
fn test_leaf_values_are_not_fetched_by_the_walk() {
    let fixture = fixture();
    let root = config("x", true);

    instance_names(&fixture, &root);
    assert_eq!(fixture.name_reads.load(Ordering::SeqCst), 0);

    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));
    walker.walk(&root, &mut RecordingVisitor::fetching()).unwrap();
    assert_eq!(fixture.name_reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_repeated_walks_are_stable() {
    let fixture = fixture();
    let root = config("x", true);
    let first = instance_names(&fixture, &root);
    let second = instance_names(&fixture, &root);
    assert_eq!(first, second);
    assert_eq!(static_names(&fixture, "Config"), static_names(&fixture, "Config"));
}

#[test]
fn test_accessor_failure_carries_qualified_name() {
    let fixture = fixture();
    let root: InstanceNode = Arc::new(Outer {
        inner: Arc::new(Broken {}),
    });
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));

    let error = walker.walk(&root, &mut PathCollector::new()).unwrap_err();

    match error.current_context() {
        Error::AccessorInvocation {
            qualified_name,
            property,
            source,
        } => {
            assert_eq!(qualified_name, "inner.sub");
            assert_eq!(property, "sub");
            assert_eq!(source.to_string(), "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_leaf_without_getter_fails_only_when_fetched() {
    init_tracing();
    let stranger: InstanceNode = Arc::new(Stranger {});
    let registry = TypeRegistry::builder()
        .register(TypeDeclaration::new("Stranger").leaf("secret", "String"))
        .build()
        .unwrap();
    let walker = InstanceWalker::instance_walker(Arc::new(registry));

    let mut lazy = RecordingVisitor::default();
    walker.walk(&stranger, &mut lazy).unwrap();
    assert_eq!(lazy.calls[1], leaf("secret", None));

    let mut eager = RecordingVisitor::fetching();
    walker.walk(&stranger, &mut eager).unwrap();
    let Call::Leaf {
        value: Some(value), ..
    } = &eager.calls[1]
    else {
        panic!("expected a fetched leaf, got {:?}", eager.calls);
    };
    assert!(value.starts_with("error: Accessor for property 'secret'"));
}

#[test]
fn test_unregistered_type_aborts_walk() {
    let fixture = fixture();
    let root: InstanceNode = Arc::new(Stranger {});
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));

    let error = walker.walk(&root, &mut PathCollector::new()).unwrap_err();

    assert!(matches!(
        error.current_context(),
        Error::TypeNotRegistered { type_name } if type_name == "Stranger"
    ));
}

#[test]
fn test_unavailable_deferred_value_aborts_walk() {
    let fixture = fixture();
    let root: InstanceNode = Arc::new(Wrapped {
        name: Arc::new(Provider::of("x".to_string())),
        sub:  Arc::new(Provider::from_fn(|| Err("not wired".into()))),
    });
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store));

    let error = walker.walk(&root, &mut PathCollector::new()).unwrap_err();

    assert!(matches!(
        error.current_context(),
        Error::DeferredValueUnavailable { .. }
    ));
}

#[test]
fn test_cycles_hit_the_depth_limit() {
    let fixture = fixture();
    let instance_walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store))
        .with_options(WalkOptions::with_max_depth(10));
    let root: InstanceNode = Arc::new(Chain {});

    let error = instance_walker
        .walk(&root, &mut PathCollector::new())
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        Error::RecursionLimitExceeded { limit: 10, .. }
    ));

    let static_walker = StaticTypeWalker::static_type_walker(Arc::clone(&fixture.store))
        .with_options(WalkOptions::with_max_depth(64));
    let error = static_walker
        .walk(&TypeToken::of("Chain"), &mut PathCollector::new())
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        Error::RecursionLimitExceeded { qualified_name, .. } if qualified_name.starts_with("next.next")
    ));
}

#[test]
fn test_deep_acyclic_model_walks_without_a_limit() {
    init_tracing();
    let levels = 40;
    let registry = (0..levels)
        .fold(TypeRegistry::builder(), |builder, level| {
            builder.register(
                TypeDeclaration::new(format!("Level{level}"))
                    .nested("next", format!("Provider<List<Level{}>>", level + 1)),
            )
        })
        .register(TypeDeclaration::new(format!("Level{levels}")).leaf("end", "bool"))
        .build()
        .unwrap();
    let walker = StaticTypeWalker::static_type_walker(Arc::new(registry));
    assert_eq!(walker.options().max_depth, None);

    let mut collector = PathCollector::new();
    walker.walk(&TypeToken::of("Level0"), &mut collector).unwrap();

    let names = collector.qualified_names();
    let deepest = vec!["next.*"; levels].join(".");
    assert_eq!(names.len(), levels + 1);
    assert_eq!(names[levels - 1], deepest);
    assert_eq!(names[levels], format!("{deepest}.end"));
}

#[test]
fn test_depth_limit_names_offending_node() {
    let fixture = fixture();
    let walker = InstanceWalker::instance_walker(Arc::clone(&fixture.store))
        .with_options(WalkOptions::with_max_depth(0));

    let error = walker
        .walk(&config("x", true), &mut PathCollector::new())
        .unwrap_err();

    assert!(matches!(
        error.current_context(),
        Error::RecursionLimitExceeded { qualified_name, limit: 0 } if qualified_name == "sub"
    ));
}

#[test]
fn test_concurrent_walks_share_one_registry() {
    let fixture = &fixture();
    let root = &config("x", true);

    let results: Vec<(Vec<String>, Vec<String>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    (
                        instance_names(fixture, root),
                        static_names(fixture, "Config"),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for (instance, declared) in &results {
        assert_eq!(instance, &["name", "sub", "sub.flag"]);
        assert_eq!(instance, declared);
    }
}

#[test]
fn test_visitor_may_be_a_trait_object() {
    let fixture = fixture();
    let walker = StaticTypeWalker::static_type_walker(Arc::clone(&fixture.store));
    let mut collector = PathCollector::new();
    let visitor: &mut dyn NodeMetadataVisitor<TypeToken> = &mut collector;

    walker.walk(&TypeToken::of("Config"), visitor).unwrap();

    let report = collector.into_report();
    assert_eq!(report.leaf_names(), ["name", "sub.flag"]);
}

#[test]
fn test_node_shape_precedence() {
    let fixture = fixture();
    let shape = |name: &str| NodeShape::of(&fixture.store.type_metadata(&TypeName::from(name)).unwrap());
    assert_eq!(shape("Provider"), NodeShape::Deferred);
    assert_eq!(shape("Map"), NodeShape::Map);
    assert_eq!(shape("List"), NodeShape::Iterable);
    assert_eq!(shape("TaggedList"), NodeShape::Bean);
    assert_eq!(shape("Catalog"), NodeShape::Bean);
    assert_eq!(shape("Config"), NodeShape::Bean);
}
