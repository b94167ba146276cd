//! A visitor that records the shape of a walk
//!
//! `PathCollector` never fetches leaf values, so it can run over live values
//! and declared types alike. Its [`PathReport`] lists every qualified name the
//! walk produced, in visit order, and renders to JSON for documenting a model's
//! property paths.

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::{PropertyKind, PropertyMetadata, TypeMetadata};
use crate::traversal::{LazyValue, NodeMetadataVisitor};
use crate::type_name::TypeName;
use crate::type_token::TypeToken;

/// One visitor callback, as recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WalkEvent {
    /// A bean node; the root has no qualified name
    Nested {
        /// Qualified name, absent for the root
        #[serde(skip_serializing_if = "Option::is_none")]
        qualified_name: Option<String>,
        /// Runtime or declared raw type of the node
        type_name:      TypeName,
    },
    /// A leaf property
    Leaf {
        /// Qualified name of the property
        qualified_name: String,
        /// Declared type of the property
        declared_type:  TypeToken,
    },
}

impl WalkEvent {
    /// Qualified name of the event, `None` for the root node
    #[must_use]
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            Self::Nested { qualified_name, .. } => qualified_name.as_deref(),
            Self::Leaf { qualified_name, .. } => Some(qualified_name),
        }
    }
}

/// Records every callback of a walk without touching leaf values
#[derive(Debug, Default)]
pub struct PathCollector {
    events: Vec<WalkEvent>,
}

impl PathCollector {
    /// An empty collector
    #[must_use]
    pub const fn new() -> Self { Self { events: Vec::new() } }

    /// Events recorded so far, in visit order
    #[must_use]
    pub fn events(&self) -> &[WalkEvent] { &self.events }

    /// Non-root qualified names in visit order
    #[must_use]
    pub fn qualified_names(&self) -> Vec<&str> {
        self.events.iter().filter_map(WalkEvent::qualified_name).collect()
    }

    /// Finish collecting
    #[must_use]
    pub fn into_report(self) -> PathReport { PathReport { events: self.events } }
}

impl<N> NodeMetadataVisitor<N> for PathCollector {
    fn visit_nested(&mut self, type_metadata: &TypeMetadata, qualified_name: Option<&str>, _node: &N) {
        self.events.push(WalkEvent::Nested {
            qualified_name: qualified_name.map(ToString::to_string),
            type_name:      type_metadata.type_name().clone(),
        });
    }

    fn visit_leaf(&mut self, qualified_name: &str, property: &PropertyMetadata, _value: LazyValue<'_, N>) {
        self.events.push(WalkEvent::Leaf {
            qualified_name: qualified_name.to_string(),
            declared_type:  property.declared_type().clone(),
        });
    }
}

/// The recorded shape of one walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathReport {
    /// Events in visit order
    pub events: Vec<WalkEvent>,
}

impl PathReport {
    /// Qualified names of leaf properties in visit order
    #[must_use]
    pub fn leaf_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WalkEvent::Leaf { qualified_name, .. } => Some(qualified_name.as_str()),
                WalkEvent::Nested { .. } => None,
            })
            .collect()
    }

    /// Number of events of the given property kind
    #[must_use]
    pub fn count(&self, kind: PropertyKind) -> usize {
        self.events
            .iter()
            .filter(|event| match kind {
                PropertyKind::Nested => matches!(event, WalkEvent::Nested { .. }),
                PropertyKind::Leaf => matches!(event, WalkEvent::Leaf { .. }),
            })
            .count()
    }

    /// Render as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportSerialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .change_context(Error::ReportSerialization("Failed to serialize path report".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn report() -> PathReport {
        PathReport {
            events: vec![
                WalkEvent::Nested {
                    qualified_name: None,
                    type_name:      TypeName::from("Config"),
                },
                WalkEvent::Leaf {
                    qualified_name: "items.<key>".to_string(),
                    declared_type:  TypeToken::parse("Provider<String>").unwrap(),
                },
            ],
        }
    }

    #[test]
    fn test_report_json_shape() {
        let rendered: Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "events": [
                    { "event": "nested", "type_name": "Config" },
                    {
                        "event": "leaf",
                        "qualified_name": "items.<key>",
                        "declared_type": "Provider<String>"
                    }
                ]
            })
        );
    }

    #[test]
    fn test_report_counts_by_kind() {
        let report = report();
        assert_eq!(report.count(PropertyKind::Nested), 1);
        assert_eq!(report.count(PropertyKind::Leaf), 1);
        assert_eq!(report.leaf_names(), ["items.<key>"]);
    }
}
