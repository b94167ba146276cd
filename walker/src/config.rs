//! Options controlling a walk

use serde::{Deserialize, Serialize};

/// Configuration shared by both walkers
///
/// Missing fields deserialize to their defaults, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// Recursion steps allowed below the root before the walk aborts
    ///
    /// `None` (the default) leaves depth to the model. Every property, map
    /// entry, element and deferred unwrap counts as one step, so a limit makes
    /// a cyclic model fail with a recursion error instead of exhausting the
    /// stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl WalkOptions {
    /// Options with a depth limit
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_object_is_unbounded() {
        let options: WalkOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, WalkOptions::default());
        assert_eq!(options.max_depth, None);
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }

    #[test]
    fn test_max_depth_round_trips() {
        let options = WalkOptions::with_max_depth(3);
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({ "max_depth": 3 }));
        assert_eq!(serde_json::from_value::<WalkOptions>(value).unwrap(), options);
    }
}
