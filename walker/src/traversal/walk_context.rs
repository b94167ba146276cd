//! Context carried down one branch of a walk
//!
//! Holds the qualified name accumulated so far and the recursion depth. Each
//! descent creates a new context; nothing is shared or mutated between
//! siblings.

use crate::constants::QUALIFIED_NAME_SEPARATOR;

/// Number of recursion steps from the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecursionDepth(usize);

impl RecursionDepth {
    /// Depth of the root node
    pub const ZERO: Self = Self(0);

    /// One level deeper
    #[must_use]
    pub const fn increment(self) -> Self { Self(self.0 + 1) }

    /// Whether this depth is past `limit`
    #[must_use]
    pub const fn exceeds(self, limit: usize) -> bool { self.0 > limit }
}

/// Position of a node within the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkContext {
    qualified_name: Option<String>,
    depth:          RecursionDepth,
}

impl WalkContext {
    /// Context of the root node, which has no qualified name
    #[must_use]
    pub const fn root() -> Self {
        Self {
            qualified_name: None,
            depth:          RecursionDepth::ZERO,
        }
    }

    /// Qualified name of the node, `None` at the root
    #[must_use]
    pub fn qualified_name(&self) -> Option<&str> { self.qualified_name.as_deref() }

    /// Qualified name for messages, rendering the root as an empty string
    #[must_use]
    pub fn display_name(&self) -> &str { self.qualified_name.as_deref().unwrap_or_default() }

    /// Current depth
    #[must_use]
    pub const fn depth(&self) -> RecursionDepth { self.depth }

    /// Context for the single value behind a deferred wrapper
    ///
    /// Unwrapping is transparent to naming, only the depth changes.
    #[must_use]
    pub fn unwrapped(&self) -> Self {
        Self {
            qualified_name: self.qualified_name.clone(),
            depth:          self.depth.increment(),
        }
    }

    /// Context for a property, map entry or element named `segment`
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let qualified_name = self.qualified_name.as_ref().map_or_else(
            || segment.to_string(),
            |parent| format!("{parent}{QUALIFIED_NAME_SEPARATOR}{segment}"),
        );
        Self {
            qualified_name: Some(qualified_name),
            depth:          self.depth.increment(),
        }
    }
}
