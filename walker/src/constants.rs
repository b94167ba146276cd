// ============================================================================
// PATH SEGMENT CONSTANTS
// ============================================================================

/// Separator between qualified name segments
pub const QUALIFIED_NAME_SEPARATOR: &str = ".";

/// Prefix of the ordinal segment produced for iterable elements of live values
pub const ELEMENT_ORDINAL_PREFIX: &str = "$";

/// Placeholder segment for the value of any map entry when walking declared types
pub const MAP_KEY_PLACEHOLDER: &str = "<key>";

/// Placeholder segment for elements that expose a display name
pub const NAMED_ELEMENT_PLACEHOLDER: &str = "<name>";

/// Placeholder segment for any element of an iterable when walking declared types
pub const ELEMENT_PLACEHOLDER: &str = "*";

// ============================================================================
// BUILT-IN TYPE NAMES
// ============================================================================

// Capability roots
pub const TYPE_PROVIDER: &str = "Provider";
pub const TYPE_MAP: &str = "Map";
pub const TYPE_ITERABLE: &str = "Iterable";
pub const TYPE_NAMED: &str = "Named";

// Collections
pub const TYPE_LIST: &str = "List";
pub const TYPE_SET: &str = "Set";

// Scalars
pub const TYPE_STRING: &str = "String";
pub const TYPE_BOOL: &str = "bool";
pub const TYPE_I32: &str = "i32";
pub const TYPE_I64: &str = "i64";
pub const TYPE_U32: &str = "u32";
pub const TYPE_U64: &str = "u64";
pub const TYPE_F64: &str = "f64";
