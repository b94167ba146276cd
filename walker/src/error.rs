use thiserror::Error;

use crate::metadata::TypeCapability;
use crate::type_name::TypeName;

// Error message prefixes
const MSG_INVALID_PREFIX: &str = "Invalid";
const MSG_UNRESOLVED_VARIABLE: &str = "unresolved type variable";

/// Result type for the `property_walker` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Boxed cause handed back by user supplied getters and deferred values
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised while building metadata or walking a model
#[derive(Debug, Error)]
pub enum Error {
    /// A property getter failed while fetching a child of a live value
    #[error("Accessor for property '{property}' failed at '{qualified_name}': {source}")]
    AccessorInvocation {
        /// Qualified name of the property whose getter failed
        qualified_name: String,
        /// Declared property name
        property:       String,
        /// Failure reported by the getter
        #[source]
        source:         BoxedError,
    },

    /// The registry declares a capability the live value does not expose
    #[error("Type '{type_name}' is declared {capability} but the value does not expose it")]
    CapabilityMismatch {
        /// Runtime type of the offending value
        type_name:  TypeName,
        /// Capability derived from the type's declaration
        capability: TypeCapability,
    },

    /// A deferred value could not produce its current value
    #[error("Deferred value of type '{type_name}' could not be resolved: {source}")]
    DeferredValueUnavailable {
        /// Runtime type of the deferred wrapper
        type_name: TypeName,
        /// Failure reported by the wrapper
        #[source]
        source:    BoxedError,
    },

    /// A type declaration was rejected while building the registry
    #[error("{0}")]
    InvalidMetadata(String),

    /// A type expression could not be parsed
    #[error("Invalid type expression '{input}': {message}")]
    InvalidTypeExpression {
        /// The rejected expression
        input:   String,
        /// What went wrong
        message: String,
    },

    /// A declared type lacks the generic structure its capability needs
    #[error("Malformed generic shape for '{type_name}': {message}")]
    MalformedGenericShape {
        /// Rendered type expression that could not be resolved
        type_name: String,
        /// What went wrong
        message:   String,
    },

    /// Nesting went deeper than the configured limit
    #[error("Recursion limit of {limit} exceeded at '{qualified_name}'")]
    RecursionLimitExceeded {
        /// Qualified name of the node that would have exceeded the limit
        qualified_name: String,
        /// Configured maximum depth
        limit:          usize,
    },

    /// A collected report could not be serialized
    #[error("Failed to serialize report: {0}")]
    ReportSerialization(String),

    /// The registry has no metadata for a type reached during a walk
    #[error("Type not registered: {type_name}")]
    TypeNotRegistered {
        /// The type that could not be resolved
        type_name: TypeName,
    },
}

impl Error {
    // Builder methods for common patterns

    /// Create a "Type not registered" error
    pub fn not_registered(type_name: &TypeName) -> Self {
        Self::TypeNotRegistered {
            type_name: type_name.clone(),
        }
    }

    /// Create a malformed generic shape error
    pub fn malformed(type_name: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        Self::MalformedGenericShape {
            type_name: type_name.to_string(),
            message:   message.to_string(),
        }
    }

    /// Create a malformed generic shape error for a type variable nothing bound
    pub fn unresolved_variable(variable: &str) -> Self {
        Self::malformed(variable, MSG_UNRESOLVED_VARIABLE)
    }

    /// Create an "Invalid X" metadata error
    pub fn invalid_metadata(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidMetadata(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create an accessor invocation error for the property at `qualified_name`
    pub fn accessor_failed(qualified_name: &str, property: &str, source: BoxedError) -> Self {
        Self::AccessorInvocation {
            qualified_name: qualified_name.to_string(),
            property: property.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_error_keeps_cause() {
        let error = Error::accessor_failed("sub.flag", "flag", "boom".into());
        assert_eq!(
            error.to_string(),
            "Accessor for property 'flag' failed at 'sub.flag': boom"
        );
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("boom"));
    }

    #[test]
    fn test_invalid_metadata_prefix() {
        let error = Error::invalid_metadata("supertype", "Foo is not registered");
        assert_eq!(error.to_string(), "Invalid supertype: Foo is not registered");
    }
}
