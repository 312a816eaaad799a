//! Mapping error types.

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors raised by rule construction, remapping and projection.
///
/// The two rule-homogeneity errors are intentionally distinct: the remap
/// engine reports [`MappingError::NameBasedOnly`] while the projection
/// engine reports [`MappingError::MixedRuleKinds`]. Callers match on the
/// messages, so the texts are stable.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A type rule reached the remap engine.
    #[error("only name-based mapping is supported")]
    NameBasedOnly,

    /// A name/array rule reached the projection engine's type lookup.
    #[error("name mapping cannot be combined with type mapping")]
    MixedRuleKinds,

    /// A mapping rule key is empty.
    #[error("mapping key must not be empty")]
    EmptyKey,

    /// A mapping rule key uses the reserved prefix.
    #[error("mapping key '{0}' uses reserved prefix")]
    ReservedKey(String),

    /// The no-rules fallback requires a top-level JSON array.
    #[error("non-array results not supported")]
    NonArrayResult,

    /// An array value reached a projection field.
    #[error("arrays not supported for mapping")]
    ArrayFieldNotSupported,

    /// A destination path runs through an existing scalar segment.
    #[error("value assignment not allowed - no leaf field")]
    NoLeafField,

    /// The declared field type is not supported by the projection engine.
    #[error("unspecified value type for field '{0}'")]
    UnspecifiedValueType(String),

    /// A scalar could not be coerced to the declared field type.
    #[error("invalid value type for field '{field}': {value}")]
    InvalidValueType {
        /// Destination field name.
        field: String,
        /// Offending source value, rendered as JSON.
        value: String,
    },

    /// Input text was not valid JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
