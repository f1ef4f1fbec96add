//! Interchange error types.

use thiserror::Error;

use crate::context::StoreError;

/// Result type for interchange operations.
pub type InterchangeResult<T> = Result<T, InterchangeError>;

/// Errors that can occur while converting between native and wire values.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// A native type's shape cannot be expressed as a wire type.
    #[error("unsupported native type {native_type}: {reason}")]
    UnsupportedType {
        /// The offending native type.
        native_type: String,
        /// Why the shape cannot be expressed.
        reason: String,
    },

    /// A runtime value or wire value does not match the declared type.
    #[error("cannot convert {native_type}: {reason}")]
    Conversion {
        /// The declared native type.
        native_type: String,
        /// The shape mismatch.
        reason: String,
    },

    /// Conversion was attempted on a type blocked from the wire format.
    #[error("type {native_type} is restricted and cannot cross a task boundary")]
    RestrictedType {
        /// The restricted native type.
        native_type: String,
    },

    /// More than one union variant successfully converted the same value.
    #[error("ambiguous union: variants {first} and {second} both match")]
    AmbiguousUnionMatch {
        /// Transformer name of the first matching variant.
        first: String,
        /// Transformer name of the second matching variant.
        second: String,
    },

    /// Reverse inference found no native type for a wire type.
    #[error("no native type can be inferred for wire type {wire_type}")]
    NotReversible {
        /// The wire type that could not be reversed.
        wire_type: String,
    },

    /// The resolver had no way to pick a native type for a key.
    #[error("cannot infer a native type for key {key}; supply an explicit type")]
    Inference {
        /// The unresolvable key.
        key: String,
    },

    /// A native type is already owned by another transformer.
    #[error("transformer {existing} for type {native_type} is already registered; cannot register {attempted}")]
    DuplicateRegistration {
        /// The contested native type.
        native_type: String,
        /// Name of the transformer that owns the type.
        existing: String,
        /// Name of the transformer that attempted the registration.
        attempted: String,
    },

    /// A key is missing from a literal mapping.
    #[error("key {key} is not in the literal map")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// A literal mapping carries more entries than the interface declares.
    #[error("received {received} literals but the interface declares {declared}")]
    Arity {
        /// Number of literals received.
        received: usize,
        /// Number of variables declared.
        declared: usize,
    },

    /// A single entry of a value mapping failed to convert.
    #[error("cannot convert entry {key} ({native_type}): {reason}")]
    Entry {
        /// The offending key.
        key: String,
        /// The native type used for the entry.
        native_type: String,
        /// The underlying failure.
        reason: String,
    },

    /// Blob store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InterchangeError {
    /// Creates an [`InterchangeError::UnsupportedType`].
    pub fn unsupported(native_type: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            native_type: native_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an [`InterchangeError::Conversion`].
    pub fn conversion(native_type: impl ToString, reason: impl Into<String>) -> Self {
        Self::Conversion {
            native_type: native_type.to_string(),
            reason: reason.into(),
        }
    }
}
