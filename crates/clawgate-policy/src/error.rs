//! Error types for the clawgate-policy crate.

/// Errors raised while loading or compiling a policy document.
///
/// All variants are fatal at load time: a policy that references unknown
/// names must block engine initialization rather than silently dropping the
/// entry.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A profile, group, or tool name not present in the registry
    #[error("Unknown reference '{name}' in {context}")]
    UnknownReference { name: String, context: String },

    /// A sender key with an unrecognized kind prefix
    #[error("Invalid sender key '{0}': expected id:, e164:, username:, name:, or *")]
    InvalidSenderKey(String),

    /// A field that has no meaning at the scope where it appears
    #[error("Field '{field}' is not supported in {context}")]
    UnsupportedField { field: String, context: String },

    /// I/O error while reading the policy document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
