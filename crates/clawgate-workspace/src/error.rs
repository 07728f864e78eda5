//! Error types for the clawgate-workspace crate.

/// Errors that can occur during workspace confinement and injection.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Requested path resolves outside the agent workspace
    #[error("Path '{0}' escapes the agent workspace")]
    PathEscape(String),

    /// I/O error while reading workspace files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
