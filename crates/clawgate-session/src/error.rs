//! Error types for the clawgate-session crate.

/// Errors that can occur in session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Agent has no workspace configured
    #[error("Agent '{0}' has no workspace configured")]
    NoWorkspace(String),

    /// Workspace confinement or injection error
    #[error(transparent)]
    Workspace(#[from] clawgate_workspace::WorkspaceError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
