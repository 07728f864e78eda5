//! Workspace path confinement for filesystem tool requests.

use crate::error::WorkspaceError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Filesystem confinement rules for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemScope {
    /// Workspace root directory for the agent.
    pub root: PathBuf,
    /// When true, any path outside `root` is rejected.
    pub workspace_only: bool,
}

impl FilesystemScope {
    /// Scope that confines all access to the workspace root.
    pub fn confined(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workspace_only: true,
        }
    }

    /// Scope that permits any path. This mirrors the gateway's shipped
    /// default and is the documented dangerous mode.
    pub fn unconfined(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workspace_only: false,
        }
    }

    /// Resolve a requested path against the workspace root.
    ///
    /// Normalization is purely lexical: `.` and `..` segments are collapsed
    /// without touching the filesystem, so an escape is rejected even when
    /// the target does not exist yet. Relative paths are resolved against the
    /// workspace root. The result is binary accept/reject; there is no
    /// partial success.
    pub fn resolve(&self, requested: &Path) -> Result<PathBuf, WorkspaceError> {
        let root = normalize_path(&self.root);
        let candidate = if requested.is_absolute() {
            normalize_path(requested)
        } else {
            normalize_path(&root.join(requested))
        };

        if self.workspace_only && !candidate.starts_with(&root) {
            tracing::warn!(
                requested = %requested.display(),
                root = %root.display(),
                "rejected path outside workspace"
            );
            return Err(WorkspaceError::PathEscape(
                requested.display().to_string(),
            ));
        }
        Ok(candidate)
    }
}

/// Collapse `.` and `..` components without consulting the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir => out.push(component.as_os_str()),
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::Normal(seg) => out.push(seg),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scope() -> FilesystemScope {
        FilesystemScope::confined("/home/agent/ws")
    }

    #[test]
    fn test_relative_path_resolves_inside_workspace() {
        let resolved = scope().resolve(Path::new("notes/todo.md")).unwrap();
        assert_eq!(resolved, Path::new("/home/agent/ws/notes/todo.md"));
    }

    #[test]
    fn test_traversal_escape_is_rejected() {
        let err = scope().resolve(Path::new("../../openclaw.json")).unwrap_err();
        assert!(matches!(err, WorkspaceError::PathEscape(_)));
    }

    #[test]
    fn test_absolute_path_outside_workspace_is_rejected() {
        let err = scope().resolve(Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, WorkspaceError::PathEscape(_)));
    }

    #[test]
    fn test_traversal_that_stays_inside_is_allowed() {
        let resolved = scope().resolve(Path::new("sub/../notes.md")).unwrap();
        assert_eq!(resolved, Path::new("/home/agent/ws/notes.md"));
    }

    #[test]
    fn test_dot_segments_are_collapsed() {
        let resolved = scope().resolve(Path::new("./a/./b.txt")).unwrap();
        assert_eq!(resolved, Path::new("/home/agent/ws/a/b.txt"));
    }

    #[test]
    fn test_unconfined_scope_permits_anything() {
        let scope = FilesystemScope::unconfined("/home/agent/ws");
        let resolved = scope.resolve(Path::new("../../openclaw.json")).unwrap();
        assert_eq!(resolved, Path::new("/home/openclaw.json"));
    }

    #[test]
    fn test_sibling_prefix_directory_is_not_workspace() {
        // "/home/agent/ws-backup" shares a string prefix with the root but is
        // a different directory.
        let err = scope()
            .resolve(Path::new("/home/agent/ws-backup/file"))
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::PathEscape(_)));
    }
}
