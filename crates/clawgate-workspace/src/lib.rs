//! clawgate-workspace: workspace confinement and instruction-context injection.

mod error;
pub mod guard;
pub mod inject;
mod session_type;

pub use error::WorkspaceError;
pub use guard::FilesystemScope;
pub use inject::{
    select_injected, DirSource, InjectedFile, InjectionLimits, InjectionRule, WorkspaceFile,
    WorkspaceSource,
};
pub use session_type::SessionType;
