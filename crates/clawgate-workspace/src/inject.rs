//! Workspace file enumeration and session-start injection selection.
//!
//! Which files reach the agent's instruction context depends only on the
//! session type and a static rule table. Selection happens once, at session
//! start; later edits to the workspace are invisible until a new session.

use crate::error::WorkspaceError;
use crate::session_type::SessionType;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Files a workspace may contribute to the instruction context.
///
/// Anything outside the fixed enumeration classifies as `Other` and is only
/// reachable through an explicit, authorized read tool call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkspaceFile {
    Agents,
    Soul,
    User,
    Identity,
    Tools,
    Heartbeat,
    Bootstrap,
    Memory,
    /// Any file outside the fixed enumeration, named by its file name.
    Other(String),
}

impl WorkspaceFile {
    /// File name within the workspace root.
    pub fn file_name(&self) -> &str {
        match self {
            WorkspaceFile::Agents => "AGENTS.md",
            WorkspaceFile::Soul => "SOUL.md",
            WorkspaceFile::User => "USER.md",
            WorkspaceFile::Identity => "IDENTITY.md",
            WorkspaceFile::Tools => "TOOLS.md",
            WorkspaceFile::Heartbeat => "HEARTBEAT.md",
            WorkspaceFile::Bootstrap => "BOOTSTRAP.md",
            WorkspaceFile::Memory => "MEMORY.md",
            WorkspaceFile::Other(name) => name,
        }
    }

    /// Classify a workspace file name.
    pub fn classify(name: &str) -> WorkspaceFile {
        match name {
            "AGENTS.md" => WorkspaceFile::Agents,
            "SOUL.md" => WorkspaceFile::Soul,
            "USER.md" => WorkspaceFile::User,
            "IDENTITY.md" => WorkspaceFile::Identity,
            "TOOLS.md" => WorkspaceFile::Tools,
            "HEARTBEAT.md" => WorkspaceFile::Heartbeat,
            "BOOTSTRAP.md" => WorkspaceFile::Bootstrap,
            "MEMORY.md" => WorkspaceFile::Memory,
            other => WorkspaceFile::Other(other.to_string()),
        }
    }

    /// Static injection rule for this file.
    pub fn rule(&self) -> InjectionRule {
        match self {
            WorkspaceFile::Agents
            | WorkspaceFile::Soul
            | WorkspaceFile::User
            | WorkspaceFile::Identity
            | WorkspaceFile::Tools => InjectionRule::Always,
            WorkspaceFile::Heartbeat => InjectionRule::ScheduledSessionOnly,
            WorkspaceFile::Bootstrap => InjectionRule::FirstSessionOnly,
            WorkspaceFile::Memory => InjectionRule::PrivateSessionOnly,
            WorkspaceFile::Other(name) => {
                if name.starts_with("SECURITY") {
                    InjectionRule::Never
                } else {
                    InjectionRule::OnDemandOnly
                }
            }
        }
    }

    /// Injection priority order. Earlier files win the total character
    /// budget; later files are truncated or dropped first.
    pub fn priority() -> [WorkspaceFile; 8] {
        [
            WorkspaceFile::Agents,
            WorkspaceFile::Soul,
            WorkspaceFile::User,
            WorkspaceFile::Identity,
            WorkspaceFile::Tools,
            WorkspaceFile::Heartbeat,
            WorkspaceFile::Bootstrap,
            WorkspaceFile::Memory,
        ]
    }
}

/// When a workspace file is injected into the instruction context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionRule {
    /// Injected into every session.
    Always,
    /// Injected only into the agent's first session.
    FirstSessionOnly,
    /// Injected only into scheduled heartbeat sessions.
    ScheduledSessionOnly,
    /// Injected only into the owner's private session.
    PrivateSessionOnly,
    /// Never injected at session start; reachable only by an explicit read.
    Never,
    /// Never injected; visible only to an explicit, authorized read.
    OnDemandOnly,
}

impl InjectionRule {
    /// Whether the rule selects a file for the given session type.
    pub fn applies(self, session: SessionType) -> bool {
        match self {
            InjectionRule::Always => true,
            InjectionRule::FirstSessionOnly => session == SessionType::FirstRun,
            InjectionRule::ScheduledSessionOnly => session == SessionType::Scheduled,
            InjectionRule::PrivateSessionOnly => session == SessionType::Main,
            InjectionRule::Never | InjectionRule::OnDemandOnly => false,
        }
    }
}

/// Character caps applied during injection. Truncation is silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionLimits {
    /// Cap per individual file, in characters.
    pub per_file_chars: usize,
    /// Cap across all injected files, in characters.
    pub total_chars: usize,
}

impl Default for InjectionLimits {
    fn default() -> Self {
        Self {
            per_file_chars: 20_000,
            total_chars: 80_000,
        }
    }
}

/// Source of raw workspace file content.
///
/// Implemented by the filesystem collaborator; kept as a trait so selection
/// stays a pure function in tests.
pub trait WorkspaceSource {
    /// Read the raw content of a workspace file, `None` when absent.
    fn read(&self, file: &WorkspaceFile) -> Result<Option<String>, WorkspaceError>;
}

/// Workspace source backed by a directory on disk.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WorkspaceSource for DirSource {
    fn read(&self, file: &WorkspaceFile) -> Result<Option<String>, WorkspaceError> {
        match fs::read_to_string(self.root.join(file.file_name())) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkspaceError::Io(e)),
        }
    }
}

/// One file selected for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedFile {
    pub file: WorkspaceFile,
    pub content: String,
    /// True when either cap cut the file short.
    pub truncated: bool,
}

/// Select and read the workspace files injected for a session type.
///
/// Files are visited in [`WorkspaceFile::priority`] order. Each file is first
/// truncated to the per-file cap, then charged against the remaining total
/// budget; once the budget is exhausted, trailing files are dropped without
/// error.
pub fn select_injected(
    session: SessionType,
    source: &dyn WorkspaceSource,
    limits: InjectionLimits,
) -> Result<Vec<InjectedFile>, WorkspaceError> {
    let mut remaining = limits.total_chars;
    let mut out = Vec::new();

    for file in WorkspaceFile::priority() {
        if !file.rule().applies(session) {
            continue;
        }
        let Some(raw) = source.read(&file)? else {
            continue;
        };
        if remaining == 0 {
            tracing::debug!(file = file.file_name(), "injection budget exhausted, dropping");
            break;
        }
        let original_len = raw.chars().count();
        let cap = limits.per_file_chars.min(remaining);
        let content = truncate_chars(raw, cap);
        let used = original_len.min(cap);
        remaining -= used;
        out.push(InjectedFile {
            truncated: used < original_len,
            file,
            content,
        });
    }

    Ok(out)
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source keyed by file name.
    struct MapSource(HashMap<&'static str, String>);

    impl MapSource {
        fn new(files: &[(&'static str, &str)]) -> Self {
            Self(
                files
                    .iter()
                    .map(|(name, content)| (*name, content.to_string()))
                    .collect(),
            )
        }
    }

    impl WorkspaceSource for MapSource {
        fn read(&self, file: &WorkspaceFile) -> Result<Option<String>, WorkspaceError> {
            Ok(self.0.get(file.file_name()).cloned())
        }
    }

    fn names(selected: &[InjectedFile]) -> Vec<&str> {
        selected.iter().map(|f| f.file.file_name()).collect()
    }

    #[test]
    fn test_main_session_selects_always_and_memory() {
        let source = MapSource::new(&[
            ("AGENTS.md", "a"),
            ("SOUL.md", "s"),
            ("MEMORY.md", "m"),
            ("HEARTBEAT.md", "h"),
            ("BOOTSTRAP.md", "b"),
        ]);
        let selected =
            select_injected(SessionType::Main, &source, InjectionLimits::default()).unwrap();
        assert_eq!(names(&selected), vec!["AGENTS.md", "SOUL.md", "MEMORY.md"]);
    }

    #[test]
    fn test_scheduled_session_gets_heartbeat_not_memory() {
        let source = MapSource::new(&[
            ("AGENTS.md", "a"),
            ("HEARTBEAT.md", "h"),
            ("MEMORY.md", "m"),
        ]);
        let selected =
            select_injected(SessionType::Scheduled, &source, InjectionLimits::default()).unwrap();
        assert_eq!(names(&selected), vec!["AGENTS.md", "HEARTBEAT.md"]);
    }

    #[test]
    fn test_first_run_session_gets_bootstrap() {
        let source = MapSource::new(&[("BOOTSTRAP.md", "b"), ("HEARTBEAT.md", "h")]);
        let selected =
            select_injected(SessionType::FirstRun, &source, InjectionLimits::default()).unwrap();
        assert_eq!(names(&selected), vec!["BOOTSTRAP.md"]);
    }

    #[test]
    fn test_security_file_is_never_selected() {
        let source = MapSource::new(&[("AGENTS.md", "a"), ("SECURITY.md", "secrets")]);
        for session in [
            SessionType::Main,
            SessionType::Group,
            SessionType::Scheduled,
            SessionType::FirstRun,
        ] {
            let selected = select_injected(session, &source, InjectionLimits::default()).unwrap();
            assert!(
                selected.iter().all(|f| f.file.file_name() != "SECURITY.md"),
                "SECURITY.md leaked into {session:?}"
            );
        }
    }

    #[test]
    fn test_unenumerated_file_is_never_selected() {
        assert_eq!(
            WorkspaceFile::classify("NOTES.md").rule(),
            InjectionRule::OnDemandOnly
        );
        assert!(!WorkspaceFile::classify("NOTES.md")
            .rule()
            .applies(SessionType::Main));
    }

    #[test]
    fn test_per_file_cap_truncates_silently() {
        let source = MapSource::new(&[("AGENTS.md", "abcdefgh")]);
        let limits = InjectionLimits {
            per_file_chars: 4,
            total_chars: 100,
        };
        let selected = select_injected(SessionType::Group, &source, limits).unwrap();
        assert_eq!(selected[0].content, "abcd");
        assert!(selected[0].truncated);
    }

    #[test]
    fn test_total_cap_favors_earlier_files() {
        let source = MapSource::new(&[
            ("AGENTS.md", "aaaa"),
            ("SOUL.md", "ssss"),
            ("USER.md", "uuuu"),
        ]);
        let limits = InjectionLimits {
            per_file_chars: 100,
            total_chars: 6,
        };
        let selected = select_injected(SessionType::Group, &source, limits).unwrap();
        assert_eq!(names(&selected), vec!["AGENTS.md", "SOUL.md"]);
        assert_eq!(selected[0].content, "aaaa");
        assert!(!selected[0].truncated);
        assert_eq!(selected[1].content, "ss");
        assert!(selected[1].truncated);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let source = MapSource::new(&[("AGENTS.md", "héllo wörld")]);
        let limits = InjectionLimits {
            per_file_chars: 3,
            total_chars: 100,
        };
        let selected = select_injected(SessionType::Group, &source, limits).unwrap();
        assert_eq!(selected[0].content, "hél");
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let source = MapSource::new(&[("SOUL.md", "s")]);
        let selected =
            select_injected(SessionType::Group, &source, InjectionLimits::default()).unwrap();
        assert_eq!(names(&selected), vec!["SOUL.md"]);
    }

    #[test]
    fn test_dir_source_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("AGENTS.md"), "from disk").unwrap();
        let source = DirSource::new(dir.path());
        let selected =
            select_injected(SessionType::Group, &source, InjectionLimits::default()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].content, "from disk");
        assert!(source.read(&WorkspaceFile::Soul).unwrap().is_none());
    }
}
