//! Policy document parsing and the on-disk policy store.
//!
//! The document mirrors the gateway's JSON configuration (camelCase keys).
//! Parsing is lenient about absent fields but compilation validates every
//! profile, group, tool, and sender key eagerly.

use crate::error::PolicyError;
use crate::snapshot::PolicySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Per-scope tool policy fragment (the `tools` object).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolPolicyConfig {
    /// Baseline profile name. Unset resolves to `full`.
    pub profile: Option<String>,
    /// Extra grants on top of the profile; tool ids or `group:` refs.
    pub allow: Option<Vec<String>>,
    /// Revocations; beat `allow` and the profile within the same scope.
    pub deny: Option<Vec<String>>,
    /// Whether privileged ("sudo-equivalent") execution is permitted.
    pub elevated: Option<bool>,
}

/// Per-sender fragment under `toolsBySender`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SenderRuleConfig {
    pub deny: Vec<String>,
    pub also_allow: Vec<String>,
}

/// Tool rules for a channel-group scope.
///
/// Only `allow`/`deny` and sender rules are meaningful here; compilation
/// rejects a `profile` or `elevated` field at this scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeConfig {
    pub tools: ToolPolicyConfig,
    pub tools_by_sender: BTreeMap<String, SenderRuleConfig>,
}

/// Memory search configuration fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemorySearchConfig {
    pub extra_paths: Vec<PathBuf>,
}

/// Workspace confinement fragment.
///
/// `workspaceOnly` defaults to false, matching the gateway's shipped (and
/// documented as dangerous) behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub workspace_only: bool,
}

/// Per-agent configuration. Fields that are present override the global
/// default; absent fields inherit it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    pub tools: ToolPolicyConfig,
    pub tools_by_sender: BTreeMap<String, SenderRuleConfig>,
    /// Provider id to profile name; substitutes the baseline profile when
    /// the request arrives through that provider.
    pub by_provider: BTreeMap<String, String>,
    /// Present (even empty) fully replaces the global memory-search scope.
    pub memory_search: Option<MemorySearchConfig>,
    pub workspace: Option<WorkspaceConfig>,
}

/// Top-level policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyDocument {
    /// Global default tool policy inherited by every agent.
    pub tools: ToolPolicyConfig,
    /// Global default per-sender rules.
    pub tools_by_sender: BTreeMap<String, SenderRuleConfig>,
    /// Global default provider profile overrides.
    pub by_provider: BTreeMap<String, String>,
    /// Global default memory-search scope.
    pub memory_search: MemorySearchConfig,
    pub agents: BTreeMap<String, AgentConfig>,
    pub channel_groups: BTreeMap<String, ScopeConfig>,
}

impl PolicyDocument {
    /// Parse a JSON policy document without compiling it.
    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse and compile in one step.
    pub fn compile_json(raw: &str) -> Result<PolicySnapshot, PolicyError> {
        PolicySnapshot::compile(&Self::from_json(raw)?)
    }
}

/// Location of the policy document on disk.
pub struct PolicyStore {
    path: PathBuf,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyStore {
    /// Store rooted at `~/.clawgate/policy.json`.
    pub fn new() -> Self {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".clawgate");
        path.push("policy.json");
        Self { path }
    }

    /// Store at a custom location (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load and compile the policy document.
    ///
    /// A missing file compiles the empty document (which, per the documented
    /// defaults, grants the `full` profile to everyone). A file that exists
    /// but fails to parse or validate is a hard error; unlike user settings,
    /// a broken policy must never fall back silently.
    pub fn load(&self) -> Result<PolicySnapshot, PolicyError> {
        let doc = match fs::read_to_string(&self.path) {
            Ok(content) => PolicyDocument::from_json(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no policy document, using defaults");
                PolicyDocument::default()
            }
            Err(e) => return Err(PolicyError::Io(e)),
        };
        PolicySnapshot::compile(&doc)
    }

    /// Write a policy document back to disk.
    pub fn save(&self, doc: &PolicyDocument) -> Result<(), PolicyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
