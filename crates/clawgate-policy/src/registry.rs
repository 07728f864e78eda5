//! Built-in tool group and profile registry.
//!
//! Group and profile membership is fixed at compile time; policies refer to
//! these names and are validated against the registry when loaded.

use crate::error::PolicyError;
use crate::tool::{ToolId, ToolRef};
use std::collections::BTreeSet;

/// Registry revision. Bump when group or profile membership changes.
pub const REGISTRY_VERSION: u32 = 1;

/// Profile applied when an agent has no explicit assignment.
///
/// `full` on purpose: the gateway documents the unset-profile case as
/// granting everything, and downstream audits rely on seeing that behavior
/// rather than a quietly safer default.
pub const DEFAULT_PROFILE: &str = "full";

/// Named bundle of tool identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolGroup {
    pub name: &'static str,
    pub tools: &'static [&'static str],
}

const BUILTIN_GROUPS: &[ToolGroup] = &[
    ToolGroup {
        name: "runtime",
        tools: &["exec", "bash", "process"],
    },
    ToolGroup {
        name: "fs",
        tools: &["read", "write", "edit", "ls", "grep", "glob"],
    },
    ToolGroup {
        name: "sessions",
        tools: &[
            "sessions_list",
            "sessions_history",
            "sessions_send",
            "sessions_spawn",
        ],
    },
    ToolGroup {
        name: "memory",
        tools: &["memory_search", "memory_get"],
    },
    ToolGroup {
        name: "web",
        tools: &["web_search", "web_fetch"],
    },
    ToolGroup {
        name: "automation",
        tools: &["cron", "wakeups"],
    },
    ToolGroup {
        name: "messaging",
        tools: &["message", "react"],
    },
    ToolGroup {
        name: "ui",
        tools: &["browser", "canvas", "camera", "screen"],
    },
];

/// Named baseline capability set granted before allow/deny overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub groups: &'static [&'static str],
    pub tools: &'static [&'static str],
}

const BUILTIN_PROFILES: &[Profile] = &[
    Profile {
        name: "full",
        groups: &[
            "runtime",
            "fs",
            "sessions",
            "memory",
            "web",
            "automation",
            "messaging",
            "ui",
        ],
        tools: &[],
    },
    Profile {
        name: "coding",
        groups: &["fs", "runtime", "sessions", "memory", "web"],
        tools: &[],
    },
    Profile {
        name: "messaging",
        groups: &["messaging", "sessions", "memory"],
        tools: &[],
    },
    Profile {
        name: "minimal",
        groups: &["memory"],
        tools: &["read"],
    },
];

/// Registry over built-in tool groups and profiles.
pub struct ToolRegistry;

impl ToolRegistry {
    /// All built-in tool groups.
    pub fn groups() -> &'static [ToolGroup] {
        BUILTIN_GROUPS
    }

    /// Look up a group by name.
    pub fn group(name: &str) -> Option<&'static ToolGroup> {
        BUILTIN_GROUPS.iter().find(|g| g.name == name)
    }

    /// All built-in profiles.
    pub fn profiles() -> &'static [Profile] {
        BUILTIN_PROFILES
    }

    /// Look up a profile by name.
    pub fn profile(name: &str) -> Option<&'static Profile> {
        BUILTIN_PROFILES.iter().find(|p| p.name == name)
    }

    /// Whether a tool id is registered in any group.
    pub fn is_tool(name: &str) -> bool {
        BUILTIN_GROUPS.iter().any(|g| g.tools.contains(&name))
    }

    /// Every registered tool identifier.
    pub fn all_tools() -> BTreeSet<ToolId> {
        BUILTIN_GROUPS
            .iter()
            .flat_map(|g| g.tools.iter().map(|t| ToolId::from(*t)))
            .collect()
    }

    /// Flatten a profile into its concrete tool set.
    pub fn profile_tools(name: &str) -> Result<BTreeSet<ToolId>, PolicyError> {
        let profile = Self::profile(name).ok_or_else(|| PolicyError::UnknownReference {
            name: name.to_string(),
            context: "profile".to_string(),
        })?;
        let mut tools = BTreeSet::new();
        for group in profile.groups {
            // Built-in profiles only reference built-in groups.
            if let Some(group) = Self::group(group) {
                tools.extend(group.tools.iter().map(|t| ToolId::from(*t)));
            }
        }
        tools.extend(profile.tools.iter().map(|t| ToolId::from(*t)));
        Ok(tools)
    }

    /// Flatten tool and `group:` references into a concrete tool set.
    ///
    /// Any name absent from the registry is a hard error; the gateway's own
    /// habit of silently dropping unrecognized keys is a documented hazard,
    /// not a model to follow.
    pub fn expand<'a>(
        refs: impl IntoIterator<Item = &'a ToolRef>,
        context: &str,
    ) -> Result<BTreeSet<ToolId>, PolicyError> {
        let mut tools = BTreeSet::new();
        for r in refs {
            match r {
                ToolRef::Tool(tool) => {
                    if !Self::is_tool(tool.as_str()) {
                        return Err(PolicyError::UnknownReference {
                            name: tool.as_str().to_string(),
                            context: context.to_string(),
                        });
                    }
                    tools.insert(tool.clone());
                }
                ToolRef::Group(group) => {
                    let group = Self::group(group).ok_or_else(|| PolicyError::UnknownReference {
                        name: format!("group:{group}"),
                        context: context.to_string(),
                    })?;
                    tools.extend(group.tools.iter().map(|t| ToolId::from(*t)));
                }
            }
        }
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_profile_covers_every_tool() {
        assert_eq!(
            ToolRegistry::profile_tools("full").unwrap(),
            ToolRegistry::all_tools()
        );
    }

    #[test]
    fn test_messaging_profile_excludes_exec() {
        let tools = ToolRegistry::profile_tools("messaging").unwrap();
        assert!(tools.contains(&ToolId::from("message")));
        assert!(tools.contains(&ToolId::from("sessions_send")));
        assert!(!tools.contains(&ToolId::from("exec")));
        assert!(!tools.contains(&ToolId::from("write")));
    }

    #[test]
    fn test_expand_group_reference() {
        let refs = vec![ToolRef::parse("group:runtime"), ToolRef::parse("read")];
        let tools = ToolRegistry::expand(&refs, "test").unwrap();
        assert!(tools.contains(&ToolId::from("exec")));
        assert!(tools.contains(&ToolId::from("bash")));
        assert!(tools.contains(&ToolId::from("read")));
        assert!(!tools.contains(&ToolId::from("write")));
    }

    #[test]
    fn test_unknown_group_is_a_hard_error() {
        let refs = vec![ToolRef::parse("group:nope")];
        let err = ToolRegistry::expand(&refs, "tools.allow").unwrap_err();
        assert!(err.to_string().contains("group:nope"));
        assert!(err.to_string().contains("tools.allow"));
    }

    #[test]
    fn test_unknown_tool_is_a_hard_error() {
        let refs = vec![ToolRef::parse("teleport")];
        assert!(matches!(
            ToolRegistry::expand(&refs, "test").unwrap_err(),
            PolicyError::UnknownReference { .. }
        ));
    }

    #[test]
    fn test_unknown_profile_is_a_hard_error() {
        assert!(ToolRegistry::profile_tools("root").is_err());
    }
}
