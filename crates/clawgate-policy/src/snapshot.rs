//! Compiled, immutable policy snapshots.
//!
//! Compilation resolves every name against the registry up front, so a
//! snapshot can answer decision queries without further validation and can be
//! shared across threads behind an `Arc`.

use crate::config::{PolicyDocument, SenderRuleConfig};
use crate::engine::RequestContext;
use crate::error::PolicyError;
use crate::registry::{ToolRegistry, DEFAULT_PROFILE};
use crate::sender::SenderKey;
use crate::tool::{ToolId, ToolRef};
use clawgate_workspace::FilesystemScope;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// One sender rule compiled to concrete tool sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderRuleSet {
    pub deny: BTreeSet<ToolId>,
    pub also_allow: BTreeSet<ToolId>,
}

/// Allow/deny state compiled for one scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeRules {
    pub deny: BTreeSet<ToolId>,
    pub allow: BTreeSet<ToolId>,
    pub by_sender: BTreeMap<SenderKey, SenderRuleSet>,
}

impl ScopeRules {
    /// Exact-key and wildcard sender rules applicable to a sender, in that
    /// precedence order.
    pub(crate) fn sender_rules(
        &self,
        sender: &SenderKey,
    ) -> (Option<&SenderRuleSet>, Option<&SenderRuleSet>) {
        let exact = if sender.is_wildcard() {
            None
        } else {
            self.by_sender.get(sender)
        };
        (exact, self.by_sender.get(&SenderKey::Any))
    }
}

/// Fully resolved policy for one agent (global defaults already merged).
#[derive(Debug, Clone)]
pub struct AgentRules {
    pub rules: ScopeRules,
    /// Resolved baseline profile name, `full` when nothing was assigned.
    pub profile: String,
    pub profile_tools: BTreeSet<ToolId>,
    /// Provider id to (profile name, flattened tool set).
    pub by_provider: BTreeMap<String, (String, BTreeSet<ToolId>)>,
    pub elevated: bool,
    /// Present (even empty) replaces the global memory-search paths.
    pub memory_paths: Option<Vec<PathBuf>>,
    pub fs_scope: Option<FilesystemScope>,
}

/// Immutable policy snapshot shared by every session created from it.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    registry_version: u32,
    defaults: AgentRules,
    agents: BTreeMap<String, AgentRules>,
    channel_groups: BTreeMap<String, ScopeRules>,
    global_memory_paths: Vec<PathBuf>,
}

impl PolicySnapshot {
    /// Compile a parsed policy document, validating every reference eagerly.
    pub fn compile(doc: &PolicyDocument) -> Result<Self, PolicyError> {
        let global_profile = doc.tools.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        let global_by_sender = compile_sender_map(&doc.tools_by_sender, "toolsBySender")?;
        let global_by_provider = compile_providers(&doc.by_provider, "byProvider")?;

        let defaults = AgentRules {
            rules: ScopeRules {
                deny: compile_refs(doc.tools.deny.as_deref().unwrap_or(&[]), "tools.deny")?,
                allow: compile_refs(doc.tools.allow.as_deref().unwrap_or(&[]), "tools.allow")?,
                by_sender: global_by_sender.clone(),
            },
            profile: global_profile.to_string(),
            profile_tools: ToolRegistry::profile_tools(global_profile)?,
            by_provider: global_by_provider.clone(),
            elevated: doc.tools.elevated.unwrap_or(false),
            memory_paths: None,
            fs_scope: None,
        };

        let mut agents = BTreeMap::new();
        for (agent_id, agent) in &doc.agents {
            let context = format!("agents.{agent_id}");

            // Field-level inheritance: a field present on the agent replaces
            // the global default, an absent field inherits it.
            let profile = agent
                .tools
                .profile
                .as_deref()
                .unwrap_or(global_profile)
                .to_string();
            let deny = match &agent.tools.deny {
                Some(refs) => compile_refs(refs, &format!("{context}.tools.deny"))?,
                None => defaults.rules.deny.clone(),
            };
            let allow = match &agent.tools.allow {
                Some(refs) => compile_refs(refs, &format!("{context}.tools.allow"))?,
                None => defaults.rules.allow.clone(),
            };

            // Sender maps overlay key-wise: agent entries shadow global
            // entries under the same key, other global keys remain visible.
            let mut by_sender = global_by_sender.clone();
            by_sender.extend(compile_sender_map(
                &agent.tools_by_sender,
                &format!("{context}.toolsBySender"),
            )?);

            let mut by_provider = global_by_provider.clone();
            by_provider.extend(compile_providers(
                &agent.by_provider,
                &format!("{context}.byProvider"),
            )?);

            agents.insert(
                agent_id.clone(),
                AgentRules {
                    rules: ScopeRules {
                        deny,
                        allow,
                        by_sender,
                    },
                    profile_tools: ToolRegistry::profile_tools(&profile)?,
                    profile,
                    by_provider,
                    elevated: agent
                        .tools
                        .elevated
                        .or(doc.tools.elevated)
                        .unwrap_or(false),
                    memory_paths: agent
                        .memory_search
                        .as_ref()
                        .map(|m| m.extra_paths.clone()),
                    fs_scope: agent.workspace.as_ref().map(|w| FilesystemScope {
                        root: w.root.clone(),
                        workspace_only: w.workspace_only,
                    }),
                },
            );
        }

        let mut channel_groups = BTreeMap::new();
        for (group_id, scope) in &doc.channel_groups {
            let context = format!("channelGroups.{group_id}");
            // Channel groups carry only deny/allow/sender rules; a profile or
            // elevation flag here would be silently meaningless, so loading
            // refuses it instead of dropping it.
            if scope.tools.profile.is_some() {
                return Err(PolicyError::UnsupportedField {
                    field: "profile".to_string(),
                    context: format!("{context}.tools"),
                });
            }
            if scope.tools.elevated.is_some() {
                return Err(PolicyError::UnsupportedField {
                    field: "elevated".to_string(),
                    context: format!("{context}.tools"),
                });
            }
            channel_groups.insert(
                group_id.clone(),
                ScopeRules {
                    deny: compile_refs(
                        scope.tools.deny.as_deref().unwrap_or(&[]),
                        &format!("{context}.tools.deny"),
                    )?,
                    allow: compile_refs(
                        scope.tools.allow.as_deref().unwrap_or(&[]),
                        &format!("{context}.tools.allow"),
                    )?,
                    by_sender: compile_sender_map(
                        &scope.tools_by_sender,
                        &format!("{context}.toolsBySender"),
                    )?,
                },
            );
        }

        tracing::debug!(
            agents = agents.len(),
            channel_groups = channel_groups.len(),
            "compiled policy snapshot"
        );

        Ok(Self {
            registry_version: crate::registry::REGISTRY_VERSION,
            defaults,
            agents,
            channel_groups,
            global_memory_paths: doc.memory_search.extra_paths.clone(),
        })
    }

    /// Registry revision this snapshot was compiled against.
    pub fn registry_version(&self) -> u32 {
        self.registry_version
    }

    /// Resolved rules for an agent; unknown agents get the global defaults.
    pub fn agent(&self, agent_id: &str) -> &AgentRules {
        self.agents.get(agent_id).unwrap_or(&self.defaults)
    }

    /// Rules for a channel group, when the policy defines one.
    pub fn channel_group(&self, group_id: &str) -> Option<&ScopeRules> {
        self.channel_groups.get(group_id)
    }

    /// Effective memory-search paths for an agent.
    ///
    /// A per-agent `memorySearch` block, even with an empty path list, fully
    /// replaces the global default. Override, never union.
    pub fn memory_paths(&self, agent_id: &str) -> &[PathBuf] {
        match &self.agent(agent_id).memory_paths {
            Some(paths) => paths,
            None => &self.global_memory_paths,
        }
    }

    /// Whether privileged execution is permitted for an agent.
    pub fn elevation_allowed(&self, agent_id: &str) -> bool {
        self.agent(agent_id).elevated
    }

    /// Filesystem confinement for an agent, when one is configured.
    pub fn fs_scope(&self, agent_id: &str) -> Option<&FilesystemScope> {
        self.agent(agent_id).fs_scope.as_ref()
    }

    /// Convenience wrapper over [`PolicySnapshot::decide`].
    pub fn is_allowed(&self, tool: &ToolId, ctx: &RequestContext<'_>) -> bool {
        self.decide(tool, ctx).allowed
    }
}

fn compile_refs(refs: &[String], context: &str) -> Result<BTreeSet<ToolId>, PolicyError> {
    let parsed: Vec<ToolRef> = refs.iter().map(|r| ToolRef::parse(r)).collect();
    ToolRegistry::expand(&parsed, context)
}

fn compile_sender_map(
    map: &BTreeMap<String, SenderRuleConfig>,
    context: &str,
) -> Result<BTreeMap<SenderKey, SenderRuleSet>, PolicyError> {
    let mut out = BTreeMap::new();
    for (raw_key, rule) in map {
        let key = SenderKey::parse(raw_key)?;
        out.insert(
            key,
            SenderRuleSet {
                deny: compile_refs(&rule.deny, &format!("{context}.{raw_key}.deny"))?,
                also_allow: compile_refs(
                    &rule.also_allow,
                    &format!("{context}.{raw_key}.alsoAllow"),
                )?,
            },
        );
    }
    Ok(out)
}

fn compile_providers(
    map: &BTreeMap<String, String>,
    context: &str,
) -> Result<BTreeMap<String, (String, BTreeSet<ToolId>)>, PolicyError> {
    let mut out = BTreeMap::new();
    for (provider, profile) in map {
        let tools = ToolRegistry::profile_tools(profile).map_err(|_| {
            PolicyError::UnknownReference {
                name: profile.clone(),
                context: format!("{context}.{provider}"),
            }
        })?;
        out.insert(provider.clone(), (profile.clone(), tools));
    }
    Ok(out)
}
