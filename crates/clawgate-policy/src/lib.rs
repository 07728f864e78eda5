//! clawgate-policy: tool-access authorization for an agent gateway.
//!
//! A policy document is parsed, validated eagerly, and compiled into an
//! immutable [`PolicySnapshot`]. Every authorization decision is a pure
//! function of the snapshot and the request context, so snapshots can be
//! shared across concurrent sessions without locking.

pub mod config;
pub mod engine;
mod error;
pub mod registry;
pub mod sender;
pub mod snapshot;
pub mod tool;

pub use config::{
    AgentConfig, MemorySearchConfig, PolicyDocument, PolicyStore, ScopeConfig, SenderRuleConfig,
    ToolPolicyConfig, WorkspaceConfig,
};
pub use engine::{Decision, RequestContext, RuleMatch, RuleScope};
pub use error::PolicyError;
pub use registry::{Profile, ToolGroup, ToolRegistry, DEFAULT_PROFILE, REGISTRY_VERSION};
pub use sender::SenderKey;
pub use snapshot::{AgentRules, PolicySnapshot, ScopeRules, SenderRuleSet};
pub use tool::{ToolId, ToolRef};
