//! Session manager and per-session frozen policy state.

use crate::error::SessionError;
use clawgate_policy::{Decision, PolicySnapshot, RequestContext, SenderKey, ToolId};
use clawgate_workspace::{
    select_injected, InjectedFile, InjectionLimits, SessionType, WorkspaceSource,
};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Owns the current policy snapshot and creates sessions from it.
///
/// Installing a new snapshot (after a config reload) is an atomic swap.
/// Sessions created before the swap keep evaluating against the snapshot
/// they were born with; only sessions opened afterwards see the new policy.
pub struct SessionManager {
    current: RwLock<Arc<PolicySnapshot>>,
}

impl SessionManager {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Replace the current snapshot. Existing sessions are unaffected.
    pub fn install(&self, snapshot: PolicySnapshot) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(snapshot);
        tracing::debug!("installed new policy snapshot");
    }

    /// The snapshot new sessions will be created from.
    pub fn current(&self) -> Arc<PolicySnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Create a session for `agent_id`, freezing both the policy snapshot
    /// and the injected workspace context.
    pub fn open(
        &self,
        agent_id: &str,
        session_type: SessionType,
        source: &dyn WorkspaceSource,
        limits: InjectionLimits,
    ) -> Result<Session, SessionError> {
        let snapshot = self.current();
        let context_files = select_injected(session_type, source, limits)?;
        let id = ulid::Ulid::new().to_string();
        tracing::debug!(
            session = %id,
            agent = agent_id,
            ?session_type,
            injected = context_files.len(),
            "opened session"
        );
        Ok(Session {
            id,
            agent_id: agent_id.to_string(),
            session_type,
            snapshot,
            context_files,
        })
    }
}

/// One live agent session.
///
/// The tool policy and injected context are fixed at creation and never
/// re-evaluated, even when the gateway reloads its configuration. That
/// staleness is deliberate: callers needing fresh policy open a new session.
pub struct Session {
    id: String,
    agent_id: String,
    session_type: SessionType,
    snapshot: Arc<PolicySnapshot>,
    context_files: Vec<InjectedFile>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Workspace files injected at session start, in priority order.
    pub fn context_files(&self) -> &[InjectedFile] {
        &self.context_files
    }

    /// The policy snapshot frozen into this session.
    pub fn snapshot(&self) -> &PolicySnapshot {
        &self.snapshot
    }

    /// Decide a tool request against the frozen snapshot.
    pub fn decide(
        &self,
        tool: &ToolId,
        sender: Option<&SenderKey>,
        channel_group: Option<&str>,
        provider: Option<&str>,
    ) -> Decision {
        let ctx = RequestContext {
            agent_id: &self.agent_id,
            sender,
            channel_group,
            provider,
        };
        self.snapshot.decide(tool, &ctx)
    }

    pub fn is_allowed(
        &self,
        tool: &ToolId,
        sender: Option<&SenderKey>,
        channel_group: Option<&str>,
        provider: Option<&str>,
    ) -> bool {
        self.decide(tool, sender, channel_group, provider).allowed
    }

    /// Explicit on-demand read of a workspace file, routed through the
    /// filesystem scope guard. The only way non-injected files become
    /// visible to the agent.
    pub fn read_workspace_file(&self, relative: &Path) -> Result<String, SessionError> {
        let scope = self
            .snapshot
            .fs_scope(&self.agent_id)
            .ok_or_else(|| SessionError::NoWorkspace(self.agent_id.clone()))?;
        let resolved = scope.resolve(relative)?;
        Ok(std::fs::read_to_string(resolved)?)
    }
}
