//! Session classification shared by injection and policy freezing.

use serde::{Deserialize, Serialize};

/// Kind of agent session being started.
///
/// The session type determines which workspace files are injected into the
/// instruction context and is fixed for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    /// Private one-on-one conversation with the agent's owner.
    Main,
    /// Shared channel or group conversation with multiple senders.
    Group,
    /// Scheduled heartbeat run with no human initiator.
    Scheduled,
    /// The very first session after agent creation.
    FirstRun,
}
