//! Precedence resolver: the allow/deny decision ladder.
//!
//! Tiers, highest to lowest:
//!
//! 1. channel-group sender deny (exact key, then wildcard)
//! 2. channel-group sender alsoAllow (exact key, then wildcard)
//! 3. channel-group deny, then allow
//! 4. agent-default sender deny/allow (exact key, then wildcard)
//! 5. agent-default deny, then allow
//! 6. provider profile override (terminal membership check)
//! 7. baseline profile membership (terminal)
//!
//! A deny at any tier short-circuits: no lower-tier allow can override it.
//! Within a tier, deny is always consulted before allow, so a same-tier
//! conflict resolves to denial deterministically.

use crate::sender::SenderKey;
use crate::snapshot::{PolicySnapshot, ScopeRules};
use crate::tool::ToolId;

/// Context for a single tool authorization request.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub agent_id: &'a str,
    /// Concrete identity of the message sender, when one exists.
    pub sender: Option<&'a SenderKey>,
    /// Channel group the request arrived through, when any.
    pub channel_group: Option<&'a str>,
    /// Provider the request arrived through, when any.
    pub provider: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Context with only an agent, no sender/group/provider.
    pub fn for_agent(agent_id: &'a str) -> Self {
        Self {
            agent_id,
            sender: None,
            channel_group: None,
            provider: None,
        }
    }
}

/// Which scope a matched rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    ChannelGroup,
    AgentDefault,
}

/// The rule that decided a request, reported for audit traceability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    SenderDeny { scope: RuleScope, key: SenderKey },
    SenderAllow { scope: RuleScope, key: SenderKey },
    ScopeDeny(RuleScope),
    ScopeAllow(RuleScope),
    ProviderProfile { provider: String, profile: String },
    ProfileBaseline { profile: String },
}

/// Outcome of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub rule: RuleMatch,
}

impl Decision {
    fn denied(rule: RuleMatch) -> Self {
        Self {
            allowed: false,
            rule,
        }
    }

    fn allowed(rule: RuleMatch) -> Self {
        Self {
            allowed: true,
            rule,
        }
    }
}

impl PolicySnapshot {
    /// Decide whether `tool` may run in `ctx`.
    ///
    /// Pure function of the snapshot and the context: identical inputs
    /// always produce the identical decision.
    pub fn decide(&self, tool: &ToolId, ctx: &RequestContext<'_>) -> Decision {
        let decision = self.decide_inner(tool, ctx);
        tracing::debug!(
            tool = %tool,
            agent = ctx.agent_id,
            allowed = decision.allowed,
            rule = ?decision.rule,
            "tool authorization decision"
        );
        decision
    }

    fn decide_inner(&self, tool: &ToolId, ctx: &RequestContext<'_>) -> Decision {
        let agent = self.agent(ctx.agent_id);

        // Tiers 1-3: channel-group scope.
        if let Some(group) = ctx.channel_group.and_then(|id| self.channel_group(id)) {
            if let Some(decision) = check_scope(group, RuleScope::ChannelGroup, tool, ctx.sender) {
                return decision;
            }
        }

        // Tiers 4-5: agent-default scope (global defaults already merged in).
        if let Some(decision) = check_scope(&agent.rules, RuleScope::AgentDefault, tool, ctx.sender)
        {
            return decision;
        }

        // Tier 6: provider profile override substitutes the baseline.
        if let Some(provider) = ctx.provider {
            if let Some((profile, tools)) = agent.by_provider.get(provider) {
                let rule = RuleMatch::ProviderProfile {
                    provider: provider.to_string(),
                    profile: profile.clone(),
                };
                return if tools.contains(tool) {
                    Decision::allowed(rule)
                } else {
                    Decision::denied(rule)
                };
            }
        }

        // Tier 7: baseline profile membership.
        let rule = RuleMatch::ProfileBaseline {
            profile: agent.profile.clone(),
        };
        if agent.profile_tools.contains(tool) {
            Decision::allowed(rule)
        } else {
            Decision::denied(rule)
        }
    }
}

/// Evaluate one scope's sender rules and allow/deny lists.
///
/// Returns `None` when the scope has no opinion, letting evaluation fall
/// through to the next tier.
fn check_scope(
    rules: &ScopeRules,
    scope: RuleScope,
    tool: &ToolId,
    sender: Option<&SenderKey>,
) -> Option<Decision> {
    if let Some(sender) = sender {
        let (exact, wildcard) = rules.sender_rules(sender);
        if exact.is_some_and(|r| r.deny.contains(tool)) {
            return Some(Decision::denied(RuleMatch::SenderDeny {
                scope,
                key: sender.clone(),
            }));
        }
        if wildcard.is_some_and(|r| r.deny.contains(tool)) {
            return Some(Decision::denied(RuleMatch::SenderDeny {
                scope,
                key: SenderKey::Any,
            }));
        }
        if exact.is_some_and(|r| r.also_allow.contains(tool)) {
            return Some(Decision::allowed(RuleMatch::SenderAllow {
                scope,
                key: sender.clone(),
            }));
        }
        if wildcard.is_some_and(|r| r.also_allow.contains(tool)) {
            return Some(Decision::allowed(RuleMatch::SenderAllow {
                scope,
                key: SenderKey::Any,
            }));
        }
    }
    if rules.deny.contains(tool) {
        return Some(Decision::denied(RuleMatch::ScopeDeny(scope)));
    }
    if rules.allow.contains(tool) {
        return Some(Decision::allowed(RuleMatch::ScopeAllow(scope)));
    }
    None
}
