//! End-to-end checks against a realistic gateway policy document.

use clawgate_policy::{
    PolicyDocument, PolicySnapshot, RequestContext, RuleMatch, RuleScope, SenderKey, ToolId,
};
use std::path::PathBuf;

const POLICY: &str = r#"{
    "tools": {
        "profile": "coding",
        "deny": ["group:automation"]
    },
    "toolsBySender": {
        "*": {"deny": ["exec", "read", "write"]}
    },
    "memorySearch": {"extraPaths": ["/home/user/private"]},
    "agents": {
        "assistant": {
            "tools": {"allow": ["message"]},
            "byProvider": {"telegram": "messaging"},
            "memorySearch": {"extraPaths": []},
            "workspace": {"root": "/home/agent/ws", "workspaceOnly": true}
        },
        "greeter": {
            "tools": {"profile": "minimal"}
        }
    },
    "channelGroups": {
        "ops-room": {
            "tools": {"deny": ["group:ui"]},
            "toolsBySender": {
                "id:OPERATOR": {"alsoAllow": ["exec", "read"]},
                "*": {"deny": ["message"]}
            }
        }
    }
}"#;

fn snapshot() -> PolicySnapshot {
    PolicyDocument::compile_json(POLICY).unwrap()
}

fn tool(name: &str) -> ToolId {
    ToolId::from(name)
}

#[test]
fn operator_allow_in_group_outranks_global_wildcard_deny() {
    let snapshot = snapshot();
    let operator = SenderKey::Id("OPERATOR".to_string());
    let ctx = RequestContext {
        agent_id: "assistant",
        sender: Some(&operator),
        channel_group: Some("ops-room"),
        provider: None,
    };

    for name in ["exec", "read"] {
        let decision = snapshot.decide(&tool(name), &ctx);
        assert!(decision.allowed, "{name} should be allowed for the operator");
        assert_eq!(
            decision.rule,
            RuleMatch::SenderAllow {
                scope: RuleScope::ChannelGroup,
                key: operator.clone(),
            }
        );
    }
    // write is not in the operator's alsoAllow; the global wildcard holds.
    assert!(!snapshot.is_allowed(&tool("write"), &ctx));
}

#[test]
fn ordinary_group_members_stay_denied() {
    let snapshot = snapshot();
    let visitor = SenderKey::Username("visitor".to_string());
    let ctx = RequestContext {
        agent_id: "assistant",
        sender: Some(&visitor),
        channel_group: Some("ops-room"),
        provider: None,
    };
    assert!(!snapshot.is_allowed(&tool("exec"), &ctx));
    // Group wildcard deny on message overrides the agent's explicit allow.
    assert!(!snapshot.is_allowed(&tool("message"), &ctx));
    // Group scope denies the whole ui group for everyone in the room.
    assert!(!snapshot.is_allowed(&tool("browser"), &ctx));
}

#[test]
fn deny_wins_across_every_lower_tier() {
    let snapshot = snapshot();
    let sender = SenderKey::Id("ANYONE".to_string());
    let ctx = RequestContext {
        agent_id: "assistant",
        sender: Some(&sender),
        channel_group: None,
        provider: Some("telegram"),
    };
    // Global wildcard sender deny on exec beats the coding profile, the
    // provider override, and anything else below it.
    let decision = snapshot.decide(&tool("exec"), &ctx);
    assert!(!decision.allowed);
    assert!(matches!(decision.rule, RuleMatch::SenderDeny { .. }));
}

#[test]
fn provider_override_substitutes_profile() {
    let snapshot = snapshot();
    let ctx = RequestContext {
        agent_id: "assistant",
        sender: None,
        channel_group: None,
        provider: Some("telegram"),
    };
    // messaging profile has no bash; the coding baseline does.
    assert!(!snapshot.is_allowed(&tool("bash"), &ctx));
    let off_provider = RequestContext::for_agent("assistant");
    assert!(snapshot.is_allowed(&tool("bash"), &off_provider));
}

#[test]
fn automation_group_deny_is_inherited_by_agents() {
    let snapshot = snapshot();
    for agent in ["assistant", "greeter", "unconfigured"] {
        let ctx = RequestContext::for_agent(agent);
        assert!(
            !snapshot.is_allowed(&tool("cron"), &ctx),
            "{agent} should inherit the automation deny"
        );
    }
}

#[test]
fn unconfigured_agent_falls_back_to_global_defaults() {
    let snapshot = snapshot();
    let ctx = RequestContext::for_agent("unconfigured");
    // Global profile is coding, so runtime tools pass the baseline.
    assert!(snapshot.is_allowed(&tool("bash"), &ctx));
    assert!(!snapshot.is_allowed(&tool("message"), &ctx));
}

#[test]
fn per_agent_empty_memory_paths_mask_the_global_default() {
    let snapshot = snapshot();
    assert!(snapshot.memory_paths("assistant").is_empty());
    assert_eq!(
        snapshot.memory_paths("greeter"),
        &[PathBuf::from("/home/user/private")]
    );
}

#[test]
fn decisions_are_stable_across_repeated_evaluation() {
    let snapshot = snapshot();
    let operator = SenderKey::Id("OPERATOR".to_string());
    let ctx = RequestContext {
        agent_id: "assistant",
        sender: Some(&operator),
        channel_group: Some("ops-room"),
        provider: Some("telegram"),
    };
    let tools = ["exec", "read", "write", "message", "cron", "browser"];
    let first: Vec<_> = tools.iter().map(|t| snapshot.decide(&tool(t), &ctx)).collect();
    let second: Vec<_> = tools.iter().map(|t| snapshot.decide(&tool(t), &ctx)).collect();
    assert_eq!(first, second);
}
