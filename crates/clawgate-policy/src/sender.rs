//! Typed sender identity keys for per-sender tool rules.

use crate::error::PolicyError;
use std::fmt;

/// Typed key identifying a message's originating user across channels.
///
/// The kind set is closed so that, for example, a username that happens to
/// look like a numeric user id can never match an `id:` rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SenderKey {
    /// Platform-native user id (`id:`).
    Id(String),
    /// Phone number in E.164 form (`e164:`).
    E164(String),
    /// Platform username or handle (`username:`).
    Username(String),
    /// Display name (`name:`).
    Name(String),
    /// Wildcard matching every sender (`*`).
    Any,
}

impl SenderKey {
    /// Parse a sender key as written in a policy document.
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        if raw == "*" {
            return Ok(SenderKey::Any);
        }
        let invalid = || PolicyError::InvalidSenderKey(raw.to_string());
        let (kind, value) = raw.split_once(':').ok_or_else(invalid)?;
        if value.is_empty() {
            return Err(invalid());
        }
        match kind {
            "id" => Ok(SenderKey::Id(value.to_string())),
            "e164" => Ok(SenderKey::E164(value.to_string())),
            "username" => Ok(SenderKey::Username(value.to_string())),
            "name" => Ok(SenderKey::Name(value.to_string())),
            _ => Err(invalid()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, SenderKey::Any)
    }
}

impl fmt::Display for SenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderKey::Id(v) => write!(f, "id:{v}"),
            SenderKey::E164(v) => write!(f, "e164:{v}"),
            SenderKey::Username(v) => write!(f, "username:{v}"),
            SenderKey::Name(v) => write!(f, "name:{v}"),
            SenderKey::Any => f.write_str("*"),
        }
    }
}
