use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Custom payload fields merged alongside the reserved `aps` namespace.
///
/// Insertion order is preserved so serialized payloads are deterministic.
pub type ExtraFields = IndexMap<String, serde_json::Value>;

/// Whether the caller wants the notification stored after dispatch.
///
/// `Unset` defers to the configured default; this is an explicit
/// tri-state rather than `Option<bool>` so "unspecified" cannot be
/// confused with other optional fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    #[default]
    Unset,
    Persist,
    DoNotPersist,
}

impl Persistence {
    /// Resolve against the system default.
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Persistence::Unset => default,
            Persistence::Persist => true,
            Persistence::DoNotPersist => false,
        }
    }
}

/// Opaque registered device endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(pub String);

impl DeviceToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for DeviceToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
