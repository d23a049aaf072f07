//! Response envelopes shared by the APIs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::cloud::{Server, SshKey};

/// Pagination cursor found under `meta.pagination` in Cloud list responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub previous_page: Option<u64>,
    /// `None` (or `0`) on the last page
    #[serde(default)]
    pub next_page: Option<u64>,
    #[serde(default)]
    pub last_page: Option<u64>,
    #[serde(default)]
    pub total_entries: Option<u64>,
}

impl Pagination {
    /// Page to request next, if the server advertises one
    #[must_use]
    pub fn next(&self) -> Option<u64> {
        self.next_page.filter(|page| *page > 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Body of a failed request: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

/// Accept any JSON scalar; numbers such as `"code": 404` become `"404"`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// `{"action": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: Action,
}

/// `{"server": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResponse {
    pub server: Server,
}

/// Result of `POST /servers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServerResponse {
    pub server: Server,
    pub action: Action,
    #[serde(default)]
    pub next_actions: Vec<Action>,
    /// Only set when no SSH key was supplied
    #[serde(default)]
    pub root_password: Option<String>,
}

/// `{"ssh_key": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKeyResponse {
    pub ssh_key: SshKey,
}
