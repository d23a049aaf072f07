//! Robot API resource types
//!
//! Robot wraps every element in an object keyed by the resource name, e.g.
//! `[{"server": {...}}]`. The `*Envelope` types unwrap those.

use serde::{Deserialize, Serialize};

/// A dedicated server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotServer {
    pub server_number: u64,
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub server_ipv6_net: Option<String>,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub dc: String,
    #[serde(default)]
    pub traffic: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub paid_until: String,
    #[serde(default)]
    pub ip: Vec<String>,
    #[serde(default)]
    pub subnet: Option<Vec<RobotSubnet>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotSubnet {
    pub ip: String,
    pub mask: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEnvelope {
    pub server: RobotServer,
}

/// Reset types available for a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOptions {
    pub server_number: u64,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(rename = "type", default)]
    pub reset_types: Vec<String>,
    #[serde(default)]
    pub operating_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOptionsEnvelope {
    pub reset: ResetOptions,
}

/// Reset that was triggered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResult {
    pub server_number: u64,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(rename = "type")]
    pub reset_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResultEnvelope {
    pub reset: ResetResult,
}

/// Reset kinds accepted by `POST /reset/{number}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetType {
    /// CTRL+ALT+DEL
    Sw,
    /// Hardware reset button
    Hw,
    /// Manual reset by a technician
    Man,
    /// Power button press
    Power,
    /// Long power button press
    PowerLong,
}

impl std::fmt::Display for ResetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetType::Sw => write!(f, "sw"),
            ResetType::Hw => write!(f, "hw"),
            ResetType::Man => write!(f, "man"),
            ResetType::Power => write!(f, "power"),
            ResetType::PowerLong => write!(f, "power_long"),
        }
    }
}

/// A single IPv4 address assigned to a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotIp {
    pub ip: String,
    #[serde(default)]
    pub server_ip: Option<String>,
    pub server_number: u64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub separate_mac: Option<String>,
    #[serde(default)]
    pub traffic_warnings: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpEnvelope {
    pub ip: RobotIp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotSshKey {
    pub name: String,
    pub fingerprint: String,
    #[serde(rename = "type", default)]
    pub key_type: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEnvelope {
    pub key: RobotSshKey,
}
