//! Server auction live data

use serde::{Deserialize, Serialize};

/// Document served by the public auction endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionList {
    #[serde(default)]
    pub server: Vec<AuctionServer>,
}

/// A dedicated server offered in the auction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionServer {
    pub id: u64,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub cpu_count: u32,
    /// RAM in GB
    #[serde(default)]
    pub ram_size: u32,
    /// Total disk size in GB
    #[serde(default)]
    pub hdd_size: u64,
    #[serde(default)]
    pub hdd_count: u32,
    #[serde(default)]
    pub description: Vec<String>,
    /// Monthly price in EUR
    pub price: f64,
    #[serde(default)]
    pub setup_price: f64,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub specials: Vec<String>,
    #[serde(default)]
    pub is_ecc: bool,
    #[serde(default)]
    pub fixed_price: bool,
    /// Seconds until the next price reduction
    #[serde(default)]
    pub next_reduce: i64,
}
