//! Server auction client

use std::cmp::Ordering;

use hetzner_api::auction::{AuctionList, AuctionServer};

use crate::auth::Credentials;
use crate::error::Result;
use crate::http::ApiClient;

/// Directory holding the public auction data
pub const AUCTION_URL: &str = "https://www.hetzner.com/_resources/app/jsondata";

const LIVE_DATA: &str = "live_data_en.json";

/// Client for the public server auction (no auth)
#[derive(Debug, Clone)]
pub struct AuctionClient {
    api: ApiClient,
}

impl AuctionClient {
    /// Create a client for the public endpoint
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(AUCTION_URL)
    }

    /// Create a client for a custom endpoint
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_endpoint(endpoint: impl AsRef<str>) -> Result<Self> {
        let api = ApiClient::new(endpoint, Credentials::None)?;
        Ok(Self { api })
    }

    /// Fetch current offers and apply `filter`
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_offers(&self, filter: &AuctionFilter) -> Result<Vec<AuctionServer>> {
        let list: AuctionList = self.api.get(LIVE_DATA).await?;
        Ok(filter.apply(list.server))
    }
}

/// Client-side filter over auction offers
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    /// Maximum monthly price (EUR)
    pub max_price: Option<f64>,
    /// Minimum RAM (GB)
    pub min_ram: Option<u32>,
    /// Datacenter prefix, e.g. `FSN` or `HEL1`
    pub datacenter: Option<String>,
    /// Case-insensitive CPU model substring
    pub cpu: Option<String>,
    pub fixed_price_only: bool,
    pub limit: Option<usize>,
}

impl AuctionFilter {
    /// Keep matching offers, cheapest first
    #[must_use]
    pub fn apply(&self, offers: Vec<AuctionServer>) -> Vec<AuctionServer> {
        let datacenter = self.datacenter.as_deref().map(str::to_uppercase);
        let cpu = self.cpu.as_deref().map(str::to_lowercase);

        let mut matching: Vec<_> = offers
            .into_iter()
            .filter(|o| self.max_price.is_none_or(|max| o.price <= max))
            .filter(|o| self.min_ram.is_none_or(|min| o.ram_size >= min))
            .filter(|o| {
                datacenter
                    .as_deref()
                    .is_none_or(|dc| o.datacenter.to_uppercase().starts_with(dc))
            })
            .filter(|o| {
                cpu.as_deref()
                    .is_none_or(|cpu| o.cpu.to_lowercase().contains(cpu))
            })
            .filter(|o| !self.fixed_price_only || o.fixed_price)
            .collect();

        matching.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
        if let Some(limit) = self.limit {
            matching.truncate(limit);
        }
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn offer(id: u64, price: f64, ram: u32, dc: &str, cpu: &str) -> AuctionServer {
        AuctionServer {
            id,
            cpu: cpu.into(),
            cpu_count: 1,
            ram_size: ram,
            hdd_size: 1024,
            hdd_count: 2,
            description: Vec::new(),
            price,
            setup_price: 0.0,
            datacenter: dc.into(),
            specials: Vec::new(),
            is_ecc: false,
            fixed_price: id % 2 == 0,
            next_reduce: 0,
        }
    }

    fn offers() -> Vec<AuctionServer> {
        vec![
            offer(1, 45.0, 64, "FSN1-DC7", "Intel Core i7-6700"),
            offer(2, 30.0, 32, "HEL1-DC2", "Intel Xeon E3-1275V6"),
            offer(3, 60.0, 128, "NBG1-DC3", "AMD Ryzen 7 3700X"),
            offer(4, 38.5, 64, "FSN1-DC14", "AMD Ryzen 5 3600"),
        ]
    }

    fn ids(offers: &[AuctionServer]) -> Vec<u64> {
        offers.iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_no_filter_sorts_by_price() {
        let result = AuctionFilter::default().apply(offers());
        assert_eq!(ids(&result), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_combined_filters() {
        let filter = AuctionFilter {
            max_price: Some(50.0),
            min_ram: Some(64),
            datacenter: Some("fsn".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(offers())), vec![4, 1]);
    }

    #[test]
    fn test_cpu_fixed_price_and_limit() {
        let filter = AuctionFilter {
            cpu: Some("ryzen".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(offers())), vec![4, 3]);

        let filter = AuctionFilter {
            fixed_price_only: true,
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(offers())), vec![2]);
    }

    #[tokio::test]
    async fn test_list_offers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/live_data_en.json");
                then.status(200).json_body(json!({"server": [
                    {"id": 1, "cpu": "Intel Core i7-6700", "ram_size": 64, "price": 39.0,
                     "datacenter": "FSN1-DC7"},
                    {"id": 2, "cpu": "AMD Ryzen 7 3700X", "ram_size": 64, "price": 35.0,
                     "datacenter": "HEL1-DC2"}
                ]}));
            })
            .await;

        let client = AuctionClient::with_endpoint(server.base_url()).unwrap();
        let result = client.list_offers(&AuctionFilter::default()).await.unwrap();
        assert_eq!(ids(&result), vec![2, 1]);
        mock.assert_async().await;
    }
}
