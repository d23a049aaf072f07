//! Cursor pagination over Cloud list endpoints

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use hetzner_api::Pagination;

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, QueryParams, RequestOptions};

/// Items per page requested when no page size is configured
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Page size used when walking a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ApiClient {
    /// Collect every item of a paginated listing
    ///
    /// Requests pages sequentially starting at page 1, reading the items from
    /// `response[resource_key]` and the cursor from `response.meta.pagination`.
    /// Stops at the first empty page, or after the first page whose cursor is
    /// missing or has no `next_page`. Items keep server order.
    ///
    /// # Errors
    /// Fails with the first failing page's error; no partial result is
    /// returned. A `next_page` that does not move forward is reported as
    /// [`ClientError::InvalidResponse`].
    ///
    /// # Example
    /// ```no_run
    /// # use hetzner_client::{ApiClient, Credentials, QueryParams};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.hetzner.cloud/v1", Credentials::Bearer("token".into()))?;
    /// let servers: Vec<serde_json::Value> = client
    ///     .list_all("/servers", "servers", &QueryParams::new().with("label_selector", "env=prod"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, params))]
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        resource_key: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>> {
        let per_page = self.pagination().per_page;
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let query = params.clone().set("page", page).set("per_page", per_page);
            let mut response: Value = self
                .request(endpoint, RequestOptions::get().query(query))
                .await?;

            let batch = match response.get_mut(resource_key).map(Value::take) {
                Some(Value::Array(batch)) if !batch.is_empty() => batch,
                _ => {
                    debug!(page, "no items on page");
                    break;
                }
            };
            debug!(page, count = batch.len(), "collected page");
            for item in batch {
                items.push(serde_json::from_value(item)?);
            }

            let cursor = match response.pointer("/meta/pagination") {
                None | Some(Value::Null) => None,
                Some(raw) => Some(Pagination::deserialize(raw)?),
            };
            match cursor.and_then(|c| c.next()) {
                Some(next) if next <= page => {
                    return Err(ClientError::InvalidResponse(format!(
                        "next_page {next} does not advance past page {page}"
                    )));
                }
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(items)
    }
}
