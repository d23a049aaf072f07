//! HTTP client shared by the Cloud, Robot and Auction clients
//!
//! [`ApiClient::request`] is the single place where requests are sent and
//! responses are normalized: credentials and JSON headers are attached, 204
//! becomes `{}` and every non-2xx status becomes a [`ClientError::Api`] or
//! [`ClientError::Http`].

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use hetzner_api::ErrorEnvelope;

use crate::auth::Credentials;
use crate::error::{ClientError, Result};
use crate::pagination::PaginationConfig;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("hetzner-cli/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one API base URL and one credential
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    pagination: PaginationConfig,
}

impl ApiClient {
    /// Create a new client with default settings
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use hetzner_client::{ApiClient, Credentials};
    ///
    /// let client = ApiClient::new("https://api.hetzner.cloud/v1", Credentials::Bearer("token".into()))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        ApiClientBuilder::new(base_url).credentials(credentials).build()
    }

    /// Create a builder for advanced configuration
    pub fn builder(base_url: impl AsRef<str>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Page size used by [`ApiClient::list_all`]
    #[must_use]
    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    /// Build a full URL from an endpoint path
    ///
    /// Endpoints are always relative to the base URL, including its path
    /// (`/servers` against `https://api.hetzner.cloud/v1` is `/v1/servers`).
    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(ClientError::Url)
    }

    /// Send a request and deserialize the normalized response
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] or [`ClientError::Http`] for non-2xx
    /// statuses, [`ClientError::Transport`] if the request could not be sent
    /// and [`ClientError::Json`] if the body does not match `T`.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.send(endpoint, options).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let mut url = self.url(endpoint)?;
        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in options.query.iter() {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self
            .client
            .request(options.method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(authorization) = self.credentials.authorization() {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(normalize_error(status, &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::get()).await
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        self.request(endpoint, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    /// Perform a DELETE request
    pub(crate) async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }
}

/// Map a non-2xx response body to a single error value
pub(crate) fn normalize_error(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: Some(detail),
        }) => ClientError::Api {
            status: status.as_u16(),
            code: detail.code.unwrap_or_else(|| "ERROR".to_string()),
            message: detail
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        },
        _ => ClientError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        },
    }
}

/// Builder for [`ApiClient`]
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
    pagination: PaginationConfig,
    client: Option<Client>,
}

impl ApiClientBuilder {
    fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().to_string(),
            credentials: Credentials::None,
            timeout: DEFAULT_TIMEOUT,
            pagination: PaginationConfig::default(),
            client: None,
        }
    }

    /// Set the credential attached to every request
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the request timeout (default: 30s)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set items per page for paginated listings (default: 50)
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.pagination = PaginationConfig { per_page };
        self
    }

    /// Use a custom `reqwest::Client`; the timeout setting is then ignored
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid, the page size is zero or
    /// the HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient> {
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        if self.pagination.per_page == 0 {
            return Err(ClientError::Config("per_page must be at least 1".into()));
        }

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| ClientError::Config(e.to_string()))?,
        };

        Ok(ApiClient {
            client,
            base_url,
            credentials: self.credentials,
            pagination: self.pagination,
        })
    }
}

/// Options for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (default: GET)
    pub method: Method,
    /// JSON body
    pub body: Option<Value>,
    /// Query parameters
    pub query: QueryParams,
    /// Extra headers
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for the given method
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Options for a plain GET
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns an error if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach query parameters
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Add an extra header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Ordered query parameters; unset values are never sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    /// Add a parameter if `value` is set
    #[must_use]
    pub fn with_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Set a parameter, replacing any previous values for `key`
    #[must_use]
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.retain(|(k, _)| k != key);
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of the first parameter named `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
