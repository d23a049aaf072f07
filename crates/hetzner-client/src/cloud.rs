//! Cloud API client

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use hetzner_api::{
    Action, ActionStatus,
    cloud::{Image, Location, Server, ServerType, SshKey},
    requests::{CreateServerRequest, CreateSshKeyRequest},
    responses::{ActionResponse, CreateServerResponse, ServerResponse, SshKeyResponse},
};

use crate::action::{ActionPoller, ActionSource, PollConfig};
use crate::auth::Credentials;
use crate::error::Result;
use crate::http::{ApiClient, QueryParams};

/// Public Cloud API endpoint
pub const CLOUD_API_URL: &str = "https://api.hetzner.cloud/v1";

/// Client for the Cloud API (Bearer token auth)
#[derive(Debug, Clone)]
pub struct CloudClient {
    api: ApiClient,
}

impl CloudClient {
    /// Create a client for the public endpoint
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    ///
    /// # Example
    /// ```no_run
    /// use hetzner_client::CloudClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = CloudClient::new("my-token")?;
    /// for server in client.list_servers(&Default::default()).await? {
    ///     println!("{} {}", server.id, server.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(CLOUD_API_URL, token)
    }

    /// Create a client for a custom endpoint
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_endpoint(endpoint: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        let api = ApiClient::new(endpoint, Credentials::Bearer(token.into()))?;
        Ok(Self { api })
    }

    /// Wrap a preconfigured [`ApiClient`]
    #[must_use]
    pub fn from_api(api: ApiClient) -> Self {
        Self { api }
    }

    /// Underlying HTTP client
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // Servers

    /// List all servers matching `filter`
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_servers(&self, filter: &ServerFilter) -> Result<Vec<Server>> {
        self.api
            .list_all("/servers", "servers", &filter.to_query())
            .await
    }

    /// Get a single server
    ///
    /// # Errors
    /// Returns an error if the request fails or the server does not exist.
    pub async fn get_server(&self, id: u64) -> Result<Server> {
        let response: ServerResponse = self.api.get(&format!("/servers/{id}")).await?;
        Ok(response.server)
    }

    /// Create a server; the returned action tracks provisioning
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_server(
        &self,
        request: &CreateServerRequest,
    ) -> Result<CreateServerResponse> {
        self.api.post("/servers", request).await
    }

    /// Delete a server
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn delete_server(&self, id: u64) -> Result<Action> {
        let response: ActionResponse = self.api.delete(&format!("/servers/{id}")).await?;
        Ok(response.action)
    }

    /// Trigger a power action on a server
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn server_action(&self, id: u64, action: PowerAction) -> Result<Action> {
        let path = format!("/servers/{id}/actions/{}", action.as_path());
        let response: ActionResponse = self.api.post(&path, &json!({})).await?;
        Ok(response.action)
    }

    // Actions

    /// List all actions, optionally restricted to one status
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_actions(&self, status: Option<ActionStatus>) -> Result<Vec<Action>> {
        let query = QueryParams::new().with_opt("status", status);
        self.api.list_all("/actions", "actions", &query).await
    }

    /// Get a single action
    ///
    /// # Errors
    /// Returns an error if the request fails or the action does not exist.
    pub async fn get_action(&self, id: u64) -> Result<Action> {
        let response: ActionResponse = self.api.get(&format!("/actions/{id}")).await?;
        Ok(response.action)
    }

    /// Poll an action until it finishes
    ///
    /// # Errors
    /// See [`ActionPoller::wait`].
    pub async fn wait_for_action(
        &self,
        id: u64,
        config: PollConfig,
        cancel: Option<CancellationToken>,
    ) -> Result<Action> {
        let mut poller = ActionPoller::new(config);
        if let Some(token) = cancel {
            poller = poller.with_cancellation(token);
        }
        poller.wait(self, id).await
    }

    // SSH keys

    /// List all SSH keys
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        self.api
            .list_all("/ssh_keys", "ssh_keys", &QueryParams::new())
            .await
    }

    /// Get a single SSH key
    ///
    /// # Errors
    /// Returns an error if the request fails or the key does not exist.
    pub async fn get_ssh_key(&self, id: u64) -> Result<SshKey> {
        let response: SshKeyResponse = self.api.get(&format!("/ssh_keys/{id}")).await?;
        Ok(response.ssh_key)
    }

    /// Upload an SSH key
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    pub async fn create_ssh_key(&self, request: &CreateSshKeyRequest) -> Result<SshKey> {
        let response: SshKeyResponse = self.api.post("/ssh_keys", request).await?;
        Ok(response.ssh_key)
    }

    /// Delete an SSH key
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    pub async fn delete_ssh_key(&self, id: u64) -> Result<()> {
        let _: Value = self.api.delete(&format!("/ssh_keys/{id}")).await?;
        Ok(())
    }

    // Catalog

    /// List images, optionally of one type (`system`, `snapshot`, `backup`, `app`)
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_images(&self, image_type: Option<&str>) -> Result<Vec<Image>> {
        let query = QueryParams::new().with_opt("type", image_type);
        self.api.list_all("/images", "images", &query).await
    }

    /// List locations
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        self.api
            .list_all("/locations", "locations", &QueryParams::new())
            .await
    }

    /// List server types
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_server_types(&self) -> Result<Vec<ServerType>> {
        self.api
            .list_all("/server_types", "server_types", &QueryParams::new())
            .await
    }
}

#[async_trait]
impl ActionSource for CloudClient {
    async fn fetch_action(&self, id: u64) -> Result<Action> {
        self.get_action(id).await
    }
}

/// Filters for [`CloudClient::list_servers`]
#[derive(Debug, Clone, Default)]
pub struct ServerFilter {
    pub name: Option<String>,
    pub label_selector: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl ServerFilter {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("name", self.name.as_deref())
            .with_opt("label_selector", self.label_selector.as_deref())
            .with_opt("status", self.status.as_deref())
            .with_opt("sort", self.sort.as_deref())
    }
}

/// Power actions available on a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    PowerOn,
    PowerOff,
    Reboot,
    Reset,
    Shutdown,
}

impl PowerAction {
    fn as_path(self) -> &'static str {
        match self {
            PowerAction::PowerOn => "poweron",
            PowerAction::PowerOff => "poweroff",
            PowerAction::Reboot => "reboot",
            PowerAction::Reset => "reset",
            PowerAction::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for PowerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}
