//! Robot web service client
//!
//! Robot listings are not paginated; each element arrives wrapped in an
//! object keyed by its resource name and is unwrapped here.

use tracing::instrument;

use hetzner_api::{
    requests::ResetRequest,
    robot::{
        IpEnvelope, KeyEnvelope, ResetOptions, ResetOptionsEnvelope, ResetResult,
        ResetResultEnvelope, ResetType, RobotIp, RobotServer, RobotSshKey, ServerEnvelope,
    },
};

use crate::auth::Credentials;
use crate::error::Result;
use crate::http::ApiClient;

/// Robot web service endpoint
pub const ROBOT_API_URL: &str = "https://robot-ws.your-server.de";

/// Client for the Robot API (HTTP Basic auth)
#[derive(Debug, Clone)]
pub struct RobotClient {
    api: ApiClient,
}

impl RobotClient {
    /// Create a client for the public endpoint
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(ROBOT_API_URL, user, password)
    }

    /// Create a client for a custom endpoint
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_endpoint(
        endpoint: impl AsRef<str>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let api = ApiClient::new(endpoint, Credentials::basic(user, password))?;
        Ok(Self { api })
    }

    /// Wrap a preconfigured [`ApiClient`]
    #[must_use]
    pub fn from_api(api: ApiClient) -> Self {
        Self { api }
    }

    /// List all dedicated servers
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_servers(&self) -> Result<Vec<RobotServer>> {
        let servers: Vec<ServerEnvelope> = self.api.get("/server").await?;
        Ok(servers.into_iter().map(|s| s.server).collect())
    }

    /// Get a single server by number
    ///
    /// # Errors
    /// Returns an error if the request fails or the server does not exist.
    pub async fn get_server(&self, number: u64) -> Result<RobotServer> {
        let envelope: ServerEnvelope = self.api.get(&format!("/server/{number}")).await?;
        Ok(envelope.server)
    }

    /// Reset types supported by a server
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn reset_options(&self, number: u64) -> Result<ResetOptions> {
        let envelope: ResetOptionsEnvelope = self.api.get(&format!("/reset/{number}")).await?;
        Ok(envelope.reset)
    }

    /// Trigger a reset
    ///
    /// # Errors
    /// Returns an error if the request fails or the reset type is unsupported.
    #[instrument(skip(self))]
    pub async fn reset_server(&self, number: u64, reset_type: ResetType) -> Result<ResetResult> {
        let request = ResetRequest { reset_type };
        let envelope: ResetResultEnvelope = self
            .api
            .post(&format!("/reset/{number}"), &request)
            .await?;
        Ok(envelope.reset)
    }

    /// List all single IP addresses
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_ips(&self) -> Result<Vec<RobotIp>> {
        let ips: Vec<IpEnvelope> = self.api.get("/ip").await?;
        Ok(ips.into_iter().map(|i| i.ip).collect())
    }

    /// List stored SSH keys
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_ssh_keys(&self) -> Result<Vec<RobotSshKey>> {
        let keys: Vec<KeyEnvelope> = self.api.get("/key").await?;
        Ok(keys.into_iter().map(|k| k.key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> RobotClient {
        RobotClient::with_endpoint(server.base_url(), "user", "pass").unwrap()
    }

    #[tokio::test]
    async fn test_list_servers_unwraps_envelopes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/server")
                    .header("authorization", "Basic dXNlcjpwYXNz");
                then.status(200).json_body(json!([
                    {"server": {"server_number": 1, "server_name": "a", "server_ip": "1.1.1.1",
                                "product": "EX44", "dc": "FSN1-DC1", "status": "ready"}},
                    {"server": {"server_number": 2, "server_name": "b", "server_ip": "2.2.2.2",
                                "product": "AX41", "dc": "HEL1-DC2", "status": "in process"}}
                ]));
            })
            .await;

        let servers = client(&server).list_servers().await.unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].server_number, 2);
        assert_eq!(servers[1].dc, "HEL1-DC2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reset_server() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/reset/321")
                    .json_body(json!({"type": "hw"}));
                then.status(200).json_body(json!({
                    "reset": {"server_ip": "1.2.3.4", "server_number": 321, "type": "hw"}
                }));
            })
            .await;

        let result = client(&server)
            .reset_server(321, ResetType::Hw)
            .await
            .unwrap();
        assert_eq!(result.reset_type, "hw");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_robot_error_is_normalized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/server/9");
                then.status(404).json_body(json!({
                    "error": {"status": 404, "code": "SERVER_NOT_FOUND", "message": "Server not found"}
                }));
            })
            .await;

        let err = client(&server).get_server(9).await.unwrap_err();
        assert_eq!(err.to_string(), "SERVER_NOT_FOUND: Server not found");
    }

    #[tokio::test]
    async fn test_unauthorized_without_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ip");
                then.status(401);
            })
            .await;

        let err = client(&server).list_ips().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }
}
