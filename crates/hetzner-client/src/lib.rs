//! hetzner-client: HTTP clients for the Hetzner Cloud, Robot and Auction APIs
//!
//! Every request goes through [`ApiClient::request`], which attaches the
//! credential and normalizes failures into [`ClientError`]. Cloud listings are
//! collected across pages by [`ApiClient::list_all`], and Cloud actions can be
//! awaited with [`ActionPoller`].
//!
//! # Examples
//!
//! ## Cloud
//!
//! ```no_run
//! use hetzner_client::{CloudClient, PollConfig, PowerAction};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CloudClient::new("my-token")?;
//!
//! // List every server, following pagination
//! let servers = client.list_servers(&Default::default()).await?;
//!
//! // Reboot the first one and wait for the action to finish
//! if let Some(server) = servers.first() {
//!     let action = client.server_action(server.id, PowerAction::Reboot).await?;
//!     client.wait_for_action(action.id, PollConfig::default(), None).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Robot
//!
//! ```no_run
//! use hetzner_client::RobotClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RobotClient::new("#ws+user", "password")?;
//! for server in client.list_servers().await? {
//!     println!("{} {}", server.server_number, server.server_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod auction;
pub mod auth;
pub mod cloud;
pub mod error;
pub mod http;
pub mod pagination;
pub mod robot;

pub use action::{ActionPoller, ActionSource, PollConfig};
pub use auction::{AuctionClient, AuctionFilter};
pub use auth::Credentials;
pub use cloud::{CloudClient, PowerAction, ServerFilter};
pub use error::{ClientError, Result};
pub use http::{ApiClient, ApiClientBuilder, QueryParams, RequestOptions};
pub use pagination::PaginationConfig;
pub use robot::RobotClient;
