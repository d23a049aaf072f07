//! hetzner-api: Shared wire types for the Hetzner APIs
//!
//! Contains the request bodies, response envelopes and resource types used by
//! the client library and the CLI for the Cloud, Robot and Auction APIs.

pub mod action;
pub mod auction;
pub mod cloud;
pub mod requests;
pub mod responses;
pub mod robot;

pub use action::{Action, ActionError, ActionResource, ActionStatus};
pub use responses::{ErrorDetail, ErrorEnvelope, Meta, Pagination};
