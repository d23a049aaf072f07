//! Credentials attached to every request

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Credential held by a client for its whole lifetime
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Cloud API token, sent as `Authorization: Bearer <token>`
    Bearer(String),
    /// Robot web service user, sent as HTTP Basic auth
    Basic {
        /// Web service user name
        user: String,
        /// Web service password
        password: String,
    },
    /// Public endpoints
    None,
}

impl Credentials {
    /// Create basic credentials
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header, if any
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        match self {
            Credentials::Bearer(token) => Some(format!("Bearer {token}")),
            Credentials::Basic { user, password } => {
                let encoded = STANDARD.encode(format!("{user}:{password}"));
                Some(format!("Basic {encoded}"))
            }
            Credentials::None => None,
        }
    }
}

// Secrets never end up in logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer(_) => f.write_str("Bearer(***)"),
            Credentials::Basic { user, .. } => write!(f, "Basic({user}:***)"),
            Credentials::None => f.write_str("None"),
        }
    }
}
