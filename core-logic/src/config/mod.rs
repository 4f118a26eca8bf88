use serde::{Deserialize, Serialize};

/// A single proxy endpoint, parsed from the proxy list file.
///
/// Credentials are optional; passwords may themselves contain `:` (only the
/// first three separators of a proxy line are structural).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Base URL for the proxy, without credentials.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}
