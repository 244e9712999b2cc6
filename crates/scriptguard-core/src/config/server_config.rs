//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Number of actix workers. 0 = one per physical core.
    pub workers: usize,
    /// Upper bound on JSON request bodies, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            workers: 0,
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `address:port` string suitable for `HttpServer::bind`.
    pub fn bind_target(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
