//! Network configuration for the broker's HTTP listener.

use std::time::Duration;

/// Listener-level configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Allowed CORS origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete.
    ///
    /// This bounds the whole inbound request, including whatever the
    /// non-deadlined downstream transports take; only the gRPC
    /// strategy carries its own tighter deadline.
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
