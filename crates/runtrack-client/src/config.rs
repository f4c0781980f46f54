//! Client configuration.

use std::time::Duration;

/// Describes the remote endpoint one client instance talks to.
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    /// Base URL of the streaming endpoint.
    pub instance_url: String,

    /// Identity the credential refresh is performed for.
    pub username: String,
}

impl ConnectionDescriptor {
    /// Create a new descriptor.
    pub fn new(instance_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            username: username.into(),
        }
    }
}

/// Client configuration.
///
/// The protocol version is per-instance configuration so clients speaking
/// different protocol versions can coexist in one process.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Push channel carrying test-result notifications.
    pub channel: String,

    /// Remote API protocol version, used to build the streaming URL.
    pub api_version: String,

    /// Bound on establishing the transport connection.
    pub connect_timeout: Duration,

    /// Ceiling on how long one subscription may stay open unresolved.
    /// A safety net against orphaned connections, not a normal code path.
    pub subscribe_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channel: "/systemTopic/TestResult".to_string(),
            api_version: "36.0".to_string(),
            connect_timeout: Duration::from_secs(10),
            subscribe_timeout: Duration::from_secs(4 * 60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.channel, "/systemTopic/TestResult");
        assert_eq!(config.api_version, "36.0");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.subscribe_timeout, Duration::from_secs(14_400));
    }
}
