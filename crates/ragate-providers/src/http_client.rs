//! Shared HTTP client configuration for outbound provider calls.
//!
//! Grounded in the teacher's `HttpClientConfig`/`HttpClientProvider`
//! pattern: one pooled, keep-alive `reqwest::Client` per distinct
//! `(backend, base_url)`, reused across requests (spec §5 "Shared
//! resources").

use std::time::Duration;

/// Tunables for a pooled outbound HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,
    /// How long an idle pooled connection is kept before closing.
    pub idle_timeout: Duration,
    /// TCP keepalive interval.
    pub keepalive: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 32,
            idle_timeout: Duration::from_secs(90),
            keepalive: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
            user_agent: concat!("ragate/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl HttpClientConfig {
    /// Builds a config with the given per-request timeout, keeping
    /// every other tunable at its default.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Builds a pooled [`reqwest::Client`] from this configuration.
    pub fn build(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .pool_max_idle_per_host(self.max_idle_per_host)
            .pool_idle_timeout(self.idle_timeout)
            .tcp_keepalive(self.keepalive)
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_client() {
        let config = HttpClientConfig::default();
        assert!(config.build().is_ok());
    }

    #[test]
    fn with_timeout_overrides_only_timeout() {
        let config = HttpClientConfig::with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_idle_per_host, HttpClientConfig::default().max_idle_per_host);
    }
}
