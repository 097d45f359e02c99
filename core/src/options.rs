//! Default transport options.
//!
//! Every request starts from `TransportOptions::default()` and the builder's
//! setters override individual fields. The struct is serde-friendly so an
//! application can keep its defaults in a config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = concat!("fluent-curl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    pub user_agent: String,
    pub follow_location: bool,
    pub auto_referer: bool,
    pub connect_timeout_ms: u64,
    /// Whole-transfer timeout.
    pub timeout_ms: u64,
    /// `None` leaves libcurl's own limit in place.
    pub max_redirects: Option<u32>,
    pub verify_peer: bool,
}

impl TransportOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_location: true,
            auto_referer: true,
            connect_timeout_ms: 30_000,
            timeout_ms: 60_000,
            max_redirects: None,
            verify_peer: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = TransportOptions::default();
        assert!(opts.follow_location);
        assert!(opts.auto_referer);
        assert!(opts.verify_peer);
        assert_eq!(opts.connect_timeout(), Duration::from_secs(30));
        assert_eq!(opts.timeout(), Duration::from_secs(60));
        assert!(opts.user_agent.starts_with("fluent-curl/"));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let opts: TransportOptions =
            serde_json::from_str(r#"{"timeout_ms": 1500, "follow_location": false}"#).unwrap();
        assert_eq!(opts.timeout(), Duration::from_millis(1500));
        assert!(!opts.follow_location);
        assert_eq!(opts.connect_timeout_ms, 30_000);
        assert_eq!(opts.user_agent, DEFAULT_USER_AGENT);
    }
}
