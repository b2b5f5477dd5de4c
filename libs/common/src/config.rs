//! Configuration module for the VCMS dashboard
//!
//! Every value has a default and can be overridden through a `VCMS_*`
//! environment variable. The environment is only read by [`VcmsConfig::from_env`];
//! everything downstream receives explicit values.

use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Base path used when `VCMS_BASE_URL` is unset, so broken links stay recognizable
pub const DEFAULT_BASE_URL: &str = "nobaseURL";

/// How the detail view decides whether a video is still loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPolicy {
    /// Loading while no error was reported and no duration is known
    #[default]
    DurationProxy,
    /// Loading while the first fetch is in flight and no error was reported
    FetchState,
}

/// Runtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VcmsConfig {
    /// Absolute prefix for every relative asset and download path
    pub base_url: String,
    /// Access token sent as `Authorization: JWT <token>`
    pub token: Option<String>,
    /// Re-fetch interval for a single video's detail, in milliseconds
    pub detail_poll_interval_ms: u64,
    /// Re-fetch interval for user and media lists, in milliseconds
    pub list_poll_interval_ms: u64,
    /// Timeout applied to every backend request, in milliseconds
    pub request_timeout_ms: u64,
    /// Loading classification policy
    pub loading_policy: LoadingPolicy,
    /// Address the dashboard service listens on
    pub bind_addr: String,
    /// Seconds a subscription may go unread before its poller is stopped
    pub subscription_idle_secs: u64,
}

impl Default for VcmsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            detail_poll_interval_ms: 500,
            list_poll_interval_ms: 10_000,
            request_timeout_ms: 10_000,
            loading_policy: LoadingPolicy::DurationProxy,
            bind_addr: "0.0.0.0:3002".to_string(),
            subscription_idle_secs: 60,
        }
    }
}

impl VcmsConfig {
    /// Create a new VcmsConfig from environment variables
    ///
    /// # Environment Variables
    /// - `VCMS_BASE_URL`: asset/API prefix (default: "nobaseURL")
    /// - `VCMS_TOKEN`: access token (default: none)
    /// - `VCMS_DETAIL_POLL_INTERVAL_MS`: detail poll interval (default: 500)
    /// - `VCMS_LIST_POLL_INTERVAL_MS`: list poll interval (default: 10000)
    /// - `VCMS_REQUEST_TIMEOUT_MS`: request timeout (default: 10000)
    /// - `VCMS_LOADING_POLICY`: `duration_proxy` or `fetch_state` (default: duration_proxy)
    /// - `VCMS_BIND_ADDR`: listen address (default: "0.0.0.0:3002")
    /// - `VCMS_SUBSCRIPTION_IDLE_SECS`: idle subscription lifetime (default: 60)
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        let config: VcmsConfig = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default(
                "detail_poll_interval_ms",
                defaults.detail_poll_interval_ms as i64,
            )?
            .set_default(
                "list_poll_interval_ms",
                defaults.list_poll_interval_ms as i64,
            )?
            .set_default("request_timeout_ms", defaults.request_timeout_ms as i64)?
            .set_default("loading_policy", "duration_proxy")?
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default(
                "subscription_idle_secs",
                defaults.subscription_idle_secs as i64,
            )?
            .add_source(Environment::with_prefix("VCMS"))
            .build()?
            .try_deserialize()?;

        config.validated()
    }

    /// Normalize and check values that the deserializer cannot
    pub fn validated(mut self) -> ConfigResult<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };

        self.token = self.token.filter(|token| !token.trim().is_empty());

        for (key, value) in [
            ("detail_poll_interval_ms", self.detail_poll_interval_ms),
            ("list_poll_interval_ms", self.list_poll_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(self)
    }

    pub fn detail_poll_interval(&self) -> Duration {
        Duration::from_millis(self.detail_poll_interval_ms)
    }

    pub fn list_poll_interval(&self) -> Duration {
        Duration::from_millis(self.list_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn subscription_idle(&self) -> Duration {
        Duration::from_secs(self.subscription_idle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 4] = [
        "VCMS_BASE_URL",
        "VCMS_TOKEN",
        "VCMS_DETAIL_POLL_INTERVAL_MS",
        "VCMS_LOADING_POLICY",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: serialized through #[serial], no other thread reads the environment
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        let config = VcmsConfig::from_env().expect("Failed to create config");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.detail_poll_interval(), Duration::from_millis(500));
        assert_eq!(config.list_poll_interval(), Duration::from_secs(10));
        assert_eq!(config.loading_policy, LoadingPolicy::DurationProxy);
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("VCMS_BASE_URL", "https://vcms.example.com/");
            env::set_var("VCMS_TOKEN", "abc123");
            env::set_var("VCMS_DETAIL_POLL_INTERVAL_MS", "250");
            env::set_var("VCMS_LOADING_POLICY", "fetch_state");
        }

        let config = VcmsConfig::from_env().expect("Failed to create config");
        clear_env();

        assert_eq!(config.base_url, "https://vcms.example.com");
        assert_eq!(config.token.as_deref(), Some("abc123"));
        assert_eq!(config.detail_poll_interval_ms, 250);
        assert_eq!(config.loading_policy, LoadingPolicy::FetchState);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = VcmsConfig {
            list_poll_interval_ms: 0,
            ..VcmsConfig::default()
        };

        match config.validated() {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "list_poll_interval_ms"),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_base_url_falls_back_to_sentinel() {
        let config = VcmsConfig {
            base_url: "  ".to_string(),
            token: Some(String::new()),
            ..VcmsConfig::default()
        }
        .validated()
        .expect("valid config");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token, None);
    }
}
