//! Harness configuration
//!
//! All settings come from environment variables and are validated once,
//! before the first request. Required values that are missing or empty fail
//! fast with `HarnessError::Configuration`.

use ilab_core::domain::parameter::ParameterBag;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::parameters::default_parameters;
use crate::resolver::DuplicateNamePolicy;

/// Gate: the harness only runs when this equals `true`
pub const ENABLE_VAR: &str = "ENABLE_ILAB_PIPELINE_TEST";
pub const SERVER_URL_VAR: &str = "PIPELINE_SERVER_URL";
pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";
pub const DISPLAY_NAME_VAR: &str = "PIPELINE_DISPLAY_NAME";
pub const POLL_INTERVAL_VAR: &str = "PIPELINE_POLL_INTERVAL_SECS";
pub const MAX_POLL_INTERVAL_VAR: &str = "PIPELINE_MAX_POLL_INTERVAL_SECS";
pub const RUN_TIMEOUT_VAR: &str = "PIPELINE_RUN_TIMEOUT_SECS";
pub const MAX_READ_RETRIES_VAR: &str = "PIPELINE_MAX_READ_RETRIES";
pub const REQUEST_TIMEOUT_VAR: &str = "PIPELINE_REQUEST_TIMEOUT_SECS";
pub const INSECURE_TLS_VAR: &str = "PIPELINE_INSECURE_TLS";
pub const DUPLICATE_POLICY_VAR: &str = "PIPELINE_DUPLICATE_NAME_POLICY";
pub const PARAMETERS_VAR: &str = "PIPELINE_PARAMETERS";

/// Longest run timeout accepted (30 days)
pub const MAX_RUN_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Harness configuration
///
/// Intervals are `Duration`s so tests can use sub-second values; the
/// environment only speaks whole seconds.
#[derive(Clone)]
pub struct Config {
    /// Pipeline server base URL (e.g., "https://ds-pipeline-dspa.apps.example.com")
    pub server_url: String,

    /// Bearer token for every request
    pub bearer_token: String,

    /// Display name of the pipeline to run
    pub pipeline_display_name: String,

    /// First wait between status reads
    pub poll_interval: Duration,

    /// Cap for the growing wait between status reads
    pub max_poll_interval: Duration,

    /// Overall deadline for the run to reach a terminal state
    pub run_timeout: Duration,

    /// Consecutive uninformative status reads tolerated before giving up
    pub max_read_retries: u32,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Accept self-signed certificates (cluster-internal routes)
    pub insecure_tls: bool,

    /// What to do when several pipelines share the display name
    pub duplicate_policy: DuplicateNamePolicy,

    /// Parameters submitted with the run
    pub parameters: ParameterBag,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("bearer_token", &"<redacted>")
            .field("pipeline_display_name", &self.pipeline_display_name)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_interval", &self.max_poll_interval)
            .field("run_timeout", &self.run_timeout)
            .field("max_read_retries", &self.max_read_retries)
            .field("request_timeout", &self.request_timeout)
            .field("insecure_tls", &self.insecure_tls)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(
        server_url: impl Into<String>,
        bearer_token: impl Into<String>,
        pipeline_display_name: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            bearer_token: bearer_token.into(),
            pipeline_display_name: pipeline_display_name.into(),
            poll_interval: Duration::from_secs(30),
            max_poll_interval: Duration::from_secs(300),
            run_timeout: Duration::from_secs(4 * 60 * 60),
            max_read_retries: 3,
            request_timeout: Duration::from_secs(60),
            insecure_tls: false,
            duplicate_policy: DuplicateNamePolicy::default(),
            parameters: default_parameters(),
        }
    }

    /// Whether the harness is switched on in the process environment
    pub fn enabled_in_env() -> bool {
        Self::enabled(|key| std::env::var(key).ok())
    }

    /// Whether the harness is switched on according to `lookup`
    pub fn enabled(lookup: impl Fn(&str) -> Option<String>) -> bool {
        lookup(ENABLE_VAR).is_some_and(|v| v.trim() == "true")
    }

    /// Creates configuration from the process environment
    ///
    /// Required:
    /// - PIPELINE_SERVER_URL
    /// - BEARER_TOKEN
    /// - PIPELINE_DISPLAY_NAME
    ///
    /// Optional:
    /// - PIPELINE_POLL_INTERVAL_SECS (default: 30)
    /// - PIPELINE_MAX_POLL_INTERVAL_SECS (default: 300)
    /// - PIPELINE_RUN_TIMEOUT_SECS (default: 14400)
    /// - PIPELINE_MAX_READ_RETRIES (default: 3)
    /// - PIPELINE_REQUEST_TIMEOUT_SECS (default: 60)
    /// - PIPELINE_INSECURE_TLS (default: false)
    /// - PIPELINE_DUPLICATE_NAME_POLICY (most-recent | reject, default: most-recent)
    /// - PIPELINE_PARAMETERS (JSON object merged over the default parameters)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    HarnessError::Configuration(format!(
                        "{} environment variable must be set",
                        key
                    ))
                })
        };

        let server_url = required(SERVER_URL_VAR)?;
        let bearer_token = required(BEARER_TOKEN_VAR)?;
        let pipeline_display_name = required(DISPLAY_NAME_VAR)?;

        let mut config = Self::new(server_url, bearer_token, pipeline_display_name);

        if let Some(secs) = parse_optional::<u64>(&lookup, POLL_INTERVAL_VAR)? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_optional::<u64>(&lookup, MAX_POLL_INTERVAL_VAR)? {
            config.max_poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_optional::<u64>(&lookup, RUN_TIMEOUT_VAR)? {
            config.run_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_optional::<u32>(&lookup, MAX_READ_RETRIES_VAR)? {
            config.max_read_retries = retries;
        }
        if let Some(secs) = parse_optional::<u64>(&lookup, REQUEST_TIMEOUT_VAR)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(insecure) = parse_optional::<bool>(&lookup, INSECURE_TLS_VAR)? {
            config.insecure_tls = insecure;
        }
        if let Some(policy) = parse_optional::<DuplicateNamePolicy>(&lookup, DUPLICATE_POLICY_VAR)?
        {
            config.duplicate_policy = policy;
        }
        if let Some(json) = lookup(PARAMETERS_VAR).filter(|v| !v.trim().is_empty()) {
            let overrides = ParameterBag::from_json_object(&json).map_err(|e| {
                HarnessError::Configuration(format!("{}: {}", PARAMETERS_VAR, e))
            })?;
            config.parameters.merge(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(HarnessError::Configuration(msg.to_string()));

        if self.server_url.is_empty() {
            return fail("server_url cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return fail("server_url must start with http:// or https://");
        }

        if self.bearer_token.is_empty() {
            return fail("bearer_token cannot be empty");
        }

        if self.pipeline_display_name.is_empty() {
            return fail("pipeline_display_name cannot be empty");
        }

        if self.poll_interval.is_zero() {
            return fail("poll_interval must be greater than 0");
        }

        if self.max_poll_interval < self.poll_interval {
            return fail("max_poll_interval must not be shorter than poll_interval");
        }

        if self.run_timeout.is_zero() {
            return fail("run_timeout must be greater than 0");
        }

        if self.run_timeout > MAX_RUN_TIMEOUT {
            return fail("run_timeout must not exceed 30 days");
        }

        if self.max_poll_interval > MAX_RUN_TIMEOUT {
            return fail("max_poll_interval must not exceed 30 days");
        }

        if self.request_timeout.is_zero() {
            return fail("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };

    raw.trim().parse::<T>().map(Some).map_err(|e| {
        HarnessError::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))
    })
}
