// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TAG_KEY: &str = "CreatedBy";
pub const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Settings read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key of the ownership tag
    pub tag_key: String,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Region of the provider endpoints
    pub region: Option<String>,
    /// Overrides every provider endpoint, used by integration tests and local stacks
    pub endpoint_url: Option<String>,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Timeout for each provider request
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            region: None,
            endpoint_url: None,
            https_proxy: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let tag_key = non_blank_var("TAG_KEY").unwrap_or_else(|| DEFAULT_TAG_KEY.to_string());
        let log_level = non_blank_var("AUTOTAG_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let region = non_blank_var("AWS_REGION").or_else(|| non_blank_var("AWS_DEFAULT_REGION"));
        let endpoint_url = non_blank_var("AWS_ENDPOINT_URL")
            .map(|url| url.trim_end_matches('/').to_string());
        let https_proxy = non_blank_var("HTTPS_PROXY").or_else(|| non_blank_var("https_proxy"));

        let http_timeout = match non_blank_var("AUTOTAG_HTTP_TIMEOUT_SECS") {
            Some(val) => match val.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "AUTOTAG_HTTP_TIMEOUT_SECS",
                        value: val,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let config = Self {
            tag_key,
            log_level,
            region,
            endpoint_url,
            https_proxy,
            http_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    name: "AWS_ENDPOINT_URL",
                    value: url.clone(),
                });
            }
        }
        Ok(())
    }

    /// Region of the provider endpoints, required by the provider adapter.
    pub fn require_region(&self) -> Result<&str, ConfigError> {
        self.region
            .as_deref()
            .ok_or(ConfigError::Missing("AWS_REGION"))
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}
