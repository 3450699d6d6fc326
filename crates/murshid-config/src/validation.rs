// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MurshidConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates a parsed configuration, collecting every failure.
pub fn validate_config(config: &MurshidConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base = config.api.base_url.trim();
    if base.is_empty() {
        errors.push(ConfigError::InvalidValue {
            key: "api.base_url".into(),
            detail: "must not be empty".into(),
            advice: "set api.base_url to the backend origin, e.g. https://api.example.com/api"
                .into(),
        });
    } else if !base.starts_with("http://") && !base.starts_with("https://") {
        errors.push(ConfigError::InvalidValue {
            key: "api.base_url".into(),
            detail: format!("`{base}` is not an http(s) URL"),
            advice: "prefix the backend origin with http:// or https://".into(),
        });
    }

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::InvalidValue {
            key: "app.log_level".into(),
            detail: format!("`{}` is not a log level", config.app.log_level),
            advice: format!("use one of: {}", LOG_LEVELS.join(", ")),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
