// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors into miette diagnostics so
//! startup failures render with actionable messages instead of raw serde
//! output.

#![allow(clippy::result_large_err)]

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration sources failed to parse or deserialize.
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(murshid::config::parse),
        help("check murshid.toml against the documented keys; unknown keys are rejected")
    )]
    Parse {
        /// The underlying figment/serde message.
        message: String,
    },

    /// A configuration value parsed but failed validation.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(murshid::config::invalid_value), help("{advice}"))]
    InvalidValue {
        /// Dotted key path, e.g. `api.base_url`.
        key: String,
        /// What is wrong with the value.
        detail: String,
        /// How to fix it.
        advice: String,
    },
}

/// Converts a figment error (which may aggregate several failures) into
/// one [`ConfigError`] per failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Renders configuration errors to stderr via miette.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(format!("{error}"));
        eprintln!("{report:?}");
        if let Some(help) = error.help() {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figment_error_maps_to_parse_variant() {
        let err = crate::loader::load_config_from_str("[api]\nbase_uri = \"x\"\n")
            .expect_err("unknown key should fail");
        let errors = figment_to_config_errors(err);
        assert!(!errors.is_empty());
        assert!(matches!(errors[0], ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_value_renders_key_and_detail() {
        let error = ConfigError::InvalidValue {
            key: "api.base_url".into(),
            detail: "must start with http:// or https://".into(),
            advice: "set api.base_url to the backend origin".into(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("api.base_url"));
        assert!(rendered.contains("http://"));
    }
}
