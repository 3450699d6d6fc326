// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Murshid configuration system.

use murshid_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_murshid_config() {
    let toml = r#"
[api]
base_url = "https://api.example.com/api"
token = "jwt-token-123"

[app]
log_level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.api.base_url, "https://api.example.com/api");
    assert_eq!(config.api.token.as_deref(), Some("jwt-token-123"));
    assert_eq!(config.app.log_level, "debug");
}

/// Missing sections fall back to defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.api.base_url, "http://localhost:4000/api");
    assert!(config.api.token.is_none());
    assert_eq!(config.app.log_level, "info");
}

/// Unknown field in [api] section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_api_produces_error() {
    let toml = r#"
[api]
base_uri = "https://api.example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("base_uri"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Environment variable MURSHID_API_BASE_URL overrides api.base_url.
#[test]
fn env_var_overrides_api_base_url() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("murshid.toml", "[api]\nbase_url = \"http://from-file\"\n")?;
        jail.set_env("MURSHID_API_BASE_URL", "http://from-env");

        let config = murshid_config::load_config().expect("config should load");
        assert_eq!(config.api.base_url, "http://from-env");
        Ok(())
    });
}

/// MURSHID_API_TOKEN maps to api.token, not api.to.ken or similar.
#[test]
fn env_var_maps_underscored_keys() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("MURSHID_API_TOKEN", "env-token");
        let config = murshid_config::load_config().expect("config should load");
        assert_eq!(config.api.token.as_deref(), Some("env-token"));
        Ok(())
    });
}

/// Validation rejects a non-http base URL even when the TOML parses.
#[test]
fn validation_rejects_non_http_base_url() {
    let toml = r#"
[api]
base_url = "backend.internal:4000"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("api.base_url"));
}

/// Validation accepts the compiled defaults.
#[test]
fn validation_accepts_defaults() {
    assert!(load_and_validate_str("").is_ok());
}
