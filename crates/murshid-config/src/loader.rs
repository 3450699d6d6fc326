// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./murshid.toml` > `~/.config/murshid/murshid.toml`
//! > `/etc/murshid/murshid.toml` with environment variable overrides via the
//! `MURSHID_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MurshidConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/murshid/murshid.toml` (system-wide)
/// 3. `~/.config/murshid/murshid.toml` (user XDG config)
/// 4. `./murshid.toml` (local directory)
/// 5. `MURSHID_*` environment variables
pub fn load_config() -> Result<MurshidConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MurshidConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurshidConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MurshidConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MurshidConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MurshidConfig::default()))
        .merge(Toml::file("/etc/murshid/murshid.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("murshid/murshid.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("murshid.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `MURSHID_API_BASE_URL` must map to
/// `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("MURSHID_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("app_", "app.", 1);
        mapped.into()
    })
}
