// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./civic.toml` > `~/.config/civic/civic.toml` > `/etc/civic/civic.toml`
//! with environment variable overrides via `CIVIC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CivicConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/civic/civic.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "civic.toml";

/// Sections addressable from `CIVIC_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "assistant",
    "webhook",
    "errors",
    "rate_limit",
    "city",
    "storage",
    "gateway",
];

/// `~/.config/civic/civic.toml`, when a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("civic/civic.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/civic/civic.toml` (system-wide)
/// 3. `~/.config/civic/civic.toml` (user XDG config)
/// 4. `./civic.toml` (local directory)
/// 5. `CIVIC_*` environment variables
pub fn load_config() -> Result<CivicConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CivicConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CivicConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CivicConfig, figment::Error> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
    } else {
        tracing::debug!(path = %path.display(), "loading config file");
    }
    Figment::new()
        .merge(Serialized::defaults(CivicConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let user_path = user_config_path().unwrap_or_default();
    let layers = [
        Path::new(SYSTEM_CONFIG_PATH),
        user_path.as_path(),
        Path::new(LOCAL_CONFIG_PATH),
    ];
    for candidate in layers {
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "config layer found");
        }
    }
    Figment::new()
        .merge(Serialized::defaults(CivicConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_path))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `CIVIC_RATE_LIMIT_MAX_REQUESTS` to
/// `rate_limit.max_requests`.
///
/// Only the first known section prefix is turned into a dot, so keys that
/// contain underscores themselves stay intact.
fn env_provider() -> Env {
    Env::prefixed("CIVIC_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("webhook_url"), "webhook.url");
        assert_eq!(map_env_key("rate_limit_max_requests"), "rate_limit.max_requests");
        assert_eq!(map_env_key("gateway_admin_token"), "gateway.admin_token");
        assert_eq!(map_env_key("errors_network_error"), "errors.network_error");
        assert_eq!(map_env_key("quick_prompts"), "quick_prompts");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("civic.toml");
            std::fs::write(&path, "[gateway]\nport = 4000\n").map_err(|e| e.to_string())?;
            jail.set_env("CIVIC_GATEWAY_PORT", "5000");
            jail.set_env("CIVIC_WEBHOOK_URL", "https://hooks.example.org/chat");

            let config = load_config_from_path(&path)?;
            assert_eq!(config.gateway.port, 5000);
            assert_eq!(
                config.webhook.url.as_deref(),
                Some("https://hooks.example.org/chat")
            );
            Ok(())
        });
    }

    #[test]
    #[traced_test]
    fn missing_file_falls_back_to_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.assistant.name, CivicConfig::default().assistant.name);
        assert!(logs_contain("config file not found"));
    }
}
