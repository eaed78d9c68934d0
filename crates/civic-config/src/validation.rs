// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: URL shapes, non-empty paths and
//! positive limits. All problems are collected rather than failing fast.

use crate::diagnostic::ConfigError;
use crate::model::{CivicConfig, LinkConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
pub fn validate_config(config: &CivicConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.assistant.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "assistant.log_level `{}` must be one of {}",
            config.assistant.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.assistant.max_message_length == 0 {
        errors.push(ConfigError::validation(
            "assistant.max_message_length must be greater than 0",
        ));
    }

    if config.assistant.session_timeout_mins == 0 {
        errors.push(ConfigError::validation(
            "assistant.session_timeout_mins must be greater than 0",
        ));
    }

    if let Some(url) = &config.webhook.url {
        if let Err(reason) = validate_webhook_url(url) {
            errors.push(ConfigError::validation(format!(
                "webhook.url `{url}` {reason}"
            )));
        }
    }

    if config.webhook.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "webhook.timeout_secs must be greater than 0",
        ));
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ConfigError::validation(
            "rate_limit.max_requests must be greater than 0",
        ));
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ConfigError::validation(
            "rate_limit.window_secs must be greater than 0",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if let Some(token) = &config.gateway.admin_token {
        if token.trim().is_empty() {
            errors.push(ConfigError::validation(
                "gateway.admin_token must not be blank; remove it to disable admin routes",
            ));
        }
    }

    check_links("quick_actions", &config.quick_actions, &mut errors);
    check_links("popular_topics", &config.popular_topics, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `https` URLs, and plain `http` only for loopback hosts.
pub fn validate_webhook_url(raw: &str) -> Result<(), &'static str> {
    let url = url::Url::parse(raw).map_err(|_| "is not a valid URL")?;
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback(&url) => Ok(()),
        "http" => Err("must use https (http is only allowed for localhost)"),
        _ => Err("must be an http(s) URL"),
    }
}

fn is_loopback(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn check_links(section: &str, links: &[LinkConfig], errors: &mut Vec<ConfigError>) {
    for (i, link) in links.iter().enumerate() {
        if link.name.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "{section}[{i}].name must not be empty"
            )));
        }
        if url::Url::parse(&link.href).is_err() {
            errors.push(ConfigError::validation(format!(
                "{section}[{i}].href `{}` is not a valid URL",
                link.href
            )));
        }
    }
}
