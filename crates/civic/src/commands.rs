// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline commands: `annotate`, `normalize`, and `check-config`.

use std::io::Read;
use std::path::Path;

use chrono::Utc;
use civic_annotate::{RenderedBlock, annotate, render_message};
use civic_config::CivicConfig;
use civic_core::{CivicError, Message};
use civic_normalize::MessageNormalizer;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct NormalizeOutput {
    message: Message,
    blocks: Vec<RenderedBlock>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CivicError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CivicError::Internal(format!("failed to serialize output: {e}")))
}

/// Annotates `text` and returns the spans as pretty JSON.
pub fn run_annotate(text: &str) -> Result<String, CivicError> {
    to_json(&annotate(text))
}

/// Reads a raw webhook reply from `file`, or stdin when `None`.
pub fn read_input(file: Option<&Path>) -> Result<String, CivicError> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            CivicError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CivicError::InvalidInput(format!("cannot read stdin: {e}")))?;
            Ok(buf)
        }
    }
}

/// Normalizes a raw reply and returns the message with its rendering.
///
/// Input that is not JSON is treated as a plain-text reply.
pub fn run_normalize(input: &str, fallback: &str) -> Result<String, CivicError> {
    let raw = serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.trim().to_string()));
    let message = MessageNormalizer::new(fallback).normalize(&raw, Utc::now());
    let blocks = render_message(&message);
    to_json(&NormalizeOutput { message, blocks })
}

/// Summarizes a validated configuration, optionally with the full redacted TOML.
pub fn run_check_config(config: &CivicConfig, show: bool) -> Result<String, CivicError> {
    let mut out = format!(
        "configuration OK\n  assistant: {}\n  webhook:   {}\n  database:  {}\n  gateway:   {}:{} (admin API {})\n",
        config.assistant.name,
        config.webhook.url.as_deref().unwrap_or("<not set>"),
        config.storage.database_path,
        config.gateway.host,
        config.gateway.port,
        if config.gateway.admin_token.is_some() { "enabled" } else { "disabled" },
    );
    if show {
        let toml = config
            .to_redacted_toml()
            .map_err(|e| CivicError::Config(format!("failed to render config: {e}")))?;
        out.push('\n');
        out.push_str(&toml);
    }
    Ok(out)
}
