// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the civic assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every section defaults to the City of Westlake
//! deployment values.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CivicConfig {
    /// Assistant identity and chat limits.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Chat webhook endpoint.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// User-facing error texts.
    #[serde(default)]
    pub errors: ErrorMessages,

    /// Per-session chat rate limit.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// City contact details shown by the widget.
    #[serde(default)]
    pub city: CityConfig,

    /// Shortcut buttons under the chat box.
    #[serde(default = "default_quick_actions")]
    pub quick_actions: Vec<LinkConfig>,

    /// Topic links in the widget sidebar.
    #[serde(default = "default_popular_topics")]
    pub popular_topics: Vec<LinkConfig>,

    /// Suggested first questions.
    #[serde(default = "default_quick_prompts")]
    pub quick_prompts: Vec<String>,

    /// Conversation store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for CivicConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            webhook: WebhookConfig::default(),
            errors: ErrorMessages::default(),
            rate_limit: RateLimitConfig::default(),
            city: CityConfig::default(),
            quick_actions: default_quick_actions(),
            popular_topics: default_popular_topics(),
            quick_prompts: default_quick_prompts(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl CivicConfig {
    /// The effective configuration as TOML, with secrets masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut copy = self.clone();
        if copy.gateway.admin_token.is_some() {
            copy.gateway.admin_token = Some("[REDACTED]".to_string());
        }
        toml::to_string_pretty(&copy)
    }
}

/// Assistant identity and chat behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Display name of the assistant.
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// First bot message of every session.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Longest accepted user message, in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Idle minutes after which a session is considered expired.
    #[serde(default = "default_session_timeout_mins")]
    pub session_timeout_mins: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            log_level: default_log_level(),
            welcome_message: default_welcome_message(),
            max_message_length: default_max_message_length(),
            session_timeout_mins: default_session_timeout_mins(),
        }
    }
}

fn default_assistant_name() -> String {
    "City of Westlake Assistant".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_welcome_message() -> String {
    "Hello! I'm the City of Westlake virtual assistant. How can I help you today? \
     Feel free to ask about city services, department information, permits, or general questions."
        .to_string()
}

fn default_max_message_length() -> usize {
    1000
}

fn default_session_timeout_mins() -> u64 {
    30
}

/// Chat webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Workflow webhook URL. Required to serve chat.
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (429 and 5xx gateway errors).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_webhook_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_webhook_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

/// Texts shown to the citizen when something goes wrong.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorMessages {
    #[serde(default = "default_network_error")]
    pub network_error: String,

    #[serde(default = "default_rate_limit_exceeded")]
    pub rate_limit_exceeded: String,

    #[serde(default = "default_session_expired")]
    pub session_expired: String,

    #[serde(default = "default_invalid_input")]
    pub invalid_input: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            network_error: default_network_error(),
            rate_limit_exceeded: default_rate_limit_exceeded(),
            session_expired: default_session_expired(),
            invalid_input: default_invalid_input(),
        }
    }
}

fn default_network_error() -> String {
    "I'm sorry, I'm experiencing technical difficulties. Please try again later \
     or contact City Hall directly at (440) 871-3300."
        .to_string()
}

fn default_rate_limit_exceeded() -> String {
    "You're sending messages too quickly. Please wait a moment before sending another message."
        .to_string()
}

fn default_session_expired() -> String {
    "Your session has expired. Please refresh the page to start a new conversation.".to_string()
}

fn default_invalid_input() -> String {
    "I couldn't understand your message. Please try rephrasing your question.".to_string()
}

/// Sliding-window limit on chat messages per session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

/// City contact details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CityConfig {
    #[serde(default = "default_city_name")]
    pub name: String,

    #[serde(default = "default_city_phone")]
    pub phone: String,

    #[serde(default = "default_city_address")]
    pub address: String,

    #[serde(default = "default_city_website")]
    pub website: String,

    #[serde(default = "default_city_email")]
    pub email: String,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            name: default_city_name(),
            phone: default_city_phone(),
            address: default_city_address(),
            website: default_city_website(),
            email: default_city_email(),
        }
    }
}

fn default_city_name() -> String {
    "City of Westlake".to_string()
}

fn default_city_phone() -> String {
    "(440) 871-3300".to_string()
}

fn default_city_address() -> String {
    "27700 Hilliard Blvd, Westlake, OH 44145".to_string()
}

fn default_city_website() -> String {
    "https://www.cityofwestlake.org".to_string()
}

fn default_city_email() -> String {
    "info@cityofwestlake.org".to_string()
}

/// A named link shown in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    pub name: String,
    pub href: String,
}

impl LinkConfig {
    fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            href: href.to_string(),
        }
    }
}

fn default_quick_actions() -> Vec<LinkConfig> {
    vec![
        LinkConfig::new(
            "Meeting Webcasts",
            "https://mediasite.cityofwestlake.org/Mediasite/Channel/webcasts/browse/null/most-recent/null/0/null",
        ),
        LinkConfig::new(
            "Report a Concern",
            "https://www.cityofwestlake.org/forms/report-a-concern",
        ),
        LinkConfig::new(
            "Online Payments",
            "https://egov.cityofwestlake.org/entity/login_main.aspx",
        ),
        LinkConfig::new(
            "City Documents",
            "https://onbase.cityofwestlake.org/PublicAccess/index.html",
        ),
    ]
}

fn default_popular_topics() -> Vec<LinkConfig> {
    vec![
        LinkConfig::new(
            "Building Permits",
            "https://www.cityofwestlake.org/o/cw/page/permits-and-contractor-info",
        ),
        LinkConfig::new(
            "Trash & Recycling",
            "https://www.cityofwestlake.org/o/cw/page/rubbish-recycling",
        ),
        LinkConfig::new("Water Bills", "https://www.cityofwestlake.org/o/cw/page/sewer-water"),
        LinkConfig::new("City Council", "https://www.cityofwestlake.org/page/city-council"),
        LinkConfig::new("Parks & Rec", "https://www.cityofwestlake.org/o/rcwl"),
    ]
}

fn default_quick_prompts() -> Vec<String> {
    [
        "What are the hours for City Hall?",
        "How do I apply for a building permit?",
        "When is my trash pickup day?",
        "How do I pay my water bill online?",
        "What's the phone number for the Parks Department?",
        "How do I report a pothole?",
        "When is the next City Council meeting?",
        "What services does the city provide?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// SQLite conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("civic").join("civic.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("civic.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for the admin routes. Admin routes reject every request
    /// when unset.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Formats a ten-digit number as `(DDD) DDD-DDDD`.
///
/// Anything that is not exactly ten digits once punctuation is removed is
/// returned unchanged.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_westlake_deployment() {
        let config = CivicConfig::default();
        assert_eq!(config.assistant.max_message_length, 1000);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.city.phone, "(440) 871-3300");
        assert_eq!(config.quick_prompts.len(), 8);
        assert!(config.errors.network_error.contains("(440) 871-3300"));
        assert!(config.webhook.url.is_none());
    }

    #[test]
    fn format_phone_number_cases() {
        assert_eq!(format_phone_number("4408713300"), "(440) 871-3300");
        assert_eq!(format_phone_number("440.871.3300"), "(440) 871-3300");
        assert_eq!(format_phone_number("1-440-871-3300"), "1-440-871-3300");
        assert_eq!(format_phone_number("n/a"), "n/a");
    }

    #[test]
    fn gateway_debug_redacts_token() {
        let gateway = GatewayConfig {
            admin_token: Some("super-secret".to_string()),
            ..GatewayConfig::default()
        };
        let debug = format!("{gateway:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn redacted_toml_masks_token() {
        let mut config = CivicConfig::default();
        config.gateway.admin_token = Some("super-secret".to_string());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[gateway]"));
    }
}
