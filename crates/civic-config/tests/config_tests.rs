// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use civic_config::diagnostic::ConfigError;
use civic_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_config_deserializes() {
    let toml = r#"
quick_prompts = ["Where do I vote?"]

[assistant]
name = "Springfield Helper"
log_level = "debug"
max_message_length = 500

[webhook]
url = "https://hooks.example.org/webhook/abc/chat"
timeout_secs = 10
max_retries = 0

[errors]
network_error = "We are offline."

[rate_limit]
max_requests = 3
window_secs = 10

[city]
name = "City of Springfield"
phone = "(555) 010-0000"

[[quick_actions]]
name = "Pay a Bill"
href = "https://springfield.example.org/pay"

[storage]
database_path = "/tmp/civic-test.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8080
admin_token = "secret"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.assistant.name, "Springfield Helper");
    assert_eq!(config.assistant.max_message_length, 500);
    assert_eq!(config.webhook.max_retries, 0);
    assert_eq!(config.errors.network_error, "We are offline.");
    // Unset keys in a present section keep their defaults.
    assert!(config.errors.invalid_input.starts_with("I couldn't understand"));
    assert_eq!(config.rate_limit.max_requests, 3);
    assert_eq!(config.city.name, "City of Springfield");
    assert_eq!(config.city.website, "https://www.cityofwestlake.org");
    assert_eq!(config.quick_actions.len(), 1);
    assert_eq!(config.quick_prompts, vec!["Where do I vote?"]);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.admin_token.as_deref(), Some("secret"));
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.popular_topics.len(), 5);
}

#[test]
fn unknown_key_gets_suggestion() {
    let errors = load_and_validate_str("[rate_limit]\nmax_requets = 5\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey { key, suggestion, .. } => {
            assert_eq!(key, "max_requets");
            assert_eq!(suggestion.as_deref(), Some("max_requests"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(err.to_string().contains("telegram"), "{err}");
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("port")),
        "{errors:?}"
    );
}

#[test]
fn validation_errors_surface_through_loader() {
    let errors =
        load_and_validate_str("[webhook]\nurl = \"http://hooks.example.org/chat\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn loads_from_file_with_source_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("civic.toml");
    std::fs::write(&path, "[assistant]\nnaem = \"x\"\n").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("name"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn diagnostics_render_as_miette_reports() {
    let errors = load_and_validate_str("[gateway]\nprot = 1\n").unwrap_err();
    let report = miette::Report::new(errors.into_iter().next().unwrap());
    let rendered = format!("{report:?}");
    assert!(rendered.contains("prot"));
}
