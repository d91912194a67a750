//! Integration tests for runtime configuration.

use std::collections::HashMap;

use image_compare_client::SelectionPolicy;
use image_compare_web::{AppConfig, ConfigError, UploadPolicy};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn app_config_tests_accepts_absolute_endpoint_and_server_policy() {
    let config = AppConfig::from_lookup(lookup(&[
        ("endpoint", "http://localhost:5000/compare"),
        ("upload-policy", "server"),
    ]))
    .expect("config should be valid");

    assert_eq!(config.endpoint, "http://localhost:5000/compare");
    assert_eq!(config.upload_policy, UploadPolicy::Server);
    assert_eq!(
        config.upload_policy.selection_policy(),
        SelectionPolicy::server_defaults()
    );
}

#[test]
fn app_config_tests_blank_endpoint_keeps_default() {
    let config = AppConfig::from_lookup(lookup(&[("endpoint", "  ")]))
        .expect("blank endpoint should fall back");
    assert_eq!(config.endpoint, "/compare");
    assert_eq!(config.upload_policy, UploadPolicy::Permissive);
}

#[test]
fn app_config_tests_rejects_bad_values() {
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("endpoint", "/api/upload")])),
        Err(ConfigError::InvalidEndpoint(_))
    ));
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("upload-policy", "strict")])),
        Err(ConfigError::UnknownPolicy(name)) if name == "strict"
    ));
}
