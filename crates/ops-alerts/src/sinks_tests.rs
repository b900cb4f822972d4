// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::config::SinkType;
use serial_test::serial;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sink(name: &str, enabled: bool, url_env: Option<&str>, token_env: Option<&str>, min_severity: Option<MinSeverity>) -> AlertSink {
    AlertSink {
        name: name.to_string(),
        enabled,
        sink_type: SinkType::Webhook,
        url_env: url_env.map(str::to_string),
        token_env: token_env.map(str::to_string),
        timeout_seconds: 10,
        min_severity,
    }
}

#[test]
#[serial]
fn validate_secrets_rejects_enabled_sink_with_unset_url_env() {
    std::env::remove_var("OPS_ALERTS_TEST_MISSING_URL");
    let config = AlertSinksConfig {
        sinks: vec![sink("slack", true, Some("OPS_ALERTS_TEST_MISSING_URL"), None, None)],
        categories: Default::default(),
    };
    assert!(validate_secrets(&config).is_err());
}

#[test]
#[serial]
fn validate_secrets_ignores_disabled_sink_with_unset_secret() {
    std::env::remove_var("OPS_ALERTS_TEST_DISABLED_URL");
    let config = AlertSinksConfig {
        sinks: vec![sink("slack", false, Some("OPS_ALERTS_TEST_DISABLED_URL"), None, None)],
        categories: Default::default(),
    };
    assert!(validate_secrets(&config).is_ok());
}

#[test]
#[serial]
fn validate_secrets_passes_when_url_env_resolves() {
    std::env::set_var("OPS_ALERTS_TEST_URL", "https://example.invalid/hook");
    let config = AlertSinksConfig {
        sinks: vec![sink("slack", true, Some("OPS_ALERTS_TEST_URL"), None, None)],
        categories: Default::default(),
    };
    assert!(validate_secrets(&config).is_ok());
    std::env::remove_var("OPS_ALERTS_TEST_URL");
}

#[test]
fn severity_floor_uses_category_default_when_no_override() {
    let config = AlertSinksConfig { sinks: Vec::new(), categories: Default::default() };
    let s = sink("slack", true, None, None, None);
    assert!(passes_severity_floor(&config, &s, "health_critical"));
}

#[test]
fn severity_floor_blocks_below_sinks_own_minimum() {
    let config = AlertSinksConfig { sinks: Vec::new(), categories: Default::default() };
    let s = sink("pagerduty", true, None, None, Some(MinSeverity::Critical));
    assert!(!passes_severity_floor(&config, &s, "health_degraded"));
}

#[test]
fn severity_floor_category_override_takes_precedence_over_route_default() {
    let mut categories = std::collections::BTreeMap::new();
    categories.insert("health_degraded".to_string(), MinSeverity::Info);
    let config = AlertSinksConfig { sinks: Vec::new(), categories };
    let s = sink("pagerduty", true, None, None, Some(MinSeverity::Critical));
    assert!(passes_severity_floor(&config, &s, "health_degraded"));
}

#[tokio::test]
#[serial]
async fn deliver_succeeds_on_2xx_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    std::env::set_var("OPS_ALERTS_TEST_DELIVER_URL", format!("{}/hook", server.uri()));
    let s = sink("webhook", true, Some("OPS_ALERTS_TEST_DELIVER_URL"), None, None);
    let client = Client::new();

    let result = deliver(&client, &s, serde_json::json!({"ok": true})).await;
    std::env::remove_var("OPS_ALERTS_TEST_DELIVER_URL");
    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
async fn deliver_fails_on_non_2xx_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    std::env::set_var("OPS_ALERTS_TEST_DELIVER_FAIL_URL", format!("{}/hook", server.uri()));
    let s = sink("webhook", true, Some("OPS_ALERTS_TEST_DELIVER_FAIL_URL"), None, None);
    let client = Client::new();

    let result = deliver(&client, &s, serde_json::json!({"ok": true})).await;
    std::env::remove_var("OPS_ALERTS_TEST_DELIVER_FAIL_URL");
    assert!(result.is_err());
}
