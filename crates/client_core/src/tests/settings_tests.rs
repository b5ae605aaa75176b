use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("docqa_settings_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("docqa.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_point_at_local_service() {
    let settings = ClientSettings::default();
    assert_eq!(settings.service_url.as_str(), "http://localhost:8000/");
    assert_eq!(settings.request_timeout, Duration::from_secs(120));
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_are_applied_then_env_overrides() {
    let path = temp_settings_file(
        r#"
service_url = "http://qa.internal:9000/api/"
request_timeout_secs = 30
log_filter = "debug"
"#,
    );

    let from_file = load_settings_with_env(Some(&path), no_env).expect("settings");
    assert_eq!(from_file.service_url.as_str(), "http://qa.internal:9000/api/");
    assert_eq!(from_file.request_timeout, Duration::from_secs(30));
    assert_eq!(from_file.log_filter, "debug");

    let overridden = load_settings_with_env(
        Some(&path),
        env_from(&[
            ("DOCQA_SERVICE_URL", "https://qa.example.com"),
            ("DOCQA_REQUEST_TIMEOUT_SECS", "5"),
        ]),
    )
    .expect("settings");
    assert_eq!(overridden.service_url.host_str(), Some("qa.example.com"));
    assert_eq!(overridden.request_timeout, Duration::from_secs(5));
    assert_eq!(overridden.log_filter, "debug");

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let err = load_settings_with_env(Some(Path::new("/nonexistent/docqa.toml")), no_env)
        .expect_err("must fail");
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[test]
fn unknown_keys_are_rejected() {
    let path = temp_settings_file("serivce_url = \"http://typo\"\n");
    let err = load_settings_with_env(Some(&path), no_env).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn rejects_non_http_service_urls() {
    assert!(matches!(
        parse_service_url("ftp://files.example.com"),
        Err(SettingsError::InvalidServiceUrl { .. })
    ));
    assert!(parse_service_url("localhost:8000").is_err());
    assert!(parse_service_url(" http://127.0.0.1:8000 ").is_ok());
}

#[test]
fn rejects_zero_or_garbage_timeouts() {
    let err = load_settings_with_env(None, env_from(&[("DOCQA_REQUEST_TIMEOUT_SECS", "0")]))
        .expect_err("must fail");
    assert!(matches!(err, SettingsError::InvalidValue { .. }));

    let err = load_settings_with_env(None, env_from(&[("DOCQA_CONNECT_TIMEOUT_SECS", "soon")]))
        .expect_err("must fail");
    assert!(matches!(
        err,
        SettingsError::InvalidValue {
            key: "DOCQA_CONNECT_TIMEOUT_SECS",
            ..
        }
    ));
}
