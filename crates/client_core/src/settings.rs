//! Client settings: defaults, then `docqa.toml`, then `DOCQA_*` environment variables.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "docqa.toml";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid service url '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub service_url: Url,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_url: Url::parse(DEFAULT_SERVICE_URL).expect("default service url is valid"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    service_url: Option<String>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

impl ClientSettings {
    pub fn with_service_url(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.service_url = parse_service_url(raw)?;
        Ok(self)
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Result<Self, SettingsError> {
        self.request_timeout = positive_secs("request_timeout_secs", secs)?;
        Ok(self)
    }

    pub fn build_http_client(&self) -> Result<Client, SettingsError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|error| SettingsError::HttpClient(error.to_string()))
    }

    fn apply_file(mut self, file: SettingsFile) -> Result<Self, SettingsError> {
        if let Some(v) = file.service_url {
            self = self.with_service_url(&v)?;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout = positive_secs("request_timeout_secs", v)?;
        }
        if let Some(v) = file.connect_timeout_secs {
            self.connect_timeout = positive_secs("connect_timeout_secs", v)?;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        Ok(self)
    }

    fn apply_env<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DOCQA_SERVICE_URL") {
            self = self.with_service_url(&v)?;
        }
        if let Some(v) = lookup("DOCQA_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = parse_secs("DOCQA_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DOCQA_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout = parse_secs("DOCQA_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DOCQA_LOG") {
            self.log_filter = v;
        }
        Ok(self)
    }
}

/// Loads settings from `path` (or `docqa.toml` in the working directory when it
/// exists) and the process environment.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env<F>(
    path: Option<&Path>,
    lookup: F,
) -> Result<ClientSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ClientSettings::default();

    let file_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default_path = PathBuf::from(DEFAULT_SETTINGS_FILE);
            default_path.exists().then_some(default_path)
        }
    };

    if let Some(file_path) = file_path {
        let raw = fs::read_to_string(&file_path).map_err(|source| SettingsError::Read {
            path: file_path.clone(),
            source,
        })?;
        let file: SettingsFile = toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: file_path.clone(),
            source,
        })?;
        settings = settings.apply_file(file)?;
    }

    settings.apply_env(lookup)
}

pub fn parse_service_url(raw: &str) -> Result<Url, SettingsError> {
    let raw = raw.trim();
    let invalid = |reason: String| SettingsError::InvalidServiceUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, SettingsError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
        })?;
    positive_secs(key, secs)
}

fn positive_secs(key: &'static str, secs: u64) -> Result<Duration, SettingsError> {
    if secs == 0 {
        return Err(SettingsError::InvalidValue {
            key,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
