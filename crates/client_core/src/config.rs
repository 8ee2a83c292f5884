use std::{collections::HashMap, fs, path::Path};

use url::Url;

use crate::error::{ClientError, Result};

pub const CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".into(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

/// Resolves the API base URL: default, then `client.toml`, then the environment.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_config_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let mut raw_base_url = ClientConfig::default().api_base_url;

    if let Ok(raw) = fs::read_to_string(file) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                raw_base_url = v.clone();
            }
        }
    }

    if let Some(v) = env("API_BASE_URL") {
        raw_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        raw_base_url = v;
    }

    ClientConfig::new(&raw_base_url)
}

fn normalize_base_url(raw_base_url: &str) -> Result<String> {
    let trimmed = raw_base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::Config("api base url is empty".into()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ClientError::Config(format!("api base url '{trimmed}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "api base url '{trimmed}' must use http or https"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
