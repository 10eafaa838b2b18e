use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::GatewayConfig;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub list_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 30,
            list_limit: 100,
        }
    }
}

impl Settings {
    pub fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        let config = GatewayConfig::new(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))?;
        Ok(config
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_list_limit(self.list_limit))
    }
}

/// Defaults, then the config file (if present), then environment overrides.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let table = match raw.parse::<toml::Table>() {
        Ok(table) => table,
        Err(err) => {
            warn!("config: ignoring unreadable config file: {err}");
            return;
        }
    };

    if let Some(v) = table.get("api_base_url").and_then(|v| v.as_str()) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = table
        .get("request_timeout_secs")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = table
        .get("list_limit")
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok())
    {
        settings.list_limit = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("IMAGEOPS_API_BASE") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "config: ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = lookup("APP__LIST_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.list_limit = parsed,
            Err(_) => warn!(value = %v, "config: ignoring invalid APP__LIST_LIMIT"),
        }
    }
}
