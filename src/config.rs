use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com";

#[derive(Clone)]
pub struct Config {
    // Platform
    pub api_base_url: String,
    pub access_token: Option<String>,

    // Channels
    pub wxmp_app_id: Option<String>,

    // Transport
    pub http_timeout_secs: u64,

    // Logging
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            wxmp_app_id: None,
            http_timeout_secs: 10,
            log_json: false,
        }
    }
}

// The token is a live credential; keep it out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("wxmp_app_id", &self.wxmp_app_id)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("log_json", &self.log_json)
            .finish()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (env, tests).
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = non_empty(get("WXPUB_API_BASE_URL"))
            .unwrap_or(defaults.api_base_url)
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("https://") || api_base_url.starts_with("http://")) {
            return Err(anyhow!("WXPUB_API_BASE_URL must be an http(s) URL: {api_base_url}"));
        }

        let access_token = non_empty(get("WXPUB_ACCESS_TOKEN"));
        let wxmp_app_id = non_empty(get("WXMP_APP_ID"));

        let http_timeout_secs = match non_empty(get("WXPUB_HTTP_TIMEOUT_SECS")) {
            None => defaults.http_timeout_secs,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow!("invalid WXPUB_HTTP_TIMEOUT_SECS: {raw}"))?,
        };

        let log_json = get("WXPUB_LOG_JSON")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(defaults.log_json);

        Ok(Self {
            api_base_url,
            access_token,
            wxmp_app_id,
            http_timeout_secs,
            log_json,
        })
    }

    /// `None` when timeouts are disabled (`WXPUB_HTTP_TIMEOUT_SECS=0`).
    pub fn http_timeout(&self) -> Option<Duration> {
        (self.http_timeout_secs > 0).then(|| Duration::from_secs(self.http_timeout_secs))
    }
}
