use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, DEFAULT_API_BASE_URL};
use crate::http::{HttpClient, ReqwestClient};
use crate::settings::{SettingsProvider, StaticSettings};
use crate::template::TemplateMessageSender;

/// Shared collaborators for building per-recipient senders.
#[derive(Clone)]
pub struct WxPubClient {
    api_base_url: String,
    http: Arc<dyn HttpClient>,
    settings: Arc<dyn SettingsProvider>,
}

impl WxPubClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http,
            settings,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let http = ReqwestClient::with_timeout(cfg.http_timeout())?;
        let settings = StaticSettings::from_config(cfg);
        Ok(Self::new(Arc::new(http), Arc::new(settings))
            .with_api_base_url(cfg.api_base_url.clone()))
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    /// Fresh sender for one recipient; nothing is shared between senders
    /// except the transport and settings handles.
    pub fn template_message(&self, open_id: impl Into<String>) -> TemplateMessageSender {
        TemplateMessageSender::new(open_id, self.http.clone(), self.settings.clone())
            .with_api_base_url(self.api_base_url.clone())
    }
}
