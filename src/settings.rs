use std::collections::HashMap;

use crate::config::Config;

/// Credential/settings scope on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Official account (template messages are sent from here).
    Wxpub,
    /// Mini program (deep-link target of a template message).
    Wxmp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSettings {
    pub app_id: String,
}

pub trait SettingsProvider: Send + Sync {
    /// Settings for `channel`; empty settings when the channel is not configured.
    fn channel_settings(&self, channel: Channel) -> ChannelSettings;
}

#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    channels: HashMap<Channel, ChannelSettings>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Channel, settings: ChannelSettings) -> Self {
        self.channels.insert(channel, settings);
        self
    }

    pub fn from_config(cfg: &Config) -> Self {
        match cfg.wxmp_app_id.clone() {
            Some(app_id) => Self::new().with_channel(Channel::Wxmp, ChannelSettings { app_id }),
            None => Self::new(),
        }
    }
}

impl SettingsProvider for StaticSettings {
    fn channel_settings(&self, channel: Channel) -> ChannelSettings {
        self.channels.get(&channel).cloned().unwrap_or_default()
    }
}
