//! Template message client for WeChat official accounts.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod monitoring;
pub mod settings;
pub mod template;

pub use client::WxPubClient;
pub use config::Config;
pub use error::WxError;
pub use http::{HttpClient, ReqwestClient};
pub use settings::{Channel, ChannelSettings, SettingsProvider, StaticSettings};
pub use template::{TemplateData, TemplateMessageSender};
