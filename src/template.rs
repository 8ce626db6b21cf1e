//! Official-account template messages.
//!
//! A [`TemplateMessageSender`] is built per recipient, configured through its
//! setters and consumed by a single [`TemplateMessageSender::send`] call.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::DEFAULT_API_BASE_URL;
use crate::error::WxError;
use crate::http::HttpClient;
use crate::settings::{Channel, SettingsProvider};

pub const TEMPLATE_SEND_PATH: &str = "/cgi-bin/message/template/send";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Template field name -> attribute name -> value,
/// e.g. `{"first": {"value": "...", "color": "#173177"}}`.
pub type TemplateData = BTreeMap<String, BTreeMap<String, String>>;

pub struct TemplateMessageSender {
    open_id: String,
    access_token: String,
    redirect_url: String,
    mp_app_id: String,
    mp_page_path: String,

    api_base_url: String,
    http: Arc<dyn HttpClient>,
    settings: Arc<dyn SettingsProvider>,
}

#[derive(Serialize)]
struct SendRequest<'a, D: ?Sized> {
    touser: &'a str,
    template_id: &'a str,
    data: &'a D,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    miniprogram: Option<MiniProgram<'a>>,
}

#[derive(Serialize)]
struct MiniProgram<'a> {
    appid: &'a str,
    pagepath: &'a str,
}

impl TemplateMessageSender {
    pub fn new(
        open_id: impl Into<String>,
        http: Arc<dyn HttpClient>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            open_id: open_id.into(),
            access_token: String::new(),
            redirect_url: String::new(),
            mp_app_id: String::new(),
            mp_page_path: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http,
            settings,
        }
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Page opened when the user taps the message.
    pub fn set_redirect_url(&mut self, url: impl Into<String>) {
        self.redirect_url = url.into();
    }

    /// Deep-links the message into the mini program. The app id comes from the
    /// mini-program channel settings at the time of the call.
    pub fn set_mp_path(&mut self, path: impl Into<String>) {
        self.mp_app_id = self.settings.channel_settings(Channel::Wxmp).app_id;
        self.mp_page_path = path.into();
    }

    fn request<'a, D: Serialize + ?Sized>(
        &'a self,
        template_id: &'a str,
        data: &'a D,
    ) -> SendRequest<'a, D> {
        let url = (!self.redirect_url.is_empty()).then_some(self.redirect_url.as_str());
        let miniprogram = (!self.mp_page_path.is_empty()).then(|| MiniProgram {
            appid: &self.mp_app_id,
            pagepath: &self.mp_page_path,
        });

        SendRequest {
            touser: &self.open_id,
            template_id,
            data,
            url,
            miniprogram,
        }
    }

    /// JSON body that [`send`](Self::send) would POST.
    pub fn request_body<D: Serialize + ?Sized>(
        &self,
        template_id: &str,
        data: &D,
    ) -> Result<Value, WxError> {
        Ok(serde_json::to_value(self.request(template_id, data))?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}?access_token={}",
            self.api_base_url, TEMPLATE_SEND_PATH, self.access_token
        )
    }

    /// Sends the template message and returns the platform-assigned msgid.
    ///
    /// Nothing is retried: a transport failure says nothing about whether the
    /// platform delivered the message.
    pub async fn send<D: Serialize + ?Sized>(
        &self,
        template_id: &str,
        data: &D,
    ) -> Result<i64, WxError> {
        let body = match serde_json::to_vec(&self.request(template_id, data)) {
            Ok(body) => body,
            Err(err) => {
                error!(
                    open_id = %self.open_id,
                    template_id,
                    error = %err,
                    "wxpub.template.encode_failed"
                );
                return Err(err.into());
            }
        };

        let resp = match self
            .http
            .post(&self.endpoint(), body, &[("Content-Type", JSON_CONTENT_TYPE)])
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                error!(
                    open_id = %self.open_id,
                    template_id,
                    error = %err,
                    "wxpub.template.send_failed"
                );
                return Err(WxError::Transport(err));
            }
        };

        let reply: Value = match serde_json::from_slice(&resp) {
            Ok(reply) => reply,
            Err(err) => {
                error!(
                    open_id = %self.open_id,
                    template_id,
                    resp = %String::from_utf8_lossy(&resp),
                    "wxpub.template.malformed_response"
                );
                return Err(WxError::MalformedResponse(err.to_string()));
            }
        };

        let code = int_field(&reply, "errcode");
        if code != 0 {
            error!(
                open_id = %self.open_id,
                template_id,
                resp = %String::from_utf8_lossy(&resp),
                "wxpub.template.rejected"
            );
            return Err(WxError::Remote {
                code,
                message: str_field(&reply, "errmsg"),
            });
        }

        let msg_id = int_field(&reply, "msgid");
        debug!(open_id = %self.open_id, template_id, msg_id, "wxpub.template.sent");
        Ok(msg_id)
    }
}

/// Integer read with zero for anything missing or unusable. Numeric strings count.
fn int_field(v: &Value, key: &str) -> i64 {
    match v.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn str_field(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}
