use thiserror::Error;

/// Failure of a template message send.
#[derive(Debug, Error)]
pub enum WxError {
    /// Payload could not be serialized to JSON. No request was made.
    #[error("encode template message: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The POST itself failed (connect, timeout, non-2xx status).
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// Platform answered with a non-zero `errcode`.
    #[error("{message}")]
    Remote { code: i64, message: String },

    /// Response body was not JSON at all.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl WxError {
    /// Platform error code, when the remote side reported one.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            WxError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}
