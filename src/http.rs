use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Minimal POST transport used by the senders.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POSTs `body` to `url` and returns the raw response body.
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct ReqwestClient {
    http: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    /// `None` keeps reqwest's default (no overall timeout).
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("wxpub/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { http: builder.build()? })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>> {
        let mut req = self.http.post(url).body(body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn posts_body_and_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(Matcher::Exact(r#"{"a":1}"#.to_string()))
            .with_status(200)
            .with_body("pong")
            .create_async()
            .await;

        let client = ReqwestClient::new();
        let resp = client
            .post(
                &format!("{}/hook", server.url()),
                br#"{"a":1}"#.to_vec(),
                &[("Content-Type", "application/json; charset=utf-8")],
            )
            .await
            .unwrap();

        assert_eq!(resp, b"pong");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(502)
            .create_async()
            .await;

        let client = ReqwestClient::with_timeout(Some(Duration::from_secs(5))).unwrap();
        let err = client
            .post(&format!("{}/hook", server.url()), vec![], &[])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("502"), "{err}");
    }
}
