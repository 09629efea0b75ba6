//! Authenticated HTTP transport.
//!
//! The order code only needs "send this method/url/body, give me the body text";
//! everything about sessions, TLS and timeouts lives behind [`Transport`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroize;

use crate::config::ApiConfig;
use crate::error::{RobinhoodError, Result};

/// Single-attempt HTTP round trips. Implementations must be safe to share across
/// concurrent requests and must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request with an optional JSON body and return the response body text.
    async fn send(&self, method: Method, url: &str, body: Option<String>) -> Result<String>;
}

/// `Transport` over a shared `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build from API config. The bearer token, if any, is installed as a
    /// sensitive default header and the config copy is left untouched.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_token(config, config.token.clone())
    }

    pub fn with_token(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(mut token) = token {
            let mut bearer = format!("Bearer {}", token.trim());
            token.zeroize();
            let value = HeaderValue::from_str(&bearer);
            bearer.zeroize();
            let mut value =
                value.map_err(|e| RobinhoodError::Auth(format!("invalid API token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                RobinhoodError::Auth(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http })
    }

    /// Wrap an existing client (its default headers must already carry auth)
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

fn map_send_error(method: &Method, url: &str, err: reqwest::Error) -> RobinhoodError {
    if err.is_timeout() {
        RobinhoodError::Timeout(format!("{} {}", method, url))
    } else {
        RobinhoodError::Transport(err)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, method: Method, url: &str, body: Option<String>) -> Result<String> {
        debug!(%method, url, has_body = body.is_some(), "sending request");

        let mut req = self.http.request(method.clone(), url);
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| map_send_error(&method, url, e))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| map_send_error(&method, url, e))?;

        if status.as_u16() == 429 {
            return Err(RobinhoodError::RateLimited(format!(
                "{} {} rate limited",
                method, url
            )));
        }

        if !status.is_success() {
            return Err(RobinhoodError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
