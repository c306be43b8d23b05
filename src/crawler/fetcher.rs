//! HTTP transport with pacing, cookie continuity and charset detection
//!
//! This module provides the production [`Transport`] used against the
//! reservation site:
//! - One cookie store for the whole run, so the site's session survives
//! - The previously loaded page sent as `Referer`, like browser navigation
//! - Request pacing with governor
//! - Charset detection (header, meta tag, UTF-8) with a Shift_JIS fallback

use async_trait::async_trait;
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use regex::Regex;
use reqwest::{Client, RequestBuilder, Response};
use std::num::NonZeroU32;
use std::sync::OnceLock;
use tokio::sync::Mutex;

use super::headers::build_browser_headers;
use super::Transport;
use crate::config::TransportConfig;
use crate::utils::error::FetchError;

/// reqwest-backed transport for the reservation site
pub struct HttpTransport {
    /// HTTP client with a persistent cookie store
    client: Client,

    /// Rate limiter pacing every exchange
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    user_agent: String,

    /// Last page answered successfully, used as the next request's referer
    last_page: Mutex<Option<String>>,
}

impl HttpTransport {
    /// Create a transport from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &TransportConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            user_agent: config.user_agent.clone(),
            last_page: Mutex::new(None),
        })
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Option<String>, FetchError> {
        self.rate_limiter.until_ready().await;

        let referer = self.last_page.lock().await.clone();
        let response = request
            .headers(build_browser_headers(&self.user_agent, referer.as_deref()))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }
        *self.last_page.lock().await = Some(url.to_string());

        let body = self.decode_response(response).await?;
        Ok((!body.is_empty()).then_some(body))
    }

    /// Decode response body using the detected charset
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the content cannot be decoded
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        decode_bytes(&bytes, &content_type)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Option<String>, FetchError> {
        tracing::debug!(url, "GET");
        self.send(url, self.client.get(url)).await
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<Option<String>, FetchError> {
        tracing::debug!(url, fields = form.len(), "POST");
        self.send(url, self.client.post(url).form(form)).await
    }
}

/// Charset label declared in a `Content-Type` value or a meta tag
fn charset_label(text: &str) -> Option<&str> {
    static CHARSET_RE: OnceLock<Regex> = OnceLock::new();

    let re = CHARSET_RE.get_or_init(|| {
        Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#).expect("Invalid regex pattern")
    });

    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Decode bytes to a UTF-8 string
///
/// Strategies, in order:
/// 1. Charset from the `Content-Type` header
/// 2. Charset from a `<meta>` tag in the first kilobyte
/// 3. Strict UTF-8
/// 4. Shift_JIS
///
/// # Errors
///
/// Returns `FetchError::Decode` if a declared charset rejects the bytes
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    if let Some(encoding) = charset_label(content_type).and_then(|l| Encoding::for_label(l.as_bytes())) {
        return decode_with(encoding, bytes);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    if let Some(encoding) = charset_label(&head).and_then(|l| Encoding::for_label(l.as_bytes())) {
        return decode_with(encoding, bytes);
    }

    if let Ok(text) = decode_with(UTF_8, bytes) {
        return Ok(text);
    }

    let (cow, _encoding, had_errors) = SHIFT_JIS.decode(bytes);
    if had_errors {
        tracing::warn!("Body decoded as Shift_JIS with replacement characters");
    }
    Ok(cow.into_owned())
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, FetchError> {
    let (cow, _encoding, had_errors) = encoding.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode(format!("{} decoding errors", encoding.name())));
    }

    Ok(cow.into_owned())
}
