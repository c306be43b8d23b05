//! LINE Messaging API push channel

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{Notifier, NotifyError};

const PUSH_TIMEOUT_SECS: u64 = 10;

/// Pushes text messages to one LINE user
///
/// # Payload Format
///
/// ```json
/// {
///   "to": "U0123...",
///   "messages": [{ "type": "text", "text": "6月7日（土）09:00\n..." }]
/// }
/// ```
pub struct LineNotifier {
    endpoint: String,
    token: String,
    user_id: String,
    client: Client,
}

impl LineNotifier {
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidConfig` for a non-HTTP endpoint or a
    /// blank token or user id.
    pub fn new(
        endpoint: impl Into<String>,
        token: String,
        user_id: String,
    ) -> Result<Self, NotifyError> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(NotifyError::InvalidConfig(format!(
                "push endpoint must be an HTTP URL: {endpoint}"
            )));
        }
        if token.trim().is_empty() || user_id.trim().is_empty() {
            return Err(NotifyError::InvalidConfig(
                "token and user id must not be blank".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(PUSH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            endpoint,
            token,
            user_id,
            client,
        })
    }

    fn build_payload(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "to": self.user_id,
            "messages": [{ "type": "text", "text": text.trim_end() }],
        })
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    fn name(&self) -> &str {
        "line"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&self.build_payload(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = status.as_u16(), "LINE push delivered");
        Ok(())
    }
}
