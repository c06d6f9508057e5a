//! Reqwest-backed Resend notifier.
//!
//! Owns transport details only: bearer authentication, the request timeout,
//! HTTP status mapping and decoding the provider's email id. A single
//! attempt is made per notification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::MailNotification;
use crate::domain::ports::{MailNotifier, MailNotifierError, NotificationReceipt};

/// Resend's email submission endpoint.
pub const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Deserialize)]
struct SendEmailResponseDto {
    #[serde(default)]
    id: Option<String>,
}

/// Notifier that submits one email per call to a Resend-compatible endpoint.
pub struct ResendMailNotifier {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl ResendMailNotifier {
    /// Build a notifier using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key.into()),
        })
    }
}

#[async_trait]
impl MailNotifier for ResendMailNotifier {
    async fn send(
        &self,
        notification: &MailNotification,
    ) -> Result<NotificationReceipt, MailNotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(notification)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_receipt(body.as_ref())
    }
}

fn parse_receipt(body: &[u8]) -> Result<NotificationReceipt, MailNotifierError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NotificationReceipt::Accepted { provider_id: None });
    }
    let decoded: SendEmailResponseDto = serde_json::from_slice(body)
        .map_err(|error| MailNotifierError::decode(format!("invalid JSON payload: {error}")))?;
    Ok(NotificationReceipt::Accepted {
        provider_id: decoded.id,
    })
}

fn map_transport_error(error: reqwest::Error) -> MailNotifierError {
    if error.is_timeout() {
        MailNotifierError::timeout(error.to_string())
    } else {
        MailNotifierError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailNotifierError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MailNotifierError::timeout(format!("status {}", status.as_u16()))
        }
        _ => {
            let preview = body_preview(body);
            let message = if preview.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_owned()
            } else {
                preview
            };
            MailNotifierError::rejected(status.as_u16(), message)
        }
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let head: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{head}...")
    } else {
        compact
    }
}
