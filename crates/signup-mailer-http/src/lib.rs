// # HTTP Mail Gateway Transport
//
// This crate provides a MailTransport that forwards token delivery
// requests to an external HTTP mail gateway.
//
// ## Purpose
//
// The mail-transport mechanism is an external collaborator: resolving
// a student id to an institutional address and speaking SMTP is the
// gateway's job. This transport only posts the delivery request and
// reports whether the gateway accepted it.
//
// ## Wire Format
//
// ```json
// POST <endpoint>
// { "StudentId": "123456", "Token": "…" }
// ```
//
// Any non-2xx gateway response is a dispatch failure; the caller
// surfaces it without changing token state.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use signup_core::traits::MailTransport;
use signup_core::{Error, Result};

/// Default request timeout for gateway calls
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Delivery request body posted to the gateway
#[derive(Debug, Serialize)]
struct DeliveryRequest<'a> {
    #[serde(rename = "StudentId")]
    student_id: &'a str,
    #[serde(rename = "Token")]
    token: &'a str,
}

/// Mail transport backed by an external HTTP gateway
pub struct HttpMailTransport {
    /// Gateway endpoint delivery requests are posted to
    endpoint: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpMailTransport {
    /// Create a new gateway transport
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Gateway URL (e.g., "https://mailer.internal/send")
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create with a custom request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send_token(&self, student_id: &str, token: &str) -> Result<()> {
        let request = DeliveryRequest { student_id, token };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::dispatch(format!("mail gateway unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Body may carry a gateway diagnostic; keep it short
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(200).collect();
            return Err(Error::dispatch(format!(
                "mail gateway rejected delivery for student {}: {} {}",
                student_id, status, detail
            )));
        }

        tracing::debug!("mail gateway accepted delivery for student {}", student_id);
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "http"
    }
}
