// # Log Mail Transport
//
// Development implementation of MailTransport that logs instead of
// delivering. The real gateway-backed transport lives in the
// signup-mailer-http crate; this one is for local runs and tests
// where no mailer is reachable.

use async_trait::async_trait;

use crate::Error;
use crate::traits::mail_transport::MailTransport;

/// Mail transport that logs deliveries instead of performing them.
///
/// The token value itself is never logged, only its length.
#[derive(Debug, Clone, Default)]
pub struct LogMailTransport;

impl LogMailTransport {
    /// Create a new log-only transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send_token(&self, student_id: &str, token: &str) -> Result<(), Error> {
        tracing::info!(
            "log mail transport: would deliver {}-char token to student {}",
            token.len(),
            student_id
        );
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "log"
    }
}
