// # Mail Transport Trait
//
// Defines the interface for out-of-band token delivery.
//
// ## Purpose
//
// After a student confirms their identity, the currently stored token
// is delivered to their institutional address. Resolving the student
// id to an address is the transport's responsibility; this core only
// hands over the id and the token.
//
// ## Implementations
//
// - HTTP gateway: forwards the delivery request to an external mailer
// - Log-only: development transport that logs instead of delivering

use async_trait::async_trait;

/// Trait for mail transport implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver a token to the student's institutional address
    ///
    /// # Parameters
    ///
    /// - `student_id`: The student whose address to resolve
    /// - `token`: The currently stored token to deliver
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Delivery accepted by the transport
    /// - `Err(Error)`: Delivery failed; surfaced to the caller as a
    ///   dispatch failure, no token state changes
    async fn send_token(&self, student_id: &str, token: &str) -> Result<(), crate::Error>;

    /// Human-readable transport name for logging
    fn transport_name(&self) -> &str;
}
