//! Submission Gateway Seam
//!
//! The gateway is the external system of record that actually moves
//! funds. The core only defines the contract it is called with: a
//! validated, challenge-backed snapshot in, a receipt or a typed failure
//! out. Submission is at-most-once-intent - the snapshot carries a
//! draft-bound idempotency key and the coordinator never re-invokes the
//! gateway without explicit user re-confirmation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::draft::TransferSnapshot;

/// Typed gateway failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway refused the transfer; the reason is shown to the user
    /// verbatim (insufficient funds, limits, sanctions hold, ...)
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// The gateway was unreachable or the outcome is ambiguous
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Success receipt from the system of record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub receipt_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Contract for the external transfer executor.
///
/// Implementations must honor the snapshot's `idempotency_key`: a resend
/// after an ambiguous failure must not move funds twice.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Gateway name for logging
    fn name(&self) -> &'static str;

    async fn submit(&self, snapshot: &TransferSnapshot) -> Result<SubmissionReceipt, GatewayError>;
}

/// Always-succeeding gateway for demos and local runs.
pub struct AcceptAllGateway;

#[async_trait]
impl SubmissionGateway for AcceptAllGateway {
    fn name(&self) -> &'static str {
        "accept-all"
    }

    async fn submit(&self, snapshot: &TransferSnapshot) -> Result<SubmissionReceipt, GatewayError> {
        let now = chrono::Utc::now().timestamp_millis();
        Ok(SubmissionReceipt {
            receipt_id: format!("rcpt-{}", snapshot.idempotency_key),
            timestamp: now,
        })
    }
}


#[cfg(test)]
pub use mock::MockGateway;
