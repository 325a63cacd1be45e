//! Transfer Authorization Workflow
//!
//! The one place in the product where real control flow lives: a transfer
//! draft is validated, summarized for human approval, gated behind an OTP
//! challenge, and only then handed to the gateway.
//!
//! # State Machine
//!
//! ```text
//! EDITING → REVIEWING → AWAITING_CHALLENGE → SUBMITTING → SUCCEEDED
//!    ↑          ↑↓              ↓                 ↓
//!    └────── (edit)        FAILED(..) ←──────────┘
//! ```
//!
//! # Safety Invariants
//!
//! 1. **No stage skipping**: `Submitting` is reachable only through review
//!    and an accepted challenge in the same attempt
//! 2. **Identity binding**: a challenge authorizes one `(draft, revision)`;
//!    any edit strands it
//! 3. **Single-use acceptance**: an accepted session never accepts again
//! 4. **At-most-once intent**: ambiguous gateway failures are never
//!    retried without explicit user re-confirmation

pub mod challenge;
pub mod coordinator;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod state;
pub mod summary;
pub mod validation;


// Re-exports for convenience
pub use challenge::{ChallengeSession, VerifyResult, CODE_LEN};
pub use coordinator::TransferWorkflow;
pub use draft::{DraftId, DraftIdentity, NewPayeeDetails, PayeeRef, TransferDraft, TransferSnapshot};
pub use error::WorkflowError;
pub use gateway::{AcceptAllGateway, GatewayError, SubmissionGateway, SubmissionReceipt};
pub use state::{FailureReason, WorkflowState};
pub use summary::TransferSummary;
pub use validation::{validate, validate_at, ValidationReport, MAX_REFERENCE_LEN};
