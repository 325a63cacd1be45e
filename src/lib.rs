//! transfer-gate - Funds-Transfer Authorization Core
//!
//! The control-flow heart of a banking transfer UI: a draft is validated,
//! summarized for human approval, gated behind a one-time-password
//! challenge, and only then handed to the external submission gateway.
//!
//! # Modules
//!
//! - [`config`] - YAML application config (logging, challenge policy)
//! - [`logging`] - tracing subscriber setup
//! - [`money`] - minor-unit amount parsing and formatting
//! - [`directory`] - account listing and payee book collaborators
//! - [`workflow`] - draft, state machine, validation, challenge, gateway

pub mod config;
pub mod directory;
pub mod logging;
pub mod money;
pub mod workflow;

// Convenient re-exports at crate root
pub use config::{AppConfig, ChallengeConfig};
pub use directory::{AccountDirectory, AccountRecord, PayeeDirectory, PayeeRecord};
pub use workflow::{
    ChallengeSession, DraftId, FailureReason, GatewayError, NewPayeeDetails, PayeeRef,
    SubmissionGateway, SubmissionReceipt, TransferDraft, TransferSummary, TransferWorkflow,
    ValidationReport, VerifyResult, WorkflowError, WorkflowState,
};
