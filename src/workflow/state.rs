//! Workflow State Definitions
//!
//! The authorization flow is an explicit tagged union, not a set of
//! visibility flags. Every transition is handled exhaustively by the
//! coordinator; contradictory positions ("reviewing" and "awaiting
//! challenge" at once) are unrepresentable.

use std::fmt;

/// Terminal failure reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// All OTP attempts consumed; a fresh challenge must be requested
    ChallengeExhausted,
    /// OTP session lapsed before a correct code arrived
    ChallengeExpired,
    /// User backed out of the challenge
    UserCancelled,
    /// Gateway refused the transfer; reason is surfaced verbatim
    GatewayRejected(String),
    /// Gateway unreachable or timed out; outcome ambiguous
    GatewayUnavailable(String),
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ChallengeExhausted => "CHALLENGE_EXHAUSTED",
            FailureReason::ChallengeExpired => "CHALLENGE_EXPIRED",
            FailureReason::UserCancelled => "USER_CANCELLED",
            FailureReason::GatewayRejected(_) => "GATEWAY_REJECTED",
            FailureReason::GatewayUnavailable(_) => "GATEWAY_UNAVAILABLE",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GatewayRejected(r) => write!(f, "GATEWAY_REJECTED: {}", r),
            FailureReason::GatewayUnavailable(r) => write!(f, "GATEWAY_UNAVAILABLE: {}", r),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Workflow state machine position
///
/// ```text
/// EDITING → REVIEWING → AWAITING_CHALLENGE → SUBMITTING → SUCCEEDED
///    ↑          ↑↓              ↓                 ↓
///    └────── (edit)        FAILED(..) ←──────────┘
/// ```
///
/// `Succeeded` is one-shot. `Failed` keeps the draft so the user can
/// retry from `Reviewing` or abandon back to an empty `Editing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Draft is open for field-by-field mutation
    Editing,
    /// Draft validated; summary shown for human approval
    Reviewing,
    /// OTP challenge outstanding for the confirmed draft
    AwaitingChallenge,
    /// Challenge accepted; gateway call in flight
    Submitting,
    /// Terminal: gateway confirmed the transfer, draft discarded
    Succeeded,
    /// Terminal: named failure; draft preserved for retry
    Failed(FailureReason),
}

impl WorkflowState {
    /// Check if this is a terminal state (no forward transitions)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded | WorkflowState::Failed(_))
    }

    /// Check if the draft may still be mutated in this state
    #[inline]
    pub fn allows_editing(&self) -> bool {
        matches!(self, WorkflowState::Editing)
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Editing => "EDITING",
            WorkflowState::Reviewing => "REVIEWING",
            WorkflowState::AwaitingChallenge => "AWAITING_CHALLENGE",
            WorkflowState::Submitting => "SUBMITTING",
            WorkflowState::Succeeded => "SUCCEEDED",
            WorkflowState::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Failed(reason) => write!(f, "FAILED({})", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
