//! Workflow Error Types

use thiserror::Error;

use crate::money::MoneyError;

use super::gateway::GatewayError;
use super::validation::ValidationReport;

/// Errors returned by coordinator operations.
///
/// Validation problems are recoverable in `Editing` and never fatal;
/// wrong-state calls indicate a UI driving the workflow out of order.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("'{action}' is not allowed in state {state}")]
    WrongState {
        state: &'static str,
        action: &'static str,
    },

    #[error("draft failed validation: {0}")]
    DraftInvalid(ValidationReport),

    #[error("draft is missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("unknown payee: {0}")]
    UnknownPayee(String),

    #[error("no active challenge session")]
    NoActiveChallenge,

    #[error("challenge authorization has lapsed; restart from review")]
    AuthorizationLapsed,

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl WorkflowError {
    /// Stable error code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::WrongState { .. } => "WRONG_STATE",
            WorkflowError::DraftInvalid(_) => "DRAFT_INVALID",
            WorkflowError::MissingField(_) => "MISSING_FIELD",
            WorkflowError::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            WorkflowError::UnknownPayee(_) => "UNKNOWN_PAYEE",
            WorkflowError::NoActiveChallenge => "NO_ACTIVE_CHALLENGE",
            WorkflowError::AuthorizationLapsed => "AUTHORIZATION_LAPSED",
            WorkflowError::Money(_) => "INVALID_AMOUNT",
            WorkflowError::Gateway(GatewayError::Rejected(_)) => "GATEWAY_REJECTED",
            WorkflowError::Gateway(GatewayError::Unavailable(_)) => "GATEWAY_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WorkflowError::WrongState {
                state: "REVIEWING",
                action: "set_amount"
            }
            .code(),
            "WRONG_STATE"
        );
        assert_eq!(WorkflowError::NoActiveChallenge.code(), "NO_ACTIVE_CHALLENGE");
        assert_eq!(
            WorkflowError::Gateway(GatewayError::Unavailable("timeout".into())).code(),
            "GATEWAY_UNAVAILABLE"
        );
    }

    #[test]
    fn test_display() {
        let err = WorkflowError::WrongState {
            state: "REVIEWING",
            action: "set_amount",
        };
        assert_eq!(err.to_string(), "'set_amount' is not allowed in state REVIEWING");
    }
}
