//! Workflow Coordinator
//!
//! Owns the draft and the state machine for one transfer attempt and
//! drives every transition. All draft mutation funnels through here so
//! the stage gates can never be skipped: a draft only reaches the
//! gateway after passing review and a successful challenge bound to its
//! exact identity in that attempt.

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::ChallengeConfig;
use crate::directory::{AccountDirectory, PayeeDirectory};
use crate::money::{self, GBP_DECIMALS};

use super::challenge::{ChallengeSession, VerifyResult};
use super::draft::{DraftIdentity, NewPayeeDetails, TransferDraft, TransferSnapshot};
use super::error::WorkflowError;
use super::gateway::{SubmissionGateway, SubmissionReceipt};
use super::state::{FailureReason, WorkflowState};
use super::summary::TransferSummary;
use super::validation::{self, ValidationReport};

/// Proof that a challenge was accepted for a specific draft identity.
///
/// Valid only within the originating session's expiry window; a gateway
/// retry after that window needs a fresh challenge.
#[derive(Debug, Clone, Copy)]
struct Authorization {
    identity: DraftIdentity,
    expires_at: Instant,
}

impl Authorization {
    fn covers(&self, identity: DraftIdentity, now: Instant) -> bool {
        self.identity == identity && now <= self.expires_at
    }
}

/// Single-session transfer workflow: draft store plus state machine.
pub struct TransferWorkflow {
    state: WorkflowState,
    draft: TransferDraft,
    accounts: Arc<AccountDirectory>,
    payees: Arc<PayeeDirectory>,
    gateway: Arc<dyn SubmissionGateway>,
    challenge_config: ChallengeConfig,
    currency_symbol: String,
    challenge: Option<Arc<ChallengeSession>>,
    authorization: Option<Authorization>,
}

impl TransferWorkflow {
    pub fn new(
        accounts: Arc<AccountDirectory>,
        payees: Arc<PayeeDirectory>,
        gateway: Arc<dyn SubmissionGateway>,
        challenge_config: ChallengeConfig,
        currency_symbol: impl Into<String>,
    ) -> Self {
        let draft = TransferDraft::new();
        info!(draft_id = %draft.id(), "workflow started");
        Self {
            state: WorkflowState::Editing,
            draft,
            accounts,
            payees,
            gateway,
            challenge_config,
            currency_symbol: currency_symbol.into(),
            challenge: None,
            authorization: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn draft(&self) -> &TransferDraft {
        &self.draft
    }

    fn wrong_state(&self, action: &'static str) -> WorkflowError {
        WorkflowError::WrongState {
            state: self.state.as_str(),
            action,
        }
    }

    fn edit_gate(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.state.allows_editing() {
            Ok(())
        } else {
            warn!(state = %self.state, action, "draft mutation refused outside EDITING");
            Err(self.wrong_state(action))
        }
    }

    // ========================================================================
    // Editing: field-by-field draft mutation
    // ========================================================================

    pub fn set_source_account(&mut self, id: impl Into<String>) -> Result<(), WorkflowError> {
        self.edit_gate("set_source_account")?;
        self.draft.set_source_account(id);
        Ok(())
    }

    pub fn set_existing_payee(&mut self, payee_id: impl Into<String>) -> Result<(), WorkflowError> {
        self.edit_gate("set_existing_payee")?;
        self.draft.set_existing_payee(payee_id);
        Ok(())
    }

    pub fn set_new_payee(&mut self, details: NewPayeeDetails) -> Result<(), WorkflowError> {
        self.edit_gate("set_new_payee")?;
        self.draft.set_new_payee(details);
        Ok(())
    }

    pub fn set_amount(&mut self, raw: impl Into<String>) -> Result<(), WorkflowError> {
        self.edit_gate("set_amount")?;
        self.draft.set_amount(raw);
        Ok(())
    }

    pub fn set_reference(&mut self, reference: Option<String>) -> Result<(), WorkflowError> {
        self.edit_gate("set_reference")?;
        self.draft.set_reference(reference);
        Ok(())
    }

    pub fn set_scheduled_date(
        &mut self,
        date: Option<chrono::NaiveDate>,
    ) -> Result<(), WorkflowError> {
        self.edit_gate("set_scheduled_date")?;
        self.draft.set_scheduled_date(date);
        Ok(())
    }

    /// Per-keystroke feedback; callable in any state, mutates nothing.
    pub fn check(&self) -> ValidationReport {
        validation::validate(&self.draft, &self.accounts, &self.payees)
    }

    // ========================================================================
    // Editing → Reviewing
    // ========================================================================

    /// Authoritative validation gate. On success the workflow enters
    /// `Reviewing` and returns the summary for human approval; on failure
    /// it stays in `Editing` with every field error attached.
    pub fn submit_for_review(&mut self) -> Result<TransferSummary, WorkflowError> {
        if self.state != WorkflowState::Editing {
            return Err(self.wrong_state("submit_for_review"));
        }

        let report = self.check();
        if !report.is_valid() {
            debug!(draft_id = %self.draft.id(), errors = report.error_count(), "validation failed");
            return Err(WorkflowError::DraftInvalid(report));
        }

        let summary = TransferSummary::project(
            &self.draft,
            &self.accounts,
            &self.payees,
            &self.currency_symbol,
        )?;

        self.state = WorkflowState::Reviewing;
        info!(draft_id = %self.draft.id(), "draft validated, entering review");
        Ok(summary)
    }

    /// Back to the form; the draft is preserved untouched.
    pub fn edit_details(&mut self) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Reviewing {
            return Err(self.wrong_state("edit_details"));
        }
        self.state = WorkflowState::Editing;
        Ok(())
    }

    // ========================================================================
    // Reviewing → AwaitingChallenge
    // ========================================================================

    /// User approved the summary. Issues a fresh OTP challenge bound to
    /// the draft's current identity, invalidating any prior session, and
    /// returns the session for the delivery channel.
    pub fn confirm(&mut self) -> Result<Arc<ChallengeSession>, WorkflowError> {
        if self.state != WorkflowState::Reviewing {
            return Err(self.wrong_state("confirm"));
        }
        Ok(self.issue_challenge())
    }

    /// Resend: a fresh session with reset attempts and expiry. The old
    /// session is dropped by the workflow and can no longer authorize it.
    pub fn resend_code(&mut self) -> Result<Arc<ChallengeSession>, WorkflowError> {
        if self.state != WorkflowState::AwaitingChallenge {
            return Err(self.wrong_state("resend_code"));
        }
        Ok(self.issue_challenge())
    }

    fn issue_challenge(&mut self) -> Arc<ChallengeSession> {
        let session = Arc::new(ChallengeSession::issue(
            self.draft.identity(),
            &self.challenge_config,
        ));
        self.challenge = Some(Arc::clone(&session));
        self.state = WorkflowState::AwaitingChallenge;
        info!(draft_id = %self.draft.id(), "challenge issued, awaiting code");
        session
    }

    #[cfg(test)]
    pub(crate) fn confirm_with_code(
        &mut self,
        code: &str,
    ) -> Result<Arc<ChallengeSession>, WorkflowError> {
        if self.state != WorkflowState::Reviewing {
            return Err(self.wrong_state("confirm"));
        }
        let session = Arc::new(ChallengeSession::with_code(
            code.to_string(),
            self.draft.identity(),
            &self.challenge_config,
        ));
        self.challenge = Some(Arc::clone(&session));
        self.state = WorkflowState::AwaitingChallenge;
        Ok(session)
    }

    // ========================================================================
    // AwaitingChallenge → Submitting | Failed
    // ========================================================================

    /// One user re-submission is one verify call; nothing is retried
    /// automatically.
    pub fn verify_code(&mut self, submitted: &str) -> Result<VerifyResult, WorkflowError> {
        if self.state != WorkflowState::AwaitingChallenge {
            return Err(self.wrong_state("verify_code"));
        }
        let session = self
            .challenge
            .as_ref()
            .cloned()
            .ok_or(WorkflowError::NoActiveChallenge)?;

        let result = session.verify_now(submitted, self.draft.identity());
        match result {
            VerifyResult::Accepted => {
                self.authorization = Some(Authorization {
                    identity: self.draft.identity(),
                    expires_at: session.expires_at(),
                });
                self.challenge = None;
                self.state = WorkflowState::Submitting;
                info!(draft_id = %self.draft.id(), "challenge accepted");
            }
            VerifyResult::Rejected => {
                debug!(draft_id = %self.draft.id(), "challenge code rejected");
            }
            VerifyResult::Exhausted => {
                self.challenge = None;
                self.state = WorkflowState::Failed(FailureReason::ChallengeExhausted);
                warn!(draft_id = %self.draft.id(), "challenge exhausted");
            }
            VerifyResult::Expired => {
                self.challenge = None;
                self.state = WorkflowState::Failed(FailureReason::ChallengeExpired);
                warn!(draft_id = %self.draft.id(), "challenge expired");
            }
            VerifyResult::AlreadyUsed => {
                warn!(draft_id = %self.draft.id(), "verify against consumed session");
            }
        }
        Ok(result)
    }

    /// User backed out of the challenge. Draft is preserved so the
    /// attempt can restart from review.
    pub fn cancel_challenge(&mut self) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::AwaitingChallenge {
            return Err(self.wrong_state("cancel_challenge"));
        }
        self.challenge = None;
        self.state = WorkflowState::Failed(FailureReason::UserCancelled);
        info!(draft_id = %self.draft.id(), "challenge cancelled by user");
        Ok(())
    }

    // ========================================================================
    // Submitting → Succeeded | Failed
    // ========================================================================

    /// Hand the authorized snapshot to the gateway. At-most-once intent:
    /// on an ambiguous failure nothing is re-invoked here; the user must
    /// explicitly retry.
    pub async fn submit_transfer(&mut self) -> Result<SubmissionReceipt, WorkflowError> {
        if self.state != WorkflowState::Submitting {
            return Err(self.wrong_state("submit_transfer"));
        }

        // The gateway is never called without an accepted challenge bound
        // to this exact draft identity.
        let authorized = self
            .authorization
            .map(|auth| auth.identity == self.draft.identity())
            .unwrap_or(false);
        if !authorized {
            return Err(WorkflowError::AuthorizationLapsed);
        }

        let snapshot = self.snapshot()?;
        match self.gateway.submit(&snapshot).await {
            Ok(receipt) => {
                info!(
                    draft_id = %self.draft.id(),
                    receipt_id = %receipt.receipt_id,
                    "transfer submitted"
                );
                // One-shot: the draft is discarded and never reused
                self.draft = TransferDraft::new();
                self.authorization = None;
                self.state = WorkflowState::Succeeded;
                Ok(receipt)
            }
            Err(e) => {
                warn!(draft_id = %self.draft.id(), error = %e, "gateway submission failed");
                match &e {
                    super::gateway::GatewayError::Rejected(reason) => {
                        // Definite outcome: the authorization is spent
                        self.authorization = None;
                        self.state =
                            WorkflowState::Failed(FailureReason::GatewayRejected(reason.clone()));
                    }
                    super::gateway::GatewayError::Unavailable(reason) => {
                        // Ambiguous outcome: keep the authorization so an
                        // explicit retry within its window can skip a
                        // second challenge
                        self.state = WorkflowState::Failed(FailureReason::GatewayUnavailable(
                            reason.clone(),
                        ));
                    }
                }
                Err(e.into())
            }
        }
    }

    fn snapshot(&self) -> Result<TransferSnapshot, WorkflowError> {
        let source_account_id = self
            .draft
            .source_account_id
            .clone()
            .ok_or(WorkflowError::MissingField("sourceAccount"))?;
        let payee = self
            .draft
            .payee
            .clone()
            .ok_or(WorkflowError::MissingField("payee"))?;
        let raw_amount = self
            .draft
            .amount
            .as_deref()
            .ok_or(WorkflowError::MissingField("amount"))?;
        let amount_minor = money::parse_amount(raw_amount, GBP_DECIMALS)?;

        Ok(TransferSnapshot {
            idempotency_key: self.draft.id().to_string(),
            source_account_id,
            payee,
            amount_minor,
            reference: self.draft.reference.clone(),
            scheduled_date: self
                .draft
                .scheduled_date
                .unwrap_or_else(|| Local::now().date_naive()),
        })
    }

    // ========================================================================
    // Failed → Reviewing | Submitting | Editing
    // ========================================================================

    /// Retry the attempt from review without re-entering any data.
    pub fn retry_from_review(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Failed(_) => {
                self.challenge = None;
                self.state = WorkflowState::Reviewing;
                info!(draft_id = %self.draft.id(), "retrying from review");
                Ok(())
            }
            _ => Err(self.wrong_state("retry_from_review")),
        }
    }

    /// Explicit re-confirmation after an ambiguous gateway failure.
    ///
    /// Allowed only while the accepted challenge is still within its
    /// validity window; otherwise the attempt must restart from review
    /// and take a fresh challenge.
    pub fn retry_submission(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            WorkflowState::Failed(FailureReason::GatewayUnavailable(_)) => {
                let valid = self
                    .authorization
                    .map(|auth| auth.covers(self.draft.identity(), Instant::now()))
                    .unwrap_or(false);
                if !valid {
                    self.authorization = None;
                    return Err(WorkflowError::AuthorizationLapsed);
                }
                self.state = WorkflowState::Submitting;
                info!(draft_id = %self.draft.id(), "retrying submission under existing authorization");
                Ok(())
            }
            _ => Err(self.wrong_state("retry_submission")),
        }
    }

    /// Discard the draft and start over with an empty one. Allowed from
    /// any state; this is the "abandon" exit from a failure as well as a
    /// plain cancel while editing.
    pub fn abandon(&mut self) {
        info!(draft_id = %self.draft.id(), state = %self.state, "workflow abandoned");
        self.draft = TransferDraft::new();
        self.challenge = None;
        self.authorization = None;
        self.state = WorkflowState::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::demo_directories;
    use crate::workflow::gateway::MockGateway;

    fn harness() -> (TransferWorkflow, Arc<MockGateway>) {
        let (accounts, payees) = demo_directories();
        let gateway = Arc::new(MockGateway::new());
        let workflow = TransferWorkflow::new(
            Arc::new(accounts),
            Arc::new(payees),
            gateway.clone(),
            ChallengeConfig::default(),
            "£",
        );
        (workflow, gateway)
    }

    fn fill_valid(workflow: &mut TransferWorkflow) {
        workflow.set_source_account("acc123").unwrap();
        workflow.set_existing_payee("payee1").unwrap();
        workflow.set_amount("50.00").unwrap();
        workflow.set_reference(Some("rent".to_string())).unwrap();
    }

    #[test]
    fn test_invalid_draft_cannot_leave_editing() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.set_amount("-5").unwrap();

        let err = workflow.submit_for_review().unwrap_err();
        assert_eq!(err.code(), "DRAFT_INVALID");
        assert_eq!(*workflow.state(), WorkflowState::Editing);

        if let WorkflowError::DraftInvalid(report) = err {
            assert!(!report.errors_for("amount").is_empty());
        } else {
            panic!("expected DraftInvalid");
        }
    }

    #[test]
    fn test_mutation_refused_outside_editing() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();
        assert_eq!(*workflow.state(), WorkflowState::Reviewing);

        let err = workflow.set_amount("9999.99").unwrap_err();
        assert_eq!(err.code(), "WRONG_STATE");

        // Returning to editing re-opens the draft
        workflow.edit_details().unwrap();
        workflow.set_amount("60.00").unwrap();
        assert_eq!(workflow.draft().amount.as_deref(), Some("60.00"));
    }

    #[test]
    fn test_edit_details_preserves_draft() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();
        workflow.edit_details().unwrap();

        assert_eq!(workflow.draft().source_account_id.as_deref(), Some("acc123"));
        assert_eq!(workflow.draft().amount.as_deref(), Some("50.00"));
    }

    #[test]
    fn test_confirm_requires_review() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        let err = workflow.confirm().unwrap_err();
        assert_eq!(err.code(), "WRONG_STATE");
    }

    #[test]
    fn test_verify_requires_challenge_state() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        let err = workflow.verify_code("123456").unwrap_err();
        assert_eq!(err.code(), "WRONG_STATE");
    }

    #[tokio::test]
    async fn test_submit_requires_accepted_challenge() {
        let (mut workflow, gateway) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();

        // Jumping straight to submission from review is a wrong-state call
        let err = workflow.submit_transfer().await.unwrap_err();
        assert_eq!(err.code(), "WRONG_STATE");
        assert_eq!(gateway.submit_count(), 0);
    }

    #[test]
    fn test_resend_resets_attempts() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();
        let first = workflow.confirm().unwrap();

        // Burn two attempts on the first session
        workflow.verify_code("000000").unwrap();
        workflow.verify_code("000000").unwrap();
        assert_eq!(first.attempts_remaining(), 1);

        let second = workflow.resend_code().unwrap();
        assert_eq!(second.attempts_remaining(), 3);

        // The replaced session can no longer drive the workflow: even its
        // correct code is judged against the new session
        let result = workflow.verify_code(first.code()).unwrap();
        if first.code() != second.code() {
            assert_eq!(result, VerifyResult::Rejected);
        }
    }

    #[test]
    fn test_cancel_challenge_preserves_draft() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();
        workflow.confirm().unwrap();
        workflow.cancel_challenge().unwrap();

        assert_eq!(
            *workflow.state(),
            WorkflowState::Failed(FailureReason::UserCancelled)
        );
        assert_eq!(workflow.draft().amount.as_deref(), Some("50.00"));

        // Restart from review is the designated exit
        workflow.retry_from_review().unwrap();
        assert_eq!(*workflow.state(), WorkflowState::Reviewing);
    }

    #[test]
    fn test_retry_submission_only_after_outage() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        workflow.submit_for_review().unwrap();
        workflow.confirm().unwrap();
        workflow.cancel_challenge().unwrap();

        // UserCancelled is not an ambiguous gateway outcome
        let err = workflow.retry_submission().unwrap_err();
        assert_eq!(err.code(), "WRONG_STATE");
    }

    #[test]
    fn test_abandon_discards_draft() {
        let (mut workflow, _) = harness();
        fill_valid(&mut workflow);
        let old_id = workflow.draft().id();
        workflow.submit_for_review().unwrap();
        workflow.confirm().unwrap();
        workflow.cancel_challenge().unwrap();

        workflow.abandon();
        assert_eq!(*workflow.state(), WorkflowState::Editing);
        assert!(workflow.draft().source_account_id.is_none());
        assert_ne!(workflow.draft().id(), old_id);
    }
}
