//! Black-box property checks against the public crate API.
//!
//! Everything here drives the workflow the way an embedding UI would:
//! through the coordinator and the published challenge-session surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use transfer_gate::workflow::gateway::AcceptAllGateway;
use transfer_gate::{
    AccountDirectory, AccountRecord, ChallengeConfig, ChallengeSession, PayeeDirectory,
    PayeeRecord, TransferDraft, TransferWorkflow, VerifyResult, WorkflowState,
};

fn directories() -> (Arc<AccountDirectory>, Arc<PayeeDirectory>) {
    let accounts = AccountDirectory::from_records([AccountRecord {
        id: "acc123".to_string(),
        label: "Current Account".to_string(),
        balance_minor: 125_075,
    }]);
    let payees = PayeeDirectory::from_records([PayeeRecord {
        id: "payee1".to_string(),
        name: "John Doe - Savings".to_string(),
    }]);
    (Arc::new(accounts), Arc::new(payees))
}

fn workflow() -> TransferWorkflow {
    let (accounts, payees) = directories();
    TransferWorkflow::new(
        accounts,
        payees,
        Arc::new(AcceptAllGateway),
        ChallengeConfig::default(),
        "£",
    )
}

#[test]
fn non_positive_amounts_never_leave_editing() {
    for bad in ["0", "0.00", "-1", "-50.00"] {
        let mut wf = workflow();
        wf.set_source_account("acc123").unwrap();
        wf.set_existing_payee("payee1").unwrap();
        wf.set_amount(bad).unwrap();

        assert!(wf.submit_for_review().is_err(), "amount {} accepted", bad);
        assert_eq!(*wf.state(), WorkflowState::Editing);
    }
}

#[test]
fn confirmed_drafts_cannot_be_mutated_in_place() {
    let mut wf = workflow();
    wf.set_source_account("acc123").unwrap();
    wf.set_existing_payee("payee1").unwrap();
    wf.set_amount("50.00").unwrap();
    wf.submit_for_review().unwrap();

    assert!(wf.set_amount("9999.00").is_err());
    assert!(wf.set_source_account("acc123").is_err());

    // Only the explicit route back re-opens the draft
    wf.edit_details().unwrap();
    wf.set_amount("60.00").unwrap();
}

#[test]
fn three_wrong_codes_then_exhausted() {
    let draft = TransferDraft::new();
    let session = ChallengeSession::with_code(
        "123456".to_string(),
        draft.identity(),
        &ChallengeConfig::default(),
    );

    for _ in 0..3 {
        assert_eq!(
            session.verify_now("654321", draft.identity()),
            VerifyResult::Rejected
        );
    }
    assert_eq!(
        session.verify_now("123456", draft.identity()),
        VerifyResult::Exhausted
    );
}

#[test]
fn accepted_session_never_accepts_twice() {
    let draft = TransferDraft::new();
    let session = ChallengeSession::with_code(
        "123456".to_string(),
        draft.identity(),
        &ChallengeConfig::default(),
    );

    assert_eq!(
        session.verify_now("123456", draft.identity()),
        VerifyResult::Accepted
    );
    assert_ne!(
        session.verify_now("123456", draft.identity()),
        VerifyResult::Accepted
    );
}

#[test]
fn expired_session_consumes_no_attempts() {
    let draft = TransferDraft::new();
    let session = ChallengeSession::with_code(
        "123456".to_string(),
        draft.identity(),
        &ChallengeConfig::default(),
    );

    let after_expiry = session.expires_at() + Duration::from_secs(5);
    assert_eq!(
        session.verify("123456", draft.identity(), after_expiry),
        VerifyResult::Expired
    );
    assert_eq!(session.attempts_remaining(), 3);
}

#[tokio::test]
async fn end_to_end_happy_path() {
    let mut wf = workflow();
    wf.set_source_account("acc123").unwrap();
    wf.set_existing_payee("payee1").unwrap();
    wf.set_amount("50.00").unwrap();
    wf.set_reference(Some("rent".to_string())).unwrap();
    wf.set_scheduled_date(Some(Local::now().date_naive()))
        .unwrap();

    let summary = wf.submit_for_review().unwrap();
    assert_eq!(summary.amount, "£50.00");

    let session = wf.confirm().unwrap();
    let code = session.code().to_string();
    assert_eq!(wf.verify_code(&code).unwrap(), VerifyResult::Accepted);

    let receipt = wf.submit_transfer().await.unwrap();
    assert!(!receipt.receipt_id.is_empty());
    assert_eq!(*wf.state(), WorkflowState::Succeeded);
    assert!(wf.draft().amount.is_none());
}
