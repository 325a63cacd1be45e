//! Transfer Draft Types
//!
//! The draft is the mutable work-in-progress entity for one transfer
//! attempt. Identity is `(draft_id, revision)`: every field mutation bumps
//! the revision, which is what invalidates any outstanding challenge bound
//! to an earlier shape of the draft.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Draft ID type - ULID-based unique identifier
///
/// ULID gives monotonic, sortable IDs with no coordination. The string
/// form doubles as the gateway idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(ulid::Ulid);

impl DraftId {
    /// Generate a new unique DraftId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DraftId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Draft identity: id plus mutation revision.
///
/// A `ChallengeSession` binds to this value. Editing the draft changes the
/// revision, so a stale session can never authorize the edited draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftIdentity {
    pub draft_id: DraftId,
    pub revision: u64,
}

impl fmt::Display for DraftIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.draft_id, self.revision)
    }
}

/// Inline details for a payee not yet in the payee book.
///
/// Immutable once the draft leaves `Editing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayeeDetails {
    pub name: String,
    /// Expected format: DD-DD-DD
    pub sort_code: String,
    /// Exactly 8 digits
    pub account_number: String,
}

impl NewPayeeDetails {
    /// Structural field checks for the new-payee variant.
    ///
    /// Returns one (field, message) pair per violation so the caller can
    /// report all of them at once.
    pub fn field_errors(&self) -> Vec<(&'static str, String)> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(("newPayeeName", "Payee name must not be empty.".to_string()));
        }

        if !is_valid_sort_code(&self.sort_code) {
            errors.push((
                "newPayeeSortCode",
                format!(
                    "Invalid sort code '{}': expected format XX-XX-XX",
                    self.sort_code
                ),
            ));
        }

        if !is_valid_account_number(&self.account_number) {
            errors.push((
                "newPayeeAccountNumber",
                format!(
                    "Invalid account number '{}': expected exactly 8 digits",
                    self.account_number
                ),
            ));
        }

        errors
    }
}

/// 6 digits grouped 2-2-2: "12-34-56"
fn is_valid_sort_code(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 8
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn is_valid_account_number(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Transfer target: a saved payee or one declared inline.
///
/// The mutual exclusivity the UI enforced by convention (a flat record with
/// two optional blocks) is structural here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayeeRef {
    Existing { payee_id: String },
    New { details: NewPayeeDetails },
}

/// The editable, not-yet-submitted transfer request.
///
/// Created empty when the workflow starts, discarded on cancel or
/// successful submission. Never reused across sessions.
#[derive(Debug, Clone)]
pub struct TransferDraft {
    id: DraftId,
    revision: u64,
    pub source_account_id: Option<String>,
    pub payee: Option<PayeeRef>,
    /// Raw user input; parsed to minor units during validation
    pub amount: Option<String>,
    pub reference: Option<String>,
    /// None means "today" at submission time
    pub scheduled_date: Option<NaiveDate>,
}

impl TransferDraft {
    pub fn new() -> Self {
        Self {
            id: DraftId::new(),
            revision: 0,
            source_account_id: None,
            payee: None,
            amount: None,
            reference: None,
            scheduled_date: None,
        }
    }

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn identity(&self) -> DraftIdentity {
        DraftIdentity {
            draft_id: self.id,
            revision: self.revision,
        }
    }

    // All mutation goes through these setters so the revision can never
    // fall out of step with the fields.

    pub fn set_source_account(&mut self, id: impl Into<String>) {
        self.source_account_id = Some(id.into());
        self.revision += 1;
    }

    pub fn set_existing_payee(&mut self, payee_id: impl Into<String>) {
        self.payee = Some(PayeeRef::Existing {
            payee_id: payee_id.into(),
        });
        self.revision += 1;
    }

    pub fn set_new_payee(&mut self, details: NewPayeeDetails) {
        self.payee = Some(PayeeRef::New { details });
        self.revision += 1;
    }

    pub fn set_amount(&mut self, raw: impl Into<String>) {
        self.amount = Some(raw.into());
        self.revision += 1;
    }

    pub fn set_reference(&mut self, reference: Option<String>) {
        self.reference = reference;
        self.revision += 1;
    }

    pub fn set_scheduled_date(&mut self, date: Option<NaiveDate>) {
        self.scheduled_date = date;
        self.revision += 1;
    }
}

impl Default for TransferDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot handed to the submission gateway.
///
/// Carries the draft-bound idempotency key so the gateway can deduplicate
/// a retry after an ambiguous failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSnapshot {
    pub idempotency_key: String,
    pub source_account_id: String,
    pub payee: PayeeRef,
    pub amount_minor: u64,
    pub reference: Option<String>,
    pub scheduled_date: NaiveDate,
}
