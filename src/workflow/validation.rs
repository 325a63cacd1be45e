//! Validation Engine
//!
//! Pure validation of a transfer draft against structural and business
//! rules. No I/O, no side effects; directory membership is checked against
//! the in-memory listings the caller supplies. Every simultaneous
//! violation is reported, keyed by field, never just the first.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate};

use crate::directory::{AccountDirectory, PayeeDirectory};
use crate::money::{self, GBP_DECIMALS};

use super::draft::{PayeeRef, TransferDraft};

/// Maximum length of the optional reference text
pub const MAX_REFERENCE_LEN: usize = 50;

/// Field-keyed validation outcome.
///
/// `BTreeMap` keeps error ordering deterministic for display and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        self.errors.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        let mut first = true;
        for (field, messages) in &self.errors {
            for msg in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, msg)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate a draft against today's date (local clock).
///
/// This is the authoritative check run before the workflow leaves
/// `Editing`; the same function backs per-keystroke feedback.
pub fn validate(
    draft: &TransferDraft,
    accounts: &AccountDirectory,
    payees: &PayeeDirectory,
) -> ValidationReport {
    validate_at(draft, accounts, payees, Local::now().date_naive())
}

/// Validate a draft against an explicit "today" (pure, for tests).
pub fn validate_at(
    draft: &TransferDraft,
    accounts: &AccountDirectory,
    payees: &PayeeDirectory,
    today: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    // Source account: present and known
    match &draft.source_account_id {
        None => report.push("sourceAccount", "Please select a source account."),
        Some(id) if id.is_empty() => {
            report.push("sourceAccount", "Please select a source account.")
        }
        Some(id) => {
            if !accounts.contains(id) {
                report.push("sourceAccount", format!("Unknown account: {}", id));
            }
        }
    }

    // Payee: existing id must resolve, new details must be structurally sound
    match &draft.payee {
        None => report.push("payee", "Please select a payee."),
        Some(PayeeRef::Existing { payee_id }) => {
            if payee_id.is_empty() {
                report.push("payee", "Please select a payee.");
            } else if !payees.contains(payee_id) {
                report.push("payee", format!("Unknown payee: {}", payee_id));
            }
        }
        Some(PayeeRef::New { details }) => {
            for (field, message) in details.field_errors() {
                report.push(field, message);
            }
        }
    }

    // Amount: must parse as a positive number; never a crash
    match &draft.amount {
        None => report.push("amount", "Amount is required."),
        Some(raw) => {
            if let Err(e) = money::parse_amount(raw, GBP_DECIMALS) {
                report.push("amount", e.to_string());
            }
        }
    }

    // Reference: optional, bounded length
    if let Some(reference) = &draft.reference {
        if reference.len() > MAX_REFERENCE_LEN {
            report.push(
                "reference",
                format!("Reference is too long (max {} characters).", MAX_REFERENCE_LEN),
            );
        }
    }

    // Scheduled date: time-of-day is ignored; only the day matters
    if let Some(date) = draft.scheduled_date {
        if date < today {
            report.push("transferDate", "Transfer date must not be in the past.");
        }
    }

    report
}
