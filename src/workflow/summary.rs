//! Confirmation Stage
//!
//! Pure projection of a validated draft into the read-only summary the
//! user approves before the challenge. No mutation, and no silent
//! defaults that change financial meaning: a missing amount is an error
//! here, never a zero.

use std::fmt;

use chrono::{Local, NaiveDate};

use crate::directory::{AccountDirectory, PayeeDirectory};
use crate::money::{self, GBP_DECIMALS};

use super::draft::{PayeeRef, TransferDraft};
use super::error::WorkflowError;

/// Human-readable summary of a validated draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// Resolved source account label
    pub from: String,
    /// Resolved payee name (saved) or declared name (new)
    pub to: String,
    /// Present only for a new payee
    pub new_payee_sort_code: Option<String>,
    /// Present only for a new payee
    pub new_payee_account_number: Option<String>,
    /// Formatted with currency symbol and grouping, e.g. "£1,250.75"
    pub amount: String,
    /// Reference text or "N/A"
    pub reference: String,
    /// Long-form date, e.g. "27 August 2026"
    pub date: String,
}

impl TransferSummary {
    /// Derive the summary. Fails on unresolved references or missing
    /// required fields instead of substituting defaults.
    pub fn project(
        draft: &TransferDraft,
        accounts: &AccountDirectory,
        payees: &PayeeDirectory,
        currency_symbol: &str,
    ) -> Result<Self, WorkflowError> {
        Self::project_at(draft, accounts, payees, currency_symbol, Local::now().date_naive())
    }

    /// Pure variant with an explicit "today" for the date default.
    pub fn project_at(
        draft: &TransferDraft,
        accounts: &AccountDirectory,
        payees: &PayeeDirectory,
        currency_symbol: &str,
        today: NaiveDate,
    ) -> Result<Self, WorkflowError> {
        let source_id = draft
            .source_account_id
            .as_deref()
            .ok_or(WorkflowError::MissingField("sourceAccount"))?;
        let from = accounts
            .label_of(source_id)
            .ok_or_else(|| WorkflowError::UnknownAccount(source_id.to_string()))?
            .to_string();

        let payee = draft
            .payee
            .as_ref()
            .ok_or(WorkflowError::MissingField("payee"))?;
        let (to, new_payee_sort_code, new_payee_account_number) = match payee {
            PayeeRef::Existing { payee_id } => {
                let name = payees
                    .name_of(payee_id)
                    .ok_or_else(|| WorkflowError::UnknownPayee(payee_id.to_string()))?;
                (name.to_string(), None, None)
            }
            PayeeRef::New { details } => (
                details.name.clone(),
                Some(details.sort_code.clone()),
                Some(details.account_number.clone()),
            ),
        };

        let raw_amount = draft
            .amount
            .as_deref()
            .ok_or(WorkflowError::MissingField("amount"))?;
        let amount_minor = money::parse_amount(raw_amount, GBP_DECIMALS)?;
        let amount = format!(
            "{}{}",
            currency_symbol,
            money::format_amount_grouped(amount_minor, GBP_DECIMALS)
        );

        let reference = draft
            .reference
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        let date = draft
            .scheduled_date
            .unwrap_or(today)
            .format("%-d %B %Y")
            .to_string();

        Ok(Self {
            from,
            to,
            new_payee_sort_code,
            new_payee_account_number,
            amount,
            reference,
            date,
        })
    }
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "From:      {}", self.from)?;
        writeln!(f, "To:        {}", self.to)?;
        if let Some(sort_code) = &self.new_payee_sort_code {
            writeln!(f, "Sort code: {}", sort_code)?;
        }
        if let Some(account_number) = &self.new_payee_account_number {
            writeln!(f, "Account:   {}", account_number)?;
        }
        writeln!(f, "Amount:    {}", self.amount)?;
        writeln!(f, "Reference: {}", self.reference)?;
        write!(f, "Date:      {}", self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::demo_directories;
    use crate::workflow::draft::NewPayeeDetails;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    fn valid_draft() -> TransferDraft {
        let mut draft = TransferDraft::new();
        draft.set_source_account("acc123");
        draft.set_existing_payee("payee1");
        draft.set_amount("50.00");
        draft.set_reference(Some("rent".to_string()));
        draft.set_scheduled_date(Some(today()));
        draft
    }

    #[test]
    fn test_summary_existing_payee() {
        let (accounts, payees) = demo_directories();
        let summary =
            TransferSummary::project_at(&valid_draft(), &accounts, &payees, "£", today()).unwrap();

        assert_eq!(summary.from, "Current Account");
        assert_eq!(summary.to, "John Doe - Savings");
        assert_eq!(summary.amount, "£50.00");
        assert_eq!(summary.reference, "rent");
        assert_eq!(summary.date, "27 August 2026");
        assert!(summary.new_payee_sort_code.is_none());
        assert!(summary.new_payee_account_number.is_none());
    }

    #[test]
    fn test_summary_new_payee_shows_bank_details() {
        let (accounts, payees) = demo_directories();
        let mut draft = valid_draft();
        draft.set_new_payee(NewPayeeDetails {
            name: "Jane Doe".to_string(),
            sort_code: "12-34-56".to_string(),
            account_number: "12345678".to_string(),
        });

        let summary =
            TransferSummary::project_at(&draft, &accounts, &payees, "£", today()).unwrap();
        assert_eq!(summary.to, "Jane Doe");
        assert_eq!(summary.new_payee_sort_code.as_deref(), Some("12-34-56"));
        assert_eq!(
            summary.new_payee_account_number.as_deref(),
            Some("12345678")
        );
    }

    #[test]
    fn test_summary_defaults() {
        let (accounts, payees) = demo_directories();
        let mut draft = valid_draft();
        draft.set_reference(None);
        draft.set_scheduled_date(None);

        let summary =
            TransferSummary::project_at(&draft, &accounts, &payees, "£", today()).unwrap();
        assert_eq!(summary.reference, "N/A");
        // Missing date defaults to today; that does not change financial meaning
        assert_eq!(summary.date, "27 August 2026");
    }

    #[test]
    fn test_summary_grouping() {
        let (accounts, payees) = demo_directories();
        let mut draft = valid_draft();
        draft.set_amount("1250.75");

        let summary =
            TransferSummary::project_at(&draft, &accounts, &payees, "£", today()).unwrap();
        assert_eq!(summary.amount, "£1,250.75");
    }

    #[test]
    fn test_missing_amount_is_an_error_not_zero() {
        let (accounts, payees) = demo_directories();
        let mut draft = valid_draft();
        draft.amount = None;

        let err =
            TransferSummary::project_at(&draft, &accounts, &payees, "£", today()).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELD");
    }

    #[test]
    fn test_unresolved_payee_is_an_error() {
        let (accounts, payees) = demo_directories();
        let mut draft = valid_draft();
        draft.set_existing_payee("payee999");

        let err =
            TransferSummary::project_at(&draft, &accounts, &payees, "£", today()).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PAYEE");
    }

    #[test]
    fn test_display_rendering() {
        let (accounts, payees) = demo_directories();
        let summary =
            TransferSummary::project_at(&valid_draft(), &accounts, &payees, "£", today()).unwrap();
        let rendered = summary.to_string();

        assert!(rendered.contains("From:      Current Account"));
        assert!(rendered.contains("Amount:    £50.00"));
        assert!(!rendered.contains("Sort code"));
    }
}
