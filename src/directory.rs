//! Account and Payee Directories
//!
//! In-memory lookup tables for the collaborators the workflow needs:
//! the account listing (source accounts with display balances) and the
//! payee book (previously saved recipients). The workflow core only reads
//! from these; maintaining them belongs to the surrounding application.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub label: String,
    /// Available balance in minor units, for display only.
    /// Sufficient-funds enforcement belongs to the gateway boundary.
    pub balance_minor: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayeeRecord {
    pub id: String,
    pub name: String,
}

/// Source-account listing keyed by account id
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: FxHashMap<String, AccountRecord>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> Self {
        let accounts = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self { accounts }
    }

    pub fn insert(&mut self, record: AccountRecord) {
        self.accounts.insert(record.id.clone(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.accounts.get(id).map(|r| r.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Saved-payee book keyed by payee id
#[derive(Debug, Clone, Default)]
pub struct PayeeDirectory {
    payees: FxHashMap<String, PayeeRecord>,
}

impl PayeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = PayeeRecord>) -> Self {
        let payees = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self { payees }
    }

    pub fn insert(&mut self, record: PayeeRecord) {
        self.payees.insert(record.id.clone(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.payees.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PayeeRecord> {
        self.payees.get(id)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.payees.get(id).map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.payees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payees.is_empty()
    }
}

/// Demo dataset matching the seeded UI fixtures.
pub fn demo_directories() -> (AccountDirectory, PayeeDirectory) {
    let accounts = AccountDirectory::from_records([
        AccountRecord {
            id: "acc123".to_string(),
            label: "Current Account".to_string(),
            balance_minor: 125_075,
        },
        AccountRecord {
            id: "acc456".to_string(),
            label: "Savings Pot".to_string(),
            balance_minor: 580_000,
        },
    ]);

    let payees = PayeeDirectory::from_records([
        PayeeRecord {
            id: "payee1".to_string(),
            name: "John Doe - Savings".to_string(),
        },
        PayeeRecord {
            id: "payee2".to_string(),
            name: "Electricity Bill".to_string(),
        },
    ]);

    (accounts, payees)
}
