//! Domain model
//!
//! Entities of the ledger hierarchy: Tenant ⊃ Account ⊃ Card ⊃ Transaction.
//! Ownership is strictly hierarchical; there are no cross-links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level isolation boundary. Tenants are seeded out of band and never
/// mutated through this API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
}

/// Account lifecycle state. Only active accounts may receive new cards or
/// transactions; reads are allowed in either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }

    /// Parse the status as stored in the `accounts.status` column.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AccountStatus::Active),
            "inactive" => Some(AccountStatus::Inactive),
            _ => None,
        }
    }
}

/// A customer's holding under a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Stamped when the account is deactivated, cleared on reactivation.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Write-path gate: cards and transactions may only be created while
    /// the account is active.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// A spending instrument under an account. The balance is maintained
/// exclusively by the transaction-posting path and always equals the sum
/// of the card's transaction values, in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: Uuid,
    pub account_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// An immutable monetary posting against a card. Created only through the
/// posting engine; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub card_id: Uuid,
    pub category: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

/// A proposed transaction, as submitted by a caller. Validated by
/// [`crate::domain::validate`] before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub category: String,
    pub value: i64,
}
