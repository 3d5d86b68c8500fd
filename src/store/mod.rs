//! Storage abstraction
//!
//! Trait seams between the ledger core and durable storage. Production
//! wiring uses [`PgStore`]; tests use [`MemoryStore`]. The crux of the
//! contract is [`LedgerStore::atomic_post`]: transaction insert and balance
//! update must commit or fail together, serialized per card.

pub mod error;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, AccountStatus, Card, Tenant, Transaction};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynResourceLookup = Arc<dyn ResourceLookup>;
pub type DynResourceAdmin = Arc<dyn ResourceAdmin>;
pub type DynLedgerStore = Arc<dyn LedgerStore>;

/// Point lookups along the tenant → account → card ownership chain.
///
/// `Ok(None)` means the row is absent (or outside the given scope); any
/// other failure is an infrastructure error.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StoreError>;

    async fn find_account(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_card(&self, account_id: Uuid, card_id: Uuid)
        -> Result<Option<Card>, StoreError>;
}

/// Management operations on accounts and cards.
///
/// Balance is deliberately absent from this trait: all balance mutation
/// goes through [`LedgerStore::atomic_post`].
#[async_trait]
pub trait ResourceAdmin: Send + Sync {
    /// Create an account under the tenant, initially active.
    async fn create_account(&self, tenant_id: Uuid) -> Result<Account, StoreError>;

    async fn list_accounts(&self, tenant_id: Uuid) -> Result<Vec<Account>, StoreError>;

    /// Flip the account status. Deactivation stamps `deleted_at`;
    /// reactivation clears it.
    async fn set_account_status(
        &self,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, StoreError>;

    /// Create a card under the account with balance 0.
    async fn create_card(&self, account_id: Uuid) -> Result<Card, StoreError>;

    async fn list_cards(&self, account_id: Uuid) -> Result<Vec<Card>, StoreError>;
}

/// Durable ledger writes and reads.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append a transaction and add its value to the owning card's balance
    /// in one atomic unit of work.
    ///
    /// Concurrent calls against the same card serialize their balance
    /// updates; the final balance equals the sum of all posted values.
    /// Calls against different cards do not block each other.
    ///
    /// When `idempotency_key` is given and a transaction was already posted
    /// under that key, the original transaction is returned and the balance
    /// is left untouched.
    async fn atomic_post(
        &self,
        card_id: Uuid,
        category: &str,
        value: i64,
        idempotency_key: Option<Uuid>,
    ) -> Result<Transaction, StoreError>;

    async fn get_transaction(
        &self,
        card_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError>;

    /// All transactions of a card, oldest first.
    async fn list_transactions(&self, card_id: Uuid) -> Result<Vec<Transaction>, StoreError>;
}
