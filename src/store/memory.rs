//! In-memory storage
//!
//! Test double implementing the storage traits, in the spirit of the
//! repository mocks the HTTP layer is tested against. All mutation happens
//! under one lock with no await points inside, so `atomic_post` keeps the
//! same all-or-nothing, serialized-per-card guarantees as the Postgres
//! implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Account, AccountStatus, Card, Tenant, Transaction};

use super::{LedgerStore, ResourceAdmin, ResourceLookup, StoreError};

#[derive(Default)]
struct Inner {
    tenants: HashMap<Uuid, Tenant>,
    accounts: HashMap<Uuid, Account>,
    cards: HashMap<Uuid, Card>,
    transactions: Vec<Transaction>,
    idempotency: HashMap<Uuid, Uuid>,
}

/// In-memory store with fault injection for atomicity tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_posts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `atomic_post` fail before any effect is
    /// applied, simulating storage loss mid-operation.
    pub fn set_fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    /// Seed a tenant.
    pub fn add_tenant(&self, name: &str) -> Tenant {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.tenants.insert(tenant.id, tenant.clone());
        tenant
    }

    /// Seed an account under a tenant.
    pub fn add_account(&self, tenant_id: Uuid, status: AccountStatus) -> Account {
        let account = Account {
            id: Uuid::new_v4(),
            tenant_id,
            status,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(account.id, account.clone());
        account
    }

    /// Seed a card under an account, balance 0.
    pub fn add_card(&self, account_id: Uuid) -> Card {
        let card = Card {
            id: Uuid::new_v4(),
            account_id,
            balance: 0,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.cards.insert(card.id, card.clone());
        card
    }
}

#[async_trait]
impl ResourceLookup for MemoryStore {
    async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tenants.get(&tenant_id).cloned())
    }

    async fn find_account(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .get(&account_id)
            .filter(|a| a.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_card(
        &self,
        account_id: Uuid,
        card_id: Uuid,
    ) -> Result<Option<Card>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .get(&card_id)
            .filter(|c| c.account_id == account_id)
            .cloned())
    }
}

#[async_trait]
impl ResourceAdmin for MemoryStore {
    async fn create_account(&self, tenant_id: Uuid) -> Result<Account, StoreError> {
        Ok(self.add_account(tenant_id, AccountStatus::Active))
    }

    async fn list_accounts(&self, tenant_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn set_account_status(
        &self,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let account = inner
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::Unavailable(format!("account {} missing", account_id)))?;

        let now = Utc::now();
        account.status = status;
        account.updated_at = Some(now);
        account.deleted_at = match status {
            AccountStatus::Inactive => Some(now),
            AccountStatus::Active => None,
        };

        Ok(account.clone())
    }

    async fn create_card(&self, account_id: Uuid) -> Result<Card, StoreError> {
        Ok(self.add_card(account_id))
    }

    async fn list_cards(&self, account_id: Uuid) -> Result<Vec<Card>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut cards: Vec<Card> = inner
            .cards
            .values()
            .filter(|c| c.account_id == account_id)
            .cloned()
            .collect();
        cards.sort_by_key(|c| c.created_at);
        Ok(cards)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn atomic_post(
        &self,
        card_id: Uuid,
        category: &str,
        value: i64,
        idempotency_key: Option<Uuid>,
    ) -> Result<Transaction, StoreError> {
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected post failure".to_string()));
        }

        let mut inner = self.inner.lock().unwrap();

        if let Some(key) = idempotency_key {
            if let Some(existing_id) = inner.idempotency.get(&key).copied() {
                let existing = inner
                    .transactions
                    .iter()
                    .find(|t| t.id == existing_id)
                    .cloned()
                    .ok_or_else(|| {
                        StoreError::Corrupt(format!(
                            "idempotency key {} references missing transaction",
                            key
                        ))
                    })?;
                return Ok(existing);
            }
        }

        // Both effects apply under the same lock acquisition, or neither.
        let card = inner
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| StoreError::Unavailable(format!("card {} missing", card_id)))?;

        let now = Utc::now();
        card.balance += value;
        card.updated_at = Some(now);

        let transaction = Transaction {
            id: Uuid::new_v4(),
            card_id,
            category: category.to_string(),
            value,
            created_at: now,
        };
        inner.transactions.push(transaction.clone());

        if let Some(key) = idempotency_key {
            inner.idempotency.insert(key, transaction.id);
        }

        Ok(transaction)
    }

    async fn get_transaction(
        &self,
        card_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .transactions
            .iter()
            .find(|t| t.id == transaction_id && t.card_id == card_id)
            .cloned())
    }

    async fn list_transactions(&self, card_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .transactions
            .iter()
            .filter(|t| t.card_id == card_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_atomic_post_updates_balance() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("acme");
        let account = store.add_account(tenant.id, AccountStatus::Active);
        let card = store.add_card(account.id);

        let posted = store.atomic_post(card.id, "Groceries", 150, None).await.unwrap();
        assert_eq!(posted.value, 150);

        let card = store.find_card(account.id, card.id).await.unwrap().unwrap();
        assert_eq!(card.balance, 150);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_no_trace() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("acme");
        let account = store.add_account(tenant.id, AccountStatus::Active);
        let card = store.add_card(account.id);

        store.set_fail_posts(true);
        let result = store.atomic_post(card.id, "Groceries", 150, None).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        let card = store.find_card(account.id, card.id).await.unwrap().unwrap();
        assert_eq!(card.balance, 0);
        assert!(store.list_transactions(card.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_idempotency_key_replay() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("acme");
        let account = store.add_account(tenant.id, AccountStatus::Active);
        let card = store.add_card(account.id);

        let key = Uuid::new_v4();
        let first = store.atomic_post(card.id, "Subscription", 500, Some(key)).await.unwrap();
        let replay = store.atomic_post(card.id, "Subscription", 500, Some(key)).await.unwrap();

        assert_eq!(first.id, replay.id);
        let card = store.find_card(account.id, card.id).await.unwrap().unwrap();
        assert_eq!(card.balance, 500);
    }
}
