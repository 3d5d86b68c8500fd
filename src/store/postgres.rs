//! Postgres storage
//!
//! sqlx-backed implementation of the storage traits. `atomic_post` takes a
//! row-level lock on the card (`SELECT ... FOR UPDATE`) so concurrent posts
//! to the same card serialize, while posts to different cards proceed in
//! parallel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Account, AccountStatus, Card, Tenant, Transaction};

use super::{LedgerStore, ResourceAdmin, ResourceLookup, StoreError};

type AccountRow = (
    Uuid,
    Uuid,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
);

type CardRow = (
    Uuid,
    Uuid,
    i64,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
);

type TransactionRow = (Uuid, Uuid, String, i64, DateTime<Utc>);

const ACCOUNT_COLUMNS: &str = "id, tenant_id, status, created_at, updated_at, deleted_at";
const CARD_COLUMNS: &str = "id, account_id, balance, created_at, updated_at, deleted_at";
const TRANSACTION_COLUMNS: &str = "id, card_id, category, value, created_at";

fn account_from_row(row: AccountRow) -> Result<Account, StoreError> {
    let (id, tenant_id, status, created_at, updated_at, deleted_at) = row;
    let status = AccountStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown account status '{}'", status)))?;
    Ok(Account {
        id,
        tenant_id,
        status,
        created_at,
        updated_at,
        deleted_at,
    })
}

fn card_from_row(row: CardRow) -> Card {
    let (id, account_id, balance, created_at, updated_at, deleted_at) = row;
    Card {
        id,
        account_id,
        balance,
        created_at,
        updated_at,
        deleted_at,
    }
}

fn transaction_from_row(row: TransactionRow) -> Transaction {
    let (id, card_id, category, value, created_at) = row;
    Transaction {
        id,
        card_id,
        category,
        value,
        created_at,
    }
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceLookup for PgStore {
    async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let row: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM tenants WHERE id = $1")
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, name)| Tenant { id, name }))
    }

    async fn find_account(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE id = $1 AND tenant_id = $2",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(account_from_row).transpose()
    }

    async fn find_card(
        &self,
        account_id: Uuid,
        card_id: Uuid,
    ) -> Result<Option<Card>, StoreError> {
        let row: Option<CardRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cards WHERE id = $1 AND account_id = $2",
            CARD_COLUMNS
        ))
        .bind(card_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(card_from_row))
    }
}

#[async_trait]
impl ResourceAdmin for PgStore {
    async fn create_account(&self, tenant_id: Uuid) -> Result<Account, StoreError> {
        let row: AccountRow = sqlx::query_as(&format!(
            "INSERT INTO accounts (id, tenant_id, status) VALUES ($1, $2, 'active') RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        account_from_row(row)
    }

    async fn list_accounts(&self, tenant_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE tenant_id = $1 ORDER BY created_at ASC",
            ACCOUNT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(account_from_row).collect()
    }

    async fn set_account_status(
        &self,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, StoreError> {
        let row: AccountRow = sqlx::query_as(&format!(
            r#"
            UPDATE accounts
            SET status = $2,
                updated_at = now(),
                deleted_at = CASE WHEN $2 = 'inactive' THEN now() ELSE NULL END
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        account_from_row(row)
    }

    async fn create_card(&self, account_id: Uuid) -> Result<Card, StoreError> {
        let row: CardRow = sqlx::query_as(&format!(
            "INSERT INTO cards (id, account_id, balance) VALUES ($1, $2, 0) RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(card_from_row(row))
    }

    async fn list_cards(&self, account_id: Uuid) -> Result<Vec<Card>, StoreError> {
        let rows: Vec<CardRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cards WHERE account_id = $1 ORDER BY created_at ASC",
            CARD_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(card_from_row).collect())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn atomic_post(
        &self,
        card_id: Uuid,
        category: &str,
        value: i64,
        idempotency_key: Option<Uuid>,
    ) -> Result<Transaction, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the card row first: this is the serialization point for all
        // posts against the card. The balance update below never reads a
        // stale snapshot because writers queue here.
        let locked: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM cards WHERE id = $1 FOR UPDATE")
                .bind(card_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        // With the card locked, an idempotency-key check here is race-free
        // for posts against this card: a replay either sees the committed
        // original or queues behind the in-flight one.
        if let Some(key) = idempotency_key {
            let existing: Option<Uuid> = sqlx::query_scalar(
                "SELECT transaction_id FROM idempotency_keys WHERE key = $1",
            )
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(transaction_id) = existing {
                let row: TransactionRow = sqlx::query_as(&format!(
                    "SELECT {} FROM transactions WHERE id = $1",
                    TRANSACTION_COLUMNS
                ))
                .bind(transaction_id)
                .fetch_one(&mut *tx)
                .await?;

                tx.commit().await?;
                return Ok(transaction_from_row(row));
            }
        }

        let row: TransactionRow = sqlx::query_as(&format!(
            "INSERT INTO transactions (id, card_id, category, value) VALUES ($1, $2, $3, $4) RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(card_id)
        .bind(category)
        .bind(value)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE cards SET balance = balance + $2, updated_at = now() WHERE id = $1")
            .bind(card_id)
            .bind(value)
            .execute(&mut *tx)
            .await?;

        if let Some(key) = idempotency_key {
            sqlx::query("INSERT INTO idempotency_keys (key, transaction_id) VALUES ($1, $2)")
                .bind(key)
                .bind(row.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(transaction_from_row(row))
    }

    async fn get_transaction(
        &self,
        card_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE id = $1 AND card_id = $2",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(transaction_from_row))
    }

    async fn list_transactions(&self, card_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE card_id = $1 ORDER BY created_at ASC, id ASC",
            TRANSACTION_COLUMNS
        ))
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(transaction_from_row).collect())
    }
}
