//! Transaction posting engine
//!
//! Orchestrates scope resolution, input validation and the atomic ledger
//! write. Per request the flow is: resolve scope, gate on account
//! activity, validate the draft, commit through the store. A failure at
//! any step returns before the next one runs, so a caller either observes
//! a fully posted transaction plus updated balance, or neither.

use uuid::Uuid;

use crate::domain::validate::validate_draft;
use crate::domain::{Transaction, TransactionDraft};
use crate::error::{AppError, AppResult};
use crate::store::{DynLedgerStore, DynResourceLookup};

use super::resolver::ScopeResolver;

/// The single entry point for creating transactions and mutating card
/// balances. Constructed once at startup; stateless between calls.
#[derive(Clone)]
pub struct PostingEngine {
    resolver: ScopeResolver,
    store: DynLedgerStore,
}

impl PostingEngine {
    pub fn new(lookup: DynResourceLookup, store: DynLedgerStore) -> Self {
        Self {
            resolver: ScopeResolver::new(lookup),
            store,
        }
    }

    /// Post a transaction against a card.
    ///
    /// The store call is not retried here: posting is not naturally
    /// idempotent, so retries are the caller's decision, covered by the
    /// optional idempotency key.
    pub async fn post(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        card_id: Uuid,
        draft: TransactionDraft,
        idempotency_key: Option<Uuid>,
    ) -> AppResult<Transaction> {
        let (account, card) = self.resolver.card(tenant_id, account_id, card_id).await?;

        if !account.is_active() {
            return Err(AppError::InactiveAccount);
        }

        validate_draft(&draft)?;

        let transaction = self
            .store
            .atomic_post(card.id, &draft.category, draft.value, idempotency_key)
            .await?;

        tracing::debug!(
            transaction_id = %transaction.id,
            card_id = %card.id,
            value = transaction.value,
            "transaction posted"
        );

        Ok(transaction)
    }

    /// Fetch a single transaction within the resolved scope.
    pub async fn get(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        card_id: Uuid,
        transaction_id: Uuid,
    ) -> AppResult<Transaction> {
        let (_, card) = self.resolver.card(tenant_id, account_id, card_id).await?;

        self.store
            .get_transaction(card.id, transaction_id)
            .await?
            .ok_or_else(|| AppError::not_found("transaction", transaction_id))
    }

    /// List all transactions of a card within the resolved scope.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        card_id: Uuid,
    ) -> AppResult<Vec<Transaction>> {
        let (_, card) = self.resolver.card(tenant_id, account_id, card_id).await?;

        Ok(self.store.list_transactions(card.id).await?)
    }
}
