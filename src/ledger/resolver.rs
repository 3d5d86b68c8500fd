//! Resource scope resolution
//!
//! Validates the tenant → account → card ownership chain with point
//! lookups. Read-only; inactive accounts resolve fine here — the active
//! gate belongs to the write paths that consume the resolved scope.

use uuid::Uuid;

use crate::domain::{Account, Card, Tenant};
use crate::error::{AppError, AppResult};
use crate::store::DynResourceLookup;

/// Resolves ownership chains against a [`crate::store::ResourceLookup`].
#[derive(Clone)]
pub struct ScopeResolver {
    lookup: DynResourceLookup,
}

impl ScopeResolver {
    pub fn new(lookup: DynResourceLookup) -> Self {
        Self { lookup }
    }

    /// Resolve a tenant by id. Used by the tenant-scoping middleware.
    pub async fn tenant(&self, tenant_id: Uuid) -> AppResult<Tenant> {
        self.lookup
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found("tenant", tenant_id))
    }

    /// Resolve an account within a tenant.
    pub async fn account(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Account> {
        self.lookup
            .find_account(tenant_id, account_id)
            .await?
            .ok_or_else(|| AppError::not_found("account", account_id))
    }

    /// Resolve a card within an account within a tenant, returning the
    /// account as well so write paths can apply the active gate.
    pub async fn card(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        card_id: Uuid,
    ) -> AppResult<(Account, Card)> {
        let account = self.account(tenant_id, account_id).await?;

        let card = self
            .lookup
            .find_card(account_id, card_id)
            .await?
            .ok_or_else(|| AppError::not_found("card", card_id))?;

        Ok((account, card))
    }
}
