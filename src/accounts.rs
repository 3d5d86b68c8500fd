//! Account management
//!
//! Tenant-scoped account CRUD and the active/inactive lifecycle. Accounts
//! are created active; deactivation stamps `deleted_at`, reactivation
//! clears it. The posting engine consults the resulting status through
//! [`crate::domain::Account::is_active`].

use uuid::Uuid;

use crate::domain::{Account, AccountStatus};
use crate::error::AppResult;
use crate::ledger::ScopeResolver;
use crate::store::{DynResourceAdmin, DynResourceLookup};

#[derive(Clone)]
pub struct AccountService {
    resolver: ScopeResolver,
    admin: DynResourceAdmin,
}

impl AccountService {
    pub fn new(lookup: DynResourceLookup, admin: DynResourceAdmin) -> Self {
        Self {
            resolver: ScopeResolver::new(lookup),
            admin,
        }
    }

    pub async fn create(&self, tenant_id: Uuid) -> AppResult<Account> {
        let account = self.admin.create_account(tenant_id).await?;

        tracing::info!(account_id = %account.id, tenant_id = %tenant_id, "account created");

        Ok(account)
    }

    pub async fn find_one(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Account> {
        self.resolver.account(tenant_id, account_id).await
    }

    pub async fn find_all(&self, tenant_id: Uuid) -> AppResult<Vec<Account>> {
        Ok(self.admin.list_accounts(tenant_id).await?)
    }

    pub async fn activate(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Account> {
        self.set_status(tenant_id, account_id, AccountStatus::Active)
            .await
    }

    pub async fn deactivate(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Account> {
        self.set_status(tenant_id, account_id, AccountStatus::Inactive)
            .await
    }

    async fn set_status(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        status: AccountStatus,
    ) -> AppResult<Account> {
        // Resolve first so a foreign or missing account surfaces as
        // NotFound instead of a blind update.
        let account = self.resolver.account(tenant_id, account_id).await?;

        if account.status == status {
            return Ok(account);
        }

        let updated = self.admin.set_account_status(account_id, status).await?;

        tracing::info!(
            account_id = %account_id,
            status = status.as_str(),
            "account status changed"
        );

        Ok(updated)
    }
}
