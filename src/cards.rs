//! Card management
//!
//! Cards are created under active accounts only and start at balance 0.
//! Nothing here touches the balance; that belongs to the posting engine.

use uuid::Uuid;

use crate::domain::Card;
use crate::error::{AppError, AppResult};
use crate::ledger::ScopeResolver;
use crate::store::{DynResourceAdmin, DynResourceLookup};

#[derive(Clone)]
pub struct CardService {
    resolver: ScopeResolver,
    admin: DynResourceAdmin,
}

impl CardService {
    pub fn new(lookup: DynResourceLookup, admin: DynResourceAdmin) -> Self {
        Self {
            resolver: ScopeResolver::new(lookup),
            admin,
        }
    }

    pub async fn create(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Card> {
        let account = self.resolver.account(tenant_id, account_id).await?;

        if !account.is_active() {
            return Err(AppError::InactiveAccount);
        }

        let card = self.admin.create_card(account_id).await?;

        tracing::info!(card_id = %card.id, account_id = %account_id, "card created");

        Ok(card)
    }

    pub async fn find_one(&self, tenant_id: Uuid, account_id: Uuid, card_id: Uuid) -> AppResult<Card> {
        let (_, card) = self.resolver.card(tenant_id, account_id, card_id).await?;
        Ok(card)
    }

    pub async fn find_all(&self, tenant_id: Uuid, account_id: Uuid) -> AppResult<Vec<Card>> {
        // Account must resolve before listing, so a foreign account id
        // yields NotFound rather than an empty list.
        self.resolver.account(tenant_id, account_id).await?;

        Ok(self.admin.list_cards(account_id).await?)
    }
}
