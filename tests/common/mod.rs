//! Common test utilities

use std::sync::Arc;

use card_ledger::api::AppState;
use card_ledger::domain::{Account, AccountStatus, Card, Tenant};
use card_ledger::store::MemoryStore;

/// In-memory fixture: one seeded tenant plus the wired component graph.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub tenant: Tenant,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let tenant = store.add_tenant("acme");
    let state = AppState::new(store.clone(), store.clone(), store.clone());

    Fixture {
        store,
        state,
        tenant,
    }
}

impl Fixture {
    /// Seed an active account with one card under the fixture tenant.
    pub fn active_card(&self) -> (Account, Card) {
        let account = self.store.add_account(self.tenant.id, AccountStatus::Active);
        let card = self.store.add_card(account.id);
        (account, card)
    }

    /// Seed an inactive account with one card under the fixture tenant.
    pub fn inactive_card(&self) -> (Account, Card) {
        let account = self
            .store
            .add_account(self.tenant.id, AccountStatus::Inactive);
        let card = self.store.add_card(account.id);
        (account, card)
    }
}
