//! API module
//!
//! HTTP API endpoints, middleware and shared state.

pub mod middleware;
pub mod routes;

use crate::accounts::AccountService;
use crate::cards::CardService;
use crate::ledger::{PostingEngine, ScopeResolver};
use crate::store::{DynLedgerStore, DynResourceAdmin, DynResourceLookup};

pub use routes::create_router;

/// Shared application state: the component graph, constructed once at
/// startup and cloned per request (all members are cheap Arc handles).
#[derive(Clone)]
pub struct AppState {
    pub engine: PostingEngine,
    pub accounts: AccountService,
    pub cards: CardService,
    pub resolver: ScopeResolver,
}

impl AppState {
    pub fn new(
        lookup: DynResourceLookup,
        admin: DynResourceAdmin,
        store: DynLedgerStore,
    ) -> Self {
        Self {
            engine: PostingEngine::new(lookup.clone(), store),
            accounts: AccountService::new(lookup.clone(), admin.clone()),
            cards: CardService::new(lookup.clone(), admin),
            resolver: ScopeResolver::new(lookup),
        }
    }
}
