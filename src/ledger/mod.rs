//! Ledger core
//!
//! Scope resolution and the transaction-posting engine. This is the only
//! code path allowed to mutate card balances, and it does so exclusively
//! through [`crate::store::LedgerStore::atomic_post`].

pub mod engine;
pub mod resolver;

pub use engine::PostingEngine;
pub use resolver::ScopeResolver;
