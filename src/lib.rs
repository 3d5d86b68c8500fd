//! card-ledger Library
//!
//! Re-exports modules for integration testing and external use.

pub mod accounts;
pub mod api;
pub mod cards;
pub mod domain;
pub mod ledger;
pub mod store;

// Private modules (used only by the server binary)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{
    Account, AccountStatus, Card, Tenant, Transaction, TransactionDraft, ValidationErrors,
};
pub use error::{AppError, AppResult};
pub use ledger::{PostingEngine, ScopeResolver};
