//! Domain module
//!
//! Core domain types and input validation.

pub mod model;
pub mod validate;

pub use model::{Account, AccountStatus, Card, Tenant, Transaction, TransactionDraft};
pub use validate::ValidationErrors;
