//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, Card, Transaction, TransactionDraft};
use crate::error::AppError;

use super::middleware::TenantScope;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            tenant_id: account.tenant_id,
            status: account.status.as_str().to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
            deleted_at: account.deleted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            account_id: card.account_id,
            balance: card.balance,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub category: String,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub card_id: Uuid,
    pub category: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            card_id: transaction.card_id,
            category: transaction.category,
            value: transaction.value,
            created_at: transaction.created_at,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router. The tenant-scoping middleware is layered on top
/// by the caller (see `build_router` in main).
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id/active", put(activate_account))
        .route("/accounts/:account_id/inactive", put(deactivate_account))
        // Cards
        .route(
            "/accounts/:account_id/cards",
            post(create_card).get(list_cards),
        )
        .route("/accounts/:account_id/cards/:card_id", get(get_card))
        // Transactions
        .route(
            "/accounts/:account_id/cards/:card_id/transactions",
            post(post_transaction).get(list_transactions),
        )
        .route(
            "/accounts/:account_id/cards/:card_id/transactions/:transaction_id",
            get(get_transaction),
        )
}

// =========================================================================
// Account endpoints
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = state.accounts.create(scope.tenant_id).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

async fn list_accounts(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = state.accounts.find_all(scope.tenant_id).await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

async fn get_account(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.accounts.find_one(scope.tenant_id, account_id).await?;

    Ok(Json(account.into()))
}

async fn activate_account(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.accounts.activate(scope.tenant_id, account_id).await?;

    Ok(Json(account.into()))
}

async fn deactivate_account(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .accounts
        .deactivate(scope.tenant_id, account_id)
        .await?;

    Ok(Json(account.into()))
}

// =========================================================================
// Card endpoints
// =========================================================================

async fn create_card(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(account_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CardResponse>), AppError> {
    let card = state.cards.create(scope.tenant_id, account_id).await?;

    Ok((StatusCode::CREATED, Json(card.into())))
}

async fn list_cards(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<CardResponse>>, AppError> {
    let cards = state.cards.find_all(scope.tenant_id, account_id).await?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

async fn get_card(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path((account_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardResponse>, AppError> {
    let card = state
        .cards
        .find_one(scope.tenant_id, account_id, card_id)
        .await?;

    Ok(Json(card.into()))
}

// =========================================================================
// Transaction endpoints
// =========================================================================

/// Optional Idempotency-Key header, a client-supplied UUID de-duplicated
/// at the ledger store boundary.
fn idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    match headers.get("Idempotency-Key").and_then(|v| v.to_str().ok()) {
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AppError::InvalidRequest("Idempotency-Key must be a UUID".to_string())),
        None => Ok(None),
    }
}

async fn post_transaction(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path((account_id, card_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let key = idempotency_key(&headers)?;

    let draft = TransactionDraft {
        category: request.category,
        value: request.value,
    };

    let transaction = state
        .engine
        .post(scope.tenant_id, account_id, card_id, draft, key)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

async fn list_transactions(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path((account_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions = state
        .engine
        .list(scope.tenant_id, account_id, card_id)
        .await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

async fn get_transaction(
    State(state): State<AppState>,
    Extension(scope): Extension<TenantScope>,
    Path((account_id, card_id, transaction_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = state
        .engine
        .get(scope.tenant_id, account_id, card_id, transaction_id)
        .await?;

    Ok(Json(transaction.into()))
}
