//! Posting engine behavior tests
//!
//! Exercise the resolve → gate → validate → commit pipeline against the
//! in-memory store, including the concurrency and atomicity guarantees.

use card_ledger::domain::TransactionDraft;
use card_ledger::store::ResourceLookup;
use card_ledger::AppError;
use uuid::Uuid;

mod common;

fn draft(category: &str, value: i64) -> TransactionDraft {
    TransactionDraft {
        category: category.to_string(),
        value,
    }
}

#[tokio::test]
async fn test_balance_equals_sum_of_posted_values() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    for value in [100, 250, 50] {
        f.state
            .engine
            .post(f.tenant.id, account.id, card.id, draft("Groceries", value), None)
            .await
            .unwrap();
    }

    let card = f
        .store
        .find_card(account.id, card.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(card.balance, 400);

    let transactions = f
        .state
        .engine
        .list(f.tenant.id, account.id, card.id)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 3);
    assert_eq!(transactions.iter().map(|t| t.value).sum::<i64>(), 400);
}

#[tokio::test]
async fn test_concurrent_posts_lose_no_updates() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let n = 100;
    let value = 200;

    let mut handles = Vec::with_capacity(n);
    for _ in 0..n {
        let engine = f.state.engine.clone();
        let (tenant_id, account_id, card_id) = (f.tenant.id, account.id, card.id);
        handles.push(tokio::spawn(async move {
            engine
                .post(
                    tenant_id,
                    account_id,
                    card_id,
                    TransactionDraft {
                        category: "Streaming Z".to_string(),
                        value,
                    },
                    None,
                )
                .await
        }));
    }

    for handle in handles {
        let posted = handle.await.unwrap().unwrap();
        assert_eq!(posted.category, "Streaming Z");
        assert_eq!(posted.value, value);
    }

    let card = f
        .store
        .find_card(account.id, card.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(card.balance, n as i64 * value);

    let transactions = f
        .state
        .engine
        .list(f.tenant.id, account.id, card.id)
        .await
        .unwrap();
    assert_eq!(transactions.len(), n);
}

#[tokio::test]
async fn test_card_of_other_account_is_not_found() {
    let f = common::fixture();
    let (account_a, _) = f.active_card();
    let (_, card_b) = f.active_card();

    let err = f
        .state
        .engine
        .post(f.tenant.id, account_a.id, card_b.id, draft("Groceries", 10), None)
        .await
        .unwrap_err();

    match err {
        AppError::NotFound { object, id } => {
            assert_eq!(object, "card");
            assert_eq!(id, card_b.id);
        }
        other => panic!("Expected NotFound, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_inactive_account_rejects_posts() {
    let f = common::fixture();
    let (account, card) = f.inactive_card();

    let err = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InactiveAccount));

    // Nothing may have been persisted.
    let transactions = f
        .state
        .engine
        .list(f.tenant.id, account.id, card.id)
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn test_inactive_account_still_allows_reads() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let posted = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 75), None)
        .await
        .unwrap();

    f.state
        .accounts
        .deactivate(f.tenant.id, account.id)
        .await
        .unwrap();

    let fetched = f
        .state
        .engine
        .get(f.tenant.id, account.id, card.id, posted.id)
        .await
        .unwrap();
    assert_eq!(fetched, posted);
}

#[tokio::test]
async fn test_all_validation_errors_surface_at_once() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let err = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("", -5), None)
        .await
        .unwrap_err();

    match err {
        AppError::Validation(errors) => {
            assert_eq!(errors.errors.len(), 2);
            assert!(errors.errors.contains_key("category"));
            assert!(errors.errors.contains_key("value"));
        }
        other => panic!("Expected Validation, got: {:?}", other),
    }

    let transactions = f
        .state
        .engine
        .list(f.tenant.id, account.id, card.id)
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn test_store_fault_leaves_balance_untouched() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    f.state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 300), None)
        .await
        .unwrap();

    let balance_before = f
        .store
        .find_card(account.id, card.id)
        .await
        .unwrap()
        .unwrap()
        .balance;

    f.store.set_fail_posts(true);
    let err = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 300), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    f.store.set_fail_posts(false);

    let card = f
        .store
        .find_card(account.id, card.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(card.balance, balance_before);

    let transactions = f
        .state
        .engine
        .list(f.tenant.id, account.id, card.id)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn test_read_after_write_returns_posted_transaction() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let posted = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Streaming Z", 200), None)
        .await
        .unwrap();

    let fetched = f
        .state
        .engine
        .get(f.tenant.id, account.id, card.id, posted.id)
        .await
        .unwrap();
    assert_eq!(fetched, posted);
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let missing = Uuid::new_v4();
    let err = f
        .state
        .engine
        .get(f.tenant.id, account.id, card.id, missing)
        .await
        .unwrap_err();

    match err {
        AppError::NotFound { object, id } => {
            assert_eq!(object, "transaction");
            assert_eq!(id, missing);
        }
        other => panic!("Expected NotFound, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_idempotency_key_prevents_double_post() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    let key = Uuid::new_v4();
    let first = f
        .state
        .engine
        .post(
            f.tenant.id,
            account.id,
            card.id,
            draft("Subscription", 500),
            Some(key),
        )
        .await
        .unwrap();
    let replay = f
        .state
        .engine
        .post(
            f.tenant.id,
            account.id,
            card.id,
            draft("Subscription", 500),
            Some(key),
        )
        .await
        .unwrap();

    assert_eq!(first.id, replay.id);

    let card = f
        .store
        .find_card(account.id, card.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(card.balance, 500);
}

#[tokio::test]
async fn test_reactivated_account_accepts_posts_again() {
    let f = common::fixture();
    let (account, card) = f.active_card();

    f.state
        .accounts
        .deactivate(f.tenant.id, account.id)
        .await
        .unwrap();

    let err = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InactiveAccount));

    f.state
        .accounts
        .activate(f.tenant.id, account.id)
        .await
        .unwrap();

    let posted = f
        .state
        .engine
        .post(f.tenant.id, account.id, card.id, draft("Groceries", 10), None)
        .await
        .unwrap();
    assert_eq!(posted.value, 10);
}
