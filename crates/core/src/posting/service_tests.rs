//! Posting service tests against an in-memory repository.

#![allow(clippy::cast_possible_truncation)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;

use lexmarket_shared::types::PostingId;

use super::*;
use crate::posting::types::{SortField, SortOrder};

/// In-memory repository with the same conditional-update contract as the
/// Postgres implementation.
#[derive(Default)]
struct MemoryRepository {
    postings: Mutex<Vec<Posting>>,
}

#[async_trait]
impl PostingRepository for MemoryRepository {
    async fn insert(&self, new: NewPosting) -> Result<Posting, PostingError> {
        let posting = Posting {
            id: PostingId::new(),
            title: new.title,
            description: new.description,
            client_email: new.client_email,
            poster_email: new.poster_email,
            created: new.created,
            status: new.status,
            fee_structure: new.fee_structure,
            fee_amount: new.fee_amount,
            fee_percentage: new.fee_percentage,
            expected_settlement_amount: new.expected_settlement_amount,
            settlement_amount: None,
            amount_paid: None,
            paid_on: None,
        };
        self.postings.lock().unwrap().push(posting.clone());
        Ok(posting)
    }

    async fn find_by_id(&self, id: PostingId) -> Result<Option<Posting>, PostingError> {
        Ok(self
            .postings
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find(&self, query: &PostingQuery) -> Result<Vec<Posting>, PostingError> {
        let mut rows: Vec<Posting> = self
            .postings
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                query
                    .client_email
                    .as_ref()
                    .is_none_or(|email| &p.client_email == email)
            })
            .filter(|p| {
                query
                    .poster_email
                    .as_ref()
                    .is_none_or(|email| &p.poster_email == email)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| match query.sort_by {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Created => a.created.cmp(&b.created),
        });
        if query.sort_order == SortOrder::Desc {
            rows.reverse();
        }

        Ok(rows
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64, PostingError> {
        Ok(self.postings.lock().unwrap().len() as u64)
    }

    async fn mark_paid(
        &self,
        id: PostingId,
        update: PaymentUpdate,
    ) -> Result<bool, PostingError> {
        let mut postings = self.postings.lock().unwrap();
        let Some(posting) = postings.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if posting.paid_on.is_some() {
            return Ok(false);
        }

        posting.status = PostingStatus::Paid;
        posting.amount_paid = Some(update.amount_paid);
        posting.paid_on = Some(update.paid_on);
        if update.settlement_amount.is_some() {
            posting.settlement_amount = update.settlement_amount;
        }
        Ok(true)
    }
}

fn service() -> PostingService<MemoryRepository> {
    PostingService::new(MemoryRepository::default(), SettlementPolicy::new(dec!(0.10)))
}

fn fixed_fee_input() -> CreatePosting {
    CreatePosting {
        title: "title test".to_string(),
        description: "description test".to_string(),
        client_email: "clientEmailTest@example.com".to_string(),
        fee_structure: FeeStructure::FixedFee,
        fee_amount: Some(dec!(400.00)),
        fee_percentage: None,
        expected_settlement_amount: None,
    }
}

fn no_win_no_fee_input() -> CreatePosting {
    CreatePosting {
        title: "title test".to_string(),
        description: "description test".to_string(),
        client_email: "clientEmailTest@example.com".to_string(),
        fee_structure: FeeStructure::NoWinNoFee,
        fee_amount: None,
        fee_percentage: Some(dec!(0.11)),
        expected_settlement_amount: Some(dec!(50000)),
    }
}

const POSTER: &str = "solicitorEmailTest@example.com";

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_starts_unpaid_with_poster_from_caller() {
    let service = service();

    let posting = service.create(fixed_fee_input(), POSTER).await.unwrap();

    assert_eq!(posting.status, PostingStatus::Unpaid);
    assert_eq!(posting.poster_email, POSTER);
    assert!((Utc::now() - posting.created).num_seconds() < 5);
    assert!(posting.amount_paid.is_none());
    assert!(posting.paid_on.is_none());
    assert!(posting.settlement_amount.is_none());
}

#[tokio::test]
async fn test_create_rejects_both_fee_fields() {
    let service = service();

    let mut input = fixed_fee_input();
    input.fee_percentage = Some(dec!(0.11));
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::BothFeeFieldsPresent));

    let mut input = no_win_no_fee_input();
    input.fee_amount = Some(dec!(400.00));
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::BothFeeFieldsPresent));
}

#[tokio::test]
async fn test_create_requires_fee_amount_for_fixed_fee() {
    let service = service();

    let mut input = fixed_fee_input();
    input.fee_amount = None;
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::MissingFeeAmount));
}

#[tokio::test]
async fn test_create_requires_percentage_and_estimate_for_no_win_no_fee() {
    let service = service();

    let mut input = no_win_no_fee_input();
    input.fee_percentage = None;
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::MissingFeePercentage));

    let mut input = no_win_no_fee_input();
    input.expected_settlement_amount = None;
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::MissingExpectedSettlementAmount));
}

#[tokio::test]
async fn test_create_rejects_fee_percentage_outside_unit_interval() {
    let service = service();

    let mut input = no_win_no_fee_input();
    input.fee_percentage = Some(dec!(1.01));
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::FeePercentageOutOfRange));

    let mut input = no_win_no_fee_input();
    input.fee_percentage = Some(dec!(-0.01));
    let err = service.create(input, POSTER).await.unwrap_err();
    assert!(matches!(err, PostingError::FeePercentageOutOfRange));
}

// ============================================================================
// Payment: Fixed-Fee
// ============================================================================

#[tokio::test]
async fn test_pay_unknown_posting_fails() {
    let service = service();

    let err = service
        .pay(PayRequest {
            id: PostingId::new(),
            settlement_amount: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PostingError::UnknownPosting));
    assert_eq!(err.to_string(), "job posting _id does not exist");
}

#[tokio::test]
async fn test_pay_fixed_fee_returns_pre_update_snapshot() {
    let service = service();
    let created = service.create(fixed_fee_input(), POSTER).await.unwrap();

    let before_payment = Utc::now();
    let echoed = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        })
        .await
        .unwrap();

    // The echoed record is the posting as it was before the update.
    assert_eq!(echoed.id, created.id);
    assert_eq!(echoed.status, PostingStatus::Unpaid);
    assert!(echoed.amount_paid.is_none());
    assert!(echoed.paid_on.is_none());

    // A re-fetch shows the applied transition.
    let updated = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.status, PostingStatus::Paid);
    assert_eq!(updated.amount_paid, Some(dec!(400.00)));
    let paid_on = updated.paid_on.unwrap();
    assert!((paid_on - before_payment).num_seconds().abs() < 10);
    assert!(updated.settlement_amount.is_none());

    // Everything else is untouched.
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.created, created.created);
    assert_eq!(updated.poster_email, created.poster_email);
}

#[tokio::test]
async fn test_pay_fixed_fee_ignores_supplied_settlement_amount() {
    let service = service();
    let created = service.create(fixed_fee_input(), POSTER).await.unwrap();

    service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(99999)),
        })
        .await
        .unwrap();

    let updated = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.amount_paid, Some(dec!(400.00)));
    assert!(updated.settlement_amount.is_none());
}

#[tokio::test]
async fn test_pay_twice_fails_and_keeps_first_payment() {
    let service = service();
    let created = service.create(fixed_fee_input(), POSTER).await.unwrap();

    service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        })
        .await
        .unwrap();
    let first = service.repo.find_by_id(created.id).await.unwrap().unwrap();

    let err = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PostingError::AlreadyPaid));
    assert_eq!(err.to_string(), "job has already been paid");

    let after = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(after.status, PostingStatus::Paid);
    assert_eq!(after.amount_paid, first.amount_paid);
    assert_eq!(after.paid_on, first.paid_on);
}

// ============================================================================
// Payment: No-Win-No-Fee
// ============================================================================

#[tokio::test]
async fn test_pay_no_win_no_fee_computes_percentage_of_settlement() {
    let service = service();
    let created = service.create(no_win_no_fee_input(), POSTER).await.unwrap();

    let echoed = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(50000)),
        })
        .await
        .unwrap();
    assert_eq!(echoed.status, PostingStatus::Unpaid);

    let updated = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.status, PostingStatus::Paid);
    assert_eq!(updated.amount_paid, Some(dec!(5500)));
    assert_eq!(updated.settlement_amount, Some(dec!(50000)));
}

#[tokio::test]
async fn test_pay_no_win_no_fee_requires_settlement_amount() {
    let service = service();
    let created = service.create(no_win_no_fee_input(), POSTER).await.unwrap();

    let err = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PostingError::MissingSettlementAmount));
    assert_eq!(
        err.to_string(),
        "No-Win-No-Fee jobs require settlementAmount in the payment submission"
    );

    // The failed attempt must not have transitioned the posting.
    let after = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(after.status, PostingStatus::Unpaid);
}

#[tokio::test]
async fn test_pay_rejects_settlement_outside_tolerance() {
    let service = service();
    let created = service.create(no_win_no_fee_input(), POSTER).await.unwrap();

    // Below 50000 * 0.9.
    let err = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(44999)),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::SettlementOutOfRange {
            min: 45000,
            max: 55000
        }
    ));

    // Above 50000 * 1.1.
    let err = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(55001)),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::SettlementOutOfRange {
            min: 45000,
            max: 55000
        }
    ));

    let after = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(after.status, PostingStatus::Unpaid);
}

#[tokio::test]
async fn test_pay_accepts_settlement_at_exact_bounds() {
    let service = service();

    let created = service.create(no_win_no_fee_input(), POSTER).await.unwrap();
    let echoed = service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(45000)),
        })
        .await
        .unwrap();
    assert_eq!(echoed.id, created.id);

    let created = service.create(no_win_no_fee_input(), POSTER).await.unwrap();
    service
        .pay(PayRequest {
            id: created.id,
            settlement_amount: Some(dec!(55000)),
        })
        .await
        .unwrap();
    let updated = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.amount_paid, Some(dec!(6050.00)));
}

#[tokio::test]
async fn test_pay_surfaces_internal_fault_for_inconsistent_fee_data() {
    // A No-Win-No-Fee record missing its percentage can only come from
    // corrupted storage; the service must not treat it as a client error.
    let repo = MemoryRepository::default();
    let posting = Posting {
        id: PostingId::new(),
        title: "title test".to_string(),
        description: "description test".to_string(),
        client_email: "clientEmailTest@example.com".to_string(),
        poster_email: POSTER.to_string(),
        created: Utc::now(),
        status: PostingStatus::Unpaid,
        fee_structure: FeeStructure::NoWinNoFee,
        fee_amount: None,
        fee_percentage: None,
        expected_settlement_amount: Some(dec!(50000)),
        settlement_amount: None,
        amount_paid: None,
        paid_on: None,
    };
    repo.postings.lock().unwrap().push(posting.clone());
    let service = PostingService::new(repo, SettlementPolicy::new(dec!(0.10)));

    let err = service
        .pay(PayRequest {
            id: posting.id,
            settlement_amount: Some(dec!(50000)),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PostingError::Internal(_)));
    assert_eq!(err.http_status_code(), 500);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_pay_has_single_winner() {
    let service = service();
    let created = service.create(fixed_fee_input(), POSTER).await.unwrap();

    let (first, second) = tokio::join!(
        service.pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        }),
        service.pay(PayRequest {
            id: created.id,
            settlement_amount: None,
        })
    );

    // Exactly one call wins the transition; the loser sees the conflict.
    assert!(first.is_ok() != second.is_ok());
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser.unwrap_err(), PostingError::AlreadyPaid));

    let updated = service.repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.amount_paid, Some(dec!(400.00)));
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_count_tracks_inserts() {
    let service = service();
    assert_eq!(service.count().await.unwrap(), 0);

    service.create(fixed_fee_input(), POSTER).await.unwrap();
    service.create(no_win_no_fee_input(), POSTER).await.unwrap();

    assert_eq!(service.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_find_filters_on_present_fields_only() {
    let service = service();

    let mut input = fixed_fee_input();
    input.client_email = "alice@example.com".to_string();
    service.create(input, "poster-a@example.com").await.unwrap();

    let mut input = fixed_fee_input();
    input.client_email = "bob@example.com".to_string();
    service.create(input, "poster-b@example.com").await.unwrap();

    // No filters: everything comes back.
    let all = service.find(&PostingQuery::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    // Single filter.
    let query = PostingQuery {
        client_email: Some("alice@example.com".to_string()),
        ..PostingQuery::default()
    };
    let rows = service.find(&query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].client_email, "alice@example.com");

    // Both filters AND together.
    let query = PostingQuery {
        client_email: Some("alice@example.com".to_string()),
        poster_email: Some("poster-b@example.com".to_string()),
        ..PostingQuery::default()
    };
    assert!(service.find(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_sorts_and_pages() {
    let service = service();

    for title in ["charlie work", "alpha work", "bravo work"] {
        let mut input = fixed_fee_input();
        input.title = title.to_string();
        service.create(input, POSTER).await.unwrap();
    }

    let query = PostingQuery::default();
    let rows = service.find(&query).await.unwrap();
    let titles: Vec<&str> = rows.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["alpha work", "bravo work", "charlie work"]);

    let query = PostingQuery {
        sort_order: SortOrder::Desc,
        offset: 1,
        limit: 1,
        ..PostingQuery::default()
    };
    let rows = service.find(&query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "bravo work");
}
