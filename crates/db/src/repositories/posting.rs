//! Posting repository backed by Postgres.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use lexmarket_core::posting::{
    FeeStructure, NewPosting, PaymentUpdate, Posting, PostingError, PostingQuery,
    PostingRepository, PostingStatus, SortField, SortOrder,
};
use lexmarket_shared::types::PostingId;

use crate::entities::postings;

/// Postgres implementation of the posting repository capability.
#[derive(Debug, Clone)]
pub struct SqlPostingRepository {
    db: DatabaseConnection,
}

impl SqlPostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Maps a stored row into the domain record, surfacing unknown enum strings
/// as integrity faults.
fn into_domain(model: postings::Model) -> Result<Posting, PostingError> {
    let status = PostingStatus::parse(&model.status).ok_or(PostingError::InvalidStatus)?;
    let fee_structure =
        FeeStructure::parse(&model.fee_structure).ok_or(PostingError::InvalidFeeStructure)?;

    Ok(Posting {
        id: PostingId::from_uuid(model.id),
        title: model.title,
        description: model.description,
        client_email: model.client_email,
        poster_email: model.poster_email,
        created: model.created.with_timezone(&Utc),
        status,
        fee_structure,
        fee_amount: model.fee_amount,
        fee_percentage: model.fee_percentage,
        expected_settlement_amount: model.expected_settlement_amount,
        settlement_amount: model.settlement_amount,
        amount_paid: model.amount_paid,
        paid_on: model.paid_on.map(|t| t.with_timezone(&Utc)),
    })
}

fn db_err(err: sea_orm::DbErr) -> PostingError {
    PostingError::Database(err.to_string())
}

#[async_trait]
impl PostingRepository for SqlPostingRepository {
    async fn insert(&self, new: NewPosting) -> Result<Posting, PostingError> {
        let model = postings::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            description: Set(new.description),
            client_email: Set(new.client_email),
            poster_email: Set(new.poster_email),
            created: Set(new.created.into()),
            status: Set(new.status.as_str().to_string()),
            fee_structure: Set(new.fee_structure.as_str().to_string()),
            fee_amount: Set(new.fee_amount),
            fee_percentage: Set(new.fee_percentage),
            expected_settlement_amount: Set(new.expected_settlement_amount),
            settlement_amount: Set(None),
            amount_paid: Set(None),
            paid_on: Set(None),
        };

        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        into_domain(inserted)
    }

    async fn find_by_id(&self, id: PostingId) -> Result<Option<Posting>, PostingError> {
        postings::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(into_domain)
            .transpose()
    }

    async fn find(&self, query: &PostingQuery) -> Result<Vec<Posting>, PostingError> {
        let mut select = postings::Entity::find();

        if let Some(email) = &query.client_email {
            select = select.filter(postings::Column::ClientEmail.eq(email));
        }
        if let Some(email) = &query.poster_email {
            select = select.filter(postings::Column::PosterEmail.eq(email));
        }

        let sort_column = match query.sort_by {
            SortField::Title => postings::Column::Title,
            SortField::Created => postings::Column::Created,
        };
        let sort_order = match query.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let rows = select
            .order_by(sort_column, sort_order)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(into_domain).collect()
    }

    async fn count(&self) -> Result<u64, PostingError> {
        postings::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn mark_paid(
        &self,
        id: PostingId,
        update: PaymentUpdate,
    ) -> Result<bool, PostingError> {
        // Single conditional UPDATE ... WHERE id = $1 AND paid_on IS NULL.
        // A concurrent payment that already committed makes this match no
        // rows, which the service reports as the already-paid conflict.
        let mut stmt = postings::Entity::update_many()
            .col_expr(
                postings::Column::Status,
                Expr::value(PostingStatus::Paid.as_str()),
            )
            .col_expr(postings::Column::AmountPaid, Expr::value(update.amount_paid))
            .col_expr(postings::Column::PaidOn, Expr::value(update.paid_on));

        if let Some(settlement_amount) = update.settlement_amount {
            stmt = stmt.col_expr(
                postings::Column::SettlementAmount,
                Expr::value(settlement_amount),
            );
        }

        let result = stmt
            .filter(postings::Column::Id.eq(id.into_inner()))
            .filter(postings::Column::PaidOn.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }
}
