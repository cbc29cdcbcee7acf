//! Posting service: creation, querying, and the payment state machine.

use chrono::Utc;
use rust_decimal::Decimal;

use super::error::PostingError;
use super::repository::PostingRepository;
use super::settlement::SettlementPolicy;
use super::types::{
    CreatePosting, FeeStructure, NewPosting, PayRequest, PaymentUpdate, Posting, PostingQuery,
    PostingStatus,
};

/// Business logic for the posting lifecycle.
///
/// Holds a repository capability and the settlement tolerance policy; performs
/// no storage of its own.
pub struct PostingService<R: PostingRepository> {
    repo: R,
    settlement: SettlementPolicy,
}

impl<R: PostingRepository> PostingService<R> {
    /// Creates a service over the given repository and settlement policy.
    pub const fn new(repo: R, settlement: SettlementPolicy) -> Self {
        Self { repo, settlement }
    }

    /// Creates a posting for the authenticated caller.
    ///
    /// `poster_email` comes from the validated caller identity, never from the
    /// request body. The record starts `unpaid` with a server-side `created`
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the fee fields are inconsistent with
    /// the fee structure, or a database error from the insert.
    pub async fn create(
        &self,
        input: CreatePosting,
        poster_email: &str,
    ) -> Result<Posting, PostingError> {
        validate_fee_fields(&input)?;

        let new = NewPosting {
            title: input.title,
            description: input.description,
            client_email: input.client_email,
            poster_email: poster_email.to_string(),
            created: Utc::now(),
            status: PostingStatus::Unpaid,
            fee_structure: input.fee_structure,
            fee_amount: input.fee_amount,
            fee_percentage: input.fee_percentage,
            expected_settlement_amount: input.expected_settlement_amount,
        };

        self.repo.insert(new).await
    }

    /// Returns the total number of postings.
    ///
    /// # Errors
    ///
    /// Returns a database error if the count fails.
    pub async fn count(&self) -> Result<u64, PostingError> {
        self.repo.count().await
    }

    /// Returns one page of postings matching the query.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find(&self, query: &PostingQuery) -> Result<Vec<Posting>, PostingError> {
        self.repo.find(query).await
    }

    /// Records payment for a posting: the single unpaid-to-paid transition.
    ///
    /// Returns the posting as it existed immediately before the update was
    /// applied; callers re-fetch if they need the post-update record.
    ///
    /// # Errors
    ///
    /// Fails fast on: unknown id, already-paid posting, missing or
    /// out-of-tolerance settlement amount for No-Win-No-Fee postings, and
    /// corrupted fee data.
    pub async fn pay(&self, request: PayRequest) -> Result<Posting, PostingError> {
        let posting = self
            .repo
            .find_by_id(request.id)
            .await?
            .ok_or(PostingError::UnknownPosting)?;

        if posting.paid_on.is_some() {
            return Err(PostingError::AlreadyPaid);
        }

        let update = match posting.fee_structure {
            FeeStructure::FixedFee => {
                // The flat amount was fixed at creation; any settlement amount
                // in the submission is ignored.
                let amount_paid = posting.fee_amount.ok_or_else(|| {
                    PostingError::Internal("Fixed-Fee posting has no feeAmount".to_string())
                })?;
                PaymentUpdate {
                    amount_paid,
                    paid_on: Utc::now(),
                    settlement_amount: None,
                }
            }
            FeeStructure::NoWinNoFee => {
                let settlement_amount = request
                    .settlement_amount
                    .ok_or(PostingError::MissingSettlementAmount)?;

                let expected = posting.expected_settlement_amount.ok_or_else(|| {
                    PostingError::Internal(
                        "No-Win-No-Fee posting has no expectedSettlementAmount".to_string(),
                    )
                })?;
                self.settlement.validate(expected, settlement_amount)?;

                let fee_percentage = posting.fee_percentage.ok_or_else(|| {
                    PostingError::Internal(
                        "No-Win-No-Fee posting has no feePercentage".to_string(),
                    )
                })?;

                PaymentUpdate {
                    amount_paid: fee_percentage * settlement_amount,
                    paid_on: Utc::now(),
                    settlement_amount: Some(settlement_amount),
                }
            }
        };

        // Conditional update: only applies while paid_on is still unset. A
        // concurrent payment that commits between the read above and this
        // write makes the update match nothing.
        let applied = self.repo.mark_paid(posting.id, update).await?;
        if !applied {
            return Err(PostingError::AlreadyPaid);
        }

        Ok(posting)
    }
}

/// Cross-field validation of the fee arrangement at creation.
fn validate_fee_fields(input: &CreatePosting) -> Result<(), PostingError> {
    if input.fee_amount.is_some() && input.fee_percentage.is_some() {
        return Err(PostingError::BothFeeFieldsPresent);
    }

    match input.fee_structure {
        FeeStructure::FixedFee => {
            if input.fee_amount.is_none() {
                return Err(PostingError::MissingFeeAmount);
            }
        }
        FeeStructure::NoWinNoFee => {
            let Some(fee_percentage) = input.fee_percentage else {
                return Err(PostingError::MissingFeePercentage);
            };
            if fee_percentage < Decimal::ZERO || fee_percentage > Decimal::ONE {
                return Err(PostingError::FeePercentageOutOfRange);
            }
            if input.expected_settlement_amount.is_none() {
                return Err(PostingError::MissingExpectedSettlementAmount);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
