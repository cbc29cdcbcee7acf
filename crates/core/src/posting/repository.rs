//! Repository capability required by the posting service.

use async_trait::async_trait;

use lexmarket_shared::types::PostingId;

use super::error::PostingError;
use super::types::{NewPosting, PaymentUpdate, Posting, PostingQuery};

/// Storage capability for posting records.
///
/// The service owns all business rules; implementations own storage and
/// retrieval only. Storage failures surface as `PostingError::Database`.
#[async_trait]
pub trait PostingRepository: Send + Sync {
    /// Persists a new posting and returns it with its assigned identifier.
    async fn insert(&self, new: NewPosting) -> Result<Posting, PostingError>;

    /// Fetches a posting by identifier.
    async fn find_by_id(&self, id: PostingId) -> Result<Option<Posting>, PostingError>;

    /// Returns one page of postings matching the query filters, in the
    /// requested order.
    async fn find(&self, query: &PostingQuery) -> Result<Vec<Posting>, PostingError>;

    /// Returns the total number of posting records.
    async fn count(&self) -> Result<u64, PostingError>;

    /// Atomically applies the unpaid-to-paid transition.
    ///
    /// The update must take effect only if the posting's `paid_on` is still
    /// unset, as a single conditional store operation. Returns `true` if the
    /// transition applied, `false` if another payment won the race (or the
    /// posting no longer exists).
    async fn mark_paid(&self, id: PostingId, update: PaymentUpdate)
    -> Result<bool, PostingError>;
}
