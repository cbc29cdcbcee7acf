//! Job posting lifecycle and payment settlement.
//!
//! A posting is created `unpaid` and transitions to `paid` exactly once. The
//! amount owed depends on the posting's fee structure: Fixed-Fee postings pay
//! the flat amount fixed at creation, No-Win-No-Fee postings pay a percentage
//! of the reported settlement amount, which must fall inside a tolerance band
//! around the estimate given at creation.

pub mod error;
pub mod repository;
pub mod service;
pub mod settlement;
pub mod types;

pub use error::PostingError;
pub use repository::PostingRepository;
pub use service::PostingService;
pub use settlement::SettlementPolicy;
pub use types::{
    CreatePosting, FeeStructure, NewPosting, PayRequest, PaymentUpdate, Posting, PostingQuery,
    PostingStatus, SortField, SortOrder,
};
