//! Posting error types for validation, state, and integrity errors.

use thiserror::Error;

/// Errors that can occur during posting operations.
///
/// Messages are part of the wire contract and must not be reworded.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Creation Validation Errors ==========
    /// Both fee fields supplied at creation.
    #[error("feeAmount and feePercentage must not both be present")]
    BothFeeFieldsPresent,

    /// Fixed-Fee posting created without a flat fee.
    #[error("Fixed-Fee jobs require feeAmount")]
    MissingFeeAmount,

    /// No-Win-No-Fee posting created without a fee percentage.
    #[error("No-Win-No-Fee jobs require feePercentage")]
    MissingFeePercentage,

    /// Fee percentage outside the unit interval.
    #[error("feePercentage must be between 0.0 and 1.0")]
    FeePercentageOutOfRange,

    /// No-Win-No-Fee posting created without a settlement estimate.
    #[error("No-Win-No-Fee jobs require expectedSettlementAmount")]
    MissingExpectedSettlementAmount,

    // ========== Payment Errors ==========
    /// Payment request references a posting that does not exist.
    #[error("job posting _id does not exist")]
    UnknownPosting,

    /// Payment request targets a posting that is already paid.
    #[error("job has already been paid")]
    AlreadyPaid,

    /// Payment submission for a No-Win-No-Fee posting without a settlement amount.
    #[error("No-Win-No-Fee jobs require settlementAmount in the payment submission")]
    MissingSettlementAmount,

    /// Reported settlement amount falls outside the tolerance band.
    ///
    /// Bounds are rounded to the nearest whole amount for display; the
    /// comparison itself uses the unrounded band.
    #[error("settlementAmount must be at least minSettlementAmount and at most maxSettlementAmount")]
    SettlementOutOfRange {
        /// Lower bound, rounded to the nearest whole amount.
        min: i64,
        /// Upper bound, rounded to the nearest whole amount.
        max: i64,
    },

    // ========== Integrity Faults ==========
    /// Stored fee structure is outside the known enum; corrupted data, not a
    /// client error.
    #[error("invalid job fee structure")]
    InvalidFeeStructure,

    /// Stored status is outside the known enum.
    #[error("invalid job status")]
    InvalidStatus,

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BothFeeFieldsPresent => "BOTH_FEE_FIELDS_PRESENT",
            Self::MissingFeeAmount => "MISSING_FEE_AMOUNT",
            Self::MissingFeePercentage => "MISSING_FEE_PERCENTAGE",
            Self::FeePercentageOutOfRange => "FEE_PERCENTAGE_OUT_OF_RANGE",
            Self::MissingExpectedSettlementAmount => "MISSING_EXPECTED_SETTLEMENT_AMOUNT",
            Self::UnknownPosting => "POSTING_NOT_FOUND",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::MissingSettlementAmount => "MISSING_SETTLEMENT_AMOUNT",
            Self::SettlementOutOfRange { .. } => "SETTLEMENT_OUT_OF_RANGE",
            Self::InvalidFeeStructure => "INVALID_FEE_STRUCTURE",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Every client-side failure maps to 400 for wire compatibility,
    /// including the already-paid conflict; integrity and infrastructure
    /// faults map to 500.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::BothFeeFieldsPresent
            | Self::MissingFeeAmount
            | Self::MissingFeePercentage
            | Self::FeePercentageOutOfRange
            | Self::MissingExpectedSettlementAmount
            | Self::UnknownPosting
            | Self::AlreadyPaid
            | Self::MissingSettlementAmount
            | Self::SettlementOutOfRange { .. } => 400,

            Self::InvalidFeeStructure
            | Self::InvalidStatus
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }
}
