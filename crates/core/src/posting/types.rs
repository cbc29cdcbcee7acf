//! Posting domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lexmarket_shared::types::PostingId;

/// Payment status of a posting.
///
/// A posting starts `unpaid` and becomes `paid` exactly once; there is no
/// reverse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    /// Payment has not been recorded yet.
    Unpaid,
    /// Payment has been recorded; terminal state.
    Paid,
}

impl PostingStatus {
    /// Returns the wire/storage string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }

    /// Parses a stored status string, `None` for anything outside the enum.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// Fee arrangement agreed at posting creation, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStructure {
    /// Flat predetermined fee, independent of outcome.
    #[serde(rename = "Fixed-Fee")]
    FixedFee,
    /// Percentage of the eventual settlement amount.
    #[serde(rename = "No-Win-No-Fee")]
    NoWinNoFee,
}

impl FeeStructure {
    /// Returns the wire/storage string for this fee structure.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedFee => "Fixed-Fee",
            Self::NoWinNoFee => "No-Win-No-Fee",
        }
    }

    /// Parses a stored fee structure string, `None` for anything outside the enum.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fixed-Fee" => Some(Self::FixedFee),
            "No-Win-No-Fee" => Some(Self::NoWinNoFee),
            _ => None,
        }
    }
}

/// A client's job record awaiting or having completed payment.
///
/// Field names serialize in camelCase to match the wire contract; optional
/// fields are omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    /// Identifier assigned by the repository at creation.
    pub id: PostingId,
    /// Short job title.
    pub title: String,
    /// Job description.
    pub description: String,
    /// Email of the party being represented.
    pub client_email: String,
    /// Email of the authenticated creator.
    pub poster_email: String,
    /// Server-side creation timestamp, immutable.
    pub created: DateTime<Utc>,
    /// Payment status.
    pub status: PostingStatus,
    /// Fee arrangement.
    pub fee_structure: FeeStructure,
    /// Flat fee, present only for Fixed-Fee postings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<Decimal>,
    /// Fee fraction in [0.0, 1.0], present only for No-Win-No-Fee postings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_percentage: Option<Decimal>,
    /// Settlement estimate given at creation; anchors the tolerance band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_settlement_amount: Option<Decimal>,
    /// Actual settlement reported at payment time (No-Win-No-Fee only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<Decimal>,
    /// Amount computed and recorded by the pay operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    /// When payment was recorded; set together with `amount_paid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<DateTime<Utc>>,
}

/// Client-supplied input for posting creation.
#[derive(Debug, Clone)]
pub struct CreatePosting {
    /// Short job title.
    pub title: String,
    /// Job description.
    pub description: String,
    /// Email of the party being represented.
    pub client_email: String,
    /// Fee arrangement.
    pub fee_structure: FeeStructure,
    /// Flat fee (Fixed-Fee only).
    pub fee_amount: Option<Decimal>,
    /// Fee fraction (No-Win-No-Fee only).
    pub fee_percentage: Option<Decimal>,
    /// Settlement estimate (No-Win-No-Fee only).
    pub expected_settlement_amount: Option<Decimal>,
}

/// A posting ready for insertion, with server-side fields stamped.
#[derive(Debug, Clone)]
pub struct NewPosting {
    /// Short job title.
    pub title: String,
    /// Job description.
    pub description: String,
    /// Email of the party being represented.
    pub client_email: String,
    /// Email of the authenticated creator, never client-supplied.
    pub poster_email: String,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Initial status, always `unpaid`.
    pub status: PostingStatus,
    /// Fee arrangement.
    pub fee_structure: FeeStructure,
    /// Flat fee (Fixed-Fee only).
    pub fee_amount: Option<Decimal>,
    /// Fee fraction (No-Win-No-Fee only).
    pub fee_percentage: Option<Decimal>,
    /// Settlement estimate (No-Win-No-Fee only).
    pub expected_settlement_amount: Option<Decimal>,
}

/// Sortable posting fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Sort by title.
    #[default]
    Title,
    /// Sort by creation timestamp.
    Created,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Filter, sort, and page parameters for posting queries.
///
/// Absent filter fields impose no constraint; present fields combine with AND.
#[derive(Debug, Clone)]
pub struct PostingQuery {
    /// Filter on the client email.
    pub client_email: Option<String>,
    /// Filter on the poster email.
    pub poster_email: Option<String>,
    /// Sort field.
    pub sort_by: SortField,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Number of records to skip.
    pub offset: u64,
    /// Maximum number of records to return.
    pub limit: u64,
}

impl Default for PostingQuery {
    fn default() -> Self {
        Self {
            client_email: None,
            poster_email: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            offset: 0,
            limit: 20,
        }
    }
}

/// A payment submission against an existing posting.
#[derive(Debug, Clone)]
pub struct PayRequest {
    /// The posting being paid.
    pub id: PostingId,
    /// Reported settlement amount; required for No-Win-No-Fee postings.
    pub settlement_amount: Option<Decimal>,
}

/// Fields applied atomically by the unpaid-to-paid transition.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    /// Amount computed by the fee policy.
    pub amount_paid: Decimal,
    /// Payment timestamp.
    pub paid_on: DateTime<Utc>,
    /// Reported settlement amount, persisted for No-Win-No-Fee postings only.
    pub settlement_amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_string_roundtrip() {
        assert_eq!(PostingStatus::Unpaid.as_str(), "unpaid");
        assert_eq!(PostingStatus::Paid.as_str(), "paid");
        assert_eq!(PostingStatus::parse("unpaid"), Some(PostingStatus::Unpaid));
        assert_eq!(PostingStatus::parse("paid"), Some(PostingStatus::Paid));
        assert_eq!(PostingStatus::parse("refunded"), None);
    }

    #[test]
    fn test_fee_structure_string_roundtrip() {
        assert_eq!(FeeStructure::FixedFee.as_str(), "Fixed-Fee");
        assert_eq!(FeeStructure::NoWinNoFee.as_str(), "No-Win-No-Fee");
        assert_eq!(
            FeeStructure::parse("Fixed-Fee"),
            Some(FeeStructure::FixedFee)
        );
        assert_eq!(
            FeeStructure::parse("No-Win-No-Fee"),
            Some(FeeStructure::NoWinNoFee)
        );
        assert_eq!(FeeStructure::parse("fixed-fee"), None);
        assert_eq!(FeeStructure::parse("Contingency"), None);
    }

    #[test]
    fn test_posting_serializes_camel_case_and_omits_absent_fields() {
        let posting = Posting {
            id: lexmarket_shared::types::PostingId::new(),
            title: "Conveyancing".to_string(),
            description: "Residential purchase".to_string(),
            client_email: "client@example.com".to_string(),
            poster_email: "solicitor@example.com".to_string(),
            created: Utc::now(),
            status: PostingStatus::Unpaid,
            fee_structure: FeeStructure::FixedFee,
            fee_amount: Some(dec!(400.00)),
            fee_percentage: None,
            expected_settlement_amount: None,
            settlement_amount: None,
            amount_paid: None,
            paid_on: None,
        };

        let json = serde_json::to_value(&posting).unwrap();
        assert_eq!(json["clientEmail"], "client@example.com");
        assert_eq!(json["posterEmail"], "solicitor@example.com");
        assert_eq!(json["status"], "unpaid");
        assert_eq!(json["feeStructure"], "Fixed-Fee");
        assert!(json.get("feePercentage").is_none());
        assert!(json.get("paidOn").is_none());
        assert!(json.get("amountPaid").is_none());
    }

    #[test]
    fn test_query_defaults() {
        let query = PostingQuery::default();
        assert_eq!(query.sort_by, SortField::Title);
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, 20);
        assert!(query.client_email.is_none());
        assert!(query.poster_email.is_none());
    }
}
