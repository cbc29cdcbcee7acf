//! Job posting routes: creation, queries, and payment submission.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use garde::Validate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use lexmarket_core::posting::{
    CreatePosting, FeeStructure, PayRequest, PostingError, PostingQuery, PostingService,
    SortField, SortOrder,
};
use lexmarket_db::SqlPostingRepository;
use lexmarket_shared::types::PostingId;

/// Creates the open posting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/postings", get(find_postings))
        .route("/postings/count", get(count_postings))
}

/// Creates the posting routes that require an authenticated caller
/// (auth middleware is applied externally).
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/postings", post(create_posting))
        .route("/postings/payment", post(pay_posting))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a posting.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostingRequest {
    /// Short job title.
    #[garde(length(chars, min = 5, max = 100))]
    pub title: String,
    /// Job description.
    #[garde(length(chars, min = 5, max = 4000))]
    pub description: String,
    /// Email of the party being represented.
    #[garde(email)]
    pub client_email: String,
    /// Fee arrangement: `Fixed-Fee` or `No-Win-No-Fee`.
    #[garde(skip)]
    pub fee_structure: FeeStructure,
    /// Flat fee (Fixed-Fee only).
    #[garde(skip)]
    pub fee_amount: Option<Decimal>,
    /// Fee fraction in [0.0, 1.0] (No-Win-No-Fee only).
    #[garde(skip)]
    pub fee_percentage: Option<Decimal>,
    /// Settlement estimate (No-Win-No-Fee only).
    #[garde(skip)]
    pub expected_settlement_amount: Option<Decimal>,
}

/// Query parameters for listing postings.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetPostingsQuery {
    /// Filter on the client email.
    #[garde(inner(email))]
    pub client_email: Option<String>,
    /// Filter on the poster email.
    #[garde(inner(email))]
    pub poster_email: Option<String>,
    /// Sort field, `title` by default.
    #[garde(skip)]
    #[serde(default)]
    pub sort_by: SortField,
    /// Sort direction, `asc` by default.
    #[garde(skip)]
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Number of records to skip.
    #[garde(skip)]
    #[serde(default)]
    pub offset: u64,
    /// Page size.
    #[garde(range(min = 1))]
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

/// Request body for submitting a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPostingRequest {
    /// The posting being paid.
    pub id: Option<PostingId>,
    /// Reported settlement amount; required for No-Win-No-Fee postings.
    pub settlement_amount: Option<Decimal>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Builds a posting service over the request's database handle.
fn posting_service(state: &AppState) -> PostingService<SqlPostingRepository> {
    PostingService::new(
        SqlPostingRepository::new((*state.db).clone()),
        state.settlement,
    )
}

/// Maps a mechanical validation failure to a 400 response.
fn validation_error_response(report: &garde::Report) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": report.to_string(),
        })),
    )
        .into_response()
}

/// Maps a posting error to its wire response.
///
/// The tolerance rejection carries its rounded bounds as structured fields;
/// everything else uses the standard error/message shape.
fn posting_error_response(err: &PostingError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, "Posting operation failed");
    }

    let body = match err {
        PostingError::SettlementOutOfRange { min, max } => json!({
            "error": err.to_string(),
            "minSettlementAmount": min,
            "maxSettlementAmount": max,
        }),
        _ => json!({
            "error": err.error_code(),
            "message": err.to_string(),
        }),
    };

    (status, Json(body)).into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/postings` - Create a posting for the authenticated caller.
async fn create_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePostingRequest>,
) -> Response {
    if let Err(report) = payload.validate() {
        return validation_error_response(&report);
    }

    let input = CreatePosting {
        title: payload.title,
        description: payload.description,
        client_email: payload.client_email,
        fee_structure: payload.fee_structure,
        fee_amount: payload.fee_amount,
        fee_percentage: payload.fee_percentage,
        expected_settlement_amount: payload.expected_settlement_amount,
    };

    match posting_service(&state).create(input, auth.email()).await {
        Ok(posting) => {
            info!(posting_id = %posting.id, poster = %posting.poster_email, "Posting created");
            (StatusCode::CREATED, Json(posting)).into_response()
        }
        Err(e) => posting_error_response(&e),
    }
}

/// GET `/postings/count` - Total number of postings.
async fn count_postings(State(state): State<AppState>) -> Response {
    match posting_service(&state).count().await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(e) => posting_error_response(&e),
    }
}

/// GET `/postings` - List postings with optional filters, sort, and paging.
async fn find_postings(
    State(state): State<AppState>,
    Query(params): Query<GetPostingsQuery>,
) -> Response {
    if let Err(report) = params.validate() {
        return validation_error_response(&report);
    }

    let query = PostingQuery {
        client_email: params.client_email,
        poster_email: params.poster_email,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        offset: params.offset,
        limit: params.limit,
    };

    match posting_service(&state).find(&query).await {
        Ok(postings) => (StatusCode::OK, Json(postings)).into_response(),
        Err(e) => posting_error_response(&e),
    }
}

/// POST `/postings/payment` - Record payment for a posting.
///
/// On success the response echoes the posting as it was before the update was
/// applied; callers re-fetch if they need the post-update record.
async fn pay_posting(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<PayPostingRequest>,
) -> Response {
    // A submission without an id cannot reference an existing posting.
    let Some(id) = payload.id else {
        return posting_error_response(&PostingError::UnknownPosting);
    };

    let request = PayRequest {
        id,
        settlement_amount: payload.settlement_amount,
    };

    match posting_service(&state).pay(request).await {
        Ok(snapshot) => {
            info!(posting_id = %snapshot.id, "Payment recorded");
            (StatusCode::CREATED, Json(snapshot)).into_response()
        }
        Err(e) => posting_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_accepts_valid_input() {
        let payload: CreatePostingRequest = serde_json::from_str(
            r#"{
                "title": "title test",
                "description": "description test",
                "clientEmail": "clientEmailTest@example.com",
                "feeStructure": "Fixed-Fee",
                "feeAmount": 400.0
            }"#,
        )
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.fee_structure, FeeStructure::FixedFee);
        assert_eq!(payload.fee_amount, Some(dec!(400.0)));
        assert!(payload.fee_percentage.is_none());
    }

    #[test]
    fn test_create_request_rejects_short_title_and_bad_email() {
        let payload: CreatePostingRequest = serde_json::from_str(
            r#"{
                "title": "shrt",
                "description": "description test",
                "clientEmail": "not-an-email",
                "feeStructure": "Fixed-Fee",
                "feeAmount": 400.0
            }"#,
        )
        .unwrap();

        let report = payload.validate().unwrap_err();
        let message = report.to_string();
        assert!(message.contains("title"));
        assert!(message.contains("client_email"));
    }

    #[test]
    fn test_create_request_rejects_unknown_fee_structure() {
        let result: Result<CreatePostingRequest, _> = serde_json::from_str(
            r#"{
                "title": "title test",
                "description": "description test",
                "clientEmail": "clientEmailTest@example.com",
                "feeStructure": "Contingency"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_pay_request_tolerates_missing_fields() {
        let payload: PayPostingRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.id.is_none());
        assert!(payload.settlement_amount.is_none());
    }

    #[test]
    fn test_get_postings_query_defaults() {
        let params: GetPostingsQuery = serde_json::from_str("{}").unwrap();

        assert!(params.validate().is_ok());
        assert_eq!(params.sort_by, SortField::Title);
        assert_eq!(params.sort_order, SortOrder::Asc);
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn test_get_postings_query_rejects_zero_limit() {
        let params: GetPostingsQuery = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_get_postings_query_rejects_invalid_filter_email() {
        let params: GetPostingsQuery =
            serde_json::from_str(r#"{"posterEmail": "not-an-email"}"#).unwrap();
        assert!(params.validate().is_err());
    }
}
