//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod health;
pub mod postings;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Submissions require an authenticated caller; queries are open.
    let protected_routes = postings::protected_routes().layer(middleware::from_fn_with_state(
        state,
        auth_middleware,
    ));

    Router::new()
        .merge(health::routes())
        .merge(postings::routes())
        .merge(protected_routes)
}
