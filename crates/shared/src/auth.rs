//! Authentication types for JWT-carried caller identity.
//!
//! Token issuance lives with the external identity provider; this service only
//! validates tokens signed with the shared secret and reads the caller's email
//! out of the claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email address of the authenticated caller.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a caller.
    #[must_use]
    pub fn new(email: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the caller's email from the claims.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
