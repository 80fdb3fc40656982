//! Admin authentication extractor
//!
//! Every panel route is operator-facing, so there is a single extractor:
//! verify the bearer token against the provider's JWKS, then require the
//! caller's own profile row to carry the admin role. Admin accounts share
//! the profiles table with students but never appear in any listing.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ErrorResponse;

/// Extractor that requires an authenticated admin
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub admin_id: Uuid,
}

#[derive(Debug)]
pub enum AdminAuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    NotAdmin,
    DatabaseError(String),
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AdminAuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing authorization token",
            ),
            AdminAuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid authorization format",
            ),
            AdminAuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AdminAuthError::NotAdmin => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Admin privileges required",
            ),
            AdminAuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        };

        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AdminAuthError::MissingToken)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidFormat)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AdminAuthError::InvalidFormat)?;

        if token.is_empty() {
            return Err(AdminAuthError::MissingToken);
        }

        let claims = state.jwks_cache.verify_token(token).await.map_err(|e| {
            tracing::warn!(error = %e, "JWT verification failed");
            AdminAuthError::InvalidToken
        })?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AdminAuthError::InvalidToken)?;

        tracing::debug!(user_id = %user_id, exp = claims.exp, "Admin token verified");

        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&state.db)
                .await
                .map_err(|e| AdminAuthError::DatabaseError(e.to_string()))?;

        if role.as_deref() != Some("admin") {
            tracing::warn!(
                user_id = %user_id,
                email = ?claims.email,
                "Non-admin caller attempted a panel route"
            );
            return Err(AdminAuthError::NotAdmin);
        }

        Ok(RequireAdmin { admin_id: user_id })
    }
}
