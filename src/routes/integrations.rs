//! Integration settings routes
//!
//! Panel-wide third-party toggles, stored as a single JSONB row.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::integrations::{
    IntegrationSettings, IntegrationSettingsResponse, UpdateIntegrationSettingsRequest,
};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct IntegrationSettingsRow {
    settings: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IntegrationSettingsRow> for IntegrationSettingsResponse {
    type Error = ApiError;

    fn try_from(row: IntegrationSettingsRow) -> Result<Self, Self::Error> {
        let settings: IntegrationSettings = serde_json::from_value(row.settings)
            .map_err(|e| ApiError::internal(format!("Failed to parse settings: {}", e)))?;

        Ok(Self {
            settings,
            updated_at: row.updated_at,
        })
    }
}

/// GET /admin/integrations
///
/// Get the integration settings, defaulting to everything disabled when no
/// row has been saved yet.
pub async fn get_integration_settings(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, IntegrationSettingsRow>(
        r#"
        SELECT settings, updated_at
        FROM integration_settings
        WHERE id = 1
        "#,
    )
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some(row) => {
            let response: IntegrationSettingsResponse = row.try_into()?;
            Ok(Json(DataResponse::new(response)))
        }
        None => Ok(Json(DataResponse::new(IntegrationSettingsResponse {
            settings: IntegrationSettings::default(),
            updated_at: Utc::now(),
        }))),
    }
}

/// PUT /admin/integrations
///
/// Replace the integration settings.
pub async fn update_integration_settings(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Json(req): Json<UpdateIntegrationSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(webhook) = req
        .settings
        .payment_webhook_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        url::Url::parse(webhook)
            .map_err(|_| ApiError::validation("Payment webhook URL is not a valid URL"))?;
    }

    let settings = serde_json::to_value(&req.settings)
        .map_err(|e| ApiError::internal(format!("Failed to serialize settings: {}", e)))?;

    let row = sqlx::query_as::<_, IntegrationSettingsRow>(
        r#"
        INSERT INTO integration_settings (id, settings, updated_at)
        VALUES (1, $1, NOW())
        ON CONFLICT (id) DO UPDATE SET
            settings = EXCLUDED.settings,
            updated_at = NOW()
        RETURNING settings, updated_at
        "#,
    )
    .bind(&settings)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(admin_id = %admin.admin_id, "Integration settings updated");

    let response: IntegrationSettingsResponse = row.try_into()?;
    Ok(Json(DataResponse::new(response)))
}
