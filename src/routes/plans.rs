//! Workout plan catalog routes

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::plans::WorkoutPlan;
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    category: String,
}

/// GET /admin/plans
///
/// List the plan catalog grouped alphabetically by category, for the plan
/// picker in the edit view. A catalog fetch failure degrades to an empty
/// list rather than blocking the edit workflow.
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let plans = match sqlx::query_as::<_, PlanRow>(
        r#"
        SELECT id, name, category
        FROM workout_plans
        ORDER BY category ASC, name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    {
        Ok(rows) => rows
            .into_iter()
            .map(|r| WorkoutPlan {
                id: r.id,
                name: r.name,
                category: r.category,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Plan catalog fetch failed; serving empty catalog");
            Vec::new()
        }
    };

    Ok(Json(DataResponse::new(plans)))
}
