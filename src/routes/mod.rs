pub mod health;
pub mod integrations;
pub mod plans;
pub mod students;

use axum::{routing::get, routing::post, routing::put, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Students
        .route("/admin/students", get(students::list_students))
        .route("/admin/students", post(students::create_student))
        .route("/admin/students/:student_id", get(students::get_student))
        .route("/admin/students/:student_id", put(students::update_student))
        // Plan catalog
        .route("/admin/plans", get(plans::list_plans))
        // Integration settings
        .route(
            "/admin/integrations",
            get(integrations::get_integration_settings),
        )
        .route(
            "/admin/integrations",
            put(integrations::update_integration_settings),
        )
}
