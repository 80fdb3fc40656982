//! Student routes
//!
//! List/filter, create, and edit endpoints for student accounts. The list
//! always loads the full role=user set newest-first and filters in memory;
//! at panel scale a full re-scan per request is the contract.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::students::{
    CreateStudentRequest, Gender, StatusFilter, Student, StudentResponse, UpdateStudentRequest,
};
use crate::error::ApiError;
use crate::services::lifecycle;

/// Database row for a student profile
#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    full_name: String,
    username: String,
    phone: Option<String>,
    gender: String,
    status: String,
    trial_days: Option<String>,
    coupon: Option<String>,
    plan_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            username: row.username,
            phone: row.phone,
            gender: Gender::from_label(&row.gender),
            status: row.status,
            trial_days: row.trial_days,
            coupon: row.coupon,
            plan_id: row.plan_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const STUDENT_COLUMNS: &str = "id, full_name, username, phone, gender, status, \
                               trial_days, coupon, plan_id, created_at, updated_at";

/// Query parameters for the student listing
#[derive(Debug, Deserialize, Default)]
pub struct ListStudentsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Serialize)]
pub struct CreatedStudentResponse {
    pub id: Uuid,
}

/// GET /admin/students
///
/// List student accounts, newest first, filtered by search term and
/// subscription status. An empty result is a normal 200.
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListStudentsQuery>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let rows = sqlx::query_as::<_, StudentRow>(&format!(
        r#"
        SELECT {STUDENT_COLUMNS}
        FROM profiles
        WHERE role = 'user'
        ORDER BY created_at DESC
        "#,
    ))
    .fetch_all(&state.db)
    .await?;

    let students: Vec<Student> = rows.into_iter().map(Into::into).collect();

    let search = query.search.as_deref().unwrap_or("");
    let visible: Vec<StudentResponse> = lifecycle::filter_students(&students, search, query.status)
        .into_iter()
        .cloned()
        .map(Into::into)
        .collect();

    Ok(Json(DataResponse::new(visible)))
}

/// GET /admin/students/:id
///
/// Fetch a single student for the edit view.
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, StudentRow>(&format!(
        r#"
        SELECT {STUDENT_COLUMNS}
        FROM profiles
        WHERE id = $1 AND role = 'user'
        "#,
    ))
    .bind(student_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Student not found"))?;

    let response: StudentResponse = Student::from(row).into();
    Ok(Json(DataResponse::new(response)))
}

/// POST /admin/students
///
/// Create a student account. The credential issuer owns the new id and the
/// initial profile row; the panel re-fetches the list to pick it up.
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Json(req): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let issued = lifecycle::create_student(&state.identity, req).await?;

    tracing::info!(
        admin_id = %admin.admin_id,
        student_id = %issued.user_id,
        "Student account created"
    );

    Ok(Created(DataResponse::new(CreatedStudentResponse {
        id: issued.user_id,
    })))
}

/// PUT /admin/students/:id
///
/// Full replacement of the mutable fields. `id`, `username`, `role` and
/// `created_at` are never touched. Last write wins; concurrent edits of the
/// same row clobber each other silently.
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    admin: RequireAdmin,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required"));
    }

    let plan_id = lifecycle::normalize_plan_selection(req.plan_id.as_deref())?;

    let row = sqlx::query_as::<_, StudentRow>(&format!(
        r#"
        UPDATE profiles SET
            full_name = $2,
            phone = $3,
            gender = $4,
            status = $5,
            trial_days = $6,
            coupon = $7,
            plan_id = $8,
            updated_at = NOW()
        WHERE id = $1 AND role = 'user'
        RETURNING {STUDENT_COLUMNS}
        "#,
    ))
    .bind(student_id)
    .bind(&req.full_name)
    .bind(&req.phone)
    .bind(req.gender.as_str())
    .bind(&req.status)
    .bind(&req.trial_days)
    .bind(&req.coupon)
    .bind(plan_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Student not found"))?;

    let response: StudentResponse = Student::from(row).into();

    tracing::info!(
        admin_id = %admin.admin_id,
        student_id = %student_id,
        "Student profile updated"
    );

    Ok(Json(DataResponse::new(response)))
}
