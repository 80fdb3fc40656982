//! Workout plan domain types
//!
//! Read-only catalog entries used to populate the plan picker in the edit
//! view. The panel never writes to this catalog.

use serde::Serialize;
use uuid::Uuid;

/// Workout plan catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub name: String,
    pub category: String,
}
