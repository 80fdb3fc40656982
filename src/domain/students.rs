//! Student domain types
//!
//! A "student" is an end user of the fitness service, managed through the
//! admin panel. Accounts with the `admin` role live in the same table but are
//! excluded from every listing and filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Program track assigned to a student.
///
/// This is the workout program track selection, not a biographical field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculino,
    Feminino,
    Personalizado,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Masculino
    }
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masculino => "masculino",
            Self::Feminino => "feminino",
            Self::Personalizado => "personalizado",
        }
    }

    /// Parse the stored value, falling back to the default track.
    pub fn from_label(s: &str) -> Self {
        match s {
            "feminino" => Self::Feminino,
            "personalizado" => Self::Personalizado,
            _ => Self::Masculino,
        }
    }
}

/// Subscription badge derived from the stored status label.
///
/// Status is persisted as free text ("Ativo", "Teste Grátis", and suffixed
/// trial variants such as "Teste Grátis - 3"). Anything that is not
/// recognizably a trial renders as an active subscription.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trial,
}

impl SubscriptionStatus {
    /// Default status label assigned at creation.
    pub const DEFAULT_LABEL: &'static str = "Ativo";

    /// Label marker shared by every trial variant.
    pub const TRIAL_MARKER: &'static str = "Teste";

    pub fn from_label(label: &str) -> Self {
        if label.contains(Self::TRIAL_MARKER) {
            Self::Trial
        } else {
            Self::Active
        }
    }
}

/// Status filter accepted by the student listing.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Trial,
}

/// Student profile entity
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub phone: Option<String>,
    pub gender: Gender,
    /// Raw status label as stored; see [`SubscriptionStatus::from_label`].
    pub status: String,
    /// Remaining trial days, kept as entered. Only meaningful on trial
    /// accounts; decrementing it is a scheduled job elsewhere, not ours.
    pub trial_days: Option<String>,
    pub coupon: Option<String>,
    pub plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn badge(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_label(&self.status)
    }
}

/// Request DTO for creating a student
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "default_status_label")]
    pub status: String,
    #[serde(default)]
    pub trial_days: Option<String>,
    #[serde(default)]
    pub coupon: Option<String>,
}

fn default_status_label() -> String {
    SubscriptionStatus::DEFAULT_LABEL.to_string()
}

/// Request DTO for editing a student
///
/// A full replacement of the mutable fields. `username` is fixed after
/// creation (it anchors the login identifier), and `id`, `role`,
/// `created_at` are write-once.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudentRequest {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "default_status_label")]
    pub status: String,
    #[serde(default)]
    pub trial_days: Option<String>,
    #[serde(default)]
    pub coupon: Option<String>,
    /// Plan picker value; an empty or blank selection means "no plan".
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Response DTO for a student row
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub phone: Option<String>,
    pub gender: Gender,
    pub status: String,
    pub badge: SubscriptionStatus,
    pub trial_days: Option<String>,
    pub coupon: Option<String>,
    pub plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(s: Student) -> Self {
        let badge = s.badge();
        Self {
            id: s.id,
            full_name: s.full_name,
            username: s.username,
            phone: s.phone,
            gender: s.gender,
            status: s.status,
            badge,
            trial_days: s.trial_days,
            coupon: s.coupon,
            plan_id: s.plan_id,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_badge_matches_suffixed_variants() {
        assert_eq!(
            SubscriptionStatus::from_label("Teste Grátis"),
            SubscriptionStatus::Trial
        );
        assert_eq!(
            SubscriptionStatus::from_label("Teste Grátis - 3"),
            SubscriptionStatus::Trial
        );
    }

    #[test]
    fn unknown_status_defaults_to_active_badge() {
        assert_eq!(
            SubscriptionStatus::from_label("Ativo"),
            SubscriptionStatus::Active
        );
        assert_eq!(
            SubscriptionStatus::from_label("algum valor antigo"),
            SubscriptionStatus::Active
        );
        assert_eq!(SubscriptionStatus::from_label(""), SubscriptionStatus::Active);
    }

    #[test]
    fn gender_falls_back_to_default_track() {
        assert_eq!(Gender::from_label("feminino"), Gender::Feminino);
        assert_eq!(Gender::from_label("personalizado"), Gender::Personalizado);
        assert_eq!(Gender::from_label("???"), Gender::Masculino);
    }

    #[test]
    fn status_filter_deserializes_from_query_values() {
        assert_eq!(
            serde_json::from_str::<StatusFilter>("\"trial\"").unwrap(),
            StatusFilter::Trial
        );
        assert_eq!(
            serde_json::from_str::<StatusFilter>("\"active\"").unwrap(),
            StatusFilter::Active
        );
        assert_eq!(
            serde_json::from_str::<StatusFilter>("\"all\"").unwrap(),
            StatusFilter::All
        );
    }

    #[test]
    fn create_request_defaults_to_active_status() {
        let req: CreateStudentRequest = serde_json::from_str(
            r#"{"full_name":"Ana Souza","username":"ana","password":"secret"}"#,
        )
        .unwrap();
        assert_eq!(req.status, "Ativo");
        assert_eq!(req.gender, Gender::Masculino);
        assert!(req.phone.is_none());
    }
}
