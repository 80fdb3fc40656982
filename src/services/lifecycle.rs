//! Student lifecycle rules
//!
//! The one place with business logic: creation validation, login-identifier
//! derivation, plan-selection normalization, and the list filter. Everything
//! here is deliberately free of HTTP concerns so the rules can be exercised
//! directly.

use uuid::Uuid;

use crate::domain::students::{CreateStudentRequest, StatusFilter, Student, SubscriptionStatus};
use crate::error::{ApiError, ApiResult};
use crate::services::identity::{CredentialIssuer, IdentityError, IssuedCredential, SignupMetadata};

/// Students have no real email address; their login identifier is derived
/// from the username under this internal domain so the provider's
/// email+password signup contract stays usable.
pub const LOGIN_DOMAIN: &str = "@aluno.fitadmin.app";

/// Lower-case the username and strip every whitespace character, leading,
/// trailing and internal.
pub fn normalize_username(username: &str) -> String {
    username
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Derive the synthetic login identifier for a username.
pub fn synthetic_login_email(username: &str) -> String {
    format!("{}{}", normalize_username(username), LOGIN_DOMAIN)
}

/// Check the required creation fields. Runs before any external call so a
/// failing create leaves no partial state anywhere.
pub fn validate_new_student(req: &CreateStudentRequest) -> ApiResult<()> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required"));
    }
    if req.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if req.password.trim().is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(())
}

/// Normalize the plan picker value: blank means "no plan assigned" and is
/// stored as NULL, never as an empty string.
pub fn normalize_plan_selection(selection: Option<&str>) -> ApiResult<Option<Uuid>> {
    match selection {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| ApiError::validation("Invalid plan selection"))
            }
        }
    }
}

/// Compute the visible subset of the student list.
///
/// Search matches case-insensitively against name, phone and username; the
/// phone comparison is a raw substring, punctuation included. The `trial`
/// filter matches any stored status containing the trial marker, so
/// suffixed variants keep matching.
pub fn filter_students<'a>(
    students: &'a [Student],
    search_term: &str,
    status: StatusFilter,
) -> Vec<&'a Student> {
    let needle = search_term.trim().to_lowercase();

    students
        .iter()
        .filter(|s| {
            if !needle.is_empty() {
                let hit = s.full_name.to_lowercase().contains(&needle)
                    || s.username.to_lowercase().contains(&needle)
                    || s.phone
                        .as_deref()
                        .is_some_and(|p| p.to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
            match status {
                StatusFilter::All => true,
                StatusFilter::Active => s.badge() == SubscriptionStatus::Active,
                StatusFilter::Trial => s.status.contains(SubscriptionStatus::TRIAL_MARKER),
            }
        })
        .collect()
}

/// Create workflow: validate, derive the login identifier, then hand the
/// whole profile to the credential issuer in a single call. The issuer owns
/// both the new account and the initial profile row; nothing is written
/// here. A duplicate username fails on the issuer side, which is the
/// intended collision guard.
pub async fn create_student<I: CredentialIssuer + ?Sized>(
    issuer: &I,
    req: CreateStudentRequest,
) -> ApiResult<IssuedCredential> {
    validate_new_student(&req)?;

    let email = synthetic_login_email(&req.username);
    let metadata = SignupMetadata {
        full_name: req.full_name,
        username: normalize_username(&req.username),
        phone: req.phone,
        role: "user",
        gender: req.gender,
        status: req.status,
        trial_days: req.trial_days,
        coupon: req.coupon,
    };

    issuer
        .sign_up(&email, &req.password, &metadata)
        .await
        .map_err(|e| match e {
            // Provider refusals reach the operator verbatim; no retry.
            IdentityError::Rejected(msg) => ApiError::external(msg),
            IdentityError::Unreachable(msg) => ApiError::external(msg),
            IdentityError::Malformed(msg) => ApiError::internal(msg),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::students::Gender;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingIssuer {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String, SignupMetadata)>>,
        reject_with: Option<String>,
    }

    impl RecordingIssuer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                reject_with: None,
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                reject_with: Some(message.to_string()),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialIssuer for RecordingIssuer {
        async fn sign_up(
            &self,
            email: &str,
            password: &str,
            metadata: &SignupMetadata,
        ) -> Result<IssuedCredential, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                email.to_string(),
                password.to_string(),
                metadata.clone(),
            ));
            if let Some(msg) = &self.reject_with {
                return Err(IdentityError::Rejected(msg.clone()));
            }
            Ok(IssuedCredential {
                user_id: Uuid::new_v4(),
            })
        }
    }

    fn create_request(full_name: &str, username: &str, password: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            full_name: full_name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            phone: None,
            gender: Gender::default(),
            status: "Ativo".to_string(),
            trial_days: None,
            coupon: None,
        }
    }

    fn student(full_name: &str, username: &str, phone: Option<&str>, status: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            username: username.to_string(),
            phone: phone.map(str::to_string),
            gender: Gender::default(),
            status: status.to_string(),
            trial_days: None,
            coupon: None,
            plan_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn login_email_is_lowercased_and_whitespace_stripped() {
        assert_eq!(synthetic_login_email(" João "), "joão@aluno.fitadmin.app");
        assert_eq!(
            synthetic_login_email("Ana Maria"),
            "anamaria@aluno.fitadmin.app"
        );
        assert_eq!(synthetic_login_email("CARLOS"), "carlos@aluno.fitadmin.app");
    }

    #[tokio::test]
    async fn missing_required_fields_never_reach_the_issuer() {
        let issuer = RecordingIssuer::new();

        for req in [
            create_request("", "ana", "secret"),
            create_request("   ", "ana", "secret"),
            create_request("Ana", "", "secret"),
            create_request("Ana", "ana", ""),
            create_request("Ana", "ana", "   "),
        ] {
            let result = create_student(&issuer, req).await;
            assert!(matches!(result, Err(ApiError::Validation(_))));
        }

        assert_eq!(issuer.call_count(), 0);
    }

    #[tokio::test]
    async fn create_sends_derived_email_and_full_metadata_bag() {
        let issuer = RecordingIssuer::new();
        let mut req = create_request("João Pedro", " João ", "secret123");
        req.phone = Some("(11) 99999-0000".to_string());
        req.coupon = Some("VERAO10".to_string());

        create_student(&issuer, req).await.unwrap();

        assert_eq!(issuer.call_count(), 1);
        let seen = issuer.seen.lock().unwrap();
        let (email, password, metadata) = &seen[0];
        assert_eq!(email, "joão@aluno.fitadmin.app");
        assert_eq!(password, "secret123");
        assert_eq!(metadata.role, "user");
        assert_eq!(metadata.username, "joão");
        assert_eq!(metadata.full_name, "João Pedro");
        assert_eq!(metadata.status, "Ativo");
        assert_eq!(metadata.phone.as_deref(), Some("(11) 99999-0000"));
        assert_eq!(metadata.coupon.as_deref(), Some("VERAO10"));
    }

    #[tokio::test]
    async fn issuer_rejection_surfaces_verbatim() {
        let issuer = RecordingIssuer::rejecting("User already registered");
        let result = create_student(&issuer, create_request("Ana", "ana", "secret")).await;

        match result {
            Err(ApiError::ExternalService(msg)) => assert_eq!(msg, "User already registered"),
            other => panic!("expected external service error, got {:?}", other.err()),
        }
    }

    #[test]
    fn blank_plan_selection_normalizes_to_none() {
        assert_eq!(normalize_plan_selection(None).unwrap(), None);
        assert_eq!(normalize_plan_selection(Some("")).unwrap(), None);
        assert_eq!(normalize_plan_selection(Some("   ")).unwrap(), None);
    }

    #[test]
    fn plan_selection_parses_or_fails_validation() {
        let id = Uuid::new_v4();
        assert_eq!(
            normalize_plan_selection(Some(&id.to_string())).unwrap(),
            Some(id)
        );
        assert!(matches!(
            normalize_plan_selection(Some("not-a-uuid")),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn trial_filter_keeps_exactly_the_trial_rows() {
        let students = vec![
            student("Ana", "ana", None, "Ativo"),
            student("Bia", "bia", None, "Teste Grátis"),
        ];

        let visible = filter_students(&students, "", StatusFilter::Trial);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Bia");
    }

    #[test]
    fn trial_filter_matches_suffixed_variants() {
        let students = vec![
            student("Bia", "bia", None, "Teste Grátis - 3"),
            student("Ana", "ana", None, "Ativo"),
        ];

        let visible = filter_students(&students, "", StatusFilter::Trial);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].full_name, "Bia");
    }

    #[test]
    fn search_is_case_insensitive_across_name_phone_and_username() {
        let students = vec![
            student("Carlos Lima", "carlim", Some("(11) 98888-7777"), "Ativo"),
            student("Duda Reis", "dudinha", None, "Ativo"),
        ];

        assert_eq!(filter_students(&students, "CARLOS", StatusFilter::All).len(), 1);
        assert_eq!(filter_students(&students, "dinh", StatusFilter::All).len(), 1);
        assert_eq!(filter_students(&students, "98888", StatusFilter::All).len(), 1);
        // Punctuation is not normalized away on phones
        assert!(filter_students(&students, "1198888", StatusFilter::All).is_empty());
    }

    #[test]
    fn filtered_result_is_a_subset_and_predicates_compose() {
        let students = vec![
            student("Ana Souza", "ana", Some("111"), "Ativo"),
            student("Ana Lima", "analima", Some("222"), "Teste Grátis"),
            student("Bia Costa", "bia", None, "Teste Grátis - 2"),
        ];

        let both = filter_students(&students, "ana", StatusFilter::Trial);
        let search_only = filter_students(&students, "ana", StatusFilter::All);
        let status_only = filter_students(&students, "", StatusFilter::Trial);

        assert_eq!(both.len(), 1);
        assert_eq!(both[0].full_name, "Ana Lima");

        // Every combined hit satisfies each predicate on its own
        for hit in &both {
            assert!(search_only.iter().any(|s| s.id == hit.id));
            assert!(status_only.iter().any(|s| s.id == hit.id));
        }

        // Dropping a predicate can only widen the result
        assert!(search_only.len() >= both.len());
        assert!(status_only.len() >= both.len());
    }

    #[test]
    fn no_filters_returns_the_whole_set() {
        let students = vec![
            student("Ana", "ana", None, "Ativo"),
            student("Bia", "bia", None, "Teste Grátis"),
        ];

        assert_eq!(filter_students(&students, "", StatusFilter::All).len(), 2);
        assert_eq!(filter_students(&students, "   ", StatusFilter::All).len(), 2);
    }

    #[test]
    fn active_filter_uses_the_defensive_badge_default() {
        let students = vec![
            student("Ana", "ana", None, "Ativo"),
            student("Edu", "edu", None, "valor desconhecido"),
            student("Bia", "bia", None, "Teste Grátis"),
        ];

        let visible = filter_students(&students, "", StatusFilter::Active);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|s| !s.status.contains("Teste")));
    }
}
