//! Identity provider client
//!
//! Students sign in to the mobile app through the hosting provider's
//! email+password auth API. The panel creates those credentials on their
//! behalf: signup carries a metadata bag with the full profile, and a
//! provider-side trigger materializes the profile row from it. The panel
//! itself never inserts into the profiles table on creation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::students::Gender;

/// Profile metadata attached to a signup call.
///
/// The provider stores this verbatim in the new account's user metadata and
/// the profile trigger copies it into the profiles table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SignupMetadata {
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: &'static str,
    pub gender: Gender,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

/// Account created by the provider.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub user_id: Uuid,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider could not be reached at all.
    #[error("identity service unreachable: {0}")]
    Unreachable(String),

    /// The provider refused the signup (duplicate identifier, weak
    /// password, ...). Carries the provider's own message.
    #[error("{0}")]
    Rejected(String),

    /// The provider answered with something we could not interpret.
    #[error("unexpected identity service response: {0}")]
    Malformed(String),
}

/// Seam for credential issuance so the lifecycle rules can be exercised
/// against a mock issuer.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignupMetadata,
    ) -> Result<IssuedCredential, IdentityError>;
}

/// Client for the hosted identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

// Provider wire types. Signup answers in one of two shapes depending on
// whether email confirmation is enabled: a session envelope with tokens, or
// a bare user object awaiting confirmation.

#[derive(Debug, Deserialize)]
struct ProviderSession {
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
}

/// Provider error envelope; field names changed across provider versions,
/// so every known variant is optional.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> String {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| "Unknown identity service error".to_string())
    }
}

impl IdentityClient {
    pub fn new(base_url: &str, anon_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Identity client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Probe the provider's auth health endpoint.
    pub async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/auth/v1/health", self.base_url))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .context("Identity health request failed")?;

        if response.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!("Identity health check returned {}", response.status())
        }
    }

    fn parse_user_id(raw: &str) -> Result<Uuid, IdentityError> {
        // Both response shapes carry the user object; the session envelope
        // nests it, the confirmation-pending shape is the user itself.
        if let Ok(session) = serde_json::from_str::<ProviderSession>(raw) {
            return session
                .user
                .id
                .parse()
                .map_err(|_| IdentityError::Malformed("invalid user id".to_string()));
        }
        if let Ok(user) = serde_json::from_str::<ProviderUser>(raw) {
            return user
                .id
                .parse()
                .map_err(|_| IdentityError::Malformed("invalid user id".to_string()));
        }
        Err(IdentityError::Malformed(
            "unrecognized signup response shape".to_string(),
        ))
    }
}

#[async_trait]
impl CredentialIssuer for IdentityClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignupMetadata,
    ) -> Result<IssuedCredential, IdentityError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error: ProviderError = response.json().await.unwrap_or_default();
            let message = error.into_message();
            tracing::warn!(status = %status, message = %message, "Signup rejected by identity provider");
            return Err(IdentityError::Rejected(message));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| IdentityError::Malformed(e.to_string()))?;

        let user_id = Self::parse_user_id(&raw)?;

        tracing::info!(user_id = %user_id, "Credential issued");

        Ok(IssuedCredential { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_envelope_response() {
        let raw = r#"{
            "access_token": "abc",
            "user": {"id": "8f7c9aa2-4a5f-4a3e-9d60-0a2f1bb3c111", "email": "x@y"}
        }"#;
        let id = IdentityClient::parse_user_id(raw).unwrap();
        assert_eq!(
            id.to_string(),
            "8f7c9aa2-4a5f-4a3e-9d60-0a2f1bb3c111"
        );
    }

    #[test]
    fn parses_confirmation_pending_response() {
        let raw = r#"{"id": "8f7c9aa2-4a5f-4a3e-9d60-0a2f1bb3c111", "confirmation_sent_at": "2024-01-01T00:00:00Z"}"#;
        assert!(IdentityClient::parse_user_id(raw).is_ok());
    }

    #[test]
    fn rejects_unrecognized_response_shape() {
        assert!(matches!(
            IdentityClient::parse_user_id("[1, 2, 3]"),
            Err(IdentityError::Malformed(_))
        ));
    }

    #[test]
    fn provider_error_prefers_the_newest_field() {
        let err: ProviderError =
            serde_json::from_str(r#"{"msg": "User already registered", "error": "legacy"}"#)
                .unwrap();
        assert_eq!(err.into_message(), "User already registered");
    }

    #[test]
    fn provider_error_falls_back_to_generic_message() {
        let err = ProviderError::default();
        assert_eq!(err.into_message(), "Unknown identity service error");
    }

    #[test]
    fn metadata_skips_absent_optionals() {
        let metadata = SignupMetadata {
            full_name: "Ana".to_string(),
            username: "ana".to_string(),
            phone: None,
            role: "user",
            gender: Gender::Masculino,
            status: "Ativo".to_string(),
            trial_days: None,
            coupon: None,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value.get("phone").is_none());
        assert_eq!(value["role"], "user");
        assert_eq!(value["gender"], "masculino");
    }
}
