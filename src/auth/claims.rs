use serde::Deserialize;

/// JWT claims carried by provider-issued admin tokens
///
/// Issuer, audience, expiry and not-before are enforced during signature
/// validation; only the claims the panel reads afterwards are kept here.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Login email - optional
    #[serde(default)]
    pub email: Option<String>,
}
