//! JWKS cache for provider JWT verification
//!
//! Signing keys are fetched from the provider's JWKS endpoint and cached
//! with a TTL. Both RSA and EC (P-256) keys are supported since the
//! provider rotates between them.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Claims;

#[derive(Debug, serde::Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    // RSA components
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    // EC components
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    algorithm: Algorithm,
    fetched_at: Instant,
}

/// JWKS cache for validating provider-issued JWTs
#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<RwLock<Inner>>,
    jwks_url: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

struct Inner {
    keys: HashMap<String, CachedKey>,
    last_fetch: Option<Instant>,
}

impl JwksCache {
    pub fn new(jwks_url: String, issuer: String, audience: String, ttl_seconds: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                keys: HashMap::new(),
                last_fetch: None,
            })),
            jwks_url,
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Verify a JWT and return its claims
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).context("Invalid JWT header")?;
        let kid = header.kid.context("JWT missing kid header")?;

        let cached = self.get_or_fetch_key(&kid).await?;

        let mut validation = Validation::new(cached.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data =
            decode::<Claims>(token, &cached.key, &validation).context("JWT validation failed")?;

        Ok(token_data.claims)
    }

    async fn get_or_fetch_key(&self, kid: &str) -> Result<CachedKey> {
        {
            let cache = self.inner.read();
            if let Some(cached) = cache.keys.get(kid) {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.clone());
                }
            }
        }

        self.refresh_keys().await?;

        let cache = self.inner.read();
        cache
            .keys
            .get(kid)
            .cloned()
            .context("Key not found in JWKS")
    }

    async fn refresh_keys(&self) -> Result<()> {
        {
            let cache = self.inner.read();
            if let Some(last) = cache.last_fetch {
                // Don't refetch more than once per second
                if last.elapsed() < Duration::from_secs(1) {
                    return Ok(());
                }
            }
        }

        tracing::debug!("Fetching JWKS from {}", self.jwks_url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client
            .get(&self.jwks_url)
            .send()
            .await
            .context("Failed to fetch JWKS")?;

        if !response.status().is_success() {
            anyhow::bail!("JWKS fetch failed with status: {}", response.status());
        }

        let jwks: JwksDocument = response.json().await.context("Failed to parse JWKS")?;

        let mut cache = self.inner.write();
        cache.last_fetch = Some(Instant::now());

        for jwk in jwks.keys {
            match Self::decoding_key(&jwk) {
                Ok((key, algorithm)) => {
                    cache.keys.insert(
                        jwk.kid.clone(),
                        CachedKey {
                            key,
                            algorithm,
                            fetched_at: Instant::now(),
                        },
                    );
                    tracing::debug!("Cached JWKS key: {}", jwk.kid);
                }
                Err(e) => {
                    tracing::warn!("Skipping JWK {}: {}", jwk.kid, e);
                }
            }
        }

        tracing::info!("JWKS cache refreshed with {} keys", cache.keys.len());
        Ok(())
    }

    fn decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm)> {
        match jwk.kty.as_str() {
            "RSA" => {
                let n = jwk.n.as_deref().context("RSA key missing n")?;
                let e = jwk.e.as_deref().context("RSA key missing e")?;
                let key = DecodingKey::from_rsa_components(n, e)
                    .context("Failed to parse RSA components")?;
                Ok((key, Algorithm::RS256))
            }
            "EC" => {
                if jwk.crv.as_deref() != Some("P-256") {
                    anyhow::bail!("Unsupported EC curve: {:?}", jwk.crv);
                }
                let x = jwk.x.as_deref().context("EC key missing x")?;
                let y = jwk.y.as_deref().context("EC key missing y")?;
                let key = DecodingKey::from_ec_components(x, y)
                    .context("Failed to parse EC components")?;
                Ok((key, Algorithm::ES256))
            }
            other => anyhow::bail!("Unsupported key type: {}", other),
        }
    }

    /// Pre-warm the cache by fetching keys
    pub async fn warm_cache(&self) -> Result<()> {
        self.refresh_keys().await
    }
}
