//! Identity Provider Token Verification
//!
//! Verifies RS256 ID tokens minted by the configured identity provider.
//! Signing keys come from the provider's JWKS document, cached in-process
//! and refetched when the cache ages out or a token arrives with an unknown
//! `kid` (key rotation).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::shared::error::{AuthError, Result};

/// Service credential for the identity provider.
///
/// The private key is parsed eagerly so a malformed credential fails at
/// startup instead of on the first sign-in; nothing is signed locally, so
/// the key itself is not retained.
#[derive(Debug, Clone)]
pub struct ServiceCredential {
    pub project_id: String,
    pub client_email: String,
}

impl ServiceCredential {
    pub fn new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        use rsa::pkcs8::DecodePrivateKey;

        let project_id = project_id.into();
        let client_email = client_email.into();

        if project_id.is_empty() || client_email.is_empty() {
            return Err(AuthError::configuration(
                "identity provider credential requires project_id and client_email",
            ));
        }

        rsa::RsaPrivateKey::from_pkcs8_pem(private_key_pem).map_err(|e| {
            AuthError::configuration(format!("invalid service credential private key: {}", e))
        })?;

        Ok(Self {
            project_id,
            client_email,
        })
    }
}

/// JWKS (JSON Web Key Set)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JwkKey>,
}

/// Individual JWK key
#[derive(Debug, Clone, Deserialize)]
pub struct JwkKey {
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// ID token claims as issued by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer
    pub iss: String,
    /// Subject (unique user ID at the provider)
    pub sub: String,
    /// Audience (project ID)
    pub aud: StringOrVec,
    /// Expiration
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// Email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Email verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Full display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Picture URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Audience can be a string or array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrVec {
    String(String),
    Vec(Vec<String>),
}

impl StringOrVec {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            StringOrVec::String(s) => s == value,
            StringOrVec::Vec(v) => v.iter().any(|s| s == value),
        }
    }
}

/// What the rest of the service gets to see of a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub display_name: String,
    pub email: String,
}

/// Derive the identity carried by a validated set of claims.
///
/// The email claim is required. The display name falls back through
/// `name`, then given/family name combinations, then the email itself.
pub fn identity_from_claims(claims: &IdTokenClaims) -> Result<FederatedIdentity> {
    let email = claims
        .email
        .clone()
        .ok_or_else(|| AuthError::invalid_token("token carries no email claim"))?;

    let display_name = claims.name.clone().unwrap_or_else(|| {
        match (&claims.given_name, &claims.family_name) {
            (Some(g), Some(f)) => format!("{} {}", g, f),
            (Some(g), None) => g.clone(),
            (None, Some(f)) => f.clone(),
            _ => email.clone(),
        }
    });

    Ok(FederatedIdentity {
        display_name,
        email,
    })
}

struct CachedJwks {
    jwks: Jwks,
    fetched_at: DateTime<Utc>,
}

/// Verifier for provider-issued ID tokens
pub struct IdTokenVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    cache_ttl: Duration,
    jwks_cache: RwLock<Option<CachedJwks>>,
}

impl IdTokenVerifier {
    pub fn new(
        credential: &ServiceCredential,
        jwks_url: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            jwks_url: jwks_url.into(),
            issuer: issuer.into(),
            audience: credential.project_id.clone(),
            cache_ttl: Duration::hours(1),
            jwks_cache: RwLock::new(None),
        }
    }

    /// Override how long a fetched JWKS document is trusted.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Verify an ID token and extract the identity it attests to.
    pub async fn verify(&self, id_token: &str) -> Result<FederatedIdentity> {
        let header = decode_header(id_token).map_err(|e| AuthError::InvalidToken {
            message: format!("Invalid ID token header: {}", e),
        })?;

        let kid = header.kid.ok_or_else(|| AuthError::InvalidToken {
            message: "ID token header has no key id".to_string(),
        })?;

        let decoding_key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<IdTokenClaims>(id_token, &decoding_key, &validation).map_err(
            |e| AuthError::InvalidToken {
                message: format!("Invalid ID token: {}", e),
            },
        )?;

        let claims = token_data.claims;

        if !claims.aud.contains(&self.audience) {
            return Err(AuthError::InvalidToken {
                message: "Audience mismatch".to_string(),
            });
        }

        identity_from_claims(&claims)
    }

    /// Resolve the signing key for a `kid`, refetching the JWKS when the
    /// cache is stale or does not know the key.
    async fn signing_key(&self, kid: &str) -> Result<DecodingKey> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let fresh = Utc::now() - cached.fetched_at < self.cache_ttl;
                if fresh {
                    if let Some(key) = find_key(&cached.jwks, kid) {
                        return decoding_key_for(key);
                    }
                }
            }
        }

        let jwks = self.refresh_jwks().await?;
        let key = find_key(&jwks, kid).ok_or_else(|| AuthError::InvalidToken {
            message: "No matching key found in JWKS".to_string(),
        })?;
        decoding_key_for(key)
    }

    async fn refresh_jwks(&self) -> Result<Jwks> {
        debug!(url = %self.jwks_url, "fetching JWKS");

        let jwks: Jwks = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::upstream(format!("JWKS fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::upstream(format!("JWKS fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::upstream(format!("JWKS response was not parseable: {}", e)))?;

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Utc::now(),
        });

        Ok(jwks)
    }
}

fn find_key<'a>(jwks: &'a Jwks, kid: &str) -> Option<&'a JwkKey> {
    jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
}

fn decoding_key_for(key: &JwkKey) -> Result<DecodingKey> {
    if key.kty != "RSA" {
        return Err(AuthError::InvalidToken {
            message: format!("Unsupported key type: {}", key.kty),
        });
    }

    let n = key.n.as_ref().ok_or_else(|| AuthError::InvalidToken {
        message: "Missing 'n' in RSA key".to_string(),
    })?;
    let e = key.e.as_ref().ok_or_else(|| AuthError::InvalidToken {
        message: "Missing 'e' in RSA key".to_string(),
    })?;

    DecodingKey::from_rsa_components(n, e).map_err(|e| AuthError::InvalidToken {
        message: format!("Invalid RSA key: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with(
        name: Option<&str>,
        given: Option<&str>,
        family: Option<&str>,
        email: Option<&str>,
    ) -> IdTokenClaims {
        IdTokenClaims {
            iss: "https://securetoken.google.com/demo".to_string(),
            sub: "subject-1".to_string(),
            aud: StringOrVec::String("demo".to_string()),
            exp: 0,
            iat: 0,
            email: email.map(String::from),
            email_verified: Some(true),
            name: name.map(String::from),
            given_name: given.map(String::from),
            family_name: family.map(String::from),
            picture: None,
        }
    }

    #[test]
    fn audience_string_or_vec() {
        let single: StringOrVec = serde_json::from_str("\"demo-project\"").unwrap();
        assert!(single.contains("demo-project"));
        assert!(!single.contains("other"));

        let multi: StringOrVec = serde_json::from_str("[\"demo-project\", \"second\"]").unwrap();
        assert!(multi.contains("second"));
        assert!(!multi.contains("third"));
    }

    #[test]
    fn display_name_fallback_chain() {
        let full = claims_with(Some("Jane Doe"), Some("J"), Some("D"), Some("j@example.com"));
        assert_eq!(identity_from_claims(&full).unwrap().display_name, "Jane Doe");

        let parts = claims_with(None, Some("Jane"), Some("Doe"), Some("j@example.com"));
        assert_eq!(identity_from_claims(&parts).unwrap().display_name, "Jane Doe");

        let given_only = claims_with(None, Some("Jane"), None, Some("j@example.com"));
        assert_eq!(identity_from_claims(&given_only).unwrap().display_name, "Jane");

        let family_only = claims_with(None, None, Some("Doe"), Some("j@example.com"));
        assert_eq!(identity_from_claims(&family_only).unwrap().display_name, "Doe");

        let bare = claims_with(None, None, None, Some("j@example.com"));
        assert_eq!(identity_from_claims(&bare).unwrap().display_name, "j@example.com");
    }

    #[test]
    fn identity_requires_email_claim() {
        let no_email = claims_with(Some("Jane Doe"), None, None, None);
        let err = identity_from_claims(&no_email).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[test]
    fn credential_rejects_garbage_pem() {
        let err = ServiceCredential::new("demo", "svc@demo.example.com", "not a pem").unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[test]
    fn credential_rejects_missing_fields() {
        let err = ServiceCredential::new("", "svc@demo.example.com", "irrelevant").unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[test]
    fn credential_accepts_pkcs8_pem() {
        use rsa::pkcs8::EncodePrivateKey;

        let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let pem = key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF).unwrap();

        let credential = ServiceCredential::new("demo", "svc@demo.example.com", &pem).unwrap();
        assert_eq!(credential.project_id, "demo");
    }
}
