//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the external identity provider and signed
//! with a secret shared with this service. We only verify them; `sign_jwt`
//! exists so tests and local tooling can mint tokens the server accepts.
//!
//! Uses pure Rust crates (no OpenSSL).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::ServiceError;

/// JWT header (always HS256).
const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Audience the identity provider stamps on end-user tokens.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

/// Claims read from (and, for tests, written to) a token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Either a single audience string or an array of them.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub aud: serde_json::Value,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl JwtClaims {
    /// Claims for `sub` with the default audience, valid for `ttl_secs` from `now_unix`.
    pub fn new(sub: &str, email: Option<&str>, now_unix: u64, ttl_secs: u64) -> Self {
        Self {
            sub: sub.to_string(),
            email: email.map(str::to_string),
            aud: serde_json::Value::String(DEFAULT_AUDIENCE.to_string()),
            exp: now_unix + ttl_secs,
            iat: Some(now_unix),
        }
    }

    fn has_audience(&self, audience: &str) -> bool {
        match &self.aud {
            serde_json::Value::String(a) => a == audience,
            serde_json::Value::Array(list) => list.iter().any(|a| a.as_str() == Some(audience)),
            _ => false,
        }
    }
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
}

/// Sign a JWT with the given claims. Returns the encoded token string.
pub fn sign_jwt(claims: &JwtClaims, secret: &str) -> Result<String, ServiceError> {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
    let payload = serde_json::to_vec(claims)
        .map_err(|e| ServiceError::Internal(format!("encode JWT claims: {e}")))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = hmac_sha256(secret.as_bytes())
        .chain_update(signing_input.as_bytes())
        .finalize()
        .into_bytes();
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{signing_input}.{sig_b64}"))
}

/// Verify a JWT and return the subject and email if valid.
///
/// Checks the HS256 signature, the `exp` claim against `now_unix`, the `aud`
/// claim against `audience`, and that `sub` is non-empty.
pub fn verify_jwt(
    token: &str,
    secret: &str,
    audience: &str,
    now_unix: u64,
) -> Result<VerifiedIdentity, ServiceError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ServiceError::Unauthorized("invalid token: malformed JWT".into()));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|_| ServiceError::Unauthorized("invalid token: bad header encoding".into()))?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|_| ServiceError::Unauthorized("invalid token: bad header".into()))?;
    if header["alg"].as_str() != Some("HS256") {
        return Err(ServiceError::Unauthorized(
            "invalid token: unsupported algorithm".into(),
        ));
    }

    let actual_sig = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| ServiceError::Unauthorized("invalid token: bad signature encoding".into()))?;
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    hmac_sha256(secret.as_bytes())
        .chain_update(signing_input.as_bytes())
        .verify_slice(&actual_sig)
        .map_err(|_| ServiceError::Unauthorized("invalid token: signature mismatch".into()))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| ServiceError::Unauthorized("invalid token: bad payload encoding".into()))?;
    let claims: JwtClaims = serde_json::from_slice(&payload_bytes)
        .map_err(|_| ServiceError::Unauthorized("invalid token: bad claims".into()))?;

    if now_unix >= claims.exp {
        return Err(ServiceError::Unauthorized("invalid token: expired".into()));
    }
    if !claims.has_audience(audience) {
        return Err(ServiceError::Unauthorized("invalid token: wrong audience".into()));
    }
    if claims.sub.trim().is_empty() {
        return Err(ServiceError::Unauthorized("invalid token: missing subject".into()));
    }

    Ok(VerifiedIdentity {
        subject: claims.sub,
        email: claims.email.filter(|e| !e.trim().is_empty()),
    })
}

// ── Internal ────────────────────────────────────────────────────────────────

fn hmac_sha256(key: &[u8]) -> Hmac<Sha256> {
    Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const NOW: u64 = 1_700_000_000;

    fn token_for(claims: &JwtClaims) -> String {
        sign_jwt(claims, SECRET).unwrap()
    }

    #[test]
    fn accepts_valid_token() {
        let claims = JwtClaims::new("sub-1", Some("a@example.com"), NOW, 3600);
        let id = verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW + 10).unwrap();
        assert_eq!(id.subject, "sub-1");
        assert_eq!(id.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let claims = JwtClaims::new("sub-1", None, NOW, 3600);
        let err = verify_jwt(&token_for(&claims), "other", DEFAULT_AUDIENCE, NOW).unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert!(err.message().contains("signature"));
    }

    #[test]
    fn rejects_expired_token() {
        let claims = JwtClaims::new("sub-1", None, NOW, 60);
        let err = verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW + 60).unwrap_err();
        assert!(err.message().contains("expired"));
    }

    #[test]
    fn checks_audience_string_and_array() {
        let mut claims = JwtClaims::new("sub-1", None, NOW, 3600);
        claims.aud = serde_json::json!("anon");
        assert!(verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW).is_err());

        claims.aud = serde_json::json!(["anon", "authenticated"]);
        assert!(verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW).is_ok());

        claims.aud = serde_json::Value::Null;
        assert!(verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW).is_err());
    }

    #[test]
    fn rejects_empty_subject_and_blank_email() {
        let claims = JwtClaims::new("  ", None, NOW, 3600);
        assert!(verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW).is_err());

        let claims = JwtClaims::new("sub-2", Some(""), NOW, 3600);
        let id = verify_jwt(&token_for(&claims), SECRET, DEFAULT_AUDIENCE, NOW).unwrap();
        assert_eq!(id.email, None);
    }

    #[test]
    fn rejects_garbage() {
        for token in ["", "a.b", "a.b.c", "not-a-jwt"] {
            assert!(verify_jwt(token, SECRET, DEFAULT_AUDIENCE, NOW).is_err());
        }
    }

    #[test]
    fn rejects_tampered_payload() {
        let token = token_for(&JwtClaims::new("sub-1", None, NOW, 3600));
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&JwtClaims::new("admin", None, NOW, 3600)).unwrap(),
        );
        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert!(verify_jwt(&tampered, SECRET, DEFAULT_AUDIENCE, NOW).is_err());
    }
}
