//! Token verifier (spec §4.M): verifies a bearer token's signature, expiry,
//! and subject extraction. Owned by the authoring service; the redirect
//! service consumes the same verifier to accept the same tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::domain::entities::Claims;
use crate::error::AppError;

/// Raw claim shape as it appears on the wire. `sub` is accepted as either a
/// JSON number or a numeric string (spec §4.M); anything else coerces to 0
/// and is rejected by the caller, not by this verifier.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: serde_json::Value,
    #[serde(default)]
    email: String,
    #[serde(default = "default_role")]
    role: String,
    #[allow(dead_code)]
    exp: i64,
}

fn default_role() -> String {
    "user".to_string()
}

/// Verifies HMAC-signed bearer tokens issued by the (out-of-scope) token
/// issuance surface (spec §1, §4.M).
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl TokenVerifier {
    pub fn new(secret: &str, issuer: impl Into<Option<String>>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Validates `token`'s signature and expiry, returning its [`Claims`].
    ///
    /// - Any algorithm other than HMAC -> [`AppError::invalid_signing_key`].
    /// - Expired `exp` -> [`AppError::token_expired`].
    /// - Any other parse/format failure -> [`AppError::invalid_token`].
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<RawClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::token_expired("Token has expired"),
                JwtErrorKind::InvalidAlgorithm => {
                    AppError::invalid_signing_key("Token uses an unsupported signing algorithm")
                }
                _ => AppError::invalid_token("Invalid or malformed token").wrap(e),
            }
        })?;

        let user_id = coerce_subject(&data.claims.sub);

        Ok(Claims {
            user_id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

/// Coerces a JSON `sub` claim to an unsigned subject ID. A non-coercible
/// value yields 0, which downstream callers reject (spec §4.M).
fn coerce_subject(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0),
        serde_json::Value::String(s) => s.parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}
