use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Access/refresh token pair issued by the backend.
///
/// # Example
/// ```
/// use stanza::auth::TokenPair;
///
/// let tokens = TokenPair::new("access", "refresh");
/// assert_eq!(tokens.access_token, "access");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Expiry of the access token, seconds since the Unix epoch.
    pub fn access_expiry(&self) -> Result<i64, AuthError> {
        decode_expiry(&self.access_token).ok_or(AuthError::MalformedToken)
    }
}

/// Read the `exp` claim of a JWT-shaped token without verifying it.
///
/// Returns `None` when the token has no payload segment, the payload is not
/// base64url JSON, or `exp` is missing.
pub fn decode_expiry(access_token: &str) -> Option<i64> {
    let mut parts = access_token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let claims = decode_segment(payload)?;
    let exp = claims.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().map(|v| v as i64))
}

fn decode_segment(segment: &str) -> Option<serde_json::Value> {
    let trimmed = segment.trim_end_matches('=');
    if trimmed.is_empty() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.is_object().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn undecodable_pair_expiry_is_malformed() {
        let tokens = TokenPair::new("opaque", "r");
        assert!(matches!(tokens.access_expiry(), Err(AuthError::MalformedToken)));
        let tokens = TokenPair::new(jwt(r#"{"exp":42}"#), "r");
        assert_eq!(tokens.access_expiry().unwrap(), 42);
    }

    #[test]
    fn decodes_integer_exp() {
        assert_eq!(decode_expiry(&jwt(r#"{"exp":1700000000}"#)), Some(1_700_000_000));
    }

    #[test]
    fn decodes_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":42}"#);
        assert_eq!(decode_expiry(&format!("h.{payload}.s")), Some(42));
    }

    #[test]
    fn truncates_float_exp() {
        assert_eq!(decode_expiry(&jwt(r#"{"exp":1700000000.9}"#)), Some(1_700_000_000));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(decode_expiry(""), None);
        assert_eq!(decode_expiry("no-dots-here"), None);
        assert_eq!(decode_expiry("header."), None);
        assert_eq!(decode_expiry("header.!!!not-base64!!!.sig"), None);
        assert_eq!(decode_expiry(&jwt("not json")), None);
        assert_eq!(decode_expiry(&jwt(r#"{"sub":"u1"}"#)), None);
        assert_eq!(decode_expiry(&jwt(r#"{"exp":"soon"}"#)), None);
        assert_eq!(decode_expiry(&jwt("[1,2,3]")), None);
    }

    #[test]
    fn token_pair_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(TokenPair::new("a", "r")).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
