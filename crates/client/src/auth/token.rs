//! Local JWT claim inspection.
//!
//! Tokens are decoded for their expiry claim only - no signature
//! verification happens client-side. Anything malformed reads as "no
//! claim", which upstream treats as an absent or expired credential.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// JWT claims the client cares about.
#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Extract the `exp` claim (Unix seconds) from a JWT.
///
/// Returns `None` for anything that is not a well-formed three-part token
/// with a JSON payload carrying `exp`.
pub(crate) fn decode_exp(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

/// Whole minutes until `exp`, measured from `now` (both Unix seconds).
///
/// This is the persistence window for all three credential entries:
/// `floor((exp - now) / 60)`. Negative when the claim has passed.
pub(crate) fn minutes_until(exp: i64, now: i64) -> i64 {
    (exp - now).div_euclid(60)
}

#[cfg(test)]
pub(crate) fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_exp_roundtrip() {
        let token = fake_jwt(1_900_000_000);
        assert_eq!(decode_exp(&token), Some(1_900_000_000));
    }

    #[test]
    fn test_decode_exp_never_panics_on_garbage() {
        assert_eq!(decode_exp(""), None);
        assert_eq!(decode_exp("not-a-jwt"), None);
        assert_eq!(decode_exp("a.b.c"), None);
        assert_eq!(decode_exp("a.!!!.c"), None);
        // valid base64, payload without exp
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"1"}"#);
        assert_eq!(decode_exp(&format!("h.{payload}.s")), None);
    }

    #[test]
    fn test_minutes_until_floors() {
        assert_eq!(minutes_until(1800, 0), 30);
        assert_eq!(minutes_until(1799, 0), 29);
        assert_eq!(minutes_until(59, 0), 0);
        assert_eq!(minutes_until(0, 60), -1);
    }
}
