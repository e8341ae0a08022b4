//! Management-token minting.
//!
//! 100ms authenticates management calls with an HS256 JWT signed by the app
//! secret. Tokens are valid for 24 hours and carry a random `jti`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const TOKEN_VERSION: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementClaims {
  pub access_key: String,
  #[serde(rename = "type")]
  pub token_type: String,
  pub version:    u8,
  pub iat:        i64,
  pub exp:        i64,
  pub jti:        String,
}

impl ManagementClaims {
  pub fn new(access_key: &str, now: DateTime<Utc>) -> Self {
    Self {
      access_key: access_key.to_owned(),
      token_type: "management".to_owned(),
      version:    TOKEN_VERSION,
      iat:        now.timestamp(),
      exp:        (now + Duration::hours(24)).timestamp(),
      jti:        Uuid::new_v4().simple().to_string(),
    }
  }
}

/// Mint a management token for `access_key` signed with `secret`.
pub fn management_token(
  access_key: &str,
  secret: &str,
  now: DateTime<Utc>,
) -> Result<String> {
  let claims = ManagementClaims::new(access_key, now);
  let payload = serde_json::to_vec(&claims)?;
  let signing_input =
    format!("{}.{}", B64.encode(HEADER), B64.encode(payload));
  let signature = sign(secret, &signing_input)?;
  Ok(format!("{signing_input}.{signature}"))
}

fn sign(secret: &str, input: &str) -> Result<String> {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
    .map_err(|e| Error::Token(e.to_string()))?;
  mac.update(input.as_bytes());
  Ok(B64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn decode_claims(token: &str) -> ManagementClaims {
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&B64.decode(payload).unwrap()).unwrap()
  }

  #[test]
  fn token_has_three_parts_and_valid_signature() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let token = management_token("key", "secret", now).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);

    let expected = sign("secret", &format!("{}.{}", parts[0], parts[1])).unwrap();
    assert_eq!(parts[2], expected);
  }

  #[test]
  fn claims_are_management_for_a_day() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let claims = decode_claims(&management_token("key", "secret", now).unwrap());
    assert_eq!(claims.access_key, "key");
    assert_eq!(claims.token_type, "management");
    assert_eq!(claims.version, 2);
    assert_eq!(claims.iat, 1_700_000_000);
    assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
  }

  #[test]
  fn each_token_has_a_fresh_nonce() {
    let now = Utc::now();
    let a = decode_claims(&management_token("key", "secret", now).unwrap());
    let b = decode_claims(&management_token("key", "secret", now).unwrap());
    assert_ne!(a.jti, b.jti);
  }
}
