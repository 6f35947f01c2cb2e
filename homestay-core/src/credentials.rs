use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// The identity carried by a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    email: String,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The token is missing, malformed, tampered with, or expired.
    /// The cause is not distinguished, so a caller cannot learn which
    /// check failed.
    #[error("Invalid credential")]
    Invalid,
}

/// Issues and verifies signed, time-bounded session tokens.
///
/// The service is stateless: there is no server-side revocation list, so a
/// still-valid token presented again before its natural expiry remains
/// valid. Revocation is left to the transport, which clears the cookie
/// holding the token.
pub struct CredentialService {
    secret: Vec<u8>,
}

impl CredentialService {
    const TOKEN_VALIDITY_IN_DAYS: usize = 365;

    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Signs a claim, returning a token valid for a year
    pub fn issue(&self, claim: IdentityClaim) -> String {
        let expires_at = Utc::now() + Duration::days(Self::TOKEN_VALIDITY_IN_DAYS as i64);

        self.issue_with_expiry(claim, expires_at.timestamp())
    }

    /// Validates the signature and expiry of a token, returning its claim
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, CredentialError> {
        let (payload, tag) = token.split_once('.').ok_or(CredentialError::Invalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CredentialError::Invalid)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| CredentialError::Invalid)?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&tag).map_err(|_| CredentialError::Invalid)?;

        let payload: TokenPayload =
            serde_json::from_slice(&payload).map_err(|_| CredentialError::Invalid)?;

        if payload.exp <= Utc::now().timestamp() {
            return Err(CredentialError::Invalid);
        }

        Ok(IdentityClaim {
            email: payload.email,
        })
    }

    fn issue_with_expiry(&self, claim: IdentityClaim, exp: i64) -> String {
        let payload = TokenPayload {
            email: claim.email,
            exp,
        };

        let payload = serde_json::to_vec(&payload).expect("claim serializes");

        let mut mac = self.mac();
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn claim(email: &str) -> IdentityClaim {
        IdentityClaim {
            email: email.to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let service = CredentialService::new("a very secret key");

        let token = service.issue(claim("a@x.com"));
        let verified = service.verify(&token).expect("token verifies");

        assert_eq!(verified.email, "a@x.com");
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = CredentialService::new("a very secret key");

        assert!(service.verify("").is_err(), "empty token should fail");
        assert!(
            service.verify("no-separator").is_err(),
            "token without separator should fail"
        );
        assert!(
            service.verify("not!base64.not!base64").is_err(),
            "undecodable token should fail"
        );
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = CredentialService::new("a very secret key");
        let other = CredentialService::new("a different key");

        let token = other.issue(claim("a@x.com"));

        assert!(
            service.verify(&token).is_err(),
            "token signed with another secret should fail"
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = CredentialService::new("a very secret key");

        let expired = (Utc::now() - Duration::days(1)).timestamp();
        let token = service.issue_with_expiry(claim("a@x.com"), expired);

        assert!(service.verify(&token).is_err(), "expired token should fail");
    }
}
