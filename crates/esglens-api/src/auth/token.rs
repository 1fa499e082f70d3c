//! HMAC-SHA256 signed bearer tokens.
//!
//! Token format: `base64url(claims-json).hex(hmac-sha256)`. Verification
//! checks the signature before parsing the claims, then rejects expired
//! tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime in seconds (one hour).
const TOKEN_TTL_SECS: i64 = 3600;

/// Claims carried inside a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: Uuid,
    pub username: String,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// Issues and verifies signed tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Build a signer from the configured secret. When no secret is
    /// configured an ephemeral per-process secret is generated — issued
    /// tokens stop verifying after a restart.
    pub fn from_secret(secret: Option<String>) -> Self {
        let secret = match secret {
            Some(value) => value.into_bytes(),
            None => {
                tracing::warn!(
                    "AUTH_TOKEN_SECRET not set — using an ephemeral signing secret; \
                     issued tokens will not survive a restart"
                );
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()).into_bytes()
            }
        };
        Self { secret }
    }

    /// Issue a token for a user, valid for one hour.
    pub fn issue(&self, id: Uuid, username: &str) -> String {
        let claims = Claims {
            id,
            username: username.to_string(),
            exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
        };
        // Claims is a plain struct of serializable fields; this cannot fail.
        let payload = serde_json::to_vec(&claims).expect("claims serialize");
        let encoded = URL_SAFE_NO_PAD.encode(&payload);
        let signature = hex::encode(self.sign(encoded.as_bytes()));
        format!("{encoded}.{signature}")
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let (encoded, signature_hex) = token.split_once('.')?;
        let signature = hex::decode(signature_hex).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size");
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let payload = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let claims: Claims = serde_json::from_slice(&payload).ok()?;
        if claims.exp <= Utc::now().timestamp() {
            return None;
        }
        Some(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let signer = TokenSigner::from_secret(Some("test-secret".to_string()));
        let id = Uuid::new_v4();
        let token = signer.issue(id, "alex");
        let claims = signer.verify(&token).expect("token verifies");
        assert_eq!(claims.id, id);
        assert_eq!(claims.username, "alex");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = TokenSigner::from_secret(Some("test-secret".to_string()));
        let token = signer.issue(Uuid::new_v4(), "alex");
        let (payload, sig) = token.split_once('.').unwrap();
        let forged_claims = URL_SAFE_NO_PAD.encode(br#"{"id":"00000000-0000-0000-0000-000000000000","username":"admin","exp":9999999999}"#);
        let forged = format!("{forged_claims}.{sig}");
        assert!(signer.verify(&forged).is_none());
        // Sanity: the original still verifies.
        assert!(signer.verify(&format!("{payload}.{sig}")).is_some());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let a = TokenSigner::from_secret(Some("secret-a".to_string()));
        let b = TokenSigner::from_secret(Some("secret-b".to_string()));
        let token = a.issue(Uuid::new_v4(), "alex");
        assert!(b.verify(&token).is_none());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let signer = TokenSigner::from_secret(None);
        assert!(signer.verify("").is_none());
        assert!(signer.verify("no-dot-here").is_none());
        assert!(signer.verify("abc.nothex!").is_none());
    }
}
