use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::identity::{Caller, Role};
use crate::{CoreError, CoreResult};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn caller(&self) -> Caller {
        Caller::new(self.sub.clone(), self.name.clone(), self.role)
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Ten years; longer lifetimes are clamped.
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Issues and verifies HS256 session tokens signed with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
        }
    }

    pub fn issue(&self, email: &str, role: Role, name: &str) -> CoreResult<String> {
        self.issue_at(email, role, name, Utc::now())
    }

    /// Issue a token as if it were minted at `issued_at`; expiry is `issued_at + ttl`.
    pub fn issue_at(
        &self,
        email: &str,
        role: Role,
        name: &str,
        issued_at: DateTime<Utc>,
    ) -> CoreResult<String> {
        let claims = Claims {
            sub: email.to_owned(),
            role,
            name: name.to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CoreError::InternalError(format!("Token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> CoreResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CoreError::ExpiredToken,
                _ => CoreError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn verifies_freshly_issued_token() {
        let tokens = service();
        let token = tokens.issue("a@b.com", Role::Staff, "Alice").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.caller(), Caller::new("a@b.com", "Alice", Role::Staff));
    }

    #[test]
    fn rejects_token_past_expiry() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(2);
        let token = tokens.issue_at("a@b.com", Role::Guest, "A", issued_at).unwrap();
        assert!(matches!(tokens.verify(&token), Err(CoreError::ExpiredToken)));
    }

    #[test]
    fn accepts_token_shortly_before_expiry() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::seconds(3500);
        let token = tokens.issue_at("a@b.com", Role::Guest, "A", issued_at).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let foreign = TokenService::new("other-secret", 3600)
            .issue("a@b.com", Role::Admin, "A")
            .unwrap();
        assert!(matches!(service().verify(&foreign), Err(CoreError::InvalidToken)));
    }

    #[test]
    fn rejects_garbage_and_tampered_tokens() {
        let tokens = service();
        assert!(matches!(tokens.verify("not-a-jwt"), Err(CoreError::InvalidToken)));

        // Graft an admin payload onto a guest token's signature.
        let guest = tokens.issue("a@b.com", Role::Guest, "A").unwrap();
        let admin = tokens.issue("a@b.com", Role::Admin, "A").unwrap();
        let guest_parts: Vec<&str> = guest.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let tampered = format!("{}.{}.{}", guest_parts[0], admin_parts[1], guest_parts[2]);
        assert!(matches!(tokens.verify(&tampered), Err(CoreError::InvalidToken)));
    }
}
