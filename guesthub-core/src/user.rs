use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::Role;
use crate::{CoreError, CoreResult};

/// Maximum length of an email address (RFC 5321).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// A registered account as held by the credential store.
///
/// Deliberately not `Serialize`: the password hash must never reach a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Everything the store needs to create a user. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// The public view of a user returned by `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Trim, check structure, and lower-case an email address.
pub fn normalize_email(raw: &str) -> CoreResult<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(CoreError::ValidationError("email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "email must be at most {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid_email());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid_email)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid_email());
    }

    Ok(email.to_ascii_lowercase())
}

fn invalid_email() -> CoreError {
    CoreError::ValidationError("email must be a valid address".to_string())
}

/// Returns the trimmed value, or a validation error naming `field`.
pub(crate) fn required(field: &str, value: &str) -> CoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::ValidationError(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_lowercases_valid_email() {
        assert_eq!(normalize_email(" A@B.com ").unwrap(), "a@b.com");
        assert_eq!(
            normalize_email("user.name+tag@domain.co.uk").unwrap(),
            "user.name+tag@domain.co.uk"
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "no-at-symbol", "@domain.com", "user@", "a@b@c", "a b@c.com"] {
            assert!(
                matches!(normalize_email(bad), Err(CoreError::ValidationError(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_overlong_email() {
        let email = format!("{}@b.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert!(normalize_email(&email).is_err());
    }

    #[test]
    fn profile_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: "A".to_string(),
            role: Role::Guest,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"guest\""));
    }
}
