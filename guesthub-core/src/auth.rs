//! Registration, login and identity lookup.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::{Caller, Role, UnknownRole};
use crate::repository::{bounded, StoreError, UserRepository};
use crate::token::TokenService;
use crate::user::{normalize_email, required, NewUser, User, UserProfile};
use crate::{CoreError, CoreResult};

/// Verified against on unknown-email logins so both rejection paths pay for one argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("guesthub-unknown-account").ok());

/// Returned by both register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService, store_timeout: Duration) -> Self {
        Self {
            users,
            tokens,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account and sign the new user in.
    ///
    /// The role is matched case-insensitively and stored lower-case.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> CoreResult<AuthSession> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(CoreError::ValidationError("password is required".to_string()));
        }
        let name = required("name", name)?;
        let role: Role = role
            .parse()
            .map_err(|e: UnknownRole| CoreError::ValidationError(e.to_string()))?;

        if bounded(self.store_timeout, self.users.find_by_email(&email))
            .await?
            .is_some()
        {
            return Err(CoreError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let new_user = NewUser {
            email,
            password_hash,
            name,
            role,
        };

        // A concurrent registration can still win the race at the unique index.
        let user = bounded(self.store_timeout, self.users.insert(new_user))
            .await
            .map_err(|e| match e {
                CoreError::Store(StoreError::Conflict(_)) => CoreError::DuplicateEmail,
                other => other,
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.session_for(&user)
    }

    /// Check credentials and issue a fresh token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthSession> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(CoreError::ValidationError("password is required".to_string()));
        }

        let Some(user) = bounded(self.store_timeout, self.users.find_by_email(&email)).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            tracing::warn!("Login rejected: unknown account");
            return Err(CoreError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    /// Resolve a verified caller to their stored profile.
    pub async fn current_user(&self, caller: &Caller) -> CoreResult<UserProfile> {
        bounded(self.store_timeout, self.users.find_by_email(&caller.email))
            .await?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| CoreError::NotFound("User".to_string()))
    }

    fn session_for(&self, user: &User) -> CoreResult<AuthSession> {
        let token = self.tokens.issue(&user.email, user.role, &user.name)?;
        Ok(AuthSession {
            token,
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        })
    }
}

/// Hash a password into an argon2 PHC string with a random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::InternalError(format!("password hashing failed: {}", e)))
}

/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is an internal error.
pub fn verify_password(password: &str, stored_hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::InternalError(format!("stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserRepository::default()),
            TokenService::new("auth-test-secret", 3600),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn password_hash_is_salted_and_verifiable() {
        let first = hash_password("pw").unwrap();
        let second = hash_password("pw").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
        assert!(verify_password("pw", &first).unwrap());
        assert!(!verify_password("nope", &first).unwrap());
    }

    #[test]
    fn unknown_account_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("pw", hash).unwrap());
    }

    #[tokio::test]
    async fn unknown_email_login_still_runs_password_check() {
        let auth = service();
        LazyLock::force(&DUMMY_HASH);
        let err = auth.login("nobody@b.com", "pw").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn register_lowercases_role_and_issues_token() {
        let auth = service();
        let session = auth.register("a@b.com", "pw", "A", "GUEST").await.unwrap();
        assert_eq!(session.role, Role::Guest);
        assert_eq!(session.email, "a@b.com");

        let claims = auth.tokens().verify(&session.token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.role, Role::Guest);
        assert_eq!(claims.name, "A");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service();
        auth.register("a@b.com", "pw", "A", "guest").await.unwrap();
        let err = auth.register("A@B.com", "other", "B", "staff").await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEmail));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_yield_exactly_one_account() {
        let auth = Arc::new(service());
        let attempts = (0..4).map(|i| {
            let auth = Arc::clone(&auth);
            async move { auth.register("race@b.com", "pw", &format!("R{}", i), "guest").await }
        });
        let results: Vec<_> = spawn_all(attempts).await;

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::DuplicateEmail)))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(dup, 3);
    }

    async fn spawn_all<F, T>(futures: impl IntoIterator<Item = F>) -> Vec<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<_> = futures.into_iter().map(tokio::spawn).collect();
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn rejects_unknown_role() {
        let err = service()
            .register("a@b.com", "pw", "A", "owner")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn login_checks_password_without_revealing_account() {
        let auth = service();
        auth.register("a@b.com", "pw", "A", "management").await.unwrap();

        let session = auth.login("a@b.com", "pw").await.unwrap();
        let claims = auth.tokens().verify(&session.token).unwrap();
        assert_eq!(claims.role, Role::Management);
        assert_eq!(claims.name, "A");

        let wrong_password = auth.login("a@b.com", "bad").await.unwrap_err();
        let unknown_email = auth.login("ghost@b.com", "pw").await.unwrap_err();
        assert!(matches!(wrong_password, CoreError::InvalidCredentials));
        assert!(matches!(unknown_email, CoreError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn current_user_resolves_profile() {
        let auth = service();
        let session = auth.register("a@b.com", "pw", "A", "staff").await.unwrap();

        let caller = Caller::new("a@b.com", "A", Role::Staff);
        let profile = auth.current_user(&caller).await.unwrap();
        assert_eq!(profile.id, session.user_id);
        assert_eq!(profile.role, Role::Staff);

        let ghost = Caller::new("ghost@b.com", "G", Role::Guest);
        assert!(matches!(
            auth.current_user(&ghost).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
