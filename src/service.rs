//! Registration, login and identity lookup over a credential store and a
//! token service. Holds no per-request state; every call stands alone.

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::error::{AuthError, StoreError};
use crate::models::User;
use crate::storage::CredentialStore;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            hasher,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account and hand back a token for it.
    pub fn register(&self, username: Option<&str>, password: &str) -> Result<String, AuthError> {
        let username = required(username).ok_or(AuthError::MissingUsername)?;

        if self.store.find_user(username)?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let user = User::new(username, self.hasher.hash_password(password)?);
        match self.store.create_user(&user) {
            Ok(()) => {}
            // lost a race against a concurrent registration
            Err(StoreError::AlreadyExists(_)) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(username = %user.username, "user registered");

        self.tokens.issue_for(&user)
    }

    /// Exchange a username/password pair for a fresh token. Unknown users
    /// and wrong passwords fail identically.
    pub fn login(&self, username: Option<&str>, password: &str) -> Result<String, AuthError> {
        let username = required(username).ok_or(AuthError::InvalidCredentials)?;

        let user = match self.store.find_user(username)? {
            Some(user) if self.hasher.verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::info!(username, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        tracing::debug!(username = %user.username, "login accepted");
        self.tokens.issue_for(&user)
    }

    /// Resolve a bearer token to the account it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.decode(token).map_err(|_| AuthError::Unauthorized)?;
        let user = self
            .store
            .find_user(&claims.sub)?
            .ok_or(AuthError::Unauthorized)?;

        // a deleted namesake's token names the same user but another account
        if claims.aid.as_deref() != Some(user.account_id.as_str()) {
            return Err(AuthError::Unauthorized);
        }
        Ok(user)
    }

    /// Whether the credential store answers; feeds the health log.
    pub fn check_store(&self) -> Result<(), AuthError> {
        self.store.ping().map_err(AuthError::from)
    }

    /// Delete the caller's own account. Tokens already handed out keep
    /// verifying until they expire but stop authenticating immediately.
    pub fn delete_profile(&self, requested_username: &str, authenticated: &User) -> Result<(), AuthError> {
        if authenticated.username != requested_username {
            tracing::warn!(
                requested = requested_username,
                caller = %authenticated.username,
                "profile deletion forbidden"
            );
            return Err(AuthError::Forbidden);
        }

        if self.store.delete_user(requested_username)? {
            tracing::info!(username = requested_username, "profile deleted");
        } else {
            tracing::debug!(username = requested_username, "profile already gone");
        }
        Ok(())
    }
}

fn required(username: Option<&str>) -> Option<&str> {
    username.filter(|name| !name.trim().is_empty())
}
