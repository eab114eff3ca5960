//! Password hashing and signed bearer tokens.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::AuthError;
use crate::models::{Claims, User};

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
/// One year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// bcrypt refuses work factors outside 4..=31.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// bcrypt wrapper with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, self.cost)
    }

    /// A stored hash that bcrypt cannot parse never verifies.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        verify(password, hash).unwrap_or(false)
    }
}

/// Issues and validates HMAC-signed JWTs carrying a subject claim.
///
/// Stateless: nothing is remembered about issued tokens, so a token stays
/// valid until its `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl: Duration) -> Result<Self, AuthError> {
        if !is_hmac(algorithm) {
            return Err(AuthError::Internal(format!(
                "unsupported signing algorithm {algorithm:?}; expected HS256, HS384 or HS512"
            )));
        }
        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            default_ttl,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.sign(subject, None, ttl)
    }

    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, self.default_ttl)
    }

    /// Default-lifetime token bound to this particular account, not just
    /// its username.
    pub fn issue_for(&self, user: &User) -> Result<String, AuthError> {
        self.sign(&user.username, Some(user.account_id.clone()), self.default_ttl)
    }

    fn sign(&self, subject: &str, account_id: Option<String>, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(format!("token lifetime {ttl} is out of range")))?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            aid: account_id,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Full claim set of a valid token.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(reason = %e, "token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        // jsonwebtoken accepts exp == now; an expiry must lie strictly ahead
        if claims.exp <= Utc::now().timestamp() || claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Subject of a valid token, exactly as it was issued.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.decode(token).map(|claims| claims.sub)
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}
