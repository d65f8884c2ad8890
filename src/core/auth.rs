//! Identity and session handling.
//!
//! Passwords are hashed with bcrypt on the blocking thread pool and never
//! logged. Sessions are stateless HS256 tokens carrying the user id and a
//! seven-day expiry; [`authenticate`] is the only way the rest of the system
//! learns who is calling.

use crate::{
    core::on_unique_violation,
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};
use tracing::{info, instrument, warn};
use validator::Validate;

/// Lifetime of an issued token.
pub const TOKEN_TTL_DAYS: i64 = 7;

// Same cost as the configured default so a miss takes as long as a mismatch.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("stockroom-unknown-account", 10).ok());

/// Spends one bcrypt verification on a throwaway hash.
async fn verify_dummy(password: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = bcrypt::verify(password, hash);
        }
    })
    .await?;
    Ok(())
}

/// Payload signed into every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued at (seconds since the epoch)
    pub iat: i64,
    /// Expires at (seconds since the epoch)
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer with the standard seven-day lifetime.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, TimeDelta::days(TOKEN_TTL_DAYS))
    }

    /// Creates an issuer with a custom lifetime.
    #[must_use]
    pub fn with_ttl(secret: &str, ttl: TimeDelta) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token binding `user_id`.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(Into::into)
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized {
                reason: match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token expired".to_string(),
                    _ => "invalid token".to_string(),
                },
            })
    }
}

/// Registration payload.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Login email; normalized before storage
    #[validate(email)]
    pub email: String,
    /// Plaintext password, at least six characters
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    /// Optional display name
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub name: Option<String>,
}

/// Login payload.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Login email
    #[validate(email)]
    pub email: String,
    /// Plaintext password
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The account (password hash is never serialized)
    pub user: user::Model,
    /// Bearer token for subsequent requests
    pub token: String,
}

/// Normalizes an email for storage and lookup: trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Finds a user by normalized email.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Creates an account and returns it with a token.
///
/// # Errors
/// - `Validation` for a malformed email, short password, or blank name
/// - `DuplicateEmail` if the normalized email is already registered
#[instrument(skip_all)]
pub async fn register(
    db: &DatabaseConnection,
    tokens: &TokenIssuer,
    bcrypt_cost: u32,
    mut input: RegisterInput,
) -> Result<AuthSession> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    if get_user_by_email(db, &input.email).await?.is_some() {
        return Err(Error::DuplicateEmail);
    }

    let password = input.password;
    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost)).await??;

    let now = Utc::now();
    let user = user::ActiveModel {
        email: Set(input.email),
        password_hash: Set(password_hash),
        name: Set(input.name.map(|n| n.trim().to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| on_unique_violation(e, || Error::DuplicateEmail))?;

    info!(user_id = user.id, "User registered");
    let token = tokens.issue(user.id)?;
    Ok(AuthSession { user, token })
}

/// Verifies credentials and issues a fresh token.
///
/// Unknown emails and wrong passwords produce the same `InvalidCredentials`
/// error so callers cannot probe which accounts exist.
#[instrument(skip_all)]
pub async fn login(
    db: &DatabaseConnection,
    tokens: &TokenIssuer,
    mut input: LoginInput,
) -> Result<AuthSession> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let Some(user) = get_user_by_email(db, &input.email).await? else {
        verify_dummy(input.password).await?;
        warn!("Login rejected: unknown account");
        return Err(Error::InvalidCredentials);
    };

    let password = input.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    if !valid {
        warn!(user_id = user.id, "Login rejected: password mismatch");
        return Err(Error::InvalidCredentials);
    }

    info!(user_id = user.id, "User logged in");
    let token = tokens.issue(user.id)?;
    Ok(AuthSession { user, token })
}

/// Resolves a bearer token to the acting user id.
///
/// # Errors
/// `Unauthorized` when the signature is wrong or the token has expired.
pub fn authenticate(tokens: &TokenIssuer, token: &str) -> Result<i64> {
    tokens.verify(token).map(|claims| claims.user_id)
}
