//! Password hashing and session identity
//!
//! Passwords are hashed with Argon2id and stored as PHC-format strings.
//! The caller's identity travels in a server-side session keyed by an opaque
//! cookie; this module owns the session keys and the [`CurrentUser`]
//! extractor that gates every owner-only route.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::collections::HashSet;
use tower_sessions::Session;

use crate::error::AppError;

/// Session key holding the logged-in user's id
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Session key holding the set of link ids this session has already
/// visited, used for unique-visit attribution
pub const SESSION_VISITED_KEY: &str = "visited_links";

/// Hashes a password with Argon2id and a random salt, PHC-format output
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing failed")
        .to_string()
}

/// Verifies a password against a stored PHC-format hash
///
/// A malformed stored hash counts as a failed verification rather than an
/// error; login then fails with the same `WrongPassword` outcome.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Returns the session's user id, or `None` for anonymous callers
pub async fn current_user_id(session: &Session) -> Option<String> {
    session
        .get::<String>(SESSION_USER_ID_KEY)
        .await
        .ok()
        .flatten()
}

/// Establishes the session for a freshly registered or logged-in user
///
/// A session-store write failure surfaces as an error response; swallowing
/// it would redirect the caller to `/urls` with no session at all.
pub async fn establish_session(session: &Session, user_id: &str) -> Result<(), AppError> {
    session
        .insert(SESSION_USER_ID_KEY, user_id.to_string())
        .await?;
    Ok(())
}

/// Returns the link ids this session has already visited
pub async fn visited_links(session: &Session) -> HashSet<String> {
    session
        .get::<HashSet<String>>(SESSION_VISITED_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Marks a link id as visited in this session
pub async fn mark_visited(session: &Session, link_id: &str) -> Result<(), AppError> {
    let mut visited = visited_links(session).await;
    visited.insert(link_id.to_string());
    session.insert(SESSION_VISITED_KEY, visited).await?;
    Ok(())
}

/// Authenticated caller extractor for owner-only endpoints
///
/// Add this to handler parameters to require a logged-in session. Anonymous
/// callers are rejected with 403 before the handler body runs; the extracted
/// `user_id` is then used for exact-match ownership checks.
pub struct CurrentUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::login_required())?;

        match current_user_id(&session).await {
            Some(user_id) => Ok(CurrentUser { user_id }),
            None => Err(AppError::login_required()),
        }
    }
}
