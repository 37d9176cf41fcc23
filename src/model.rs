//! Data models for the TinyApp URL shortener
//!
//! This module defines the records held by the in-memory stores as well as
//! the request payloads and JSON view models produced by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user account
///
/// Created once at registration and never mutated or deleted afterwards.
/// The `password_hash` is an Argon2 PHC-format string and must never be
/// serialized into a response body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    /// Generated identifier, immutable after creation
    pub id: String,

    /// Login email, unique across all accounts (exact, case-sensitive match)
    pub email: String,

    /// Salted one-way Argon2 hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

/// A shortened link record
///
/// Visit counters and timestamps are mutated only when the owner opens the
/// link's detail view; the public redirect path leaves them untouched.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Link {
    /// Short code identifying this link (e.g. "b2xVn2")
    pub id: String,

    /// The original long URL this short code resolves to
    pub long_url: String,

    /// Id of the user who created the link; all authorization checks
    /// compare against this value exactly
    pub owner_id: String,

    /// Timestamp when this link was created
    pub created_at: DateTime<Utc>,

    /// Total number of detail-view visits
    #[serde(default)]
    pub total_visits: u64,

    /// Number of detail-view visits from sessions that had not seen this
    /// link before; never exceeds `total_visits`
    #[serde(default)]
    pub unique_visits: u64,

    /// One entry per detail-view visit, in visit order
    #[serde(default)]
    pub visit_timestamps: Vec<DateTime<Utc>>,
}

/// Request payload for `POST /register` and `POST /login`
///
/// Fields default to empty so an omitted field reaches the handler's
/// presence check (400) instead of being rejected during deserialization.
///
/// # Example
/// ```json
/// { "email": "user@example.com", "password": "purple-monkey-dinosaur" }
/// ```
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request payload for `POST /urls` and `PUT /urls/{id}`
#[derive(Deserialize)]
pub struct LinkRequest {
    /// The long URL to shorten (or the replacement URL on update);
    /// defaults to empty when omitted so the presence check answers with
    /// a 400 rather than a deserialization failure
    #[serde(default)]
    pub long_url: String,
}

/// Slim user projection embedded in view models (no password hash)
#[derive(Serialize, Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

/// View model for the link detail page (`GET /urls/{id}`)
///
/// # Example
/// ```json
/// {
///   "id": "b2xVn2",
///   "long_url": "https://www.lighthouselabs.ca",
///   "short_url": "http://localhost:8080/u/b2xVn2",
///   "total_visits": 3,
///   "unique_visits": 1,
///   "visit_timestamps": ["2026-08-25T13:40:00Z", "..."]
/// }
/// ```
#[derive(Serialize)]
pub struct LinkView {
    pub id: String,
    pub long_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub total_visits: u64,
    pub unique_visits: u64,
    pub visit_timestamps: Vec<DateTime<Utc>>,
}

impl LinkView {
    /// Builds the view for a link, deriving `short_url` from the configured
    /// public base address.
    pub fn from_link(link: &Link, base_url: &str) -> Self {
        LinkView {
            id: link.id.clone(),
            long_url: link.long_url.clone(),
            short_url: format!("{}/u/{}", base_url, link.id),
            created_at: link.created_at,
            total_visits: link.total_visits,
            unique_visits: link.unique_visits,
            visit_timestamps: link.visit_timestamps.clone(),
        }
    }
}
