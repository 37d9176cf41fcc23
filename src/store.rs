//! In-memory stores and shared application state
//!
//! This module holds the two object maps at the heart of the application:
//! the [`UserStore`] (accounts keyed by generated id) and the [`LinkRegistry`]
//! (short links keyed by their short code). Both live inside [`AppState`],
//! constructed once at startup and injected into every handler, so state is
//! never process-global and tests get a fresh world per instance.
//!
//! Nothing here is persisted; a restart clears everything.

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::auth::{hash_password, verify_password};
use crate::error::AppError;
use crate::model::{Link, User};

/// Length of generated user ids and short codes
pub const ID_LENGTH: usize = 6;

/// Produces a short pseudo-random alphanumeric identifier
///
/// The generator itself makes no uniqueness promise; callers retry against
/// their own key set until the id is free.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub links: Arc<LinkRegistry>,
}

impl AppState {
    /// Creates a fresh, empty state (both stores empty)
    pub fn new() -> Self {
        AppState {
            users: Arc::new(UserStore::default()),
            links: Arc::new(LinkRegistry::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity store: user records keyed by generated id
#[derive(Default)]
pub struct UserStore {
    records: RwLock<HashMap<String, User>>,
}

impl UserStore {
    /// Registers a new account
    ///
    /// Fails with `MissingField` if either field is empty and with
    /// `DuplicateEmail` if an account with the same email already exists.
    /// The password is hashed with Argon2 before storage; the plaintext is
    /// never kept.
    pub fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::missing("email and/or password"));
        }

        let mut records = self.records.write().unwrap();

        if records.values().any(|user| user.email == email) {
            return Err(AppError::DuplicateEmail(email.to_string()));
        }

        // Retry until the generated id is unused in this map
        let mut id = generate_id();
        while records.contains_key(&id) {
            id = generate_id();
        }

        let user = User {
            id: id.clone(),
            email: email.to_string(),
            password_hash: hash_password(password),
            created_at: Utc::now(),
        };
        records.insert(id, user.clone());

        Ok(user)
    }

    /// Looks up an account by email (exact, case-sensitive match)
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.records
            .read()
            .unwrap()
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    /// Looks up an account by id
    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.records.read().unwrap().get(id).cloned()
    }

    /// Checks a login attempt against the stored hash
    ///
    /// Fails with `NotFound` when no account has this email and with
    /// `WrongPassword` when the hash comparison fails.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .find_by_email(email)
            .ok_or_else(|| AppError::user_not_found(email))?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::WrongPassword);
        }

        Ok(user)
    }
}

/// Link registry: short-link records keyed by their short code
#[derive(Default)]
pub struct LinkRegistry {
    records: RwLock<HashMap<String, Link>>,
}

impl LinkRegistry {
    /// Creates a new link owned by `owner_id`, with zero visit counters
    ///
    /// The short code is generated and re-rolled until it does not collide
    /// with an existing key.
    pub fn create(&self, long_url: &str, owner_id: &str) -> Link {
        let mut records = self.records.write().unwrap();

        let mut id = generate_id();
        while records.contains_key(&id) {
            id = generate_id();
        }

        let link = Link {
            id: id.clone(),
            long_url: long_url.to_string(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            total_visits: 0,
            unique_visits: 0,
            visit_timestamps: Vec::new(),
        };
        records.insert(id, link.clone());

        link
    }

    /// Returns the link with this short code, if any
    pub fn get(&self, id: &str) -> Option<Link> {
        self.records.read().unwrap().get(id).cloned()
    }

    /// Returns every link whose `owner_id` matches exactly, keyed by id
    pub fn list_for_owner(&self, owner_id: &str) -> HashMap<String, Link> {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|(_, link)| link.owner_id == owner_id)
            .map(|(id, link)| (id.clone(), link.clone()))
            .collect()
    }

    /// Replaces a link's long URL, owner-only
    ///
    /// A missing id fails `NotFound` before the ownership check; a caller
    /// who is not the owner fails `Forbidden`. The owner id is re-stamped
    /// to the caller, a no-op when already correct.
    pub fn update(&self, id: &str, new_long_url: &str, caller_id: &str) -> Result<Link, AppError> {
        let mut records = self.records.write().unwrap();

        let link = records
            .get_mut(id)
            .ok_or_else(|| AppError::link_not_found(id))?;

        if link.owner_id != caller_id {
            return Err(AppError::not_owner());
        }

        link.long_url = new_long_url.to_string();
        link.owner_id = caller_id.to_string();

        Ok(link.clone())
    }

    /// Removes a link, owner-only; same authorization order as `update`
    pub fn delete(&self, id: &str, caller_id: &str) -> Result<(), AppError> {
        let mut records = self.records.write().unwrap();

        let link = records
            .get(id)
            .ok_or_else(|| AppError::link_not_found(id))?;

        if link.owner_id != caller_id {
            return Err(AppError::not_owner());
        }

        records.remove(id);
        Ok(())
    }

    /// Records one detail-view visit on a link
    ///
    /// Always increments `total_visits` and appends one timestamp; bumps
    /// `unique_visits` only when the caller's session had not visited this
    /// id before (`first_visit_in_session`, derived by the handler from the
    /// session's visited set). Keeps `unique_visits <= total_visits`.
    pub fn record_visit(
        &self,
        id: &str,
        first_visit_in_session: bool,
    ) -> Result<Link, AppError> {
        let mut records = self.records.write().unwrap();

        let link = records
            .get_mut(id)
            .ok_or_else(|| AppError::link_not_found(id))?;

        link.total_visits += 1;
        if first_visit_in_session {
            link.unique_visits += 1;
        }
        link.visit_timestamps.push(Utc::now());

        Ok(link.clone())
    }
}
