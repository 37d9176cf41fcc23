//! Route definitions for the TinyApp URL shortener
//!
//! This module assembles the Axum router, wires every path to its handler
//! and attaches the session layer that carries the caller's identity.

use axum::routing::{get, post};
use axum::Router;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handler::{
    create_link, delete_link, follow_link, link_detail, links_json, list_links, login, login_form,
    logout, new_link_form, register, register_form, root, update_link,
};
use crate::store::AppState;

/// Creates and configures the application router
///
/// # Route Map
///
/// - `GET /` - redirect to `/urls` (logged in) or `/login`
/// - `GET|POST /register`, `GET|POST /login` - account flows (pre-auth)
/// - `POST /logout` - destroy the session
/// - `GET /urls.json` - caller's links as raw JSON
/// - `GET /urls` - caller's link list, `POST /urls` - create a link
/// - `GET /urls/new` - creation form (redirects anonymous callers)
/// - `GET|PUT|DELETE /urls/{id}` - detail view / update / delete, owner-only
/// - `POST /urls/{id}/delete` - delete for form clients without DELETE
/// - `GET /u/{id}` - public short-code redirect
///
/// The session layer uses an in-process [`MemoryStore`], so sessions share
/// the process lifetime with the stores themselves.
pub fn create_app(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    Router::new()
        .route("/", get(root))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/urls.json", get(links_json))
        .route("/urls", get(list_links).post(create_link))
        .route("/urls/new", get(new_link_form))
        .route(
            "/urls/{id}",
            get(link_detail).put(update_link).delete(delete_link),
        )
        .route("/urls/{id}/delete", post(delete_link))
        // Public redirect endpoint - resolves a short code to its long URL
        .route("/u/{id}", get(follow_link))
        .layer(session_layer)
        .with_state(state)
}
