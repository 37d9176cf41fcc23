//! HTTP request handlers for the TinyApp URL shortener
//!
//! This module implements the route behavior on top of the stores:
//! - Account registration and login with session establishment
//! - Creating, listing, updating and deleting short links (owner-only)
//! - Public short-code redirection
//! - The owner's link detail view, the only place visit counters are
//!   recorded; the redirect path never touches them

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;

use crate::auth::{current_user_id, establish_session, mark_visited, visited_links, CurrentUser};
use crate::error::AppError;
use crate::model::{CredentialsRequest, LinkRequest, LinkView, UserView};
use crate::store::AppState;

/// Public base address used to build `short_url` values in responses
///
/// # Environment Variables
///
/// - `URL` - Scheme and host (default: "http://localhost")
/// - `PORT` - Server port (default: 8080)
fn public_base_url() -> String {
    let base_url = std::env::var("URL").unwrap_or_else(|_| "http://localhost".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    format!("{}:{}", base_url, port)
}

/// `GET /` - entry point
///
/// Logged-in callers land on their link list; anonymous callers are sent
/// to the login page.
pub async fn root(session: Session) -> Redirect {
    match current_user_id(&session).await {
        Some(_) => Redirect::to("/urls"),
        None => Redirect::to("/login"),
    }
}

/// `GET /register` - registration form descriptor
pub async fn register_form() -> impl IntoResponse {
    Json(json!({
        "page": "register",
        "fields": ["email", "password"]
    }))
}

/// `POST /register` - create an account and log the caller in
///
/// # Response
///
/// - **303 See Other** to `/urls` on success, with the session established
/// - **400 Bad Request** on empty fields or an already-registered email
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Redirect, AppError> {
    let user = state.users.register(&payload.email, &payload.password)?;
    establish_session(&session, &user.id).await?;
    Ok(Redirect::to("/urls"))
}

/// `GET /login` - login form descriptor
pub async fn login_form() -> impl IntoResponse {
    Json(json!({
        "page": "login",
        "fields": ["email", "password"]
    }))
}

/// `POST /login` - verify credentials and establish the session
///
/// # Response
///
/// - **303 See Other** to `/urls` on success
/// - **400 Bad Request** on empty fields
/// - **404 Not Found** when no account has this email
/// - **403 Forbidden** on a wrong password
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Redirect, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::missing("email and/or password"));
    }

    let user = state
        .users
        .verify_credentials(&payload.email, &payload.password)?;
    establish_session(&session, &user.id).await?;

    Ok(Redirect::to("/urls"))
}

/// `POST /logout` - destroy the session and return to the login page
///
/// Clears the caller's identity and their visited-link markers; redirects
/// even when there was no session to clear.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/login"))
}

/// `GET /urls.json` - the caller's links as a raw `id -> record` map
///
/// Anonymous callers get an empty object rather than an error.
pub async fn links_json(State(state): State<AppState>, session: Session) -> Response {
    match current_user_id(&session).await {
        Some(user_id) => Json(state.links.list_for_owner(&user_id)).into_response(),
        None => Json(json!({})).into_response(),
    }
}

/// `GET /urls` - the caller's link list view
///
/// Logged-in callers see their own links only. Anonymous callers get a
/// placeholder view (`urls: null`) prompting them to log in; this endpoint
/// never rejects.
pub async fn list_links(State(state): State<AppState>, session: Session) -> Response {
    let current_user = match current_user_id(&session).await {
        Some(user_id) => state.users.find_by_id(&user_id),
        None => None,
    };

    let Some(user) = current_user else {
        return Json(json!({
            "current_user": null,
            "urls": null,
            "message": "Log in or register to see your URLs"
        }))
        .into_response();
    };

    let base_url = public_base_url();
    let urls: std::collections::HashMap<String, LinkView> = state
        .links
        .list_for_owner(&user.id)
        .iter()
        .map(|(id, link)| (id.clone(), LinkView::from_link(link, &base_url)))
        .collect();

    Json(json!({
        "current_user": UserView::from(&user),
        "urls": urls
    }))
    .into_response()
}

/// `GET /urls/new` - link creation form
///
/// Anonymous callers are redirected to `/login` instead of rejected, so the
/// browser flow lands on something actionable.
pub async fn new_link_form(session: Session) -> Response {
    match current_user_id(&session).await {
        Some(_) => Json(json!({
            "page": "urls_new",
            "fields": ["long_url"]
        }))
        .into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// `POST /urls` - create a short link owned by the caller
///
/// # Response
///
/// - **303 See Other** to the new link's detail page
/// - **400 Bad Request** when `long_url` is empty
/// - **403 Forbidden** for anonymous callers
pub async fn create_link(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<LinkRequest>,
) -> Result<Redirect, AppError> {
    if payload.long_url.is_empty() {
        return Err(AppError::missing("long_url"));
    }

    let link = state.links.create(&payload.long_url, &caller.user_id);
    Ok(Redirect::to(&format!("/urls/{}", link.id)))
}

/// `GET /u/{id}` - resolve a short code and redirect
///
/// This path is public: anyone holding a short link can follow it, which is
/// what makes the links shareable. Visit counters are not touched here;
/// they belong to the owner's detail view.
///
/// # Response
///
/// - **307 Temporary Redirect** to the original URL
/// - **404 Not Found** when the short code does not exist
pub async fn follow_link(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let link = state
        .links
        .get(&id)
        .ok_or_else(|| AppError::link_not_found(&id))?;

    Ok(Redirect::temporary(&link.long_url))
}

/// `GET /urls/{id}` - the owner's link detail view with visit counters
///
/// Opening this view records one visit: `total_visits` always increments,
/// `unique_visits` only the first time this session sees this id. Check
/// order is login (403), existence (404), ownership (403).
pub async fn link_detail(
    Path(id): Path<String>,
    State(state): State<AppState>,
    caller: CurrentUser,
    session: Session,
) -> Result<Json<LinkView>, AppError> {
    let link = state
        .links
        .get(&id)
        .ok_or_else(|| AppError::link_not_found(&id))?;

    if link.owner_id != caller.user_id {
        return Err(AppError::not_owner());
    }

    let first_visit = !visited_links(&session).await.contains(&id);
    let link = state.links.record_visit(&id, first_visit)?;
    if first_visit {
        mark_visited(&session, &id).await?;
    }

    Ok(Json(LinkView::from_link(&link, &public_base_url())))
}

/// `PUT /urls/{id}` - replace a link's long URL, owner-only
///
/// # Response
///
/// - **200 OK** with the updated link view
/// - **400 Bad Request** when `long_url` is empty
/// - **404 Not Found** / **403 Forbidden** per the registry's checks
pub async fn update_link(
    Path(id): Path<String>,
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<LinkView>, AppError> {
    if payload.long_url.is_empty() {
        return Err(AppError::missing("long_url"));
    }

    let link = state
        .links
        .update(&id, &payload.long_url, &caller.user_id)?;

    Ok(Json(LinkView::from_link(&link, &public_base_url())))
}

/// `DELETE /urls/{id}` (also `POST /urls/{id}/delete`) - remove a link,
/// owner-only, then return to the link list
pub async fn delete_link(
    Path(id): Path<String>,
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Redirect, AppError> {
    state.links.delete(&id, &caller.user_id)?;
    Ok(Redirect::to("/urls"))
}
