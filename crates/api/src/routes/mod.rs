pub mod health;

use axum::routing::{get, post, MethodRouter};
use axum::Router;

use crate::handlers::{self, members, oauth, proxy, session};
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /oauth-config            client id, redirect and authorize URLs (GET)
/// /oauth-token             authorization code exchange (POST)
/// /user-info               profile for a bearer token (GET)
///
/// /create-session          issue the session cookie (POST)
/// /check-session           summary of the current session (GET)
/// /logout                  clear the session cookie (POST)
///
/// /bungie                  anonymous platform pass-through (GET)
/// /bungie-auth             session-bearing platform pass-through (GET)
///
/// /opted-in-members        list (GET), opt in (POST)
/// ```
///
/// Every route also answers `OPTIONS` and rejects other methods, HEAD
/// included, with 405.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/oauth-config", with_defaults(get(oauth::oauth_config)))
        .route("/oauth-token", with_defaults(post(oauth::oauth_token)))
        .route("/user-info", with_defaults(get(oauth::user_info)))
        .route("/create-session", with_defaults(post(session::create_session)))
        .route("/check-session", with_defaults(get(session::check_session)))
        .route("/logout", with_defaults(post(session::logout)))
        .route("/bungie", with_defaults(get(proxy::public_proxy)))
        .route("/bungie-auth", with_defaults(get(proxy::authenticated_proxy)))
        .route(
            "/opted-in-members",
            with_defaults(get(members::list_members).post(members::opt_in)),
        )
}

fn with_defaults(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    // HEAD would otherwise run the GET handler.
    route
        .head(handlers::method_not_allowed)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}
