#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vanguard_api::config::{BungieConfig, Secret, ServerConfig, SessionConfig, DEFAULT_OAUTH_SCOPE};
use vanguard_api::router::build_app_router;
use vanguard_api::state::AppState;
use vanguard_core::clock::{Clock, ManualClock};
use vanguard_core::session::{DestinyMembership, Session};
use vanguard_core::upstream::AuthFailureSignals;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_CLIENT_ID: &str = "48213";
pub const TEST_CLIENT_SECRET: &str = "client-secret-value";

/// Build a test `ServerConfig` with every secret present, pointed at
/// `base_url` for all platform calls.
pub fn test_config(base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        session: SessionConfig {
            secret: Some(Secret::new(TEST_SECRET)),
            ttl_days: 7,
        },
        bungie: BungieConfig {
            api_key: Some(Secret::new(TEST_API_KEY)),
            client_id: Some(TEST_CLIENT_ID.to_string()),
            client_secret: Some(Secret::new(TEST_CLIENT_SECRET)),
            base_url: base_url.to_string(),
            oauth_scope: DEFAULT_OAUTH_SCOPE.to_string(),
            timeout_secs: 2,
        },
        proxy_diagnostics: false,
        auth_failure_signals: AuthFailureSignals::default(),
    }
}

/// Application under test plus the handles tests steer it with.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Sign a session with the app's own codec, as `create-session` would.
    pub fn mint_session(&self, session: &Session) -> String {
        let codec = self.state.session_codec().expect("codec configured");
        codec
            .encode(session, self.clock.now())
            .expect("session encodes")
    }

    /// A usable session whose access token is valid for another hour.
    pub fn session(&self) -> Session {
        let now = self.clock.now_millis();
        Session {
            user_id: "14916245".to_string(),
            display_name: "Ikora".to_string(),
            destiny_memberships: vec![membership("4611686018467284386", 3)],
            access_token: Some("upstream-access-token".to_string()),
            refresh_token: Some("upstream-refresh-token".to_string()),
            token_expiry: now + 3_600_000,
            created_at: now,
        }
    }

    /// `Cookie` header value carrying a freshly minted usable session.
    pub fn session_cookie(&self) -> String {
        format!("session={}", self.mint_session(&self.session()))
    }
}

pub fn membership(id: &str, kind: i32) -> DestinyMembership {
    DestinyMembership {
        membership_id: id.to_string(),
        membership_type: kind,
        extra: Default::default(),
    }
}

/// Build the full application router with all middleware layers and a
/// manually driven clock.
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(config: ServerConfig) -> TestApp {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let state = AppState::new(config, clock.clone()).expect("state builds");
    let router = build_app_router(state.clone());

    TestApp {
        router,
        state,
        clock,
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: &TestApp, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_with_cookie(app: &TestApp, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `Set-Cookie` header of `response`, which must be present.
pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .expect("response sets a cookie")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` pair of a `Set-Cookie` header, usable as a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

/// Platform envelope as the upstream API shapes it.
pub fn envelope(code: i64, status: &str, message: &str, response: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "Response": response,
        "ErrorCode": code,
        "ThrottleSeconds": 0,
        "ErrorStatus": status,
        "Message": message,
        "MessageData": {}
    })
}
