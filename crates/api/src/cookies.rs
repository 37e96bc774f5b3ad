//! `Set-Cookie` values for the session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use vanguard_core::session::SESSION_COOKIE;

/// Cookie carrying a freshly issued session token for `max_age`.
pub fn session_cookie(token: String, max_age: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Cookie instructing the browser to drop the session immediately.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_browser_protections() {
        let header = session_cookie("abc.def.ghi".into(), chrono::Duration::days(7)).to_string();

        assert!(header.starts_with("session=abc.def.ghi"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=604800"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let header = clear_session_cookie().to_string();

        assert!(header.starts_with("session=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("HttpOnly"));
    }
}
