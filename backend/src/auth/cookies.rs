//! Session-token cookie names and builders.
//!
//! Both tokens travel as httpOnly, secure cookies in addition to the
//! response body, so browser clients never touch them from script while
//! mobile clients can read them from the JSON.

use axum_extra::extract::cookie::Cookie;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// httpOnly + secure cookie carrying one of the session tokens.
pub fn token_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_path("/");
    cookie
}

/// Cookie matching `token_cookie`'s name and path, for jar removal.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}
