/// Auth cookie building and parsing
///
/// The session token travels in an HTTP-only, same-site-strict cookie so it
/// is inaccessible to page scripts and never sent cross-site. This module
/// owns the cookie format; the auth routes set it and the auth middleware
/// reads it back out of the `Cookie` request header.
use leadstack_shared::auth::jwt::TOKEN_LIFETIME_DAYS;

/// Name of the auth cookie.
pub const AUTH_COOKIE: &str = "token";

/// Builds the `Set-Cookie` value carrying a session token.
///
/// Attributes: `Path=/`, `HttpOnly`, `SameSite=Strict`, and a `Max-Age`
/// matching the token's 7-day expiry.
pub fn auth_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        AUTH_COOKIE,
        token,
        TOKEN_LIFETIME_DAYS * 24 * 60 * 60
    )
}

/// Builds the `Set-Cookie` value that clears the auth cookie (logout).
pub fn clear_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        AUTH_COOKIE
    )
}

/// Extracts the session token from a raw `Cookie` header value.
///
/// The header carries `name=value` pairs separated by `; `. Returns the
/// first `token` cookie, or `None` when absent.
pub fn token_from_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == AUTH_COOKIE).then_some(value)
    })
}
