//! HttpOnly cookie plumbing for the two session tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const ACCESS_COOKIE_PATH: &str = "/";
/// Refresh tokens only travel to the auth endpoints.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

pub fn build_auth_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    path: &str,
    options: CookieOptions,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        name,
        value,
        path,
        max_age.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expires a cookie immediately; used by logout and by the forced session
/// close after check-out.
pub fn build_clear_cookie(name: &str, path: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}",
        name,
        path,
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
