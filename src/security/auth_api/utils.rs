use axum::body::Body;
use axum::http::{header, HeaderMap, Request};

use super::config::AuthConfig;
use crate::security::jwt::extract_bearer_token;

pub fn extract_session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let (name, value) = cookie.trim().split_once('=')?;

                if name == cookie_name && !value.is_empty() {
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}

/// Bearer header first, then the session cookie.
pub fn token_from_headers(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string);

    bearer.or_else(|| extract_session_from_cookies(headers, &config.session_cookie_name))
}

pub fn extract_session_token(request: &Request<Body>, config: &AuthConfig) -> Option<String> {
    token_from_headers(request.headers(), config)
}

pub fn session_cookie(config: &AuthConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, token, config.session_max_age_secs
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(config: &AuthConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie_name
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}
