use std::sync::Arc;

use anyhow::Context;
use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use invoicer_crypto::CsrfService;
use invoicer_db::Database;

use crate::applog::{AppLog, Audited, RequestContext};
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub csrf: CsrfService,
    pub credentials: Credentials,
}

/// The single user/password pair allowed to open the index page.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both halves must match. Comparisons are constant time.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password
            .as_bytes()
            .ct_eq(self.password.expose_secret().as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    csrf_token: String,
}

/// GET / — Basic-auth protected page embedding a fresh CSRF token.
pub async fn get_index(
    State(state): State<AppState>,
    ctx: RequestContext,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(reason) = authenticate(&state.credentials, &headers) {
        AppLog::new("auth-failed", StatusCode::UNAUTHORIZED, reason).emit(&ctx);
        return Err(ApiError::Unauthorized);
    }

    let page = IndexTemplate {
        csrf_token: state.csrf.create(),
    }
    .render()
    .context("failed to render index page")
    .map_err(ApiError::from)
    .audited("get-index", &ctx)?;

    AppLog::new("get-index", StatusCode::OK, "served index page").emit(&ctx);
    Ok((
        [
            (header::CONTENT_SECURITY_POLICY, "default-src 'self';"),
            (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        ],
        Html(page),
    ))
}

fn authenticate(credentials: &Credentials, headers: &HeaderMap) -> Result<(), String> {
    let (username, password) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth)
        .ok_or_else(|| "missing or malformed basic auth credentials".to_string())?;

    if !credentials.matches(&username, &password) {
        return Err(format!("rejected credentials for user {:?}", username));
    }
    Ok(())
}

/// Splits a `Basic <base64(user:pass)>` header value into its user and
/// password. The password is everything after the first `:`.
pub fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
