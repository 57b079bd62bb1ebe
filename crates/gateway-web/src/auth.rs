//! Demo-grade login sessions and role checks.
//!
//! Credentials are checked against the roster; a successful login yields an
//! opaque in-memory token presented back as a bearer header or cookie.
//! Sessions do not survive a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use tracing::info;

use triage_core::Role;

use crate::error::AppError;
use crate::state::AppState;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "qd_session";

/// A logged-in roster member.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// In-memory session registry.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: RwLock<HashMap<String, Session>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and return its opaque token.
    pub fn create(&self, session: Session) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        info!(email = %session.email, role = session.role.as_str(), "Session created");
        self.inner
            .write()
            .expect("session lock poisoned")
            .insert(token.clone(), session);
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.inner
            .read()
            .expect("session lock poisoned")
            .get(token)
            .cloned()
    }

    pub fn remove(&self, token: &str) -> bool {
        self.inner
            .write()
            .expect("session lock poisoned")
            .remove(token)
            .is_some()
    }
}

/// Pull the session token from a bearer header or the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers.get(COOKIE).and_then(|v| v.to_str().ok())?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some(token) = pair.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            return Some(token.to_string());
        }
    }
    None
}

/// Resolve the caller's session or reject with 401.
pub fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let token = token_from_headers(headers)
        .ok_or_else(|| AppError::Unauthorized("Login required.".to_string()))?;
    state
        .sessions
        .get(&token)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired session.".to_string()))
}

/// Resolve the caller's session and require a manager/admin role.
pub fn require_supervisor(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let session = require_session(state, headers)?;
    if !session.role.is_supervisor() {
        return Err(AppError::Forbidden(
            "Only managers and admins may do this.".to_string(),
        ));
    }
    Ok(session)
}

/// Resolve the caller's session and require the admin role.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let session = require_session(state, headers)?;
    if session.role != Role::Admin {
        return Err(AppError::Forbidden("Admin only.".to_string()));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn session() -> Session {
        Session {
            email: "m@example.com".to_string(),
            name: "M".to_string(),
            role: Role::Manager,
        }
    }

    #[test]
    fn test_session_roundtrip() {
        let sessions = Sessions::new();
        let token = sessions.create(session());

        assert_eq!(sessions.get(&token).unwrap().email, "m@example.com");
        assert!(sessions.remove(&token));
        assert!(sessions.get(&token).is_none());
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; qd_session=tok-1; other=x"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_missing_token() {
        assert!(token_from_headers(&HeaderMap::new()).is_none());
    }
}
