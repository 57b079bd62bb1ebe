//! Login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::AppendHeaders;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use ticket_store::roster;
use triage_core::Role;

use crate::auth::{self, Session, SESSION_COOKIE};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub status: String,
}

/// `POST /api/login`
///
/// Demo-grade credential check against the roster. Returns the session
/// token in the body and as a cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<LoginResponse>)> {
    let rejection = || AppError::Unauthorized("Invalid email or password.".to_string());

    let entry = roster::get_by_email(state.store.pool(), req.email.trim())
        .await
        .map_err(|_| rejection())?;
    if entry.password != req.password {
        return Err(rejection());
    }

    let token = state.sessions.create(Session {
        email: entry.email,
        name: entry.name.clone(),
        role: entry.role,
    });
    info!(email = %req.email, "Login successful");

    let cookie = format!("{}={}; HttpOnly; Path=/", SESSION_COOKIE, token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            token,
            name: entry.name,
            role: entry.role,
        }),
    ))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>> {
    if let Some(token) = auth::token_from_headers(&headers) {
        state.sessions.remove(&token);
    }
    Ok(Json(LogoutResponse {
        status: "logged_out".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{bearer_headers, state_with_recorder};

    #[tokio::test]
    async fn test_login_issues_usable_session() {
        let (state, _) = state_with_recorder().await;

        let (_, Json(response)) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "maya@example.com".to_string(),
                password: "123".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.name, "Maya Lopez");
        assert_eq!(response.role, Role::Manager);
        assert!(state.sessions.get(&response.token).is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (state, _) = state_with_recorder().await;

        let result = login(
            State(state),
            Json(LoginRequest {
                email: "maya@example.com".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_gets_same_rejection() {
        let (state, _) = state_with_recorder().await;

        let result = login(
            State(state),
            Json(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "123".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let (state, _) = state_with_recorder().await;
        let (_, Json(response)) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "maya@example.com".to_string(),
                password: "123".to_string(),
            }),
        )
        .await
        .unwrap();

        logout(State(state.clone()), bearer_headers(&response.token))
            .await
            .unwrap();
        assert!(state.sessions.get(&response.token).is_none());
    }
}
