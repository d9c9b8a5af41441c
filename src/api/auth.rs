use axum::{
    Extension, Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState, types::MessageResponse};
use crate::services::{Actor, LoginResult, RequestContext, UserInfo};

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// On success the resolved [`Actor`] is attached to the request for
/// downstream middleware and handlers.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Check session first (fastest path for browser clients)
    if let Ok(Some(username)) = session.get::<String>(SESSION_USER_KEY).await
        && let Ok(Some(actor)) = state.auth_service().resolve_actor(&username).await
    {
        return Ok(run_as(actor, &headers, request, next).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(actor)) = state.auth_service().verify_api_key(&key).await
    {
        return Ok(run_as(actor, &headers, request, next).await);
    }

    Err(ApiError::Unauthorized("Authentication required".to_string()))
}

/// Attach the actor and the request provenance, then continue. The peer
/// address is only present when the server was started with connect info.
async fn run_as(actor: Actor, headers: &HeaderMap, mut request: Request, next: Next) -> Response {
    tracing::Span::current().record("user_id", &actor.username);

    let ctx = RequestContext {
        actor: Some(actor.username.clone()),
        remote_addr: request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    request.extensions_mut().insert(actor);
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Gate for mutating routes; runs after `auth_middleware`.
pub async fn require_admin(
    Extension(actor): Extension<Actor>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if actor.is_admin() {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Forbidden("Admin role required".to_string()))
    }
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with username and password, establishes a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResult>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    let result = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, &result.username)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create session: {e}")))?;

    Ok(Json(result))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// Get current user information (requires authentication)
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserInfo>, ApiError> {
    let info = state.auth_service().get_user_info(&actor.username).await?;
    Ok(Json(info))
}

/// PUT /auth/password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service()
        .change_password(
            &actor.username,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!("Password changed for user: {}", actor.username);

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}
