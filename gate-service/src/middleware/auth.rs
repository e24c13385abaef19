use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::{
    models::Session,
    services::sessions::SessionService,
    AppState,
};

/// What the auth middleware leaves in request extensions for handlers:
/// the resolved session plus the token handles needed to address it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub token_hash: String,
    pub session: Session,
}

/// Middleware to require a live session. Resolving the token also applies
/// lazy expiry, so an expired session 401s and disappears in one step.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token.to_string(),
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Missing or invalid Authorization header".to_string(),
                }),
            ));
        }
    };

    let session = match state.sessions.resolve(&token) {
        Some(session) => session,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Session expired or invalid".to_string(),
                }),
            ));
        }
    };

    let token_hash = SessionService::hash_token(&token);
    req.extensions_mut().insert(SessionContext {
        token,
        token_hash,
        session,
    });

    Ok(next.run(req).await)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Extractor to easily get the session in handlers
pub struct AuthSession(pub SessionContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<SessionContext>().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Session context missing from request extensions".to_string(),
            }),
        ))?;

        Ok(AuthSession(ctx.clone()))
    }
}
