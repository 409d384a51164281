use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{self, AuthError};
use crate::config::AuthMode;
use crate::response::AppError;
use crate::state::AppState;

/// Resolves the caller and stores an [`auth::AuthUser`] in the request
/// extensions; rejects with 401 otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let resolved = match state.config().auth_mode {
        AuthMode::TrustedHeader => auth::trusted_user(req.headers()).ok_or(AuthError::MissingToken),
        AuthMode::Jwt => {
            let token = auth::extract_token(req.headers()).ok_or(AuthError::MissingToken);
            let secret = state
                .config()
                .jwt_secret
                .as_deref()
                .ok_or(AuthError::MissingSecret);
            token.and_then(|token| secret.and_then(|secret| auth::verify_jwt_hs256(&token, secret)))
        }
    };

    match resolved {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AuthError::MissingSecret) => {
            tracing::error!("AUTH_MODE=jwt but JWT_SECRET is not set");
            AppError::unauthorized("Not Authorized").into_response()
        }
        Err(err) => {
            tracing::debug!(error = %err, path = %req.uri().path(), "request rejected by auth");
            AppError::unauthorized("Not Authorized. Login Again").into_response()
        }
    }
}
