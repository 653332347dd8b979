use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Bearer-token middleware. Validates the token and stores the resolved
/// `User` in the request extensions for handlers to pick up.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
