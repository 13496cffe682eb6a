use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AccessError;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

fn bearer_identity(req: &ServiceRequest) -> Result<AuthUser, AccessError> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AccessError::Transport("App config missing".into()))?;

    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AccessError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AccessError::unauthorized("Invalid Authorization header encoding"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AccessError::unauthorized("Authorization header must start with Bearer"))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Rejected token");
        AccessError::unauthorized("Invalid or expired token")
    })?;

    let role = Role::from_id(claims.role).ok_or_else(|| AccessError::unauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    })
}

/// Rejects the request with a `{"error": ...}` 401 unless it carries a valid
/// bearer token; otherwise stores the caller as [`AuthUser`].
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    match bearer_identity(&req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(e) => Ok(req.into_response(e.error_response())),
    }
}
