use actix_web::HttpRequest;

use crate::auth::{verify_jwt, JwtManager};
use crate::models::{Role, ServiceError};

/// Caller identity taken from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}

pub fn authenticate_request(
    req: &HttpRequest,
    jwt_manager: &JwtManager,
) -> Result<AuthenticatedUser, ServiceError> {
    let claims = verify_jwt(req, jwt_manager)?;
    Ok(AuthenticatedUser {
        id: claims.user_id()?,
        email: claims.email,
        role: claims.role,
    })
}

/// Client address for rate limiting: first `X-Forwarded-For` entry, then the
/// peer address.
pub fn client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
