use actix_web::HttpRequest;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{Role, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub email: String,
    pub role: Role,
    pub token_type: TokenType,
    pub jti: String, // Unique per token so rotated refresh tokens never collide
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, ServiceError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| ServiceError::AuthenticationError("Invalid token subject".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self::with_lifetimes(secret, 60, 7)
    }

    pub fn with_lifetimes(secret: &str, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        }
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn generate_access_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate_token(user_id, email, role, TokenType::Access, self.access_ttl)
    }

    pub fn generate_refresh_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate_token(user_id, email, role, TokenType::Refresh, self.refresh_ttl)
    }

    fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            token_type,
            jti: uuid::Uuid::new_v4().to_string(),
            exp: (now + expires_in).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn verify_token(
        &self,
        token: &str,
    ) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
    }
}

pub fn extract_token_from_header(req: &HttpRequest) -> Option<String> {
    let auth_header = req
        .headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    // Swagger UI sometimes sends "Bearer bearer <token>"
    if auth_header.starts_with("bearer ") {
        Some(auth_header.strip_prefix("bearer ")?.to_string())
    } else {
        Some(auth_header.to_string())
    }
}

/// Verifies the bearer token of a request and returns its claims. Only
/// access tokens are accepted here.
pub fn verify_jwt(req: &HttpRequest, jwt_manager: &JwtManager) -> Result<Claims, ServiceError> {
    let token = extract_token_from_header(req).ok_or_else(|| {
        ServiceError::AuthenticationError("Missing Authorization header".to_string())
    })?;

    let claims = jwt_manager
        .verify_token(&token)
        .map_err(|_| ServiceError::AuthenticationError("Invalid or expired token".to_string()))?
        .claims;

    if claims.token_type != TokenType::Access {
        return Err(ServiceError::AuthenticationError(
            "Invalid token type".to_string(),
        ));
    }

    Ok(claims)
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let manager = JwtManager::new("unit-test-secret");
        let token = manager
            .generate_access_token(7, "ana@example.com", Role::Owner)
            .unwrap();
        let claims = manager.verify_token(&token).unwrap().claims;
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let issuer = JwtManager::new("secret-a");
        let verifier = JwtManager::new("secret-b");
        let token = issuer.generate_access_token(1, "a@b.c", Role::Client).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let manager = JwtManager::with_lifetimes("unit-test-secret", -5, 7);
        let token = manager.generate_access_token(1, "a@b.c", Role::Client).unwrap();
        assert!(manager.verify_token(&token).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique() {
        let manager = JwtManager::new("unit-test-secret");
        let first = manager.generate_refresh_token(1, "a@b.c", Role::Client).unwrap();
        let second = manager.generate_refresh_token(1, "a@b.c", Role::Client).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}
