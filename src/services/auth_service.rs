use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::auth::{hash_password, verify_password, JwtManager, TokenType};
use crate::models::{
    AuthResponse, ForgotPasswordResponse, LoginRequest, RegisterRequest, Role, ServiceError, User,
};
use crate::repositories::{NewUser, TokenRepository, UserRepository};
use crate::services::EmailService;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub password_reset_minutes: i64,
    pub dev_mode: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            password_reset_minutes: 60,
            dev_mode: false,
        }
    }
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    jwt_manager: JwtManager,
    email: Arc<EmailService>,
    settings: AuthSettings,
}

const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, you will receive a link to reset your password";

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        jwt_manager: JwtManager,
        email: Arc<EmailService>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt_manager,
            email,
            settings,
        }
    }

    pub async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let email = normalize_email(&form.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&form.password)?;
        let user = self
            .users
            .create(NewUser {
                email: &email,
                password_hash: &password_hash,
                role: form.role.unwrap_or(Role::Client),
                full_name: form.full_name.trim(),
                phone: form.phone.as_deref(),
            })
            .await?;

        tracing::info!("Registered user {} as {}", user.email, user.role.as_str());
        self.issue_tokens(&user).await
    }

    pub async fn login(&self, form: &LoginRequest) -> Result<AuthResponse, ServiceError> {
        let invalid = || ServiceError::AuthenticationError("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(&form.email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&form.password, &user.password_hash) {
            return Err(invalid());
        }
        if !user.enabled {
            return Err(ServiceError::AuthenticationError(
                "Account is disabled".to_string(),
            ));
        }

        // One active session per user
        self.tokens.delete_refresh_tokens_for_user(user.id).await?;

        tracing::info!("User {} logged in", user.email);
        self.issue_tokens(&user).await
    }

    /// Exchanges a stored refresh token for a new pair. The presented token
    /// is consumed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ServiceError> {
        let invalid = || ServiceError::AuthenticationError("Invalid refresh token".to_string());

        let claims = self
            .jwt_manager
            .verify_token(refresh_token)
            .map_err(|_| invalid())?
            .claims;
        if claims.token_type != TokenType::Refresh {
            return Err(invalid());
        }

        let stored = self
            .tokens
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(invalid)?;

        if stored.expires_at < Utc::now().naive_utc() {
            self.tokens.delete_refresh_token(refresh_token).await?;
            return Err(ServiceError::AuthenticationError(
                "Refresh token expired".to_string(),
            ));
        }

        // A concurrent refresh of the same token finds no row left to delete
        if self.tokens.delete_refresh_token(refresh_token).await? == 0 {
            return Err(invalid());
        }

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or_else(invalid)?;

        self.issue_tokens(&user).await
    }

    pub async fn logout(&self, user_id: i64) -> Result<(), ServiceError> {
        let removed = self.tokens.delete_refresh_tokens_for_user(user_id).await?;
        tracing::info!("User {} logged out, {} session(s) closed", user_id, removed);
        Ok(())
    }

    /// Never reveals whether the address belongs to an account.
    pub async fn forgot_password(&self, email: &str) -> Result<ForgotPasswordResponse, ServiceError> {
        let mut response = ForgotPasswordResponse {
            success: true,
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
            dev_reset_link: None,
        };

        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(response);
        };

        self.tokens.delete_reset_tokens_for_user(user.id).await?;

        let token = uuid::Uuid::new_v4().to_string();
        let expires_at =
            Utc::now().naive_utc() + Duration::minutes(self.settings.password_reset_minutes);
        self.tokens.save_reset_token(user.id, &token, expires_at).await?;

        let full_name = self
            .users
            .find_profile(user.id)
            .await?
            .map(|p| p.full_name)
            .unwrap_or_default();
        self.email
            .send_password_reset(&user.email, &full_name, &token)
            .await;

        if self.settings.dev_mode {
            response.dev_reset_link = Some(self.email.reset_link(&token));
        }

        Ok(response)
    }

    pub async fn validate_reset_token(&self, token: &str) -> Result<(), ServiceError> {
        match self.tokens.find_reset_token(token).await? {
            Some(reset) if reset.is_valid_at(Utc::now().naive_utc()) => Ok(()),
            _ => Err(ServiceError::ValidationError(
                "Invalid or expired token".to_string(),
            )),
        }
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ServiceError> {
        let reset = self
            .tokens
            .find_reset_token(token)
            .await?
            .filter(|reset| reset.is_valid_at(Utc::now().naive_utc()))
            .ok_or_else(|| ServiceError::ValidationError("Invalid or expired token".to_string()))?;

        let password_hash = hash_password(new_password)?;
        self.users.update_password(reset.user_id, &password_hash).await?;
        self.tokens.mark_reset_token_used(reset.id).await?;
        // Every open session ends with the old password
        self.tokens.delete_refresh_tokens_for_user(reset.user_id).await?;

        tracing::info!("Password reset completed for user {}", reset.user_id);
        Ok(())
    }

    async fn issue_tokens(&self, user: &User) -> Result<AuthResponse, ServiceError> {
        let access_token = self
            .jwt_manager
            .generate_access_token(user.id, &user.email, user.role)?;
        let refresh_token = self
            .jwt_manager
            .generate_refresh_token(user.id, &user.email, user.role)?;

        let expires_at = Utc::now().naive_utc() + self.jwt_manager.refresh_ttl();
        self.tokens
            .save_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        let full_name = self
            .users
            .find_profile(user.id)
            .await?
            .map(|p| p.full_name)
            .unwrap_or_default();

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_manager.access_ttl_seconds(),
            user_id: user.id,
            email: user.email.clone(),
            full_name,
            role: user.role,
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
