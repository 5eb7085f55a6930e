use crate::auth::{hash_password, verify_password};
use crate::models::{ChangePasswordRequest, ServiceError, UpdateProfileRequest, UserResponse};
use crate::repositories::{TokenRepository, UserRepository};
use std::sync::Arc;

const SEARCH_LIMIT: i64 = 20;

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, tokens: Arc<dyn TokenRepository>) -> Self {
        Self { repository, tokens }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserResponse, ServiceError> {
        self.repository
            .find_view(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        changes: &UpdateProfileRequest,
    ) -> Result<UserResponse, ServiceError> {
        let changes = UpdateProfileRequest {
            full_name: changes.full_name.as_deref().map(|n| n.trim().to_string()),
            phone: changes.phone.clone(),
            bio: changes.bio.clone(),
            avatar_url: changes.avatar_url.clone(),
        };
        self.repository.update_profile(user_id, &changes).await?;
        self.get_user(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        form: &ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if !verify_password(&form.current_password, &user.password_hash) {
            return Err(ServiceError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }
        if form.current_password == form.new_password {
            return Err(ServiceError::ValidationError(
                "New password must be different from the current one".to_string(),
            ));
        }

        let password_hash = hash_password(&form.new_password)?;
        self.repository.update_password(user_id, &password_hash).await?;
        self.tokens.delete_refresh_tokens_for_user(user_id).await?;

        tracing::info!("Password changed for user {}", user_id);
        Ok(())
    }

    pub async fn search_by_email(&self, fragment: &str) -> Result<Vec<UserResponse>, ServiceError> {
        let fragment = fragment.trim();
        if fragment.len() < 3 {
            return Err(ServiceError::ValidationError(
                "Search term must be at least 3 characters".to_string(),
            ));
        }
        self.repository.search_by_email(fragment, SEARCH_LIMIT).await
    }
}
