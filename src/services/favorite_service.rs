use std::sync::Arc;

use crate::models::{
    BusinessSummary, FavoriteCheckResponse, FavoriteResponse, PageQuery, PageResponse,
    ServiceError,
};
use crate::repositories::{BusinessRepository, FavoriteRepository, FavoriteRow};
use crate::services::business_service::require_active_business;

pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    businesses: Arc<dyn BusinessRepository>,
}

fn to_response(row: FavoriteRow) -> FavoriteResponse {
    FavoriteResponse {
        id: row.favorite_id,
        business: BusinessSummary::from(row.business),
        created_at: row.favorited_at,
    }
}

impl FavoriteService {
    pub fn new(favorites: Arc<dyn FavoriteRepository>, businesses: Arc<dyn BusinessRepository>) -> Self {
        Self {
            favorites,
            businesses,
        }
    }

    pub async fn page(&self, user_id: i64, paging: &PageQuery) -> Result<PageResponse<FavoriteResponse>, ServiceError> {
        let (page, size) = paging.resolve();
        let (rows, total) = self.favorites.page(user_id, size, page * size).await?;
        let content = rows.into_iter().map(to_response).collect();
        Ok(PageResponse::new(content, total, page, size))
    }

    pub async fn all(&self, user_id: i64) -> Result<Vec<FavoriteResponse>, ServiceError> {
        let rows = self.favorites.list_all(user_id).await?;
        Ok(rows.into_iter().map(to_response).collect())
    }

    pub async fn ids(&self, user_id: i64) -> Result<Vec<i64>, ServiceError> {
        self.favorites.business_ids(user_id).await
    }

    pub async fn check(&self, user_id: i64, business_id: i64) -> Result<FavoriteCheckResponse, ServiceError> {
        Ok(FavoriteCheckResponse {
            business_id,
            is_favorite: self.favorites.exists(user_id, business_id).await?,
        })
    }

    /// Adding an existing favorite is a no-op.
    pub async fn add(&self, user_id: i64, business_id: i64) -> Result<FavoriteCheckResponse, ServiceError> {
        require_active_business(self.businesses.as_ref(), business_id).await?;
        if self.favorites.add(user_id, business_id).await? {
            tracing::debug!("User {} added business {} to favorites", user_id, business_id);
        }
        Ok(FavoriteCheckResponse {
            business_id,
            is_favorite: true,
        })
    }

    /// Removing a missing favorite is a no-op as well.
    pub async fn remove(&self, user_id: i64, business_id: i64) -> Result<(), ServiceError> {
        self.favorites.remove(user_id, business_id).await?;
        Ok(())
    }

    pub async fn toggle(&self, user_id: i64, business_id: i64) -> Result<FavoriteCheckResponse, ServiceError> {
        if self.favorites.remove(user_id, business_id).await? {
            return Ok(FavoriteCheckResponse {
                business_id,
                is_favorite: false,
            });
        }
        self.add(user_id, business_id).await
    }

    pub async fn count(&self, user_id: i64) -> Result<i64, ServiceError> {
        self.favorites.count(user_id).await
    }
}
