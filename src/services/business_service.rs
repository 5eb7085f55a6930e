use std::sync::Arc;

use crate::models::{
    AddImageRequest, Business, BusinessCategory, BusinessDetailResponse, BusinessImage,
    BusinessSearchQuery, BusinessSummary, CategoryResponse, CreateBusinessRequest, PageResponse,
    ReviewResponse, ServiceError, UpdateBusinessRequest, WorkerResponse,
};
use crate::repositories::{
    BusinessFilter, BusinessRepository, ReviewRepository, ServiceOfferingRepository,
    UserRepository, WorkerRepository,
};

/// Loads an active business and checks that `user_id` owns it.
pub async fn require_owned_business(
    repository: &dyn BusinessRepository,
    business_id: i64,
    user_id: i64,
) -> Result<Business, ServiceError> {
    let business = require_active_business(repository, business_id).await?;
    if business.owner_id != user_id {
        return Err(ServiceError::Forbidden(
            "You are not the owner of this business".to_string(),
        ));
    }
    Ok(business)
}

pub async fn require_active_business(
    repository: &dyn BusinessRepository,
    business_id: i64,
) -> Result<Business, ServiceError> {
    repository
        .find_by_id(business_id)
        .await?
        .filter(|b| b.active)
        .ok_or_else(|| ServiceError::NotFound("Business not found".to_string()))
}

pub struct BusinessService {
    businesses: Arc<dyn BusinessRepository>,
    services: Arc<dyn ServiceOfferingRepository>,
    workers: Arc<dyn WorkerRepository>,
    users: Arc<dyn UserRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl BusinessService {
    pub fn new(
        businesses: Arc<dyn BusinessRepository>,
        services: Arc<dyn ServiceOfferingRepository>,
        workers: Arc<dyn WorkerRepository>,
        users: Arc<dyn UserRepository>,
        reviews: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self {
            businesses,
            services,
            workers,
            users,
            reviews,
        }
    }

    pub fn categories(&self) -> Vec<CategoryResponse> {
        BusinessCategory::ALL
            .iter()
            .map(|category| CategoryResponse {
                value: *category,
                label: category.label().to_string(),
            })
            .collect()
    }

    pub async fn search(
        &self,
        query: &BusinessSearchQuery,
    ) -> Result<PageResponse<BusinessSummary>, ServiceError> {
        let (page, size) = query.paging().resolve();
        let filter = BusinessFilter {
            query: query.query.clone(),
            category: query.category,
            city: query.city.clone(),
        };

        let (businesses, total) = self.businesses.search(&filter, size, page * size).await?;
        let content = businesses.into_iter().map(BusinessSummary::from).collect();
        Ok(PageResponse::new(content, total, page, size))
    }

    pub async fn get_detail(&self, business_id: i64) -> Result<BusinessDetailResponse, ServiceError> {
        let business = require_active_business(self.businesses.as_ref(), business_id).await?;

        let owner_name = self
            .users
            .find_profile(business.owner_id)
            .await?
            .map(|p| p.full_name)
            .unwrap_or_default();

        let services = self.services.list_active(business_id).await?;

        let mut workers = Vec::new();
        for row in self.workers.list_active_profiles(business_id).await? {
            let schedules = self.workers.list_schedules(row.id).await?;
            workers.push(WorkerResponse::new(row, schedules));
        }

        let gallery = self
            .businesses
            .list_images(business_id)
            .await?
            .into_iter()
            .map(|image| image.image_url)
            .collect();

        Ok(BusinessDetailResponse {
            business: business.into(),
            owner_name,
            services,
            workers,
            gallery,
        })
    }

    pub async fn my_businesses(&self, owner_id: i64) -> Result<Vec<BusinessSummary>, ServiceError> {
        let businesses = self.businesses.find_by_owner(owner_id).await?;
        Ok(businesses.into_iter().map(BusinessSummary::from).collect())
    }

    pub async fn create(
        &self,
        owner_id: i64,
        form: &CreateBusinessRequest,
    ) -> Result<BusinessSummary, ServiceError> {
        let id = self.businesses.create(owner_id, form).await?;
        tracing::info!("Business {} created by user {}", id, owner_id);

        self.businesses
            .find_by_id(id)
            .await?
            .map(BusinessSummary::from)
            .ok_or_else(|| ServiceError::InternalError("Created business not found".to_string()))
    }

    pub async fn update(
        &self,
        business_id: i64,
        owner_id: i64,
        changes: &UpdateBusinessRequest,
    ) -> Result<BusinessSummary, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.businesses.update(business_id, changes).await?;

        self.businesses
            .find_by_id(business_id)
            .await?
            .map(BusinessSummary::from)
            .ok_or_else(|| ServiceError::NotFound("Business not found".to_string()))
    }

    pub async fn delete(&self, business_id: i64, owner_id: i64) -> Result<(), ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.businesses.deactivate(business_id).await?;
        tracing::info!("Business {} deactivated", business_id);
        Ok(())
    }

    pub async fn reviews(&self, business_id: i64) -> Result<Vec<ReviewResponse>, ServiceError> {
        require_active_business(self.businesses.as_ref(), business_id).await?;
        self.reviews.list_for_business(business_id).await
    }

    // Gallery

    pub async fn images(&self, business_id: i64) -> Result<Vec<BusinessImage>, ServiceError> {
        require_active_business(self.businesses.as_ref(), business_id).await?;
        self.businesses.list_images(business_id).await
    }

    pub async fn add_image(
        &self,
        business_id: i64,
        owner_id: i64,
        form: &AddImageRequest,
    ) -> Result<BusinessImage, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.businesses
            .add_image(business_id, form.image_url.trim(), form.caption.as_deref())
            .await
    }

    pub async fn remove_image(
        &self,
        business_id: i64,
        image_id: i64,
        owner_id: i64,
    ) -> Result<(), ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        let image = self
            .businesses
            .find_image(image_id)
            .await?
            .filter(|image| image.business_id == business_id)
            .ok_or_else(|| ServiceError::NotFound("Image not found".to_string()))?;

        self.businesses.delete_image(image.id).await
    }
}
