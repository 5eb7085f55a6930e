use std::sync::Arc;

use crate::models::{CreateServiceRequest, ServiceError, ServiceOffering, UpdateServiceRequest};
use crate::repositories::{BusinessRepository, ServiceOfferingRepository};
use crate::services::business_service::{require_active_business, require_owned_business};

/// Bookable services offered by each business.
pub struct CatalogService {
    businesses: Arc<dyn BusinessRepository>,
    services: Arc<dyn ServiceOfferingRepository>,
}

impl CatalogService {
    pub fn new(
        businesses: Arc<dyn BusinessRepository>,
        services: Arc<dyn ServiceOfferingRepository>,
    ) -> Self {
        Self {
            businesses,
            services,
        }
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<ServiceOffering>, ServiceError> {
        require_active_business(self.businesses.as_ref(), business_id).await?;
        self.services.list_active(business_id).await
    }

    pub async fn get(&self, business_id: i64, service_id: i64) -> Result<ServiceOffering, ServiceError> {
        self.services
            .find_by_id(service_id)
            .await?
            .filter(|s| s.business_id == business_id && s.active)
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))
    }

    pub async fn create(
        &self,
        business_id: i64,
        owner_id: i64,
        form: &CreateServiceRequest,
    ) -> Result<ServiceOffering, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        let id = self.services.create(business_id, form).await?;
        tracing::info!("Service {} added to business {}", id, business_id);
        self.get(business_id, id).await
    }

    pub async fn update(
        &self,
        business_id: i64,
        service_id: i64,
        owner_id: i64,
        changes: &UpdateServiceRequest,
    ) -> Result<ServiceOffering, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.get(business_id, service_id).await?;
        self.services.update(service_id, changes).await?;

        self.services
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))
    }

    pub async fn delete(&self, business_id: i64, service_id: i64, owner_id: i64) -> Result<(), ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.get(business_id, service_id).await?;
        self.services.deactivate(service_id).await
    }
}
