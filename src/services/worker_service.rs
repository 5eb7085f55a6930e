use std::collections::HashSet;
use std::sync::Arc;

use validator::Validate;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AddWorkerRequest, Role, ScheduleEntryRequest, ServiceError, UpdateWorkerRequest, Worker,
    WorkerResponse,
};
use crate::repositories::{BusinessRepository, UserRepository, WorkerRepository};
use crate::services::auth_service::normalize_email;
use crate::services::business_service::{require_active_business, require_owned_business};

pub struct WorkerService {
    businesses: Arc<dyn BusinessRepository>,
    workers: Arc<dyn WorkerRepository>,
    users: Arc<dyn UserRepository>,
}

impl WorkerService {
    pub fn new(
        businesses: Arc<dyn BusinessRepository>,
        workers: Arc<dyn WorkerRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            businesses,
            workers,
            users,
        }
    }

    async fn find_worker(&self, business_id: i64, worker_id: i64) -> Result<Worker, ServiceError> {
        self.workers
            .find_by_id(worker_id)
            .await?
            .filter(|w| w.business_id == business_id)
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))
    }

    async fn view(&self, worker_id: i64) -> Result<WorkerResponse, ServiceError> {
        let row = self
            .workers
            .find_profile(worker_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;
        let schedules = self.workers.list_schedules(worker_id).await?;
        Ok(WorkerResponse::new(row, schedules))
    }

    pub async fn list(&self, business_id: i64) -> Result<Vec<WorkerResponse>, ServiceError> {
        require_active_business(self.businesses.as_ref(), business_id).await?;

        let mut workers = Vec::new();
        for row in self.workers.list_active_profiles(business_id).await? {
            let schedules = self.workers.list_schedules(row.id).await?;
            workers.push(WorkerResponse::new(row, schedules));
        }
        Ok(workers)
    }

    pub async fn get(&self, business_id: i64, worker_id: i64) -> Result<WorkerResponse, ServiceError> {
        let worker = self.find_worker(business_id, worker_id).await?;
        if !worker.active {
            return Err(ServiceError::NotFound("Worker not found".to_string()));
        }
        self.view(worker.id).await
    }

    pub async fn my_workers(&self, user_id: i64) -> Result<Vec<WorkerResponse>, ServiceError> {
        let mut workers = Vec::new();
        for row in self.workers.list_profiles_for_user(user_id).await? {
            let schedules = self.workers.list_schedules(row.id).await?;
            workers.push(WorkerResponse::new(row, schedules));
        }
        Ok(workers)
    }

    /// Links an existing account to the business. Clients are promoted to
    /// the worker role; a previously removed worker is reactivated.
    pub async fn add(
        &self,
        business_id: i64,
        owner_id: i64,
        form: &AddWorkerRequest,
    ) -> Result<WorkerResponse, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;

        let user = self
            .users
            .find_by_email(&normalize_email(&form.email))
            .await?
            .ok_or_else(|| ServiceError::NotFound("No user registered with that email".to_string()))?;

        let worker_id = match self
            .workers
            .find_by_user_and_business(user.id, business_id)
            .await?
        {
            Some(existing) if existing.active => {
                return Err(ServiceError::Conflict(
                    "User is already a worker of this business".to_string(),
                ));
            }
            Some(existing) => {
                self.workers
                    .update(existing.id, form.position.as_deref(), Some(true))
                    .await?;
                existing.id
            }
            None => {
                self.workers
                    .create(user.id, business_id, form.position.as_deref())
                    .await?
            }
        };

        if user.role == Role::Client {
            self.users.update_role(user.id, Role::Worker).await?;
        }

        tracing::info!("User {} added as worker {} of business {}", user.id, worker_id, business_id);
        self.view(worker_id).await
    }

    pub async fn update(
        &self,
        business_id: i64,
        worker_id: i64,
        owner_id: i64,
        changes: &UpdateWorkerRequest,
    ) -> Result<WorkerResponse, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.find_worker(business_id, worker_id).await?;

        self.workers
            .update(worker_id, changes.position.as_deref(), changes.active)
            .await?;
        self.view(worker_id).await
    }

    pub async fn remove(&self, business_id: i64, worker_id: i64, owner_id: i64) -> Result<(), ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;
        self.find_worker(business_id, worker_id).await?;
        self.workers.update(worker_id, None, Some(false)).await
    }

    /// Replaces the weekly schedule. Allowed for the business owner and for
    /// the worker themself.
    pub async fn update_schedule(
        &self,
        business_id: i64,
        worker_id: i64,
        caller: &AuthenticatedUser,
        entries: &[ScheduleEntryRequest],
    ) -> Result<WorkerResponse, ServiceError> {
        let business = require_active_business(self.businesses.as_ref(), business_id).await?;
        let worker = self.find_worker(business_id, worker_id).await?;

        if business.owner_id != caller.id && worker.user_id != caller.id {
            return Err(ServiceError::Forbidden(
                "You cannot change this worker's schedule".to_string(),
            ));
        }

        validate_schedule(entries)?;
        self.workers.replace_schedules(worker_id, entries).await?;

        tracing::info!("Schedule of worker {} replaced with {} day(s)", worker_id, entries.len());
        self.view(worker_id).await
    }
}

pub fn validate_schedule(entries: &[ScheduleEntryRequest]) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();
    for entry in entries {
        entry.validate()?;
        if entry.end_time <= entry.start_time {
            return Err(ServiceError::ValidationError(
                "End time must be after start time".to_string(),
            ));
        }
        if !seen.insert(entry.day_of_week) {
            return Err(ServiceError::ValidationError(format!(
                "Day {} appears more than once",
                entry.day_of_week
            )));
        }
    }
    Ok(())
}
