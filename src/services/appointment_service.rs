use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    day_of_week, generate_time_slots, overlaps, Appointment, AppointmentResponse,
    AppointmentStatus, AvailabilityResponse, CreateAppointmentRequest, CreateReviewRequest,
    PageQuery, PageResponse, ReviewResponse, ServiceError, TimeSlot,
    UpdateAppointmentStatusRequest, Worker, SLOT_STEP_MINUTES,
};
use crate::repositories::{
    AppointmentRepository, BusinessRepository, NewAppointment, ReviewRepository,
    ServiceOfferingRepository, WorkerRepository,
};
use crate::services::EmailService;

const DEFAULT_SLOT_DURATION: i64 = 30;

/// How the caller relates to an appointment, strongest relation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Participant {
    Owner,
    Worker,
    Client,
}

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    workers: Arc<dyn WorkerRepository>,
    services: Arc<dyn ServiceOfferingRepository>,
    businesses: Arc<dyn BusinessRepository>,
    reviews: Arc<dyn ReviewRepository>,
    email: Arc<EmailService>,
    // Serializes the overlap check and insert per worker
    booking_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        workers: Arc<dyn WorkerRepository>,
        services: Arc<dyn ServiceOfferingRepository>,
        businesses: Arc<dyn BusinessRepository>,
        reviews: Arc<dyn ReviewRepository>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            appointments,
            workers,
            services,
            businesses,
            reviews,
            email,
            booking_locks: DashMap::new(),
        }
    }

    fn booking_lock(&self, worker_id: i64) -> Arc<Mutex<()>> {
        self.booking_locks
            .entry(worker_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops per-worker locks no booking currently holds. Returns how many went.
    pub fn prune_booking_locks(&self) -> usize {
        let before = self.booking_locks.len();
        self.booking_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.booking_locks.len()
    }

    pub fn tracked_booking_locks(&self) -> usize {
        self.booking_locks.len()
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub async fn create(
        &self,
        client: &AuthenticatedUser,
        form: &CreateAppointmentRequest,
    ) -> Result<AppointmentResponse, ServiceError> {
        let worker = self
            .workers
            .find_by_id(form.worker_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;
        if !worker.active {
            return Err(ServiceError::ValidationError(
                "Worker is not accepting appointments".to_string(),
            ));
        }

        let service = self
            .services
            .find_by_id(form.service_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))?;
        if !service.active {
            return Err(ServiceError::ValidationError(
                "Service is not available".to_string(),
            ));
        }
        if service.business_id != worker.business_id {
            return Err(ServiceError::ValidationError(
                "Service does not belong to the worker's business".to_string(),
            ));
        }

        let business_active = self
            .businesses
            .find_by_id(worker.business_id)
            .await?
            .map(|b| b.active)
            .unwrap_or(false);
        if !business_active {
            return Err(ServiceError::NotFound("Business not found".to_string()));
        }

        let start = form
            .start_time
            .with_nanosecond(0)
            .unwrap_or(form.start_time);
        if start <= Self::now() {
            return Err(ServiceError::ValidationError(
                "Appointment must be scheduled in the future".to_string(),
            ));
        }
        let end = start + Duration::minutes(service.duration_minutes);

        self.ensure_within_schedule(&worker, start, end).await?;

        let lock = self.booking_lock(worker.id);
        let _guard = lock.lock().await;

        let conflicts = self.appointments.find_blocking(worker.id, start, end).await?;
        if !conflicts.is_empty() {
            return Err(ServiceError::Conflict(
                "The selected time slot is no longer available".to_string(),
            ));
        }

        let id = self
            .appointments
            .create(NewAppointment {
                client_id: client.id,
                worker_id: worker.id,
                service_id: service.id,
                start_time: start,
                end_time: end,
                client_notes: form.client_notes.as_deref(),
            })
            .await?;

        tracing::info!(
            "Appointment {} booked by user {} with worker {} at {}",
            id,
            client.id,
            worker.id,
            start
        );
        self.detail(id).await
    }

    async fn ensure_within_schedule(
        &self,
        worker: &Worker,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let outside = || {
            ServiceError::ValidationError(
                "Worker is not available at the requested time".to_string(),
            )
        };

        if end.date() != start.date() {
            return Err(outside());
        }

        let schedule = self
            .workers
            .find_schedule_for_day(worker.id, day_of_week(start.date()))
            .await?
            .filter(|s| s.is_available)
            .ok_or_else(outside)?;

        if start.time() < schedule.start_time || end.time() > schedule.end_time {
            return Err(outside());
        }
        Ok(())
    }

    async fn detail(&self, id: i64) -> Result<AppointmentResponse, ServiceError> {
        self.appointments
            .find_detail(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))
    }

    async fn participant(
        &self,
        appointment: &Appointment,
        caller: &AuthenticatedUser,
    ) -> Result<Participant, ServiceError> {
        if let Some(worker) = self.workers.find_by_id(appointment.worker_id).await? {
            let owns_business = self
                .businesses
                .find_by_id(worker.business_id)
                .await?
                .map(|b| b.owner_id == caller.id)
                .unwrap_or(false);
            if owns_business {
                return Ok(Participant::Owner);
            }
            if worker.user_id == caller.id {
                return Ok(Participant::Worker);
            }
        }
        if appointment.client_id == caller.id {
            return Ok(Participant::Client);
        }
        Err(ServiceError::Forbidden(
            "You do not have access to this appointment".to_string(),
        ))
    }

    async fn load(&self, id: i64) -> Result<Appointment, ServiceError> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))
    }

    pub async fn get(&self, id: i64, caller: &AuthenticatedUser) -> Result<AppointmentResponse, ServiceError> {
        let appointment = self.load(id).await?;
        self.participant(&appointment, caller).await?;
        self.detail(id).await
    }

    pub async fn my_appointments(
        &self,
        caller: &AuthenticatedUser,
        paging: &PageQuery,
    ) -> Result<PageResponse<AppointmentResponse>, ServiceError> {
        let (page, size) = paging.resolve();
        let (rows, total) = self
            .appointments
            .page_for_client(caller.id, size, page * size)
            .await?;
        Ok(PageResponse::new(rows, total, page, size))
    }

    pub async fn my_upcoming(&self, caller: &AuthenticatedUser) -> Result<Vec<AppointmentResponse>, ServiceError> {
        self.appointments
            .upcoming_for_client(caller.id, Self::now())
            .await
    }

    async fn require_worker_access(
        &self,
        worker_id: i64,
        caller: &AuthenticatedUser,
    ) -> Result<Worker, ServiceError> {
        let worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;

        if worker.user_id == caller.id {
            return Ok(worker);
        }
        let owns_business = self
            .businesses
            .find_by_id(worker.business_id)
            .await?
            .map(|b| b.owner_id == caller.id)
            .unwrap_or(false);
        if owns_business {
            Ok(worker)
        } else {
            Err(ServiceError::Forbidden(
                "You cannot view this worker's appointments".to_string(),
            ))
        }
    }

    pub async fn worker_appointments(
        &self,
        worker_id: i64,
        caller: &AuthenticatedUser,
        paging: &PageQuery,
    ) -> Result<PageResponse<AppointmentResponse>, ServiceError> {
        self.require_worker_access(worker_id, caller).await?;
        let (page, size) = paging.resolve();
        let (rows, total) = self
            .appointments
            .page_for_worker(worker_id, size, page * size)
            .await?;
        Ok(PageResponse::new(rows, total, page, size))
    }

    pub async fn worker_upcoming(
        &self,
        worker_id: i64,
        caller: &AuthenticatedUser,
    ) -> Result<Vec<AppointmentResponse>, ServiceError> {
        self.require_worker_access(worker_id, caller).await?;
        self.appointments
            .upcoming_for_worker(worker_id, Self::now())
            .await
    }

    pub async fn update_status(
        &self,
        id: i64,
        caller: &AuthenticatedUser,
        form: &UpdateAppointmentStatusRequest,
    ) -> Result<AppointmentResponse, ServiceError> {
        let appointment = self.load(id).await?;
        let participant = self.participant(&appointment, caller).await?;

        if participant == Participant::Client && form.status != AppointmentStatus::Cancelled {
            return Err(ServiceError::Forbidden(
                "Clients can only cancel their appointments".to_string(),
            ));
        }
        if appointment.status.is_terminal() {
            return Err(ServiceError::ValidationError(format!(
                "Appointment is already {}",
                appointment.status.as_str()
            )));
        }
        if !appointment.status.can_transition_to(form.status) {
            return Err(ServiceError::ValidationError(format!(
                "Cannot change status from {} to {}",
                appointment.status.as_str(),
                form.status.as_str()
            )));
        }

        let reason = if form.status == AppointmentStatus::Cancelled {
            form.cancellation_reason.as_deref()
        } else {
            None
        };
        self.appointments.update_status(id, form.status, reason).await?;
        tracing::info!(
            "Appointment {} moved from {} to {} by user {}",
            id,
            appointment.status.as_str(),
            form.status.as_str(),
            caller.id
        );

        let detail = self.detail(id).await?;
        self.notify(&detail).await;
        Ok(detail)
    }

    pub async fn cancel(
        &self,
        id: i64,
        caller: &AuthenticatedUser,
        reason: Option<&str>,
    ) -> Result<AppointmentResponse, ServiceError> {
        let appointment = self.load(id).await?;
        self.participant(&appointment, caller).await?;

        if appointment.status.is_terminal() {
            return Err(ServiceError::ValidationError(format!(
                "Appointment cannot be cancelled, it is {}",
                appointment.status.as_str()
            )));
        }

        self.appointments
            .update_status(id, AppointmentStatus::Cancelled, reason)
            .await?;
        tracing::info!("Appointment {} cancelled by user {}", id, caller.id);

        let detail = self.detail(id).await?;
        self.notify(&detail).await;
        Ok(detail)
    }

    async fn notify(&self, detail: &AppointmentResponse) {
        match detail.status {
            AppointmentStatus::Confirmed => {
                self.email
                    .send_appointment_confirmation(
                        &detail.client_email,
                        &detail.client_name,
                        &detail.business_name,
                        &detail.service_name,
                        detail.start_time,
                    )
                    .await
            }
            AppointmentStatus::Cancelled => {
                self.email
                    .send_appointment_cancellation(
                        &detail.client_email,
                        &detail.client_name,
                        &detail.business_name,
                        detail.start_time,
                        detail.cancellation_reason.as_deref(),
                    )
                    .await
            }
            _ => {}
        }
    }

    /// Candidate start times for a worker on a date, each flagged with
    /// whether it can still be booked.
    pub async fn availability(
        &self,
        worker_id: i64,
        date: NaiveDate,
        duration: Option<i64>,
    ) -> Result<AvailabilityResponse, ServiceError> {
        let duration = duration.unwrap_or(DEFAULT_SLOT_DURATION);
        if !(5..=480).contains(&duration) {
            return Err(ServiceError::ValidationError(
                "Duration must be between 5 and 480 minutes".to_string(),
            ));
        }

        let worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .filter(|w| w.active)
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;

        let mut response = AvailabilityResponse {
            worker_id,
            date,
            duration_minutes: duration,
            slots: Vec::new(),
        };

        let Some(schedule) = self
            .workers
            .find_schedule_for_day(worker.id, day_of_week(date))
            .await?
            .filter(|s| s.is_available)
        else {
            return Ok(response);
        };

        let day_start = date.and_time(chrono::NaiveTime::MIN);
        let booked = self
            .appointments
            .find_blocking(worker.id, day_start, day_start + Duration::days(1))
            .await?;
        let now = Self::now();

        response.slots = generate_time_slots(
            schedule.start_time,
            schedule.end_time,
            duration,
            SLOT_STEP_MINUTES,
        )
        .into_iter()
        .map(|time| {
            let start = date.and_time(time);
            let end = start + Duration::minutes(duration);
            let taken = booked
                .iter()
                .any(|a| overlaps(start, end, a.start_time, a.end_time));
            TimeSlot {
                time: time.format("%H:%M").to_string(),
                available: start > now && !taken,
            }
        })
        .collect();

        Ok(response)
    }

    pub async fn create_review(
        &self,
        appointment_id: i64,
        caller: &AuthenticatedUser,
        form: &CreateReviewRequest,
    ) -> Result<ReviewResponse, ServiceError> {
        let appointment = self.load(appointment_id).await?;
        if appointment.client_id != caller.id {
            return Err(ServiceError::Forbidden(
                "Only the client of the appointment can review it".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Completed {
            return Err(ServiceError::ValidationError(
                "Only completed appointments can be reviewed".to_string(),
            ));
        }
        if self
            .reviews
            .find_by_appointment(appointment_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "This appointment has already been reviewed".to_string(),
            ));
        }

        let review_id = self
            .reviews
            .create(appointment_id, form.rating, form.comment.as_deref())
            .await?;

        let worker = self
            .workers
            .find_by_id(appointment.worker_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;
        let (average, total) = self.reviews.rating_stats(worker.business_id).await?;
        self.businesses
            .set_rating(worker.business_id, average.map(round_rating), total)
            .await?;

        self.reviews
            .find_view(review_id)
            .await?
            .ok_or_else(|| ServiceError::InternalError("Created review not found".to_string()))
    }
}

/// One decimal, halves rounded up.
pub fn round_rating(average: f64) -> f64 {
    (average * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_is_rounded_to_one_decimal() {
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(4.0), 4.0);
        assert_eq!(round_rating(11.0 / 3.0), 3.7);
    }
}
