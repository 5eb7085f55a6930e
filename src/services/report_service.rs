use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::models::{
    day_name, day_of_week, AppointmentStatus, BusinessReport, ReportQuery, ReportRow,
    ServiceError, ServiceReport, StatusCount, WeekdayReport, WorkerReport,
};
use crate::repositories::{AppointmentRepository, BusinessRepository};
use crate::services::business_service::require_owned_business;

// Monday first, the way the reports page lays out the week
const WEEK_ORDER: [i64; 7] = [1, 2, 3, 4, 5, 6, 0];

pub struct ReportService {
    businesses: Arc<dyn BusinessRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl ReportService {
    pub fn new(businesses: Arc<dyn BusinessRepository>, appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self {
            businesses,
            appointments,
        }
    }

    pub async fn business_report(
        &self,
        business_id: i64,
        owner_id: i64,
        query: &ReportQuery,
    ) -> Result<BusinessReport, ServiceError> {
        require_owned_business(self.businesses.as_ref(), business_id, owner_id).await?;

        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            if start > end {
                return Err(ServiceError::ValidationError(
                    "Start date must not be after end date".to_string(),
                ));
            }
        }

        let from = query.start_date.map(|d| d.and_time(chrono::NaiveTime::MIN));
        let to = query
            .end_date
            .map(|d| (d + Duration::days(1)).and_time(chrono::NaiveTime::MIN));

        let rows = self.appointments.report_rows(business_id, from, to).await?;
        Ok(aggregate(business_id, query.start_date, query.end_date, &rows))
    }

    pub async fn export_csv(
        &self,
        business_id: i64,
        owner_id: i64,
        query: &ReportQuery,
    ) -> Result<String, ServiceError> {
        let report = self.business_report(business_id, owner_id, query).await?;
        render_csv(&report)
    }
}

/// Counts every appointment by status. Appointment totals leave out
/// cancellations; revenue only counts completed work.
pub fn aggregate(
    business_id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    rows: &[ReportRow],
) -> BusinessReport {
    let mut status_totals: BTreeMap<&'static str, i64> = BTreeMap::new();
    let mut workers: BTreeMap<i64, WorkerReport> = BTreeMap::new();
    let mut services: BTreeMap<i64, ServiceReport> = BTreeMap::new();
    let mut weekdays = [0i64; 7];
    let mut total_appointments = 0;
    let mut total_revenue = 0.0;

    for row in rows {
        *status_totals.entry(row.status.as_str()).or_default() += 1;

        if row.status == AppointmentStatus::Cancelled {
            continue;
        }
        let revenue = if row.status == AppointmentStatus::Completed {
            row.price
        } else {
            0.0
        };

        total_appointments += 1;
        total_revenue += revenue;
        weekdays[day_of_week(row.start_time.date()) as usize] += 1;

        let worker = workers.entry(row.worker_id).or_insert_with(|| WorkerReport {
            worker_id: row.worker_id,
            worker_name: row.worker_name.clone(),
            appointments: 0,
            revenue: 0.0,
        });
        worker.appointments += 1;
        worker.revenue += revenue;

        let service = services.entry(row.service_id).or_insert_with(|| ServiceReport {
            service_id: row.service_id,
            service_name: row.service_name.clone(),
            appointments: 0,
            revenue: 0.0,
        });
        service.appointments += 1;
        service.revenue += revenue;
    }

    let status_counts = AppointmentStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: status_totals.get(status.as_str()).copied().unwrap_or(0),
        })
        .collect();

    let mut workers: Vec<WorkerReport> = workers.into_values().collect();
    workers.sort_by(|a, b| {
        b.appointments
            .cmp(&a.appointments)
            .then_with(|| a.worker_name.cmp(&b.worker_name))
    });

    let mut services: Vec<ServiceReport> = services.into_values().collect();
    services.sort_by(|a, b| {
        b.appointments
            .cmp(&a.appointments)
            .then_with(|| a.service_name.cmp(&b.service_name))
    });

    let weekdays = WEEK_ORDER
        .iter()
        .map(|&day| {
            let count = weekdays[day as usize];
            WeekdayReport {
                day_of_week: day,
                day_name: day_name(day).to_string(),
                appointments: count,
                percentage: percentage(count, total_appointments),
            }
        })
        .collect();

    BusinessReport {
        business_id,
        start_date,
        end_date,
        total_appointments,
        total_revenue,
        status_counts,
        workers,
        services,
        weekdays,
    }
}

fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

pub fn render_csv(report: &BusinessReport) -> Result<String, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["section", "id", "name", "appointments", "revenue", "percentage"])?;

    for service in &report.services {
        writer.write_record([
            "service".to_string(),
            service.service_id.to_string(),
            service.service_name.clone(),
            service.appointments.to_string(),
            format!("{:.2}", service.revenue),
            String::new(),
        ])?;
    }
    for worker in &report.workers {
        writer.write_record([
            "worker".to_string(),
            worker.worker_id.to_string(),
            worker.worker_name.clone(),
            worker.appointments.to_string(),
            format!("{:.2}", worker.revenue),
            String::new(),
        ])?;
    }
    for day in &report.weekdays {
        writer.write_record([
            "weekday".to_string(),
            day.day_of_week.to_string(),
            day.day_name.clone(),
            day.appointments.to_string(),
            String::new(),
            format!("{:.1}", day.percentage),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::InternalError(format!("Failed to finish CSV export: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::InternalError(format!("CSV export is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(date: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").unwrap()
    }

    fn row(worker: i64, service: i64, price: f64, start: &str, status: AppointmentStatus) -> ReportRow {
        ReportRow {
            worker_id: worker,
            worker_name: format!("Worker {}", worker),
            service_id: service,
            service_name: format!("Service {}", service),
            price,
            start_time: at(start),
            status,
        }
    }

    fn sample() -> Vec<ReportRow> {
        use AppointmentStatus::*;
        vec![
            // 2030-01-07 is a Monday
            row(1, 10, 20.0, "2030-01-07 09:00", Completed),
            row(1, 10, 20.0, "2030-01-07 10:00", Completed),
            row(2, 11, 35.0, "2030-01-08 09:00", Confirmed),
            row(2, 11, 35.0, "2030-01-09 09:00", Cancelled),
        ]
    }

    #[test]
    fn cancellations_are_counted_but_not_reported() {
        let report = aggregate(1, None, None, &sample());
        assert_eq!(report.total_appointments, 3);
        let cancelled = report
            .status_counts
            .iter()
            .find(|s| s.status == AppointmentStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.count, 1);
    }

    #[test]
    fn revenue_only_counts_completed() {
        let report = aggregate(1, None, None, &sample());
        assert_eq!(report.total_revenue, 40.0);
        assert_eq!(report.workers[0].worker_id, 1);
        assert_eq!(report.workers[0].revenue, 40.0);
        assert_eq!(report.workers[1].appointments, 1);
        assert_eq!(report.workers[1].revenue, 0.0);
        assert_eq!(report.services[0].service_id, 10);
    }

    #[test]
    fn weekday_percentages_start_on_monday() {
        let report = aggregate(1, None, None, &sample());
        assert_eq!(report.weekdays.len(), 7);
        assert_eq!(report.weekdays[0].day_of_week, 1);
        assert_eq!(report.weekdays[0].appointments, 2);
        assert_eq!(report.weekdays[0].percentage, 66.7);
        assert_eq!(report.weekdays[1].percentage, 33.3);
        assert_eq!(report.weekdays[2].appointments, 0);
        assert_eq!(report.weekdays[6].day_of_week, 0);
    }

    #[test]
    fn empty_range_has_zero_percentages() {
        let report = aggregate(1, None, None, &[]);
        assert_eq!(report.total_appointments, 0);
        assert!(report.weekdays.iter().all(|d| d.percentage == 0.0));
        assert!(report.workers.is_empty());
    }

    #[test]
    fn csv_export_has_one_line_per_entry() {
        let report = aggregate(1, None, None, &sample());
        let csv = render_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "section,id,name,appointments,revenue,percentage");
        // 2 services + 2 workers + 7 weekdays
        assert_eq!(lines.len(), 1 + 2 + 2 + 7);
        assert!(lines.contains(&"service,10,Service 10,2,40.00,"));
    }
}
