use actix_web::test;
use serde_json::json;

mod common;
use common::{bearer, BookingSetup, TestApp};

async fn complete(test_app: &TestApp, setup: &BookingSetup, id: i64) {
    for next in ["CONFIRMED", "COMPLETED"] {
        let (status, _) = test_app
            .call(
                "PATCH",
                &format!("/api/appointments/{}", id),
                Some(&setup.owner_token),
                Some(json!({ "status": next })),
            )
            .await;
        assert_eq!(status, 200);
    }
}

#[actix_web::test]
async fn test_report_totals() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;

    let (_, first) = test_app.book(&setup.client_token, &setup, "10:00:00").await;
    test_app.book(&setup.client_token, &setup, "11:00:00").await;
    let (_, cancelled) = test_app.book(&setup.client_token, &setup, "12:00:00").await;
    complete(&test_app, &setup, first["id"].as_i64().unwrap()).await;
    test_app
        .call(
            "POST",
            &format!("/api/appointments/{}/cancel", cancelled["id"]),
            Some(&setup.client_token),
            None,
        )
        .await;

    let (status, report) = test_app
        .call(
            "GET",
            &format!("/api/businesses/{}/reports", setup.business_id),
            Some(&setup.owner_token),
            None,
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(report["total_appointments"], 2);
    assert_eq!(report["total_revenue"], 25.0);

    let count_of = |status: &str| {
        report["status_counts"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["status"] == status)
            .map(|c| c["count"].as_i64().unwrap())
            .unwrap()
    };
    assert_eq!(count_of("COMPLETED"), 1);
    assert_eq!(count_of("PENDING"), 1);
    assert_eq!(count_of("CANCELLED"), 1);
    assert_eq!(count_of("NO_SHOW"), 0);

    assert_eq!(report["services"][0]["service_id"], setup.service_id);
    assert_eq!(report["services"][0]["appointments"], 2);
    assert_eq!(report["workers"][0]["worker_id"], setup.worker_id);
    assert_eq!(report["workers"][0]["revenue"], 25.0);

    let busiest: Vec<_> = report["weekdays"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["appointments"].as_i64().unwrap() > 0)
        .collect();
    assert_eq!(busiest.len(), 1);
    assert_eq!(busiest[0]["percentage"], 100.0);
}

#[actix_web::test]
async fn test_report_date_range() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    test_app.book(&setup.client_token, &setup, "10:00:00").await;
    let base = format!("/api/businesses/{}/reports", setup.business_id);

    let (_, report) = test_app
        .call(
            "GET",
            &format!("{}?start_date={}&end_date={}", base, setup.date, setup.date),
            Some(&setup.owner_token),
            None,
        )
        .await;
    assert_eq!(report["total_appointments"], 1);

    let before = setup.date - chrono::Duration::days(1);
    let (_, report) = test_app
        .call(
            "GET",
            &format!("{}?end_date={}", base, before),
            Some(&setup.owner_token),
            None,
        )
        .await;
    assert_eq!(report["total_appointments"], 0);

    let (status, _) = test_app
        .call(
            "GET",
            &format!("{}?start_date={}&end_date={}", base, setup.date, before),
            Some(&setup.owner_token),
            None,
        )
        .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_report_is_owner_only() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    let (other_owner, _) = test_app.register("rival@hairhub.test", "OWNER").await;
    let uri = format!("/api/businesses/{}/reports", setup.business_id);

    let (status, _) = test_app.call("GET", &uri, Some(&setup.worker_token), None).await;
    assert_eq!(status, 403);

    let (status, _) = test_app.call("GET", &uri, Some(&other_owner), None).await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_export_report_as_csv() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    let (_, booked) = test_app.book(&setup.client_token, &setup, "10:00:00").await;
    complete(&test_app, &setup, booked["id"].as_i64().unwrap()).await;

    let app = test::init_service(test_app.create_app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/businesses/{}/reports/export", setup.business_id))
        .insert_header(bearer(&setup.owner_token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    assert!(resp.headers().get("content-disposition").is_some());

    let body = test::read_body(resp).await;
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("section,id,name,appointments,revenue,percentage"));
    assert!(csv.contains(&format!("service,{},Corte clásico,1,25.00,", setup.service_id)));
    assert!(csv.contains(&format!("worker,{},User worker,1,25.00,", setup.worker_id)));
}
