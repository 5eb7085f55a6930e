use serde_json::json;

mod common;
use common::{TestApp, PASSWORD};

#[actix_web::test]
async fn test_adding_worker_promotes_client() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let (_, user_id) = test_app.register("carlos@hairhub.test", "CLIENT").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;

    let (status, body) = test_app
        .call(
            "POST",
            &format!("/api/businesses/{}/workers", business_id),
            Some(&owner),
            Some(json!({ "email": "CARLOS@hairhub.test", "position": "Barbero senior" })),
        )
        .await;

    assert_eq!(status, 201);
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["business_name"], "Barbería Central");
    assert_eq!(body["position"], "Barbero senior");
    assert!(body["schedules"].as_array().unwrap().is_empty());

    let token = test_app.login("carlos@hairhub.test", PASSWORD).await;
    let (status, body) = test_app.call("GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "WORKER");
}

#[actix_web::test]
async fn test_add_worker_errors() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    test_app.register("carlos@hairhub.test", "CLIENT").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;
    let uri = format!("/api/businesses/{}/workers", business_id);

    test_app.add_worker(&owner, business_id, "carlos@hairhub.test").await;

    let (status, _) = test_app
        .call("POST", &uri, Some(&owner), Some(json!({ "email": "carlos@hairhub.test" })))
        .await;
    assert_eq!(status, 409);

    let (status, _) = test_app
        .call("POST", &uri, Some(&owner), Some(json!({ "email": "ghost@hairhub.test" })))
        .await;
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_removed_worker_can_be_added_again() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    test_app.register("carlos@hairhub.test", "CLIENT").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;
    let worker_id = test_app.add_worker(&owner, business_id, "carlos@hairhub.test").await;

    let (status, _) = test_app
        .call(
            "DELETE",
            &format!("/api/businesses/{}/workers/{}", business_id, worker_id),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, 204);

    let (_, workers) = test_app
        .call("GET", &format!("/api/businesses/{}/workers", business_id), None, None)
        .await;
    assert!(workers.as_array().unwrap().is_empty());

    let again = test_app.add_worker(&owner, business_id, "carlos@hairhub.test").await;
    assert_eq!(again, worker_id);
}

#[actix_web::test]
async fn test_schedule_is_replaced() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    let uri = format!(
        "/api/businesses/{}/workers/{}/schedule",
        setup.business_id, setup.worker_id
    );

    let (status, body) = test_app
        .call(
            "PUT",
            &uri,
            Some(&setup.owner_token),
            Some(json!([
                { "day_of_week": 1, "start_time": "08:00:00", "end_time": "12:00:00", "is_available": true },
                { "day_of_week": 6, "start_time": "10:00:00", "end_time": "14:00:00", "is_available": true }
            ])),
        )
        .await;

    assert_eq!(status, 200);
    let schedules = body["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0]["day_of_week"], 1);
    assert_eq!(schedules[0]["start_time"], "08:00:00");
    assert_eq!(schedules[1]["day_of_week"], 6);
}

#[actix_web::test]
async fn test_schedule_validation() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    let uri = format!(
        "/api/businesses/{}/workers/{}/schedule",
        setup.business_id, setup.worker_id
    );

    let (status, _) = test_app
        .set_schedule(&setup.owner_token, setup.business_id, setup.worker_id, 2, "18:00:00", "09:00:00")
        .await;
    assert_eq!(status, 400);

    let (status, _) = test_app
        .call(
            "PUT",
            &uri,
            Some(&setup.owner_token),
            Some(json!([
                { "day_of_week": 3, "start_time": "08:00:00", "end_time": "12:00:00" },
                { "day_of_week": 3, "start_time": "14:00:00", "end_time": "18:00:00" }
            ])),
        )
        .await;
    assert_eq!(status, 400);

    // The earlier schedule survives a rejected update
    let (_, worker) = test_app
        .call(
            "GET",
            &format!("/api/businesses/{}/workers/{}", setup.business_id, setup.worker_id),
            None,
            None,
        )
        .await;
    assert_eq!(worker["schedules"].as_array().unwrap().len(), 1);
    assert_eq!(worker["schedules"][0]["start_time"], "09:00:00");
}

#[actix_web::test]
async fn test_worker_edits_own_schedule_but_not_strangers() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;

    let (status, _) = test_app
        .set_schedule(&setup.worker_token, setup.business_id, setup.worker_id, 2, "10:00:00", "16:00:00")
        .await;
    assert_eq!(status, 200);

    let (status, _) = test_app
        .set_schedule(&setup.client_token, setup.business_id, setup.worker_id, 2, "10:00:00", "16:00:00")
        .await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_my_worker_records_requires_worker_role() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;

    let (status, body) = test_app
        .call("GET", "/api/workers/me", Some(&setup.worker_token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["business_id"], setup.business_id);

    let (status, _) = test_app
        .call("GET", "/api/workers/me", Some(&setup.client_token), None)
        .await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_only_owner_manages_workers() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;

    let (status, _) = test_app
        .call(
            "PUT",
            &format!("/api/businesses/{}/workers/{}", setup.business_id, setup.worker_id),
            Some(&setup.worker_token),
            Some(json!({ "position": "Jefe" })),
        )
        .await;
    assert_eq!(status, 403);

    let (status, body) = test_app
        .call(
            "PUT",
            &format!("/api/businesses/{}/workers/{}", setup.business_id, setup.worker_id),
            Some(&setup.owner_token),
            Some(json!({ "position": "Colorista" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["position"], "Colorista");
}
