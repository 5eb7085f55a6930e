use serde_json::json;

mod common;
use common::TestApp;

#[actix_web::test]
async fn test_owner_creates_business() {
    let test_app = TestApp::new().await;
    let (token, owner_id) = test_app.register("owner@hairhub.test", "OWNER").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/businesses",
            Some(&token),
            Some(json!({
                "name": "Barbería Central",
                "category": "BARBERSHOP",
                "city": "Medellín",
                "phone": "6041234567"
            })),
        )
        .await;

    assert_eq!(status, 201);
    assert_eq!(body["owner_id"], owner_id);
    assert_eq!(body["category_label"], "Barbería");
    assert_eq!(body["active"], true);
    assert_eq!(body["total_reviews"], 0);
}

#[actix_web::test]
async fn test_client_cannot_create_business() {
    let test_app = TestApp::new().await;
    let (token, _) = test_app.register("client@hairhub.test", "CLIENT").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/businesses",
            Some(&token),
            Some(json!({ "name": "Mi Salón", "category": "HAIR_SALON" })),
        )
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_unknown_category_is_bad_request() {
    let test_app = TestApp::new().await;
    let (token, _) = test_app.register("owner@hairhub.test", "OWNER").await;

    let (status, _) = test_app
        .call(
            "POST",
            "/api/businesses",
            Some(&token),
            Some(json!({ "name": "Mi Salón", "category": "BAKERY" })),
        )
        .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_categories_have_labels() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app.call("GET", "/api/businesses/categories", None, None).await;

    assert_eq!(status, 200);
    let categories = body.as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0]["value"], "BARBERSHOP");
    assert_eq!(categories[0]["label"], "Barbería");
}

#[actix_web::test]
async fn test_search_filters_by_text_category_and_city() {
    let test_app = TestApp::new().await;
    let (token, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    test_app.create_business(&token, "Barbería Central", "Bogotá").await;
    test_app.create_business(&token, "El Buen Corte", "Cali").await;
    test_app
        .call(
            "POST",
            "/api/businesses",
            Some(&token),
            Some(json!({ "name": "Spa Relax", "category": "SPA", "city": "Cali" })),
        )
        .await;

    let (status, body) = test_app
        .call("GET", "/api/businesses/search?query=CENTRAL", None, None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["total_elements"], 1);
    assert_eq!(body["content"][0]["name"], "Barbería Central");

    let (_, body) = test_app
        .call("GET", "/api/businesses/search?city=cali", None, None)
        .await;
    assert_eq!(body["total_elements"], 2);

    let (_, body) = test_app
        .call("GET", "/api/businesses/search?city=Cali&category=SPA", None, None)
        .await;
    assert_eq!(body["total_elements"], 1);
    assert_eq!(body["content"][0]["name"], "Spa Relax");
}

#[actix_web::test]
async fn test_search_pages_results() {
    let test_app = TestApp::new().await;
    let (token, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    for i in 0..3 {
        test_app
            .create_business(&token, &format!("Salón {}", i), "Bogotá")
            .await;
    }

    let (_, body) = test_app
        .call("GET", "/api/businesses/search?page=1&size=2", None, None)
        .await;

    assert_eq!(body["total_elements"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["content"].as_array().unwrap().len(), 1);
    assert_eq!(body["last"], true);
}

#[actix_web::test]
async fn test_business_detail_includes_services_workers_and_gallery() {
    let test_app = TestApp::new().await;
    let setup = test_app.booking_setup().await;
    test_app
        .call(
            "POST",
            &format!("/api/businesses/{}/images", setup.business_id),
            Some(&setup.owner_token),
            Some(json!({ "image_url": "https://img.test/1.jpg" })),
        )
        .await;

    let (status, body) = test_app
        .call("GET", &format!("/api/businesses/{}", setup.business_id), None, None)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["name"], "Barbería Central");
    assert_eq!(body["owner_name"], "User owner");
    assert_eq!(body["services"].as_array().unwrap().len(), 1);
    assert_eq!(body["workers"].as_array().unwrap().len(), 1);
    assert_eq!(body["workers"][0]["schedules"].as_array().unwrap().len(), 1);
    assert_eq!(body["gallery"][0], "https://img.test/1.jpg");
}

#[actix_web::test]
async fn test_only_owner_updates_business() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let (other_owner, _) = test_app.register("other@hairhub.test", "OWNER").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;

    let (status, _) = test_app
        .call(
            "PUT",
            &format!("/api/businesses/{}", business_id),
            Some(&other_owner),
            Some(json!({ "name": "Robada" })),
        )
        .await;
    assert_eq!(status, 403);

    let (status, body) = test_app
        .call(
            "PUT",
            &format!("/api/businesses/{}", business_id),
            Some(&owner),
            Some(json!({ "description": "Ahora con café" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Barbería Central");
    assert_eq!(body["description"], "Ahora con café");
}

#[actix_web::test]
async fn test_delete_business_is_soft() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;

    let (status, body) = test_app
        .call("DELETE", &format!("/api/businesses/{}", business_id), Some(&owner), None)
        .await;
    assert_eq!(status, 204);
    assert!(body.is_null());

    let (status, _) = test_app
        .call("GET", &format!("/api/businesses/{}", business_id), None, None)
        .await;
    assert_eq!(status, 404);

    let (_, body) = test_app.call("GET", "/api/businesses/my", Some(&owner), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let still_stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM businesses WHERE id = ?")
        .bind(business_id)
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(still_stored, 1);
}

#[actix_web::test]
async fn test_service_catalog_crud() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;
    let service_id = test_app
        .create_service(&owner, business_id, "Corte clásico", 30, 25.0)
        .await;

    let (status, body) = test_app
        .call(
            "PUT",
            &format!("/api/businesses/{}/services/{}", business_id, service_id),
            Some(&owner),
            Some(json!({ "price": 30.0 })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["price"], 30.0);
    assert_eq!(body["duration_minutes"], 30);

    let (status, _) = test_app
        .call(
            "DELETE",
            &format!("/api/businesses/{}/services/{}", business_id, service_id),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, 204);

    let (_, body) = test_app
        .call("GET", &format!("/api/businesses/{}/services", business_id), None, None)
        .await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = test_app
        .call(
            "GET",
            &format!("/api/businesses/{}/services/{}", business_id, service_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_service_duration_is_validated() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;

    let (status, body) = test_app
        .call(
            "POST",
            &format!("/api/businesses/{}/services", business_id),
            Some(&owner),
            Some(json!({ "name": "Express", "duration_minutes": 2, "price": 5.0 })),
        )
        .await;

    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("Duration"));
}

#[actix_web::test]
async fn test_gallery_keeps_display_order() {
    let test_app = TestApp::new().await;
    let (owner, _) = test_app.register("owner@hairhub.test", "OWNER").await;
    let business_id = test_app.create_business(&owner, "Barbería Central", "Bogotá").await;
    let uri = format!("/api/businesses/{}/images", business_id);

    let (status, first) = test_app
        .call("POST", &uri, Some(&owner), Some(json!({ "image_url": "https://img.test/a.jpg" })))
        .await;
    assert_eq!(status, 201);
    let (_, second) = test_app
        .call("POST", &uri, Some(&owner), Some(json!({ "image_url": "https://img.test/b.jpg" })))
        .await;
    assert_eq!(first["display_order"], 0);
    assert_eq!(second["display_order"], 1);

    let (status, _) = test_app
        .call(
            "DELETE",
            &format!("{}/{}", uri, first["id"].as_i64().unwrap()),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, 204);

    let (_, third) = test_app
        .call("POST", &uri, Some(&owner), Some(json!({ "image_url": "https://img.test/c.jpg" })))
        .await;
    assert_eq!(third["display_order"], 2);

    let (_, images) = test_app.call("GET", &uri, None, None).await;
    let urls: Vec<&str> = images
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["image_url"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec!["https://img.test/b.jpg", "https://img.test/c.jpg"]);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app.call("GET", "/api/health", None, None).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["scheduler_running"], false);
}
