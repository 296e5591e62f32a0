use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use drivelog::config::EnvironmentConfig;
use drivelog::repositories::Repositories;
use drivelog::services::blob_storage::LocalBlobStore;
use drivelog::{create_router, AppState};

struct TestApp {
    router: Router,
    _dir: TempDir,
}

struct TestResponse {
    status: StatusCode,
    body: Value,
}

async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = EnvironmentConfig {
        upload_dir: dir.path().to_path_buf(),
        bcrypt_cost: 4,
        rate_limit_requests: 1000,
        ..Default::default()
    };
    let blobs = LocalBlobStore::open(&config.upload_dir).await.unwrap();
    let state = AppState::new(Repositories::in_memory(), config, blobs);
    TestApp {
        router: create_router(state),
        _dir: dir,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn sign_up(&self, email: &str, name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/sign-up",
                None,
                Some(json!({ "email": email, "password": "secret-password", "name": name })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Admin con empresa y un vehículo privado
    async fn admin_with_vehicle(&self) -> (String, String) {
        let token = self.sign_up("boss@example.com", "Boss").await;
        let response = self
            .request(Method::POST, "/api/companies", Some(&token), Some(json!({ "name": "Muster GmbH" })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let response = self
            .request(
                Method::POST,
                "/api/vehicles",
                Some(&token),
                Some(json!({
                    "brand": "VW",
                    "model": "Caddy",
                    "license_plate": "B-DL 100",
                    "fuel_type": "Diesel",
                    "year": 2021,
                    "mileage": 12000
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        let vehicle_id = response.body["data"]["id"].as_str().unwrap().to_string();
        (token, vehicle_id)
    }

    async fn invite(&self, token: &str, email: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/drivers/invite",
            Some(token),
            Some(json!({ "email": email, "name": "Dora" })),
        )
        .await
    }
}

fn trip_body(vehicle_id: &str, km_start: i64, km_end: i64) -> Value {
    json!({
        "vehicle_id": vehicle_id,
        "date": "2025-06-02",
        "time_start": "07:30",
        "location_start": "Berlin",
        "location_end": "Potsdam",
        "km_start": km_start,
        "km_end": km_end,
        "purpose": "Kundenbesuch"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "drivelog");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let response = app.request(Method::GET, "/api/users/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Not authenticated");

    let response = app.request(Method::GET, "/api/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let app = create_test_app().await;
    app.sign_up("anna@example.com", "Anna").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "anna@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_invite_with_existing_email_fails() {
    let app = create_test_app().await;
    let (admin, _) = app.admin_with_vehicle().await;

    assert_eq!(app.invite(&admin, "dora@example.com").await.status, StatusCode::CREATED);
    assert_eq!(app.invite(&admin, "dora@example.com").await.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sign_up_claims_invitation() {
    let app = create_test_app().await;
    let (admin, _) = app.admin_with_vehicle().await;
    let invited = app.invite(&admin, "dora@example.com").await;
    let profile_id = invited.body["data"]["id"].clone();

    let driver = app.sign_up("dora@example.com", "Dora").await;
    let me = app.request(Method::GET, "/api/users/me", Some(&driver), None).await;

    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["profile"]["id"], profile_id);
    assert_eq!(me.body["profile"]["role"], "driver");
}

#[tokio::test]
async fn test_remove_driver_removes_assignments() {
    let app = create_test_app().await;
    let (admin, vehicle_id) = app.admin_with_vehicle().await;
    let invited = app.invite(&admin, "dora@example.com").await;
    let profile_id = invited.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/vehicles/{}/assignments", vehicle_id),
            Some(&admin),
            Some(json!({ "profile_id": profile_id })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request(Method::DELETE, &format!("/api/drivers/{}", profile_id), Some(&admin), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/vehicles/{}/assignments/{}", vehicle_id, profile_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let drivers = app.request(Method::GET, "/api/drivers", Some(&admin), None).await;
    assert_eq!(drivers.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_driver_cannot_manage_company() {
    let app = create_test_app().await;
    let (admin, vehicle_id) = app.admin_with_vehicle().await;
    app.invite(&admin, "dora@example.com").await;
    let driver = app.sign_up("dora@example.com", "Dora").await;

    let response = app.request(Method::GET, "/api/drivers", Some(&driver), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Not authorized");

    let response = app.request(Method::GET, "/api/vehicles", Some(&driver), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(Method::DELETE, &format!("/api/vehicles/{}", vehicle_id), Some(&driver), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_driver_cannot_log_trip_on_unassigned_private_vehicle() {
    let app = create_test_app().await;
    let (admin, vehicle_id) = app.admin_with_vehicle().await;
    app.invite(&admin, "dora@example.com").await;
    let driver = app.sign_up("dora@example.com", "Dora").await;

    let response = app
        .request(Method::POST, "/api/trips", Some(&driver), Some(trip_body(&vehicle_id, 0, 25)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/vehicles/{}", vehicle_id),
            Some(&admin),
            Some(json!({ "is_public": true })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(Method::POST, "/api/trips", Some(&driver), Some(trip_body(&vehicle_id, 0, 25)))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let mine = app.request(Method::GET, "/api/trips/mine", Some(&driver), None).await;
    assert_eq!(mine.body["total_km"], 25);
    assert_eq!(mine.body["entries"][0]["vehicle"]["license_plate"], "B-DL 100");
}

#[tokio::test]
async fn test_trip_update_with_invalid_odometer_is_rejected() {
    let app = create_test_app().await;
    let (admin, vehicle_id) = app.admin_with_vehicle().await;

    let created = app
        .request(Method::POST, "/api/trips", Some(&admin), Some(trip_body(&vehicle_id, 1000, 1050)))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let trip_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/trips/{}", trip_id),
            Some(&admin),
            Some(json!({ "km_end": 1000 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let trip = app
        .request(Method::GET, &format!("/api/trips/{}", trip_id), Some(&admin), None)
        .await;
    assert_eq!(trip.body["km_end"], 1050);
    assert_eq!(trip.body["distance_km"], 50);
}

#[tokio::test]
async fn test_trip_delete_removes_attachments() {
    let app = create_test_app().await;
    let (admin, vehicle_id) = app.admin_with_vehicle().await;
    let created = app
        .request(Method::POST, "/api/trips", Some(&admin), Some(trip_body(&vehicle_id, 0, 10)))
        .await;
    let trip_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let url = app.request(Method::POST, "/api/uploads/url", Some(&admin), None).await;
    assert_eq!(url.status, StatusCode::OK);
    let upload_url = url.body["upload_url"].as_str().unwrap().to_string();

    let uploaded = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri(&upload_url)
                .header(header::CONTENT_TYPE, "application/pdf")
                .body(Body::from("%PDF-1.4 receipt"))
                .unwrap(),
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.body);
    let storage_id = uploaded.body["storage_id"].clone();

    let attached = app
        .request(
            Method::POST,
            &format!("/api/trips/{}/attachments", trip_id),
            Some(&admin),
            Some(json!({ "storage_id": storage_id, "file_name": "tankbeleg.pdf" })),
        )
        .await;
    assert_eq!(attached.status, StatusCode::CREATED, "{}", attached.body);
    assert_eq!(attached.body["data"]["kind"], "pdf");
    let attachment_id = attached.body["data"]["id"].as_str().unwrap().to_string();

    let content_uri = format!("/api/attachments/{}/content", attachment_id);
    let content = app.request(Method::GET, &content_uri, Some(&admin), None).await;
    assert_eq!(content.status, StatusCode::OK);

    let deleted = app
        .request(Method::DELETE, &format!("/api/trips/{}", trip_id), Some(&admin), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let content = app.request(Method::GET, &content_uri, Some(&admin), None).await;
    assert_eq!(content.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_content_type() {
    let app = create_test_app().await;
    let token = app.sign_up("anna@example.com", "Anna").await;
    let url = app.request(Method::POST, "/api/uploads/url", Some(&token), None).await;
    let upload_url = url.body["upload_url"].as_str().unwrap().to_string();

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri(&upload_url)
                .header(header::CONTENT_TYPE, "text/html")
                .body(Body::from("<html></html>"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_is_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let config = EnvironmentConfig {
        upload_dir: dir.path().to_path_buf(),
        bcrypt_cost: 4,
        rate_limit_requests: 2,
        ..Default::default()
    };
    let blobs = LocalBlobStore::open(&config.upload_dir).await.unwrap();
    let app = TestApp {
        router: create_router(AppState::new(Repositories::in_memory(), config, blobs)),
        _dir: dir,
    };

    let body = || Some(json!({ "email": "nobody@example.com", "password": "whatever" }));
    assert_eq!(app.request(Method::POST, "/api/auth/sign-in", None, body()).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.request(Method::POST, "/api/auth/sign-in", None, body()).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.request(Method::POST, "/api/auth/sign-in", None, body()).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}
