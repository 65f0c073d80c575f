mod support;

use std::sync::Arc;
use std::time::Duration;

use apartments::infra::http::{
    self, ApiRateLimiter, ApiState, HttpOptions, RouterState, ServiceInfo,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use support::{Harness, harness};

const FRONTEND_ORIGIN: &str = "http://localhost:3000";

fn router_with(h: &Harness, max_requests: u32, options: HttpOptions) -> Router {
    http::build_router(
        RouterState {
            api: ApiState {
                apartments: h.service.clone(),
                rate_limiter: Arc::new(ApiRateLimiter::new(
                    Duration::from_secs(900),
                    max_requests,
                )),
            },
            health: h.repo.clone(),
            info: ServiceInfo::new("test"),
        },
        &options,
    )
}

fn default_options() -> HttpOptions {
    HttpOptions {
        cors_origins: vec![FRONTEND_ORIGIN.to_string()],
        ..HttpOptions::default()
    }
}

fn router_with_limit(h: &Harness, max_requests: u32) -> Router {
    router_with(h, max_requests, default_options())
}

fn router(h: &Harness) -> Router {
    router_with_limit(h, 1_000)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn create_body(unit_number: &str, location: &str) -> Value {
    json!({
        "unitName": "Sky Penthouse Apartment",
        "unitNumber": unit_number,
        "project": "Marina Heights",
        "price": 2500000,
        "bedrooms": 4,
        "bathrooms": 3,
        "areaSqft": 3500,
        "location": location,
        "amenities": ["Pool", "Gym"],
        "images": ["https://example.com/a.jpg"]
    })
}

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let h = harness();
    let app = router(&h);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/apartments",
            create_body("AP-001", "Dubai Marina"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Apartment created successfully");
    assert_eq!(body["data"]["isAvailable"], true);
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = send(
        &app,
        empty_request(Method::GET, &format!("/api/v1/apartments/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unitNumber"], "AP-001");
    assert_eq!(body["data"]["amenities"], json!(["Pool", "Gym"]));
    let data = body["data"].as_object().expect("apartment object");
    assert!(data.contains_key("description"));
    assert_eq!(data["description"], Value::Null);
}

#[tokio::test]
async fn search_returns_page_envelope() {
    let h = harness();
    let app = router(&h);
    for unit in ["AP-001", "AP-002", "AP-003"] {
        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/v1/apartments", create_body(unit, "Downtown")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/apartments/search",
            json!({"limit": 2, "sortBy": "createdAt", "sortOrder": "asc"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["unitNumber"], "AP-001");
    assert_eq!(
        body["pagination"],
        json!({"page": 1, "limit": 2, "total": 3, "totalPages": 2, "hasNext": true, "hasPrev": false})
    );
}

#[tokio::test]
async fn invalid_search_is_rejected_with_envelope() {
    let h = harness();
    let app = router(&h);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/apartments/search",
            json!({"minPrice": 500, "maxPrice": 100}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/apartments/search",
            json!({"sortBy": "views"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn invalid_create_body_is_rejected() {
    let h = harness();
    let app = router(&h);
    let mut body = create_body("AP-001", "Downtown");
    body["price"] = json!(0);

    let (status, response) =
        send(&app, json_request(Method::POST, "/api/v1/apartments", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    assert!(
        response["error"]["hint"]
            .as_str()
            .is_some_and(|hint| hint.contains("price"))
    );
    assert_eq!(h.repo.len(), 0);
}

#[tokio::test]
async fn duplicate_unit_returns_conflict() {
    let h = harness();
    let app = router(&h);
    let request = || json_request(Method::POST, "/api/v1/apartments", create_body("AP-001", "Downtown"));

    let (status, _) = send(&app, request()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, request()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn missing_apartment_is_not_found() {
    let h = harness();
    let app = router(&h);
    let id = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app,
        empty_request(Method::GET, &format!("/api/v1/apartments/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/v1/apartments/{id}"),
            json!({"price": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/v1/apartments/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let h = harness();
    let app = router(&h);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/v1/apartments/not-a-uuid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_and_delete_flow() {
    let h = harness();
    let app = router(&h);
    let (_, created) = send(
        &app,
        json_request(Method::POST, "/api/v1/apartments", create_body("AP-001", "Downtown")),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    let uri = format!("/api/v1/apartments/{id}");

    let (status, body) = send(&app, json_request(Method::PUT, &uri, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, json!({"isAvailable": false, "bedrooms": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isAvailable"], false);
    assert_eq!(body["data"]["bedrooms"], 5);
    assert_eq!(body["message"], "Apartment updated successfully");

    let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Apartment deleted successfully"})
    );

    let (status, _) = send(&app, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn locations_are_sorted() {
    let h = harness();
    let app = router(&h);
    for (unit, location) in [("A-1", "Palm Jumeirah"), ("A-2", "Business Bay"), ("A-3", "Palm Jumeirah")] {
        send(
            &app,
            json_request(Method::POST, "/api/v1/apartments", create_body(unit, location)),
        )
        .await;
    }

    let (status, body) = send(&app, empty_request(Method::GET, "/api/v1/apartments/locations")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["Business Bay", "Palm Jumeirah"]));
}

#[tokio::test]
async fn quick_search_matches_text_columns() {
    let h = harness();
    let app = router(&h);
    send(
        &app,
        json_request(Method::POST, "/api/v1/apartments", create_body("AP-001", "Dubai Marina")),
    )
    .await;

    let (status, body) = send(
        &app,
        empty_request(Method::GET, "/api/v1/apartments/quick-search?q=marina&limit=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(&app, empty_request(Method::GET, "/api/v1/apartments/quick-search")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn rate_limit_answers_429_with_retry_after() {
    let h = harness();
    let app = router_with_limit(&h, 2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, "/api/v1/apartments/locations"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("ratelimit-remaining"));
    }

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/v1/apartments/locations"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .expect("retry-after header");
    assert!(retry_after > 0 && retry_after <= 900);

    let (status, _) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reflects_store_state() {
    let h = harness();
    let app = router(&h);

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "test");
    assert!(body["uptime"].as_f64().is_some_and(|uptime| uptime >= 0.0));
    let timestamp = body["timestamp"].as_str().expect("timestamp");
    assert!(
        time::OffsetDateTime::parse(timestamp, &time::format_description::well_known::Rfc3339)
            .is_ok()
    );

    h.repo.set_healthy(false);
    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "UNAVAILABLE");
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/apartments/search")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let h = harness();
    let app = router(&h);

    let response = app
        .clone()
        .oneshot(preflight(FRONTEND_ORIGIN))
        .await
        .expect("response");

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(FRONTEND_ORIGIN)
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|value| value.to_str().ok())
        .expect("allow-methods");
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn cors_preflight_ignores_unknown_origin() {
    let h = harness();
    let app = router(&h);

    let response = app
        .clone()
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");

    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn cross_origin_reads_carry_allow_origin() {
    let h = harness();
    let app = router(&h);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/apartments/locations")
                .header(header::ORIGIN, FRONTEND_ORIGIN)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(FRONTEND_ORIGIN)
    );
}

#[tokio::test]
async fn oversized_body_is_rejected_with_413() {
    let h = harness();
    let app = router_with(
        &h,
        1_000,
        HttpOptions {
            body_limit_bytes: 64,
            ..default_options()
        },
    );
    let mut body = create_body("AP-001", "Downtown");
    body["description"] = json!("x".repeat(512));

    let (status, response) =
        send(&app, json_request(Method::POST, "/api/v1/apartments", body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(h.repo.len(), 0);
}

#[tokio::test]
async fn large_responses_are_gzipped_on_request() {
    let h = harness();
    let app = router(&h);
    for unit in ["AP-001", "AP-002", "AP-003"] {
        send(
            &app,
            json_request(Method::POST, "/api/v1/apartments", create_body(unit, "Downtown")),
        )
        .await;
    }

    let mut request = json_request(Method::POST, "/api/v1/apartments/search", json!({}));
    request
        .headers_mut()
        .insert(header::ACCEPT_ENCODING, "gzip".parse().expect("header value"));
    let response = app.clone().oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok()),
        Some("gzip")
    );
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let h = harness();
    let app = router(&h);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v2/nothing")
                .header("x-request-id", "trace-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("trace-123")
    );
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
