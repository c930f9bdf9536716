use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use queue_cell::models::{AddToQueueRequest, QueueError, QueueStatus};
use queue_cell::router::queue_routes;
use queue_cell::services::queue::WalkInQueueService;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockClinicResponses, TestConfig, TestUser};

fn test_app(config: AppConfig) -> Router {
    queue_routes(Arc::new(config))
}

fn front_desk_token(config: &AppConfig) -> String {
    let user = TestUser::front_desk("reception");
    JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24))
}

#[tokio::test]
async fn add_to_queue_goes_through_the_enqueue_function() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();

    // Number allocation happens inside the database function, so the
    // client must call it rather than insert directly.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/enqueue_patient"))
        .and(body_partial_json(json!({
            "p_patient_name": "Sam Lee",
            "p_is_priority": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                4,
                "Sam Lee",
                false,
                "waiting",
            ),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = WalkInQueueService::new(&config);
    let entry = service
        .add_to_queue(
            AddToQueueRequest {
                patient_name: "Sam Lee".to_string(),
                patient_phone: None,
                is_priority: false,
            },
            "test-token",
        )
        .await
        .unwrap();

    assert_eq!(entry.queue_number, 4);
    assert_eq!(entry.status, QueueStatus::Waiting);
}

#[tokio::test]
async fn add_to_queue_requires_a_patient_name() {
    let config = TestConfig::default().to_app_config();
    let service = WalkInQueueService::new(&config);

    let err = service
        .add_to_queue(
            AddToQueueRequest {
                patient_name: "   ".to_string(),
                patient_phone: None,
                is_priority: false,
            },
            "test-token",
        )
        .await
        .unwrap_err();

    assert_matches!(err, QueueError::ValidationError(_));
}

#[tokio::test]
async fn queue_listing_puts_priority_patients_first() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let token = front_desk_token(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/queue"))
        .and(query_param("order", "is_priority.desc,queue_number.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                3,
                "Priority Patient",
                true,
                "waiting",
            ),
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                1,
                "Regular Patient",
                false,
                "waiting",
            ),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response[0]["patient_name"], "Priority Patient");
}

#[tokio::test]
async fn add_to_queue_returns_created() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let token = front_desk_token(&config);

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/enqueue_patient"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                1,
                "Sam Lee",
                false,
                "waiting",
            ),
        ))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "patient_name": "Sam Lee" }).to_string()))
        .unwrap();

    let response = test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["entry"]["queue_number"], 1);
}

#[tokio::test]
async fn updating_unknown_entry_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let token = front_desk_token(&config);
    let entry_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/queue"))
        .and(query_param("id", format!("eq.{}", entry_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("PATCH")
        .uri(&format!("/{}", entry_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "with_doctor" }).to_string()))
        .unwrap();

    let response = test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["message"], "Queue item not found");
}

#[tokio::test]
async fn clearing_the_queue_removes_every_entry() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let token = front_desk_token(&config);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/queue"))
        .and(query_param("id", "not.is.null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                1,
                "Sam Lee",
                false,
                "waiting",
            ),
            MockClinicResponses::queue_entry_response(
                &Uuid::new_v4().to_string(),
                2,
                "Jo Smith",
                false,
                "waiting",
            ),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["removed"], 2);
}

#[tokio::test]
async fn queue_requires_bearer_token() {
    let config = TestConfig::default().to_app_config();

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
