use planwatch::error::ApiError;
use planwatch::transport::{ApiClient, ApiRequest, ApiTransport, ClientCredentials};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::mock_api::{ACCESS_TOKEN, PLANS_PATH, TOKEN_PATH, start_server, token_body};

fn client_for(uri: &str) -> ApiClient {
    ApiClient::new(
        uri,
        TOKEN_PATH,
        ClientCredentials::new("test-client", "test-secret"),
        5,
    )
}

#[tokio::test]
async fn token_is_acquired_once_and_reused() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    for _ in 0..2 {
        let body = client
            .execute(ApiRequest::get("plans", PLANS_PATH))
            .await
            .unwrap();
        assert_eq!(body, json!({"results": []}));
    }
}

#[tokio::test]
async fn unauthorized_response_refreshes_token_and_retries_once() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let body = client
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap();
    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn repeated_unauthorized_is_a_transport_error() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn rejected_credentials_fail_authentication() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("invalid client_secret=test-secret"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).authenticate().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    let message = err.to_string();
    assert!(message.starts_with("token request failed (401)"));
    assert!(!message.contains("test-secret"));
}

#[tokio::test]
async fn bare_service_unavailable_is_a_transport_error() {
    let server = start_server().await;
    crate::mock_api::mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(!err.is_feature_unavailable());
}

#[tokio::test]
async fn forbidden_with_disabled_feature_body_is_feature_unavailable() {
    let server = start_server().await;
    crate::mock_api::mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "httpStatus": 403,
            "errors": [{"code": "FEATURE", "description": "Managed software updates are not enabled"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::FeatureUnavailable { .. }));
}

#[tokio::test]
async fn server_error_is_transport() {
    let server = start_server().await;
    crate::mock_api::mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(!err.is_feature_unavailable());
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = start_server().await;
    crate::mock_api::mount_token(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server.uri())
        .execute(ApiRequest::patch(
            "annotation write",
            "/api/v1/computers-inventory-detail/7",
            json!({"extensionAttributes": []}),
        ))
        .await
        .unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn unparseable_success_body_is_a_decode_error() {
    let server = start_server().await;
    crate::mock_api::mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .execute(ApiRequest::get("plans", PLANS_PATH))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}
