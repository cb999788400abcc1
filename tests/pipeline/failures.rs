use planwatch::app::run::execute;
use planwatch::app::summary::render_summary;
use planwatch::error::{ApiError, RunError, SyncError};
use planwatch::transport::ApiClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::mock_api::{
    ANNOTATION_NAMES, DEFINITIONS_PATH, FULL_DEVICES_PATH, LIMITED_DEVICES_PATH, PLANS_PATH,
    config_for, definitions, mount_list, mount_token, start_server,
};

#[tokio::test]
async fn missing_definition_aborts_before_any_write() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_list(&server, FULL_DEVICES_PATH, vec![json!({"id": "1"}), json!({"id": "2"})]).await;
    mount_list(&server, LIMITED_DEVICES_PATH, vec![]).await;
    mount_list(&server, PLANS_PATH, vec![]).await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES[..4])).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DEFINITIONS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    match &outcome.result {
        Err(RunError::Sync(SyncError::MissingAnnotationDefinition { names })) => {
            assert_eq!(names, &vec!["Plan_Force_Install_Date".to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(outcome.stats.devices_updated, 0);
    assert_eq!(outcome.stats.errors, 1);
    assert!(outcome.report_path.as_ref().is_some_and(|p| p.exists()));

    let summary = render_summary(&outcome);
    assert!(summary.contains("Plan_Force_Install_Date"));
    assert!(summary.contains("Devices processed    2"));
}

#[tokio::test]
async fn device_fetch_failure_is_fatal_and_exports_nothing() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(FULL_DEVICES_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(outcome.result, Err(RunError::Api(_))));
    assert!(outcome.report_path.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unavailable_limited_inventory_is_fatal() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_list(&server, FULL_DEVICES_PATH, vec![json!({"id": "1"})]).await;
    Mock::given(method("GET"))
        .and(path(LIMITED_DEVICES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(
        outcome.result,
        Err(RunError::Api(ApiError::Transport { status: Some(503), .. }))
    ));
}

/// Mounts everything a run needs apart from the plan endpoint, with writes
/// and definition creation forbidden.
async fn mount_all_but_plans(server: &wiremock::MockServer) {
    mount_token(server).await;
    mount_list(server, FULL_DEVICES_PATH, vec![json!({"id": "1"}), json!({"id": "2"})]).await;
    mount_list(server, LIMITED_DEVICES_PATH, vec![]).await;
    mount_list(server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES)).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn plan_outage_is_fatal_and_writes_nothing() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_all_but_plans(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(
        outcome.result,
        Err(RunError::Api(ApiError::Transport { status: Some(503), .. }))
    ));
    assert_eq!(outcome.stats.devices_updated, 0);
    assert_eq!(outcome.stats.status_count("No Plan"), 0);
    assert!(outcome.report_path.is_none());
}

#[tokio::test]
async fn plan_outage_on_later_page_is_fatal() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_all_but_plans(&server).await;
    let full_page: Vec<_> = (1..=3)
        .map(|id| json!({"planUuid": format!("p{id}"), "device": {"deviceId": id}}))
        .collect();
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crate::mock_api::page(full_page)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded, retry later"))
        .mount(&server)
        .await;

    let mut config = config_for(&server, dir.path());
    config.sync.page_size = 3;
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(
        outcome.result,
        Err(RunError::Api(ApiError::Transport { status: Some(503), .. }))
    ));
    assert_eq!(outcome.stats.devices_updated, 0);
}

#[tokio::test]
async fn unrelated_disabled_wording_is_not_a_feature_fallback() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_all_but_plans(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API client is disabled"))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(
        outcome.result,
        Err(RunError::Api(ApiError::Transport { status: Some(403), .. }))
    ));
}

#[tokio::test]
async fn placeholder_credentials_fail_without_network_io() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server, dir.path());
    config.connection.client_secret = "YOUR_CLIENT_SECRET".into();
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(matches!(outcome.result, Err(RunError::Config(_))));
    assert_eq!(outcome.stats.devices_processed, 0);
}
