use planwatch::app::run::execute;
use planwatch::transport::ApiClient;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::mock_api::{
    ANNOTATION_NAMES, DEFINITIONS_PATH, FULL_DEVICES_PATH, LIMITED_DEVICES_PATH, PLANS_PATH,
    config_for, definitions, mount_list, mount_token, start_server,
};

async fn mount_inventory(server: &MockServer) {
    mount_list(
        server,
        FULL_DEVICES_PATH,
        vec![
            json!({"id": "1", "general": {"name": "MBP-1"}, "hardware": {"serialNumber": "S1"}}),
            json!({"id": "2", "general": {"name": "MBP-2"}, "hardware": {"serialNumber": "S2"}}),
        ],
    )
    .await;
    mount_list(
        server,
        LIMITED_DEVICES_PATH,
        vec![json!({"mobileDeviceId": 3, "general": {"displayName": "iPad-3"}})],
    )
    .await;
}

fn no_plan_body() -> Value {
    let attributes: Vec<Value> = (1..=5)
        .map(|id| json!({"definitionId": id.to_string(), "values": ["No Plan"]}))
        .collect();
    json!({ "extensionAttributes": attributes })
}

fn report_lines(dir: &TempDir) -> Vec<String> {
    let entry = fs::read_dir(dir.path())
        .unwrap()
        .map(Result::unwrap)
        .find(|e| e.file_name().to_string_lossy().starts_with("plan_status_"))
        .expect("report file");
    fs::read_to_string(entry.path())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn full_run_writes_full_devices_and_skips_limited() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_inventory(&server).await;
    mount_list(
        &server,
        PLANS_PATH,
        vec![json!({
            "planUuid": "plan-1",
            "device": {"deviceId": 1, "objectType": "COMPUTER"},
            "updateAction": "DOWNLOAD_INSTALL_SCHEDULE",
            "versionType": "LATEST_MINOR",
            "maxDeferrals": 3,
            "status": {"state": "PlanCompleted", "errorReasons": []}
        })],
    )
    .await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES)).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/1"))
        .and(body_json(json!({"extensionAttributes": [
            {"definitionId": "1", "values": ["PlanCompleted"]},
            {"definitionId": "2", "values": ["DOWNLOAD_INSTALL_SCHEDULE"]},
            {"definitionId": "3", "values": ["LATEST_MINOR"]},
            {"definitionId": "4", "values": ["No Errors"]},
            {"definitionId": "5", "values": ["Not Set"]}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/2"))
        .and(body_json(no_plan_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    let stats = &outcome.stats;
    assert_eq!(stats.devices_processed, 3);
    assert_eq!(stats.full_devices, 2);
    assert_eq!(stats.limited_devices, 1);
    assert_eq!(stats.devices_updated, 2);
    assert_eq!(stats.devices_skipped, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.status_count("PlanCompleted"), 1);
    assert_eq!(stats.status_count("No Plan"), 2);

    let lines = report_lines(&dir);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("1,Full Device,MBP-1,S1,"));
    assert!(lines[1].contains("plan-1,3"));
    assert!(lines[3].starts_with("3,Limited Device,iPad-3,"));
}

#[tokio::test]
async fn disabled_plan_feature_still_writes_no_plan_and_exports() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_inventory(&server).await;
    Mock::given(method("GET"))
        .and(path(PLANS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "httpStatus": 403,
            "errors": [{"code": "FEATURE", "description": "Managed Software Updates are not enabled"}]
        })))
        .mount(&server)
        .await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES)).await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/api/v1/computers-inventory-detail/[12]$"))
        .and(body_json(no_plan_body()))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.stats.plans_available, Some(false));
    assert_eq!(outcome.stats.status_count("No Plan"), 3);
    assert_eq!(outcome.stats.devices_updated, 2);

    let lines = report_lines(&dir);
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|l| l.contains("No Plan")));
}

#[tokio::test]
async fn missing_definitions_are_created_when_authorized() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_inventory(&server).await;
    mount_list(&server, PLANS_PATH, vec![]).await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES[..3])).await;
    Mock::given(method("POST"))
        .and(path(DEFINITIONS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "40", "href": "/x/40"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/api/v1/computers-inventory-detail/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server, dir.path());
    config.sync.create_missing_definitions = true;
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.stats.definitions_created, 2);
    assert_eq!(outcome.stats.devices_updated, 2);
}

#[tokio::test]
async fn dry_run_sends_no_writes() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_inventory(&server).await;
    mount_list(&server, PLANS_PATH, vec![]).await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES[..1])).await;
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

    let mut config = config_for(&server, dir.path());
    config.sync.dry_run = true;
    config.sync.create_missing_definitions = true;
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.stats.devices_would_update, 2);
    assert_eq!(outcome.stats.devices_updated, 0);
    assert_eq!(report_lines(&dir).len(), 4);
}

#[tokio::test]
async fn one_rejected_write_does_not_stop_the_others() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    mount_token(&server).await;
    mount_inventory(&server).await;
    mount_list(&server, PLANS_PATH, vec![]).await;
    mount_list(&server, DEFINITIONS_PATH, definitions(&ANNOTATION_NAMES)).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/1"))
        .respond_with(ResponseTemplate::new(409).set_body_string("optimistic lock failure"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let client = ApiClient::from_config(&config);
    let outcome = execute(&config, &client).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.stats.devices_updated, 1);
    assert_eq!(outcome.stats.errors, 1);
}
