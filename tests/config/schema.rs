use planwatch::config::Config;

#[test]
fn minimal_config_deserializes_with_defaults() {
    let toml = r#"
[connection]
base_url = "https://mdm.acme.test"
client_id = "0f3c"
client_secret = "s3cr3t"
"#;

    let parsed = Config::from_toml_str(toml).expect("minimal config should deserialize");

    assert_eq!(parsed.connection.timeout_secs, 30);
    assert_eq!(parsed.endpoints.token, "/api/oauth/token");
    assert_eq!(
        parsed.endpoints.device_annotations_path("12"),
        "/api/v1/computers-inventory-detail/12"
    );
    assert!(parsed.sync.write_annotations);
    assert!(!parsed.sync.create_missing_definitions);
    assert!(parsed.sync.include_limited_devices);
    assert_eq!(parsed.sync.page_size, 100);
    assert!(parsed.export.enabled);
    assert_eq!(parsed.logging.level, "info");
    assert!(parsed.validate().is_ok());
}

#[test]
fn endpoint_overrides_are_honoured() {
    let toml = r#"
[connection]
base_url = "https://mdm.acme.test"
client_id = "0f3c"
client_secret = "s3cr3t"

[endpoints]
plans = "/api/v2/plans"
device_annotations = "/api/v3/devices/{id}/attributes"
full_device_sections = ["GENERAL"]
"#;

    let parsed = Config::from_toml_str(toml).unwrap();

    assert_eq!(parsed.endpoints.plans, "/api/v2/plans");
    assert_eq!(parsed.endpoints.full_device_sections, vec!["GENERAL"]);
    assert_eq!(
        parsed.endpoints.device_annotations_path("9"),
        "/api/v3/devices/9/attributes"
    );
    assert_eq!(parsed.endpoints.token, "/api/oauth/token");
}

#[test]
fn annotation_path_without_id_is_rejected() {
    let toml = r#"
[connection]
base_url = "https://mdm.acme.test"
client_id = "0f3c"
client_secret = "s3cr3t"

[endpoints]
device_annotations = "/api/v1/computers-inventory-detail"
"#;

    let err = Config::from_toml_str(toml).unwrap().validate().unwrap_err();
    assert!(err.to_string().contains("{id}"));
}

#[test]
fn non_http_base_url_is_rejected() {
    let toml = r#"
[connection]
base_url = "ftp://mdm.acme.test"
client_id = "0f3c"
client_secret = "s3cr3t"
"#;

    let err = Config::from_toml_str(toml).unwrap().validate().unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn oversized_page_is_rejected() {
    let toml = r#"
[connection]
base_url = "https://mdm.acme.test"
client_id = "0f3c"
client_secret = "s3cr3t"

[sync]
page_size = 5000
"#;

    let err = Config::from_toml_str(toml).unwrap().validate().unwrap_err();
    assert!(err.to_string().contains("sync.page_size"));
}

#[test]
fn debug_output_redacts_client_secret() {
    let toml = r#"
[connection]
base_url = "https://mdm.acme.test"
client_id = "0f3c"
client_secret = "very-secret-value"
"#;

    let parsed = Config::from_toml_str(toml).unwrap();
    let rendered = format!("{parsed:?}");
    assert!(!rendered.contains("very-secret-value"));
}
