pub(super) const CONFIG_TEMPLATE: &str = r#"# planwatch configuration

[connection]
# Device-management server and an API client allowed to read inventory and
# update plans, and to read/write inventory attributes.
base_url = "https://yourserver.example.com"
client_id = "YOUR_CLIENT_ID"
client_secret = "YOUR_CLIENT_SECRET"
timeout_secs = 30

[sync]
# Write the five Plan_* attributes to every full-featured device.
write_annotations = true
# Create missing Plan_* attribute definitions instead of aborting the run.
create_missing_definitions = false
# Also inventory attribute-limited devices (report only, never written).
include_limited_devices = true
page_size = 100
# Pause between attribute writes, in milliseconds.
write_delay_ms = 250
# Reconcile and export without writing anything.
dry_run = false

[export]
enabled = true
output_dir = "~/planwatch/reports"

[logging]
level = "info"
# file = "~/planwatch/logs/planwatch.log"
"#;
