use std::fs;

use triage_core::config::{ControlMode, ViewConfig};
use triage_core::error::CoreError;
use triage_core::view::SortSpec;

#[test]
fn loads_view_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.json");
    let cfg = ViewConfig::alerts();
    fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();

    let loaded = ViewConfig::load(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.default_sort, Some(SortSpec::desc("timestamp")));
    assert_eq!(loaded.control("severity").unwrap().mode, ControlMode::EqualsNormalized);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ViewConfig::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, CoreError::Io(_)));
}

#[test]
fn unknown_control_mode_is_rejected() {
    let err = ViewConfig::from_json_str(
        r#"{"view_id": "x", "controls": [{"name": "s", "label": "S", "field": "s", "mode": "regex"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Json(_)));
}

#[test]
fn search_control_without_fields_is_rejected() {
    let err = ViewConfig::from_json_str(
        r#"{"view_id": "x", "controls": [{"name": "search", "label": "Search", "mode": "search"}]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("needs at least one field"));
}

#[test]
fn bad_default_value_is_rejected() {
    let err = ViewConfig::from_json_str(
        r#"{"view_id": "timeline", "controls": [
            {"name": "startDate", "label": "From", "field": "timestamp", "mode": "date_from", "default": "last week"}
        ]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}
