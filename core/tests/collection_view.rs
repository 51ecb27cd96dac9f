use triage_core::config::ViewConfig;
use triage_core::export::{export_view, sha256_hex, ExportFormat};
use triage_core::record::{records_from_json_str, RecordId};
use triage_core::view::{CollectionView, FilterCriterion, SelectionStatus, SortDirection};

const CASES: &str = include_str!("fixtures/cases.json");
const TIMELINE: &str = include_str!("fixtures/timeline.json");

fn ids(view: &CollectionView) -> Vec<String> {
    view.derived().iter().map(|r| r.id.to_string()).collect()
}

#[test]
fn cases_table_filters_sorts_and_selects() {
    let mut view = CollectionView::new(ViewConfig::cases(), records_from_json_str(CASES).unwrap()).unwrap();
    assert_eq!(view.summary().visible, 6);

    view.set_filter_value("status", "active").unwrap();
    assert_eq!(ids(&view), ["case-001", "case-005", "case-003"]);

    let spec = view.click_sort_header("caseId").unwrap();
    assert_eq!(spec.direction, SortDirection::Asc);
    assert_eq!(ids(&view), ["case-001", "case-003", "case-005"]);
    let spec = view.click_sort_header("caseId").unwrap();
    assert_eq!(spec.direction, SortDirection::Desc);
    assert_eq!(ids(&view), ["case-005", "case-003", "case-001"]);

    view.toggle_select(&RecordId::new("case-003")).unwrap();
    assert_eq!(view.selection_status(), SelectionStatus::Some);
    assert_eq!(view.toggle_select_all(), SelectionStatus::All);
    assert_eq!(view.summary().selected, 3);

    view.reset_filters().unwrap();
    let summary = view.summary();
    assert_eq!(summary.visible, 6);
    assert!(!summary.filters_active);
    assert_eq!(view.selection_status(), SelectionStatus::Some);
    assert_eq!(view.toggle_select_all(), SelectionStatus::All);
    assert_eq!(view.toggle_select_all(), SelectionStatus::None);
}

#[test]
fn search_box_matches_any_configured_field() {
    let mut view = CollectionView::new(ViewConfig::cases(), records_from_json_str(CASES).unwrap()).unwrap();
    view.set_filter_value("search", "sarah").unwrap();
    assert_eq!(ids(&view), ["case-001", "case-006"]);
    view.set_filter_value("search", "2024-00").unwrap();
    assert_eq!(view.summary().visible, 6);
    view.set_filter_value("search", "").unwrap();
    assert!(view.active_filter_chips().is_empty());
}

#[test]
fn timeline_date_pickers_bound_the_range() {
    let mut view =
        CollectionView::new(ViewConfig::timeline(), records_from_json_str(TIMELINE).unwrap()).unwrap();
    view.set_filter_value("startDate", "2024-10-20T09:00:00").unwrap();
    view.set_filter_value("endDate", "2024-10-21").unwrap();
    assert_eq!(ids(&view), ["evt-003", "evt-002"]);

    let chips = view.active_filter_chips();
    assert_eq!(chips.len(), 2);
    assert_eq!(chips[0].label, "From");
    assert_eq!(chips[1].value, "2024-10-21");

    view.clear_filter("endDate").unwrap();
    assert_eq!(ids(&view), ["evt-005", "evt-004", "evt-003", "evt-002"]);
}

#[test]
fn correlation_filter_excludes_events_without_an_id() {
    let mut view =
        CollectionView::new(ViewConfig::timeline(), records_from_json_str(TIMELINE).unwrap()).unwrap();
    view.set_filter_value("correlationId", "corr-77").unwrap();
    assert_eq!(view.summary().visible, 3);
    view.set_filter_value("severity", "high").unwrap();
    assert_eq!(ids(&view), ["evt-002"]);
}

#[test]
fn ad_hoc_criteria_show_up_as_chips_and_can_be_removed() {
    let mut view = CollectionView::new(ViewConfig::cases(), records_from_json_str(CASES).unwrap()).unwrap();
    view.set_filter("assigned", FilterCriterion::equals("investigator", "Sarah Chen"))
        .unwrap();
    let chips = view.active_filter_chips();
    assert_eq!(chips[0].control, "assigned");
    assert_eq!(chips[0].value, "Sarah Chen");
    view.clear_filter("assigned").unwrap();
    assert!(view.filters().get("assigned").is_none());
    assert_eq!(view.summary().visible, 6);
}

#[test]
fn exporting_the_derived_view_is_reproducible() {
    let mut view = CollectionView::new(ViewConfig::cases(), records_from_json_str(CASES).unwrap()).unwrap();
    view.set_filter_value("priority", "critical").unwrap();
    let cols: Vec<String> = ["caseId", "crimeType", "status"].iter().map(|s| s.to_string()).collect();

    let a = export_view(&view.derived(), &cols, ExportFormat::CSV).unwrap();
    let b = export_view(&view.derived(), &cols, ExportFormat::CSV).unwrap();
    assert_eq!(a.sha256, b.sha256);
    assert_eq!(a.sha256, sha256_hex(&a.bytes));
    assert_eq!(a.row_count, 2);
    let text = String::from_utf8(a.bytes).unwrap();
    assert_eq!(
        text,
        "caseId,crimeType,status\n2024-001,Data Breach,Active\n2024-006,Ransomware,Completed\n"
    );

    let json = export_view(&view.derived(), &cols, ExportFormat::JSON).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&json.bytes).unwrap();
    assert_eq!(parsed[1]["crimeType"], "Ransomware");
}

#[test]
fn evidence_sorts_display_dates_chronologically() {
    let evidence = records_from_json_str(
        r#"[
            {"id": "EVD-001", "name": "Server Access Logs", "type": "Network Log", "collectedDate": "Oct 9, 2024"},
            {"id": "EVD-002", "name": "Employee Workstation Image", "type": "Digital Device", "collectedDate": "Oct 13, 2024"},
            {"id": "EVD-003", "name": "Phishing Email Headers", "type": "Email", "collectedDate": "Sep 30, 2024"}
        ]"#,
    )
    .unwrap();
    let mut view = CollectionView::new(ViewConfig::evidence(), evidence).unwrap();
    assert_eq!(ids(&view), ["EVD-002", "EVD-001", "EVD-003"]);

    view.set_filter_value("type", "Email").unwrap();
    assert_eq!(ids(&view), ["EVD-003"]);
    assert_eq!(view.active_filter_chips()[0].value, "Email");
}
