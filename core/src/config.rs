use crate::error::{CoreError, CoreResult};
use crate::record::FieldValue;
use crate::view::filter::{FilterCriterion, FilterSet};
use crate::view::sort::SortSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Equals,
    EqualsNormalized,
    Contains,
    /// Case-insensitive substring search across `fields`.
    Search,
    /// Lower bound of a date range picker.
    DateFrom,
    /// Upper bound of a date range picker.
    DateTo,
    /// "Last N days": a lower bound `N` days before the reference instant.
    WithinDays,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlOption {
    pub value: String,
    pub label: String,
    /// Field this option filters on when it differs from the control's field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Record value this option matches when it differs from `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterControl {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub mode: ControlMode,
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ControlOption>,
}

/// Names accepted by `ViewConfig::preset`.
pub const PRESET_NAMES: [&str; 7] = [
    "cases",
    "evidence",
    "audit_logs",
    "alerts",
    "timeline",
    "users",
    "investigation_timeline",
];

/// Raw value meaning "no restriction" for dropdowns and text inputs.
pub const ALL_OPTION: &str = "all";

impl FilterControl {
    pub fn select(name: &str, label: &str, field: &str, mode: ControlMode, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field: Some(field.to_string()),
            fields: Vec::new(),
            mode,
            default: ALL_OPTION.to_string(),
            options: options
                .iter()
                .map(|(value, label)| ControlOption {
                    value: value.to_string(),
                    label: label.to_string(),
                    field: None,
                    equals: None,
                })
                .collect(),
        }
    }

    pub fn search(name: &str, label: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            mode: ControlMode::Search,
            default: String::new(),
            options: Vec::new(),
        }
    }

    pub fn text(name: &str, label: &str, field: &str, mode: ControlMode) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field: Some(field.to_string()),
            fields: Vec::new(),
            mode,
            default: String::new(),
            options: Vec::new(),
        }
    }

    fn target_field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    pub fn option(&self, value: &str) -> Option<&ControlOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Display label for a raw control value (option label when one exists).
    pub fn value_label(&self, raw: &str) -> String {
        self.option(raw)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| raw.to_string())
    }

    /// Translates a raw input event value into a criterion. Empty input and
    /// the `all` option yield `Any`. Relative controls need `translate_at`.
    pub fn translate(&self, raw: &str) -> CoreResult<FilterCriterion> {
        self.translate_at(raw, None)
    }

    /// As `translate`, measuring relative ranges from `reference`.
    pub fn translate_at(
        &self,
        raw: &str,
        reference: Option<OffsetDateTime>,
    ) -> CoreResult<FilterCriterion> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL_OPTION) {
            return Ok(FilterCriterion::any(self.target_field()));
        }
        let field = self.target_field();
        let criterion = match self.mode {
            ControlMode::Equals | ControlMode::EqualsNormalized => {
                let (field, expected) = match self.option(raw) {
                    Some(opt) => (
                        opt.field.as_deref().unwrap_or(field),
                        opt.equals.as_deref().unwrap_or(raw),
                    ),
                    None => (field, raw),
                };
                if self.mode == ControlMode::Equals {
                    FilterCriterion::equals(field, expected)
                } else {
                    FilterCriterion::equals_normalized(field, expected)
                }
            }
            ControlMode::Contains => FilterCriterion::contains(field, raw),
            ControlMode::Search => FilterCriterion::any_of(
                &self.name,
                self.fields
                    .iter()
                    .map(|f| FilterCriterion::contains(f, raw))
                    .collect(),
            ),
            ControlMode::DateFrom | ControlMode::DateTo => {
                let bound = match FieldValue::parse_text(raw) {
                    v @ (FieldValue::Date(_) | FieldValue::DateTime(_)) => v,
                    _ => {
                        return Err(CoreError::InvalidInput(format!(
                            "control {} expects a date, got {}",
                            self.name, raw
                        )))
                    }
                };
                if self.mode == ControlMode::DateFrom {
                    FilterCriterion::range(field, Some(bound), None)
                } else {
                    FilterCriterion::range(field, None, Some(bound))
                }
            }
            ControlMode::WithinDays => {
                let days = self.day_count(raw)?;
                let reference = reference.ok_or_else(|| {
                    CoreError::InvalidInput(format!(
                        "control {} needs a reference time to resolve {}",
                        self.name, raw
                    ))
                })?;
                let since = reference
                    .checked_sub(Duration::days(i64::from(days)))
                    .ok_or_else(|| {
                        CoreError::InvalidInput(format!("control {}: {} days is out of range", self.name, days))
                    })?;
                FilterCriterion::range(field, Some(FieldValue::DateTime(since)), None)
            }
        };
        criterion.validate()?;
        Ok(criterion)
    }

    // `7days`, `7 days` or `7`; an option's `equals` overrides the raw value.
    fn day_count(&self, raw: &str) -> CoreResult<u32> {
        let value = self
            .option(raw)
            .and_then(|o| o.equals.as_deref())
            .unwrap_or(raw);
        value
            .trim()
            .trim_end_matches("days")
            .trim()
            .parse()
            .map_err(|_| {
                CoreError::InvalidInput(format!(
                    "control {} expects a day count, got {}",
                    self.name, raw
                ))
            })
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("filter control without a name".to_string()));
        }
        match self.mode {
            ControlMode::Search if self.fields.is_empty() => Err(CoreError::InvalidInput(format!(
                "search control {} needs at least one field",
                self.name
            ))),
            ControlMode::Search => Ok(()),
            _ if self.field.as_deref().map_or(true, |f| f.trim().is_empty()) => {
                Err(CoreError::InvalidInput(format!("control {} needs a field", self.name)))
            }
            ControlMode::WithinDays => {
                for opt in &self.options {
                    if !opt.value.eq_ignore_ascii_case(ALL_OPTION) {
                        self.day_count(&opt.value)?;
                    }
                }
                self.translate_at(&self.default, Some(OffsetDateTime::UNIX_EPOCH))?;
                Ok(())
            }
            _ => {
                self.translate(&self.default)?;
                Ok(())
            }
        }
    }
}

/// Per-page view configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewConfig {
    pub view_id: String,
    #[serde(default)]
    pub sortable_fields: Vec<String>,
    #[serde(default)]
    pub default_sort: Option<SortSpec>,
    #[serde(default)]
    pub controls: Vec<FilterControl>,
}

impl ViewConfig {
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let cfg: ViewConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.view_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("view_id must not be empty".to_string()));
        }
        let mut names = BTreeSet::new();
        for c in &self.controls {
            c.validate()?;
            if !names.insert(c.name.as_str()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate filter control {} in view {}",
                    c.name, self.view_id
                )));
            }
        }
        if let Some(sort) = &self.default_sort {
            self.ensure_sortable(&sort.field)?;
        }
        Ok(())
    }

    pub fn control(&self, name: &str) -> Option<&FilterControl> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable_fields.iter().any(|f| f == field)
    }

    pub fn ensure_sortable(&self, field: &str) -> CoreResult<()> {
        if self.is_sortable(field) {
            Ok(())
        } else {
            Err(CoreError::InvalidInput(format!(
                "field {} is not sortable in view {}",
                field, self.view_id
            )))
        }
    }

    /// Filter set built from every control's default value.
    pub fn default_filters(&self) -> CoreResult<FilterSet> {
        self.default_filters_at(None)
    }

    pub fn default_filters_at(&self, reference: Option<OffsetDateTime>) -> CoreResult<FilterSet> {
        let mut fs = FilterSet::new();
        for c in &self.controls {
            fs.set(&c.name, c.translate_at(&c.default, reference)?)?;
        }
        Ok(fs)
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "cases" => Some(Self::cases()),
            "evidence" => Some(Self::evidence()),
            "audit_logs" => Some(Self::audit_logs()),
            "alerts" => Some(Self::alerts()),
            "timeline" => Some(Self::timeline()),
            "users" => Some(Self::users()),
            "investigation_timeline" => Some(Self::investigation_timeline()),
            _ => None,
        }
    }

    pub fn cases() -> Self {
        Self {
            view_id: "cases".to_string(),
            sortable_fields: strings(&["caseId", "crimeType", "lastActivity"]),
            default_sort: Some(SortSpec::desc("lastActivity")),
            controls: vec![
                FilterControl::search("search", "Search", &["caseId", "crimeType", "investigator"]),
                FilterControl::select(
                    "status",
                    "Status",
                    "status",
                    ControlMode::EqualsNormalized,
                    &[
                        ("active", "Active"),
                        ("pending", "Pending"),
                        ("on_hold", "On Hold"),
                        ("completed", "Completed"),
                    ],
                ),
                FilterControl::select(
                    "priority",
                    "Priority",
                    "priority",
                    ControlMode::EqualsNormalized,
                    &[
                        ("critical", "Critical"),
                        ("high", "High"),
                        ("medium", "Medium"),
                        ("low", "Low"),
                    ],
                ),
                FilterControl::select(
                    "investigator",
                    "Investigator",
                    "investigator",
                    ControlMode::EqualsNormalized,
                    &[
                        ("sarah_chen", "Sarah Chen"),
                        ("michael_rodriguez", "Michael Rodriguez"),
                        ("david_kim", "David Kim"),
                        ("emily_watson", "Emily Watson"),
                        ("james_thompson", "James Thompson"),
                    ],
                ),
                FilterControl::select(
                    "crimeType",
                    "Crime Type",
                    "crimeType",
                    ControlMode::EqualsNormalized,
                    &[
                        ("data_breach", "Data Breach"),
                        ("phishing_attack", "Phishing Attack"),
                        ("malware_analysis", "Malware Analysis"),
                        ("financial_fraud", "Financial Fraud"),
                        ("identity_theft", "Identity Theft"),
                        ("ransomware", "Ransomware"),
                    ],
                ),
            ],
        }
    }

    pub fn evidence() -> Self {
        Self {
            view_id: "evidence".to_string(),
            sortable_fields: strings(&["collectedDate", "name", "size"]),
            default_sort: Some(SortSpec::desc("collectedDate")),
            controls: vec![FilterControl::select(
                "type",
                "Evidence Type",
                "type",
                ControlMode::Equals,
                &[
                    ("Digital Device", "Digital Device"),
                    ("Network Log", "Network Log"),
                    ("Email", "Email"),
                    ("Document", "Document"),
                    ("Image", "Image"),
                    ("Video", "Video"),
                ],
            )],
        }
    }

    pub fn audit_logs() -> Self {
        let mut activity = FilterControl::select(
            "activity",
            "Activity",
            "status",
            ControlMode::Equals,
            &[],
        );
        activity.options = vec![
            mapped_option("success", "Successful Actions", "status", "Success"),
            mapped_option("failed", "Failed Actions", "status", "Failed"),
            mapped_option("critical", "Critical Events", "severity", "Critical"),
            mapped_option("warning", "Warnings", "severity", "Warning"),
        ];
        Self {
            view_id: "audit_logs".to_string(),
            sortable_fields: strings(&["timestamp", "user", "action", "severity"]),
            default_sort: Some(SortSpec::desc("timestamp")),
            controls: vec![
                FilterControl::search("search", "Search", &["user", "action", "resource"]),
                activity,
            ],
        }
    }

    pub fn alerts() -> Self {
        Self {
            view_id: "alerts".to_string(),
            sortable_fields: strings(&["timestamp", "severity"]),
            default_sort: Some(SortSpec::desc("timestamp")),
            controls: vec![FilterControl::select(
                "severity",
                "Severity",
                "severity",
                ControlMode::EqualsNormalized,
                &[
                    ("critical", "Critical"),
                    ("high", "High"),
                    ("medium", "Medium"),
                    ("low", "Low"),
                ],
            )],
        }
    }

    pub fn timeline() -> Self {
        Self {
            view_id: "timeline".to_string(),
            sortable_fields: strings(&["timestamp", "severity", "source"]),
            default_sort: Some(SortSpec::desc("timestamp")),
            controls: vec![
                FilterControl::text("startDate", "From", "timestamp", ControlMode::DateFrom),
                FilterControl::text("endDate", "Until", "timestamp", ControlMode::DateTo),
                FilterControl::select(
                    "source",
                    "Source",
                    "source",
                    ControlMode::EqualsNormalized,
                    &[
                        ("network_logs", "Network Logs"),
                        ("system_logs", "System Logs"),
                        ("network_monitor", "Network Monitor"),
                        ("antivirus_engine", "Antivirus Engine"),
                        ("system_events", "System Events"),
                    ],
                ),
                FilterControl::select(
                    "eventType",
                    "Type",
                    "eventType",
                    ControlMode::EqualsNormalized,
                    &[
                        ("network_access", "Network Access"),
                        ("file_access", "File Access"),
                        ("data_exfiltration", "Data Exfiltration"),
                        ("malware_detection", "Malware Detection"),
                        ("system_shutdown", "System Shutdown"),
                    ],
                ),
                FilterControl::select(
                    "severity",
                    "Severity",
                    "severity",
                    ControlMode::EqualsNormalized,
                    &[
                        ("low", "Low"),
                        ("medium", "Medium"),
                        ("high", "High"),
                        ("critical", "Critical"),
                    ],
                ),
                FilterControl::search("search", "Search", &["title", "description"]),
                FilterControl::text("correlationId", "Correlation", "correlationId", ControlMode::Contains),
            ],
        }
    }

    /// Case-details activity timeline: event type plus a relative time range.
    pub fn investigation_timeline() -> Self {
        Self {
            view_id: "investigation_timeline".to_string(),
            sortable_fields: strings(&["timestamp", "type"]),
            default_sort: Some(SortSpec::desc("timestamp")),
            controls: vec![
                FilterControl::select(
                    "type",
                    "Event Type",
                    "type",
                    ControlMode::Equals,
                    &[
                        ("Evidence Collection", "Evidence Collection"),
                        ("Analysis", "Analysis"),
                        ("Interview", "Interview"),
                        ("System Event", "System Event"),
                        ("Legal Action", "Legal Action"),
                        ("Report", "Report"),
                    ],
                ),
                FilterControl::select(
                    "timeRange",
                    "Time Range",
                    "timestamp",
                    ControlMode::WithinDays,
                    &[
                        ("7days", "Last 7 Days"),
                        ("30days", "Last 30 Days"),
                        ("90days", "Last 90 Days"),
                    ],
                ),
            ],
        }
    }

    pub fn users() -> Self {
        Self {
            view_id: "users".to_string(),
            sortable_fields: strings(&["name", "department", "role", "lastLogin"]),
            default_sort: Some(SortSpec::desc("lastLogin")),
            controls: vec![
                FilterControl::search("search", "Search", &["name", "email"]),
                FilterControl::select(
                    "department",
                    "Department",
                    "department",
                    ControlMode::Equals,
                    &[
                        ("Digital Forensics", "Digital Forensics"),
                        ("Cyber Crimes", "Cyber Crimes"),
                        ("Incident Response", "Incident Response"),
                        ("Malware Analysis", "Malware Analysis"),
                    ],
                ),
                FilterControl::select(
                    "role",
                    "Role",
                    "role",
                    ControlMode::Equals,
                    &[
                        ("Senior Investigator", "Senior Investigator"),
                        ("Lead Investigator", "Lead Investigator"),
                        ("Junior Analyst", "Junior Analyst"),
                        ("Technical Specialist", "Technical Specialist"),
                    ],
                ),
            ],
        }
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn mapped_option(value: &str, label: &str, field: &str, equals: &str) -> ControlOption {
    ControlOption {
        value: value.to_string(),
        label: label.to_string(),
        field: Some(field.to_string()),
        equals: Some(equals.to_string()),
    }
}
