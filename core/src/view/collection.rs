use super::filter::{FilterCriterion, FilterSet};
use super::pipeline::DerivedViewPipeline;
use super::selection::{SelectionController, SelectionStatus};
use super::sort::SortSpec;
use crate::config::{ControlMode, ViewConfig};
use crate::error::{CoreError, CoreResult};
use crate::record::{Record, RecordId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// A removable "chip" describing one active filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterChip {
    pub control: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewSummary {
    pub visible: usize,
    pub total: usize,
    pub selected: usize,
    pub filters_active: bool,
}

/// State of one filterable collection on one page. Owned by that page and
/// passed down explicitly; nothing here is process-wide.
#[derive(Debug)]
pub struct CollectionView {
    config: ViewConfig,
    source: Vec<Record>,
    filters: FilterSet,
    raw_values: Vec<(String, String)>,
    sort: Option<SortSpec>,
    selection: SelectionController,
    pipeline: DerivedViewPipeline,
    reference: Option<OffsetDateTime>,
}

impl CollectionView {
    pub fn new(config: ViewConfig, source: Vec<Record>) -> CoreResult<Self> {
        config.validate()?;
        let filters = config.default_filters()?;
        let sort = config.default_sort.clone();
        let mut view = Self {
            config,
            source,
            filters,
            raw_values: Vec::new(),
            sort,
            selection: SelectionController::new(),
            pipeline: DerivedViewPipeline::new(),
            reference: None,
        };
        view.refresh()?;
        Ok(view)
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn source(&self) -> &[Record] {
        &self.source
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn set_filter(&mut self, control: &str, criterion: FilterCriterion) -> CoreResult<()> {
        self.filters.set(control, criterion)?;
        self.raw_values.retain(|(name, _)| name != control);
        self.refresh()
    }

    /// Applies a raw input event (text change, option change, date pick)
    /// through the control's configured translation.
    pub fn set_filter_value(&mut self, control: &str, raw: &str) -> CoreResult<()> {
        let def = self.config.control(control).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "unknown filter control {} in view {}",
                control, self.config.view_id
            ))
        })?;
        let criterion = def.translate_at(raw, self.reference)?;
        self.filters.set(control, criterion)?;
        self.raw_values.retain(|(name, _)| name != control);
        self.raw_values.push((control.to_string(), raw.trim().to_string()));
        self.refresh()
    }

    /// Removes one chip: configured controls fall back to `Any`, ad-hoc
    /// criteria are dropped.
    pub fn clear_filter(&mut self, control: &str) -> CoreResult<()> {
        match self.config.control(control) {
            Some(def) => {
                let any = FilterCriterion::any(def.field.as_deref().unwrap_or(&def.name));
                self.filters.set(control, any)?;
            }
            None => {
                self.filters.remove(control);
            }
        }
        self.raw_values.retain(|(name, _)| name != control);
        self.refresh()
    }

    pub fn reset_filters(&mut self) -> CoreResult<()> {
        self.filters = self.config.default_filters_at(self.reference)?;
        self.raw_values.clear();
        debug!(view = %self.config.view_id, "filters reset");
        self.refresh()
    }

    pub fn reference_time(&self) -> Option<OffsetDateTime> {
        self.reference
    }

    /// Sets the instant relative controls ("last 7 days") measure from and
    /// re-resolves any that are active.
    pub fn set_reference_time(&mut self, now: OffsetDateTime) -> CoreResult<()> {
        self.reference = Some(now);
        for (name, raw) in &self.raw_values {
            if let Some(def) = self.config.control(name) {
                if def.mode == ControlMode::WithinDays {
                    self.filters.set(name, def.translate_at(raw, self.reference)?)?;
                }
            }
        }
        self.refresh()
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> CoreResult<()> {
        if let Some(spec) = &sort {
            self.config.ensure_sortable(&spec.field)?;
        }
        self.sort = sort;
        self.refresh()
    }

    pub fn click_sort_header(&mut self, field: &str) -> CoreResult<SortSpec> {
        self.config.ensure_sortable(field)?;
        let next = SortSpec::header_click(self.sort.as_ref(), field);
        self.sort = Some(next.clone());
        self.refresh()?;
        Ok(next)
    }

    /// Returns whether the record is selected afterwards.
    pub fn toggle_select(&mut self, id: &RecordId) -> CoreResult<bool> {
        if !self.source.iter().any(|r| &r.id == id) {
            return Err(CoreError::UnknownRecord(id.to_string()));
        }
        Ok(self.selection.toggle(id))
    }

    /// Header checkbox. Only visible records are ever selected.
    pub fn toggle_select_all(&mut self) -> SelectionStatus {
        let visible = self.visible_ids();
        self.selection.toggle_all(&visible)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Swaps the source collection, pruning selections whose record is gone.
    /// Returns the number of pruned ids.
    pub fn replace_source(&mut self, records: Vec<Record>) -> CoreResult<usize> {
        self.source = records;
        let before = self.selection.len();
        self.refresh()?;
        Ok(before - self.selection.len())
    }

    pub fn derived(&self) -> Vec<&Record> {
        self.pipeline.view(&self.source)
    }

    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.derived().into_iter().map(|r| r.id.clone()).collect()
    }

    pub fn selection_status(&self) -> SelectionStatus {
        self.selection.status(&self.visible_ids())
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected_ids(&self) -> Vec<RecordId> {
        self.selection.selected().cloned().collect()
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.contains(id)
    }

    pub fn active_filter_chips(&self) -> Vec<FilterChip> {
        self.filters
            .active()
            .map(|(control, criterion)| {
                let def = self.config.control(control);
                let label = def.map(|d| d.label.clone()).unwrap_or_else(|| control.to_string());
                let raw = self
                    .raw_values
                    .iter()
                    .find(|(name, _)| name == control)
                    .map(|(_, v)| v.as_str());
                let value = match (def, raw) {
                    (Some(def), Some(raw)) if !def.options.is_empty() => def.value_label(raw),
                    (_, Some(raw)) => raw.to_string(),
                    _ => criterion.describe(),
                };
                FilterChip {
                    control: control.to_string(),
                    label,
                    value,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            visible: self.pipeline.len(),
            total: self.source.len(),
            selected: self.selection.len(),
            filters_active: self.filters.active().next().is_some(),
        }
    }

    fn refresh(&mut self) -> CoreResult<()> {
        self.pipeline
            .refresh(&self.source, &self.filters, self.sort.as_ref())?;
        let pruned = self.selection.prune(self.source.iter().map(|r| &r.id));
        if pruned > 0 {
            warn!(view = %self.config.view_id, pruned, "pruned stale selections");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_json_str;

    fn cases() -> Vec<Record> {
        records_from_json_str(
            r#"[
                {"id": "case-001", "caseId": "2024-001", "crimeType": "Data Breach",
                 "status": "Active", "priority": "Critical", "investigator": "Sarah Chen",
                 "lastActivity": "2024-10-20T08:00:00Z"},
                {"id": "case-002", "caseId": "2024-002", "crimeType": "Phishing Attack",
                 "status": "Pending", "priority": "High", "investigator": "Michael Rodriguez",
                 "lastActivity": "2024-10-20T06:00:00Z"},
                {"id": "case-004", "caseId": "2024-004", "crimeType": "Financial Fraud",
                 "status": "On Hold", "priority": "High", "investigator": "Emily Watson",
                 "lastActivity": "2024-10-18T10:00:00Z"}
            ]"#,
        )
        .unwrap()
    }

    fn ids(view: &CollectionView) -> Vec<String> {
        view.derived().iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn default_sort_is_most_recent_first() {
        let view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        assert_eq!(ids(&view), ["case-001", "case-002", "case-004"]);
        assert!(!view.summary().filters_active);
    }

    #[test]
    fn dropdown_values_match_display_labels() {
        let mut view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        view.set_filter_value("status", "on_hold").unwrap();
        assert_eq!(ids(&view), ["case-004"]);
        let chips = view.active_filter_chips();
        assert_eq!(
            chips,
            vec![FilterChip {
                control: "status".to_string(),
                label: "Status".to_string(),
                value: "On Hold".to_string(),
            }]
        );
        view.clear_filter("status").unwrap();
        assert_eq!(view.summary().visible, 3);
        assert!(view.active_filter_chips().is_empty());
    }

    #[test]
    fn unknown_controls_and_unsortable_fields_are_rejected() {
        let mut view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        assert!(view.set_filter_value("region", "emea").is_err());
        assert!(view.click_sort_header("priority").is_err());
        assert!(view.toggle_select(&RecordId::new("case-999")).is_err());
    }

    #[test]
    fn select_all_respects_filters() {
        let mut view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        view.set_filter_value("priority", "high").unwrap();
        assert_eq!(view.toggle_select_all(), SelectionStatus::All);
        assert_eq!(view.selected_ids().len(), 2);
        assert!(!view.is_selected(&RecordId::new("case-001")));
        view.reset_filters().unwrap();
        assert_eq!(view.selection_status(), SelectionStatus::Some);
    }

    #[test]
    fn select_all_on_an_empty_view_keeps_hidden_selections() {
        let mut view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        view.toggle_select(&RecordId::new("case-001")).unwrap();
        view.set_filter_value("search", "no such case").unwrap();
        assert_eq!(view.summary().visible, 0);
        assert_eq!(view.toggle_select_all(), SelectionStatus::None);
        assert_eq!(view.selected_ids(), vec![RecordId::new("case-001")]);
    }

    #[test]
    fn relative_time_range_follows_the_reference_time() {
        let events = records_from_json_str(
            r#"[
                {"id": "ev-1", "type": "Analysis", "timestamp": "2024-10-19T09:00:00Z"},
                {"id": "ev-2", "type": "Interview", "timestamp": "2024-10-01T09:00:00Z"},
                {"id": "ev-3", "type": "Report", "timestamp": "2024-08-01T09:00:00Z"}
            ]"#,
        )
        .unwrap();
        let mut view = CollectionView::new(ViewConfig::investigation_timeline(), events).unwrap();
        assert!(view.set_filter_value("timeRange", "7days").is_err());

        let now = OffsetDateTime::from_unix_timestamp(1_729_425_600).unwrap(); // 2024-10-20T12:00:00Z
        view.set_reference_time(now).unwrap();
        view.set_filter_value("timeRange", "30days").unwrap();
        assert_eq!(ids(&view), ["ev-1", "ev-2"]);
        assert_eq!(view.active_filter_chips()[0].value, "Last 30 Days");

        view.set_reference_time(now + time::Duration::days(20)).unwrap();
        assert_eq!(ids(&view), ["ev-1"]);
    }

    #[test]
    fn replacing_source_prunes_stale_selection() {
        let mut view = CollectionView::new(ViewConfig::cases(), cases()).unwrap();
        view.toggle_select(&RecordId::new("case-004")).unwrap();
        view.toggle_select(&RecordId::new("case-001")).unwrap();
        let mut next = cases();
        next.retain(|r| r.id.as_str() != "case-004");
        assert_eq!(view.replace_source(next).unwrap(), 1);
        assert_eq!(view.selected_ids(), vec![RecordId::new("case-001")]);
    }
}
