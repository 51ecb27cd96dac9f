use crate::error::{CoreError, CoreResult};
use crate::record::{FieldValue, Record};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum CriterionKind {
    /// Matches unconditionally ("All X" dropdown options).
    Any,
    Equals {
        value: FieldValue,
        case_normalized: bool,
    },
    /// Case-insensitive substring match on the rendered field value.
    Contains { needle: String },
    /// Inclusive bounds; a missing bound is unbounded on that side.
    Range {
        min: Option<FieldValue>,
        max: Option<FieldValue>,
    },
    /// Matches when at least one branch matches.
    AnyOf(Vec<FilterCriterion>),
}

/// A single field-level filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    pub field: String,
    pub kind: CriterionKind,
}

impl FilterCriterion {
    pub fn any(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::Any,
        }
    }

    pub fn equals(field: &str, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::Equals {
                value: value.into(),
                case_normalized: false,
            },
        }
    }

    pub fn equals_normalized(field: &str, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::Equals {
                value: value.into(),
                case_normalized: true,
            },
        }
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::Contains {
                needle: needle.to_string(),
            },
        }
    }

    pub fn range(field: &str, min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::Range { min, max },
        }
    }

    pub fn any_of(field: &str, branches: Vec<FilterCriterion>) -> Self {
        Self {
            field: field.to_string(),
            kind: CriterionKind::AnyOf(branches),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, CriterionKind::Any)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            CriterionKind::Any => "any",
            CriterionKind::Equals { .. } => "equals",
            CriterionKind::Contains { .. } => "contains",
            CriterionKind::Range { .. } => "range",
            CriterionKind::AnyOf(_) => "any_of",
        }
    }

    /// Rejects malformed criteria. These are configuration bugs and must
    /// surface instead of being skipped.
    pub fn validate(&self) -> CoreResult<()> {
        if self.field.trim().is_empty() {
            return Err(CoreError::InvalidCriterion(format!(
                "{} criterion is missing its field",
                self.kind_name()
            )));
        }
        match &self.kind {
            CriterionKind::Range {
                min: Some(lo),
                max: Some(hi),
            } => match lo.compare_same_kind(hi) {
                None => Err(CoreError::InvalidCriterion(format!(
                    "range on {} mixes {} and {} bounds",
                    self.field,
                    lo.kind_name(),
                    hi.kind_name()
                ))),
                Some(Ordering::Greater) => Err(CoreError::InvalidCriterion(format!(
                    "range on {} has min {} above max {}",
                    self.field,
                    lo.render(),
                    hi.render()
                ))),
                Some(_) => Ok(()),
            },
            CriterionKind::AnyOf(branches) => {
                if branches.is_empty() {
                    return Err(CoreError::InvalidCriterion(format!(
                        "any_of on {} has no branches",
                        self.field
                    )));
                }
                branches.iter().try_for_each(FilterCriterion::validate)
            }
            _ => Ok(()),
        }
    }

    /// Evaluates the criterion. A record lacking the field never matches.
    pub fn matches(&self, record: &Record) -> bool {
        if let CriterionKind::AnyOf(branches) = &self.kind {
            return branches.iter().any(|b| b.matches(record));
        }
        if self.is_any() {
            return true;
        }
        let Some(value) = record.get(&self.field) else {
            return false;
        };
        match &self.kind {
            CriterionKind::Equals {
                value: expected,
                case_normalized,
            } => value.matches_exactly(expected, *case_normalized),
            CriterionKind::Contains { needle } => value
                .render()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            CriterionKind::Range { min, max } => {
                let above_min = match min {
                    Some(lo) => matches!(
                        value.compare_same_kind(lo),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    None => true,
                };
                let below_max = match max {
                    Some(hi) => matches!(
                        value.compare_same_kind(hi),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    None => true,
                };
                above_min && below_max
            }
            CriterionKind::Any | CriterionKind::AnyOf(_) => true,
        }
    }

    /// Human-readable value shown on an active filter chip.
    pub fn describe(&self) -> String {
        match &self.kind {
            CriterionKind::Any => "all".to_string(),
            CriterionKind::Equals { value, .. } => value.render(),
            CriterionKind::Contains { needle } => format!("\"{}\"", needle),
            CriterionKind::Range { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("{} to {}", lo.render(), hi.render()),
                (Some(lo), None) => format!("from {}", lo.render()),
                (None, Some(hi)) => format!("until {}", hi.render()),
                (None, None) => "any".to_string(),
            },
            CriterionKind::AnyOf(branches) => branches
                .iter()
                .map(|b| format!("{} {}", b.field, b.describe()))
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    /// Parses `{ "field", "kind", "value" }`. Unknown kinds fail fast.
    pub fn from_json(v: &Value) -> CoreResult<Self> {
        let obj = v
            .as_object()
            .ok_or_else(|| CoreError::InvalidCriterion("criterion must be a JSON object".to_string()))?;
        let field = obj
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidCriterion("criterion is missing `field`".to_string()))?;
        let kind = obj
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CoreError::InvalidCriterion(format!("criterion on {} is missing `kind`", field))
            })?;
        let value = obj.get("value").cloned().unwrap_or(Value::Null);
        let value = &value;

        let criterion = match kind {
            "any" => FilterCriterion::any(field),
            "equals" => {
                let value = FieldValue::from_json(value)?.ok_or_else(|| {
                    CoreError::InvalidCriterion(format!("equals on {} requires a value", field))
                })?;
                let case_normalized = obj
                    .get("case_normalized")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                FilterCriterion {
                    field: field.to_string(),
                    kind: CriterionKind::Equals {
                        value,
                        case_normalized,
                    },
                }
            }
            "contains" => {
                let needle = value.as_str().ok_or_else(|| {
                    CoreError::InvalidCriterion(format!("contains on {} requires a string", field))
                })?;
                FilterCriterion::contains(field, needle)
            }
            "range" => {
                let bounds = value.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                    CoreError::InvalidCriterion(format!("range on {} requires [min, max]", field))
                })?;
                FilterCriterion::range(
                    field,
                    FieldValue::from_json(&bounds[0])?,
                    FieldValue::from_json(&bounds[1])?,
                )
            }
            "any_of" => {
                let branches = value.as_array().ok_or_else(|| {
                    CoreError::InvalidCriterion(format!("any_of on {} requires an array", field))
                })?;
                let branches = branches
                    .iter()
                    .map(FilterCriterion::from_json)
                    .collect::<CoreResult<Vec<_>>>()?;
                FilterCriterion::any_of(field, branches)
            }
            other => {
                return Err(CoreError::InvalidCriterion(format!(
                    "unknown criterion kind `{}` on field {}",
                    other, field
                )))
            }
        };
        criterion.validate()?;
        Ok(criterion)
    }
}

/// Active criteria keyed by filter-control name. Names are unique; setting an
/// existing control replaces its criterion in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<(String, FilterCriterion)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, control: &str, criterion: FilterCriterion) -> CoreResult<()> {
        if control.trim().is_empty() {
            return Err(CoreError::InvalidCriterion(
                "filter control name must not be empty".to_string(),
            ));
        }
        criterion.validate()?;
        match self.entries.iter_mut().find(|(name, _)| name == control) {
            Some(slot) => slot.1 = criterion,
            None => self.entries.push((control.to_string(), criterion)),
        }
        Ok(())
    }

    pub fn with(mut self, control: &str, criterion: FilterCriterion) -> CoreResult<Self> {
        self.set(control, criterion)?;
        Ok(self)
    }

    pub fn get(&self, control: &str) -> Option<&FilterCriterion> {
        self.entries
            .iter()
            .find(|(name, _)| name == control)
            .map(|(_, c)| c)
    }

    pub fn remove(&mut self, control: &str) -> Option<FilterCriterion> {
        let pos = self.entries.iter().position(|(name, _)| name == control)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCriterion)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Criteria that actually narrow the collection.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterCriterion)> {
        self.iter().filter(|(_, c)| !c.is_any())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.entries.iter().try_for_each(|(_, c)| c.validate())
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.active().all(|(_, c)| c.matches(record))
    }
}

/// Stable filter: keeps the records satisfying every non-`Any` criterion,
/// in their original relative order.
pub fn apply_filters<'a, I>(records: I, filters: &FilterSet) -> CoreResult<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    filters.validate()?;
    Ok(records.into_iter().filter(|r| filters.matches(r)).collect())
}
