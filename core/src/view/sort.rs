use crate::record::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }

    /// Column-header click: a new field starts ascending, the active field flips.
    pub fn header_click(current: Option<&SortSpec>, field: &str) -> SortSpec {
        match current {
            Some(spec) if spec.field == field => SortSpec {
                field: field.to_string(),
                direction: spec.direction.reversed(),
            },
            _ => SortSpec::asc(field),
        }
    }
}

pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    a.total_cmp(b)
}

/// Records missing the field sort after every record that has it, whatever
/// the direction.
pub fn compare_records(a: &Record, b: &Record, spec: &SortSpec) -> Ordering {
    match (a.get(&spec.field), b.get(&spec.field)) {
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Returns a new ordering of `records`; ties keep their input order.
pub fn sort_records<'a, I>(records: I, spec: Option<&SortSpec>) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out: Vec<&Record> = records.into_iter().collect();
    if let Some(spec) = spec {
        out.sort_by(|a, b| compare_records(a, b, spec));
    }
    out
}
