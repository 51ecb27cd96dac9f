use super::filter::{apply_filters, FilterSet};
use super::sort::{compare_records, sort_records, SortSpec};
use crate::error::CoreResult;
use crate::record::Record;
use tracing::debug;

/// Filter, then sort. The order is fixed so that later stages (pagination)
/// always see the narrowed, ordered set.
pub fn derive<'a>(
    records: &'a [Record],
    filters: &FilterSet,
    sort: Option<&SortSpec>,
) -> CoreResult<Vec<&'a Record>> {
    let filtered = apply_filters(records, filters)?;
    Ok(sort_records(filtered, sort))
}

/// Memoised derivation keyed on structural equality of its three inputs.
#[derive(Debug, Default)]
pub struct DerivedViewPipeline {
    inputs: Option<(Vec<Record>, FilterSet, Option<SortSpec>)>,
    order: Vec<usize>,
}

impl DerivedViewPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes when any input differs from the previous call; returns
    /// whether a recomputation happened.
    pub fn refresh(
        &mut self,
        records: &[Record],
        filters: &FilterSet,
        sort: Option<&SortSpec>,
    ) -> CoreResult<bool> {
        if let Some((r, f, s)) = &self.inputs {
            if r.as_slice() == records && f == filters && s.as_ref() == sort {
                return Ok(false);
            }
        }
        filters.validate()?;
        let mut order: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| filters.matches(r))
            .map(|(i, _)| i)
            .collect();
        if let Some(spec) = sort {
            order.sort_by(|&a, &b| compare_records(&records[a], &records[b], spec));
        }
        debug!(
            total = records.len(),
            visible = order.len(),
            sort = sort.map(|s| s.field.as_str()).unwrap_or("none"),
            "derived view recomputed"
        );
        self.order = order;
        self.inputs = Some((records.to_vec(), filters.clone(), sort.cloned()));
        Ok(true)
    }

    /// The last derived view, resolved against `records` (the same collection
    /// passed to the last `refresh`).
    pub fn view<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        self.order.iter().filter_map(|&i| records.get(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
