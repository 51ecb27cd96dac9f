pub mod collection;
pub mod filter;
pub mod pipeline;
pub mod selection;
pub mod sort;

pub use collection::{CollectionView, FilterChip, ViewSummary};
pub use filter::{apply_filters, CriterionKind, FilterCriterion, FilterSet};
pub use pipeline::{derive, DerivedViewPipeline};
pub use selection::{SelectionController, SelectionStatus};
pub use sort::{compare_records, compare_values, sort_records, SortDirection, SortSpec};
