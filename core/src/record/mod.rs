pub mod model;
pub mod value;

pub use model::{records_from_json_array, records_from_json_str, Record, RecordId};
pub use value::{collate, FieldValue};
