use super::value::FieldValue;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// One row of a displayed collection (case, evidence item, log entry, user...).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// The `id` field is always present and renders as the record id. A
    /// caller-supplied `id` field is kept when it agrees (e.g. a numeric id)
    /// and replaced by the text id otherwise.
    pub fn new(id: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> Self {
        let id = RecordId(id.into());
        let mut fields = fields;
        if fields.get("id").map_or(true, |v| v.render() != id.0) {
            fields.insert("id".to_string(), FieldValue::Text(id.0.clone()));
        }
        Self { id, fields }
    }

    /// Like `new`, but a caller-supplied `id` field that disagrees with `id`
    /// is an error.
    pub fn try_new(id: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> CoreResult<Self> {
        let id = id.into();
        if let Some(existing) = fields.get("id") {
            if existing.render() != id {
                return Err(CoreError::InvalidRecord(format!(
                    "record {} carries a conflicting id field {}",
                    id,
                    existing.render()
                )));
            }
        }
        Ok(Self::new(id, fields))
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        if name != "id" {
            self.fields.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn from_json(v: &Value) -> CoreResult<Self> {
        let obj = v
            .as_object()
            .ok_or_else(|| CoreError::InvalidRecord("record must be a JSON object".to_string()))?;
        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => FieldValue::Number(f).render(),
                None => return Err(CoreError::InvalidRecord(format!("unrepresentable id {}", n))),
            },
            _ => {
                return Err(CoreError::InvalidRecord(
                    "record requires a non-empty string or integer id".to_string(),
                ))
            }
        };
        let mut fields = BTreeMap::new();
        for (k, raw) in obj {
            let value = FieldValue::from_json(raw)
                .map_err(|e| CoreError::InvalidRecord(format!("record {} field {}: {}", id, k, e)))?;
            if let Some(value) = value {
                fields.insert(k.clone(), value);
            }
        }
        Record::try_new(id, fields)
    }

    pub fn to_json(&self) -> Value {
        let mut out = serde_json::Map::new();
        for (k, v) in &self.fields {
            out.insert(k.clone(), v.to_json());
        }
        Value::Object(out)
    }
}

pub fn records_from_json_array(v: &Value) -> CoreResult<Vec<Record>> {
    let arr = v
        .as_array()
        .ok_or_else(|| CoreError::InvalidRecord("record collection must be a JSON array".to_string()))?;
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let rec = Record::from_json(item)?;
        if !seen.insert(rec.id.clone()) {
            return Err(CoreError::InvalidRecord(format!("duplicate record id {}", rec.id)));
        }
        out.push(rec);
    }
    Ok(out)
}

pub fn records_from_json_str(s: &str) -> CoreResult<Vec<Record>> {
    let v: Value = serde_json::from_str(s)?;
    records_from_json_array(&v)
}
