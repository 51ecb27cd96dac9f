use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    CSV,
    JSON,
}

impl ExportFormat {
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::CSV),
            "json" => Ok(ExportFormat::JSON),
            other => Err(CoreError::InvalidInput(format!("unsupported export format {}", other))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::CSV => "csv",
            ExportFormat::JSON => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub row_count: usize,
    pub sha256: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Serialises the derived view. `columns` fixes the CSV header and the JSON
/// keys; absent fields export as empty cells / `null`.
pub fn export_view(records: &[&Record], columns: &[String], format: ExportFormat) -> CoreResult<ExportOutcome> {
    if columns.is_empty() {
        return Err(CoreError::InvalidInput("export requires at least one column".to_string()));
    }
    let bytes = match format {
        ExportFormat::CSV => render_csv(records, columns)?,
        ExportFormat::JSON => render_json(records, columns)?,
    };
    Ok(ExportOutcome {
        format,
        row_count: records.len(),
        sha256: sha256_hex(&bytes),
        bytes,
    })
}

fn render_csv(records: &[&Record], columns: &[String]) -> CoreResult<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(columns)?;
    for r in records {
        w.write_record(columns.iter().map(|c| r.get(c).map(|v| v.render()).unwrap_or_default()))?;
    }
    w.into_inner()
        .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

fn render_json(records: &[&Record], columns: &[String]) -> CoreResult<Vec<u8>> {
    let rows: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            let mut row = serde_json::Map::new();
            for c in columns {
                let v = r.get(c).map(|v| v.to_json()).unwrap_or(serde_json::Value::Null);
                row.insert(c.clone(), v);
            }
            serde_json::Value::Object(row)
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_embedded_commas() {
        let r = Record::new("e1", Default::default()).with_field("name", "disk, image");
        let out = export_view(&[&r], &["id".to_string(), "name".to_string(), "size".to_string()], ExportFormat::CSV)
            .unwrap();
        let text = String::from_utf8(out.bytes).unwrap();
        assert_eq!(text, "id,name,size\ne1,\"disk, image\",\n");
        assert_eq!(out.row_count, 1);
    }

    #[test]
    fn rejects_empty_column_list() {
        assert!(export_view(&[], &[], ExportFormat::JSON).is_err());
        assert!(ExportFormat::parse("pdf").is_err());
    }
}
