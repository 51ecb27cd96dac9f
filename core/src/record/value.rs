use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use std::cmp::Ordering;
use time::format_description::{self, well_known::Rfc3339};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A primitive field value carried by a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(Date),
    DateTime(OffsetDateTime),
    Bool(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Converts a JSON scalar. `null` yields `None`; arrays and objects are rejected.
    pub fn from_json(v: &Value) -> CoreResult<Option<Self>> {
        match v {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(FieldValue::Bool(*b))),
            Value::Number(n) => n
                .as_f64()
                .map(|f| Some(FieldValue::Number(f)))
                .ok_or_else(|| CoreError::InvalidRecord(format!("unrepresentable number {}", n))),
            Value::String(s) => Ok(Some(FieldValue::parse_text(s))),
            Value::Array(_) | Value::Object(_) => Err(CoreError::InvalidRecord(
                "field values must be scalars".to_string(),
            )),
        }
    }

    /// Infers a date or date-time from text, falling back to `Text`.
    pub fn parse_text(s: &str) -> Self {
        let t = s.trim();
        if let Some(d) = parse_calendar_date(t) {
            return FieldValue::Date(d);
        }
        if let Ok(dt) = OffsetDateTime::parse(t, &Rfc3339) {
            return FieldValue::DateTime(dt);
        }
        if let Some(dt) = parse_naive_datetime(t) {
            return FieldValue::DateTime(dt);
        }
        if let Some(v) = parse_display_date(t) {
            return v;
        }
        FieldValue::Text(s.to_string())
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            other => Value::String(other.render()),
        }
    }

    /// Canonical textual rendering, used for substring search and export.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Date(d) => format_date(*d),
            FieldValue::DateTime(dt) => dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string()),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Date(_) | FieldValue::DateTime(_) => "date",
            FieldValue::Bool(_) => "bool",
        }
    }

    fn instant(&self) -> Option<OffsetDateTime> {
        match self {
            FieldValue::Date(d) => Some(d.midnight().assume_utc()),
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Number(_) => 0,
            FieldValue::Date(_) | FieldValue::DateTime(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Bool(_) => 3,
        }
    }

    /// Ordering between values of the same kind; `None` when the kinds differ.
    pub fn compare_same_kind(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.total_cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(collate(a, b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (a, b) => match (a.instant(), b.instant()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            },
        }
    }

    /// Total order over all values: same-kind values compare naturally,
    /// mixed kinds order by number < date < text < bool.
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        self.compare_same_kind(other)
            .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank()))
    }

    /// Equality used by `equals` criteria. Mixed kinds compare by rendering.
    pub fn matches_exactly(&self, other: &FieldValue, case_normalized: bool) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => text_eq(a, b, case_normalized),
            _ => match self.compare_same_kind(other) {
                Some(ord) => ord == Ordering::Equal,
                None => text_eq(&self.render(), &other.render(), case_normalized),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Date> for FieldValue {
    fn from(d: Date) -> Self {
        FieldValue::Date(d)
    }
}

fn text_eq(a: &str, b: &str, case_normalized: bool) -> bool {
    if case_normalized {
        normalize_token(a) == normalize_token(b)
    } else {
        a == b
    }
}

/// Lower-cases and folds `_`/`-` to spaces so `on_hold` matches `On Hold`.
pub fn normalize_token(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

fn collation_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-aware string ordering: accent- and case-insensitive primary key,
/// raw code-point order as the tiebreak.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

fn parse_calendar_date(s: &str) -> Option<Date> {
    if s.len() != 10 || s.as_bytes()[4] != b'-' || s.as_bytes()[7] != b'-' {
        return None;
    }
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u8 = s.get(5..7)?.parse().ok()?;
    let day: u8 = s.get(8..10)?.parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

// `YYYY-MM-DDTHH:MM[:SS]` without an offset is read as UTC.
fn parse_naive_datetime(s: &str) -> Option<OffsetDateTime> {
    let (date_part, time_part) = s.split_once('T').or_else(|| s.split_once(' '))?;
    let date = parse_calendar_date(date_part)?;
    let mut parts = time_part.split(':');
    let hour: u8 = parts.next()?.parse().ok()?;
    let minute: u8 = parts.next()?.parse().ok()?;
    let second: u8 = match parts.next() {
        Some(sec) => sec.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

const DISPLAY_DATE: &str = "[month repr:short] [day padding:none], [year]";
const DISPLAY_DATETIME: &str =
    "[month repr:short] [day padding:none], [year] [hour repr:12 padding:none]:[minute] [period]";

// `Oct 13, 2024` and `Oct 13, 2024 09:15 AM`, as the evidence and custody
// screens display them. Date-times are read as UTC.
fn parse_display_date(s: &str) -> Option<FieldValue> {
    if !s.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let date_only = format_description::parse(DISPLAY_DATE).ok()?;
    if let Ok(d) = Date::parse(s, date_only.as_slice()) {
        return Some(FieldValue::Date(d));
    }
    let with_time = format_description::parse(DISPLAY_DATETIME).ok()?;
    PrimitiveDateTime::parse(s, with_time.as_slice())
        .ok()
        .map(|dt| FieldValue::DateTime(dt.assume_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_dates_from_text() {
        assert!(matches!(FieldValue::parse_text("2024-10-10"), FieldValue::Date(_)));
        assert!(matches!(
            FieldValue::parse_text("2024-10-20T10:15:08"),
            FieldValue::DateTime(_)
        ));
        assert!(matches!(
            FieldValue::parse_text("2024-10-20T10:15:08Z"),
            FieldValue::DateTime(_)
        ));
        assert!(matches!(FieldValue::parse_text("2024-001"), FieldValue::Text(_)));
        assert!(matches!(FieldValue::parse_text("2024-13-01"), FieldValue::Text(_)));
    }

    #[test]
    fn infers_display_dates() {
        assert_eq!(
            FieldValue::parse_text("Oct 13, 2024"),
            FieldValue::Date(Date::from_calendar_date(2024, Month::October, 13).unwrap())
        );
        assert_eq!(
            FieldValue::parse_text("Sep 3, 2024"),
            FieldValue::Date(Date::from_calendar_date(2024, Month::September, 3).unwrap())
        );
        let custody = FieldValue::parse_text("Oct 13, 2024 09:15 PM");
        assert_eq!(custody.render(), "2024-10-13T21:15:00Z");
        assert!(matches!(FieldValue::parse_text("Oct 13, 2024 9:05 AM"), FieldValue::DateTime(_)));
        assert!(matches!(FieldValue::parse_text("Oct 32, 2024"), FieldValue::Text(_)));
        assert!(matches!(FieldValue::parse_text("October 13, 2024"), FieldValue::Text(_)));
        assert!(matches!(FieldValue::parse_text("Network Log"), FieldValue::Text(_)));
    }

    #[test]
    fn date_and_datetime_compare_chronologically() {
        let d = FieldValue::parse_text("2024-10-10");
        let dt = FieldValue::parse_text("2024-10-09T23:59:00Z");
        assert_eq!(d.total_cmp(&dt), Ordering::Greater);
    }

    #[test]
    fn collation_ignores_case_and_accents() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("éclair", "Eclipse"), Ordering::Less);
        assert_ne!(collate("a", "A"), Ordering::Equal);
    }

    #[test]
    fn normalized_equality_folds_separators() {
        let a = FieldValue::text("On Hold");
        let b = FieldValue::text("on_hold");
        assert!(a.matches_exactly(&b, true));
        assert!(!a.matches_exactly(&b, false));
    }

    #[test]
    fn mixed_kinds_fall_back_to_rendered_text() {
        let n = FieldValue::Number(42.0);
        assert!(n.matches_exactly(&FieldValue::text("42"), false));
        assert_eq!(n.render(), "42");
        assert_eq!(FieldValue::Number(1.5).render(), "1.5");
    }

    #[test]
    fn rejects_nested_values() {
        assert!(FieldValue::from_json(&serde_json::json!([1, 2])).is_err());
        assert!(FieldValue::from_json(&Value::Null).unwrap().is_none());
    }
}
