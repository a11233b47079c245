//! Generic field resolution over a loosely-shaped record.
//!
//! One resolver walks a [`FieldSpec`]'s candidate keys (nested first, then
//! flat) and hands each present value to a parser. Every canonical field of
//! the reconciler goes through here.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::fields::{FieldSpec, NESTED_KEY};

/// A raw record split into its flat part and optional nested sub-object.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    pub flat: &'a Map<String, Value>,
    pub nested: Option<&'a Map<String, Value>>,
}

impl<'a> RecordView<'a> {
    pub fn new(flat: &'a Map<String, Value>) -> Self {
        let nested = flat.get(NESTED_KEY).and_then(|v| v.as_object());
        RecordView { flat, nested }
    }

    /// Present, non-null candidate values for `spec`, in priority order.
    pub fn candidates(&self, spec: &FieldSpec) -> Vec<Hit<'a>> {
        let mut hits = Vec::new();
        if let Some(nested) = self.nested {
            for key in spec.nested {
                if let Some(value) = lookup(nested, key) {
                    hits.push(Hit {
                        field: format!("{}.{}", NESTED_KEY, key),
                        value,
                    });
                }
            }
        }
        for key in spec.flat {
            if let Some(value) = lookup(self.flat, key) {
                hits.push(Hit {
                    field: (*key).to_string(),
                    value,
                });
            }
        }
        hits
    }
}

/// Walk a dotted key through nested objects. Null counts as absent.
fn lookup<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut current = obj.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// A candidate key that was present in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'a> {
    /// Key as found, prefixed with `coverLetter.` when nested.
    pub field: String,
    pub value: &'a Value,
}

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a, T> {
    pub value: Option<T>,
    /// The candidate the value came from.
    pub source: Option<Hit<'a>>,
    /// Candidates that were present but could not be parsed.
    pub rejected: Vec<Hit<'a>>,
}

/// Resolve a field: the first candidate the parser accepts wins.
pub fn resolve<'a, T>(
    record: &RecordView<'a>,
    spec: &FieldSpec,
    parse: impl Fn(&Value) -> Option<T>,
) -> Resolved<'a, T> {
    let mut rejected = Vec::new();
    for hit in record.candidates(spec) {
        match parse(hit.value) {
            Some(value) => {
                return Resolved {
                    value: Some(value),
                    source: Some(hit),
                    rejected,
                }
            }
            None => rejected.push(hit),
        }
    }
    Resolved {
        value: None,
        source: None,
        rejected,
    }
}

// ── Boolean flags ───────────────────────────────────────────────────

/// Truthiness of a single flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    Truthy,
    Falsy,
    /// Objects and arrays: structure, not a flag. Skipped silently.
    Structural,
    /// A scalar that is neither truthy nor falsy (e.g. a display name).
    Unrecognized,
}

pub fn truth_of(value: &Value) -> Truth {
    match value {
        Value::Bool(true) => Truth::Truthy,
        Value::Bool(false) => Truth::Falsy,
        Value::Number(n) => {
            if n.as_f64().map(|f| f != 0.0).unwrap_or(false) {
                Truth::Truthy
            } else {
                Truth::Falsy
            }
        }
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "signed" => Truth::Truthy,
            "false" | "no" | "0" | "" => Truth::Falsy,
            _ => Truth::Unrecognized,
        },
        Value::Null | Value::Object(_) | Value::Array(_) => Truth::Structural,
    }
}

/// Outcome of resolving a boolean flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Flag<'a> {
    /// A truthy candidate; the first one in priority order.
    Truthy(Hit<'a>),
    /// No truthy candidate, but at least one explicit falsy value.
    Falsy(Hit<'a>),
    /// No candidate carried a usable value.
    Absent,
}

/// Resolve a boolean fact. The first truthy candidate wins even when a
/// higher-priority candidate is falsy.
pub fn resolve_flag<'a>(record: &RecordView<'a>, spec: &FieldSpec) -> (Flag<'a>, Vec<Hit<'a>>) {
    let mut first_falsy = None;
    let mut unrecognized = Vec::new();
    for hit in record.candidates(spec) {
        match truth_of(hit.value) {
            Truth::Truthy => return (Flag::Truthy(hit), unrecognized),
            Truth::Falsy => {
                if first_falsy.is_none() {
                    first_falsy = Some(hit);
                }
            }
            Truth::Structural => {}
            Truth::Unrecognized => unrecognized.push(hit),
        }
    }
    let flag = match first_falsy {
        Some(hit) => Flag::Falsy(hit),
        None => Flag::Absent,
    };
    (flag, unrecognized)
}

// ── Scalar parsers ──────────────────────────────────────────────────

/// Non-empty trimmed text; numbers are accepted and rendered as text.
pub fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-negative whole number, from a number or numeric string.
pub fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).ok();
            }
            let f = n.as_f64()?;
            if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// RFC 3339 timestamp. Offset-less date-times are taken as UTC and a bare
/// date as midnight UTC.
pub fn parse_timestamp(value: &Value) -> Option<OffsetDateTime> {
    let raw = value.as_str()?.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let naive_subsec =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, &naive_subsec)
        .or_else(|_| PrimitiveDateTime::parse(raw, &naive))
    {
        return Some(dt.assume_utc());
    }
    parse_date(value).map(|d| d.midnight().assume_utc())
}

/// Calendar date (`YYYY-MM-DD`), or the date part of a timestamp.
pub fn parse_date(value: &Value) -> Option<Date> {
    let raw = value.as_str()?.trim();
    let iso = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &iso) {
        return Some(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339).ok().map(|ts| ts.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{DEPARTMENT_CHAIR, FACULTY_SECRETARY, GPA};
    use serde_json::json;
    use time::macros::{date, datetime};

    fn view(value: &Value) -> RecordView<'_> {
        RecordView::new(value.as_object().expect("object"))
    }

    #[test]
    fn nested_candidates_come_before_flat() {
        let raw = json!({
            "departmentChairSigned": false,
            "coverLetter": { "deptChairSigned": true }
        });
        let hits = view(&raw).candidates(&DEPARTMENT_CHAIR.flag);
        let fields: Vec<&str> = hits.iter().map(|h| h.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["coverLetter.deptChairSigned", "departmentChairSigned"]
        );
    }

    #[test]
    fn null_is_absent() {
        let raw = json!({ "departmentChairSigned": null });
        assert!(view(&raw).candidates(&DEPARTMENT_CHAIR.flag).is_empty());
    }

    #[test]
    fn dotted_keys_walk_sub_objects() {
        let raw = json!({ "facultySecretary": { "signed": true, "signedBy": "Dr. Demir" } });
        let (flag, unrecognized) = resolve_flag(&view(&raw), &FACULTY_SECRETARY.flag);
        match flag {
            Flag::Truthy(hit) => assert_eq!(hit.field, "facultySecretary.signed"),
            other => panic!("expected truthy, got {:?}", other),
        }
        assert!(unrecognized.is_empty());
    }

    #[test]
    fn first_truthy_wins_over_earlier_falsy() {
        let raw = json!({ "departmentChairSigned": false, "departmentChairApproved": "true" });
        let (flag, _) = resolve_flag(&view(&raw), &DEPARTMENT_CHAIR.flag);
        match flag {
            Flag::Truthy(hit) => assert_eq!(hit.field, "departmentChairApproved"),
            other => panic!("expected truthy, got {:?}", other),
        }
    }

    #[test]
    fn explicit_false_is_falsy_not_absent() {
        let raw = json!({ "deptChairSigned": 0 });
        let (flag, _) = resolve_flag(&view(&raw), &DEPARTMENT_CHAIR.flag);
        assert!(matches!(flag, Flag::Falsy(_)));
    }

    #[test]
    fn display_name_in_flag_field_is_unrecognized() {
        let raw = json!({ "facultySecretary": "Dr. Demir" });
        let (flag, unrecognized) = resolve_flag(&view(&raw), &FACULTY_SECRETARY.flag);
        assert_eq!(flag, Flag::Absent);
        assert_eq!(unrecognized.len(), 1);
        assert_eq!(unrecognized[0].field, "facultySecretary");
    }

    #[test]
    fn resolve_skips_unparseable_candidates() {
        let raw = json!({ "gpa": "n/a", "GPA": 3.45 });
        let resolved = resolve(&view(&raw), &GPA, parse_decimal);
        assert_eq!(resolved.value, Some("3.45".parse::<Decimal>().unwrap()));
        assert_eq!(resolved.source.unwrap().field, "GPA");
        assert_eq!(resolved.rejected.len(), 1);
    }

    #[test]
    fn timestamps_accept_common_shapes() {
        assert_eq!(
            parse_timestamp(&json!("2025-05-02T10:30:00Z")),
            Some(datetime!(2025-05-02 10:30 UTC))
        );
        assert_eq!(
            parse_timestamp(&json!("2025-05-02T10:30:00.250Z")),
            Some(datetime!(2025-05-02 10:30:00.25 UTC))
        );
        assert_eq!(
            parse_timestamp(&json!("2025-05-02T10:30:00")),
            Some(datetime!(2025-05-02 10:30 UTC))
        );
        assert_eq!(
            parse_timestamp(&json!("2025-05-02")),
            Some(datetime!(2025-05-02 0:00 UTC))
        );
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(1714645800)), None);
    }

    #[test]
    fn dates_accept_date_and_timestamp() {
        assert_eq!(parse_date(&json!("2025-06-30")), Some(date!(2025 - 06 - 30)));
        assert_eq!(
            parse_date(&json!("2025-06-30T00:00:00.000Z")),
            Some(date!(2025 - 06 - 30))
        );
    }

    #[test]
    fn counts_reject_negative_and_fractional() {
        assert_eq!(parse_count(&json!(240)), Some(240));
        assert_eq!(parse_count(&json!(240.0)), Some(240));
        assert_eq!(parse_count(&json!("132")), Some(132));
        assert_eq!(parse_count(&json!(-3)), None);
        assert_eq!(parse_count(&json!(12.5)), None);
    }

    #[test]
    fn text_trims_and_accepts_numbers() {
        assert_eq!(parse_text(&json!("  CS  ")), Some("CS".to_string()));
        assert_eq!(parse_text(&json!(20190001)), Some("20190001".to_string()));
        assert_eq!(parse_text(&json!("   ")), None);
        assert_eq!(parse_text(&json!(true)), None);
    }
}
