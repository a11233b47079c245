//! Response envelopes around cover-letter records.
//!
//! Endpoints disagree on wrapping: a list may arrive bare or under `data`,
//! `coverLetters` or `items`; a single record may arrive bare or under
//! `data`. A `{"success": false}` body is a backend failure, never a record.

use serde_json::Value;

use crate::reconcile::json_kind;
use crate::ReconcileError;

const LIST_KEYS: [&str; 3] = ["data", "coverLetters", "items"];

/// Keys at least one of which a cover-letter record carries.
const RECORD_MARKERS: [&str; 6] = [
    "entryId",
    "id",
    "stage",
    "coverLetter",
    "studentId",
    "currentStage",
];

/// The failure message of a `{"success": false, ...}` body, if it is one.
pub fn backend_failure(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    if obj.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let message = ["message", "error", "detail"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or("request failed");
    Some(message.to_string())
}

/// The records of a list response.
pub fn unwrap_list(body: &Value) -> Result<&[Value], ReconcileError> {
    if let Some(message) = backend_failure(body) {
        return Err(ReconcileError::BackendFailure { message });
    }
    if let Some(items) = body.as_array() {
        return Ok(items);
    }
    if let Some(obj) = body.as_object() {
        for key in LIST_KEYS {
            match obj.get(key) {
                Some(Value::Array(items)) => return Ok(items),
                Some(Value::Object(inner)) => {
                    if let Some(Value::Array(items)) = inner.get("coverLetters") {
                        return Ok(items);
                    }
                }
                _ => {}
            }
        }
    }
    Err(ReconcileError::MissingEnvelope {
        expected: "an array of cover letters",
        found: json_kind(body),
    })
}

/// The record of a single-item response.
pub fn unwrap_record(body: &Value) -> Result<&Value, ReconcileError> {
    if let Some(message) = backend_failure(body) {
        return Err(ReconcileError::BackendFailure { message });
    }
    if let Some(inner) = body.get("data").filter(|d| d.is_object()) {
        if looks_like_record(inner) {
            return Ok(inner);
        }
    }
    if looks_like_record(body) {
        return Ok(body);
    }
    Err(ReconcileError::MissingEnvelope {
        expected: "a cover-letter record",
        found: json_kind(body),
    })
}

/// Like [`unwrap_record`] but treats "no record in the body" as `None`.
///
/// Action endpoints may answer with only a confirmation message.
pub fn optional_record(body: &Value) -> Result<Option<&Value>, ReconcileError> {
    match unwrap_record(body) {
        Ok(record) => Ok(Some(record)),
        Err(ReconcileError::MissingEnvelope { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn looks_like_record(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| RECORD_MARKERS.iter().any(|k| obj.contains_key(*k)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_a_list() {
        let body = json!([{ "entryId": "a" }, { "entryId": "b" }]);
        assert_eq!(unwrap_list(&body).unwrap().len(), 2);
    }

    #[test]
    fn list_under_known_keys() {
        for body in [
            json!({ "data": [{ "entryId": "a" }] }),
            json!({ "coverLetters": [{ "entryId": "a" }] }),
            json!({ "success": true, "items": [{ "entryId": "a" }] }),
            json!({ "data": { "coverLetters": [{ "entryId": "a" }] } }),
        ] {
            assert_eq!(unwrap_list(&body).unwrap().len(), 1, "{}", body);
        }
    }

    #[test]
    fn list_without_envelope_is_malformed() {
        let err = unwrap_list(&json!({ "total": 3 })).unwrap_err();
        assert!(matches!(err, ReconcileError::MissingEnvelope { found: "object", .. }));
        let err = unwrap_list(&json!("<html>")).unwrap_err();
        assert!(matches!(err, ReconcileError::MissingEnvelope { found: "string", .. }));
    }

    #[test]
    fn success_false_is_a_backend_failure() {
        let body = json!({ "success": false, "message": "Authentication required" });
        assert_eq!(
            unwrap_list(&body).unwrap_err(),
            ReconcileError::BackendFailure {
                message: "Authentication required".to_string()
            }
        );
        assert!(unwrap_record(&body).is_err());
        assert_eq!(backend_failure(&json!({ "success": true })), None);
    }

    #[test]
    fn record_bare_or_under_data() {
        let bare = json!({ "entryId": "a", "stage": "FULLY_SIGNED" });
        assert_eq!(unwrap_record(&bare).unwrap()["entryId"], "a");

        let wrapped = json!({ "success": true, "data": { "entryId": "b" } });
        assert_eq!(unwrap_record(&wrapped).unwrap()["entryId"], "b");
    }

    #[test]
    fn confirmation_only_body_has_no_record() {
        let body = json!({ "success": true, "message": "Cover letter signed" });
        assert_eq!(optional_record(&body).unwrap(), None);
        assert!(unwrap_record(&body).is_err());
    }
}
