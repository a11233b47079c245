//! Payload reconciliation: one raw record in, one canonical state out.

use gms_core::{Completion, CoverLetter, Role, Signature, Stage, StudentRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::diagnostic::Diagnostic;
use crate::fields::{self, FieldSpec, SignatureFields, INFERABLE_SIGNERS};
use crate::resolve::{
    parse_count, parse_date, parse_decimal, parse_text, parse_timestamp, resolve, resolve_flag,
    Flag, Hit, RecordView, Resolved,
};
use crate::ReconcileError;

/// A canonical cover letter together with what the reconciler noticed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub letter: CoverLetter,
    pub diagnostics: Vec<Diagnostic>,
}

impl Reconciled {
    /// No contradictions or unreadable values were found.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Reconcile one raw record.
///
/// Never fails for missing or odd fields; gaps become `None` or
/// [`gms_core::SignatureStatus::Unknown`]. Fails only when `raw` is not a
/// JSON object at all.
pub fn reconcile_record(raw: &Value) -> Result<Reconciled, ReconcileError> {
    let obj = raw.as_object().ok_or(ReconcileError::NotAnObject {
        found: json_kind(raw),
    })?;
    let record = RecordView::new(obj);
    let mut diagnostics = Vec::new();

    let entry_id = resolve_identifier(&record, &mut diagnostics);
    let stage = resolve_stage(&record, &mut diagnostics);
    let student = resolve_student(&record, &mut diagnostics);

    let department_chair =
        resolve_signature(&record, &fields::DEPARTMENT_CHAIR, stage, &mut diagnostics);
    let faculty_secretary =
        resolve_signature(&record, &fields::FACULTY_SECRETARY, stage, &mut diagnostics);
    let student_affairs =
        resolve_signature(&record, &fields::STUDENT_AFFAIRS, stage, &mut diagnostics);

    let completion = resolve_completion(&record, stage, &mut diagnostics);
    let created_at = scalar(&record, &fields::CREATED_AT, parse_timestamp, &mut diagnostics);

    let letter = CoverLetter {
        entry_id,
        student,
        stage,
        department_chair,
        faculty_secretary,
        student_affairs,
        completion,
        created_at,
    };

    tracing::debug!(
        entry_id = letter.display_id(),
        raw_keys = ?obj.keys().collect::<Vec<_>>(),
        nested = record.nested.is_some(),
        stage = ?letter.stage,
        department_chair = ?letter.department_chair.status,
        faculty_secretary = ?letter.faculty_secretary.status,
        student_affairs = ?letter.student_affairs.status,
        diagnostics = diagnostics.len(),
        "reconciled cover letter"
    );
    for diagnostic in &diagnostics {
        tracing::warn!(entry_id = letter.display_id(), %diagnostic, "inconsistent payload");
    }

    Ok(Reconciled {
        letter,
        diagnostics,
    })
}

/// Reconcile every record of a list; the first non-object element fails the batch.
pub fn reconcile_records<'a, I>(raws: I) -> Result<Vec<Reconciled>, ReconcileError>
where
    I: IntoIterator<Item = &'a Value>,
{
    raws.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            reconcile_record(raw).map_err(|e| ReconcileError::InvalidListItem {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

// ── Field groups ────────────────────────────────────────────────────

fn resolve_identifier(record: &RecordView<'_>, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    let entry_id = scalar(record, &fields::ENTRY_ID, parse_text, diagnostics);
    let legacy_id = scalar(record, &fields::LEGACY_ID, parse_text, diagnostics);
    match (entry_id, legacy_id) {
        (Some(entry_id), Some(legacy_id)) => {
            if entry_id != legacy_id {
                diagnostics.push(Diagnostic::IdentifierMismatch {
                    entry_id: entry_id.clone(),
                    legacy_id,
                });
            }
            Some(entry_id)
        }
        (Some(entry_id), None) => Some(entry_id),
        (None, legacy_id) => legacy_id,
    }
}

fn resolve_stage(record: &RecordView<'_>, diagnostics: &mut Vec<Diagnostic>) -> Option<Stage> {
    let resolved = resolve(record, &fields::STAGE, |v| v.as_str().and_then(Stage::parse));
    for hit in &resolved.rejected {
        diagnostics.push(Diagnostic::UnrecognizedStage {
            field: hit.field.clone(),
            raw: raw_text(hit.value),
        });
    }
    resolved.value
}

fn resolve_student(record: &RecordView<'_>, diagnostics: &mut Vec<Diagnostic>) -> StudentRecord {
    let gpa = scalar(record, &fields::GPA, parse_decimal, diagnostics);
    if let Some(gpa) = gpa {
        if gpa < Decimal::ZERO || gpa > Decimal::from(4) {
            diagnostics.push(Diagnostic::GpaOutOfRange {
                raw: gpa.to_string(),
            });
        }
    }

    StudentRecord {
        student_id: scalar(record, &fields::STUDENT_ID, parse_text, diagnostics),
        first_name: scalar(record, &fields::STUDENT_NAME, parse_text, diagnostics),
        last_name: scalar(record, &fields::STUDENT_LAST_NAME, parse_text, diagnostics),
        gpa,
        graduation_date: scalar(record, &fields::GRADUATION_DATE, parse_date, diagnostics),
        department: scalar(record, &fields::DEPARTMENT, parse_text, diagnostics),
        credits_earned: scalar(record, &fields::CREDITS_EARNED, parse_count, diagnostics),
        notes: scalar(record, &fields::NOTES, parse_text, diagnostics),
    }
}

/// Resolve one signer's signature, applying the stage inference rule.
///
/// The inference rule fires only when no explicit candidate exists at all;
/// an explicit falsy flag is kept and reported if the stage disagrees.
fn resolve_signature(
    record: &RecordView<'_>,
    spec: &SignatureFields,
    stage: Option<Stage>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Signature {
    let (flag, unrecognized) = resolve_flag(record, &spec.flag);
    for hit in unrecognized {
        diagnostics.push(Diagnostic::UnrecognizedFlag {
            field: hit.field,
            raw: hit.value.to_string(),
        });
    }

    let past = stage.is_some_and(|s| s.is_past_signature_of(spec.role));

    match flag {
        Flag::Truthy(_) => {
            if let Some(stage) = stage {
                if !past {
                    diagnostics.push(Diagnostic::SignedAheadOfStage {
                        role: spec.role,
                        stage,
                    });
                }
            }
            Signature::signed(
                scalar(record, &spec.signed_at, parse_timestamp, diagnostics),
                scalar(record, &spec.signed_by, parse_text, diagnostics),
            )
        }
        Flag::Falsy(_) => {
            if let (true, Some(stage)) = (past, stage) {
                diagnostics.push(Diagnostic::SignatureContradictsStage {
                    role: spec.role,
                    stage,
                });
            }
            Signature::not_signed()
        }
        Flag::Absent => {
            if past && is_inferable(spec.role) {
                Signature::inferred()
            } else {
                Signature::unknown()
            }
        }
    }
}

fn is_inferable(role: Role) -> bool {
    INFERABLE_SIGNERS.contains(&role)
}

fn resolve_completion(
    record: &RecordView<'_>,
    stage: Option<Stage>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Completion {
    let (flag, unrecognized) = resolve_flag(record, &fields::IS_FULLY_SIGNED);
    for hit in unrecognized {
        diagnostics.push(Diagnostic::UnrecognizedFlag {
            field: hit.field,
            raw: hit.value.to_string(),
        });
    }
    let is_fully_signed = match flag {
        Flag::Truthy(_) => Some(true),
        Flag::Falsy(_) => Some(false),
        Flag::Absent => None,
    };

    if let (Some(done), Some(stage)) = (is_fully_signed, stage) {
        if done != stage.is_terminal() {
            diagnostics.push(Diagnostic::CompletionContradictsStage {
                is_fully_signed: done,
                stage,
            });
        }
    }

    Completion {
        is_fully_signed,
        completed_at: scalar(record, &fields::COMPLETED_AT, parse_timestamp, diagnostics),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Resolve a scalar and report every present-but-unparseable candidate.
fn scalar<T>(
    record: &RecordView<'_>,
    spec: &FieldSpec,
    parse: impl Fn(&Value) -> Option<T>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<T> {
    let Resolved {
        value, rejected, ..
    } = resolve(record, spec, parse);
    report_rejected(&rejected, diagnostics);
    value
}

fn report_rejected(rejected: &[Hit<'_>], diagnostics: &mut Vec<Diagnostic>) {
    for hit in rejected {
        diagnostics.push(Diagnostic::UnparseableValue {
            field: hit.field.clone(),
            raw: hit.value.to_string(),
        });
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
