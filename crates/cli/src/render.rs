//! Text and JSON rendering of reconciled letters, action spaces and
//! transitions.

use gms_core::{CoverLetter, Role, Signature, SignatureStatus, UNKNOWN};
use gms_engine::{signature_badges, ActionSpace, Transition};
use gms_interchange::Reconciled;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::OutputFormat;

/// Print `value` as pretty JSON, or `text()` in text mode. Nothing when quiet.
pub(crate) fn emit<T: Serialize>(
    value: &T,
    output: OutputFormat,
    quiet: bool,
    text: impl FnOnce() -> String,
) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("serialization error: {}", e))
        ),
        OutputFormat::Text => println!("{}", text()),
    }
}

pub(crate) fn letter_text(reconciled: &Reconciled) -> String {
    let letter = &reconciled.letter;
    let student = &letter.student;
    let mut out = format!(
        "{}  {} ({})\n",
        letter.display_id(),
        student.display_name(),
        student.student_id.as_deref().unwrap_or(UNKNOWN)
    );
    if let Some(department) = &student.department {
        out.push_str(&format!("  {:<19}{}\n", "department:", department));
    }
    if let Some(gpa) = &student.gpa {
        out.push_str(&format!("  {:<19}{}\n", "gpa:", gpa));
    }
    out.push_str(&format!(
        "  {:<19}{}\n",
        "stage:",
        letter
            .stage
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    ));
    for badge in signature_badges(letter) {
        let detail = letter
            .signature(badge.role)
            .map(signature_detail)
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<19}{}{}\n",
            format!("{}:", badge.role.title().to_lowercase()),
            badge.label,
            detail
        ));
    }
    out.push_str(&format!("  {:<19}{}", "fully signed:", completion_text(letter)));
    for diagnostic in &reconciled.diagnostics {
        out.push_str(&format!("\n  ! {}", diagnostic));
    }
    out
}

fn signature_detail(sig: &Signature) -> String {
    if sig.status != SignatureStatus::Signed {
        return String::new();
    }
    let at = sig.signed_at.and_then(|t| t.format(&Rfc3339).ok());
    let parts: Vec<String> = [at, sig.signed_by.clone()].into_iter().flatten().collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn completion_text(letter: &CoverLetter) -> &'static str {
    match letter.completion.is_fully_signed {
        Some(true) => "yes",
        Some(false) => "no",
        None => UNKNOWN,
    }
}

pub(crate) fn actions_text(space: &ActionSpace) -> String {
    let mut out = format!(
        "{} as {}\n",
        space.entry_id.as_deref().unwrap_or(UNKNOWN),
        space.role
    );
    let allowed: Vec<String> = space
        .actions
        .iter()
        .map(|a| format!("{:?}", a).to_lowercase())
        .collect();
    out.push_str(&format!(
        "  allowed: {}",
        if allowed.is_empty() {
            "none".to_string()
        } else {
            allowed.join(", ")
        }
    ));
    for blocked in &space.blocked {
        out.push_str(&format!(
            "\n  blocked: {} ({})",
            format!("{:?}", blocked.kind).to_lowercase(),
            blocked.message
        ));
    }
    out
}

pub(crate) fn transition_text(t: &Transition) -> String {
    let mut out = format!(
        "Signed {} as {}: {} -> {}",
        t.letter.display_id(),
        t.role,
        t.from,
        t.to
    );
    if t.role == Role::StudentAffairs {
        out.push_str("\nCover letter is fully signed.");
    }
    out
}

pub(crate) fn list_text(letters: &[Reconciled]) -> String {
    if letters.is_empty() {
        return "No cover letters.".to_string();
    }
    letters
        .iter()
        .map(letter_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gms_core::Stage;
    use gms_interchange::reconcile_record;
    use serde_json::json;

    #[test]
    fn letter_text_shows_signatures_and_diagnostics() {
        let reconciled = reconcile_record(&json!({
            "entryId": "entry-42",
            "studentId": "20190001",
            "studentName": "Ada",
            "studentLastName": "Yilmaz",
            "stage": "PENDING_STUDENT_AFFAIRS",
            "departmentChairSigned": true,
            "departmentChairSignedAt": "2025-05-02T10:30:00Z",
            "facultySecretary": false
        }))
        .unwrap();
        let text = letter_text(&reconciled);
        assert!(text.starts_with("entry-42  Ada Yilmaz (20190001)"));
        assert!(text.contains("department chair:  Signed (2025-05-02T10:30:00Z)"));
        assert!(text.contains("faculty secretary: Not signed"));
        assert!(text.contains("  ! "));
    }

    #[test]
    fn missing_fields_render_as_unknown() {
        let reconciled = reconcile_record(&json!({})).unwrap();
        let text = letter_text(&reconciled);
        assert!(text.starts_with("Unknown  Unknown (Unknown)"));
        assert!(text.contains("stage:             Unknown"));
        assert!(text.contains("fully signed:      Unknown"));
    }

    #[test]
    fn actions_text_lists_blocked_reasons() {
        let mut letter = CoverLetter::generated("e-1", time::OffsetDateTime::UNIX_EPOCH);
        letter.stage = Some(Stage::PendingDepartmentChair);
        let space = gms_engine::compute_action_space(&letter, Role::FacultySecretary);
        let text = actions_text(&space);
        assert!(text.contains("allowed: view"));
        assert!(text.contains("blocked: sign (Department Chair has not signed yet)"));
    }
}
