//! Canonical cover-letter state.
//!
//! Absent data stays absent: every scalar that the backend may omit is an
//! `Option`, and every signature carries a [`SignatureStatus`] that keeps an
//! inferred signature apart from a confirmed one. Display code decides how
//! to render a gap (see [`UNKNOWN`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::role::Role;
use crate::stage::Stage;

/// Placeholder shown for values the backend did not provide.
pub const UNKNOWN: &str = "Unknown";

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// How certain the client is about a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStatus {
    /// An explicit truthy flag was present.
    Signed,
    /// No flag was present; the stage implies the signature happened.
    Inferred,
    /// An explicit falsy flag was present.
    NotSigned,
    /// No flag and nothing to infer from.
    #[default]
    Unknown,
}

impl SignatureStatus {
    pub fn is_signed(self) -> bool {
        matches!(self, SignatureStatus::Signed | SignatureStatus::Inferred)
    }
}

/// One role's signature on a cover letter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub status: SignatureStatus,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
}

impl Signature {
    /// A confirmed signature. Timestamp and signer may still be missing.
    pub fn signed(signed_at: Option<OffsetDateTime>, signed_by: Option<String>) -> Self {
        Signature {
            status: SignatureStatus::Signed,
            signed_at,
            signed_by,
        }
    }

    /// A signature derived from the stage. Never carries a timestamp or signer.
    pub fn inferred() -> Self {
        Signature {
            status: SignatureStatus::Inferred,
            signed_at: None,
            signed_by: None,
        }
    }

    pub fn not_signed() -> Self {
        Signature {
            status: SignatureStatus::NotSigned,
            signed_at: None,
            signed_by: None,
        }
    }

    pub fn unknown() -> Self {
        Signature::default()
    }

    /// Signed explicitly or by inference.
    pub fn is_signed(&self) -> bool {
        self.status.is_signed()
    }

    /// Signed by an explicit flag, not by inference.
    pub fn is_confirmed(&self) -> bool {
        self.status == SignatureStatus::Signed
    }
}

/// Student attributes printed on the cover letter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Grade point average on a 0–4 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<Decimal>,
    #[serde(
        default,
        with = "iso_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub graduation_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_earned: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudentRecord {
    /// "First Last", whichever parts exist, or [`UNKNOWN`].
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            UNKNOWN.to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Overall completion markers as reported by the backend.
///
/// Kept separate from the per-stage signatures; the two may disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fully_signed: Option<bool>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
}

/// The canonical, role-agnostic state of one cover letter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    /// Backend identifier used in `/cover-letters/{entryId}` paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default)]
    pub student: StudentRecord,
    /// `None` when the backend sent no stage or one this client does not know.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub department_chair: Signature,
    /// Signature of the faculty secretary. The backend's flat `facultySecretary`
    /// field is this signature's flag, not a name.
    #[serde(default)]
    pub faculty_secretary: Signature,
    #[serde(default)]
    pub student_affairs: Signature,
    #[serde(default)]
    pub completion: Completion,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl CoverLetter {
    /// A freshly generated letter: initial stage, nobody has signed.
    pub fn generated(entry_id: impl Into<String>, created_at: OffsetDateTime) -> Self {
        CoverLetter {
            entry_id: Some(entry_id.into()),
            student: StudentRecord::default(),
            stage: Some(Stage::INITIAL),
            department_chair: Signature::not_signed(),
            faculty_secretary: Signature::not_signed(),
            student_affairs: Signature::not_signed(),
            completion: Completion {
                is_fully_signed: Some(false),
                completed_at: None,
            },
            created_at: Some(created_at),
        }
    }

    /// The signature slot belonging to `role`, if the role signs.
    pub fn signature(&self, role: Role) -> Option<&Signature> {
        match role {
            Role::DepartmentChair => Some(&self.department_chair),
            Role::FacultySecretary => Some(&self.faculty_secretary),
            Role::StudentAffairs => Some(&self.student_affairs),
            _ => None,
        }
    }

    pub fn signature_mut(&mut self, role: Role) -> Option<&mut Signature> {
        match role {
            Role::DepartmentChair => Some(&mut self.department_chair),
            Role::FacultySecretary => Some(&mut self.faculty_secretary),
            Role::StudentAffairs => Some(&mut self.student_affairs),
            _ => None,
        }
    }

    /// Identifier for display, falling back to [`UNKNOWN`].
    pub fn display_id(&self) -> &str {
        self.entry_id.as_deref().unwrap_or(UNKNOWN)
    }

    /// Whether the backend reported the letter complete.
    pub fn is_fully_signed(&self) -> bool {
        self.completion.is_fully_signed == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn inferred_counts_as_signed_but_not_confirmed() {
        let sig = Signature::inferred();
        assert!(sig.is_signed());
        assert!(!sig.is_confirmed());
        assert!(sig.signed_at.is_none());
    }

    #[test]
    fn unknown_and_not_signed_are_unsigned() {
        assert!(!Signature::unknown().is_signed());
        assert!(!Signature::not_signed().is_signed());
        assert_ne!(Signature::unknown(), Signature::not_signed());
    }

    #[test]
    fn signed_without_timestamp_is_representable() {
        let sig = Signature::signed(None, None);
        assert!(sig.is_confirmed());
        assert!(sig.signed_at.is_none());
    }

    #[test]
    fn generated_letter_starts_at_initial_stage() {
        let letter = CoverLetter::generated("e-1", datetime!(2025-05-01 09:00 UTC));
        assert_eq!(letter.stage, Some(Stage::PendingDepartmentChair));
        for role in Role::SIGNERS {
            assert!(!letter.signature(role).unwrap().is_signed());
        }
        assert!(!letter.is_fully_signed());
        assert!(letter.signature(Role::Advisor).is_none());
    }

    #[test]
    fn display_name_uses_placeholder_when_empty() {
        let mut student = StudentRecord::default();
        assert_eq!(student.display_name(), UNKNOWN);
        student.last_name = Some("Yilmaz".into());
        assert_eq!(student.display_name(), "Yilmaz");
        student.first_name = Some("Ada".into());
        assert_eq!(student.display_name(), "Ada Yilmaz");
    }

    #[test]
    fn serializes_with_camel_case_and_rfc3339() {
        let mut letter = CoverLetter::generated("e-9", datetime!(2025-05-01 09:00 UTC));
        letter.student.graduation_date = Some(date!(2025 - 06 - 30));
        letter.department_chair =
            Signature::signed(Some(datetime!(2025-05-02 10:30 UTC)), Some("Dr. Kaya".into()));

        let json = serde_json::to_value(&letter).unwrap();
        assert_eq!(json["entryId"], "e-9");
        assert_eq!(json["stage"], "PENDING_DEPARTMENT_CHAIR");
        assert_eq!(json["student"]["graduationDate"], "2025-06-30");
        assert_eq!(json["departmentChair"]["status"], "signed");
        assert_eq!(
            json["departmentChair"]["signedAt"],
            "2025-05-02T10:30:00Z"
        );
        assert_eq!(json["facultySecretary"]["status"], "not_signed");

        let back: CoverLetter = serde_json::from_value(json).unwrap();
        assert_eq!(back, letter);
    }
}
