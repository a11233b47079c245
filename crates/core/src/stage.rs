//! Signing stages of a cover letter.
//!
//! The stages form a single forward path with no cycles and no skipping:
//!
//! `PENDING_DEPARTMENT_CHAIR → PENDING_FACULTY_SECRETARY →
//! PENDING_STUDENT_AFFAIRS → FULLY_SIGNED`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Current position of a cover letter in the signing sequence.
///
/// The derived `Ord` follows declaration order, which is the workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    PendingDepartmentChair,
    PendingFacultySecretary,
    PendingStudentAffairs,
    FullySigned,
}

impl Stage {
    /// All stages in workflow order.
    pub const ALL: [Stage; 4] = [
        Stage::PendingDepartmentChair,
        Stage::PendingFacultySecretary,
        Stage::PendingStudentAffairs,
        Stage::FullySigned,
    ];

    /// Stage a freshly generated cover letter starts in.
    pub const INITIAL: Stage = Stage::PendingDepartmentChair;

    /// Wire name as used by the backend (`PENDING_DEPARTMENT_CHAIR`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PendingDepartmentChair => "PENDING_DEPARTMENT_CHAIR",
            Stage::PendingFacultySecretary => "PENDING_FACULTY_SECRETARY",
            Stage::PendingStudentAffairs => "PENDING_STUDENT_AFFAIRS",
            Stage::FullySigned => "FULLY_SIGNED",
        }
    }

    /// The stage that follows this one, or `None` at `FULLY_SIGNED`.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::PendingDepartmentChair => Some(Stage::PendingFacultySecretary),
            Stage::PendingFacultySecretary => Some(Stage::PendingStudentAffairs),
            Stage::PendingStudentAffairs => Some(Stage::FullySigned),
            Stage::FullySigned => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::FullySigned
    }

    /// True only when `target` is exactly one step after `self`.
    pub fn can_advance_to(self, target: Stage) -> bool {
        self.next() == Some(target)
    }

    /// The role whose signature is awaited in this stage.
    pub fn awaiting(self) -> Option<Role> {
        match self {
            Stage::PendingDepartmentChair => Some(Role::DepartmentChair),
            Stage::PendingFacultySecretary => Some(Role::FacultySecretary),
            Stage::PendingStudentAffairs => Some(Role::StudentAffairs),
            Stage::FullySigned => None,
        }
    }

    /// Whether a letter in this stage has moved past the point where `role` signs.
    ///
    /// Returns false for roles that never sign.
    pub fn is_past_signature_of(self, role: Role) -> bool {
        match role.signing_stage() {
            Some(signing_stage) => self > signing_stage,
            None => false,
        }
    }

    /// Lenient parse of a backend stage string.
    ///
    /// Accepts any casing and `-` or space in place of `_`, so
    /// `"pending-faculty-secretary"` and `"Pending Faculty Secretary"` both
    /// resolve. Unknown strings yield `None`.
    pub fn parse(raw: &str) -> Option<Stage> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
