//! Dashboard roles of the graduation management system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A role identity as supplied by the caller.
///
/// Roles are never authenticated here; the backend owns identity. Only the
/// three signing roles take part in the cover-letter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Student,
    Advisor,
    DepartmentSecretary,
    DepartmentChair,
    FacultySecretary,
    StudentAffairs,
    Admin,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Student,
        Role::Advisor,
        Role::DepartmentSecretary,
        Role::DepartmentChair,
        Role::FacultySecretary,
        Role::StudentAffairs,
        Role::Admin,
    ];

    /// Roles that sign, in signing order.
    pub const SIGNERS: [Role; 3] = [
        Role::DepartmentChair,
        Role::FacultySecretary,
        Role::StudentAffairs,
    ];

    /// Path segment used in `/api/{role}/...` endpoints.
    pub fn api_segment(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Advisor => "advisor",
            Role::DepartmentSecretary => "department-secretary",
            Role::DepartmentChair => "department-chair",
            Role::FacultySecretary => "faculty-secretary",
            Role::StudentAffairs => "student-affairs",
            Role::Admin => "admin",
        }
    }

    /// Human-readable title, used in user-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Advisor => "Advisor",
            Role::DepartmentSecretary => "Department Secretary",
            Role::DepartmentChair => "Department Chair",
            Role::FacultySecretary => "Faculty Secretary",
            Role::StudentAffairs => "Student Affairs",
            Role::Admin => "Admin",
        }
    }

    /// The stage in which this role signs, or `None` for non-signing roles.
    pub fn signing_stage(self) -> Option<Stage> {
        match self {
            Role::DepartmentChair => Some(Stage::PendingDepartmentChair),
            Role::FacultySecretary => Some(Stage::PendingFacultySecretary),
            Role::StudentAffairs => Some(Stage::PendingStudentAffairs),
            _ => None,
        }
    }

    pub fn is_signer(self) -> bool {
        self.signing_stage().is_some()
    }

    /// The signer whose signature must exist before this role may sign.
    pub fn prior_signer(self) -> Option<Role> {
        match self {
            Role::FacultySecretary => Some(Role::DepartmentChair),
            Role::StudentAffairs => Some(Role::FacultySecretary),
            _ => None,
        }
    }

    /// Roles whose dashboards show cover letters at all.
    pub fn participates_in_workflow(self) -> bool {
        matches!(
            self,
            Role::DepartmentSecretary
                | Role::DepartmentChair
                | Role::FacultySecretary
                | Role::StudentAffairs
                | Role::Admin
        )
    }

    /// Parse from an API segment (`faculty-secretary`) or a loose variant
    /// (`faculty_secretary`, `Faculty Secretary`).
    pub fn parse(raw: &str) -> Option<Role> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        Role::ALL
            .into_iter()
            .find(|role| role.api_segment() == normalized)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
    }
}
