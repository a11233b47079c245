//! Declarative field priority lists.
//!
//! Each canonical field names the payload keys that may carry it, in
//! priority order. Keys under [`NESTED_KEY`] are always consulted before
//! keys on the flat record. Dotted keys (`student.id`) walk into
//! sub-objects.

use gms_core::Role;

/// Sub-object some endpoints use to carry the cover-letter part of a record.
pub const NESTED_KEY: &str = "coverLetter";

/// Candidate keys for one canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical name, used in diagnostics.
    pub canonical: &'static str,
    /// Keys looked up inside the nested `coverLetter` object, in order.
    pub nested: &'static [&'static str],
    /// Keys looked up on the flat record, in order.
    pub flat: &'static [&'static str],
}

/// Field specs for one signing role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureFields {
    pub role: Role,
    pub flag: FieldSpec,
    pub signed_at: FieldSpec,
    pub signed_by: FieldSpec,
}

// ── Identity and stage ──────────────────────────────────────────────

pub const ENTRY_ID: FieldSpec = FieldSpec {
    canonical: "entryId",
    nested: &["entryId"],
    flat: &["entryId", "entry_id"],
};

/// Legacy alias of [`ENTRY_ID`]; only consulted when no `entryId` exists.
pub const LEGACY_ID: FieldSpec = FieldSpec {
    canonical: "id",
    nested: &["id"],
    flat: &["id", "_id"],
};

pub const STAGE: FieldSpec = FieldSpec {
    canonical: "stage",
    nested: &["stage", "currentStage"],
    flat: &["stage", "currentStage", "signingStage"],
};

// ── Signatures ──────────────────────────────────────────────────────

const CHAIR_FLAG: &[&str] = &[
    "departmentChairSigned",
    "deptChairSigned",
    "departmentChairApproved",
    "isSignedByDepartmentChair",
    "departmentChair.signed",
];

const FACULTY_SECRETARY_FLAG: &[&str] = &[
    "facultySecretary",
    "facultySecretarySigned",
    "facultySecretaryApproved",
    "isSignedByFacultySecretary",
    "facultySecretary.signed",
];

const STUDENT_AFFAIRS_FLAG: &[&str] = &[
    "studentAffairsSigned",
    "studentAffairsApproved",
    "isSignedByStudentAffairs",
    "studentAffairs.signed",
];

pub const DEPARTMENT_CHAIR: SignatureFields = SignatureFields {
    role: Role::DepartmentChair,
    flag: FieldSpec {
        canonical: "departmentChairSigned",
        nested: CHAIR_FLAG,
        flat: CHAIR_FLAG,
    },
    signed_at: FieldSpec {
        canonical: "departmentChairSignedAt",
        nested: &["departmentChairSignedAt", "deptChairSignedAt", "departmentChair.signedAt"],
        flat: &["departmentChairSignedAt", "deptChairSignedAt", "departmentChair.signedAt"],
    },
    signed_by: FieldSpec {
        canonical: "departmentChairSignedBy",
        nested: &["departmentChairSignedBy", "deptChairSignedBy", "departmentChair.signedBy"],
        flat: &["departmentChairSignedBy", "deptChairSignedBy", "departmentChair.signedBy"],
    },
};

pub const FACULTY_SECRETARY: SignatureFields = SignatureFields {
    role: Role::FacultySecretary,
    flag: FieldSpec {
        canonical: "facultySecretary",
        nested: FACULTY_SECRETARY_FLAG,
        flat: FACULTY_SECRETARY_FLAG,
    },
    signed_at: FieldSpec {
        canonical: "facultySecretarySignedAt",
        nested: &["facultySecretarySignedAt", "facultySecretary.signedAt"],
        flat: &["facultySecretarySignedAt", "facultySecretary.signedAt"],
    },
    signed_by: FieldSpec {
        canonical: "facultySecretarySignedBy",
        nested: &["facultySecretarySignedBy", "facultySecretary.signedBy"],
        flat: &["facultySecretarySignedBy", "facultySecretary.signedBy"],
    },
};

pub const STUDENT_AFFAIRS: SignatureFields = SignatureFields {
    role: Role::StudentAffairs,
    flag: FieldSpec {
        canonical: "studentAffairsSigned",
        nested: STUDENT_AFFAIRS_FLAG,
        flat: STUDENT_AFFAIRS_FLAG,
    },
    signed_at: FieldSpec {
        canonical: "studentAffairsSignedAt",
        nested: &["studentAffairsSignedAt", "studentAffairs.signedAt"],
        flat: &["studentAffairsSignedAt", "studentAffairs.signedAt"],
    },
    signed_by: FieldSpec {
        canonical: "studentAffairsSignedBy",
        nested: &["studentAffairsSignedBy", "studentAffairs.signedBy"],
        flat: &["studentAffairsSignedBy", "studentAffairs.signedBy"],
    },
};

/// Signature field specs in signing order.
pub const SIGNATURES: [SignatureFields; 3] = [DEPARTMENT_CHAIR, FACULTY_SECRETARY, STUDENT_AFFAIRS];

/// Signers whose flag may be inferred from the stage when absent.
pub const INFERABLE_SIGNERS: [Role; 2] = [Role::DepartmentChair, Role::FacultySecretary];

// ── Completion ──────────────────────────────────────────────────────

pub const IS_FULLY_SIGNED: FieldSpec = FieldSpec {
    canonical: "isFullySigned",
    nested: &["isFullySigned", "fullySigned"],
    flat: &["isFullySigned", "fullySigned"],
};

pub const COMPLETED_AT: FieldSpec = FieldSpec {
    canonical: "completedAt",
    nested: &["completedAt", "fullySignedAt"],
    flat: &["completedAt", "fullySignedAt"],
};

pub const CREATED_AT: FieldSpec = FieldSpec {
    canonical: "createdAt",
    nested: &["createdAt", "generatedAt"],
    flat: &["createdAt", "generatedAt"],
};

// ── Student ─────────────────────────────────────────────────────────

pub const STUDENT_ID: FieldSpec = FieldSpec {
    canonical: "studentId",
    nested: &["studentId"],
    flat: &["studentId", "studentNumber", "student.studentId", "student.id"],
};

pub const STUDENT_NAME: FieldSpec = FieldSpec {
    canonical: "studentName",
    nested: &["studentName"],
    flat: &["studentName", "firstName", "student.name", "student.firstName"],
};

pub const STUDENT_LAST_NAME: FieldSpec = FieldSpec {
    canonical: "studentLastName",
    nested: &["studentLastName"],
    flat: &["studentLastName", "lastName", "surname", "student.lastName"],
};

pub const GPA: FieldSpec = FieldSpec {
    canonical: "gpa",
    nested: &["gpa"],
    flat: &["gpa", "GPA", "student.gpa"],
};

pub const GRADUATION_DATE: FieldSpec = FieldSpec {
    canonical: "graduationDate",
    nested: &["graduationDate"],
    flat: &["graduationDate", "expectedGraduationDate"],
};

pub const DEPARTMENT: FieldSpec = FieldSpec {
    canonical: "department",
    nested: &["department"],
    flat: &["department", "departmentName", "student.department"],
};

pub const CREDITS_EARNED: FieldSpec = FieldSpec {
    canonical: "creditsEarned",
    nested: &["creditsEarned"],
    flat: &["creditsEarned", "totalCredits", "credits"],
};

pub const NOTES: FieldSpec = FieldSpec {
    canonical: "notes",
    nested: &["notes"],
    flat: &["notes", "note"],
};

/// Signature field specs for `role`, if it signs.
pub fn signature_fields(role: Role) -> Option<&'static SignatureFields> {
    SIGNATURES.iter().find(|f| f.role == role)
}
