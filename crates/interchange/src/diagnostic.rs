//! Findings the reconciler reports instead of silently fixing.

use std::fmt;

use gms_core::{Role, Stage};
use serde::Serialize;

/// A data-quality finding about one payload.
///
/// Diagnostics never change the reconciled state; they describe where the
/// payload contradicts itself or could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An explicit falsy flag although the stage says the role has signed.
    /// The flag is kept.
    SignatureContradictsStage { role: Role, stage: Stage },
    /// A truthy flag although the stage has not reached past the role.
    SignedAheadOfStage { role: Role, stage: Stage },
    /// `isFullySigned` disagrees with the stage.
    CompletionContradictsStage { is_fully_signed: bool, stage: Stage },
    /// `entryId` and the legacy `id` name different records.
    IdentifierMismatch { entry_id: String, legacy_id: String },
    /// A stage string this client does not know.
    UnrecognizedStage { field: String, raw: String },
    /// A flag field holding a value that is neither truthy nor falsy.
    UnrecognizedFlag { field: String, raw: String },
    /// A scalar field that could not be parsed.
    UnparseableValue { field: String, raw: String },
    /// A GPA outside the 0–4 scale. The value is kept.
    GpaOutOfRange { raw: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SignatureContradictsStage { role, stage } => write!(
                f,
                "{} flag is false but stage {} implies it was signed",
                role, stage
            ),
            Diagnostic::SignedAheadOfStage { role, stage } => write!(
                f,
                "{} flag is true but stage {} has not moved past it",
                role, stage
            ),
            Diagnostic::CompletionContradictsStage {
                is_fully_signed,
                stage,
            } => write!(
                f,
                "isFullySigned is {} but stage is {}",
                is_fully_signed, stage
            ),
            Diagnostic::IdentifierMismatch {
                entry_id,
                legacy_id,
            } => write!(
                f,
                "entryId '{}' differs from legacy id '{}'; using entryId",
                entry_id, legacy_id
            ),
            Diagnostic::UnrecognizedStage { field, raw } => {
                write!(f, "unrecognized stage '{}' in '{}'", raw, field)
            }
            Diagnostic::UnrecognizedFlag { field, raw } => {
                write!(f, "ignored non-boolean value {} in '{}'", raw, field)
            }
            Diagnostic::UnparseableValue { field, raw } => {
                write!(f, "could not parse {} in '{}'", raw, field)
            }
            Diagnostic::GpaOutOfRange { raw } => write!(f, "GPA {} is outside 0-4", raw),
        }
    }
}
