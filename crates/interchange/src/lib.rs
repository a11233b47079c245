//! gms-interchange: reconciles raw backend payloads into canonical
//! cover-letter state.
//!
//! Payloads reach the client in several shapes: signature facts flat on
//! the record or nested under `coverLetter`, under several alternate names,
//! or missing entirely. [`reconcile_record`] folds all of them into one
//! [`gms_core::CoverLetter`] using declarative priority lists
//! ([`fields`]) and a single generic resolver ([`resolve`]). When a flag is
//! missing but the stage implies it, the signature is marked
//! [`gms_core::SignatureStatus::Inferred`]. Contradictions are reported as
//! [`Diagnostic`]s, never corrected.

pub mod diagnostic;
pub mod envelope;
pub mod fields;
pub mod reconcile;
pub mod resolve;

pub use diagnostic::Diagnostic;
pub use envelope::{backend_failure, optional_record, unwrap_list, unwrap_record};
pub use reconcile::{reconcile_record, reconcile_records, Reconciled};

/// Errors for payloads that are not cover-letter shaped at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// A record was expected but the value is not a JSON object.
    #[error("expected a cover-letter object, found {found}")]
    NotAnObject { found: &'static str },

    /// An element of a list response is not a record.
    #[error("list item {index}: {source}")]
    InvalidListItem {
        index: usize,
        source: Box<ReconcileError>,
    },

    /// The body lacks the envelope that should hold the records.
    #[error("expected {expected}, found {found}")]
    MissingEnvelope {
        expected: &'static str,
        found: &'static str,
    },

    /// The backend answered with `{"success": false}`.
    #[error("backend reported failure: {message}")]
    BackendFailure { message: String },
}

/// Unwrap and reconcile a list response.
pub fn reconcile_list(body: &serde_json::Value) -> Result<Vec<Reconciled>, ReconcileError> {
    reconcile_records(unwrap_list(body)?)
}

/// Unwrap and reconcile a single-record response.
pub fn reconcile_single(body: &serde_json::Value) -> Result<Reconciled, ReconcileError> {
    reconcile_record(unwrap_record(body)?)
}
