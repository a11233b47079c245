//! gms-core: cover-letter workflow state model.
//!
//! A cover letter moves through a fixed signing sequence
//! (Department Chair → Faculty Secretary → Student Affairs). This crate
//! holds the canonical, role-agnostic shape of that state. It has no
//! behaviour beyond ordering helpers; reconciliation lives in
//! `gms-interchange` and transitions in `gms-engine`.

pub mod cover_letter;
pub mod role;
pub mod stage;

pub use cover_letter::{
    Completion, CoverLetter, Signature, SignatureStatus, StudentRecord, UNKNOWN,
};
pub use role::Role;
pub use stage::Stage;
