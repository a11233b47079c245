//! Role desk: one role's view of the cover-letter workflow.
//!
//! Every body coming back from the API is reconciled before it is handed
//! out, and every mutating call is checked against the transition engine
//! first. A rejected pre-flight never reaches the network.

use gms_core::{CoverLetter, Role};
use gms_engine::{check_turn, compute_action_space, ActionSpace, Transition};
use gms_interchange::{optional_record, reconcile_list, reconcile_record, reconcile_single, Reconciled};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{ApiError, CoverLetterApi};

/// Result of a remote sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignOutcome {
    /// The transition computed locally before the request.
    pub expected: Transition,
    /// The record returned by the backend, when the response carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<Reconciled>,
}

impl SignOutcome {
    /// The backend's record when present, else the locally computed letter.
    pub fn letter(&self) -> &CoverLetter {
        self.confirmed
            .as_ref()
            .map(|r| &r.letter)
            .unwrap_or(&self.expected.letter)
    }
}

/// Cover-letter operations performed as a fixed role.
pub struct RoleDesk<A> {
    api: A,
    role: Role,
}

impl<A: CoverLetterApi> RoleDesk<A> {
    pub fn new(api: A, role: Role) -> Self {
        RoleDesk { api, role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Letters visible to this role, reconciled.
    pub async fn list(&self) -> Result<Vec<Reconciled>, ApiError> {
        let body = self.api.list(self.role).await?;
        let letters = reconcile_list(&body)?;
        tracing::debug!(role = %self.role, count = letters.len(), "listed cover letters");
        Ok(letters)
    }

    /// One letter, reconciled.
    pub async fn show(&self, entry_id: &str) -> Result<Reconciled, ApiError> {
        let body = self.api.fetch(self.role, entry_id).await?;
        Ok(reconcile_single(&body)?)
    }

    /// What this role may do with `letter` right now.
    pub fn actions(&self, letter: &CoverLetter) -> ActionSpace {
        compute_action_space(letter, self.role)
    }

    /// Sign `letter` on the backend after a local pre-flight.
    pub async fn sign(
        &self,
        letter: &CoverLetter,
        signer: &str,
        at: OffsetDateTime,
    ) -> Result<SignOutcome, ApiError> {
        let expected = gms_engine::sign(letter, self.role, signer, at)?;
        let entry_id = letter.entry_id.as_deref().ok_or(ApiError::MissingEntryId)?;

        let body = self.api.sign(self.role, entry_id).await?;
        let confirmed = optional_record(&body)?
            .map(reconcile_record)
            .transpose()?;

        if let Some(record) = &confirmed {
            if record.letter.stage != Some(expected.to) {
                tracing::warn!(
                    entry_id,
                    expected = %expected.to,
                    returned = ?record.letter.stage,
                    "backend stage differs from the computed transition"
                );
            }
        }
        tracing::info!(entry_id, role = %self.role, to = %expected.to, "remote sign accepted");

        Ok(SignOutcome {
            expected,
            confirmed,
        })
    }

    /// Reject `letter` on the backend. Allowed exactly when signing is.
    pub async fn reject(
        &self,
        letter: &CoverLetter,
        reason: &str,
    ) -> Result<Option<Reconciled>, ApiError> {
        check_turn(letter, self.role)?;
        let entry_id = letter.entry_id.as_deref().ok_or(ApiError::MissingEntryId)?;

        let body = self.api.reject(self.role, entry_id, reason).await?;
        let returned = optional_record(&body)?
            .map(reconcile_record)
            .transpose()?;

        tracing::info!(entry_id, role = %self.role, "remote reject accepted");
        Ok(returned)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
