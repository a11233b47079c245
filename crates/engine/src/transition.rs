//! Stage transition engine.
//!
//! Signing is a role-gated state transition. A sign attempt runs through:
//! 1. Role check (only the three signers sign)
//! 2. Idempotence check (a role signs once)
//! 3. Stage check (the letter must be waiting for this role)
//! 4. Prior-signature check (the previous signer must have signed,
//!    explicitly or by inference)
//!
//! The engine does not authenticate the role; callers supply it. All
//! functions are pure: the input letter is borrowed and a new letter is
//! returned.

use std::fmt;

use gms_core::{CoverLetter, Role, Signature, Stage};
use serde::Serialize;
use time::OffsetDateTime;

// ──────────────────────────────────────────────
// Rejections
// ──────────────────────────────────────────────

/// Why a workflow action is not permitted right now.
///
/// Each variant names the precondition that failed so the caller can show
/// an accurate message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The role never signs cover letters.
    NotASigningRole { role: Role },
    /// The role's signature is already present (confirmed or inferred).
    AlreadySigned { role: Role },
    /// The letter's stage is missing or unrecognized.
    StageUnknown,
    /// The letter is fully signed; nothing further is legal.
    WorkflowComplete,
    /// The letter is not waiting for this role.
    WrongStage {
        role: Role,
        expected: Stage,
        actual: Stage,
    },
    /// The previous signer has not signed.
    PriorSignatureMissing { role: Role, prior: Role },
    /// A requested target stage is not the single next step.
    IllegalTarget { from: Stage, to: Stage },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotASigningRole { role } => {
                write!(f, "{} does not sign cover letters", role)
            }
            Rejection::AlreadySigned { .. } => write!(f, "Already signed by you"),
            Rejection::StageUnknown => write!(f, "The cover letter's stage is unknown"),
            Rejection::WorkflowComplete => write!(f, "The cover letter is already fully signed"),
            Rejection::WrongStage {
                expected, actual, ..
            } => match actual.awaiting() {
                Some(awaiting) if actual < expected => {
                    write!(f, "{} has not signed yet", awaiting)
                }
                _ => write!(
                    f,
                    "The cover letter is at {}, not {}",
                    actual, expected
                ),
            },
            Rejection::PriorSignatureMissing { prior, .. } => {
                write!(f, "{} has not signed yet", prior)
            }
            Rejection::IllegalTarget { from, to } => match from.next() {
                Some(next) => write!(
                    f,
                    "Cannot move from {} to {}; only {} is allowed",
                    from, to, next
                ),
                None => write!(f, "Cannot move from terminal stage {} to {}", from, to),
            },
        }
    }
}

impl std::error::Error for Rejection {}

// ──────────────────────────────────────────────
// Transitions
// ──────────────────────────────────────────────

/// The step a role is allowed to take: from its own stage to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub from: Stage,
    pub to: Stage,
}

/// Result of a successful sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub role: Role,
    pub from: Stage,
    pub to: Stage,
    pub signed_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub signed_at: OffsetDateTime,
    /// The letter after the transition.
    pub letter: CoverLetter,
}

/// Check whether it is `role`'s turn to act on `letter`.
///
/// Shared by sign and reject pre-flight; on success returns the step the
/// role would take.
pub fn check_turn(letter: &CoverLetter, role: Role) -> Result<Turn, Rejection> {
    // Step 1: role check
    let own_stage = role
        .signing_stage()
        .ok_or(Rejection::NotASigningRole { role })?;

    // Step 2: idempotence
    let signed = letter
        .signature(role)
        .map(Signature::is_signed)
        .unwrap_or(false);
    if signed {
        return Err(Rejection::AlreadySigned { role });
    }

    // Step 3: stage
    let stage = letter.stage.ok_or(Rejection::StageUnknown)?;
    if stage.is_terminal() {
        return Err(Rejection::WorkflowComplete);
    }
    if stage != own_stage {
        return Err(Rejection::WrongStage {
            role,
            expected: own_stage,
            actual: stage,
        });
    }

    // Step 4: prior signature
    if let Some(prior) = role.prior_signer() {
        let prior_signed = letter
            .signature(prior)
            .map(Signature::is_signed)
            .unwrap_or(false);
        if !prior_signed {
            return Err(Rejection::PriorSignatureMissing { role, prior });
        }
    }

    let to = stage.next().ok_or(Rejection::WorkflowComplete)?;
    Ok(Turn {
        role,
        from: stage,
        to,
    })
}

/// Sign `letter` as `role`.
///
/// Stamps the role's signature, advances the stage by one step and, for the
/// final signer, marks the letter fully signed.
pub fn sign(
    letter: &CoverLetter,
    role: Role,
    signer: &str,
    at: OffsetDateTime,
) -> Result<Transition, Rejection> {
    let turn = check_turn(letter, role)?;

    let mut next = letter.clone();
    if let Some(slot) = next.signature_mut(role) {
        *slot = Signature::signed(Some(at), Some(signer.to_string()));
    }
    next.stage = Some(turn.to);
    if turn.to.is_terminal() {
        next.completion.is_fully_signed = Some(true);
        next.completion.completed_at = Some(at);
    }

    tracing::info!(
        entry_id = next.display_id(),
        role = %role,
        from = %turn.from,
        to = %turn.to,
        signer,
        "cover letter signed"
    );

    Ok(Transition {
        role,
        from: turn.from,
        to: turn.to,
        signed_by: signer.to_string(),
        signed_at: at,
        letter: next,
    })
}

/// Sign, additionally requiring that the resulting stage is `target`.
///
/// Any target other than the single next stage is rejected.
pub fn transition_to(
    letter: &CoverLetter,
    role: Role,
    target: Stage,
    signer: &str,
    at: OffsetDateTime,
) -> Result<Transition, Rejection> {
    let from = letter.stage.ok_or(Rejection::StageUnknown)?;
    if !from.can_advance_to(target) {
        return Err(Rejection::IllegalTarget { from, to: target });
    }
    sign(letter, role, signer, at)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
