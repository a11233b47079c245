//! Action space: what a role may do with a cover letter right now.

use gms_core::{CoverLetter, Role, Signature, SignatureStatus, Stage};
use serde::Serialize;

use crate::transition::{check_turn, Rejection};

/// An action a dashboard can offer on a cover letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    View,
    Sign,
    Reject,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::View, ActionKind::Sign, ActionKind::Reject];
}

/// Why an action is not offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum BlockedReason {
    /// The role's dashboard does not show cover letters.
    NotAWorkflowParticipant,
    /// The workflow ordering forbids it.
    Workflow(Rejection),
}

/// An action that exists but is not currently available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedAction {
    pub kind: ActionKind,
    pub reason: BlockedReason,
    /// User-facing explanation.
    pub message: String,
}

/// How a signature should be badged in a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureBadge {
    pub role: Role,
    pub status: SignatureStatus,
    pub label: &'static str,
}

/// Everything a role's dashboard needs to render a letter's controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSpace {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub actions: Vec<ActionKind>,
    pub blocked: Vec<BlockedAction>,
    pub signatures: Vec<SignatureBadge>,
}

impl ActionSpace {
    pub fn allows(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }

    /// The rejection blocking `kind`, if it is blocked by the workflow.
    pub fn rejection(&self, kind: ActionKind) -> Option<&Rejection> {
        self.blocked.iter().find_map(|b| match &b.reason {
            BlockedReason::Workflow(r) if b.kind == kind => Some(r),
            _ => None,
        })
    }
}

/// Compute the action space for `role` on `letter`.
///
/// Pure function. No IO. Answers: "what can this role do right now, and
/// why not the rest?"
pub fn compute_action_space(letter: &CoverLetter, role: Role) -> ActionSpace {
    let mut actions = Vec::new();
    let mut blocked = Vec::new();

    if !role.participates_in_workflow() {
        for kind in ActionKind::ALL {
            blocked.push(BlockedAction {
                kind,
                reason: BlockedReason::NotAWorkflowParticipant,
                message: format!("{} dashboards do not handle cover letters", role),
            });
        }
    } else {
        actions.push(ActionKind::View);
        match check_turn(letter, role) {
            Ok(_) => {
                actions.push(ActionKind::Sign);
                actions.push(ActionKind::Reject);
            }
            Err(rejection) => {
                for kind in [ActionKind::Sign, ActionKind::Reject] {
                    blocked.push(BlockedAction {
                        kind,
                        message: rejection.to_string(),
                        reason: BlockedReason::Workflow(rejection.clone()),
                    });
                }
            }
        }
    }

    ActionSpace {
        role,
        entry_id: letter.entry_id.clone(),
        stage: letter.stage,
        actions,
        blocked,
        signatures: signature_badges(letter),
    }
}

/// Badge for each signer, in signing order.
pub fn signature_badges(letter: &CoverLetter) -> Vec<SignatureBadge> {
    Role::SIGNERS
        .iter()
        .filter_map(|&role| {
            letter.signature(role).map(|sig| SignatureBadge {
                role,
                status: sig.status,
                label: badge_label(sig),
            })
        })
        .collect()
}

fn badge_label(sig: &Signature) -> &'static str {
    match sig.status {
        SignatureStatus::Signed => "Signed",
        SignatureStatus::Inferred => "Signed (inferred from stage)",
        SignatureStatus::NotSigned => "Not signed",
        SignatureStatus::Unknown => "Unknown",
    }
}
