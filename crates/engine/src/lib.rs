//! gms-engine: cover-letter stage transitions and per-role action space.
//!
//! The engine encodes the ordering contract of the signing workflow:
//! Department Chair, then Faculty Secretary, then Student Affairs, one
//! step at a time. It is used for pre-flight validation and UI gating;
//! the backend remains authoritative for the real transition.

pub mod actions;
pub mod transition;

pub use actions::{
    compute_action_space, signature_badges, ActionKind, ActionSpace, BlockedAction,
    BlockedReason, SignatureBadge,
};
pub use transition::{check_turn, sign, transition_to, Rejection, Transition, Turn};
