use std::path::Path;

use gms_core::{Role, Stage};
use gms_engine::compute_action_space;
use gms_interchange::{reconcile_list, reconcile_single, ReconcileError, Reconciled};
use serde_json::Value;
use time::OffsetDateTime;

use crate::render::{self, emit};
use crate::{fail, read_json, Context};

/// A saved response: a list body or a single-record body.
pub(crate) enum Loaded {
    List(Vec<Reconciled>),
    Single(Reconciled),
}

impl Loaded {
    fn letters(&self) -> Vec<&Reconciled> {
        match self {
            Loaded::List(items) => items.iter().collect(),
            Loaded::Single(item) => vec![item],
        }
    }
}

/// Reconcile a body as a list when it has a list envelope, else as one record.
pub(crate) fn reconcile_body(body: &Value) -> Result<Loaded, ReconcileError> {
    match reconcile_list(body) {
        Ok(items) => Ok(Loaded::List(items)),
        Err(ReconcileError::MissingEnvelope { .. }) => reconcile_single(body).map(Loaded::Single),
        Err(e) => Err(e),
    }
}

fn load(file: &Path, ctx: &Context) -> Loaded {
    let body = read_json(file, ctx);
    match reconcile_body(&body) {
        Ok(loaded) => loaded,
        Err(e) => fail(&format!("error: {}: {}", file.display(), e), ctx),
    }
}

pub(crate) fn cmd_reconcile(file: &Path, ctx: &Context) {
    match load(file, ctx) {
        Loaded::List(items) => emit(&items, ctx.output, ctx.quiet, || render::list_text(&items)),
        Loaded::Single(item) => emit(&item, ctx.output, ctx.quiet, || render::letter_text(&item)),
    }
}

pub(crate) fn cmd_actions(file: &Path, role: Role, ctx: &Context) {
    let loaded = load(file, ctx);
    let spaces: Vec<_> = loaded
        .letters()
        .into_iter()
        .map(|r| compute_action_space(&r.letter, role))
        .collect();

    match loaded {
        Loaded::Single(_) => {
            let space = &spaces[0];
            emit(space, ctx.output, ctx.quiet, || render::actions_text(space));
        }
        Loaded::List(_) => emit(&spaces, ctx.output, ctx.quiet, || {
            spaces
                .iter()
                .map(render::actions_text)
                .collect::<Vec<_>>()
                .join("\n\n")
        }),
    }
}

pub(crate) fn cmd_sign(
    file: &Path,
    role: Role,
    signer: &str,
    at: OffsetDateTime,
    target: Option<Stage>,
    ctx: &Context,
) {
    let body = read_json(file, ctx);
    let reconciled = match reconcile_single(&body) {
        Ok(r) => r,
        Err(e) => fail(&format!("error: {}: {}", file.display(), e), ctx),
    };

    let result = match target {
        Some(target) => gms_engine::transition_to(&reconciled.letter, role, target, signer, at),
        None => gms_engine::sign(&reconciled.letter, role, signer, at),
    };

    match result {
        Ok(transition) => emit(&transition, ctx.output, ctx.quiet, || {
            render::transition_text(&transition)
        }),
        Err(rejection) => fail(&format!("error: {}", rejection), ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_loads_as_list() {
        let body = json!({ "data": [{ "entryId": "a" }, { "entryId": "b" }] });
        match reconcile_body(&body).unwrap() {
            Loaded::List(items) => assert_eq!(items.len(), 2),
            Loaded::Single(_) => panic!("expected a list"),
        }
    }

    #[test]
    fn record_loads_as_single() {
        let body = json!({ "success": true, "data": { "entryId": "a", "stage": "FULLY_SIGNED" } });
        match reconcile_body(&body).unwrap() {
            Loaded::Single(item) => assert_eq!(item.letter.stage, Some(Stage::FullySigned)),
            Loaded::List(_) => panic!("expected a single record"),
        }
    }

    #[test]
    fn failure_body_is_an_error() {
        let body = json!({ "success": false, "message": "Authentication required" });
        assert!(matches!(
            reconcile_body(&body),
            Err(ReconcileError::BackendFailure { .. })
        ));
    }
}
