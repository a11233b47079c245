use std::future::Future;

use gms_client::{ApiError, HttpCoverLetterApi, RoleDesk};
use gms_core::Role;
use serde_json::json;

use crate::render::{self, emit};
use crate::{fail, Context};

/// Build a desk for `role` from configuration, or exit.
fn desk(role: Role, ctx: &Context) -> RoleDesk<HttpCoverLetterApi> {
    let config = ctx.config();
    match HttpCoverLetterApi::new(&config) {
        Ok(api) => RoleDesk::new(api, role),
        Err(e) => fail(&format!("error: {}", e), ctx),
    }
}

/// Drive one remote command to completion on a fresh runtime.
fn run<T>(ctx: &Context, fut: impl Future<Output = Result<T, ApiError>>) -> T {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(&format!("error: failed to start async runtime: {}", e), ctx),
    };
    match rt.block_on(fut) {
        Ok(value) => value,
        Err(e) => fail(&api_error_message(&e), ctx),
    }
}

fn api_error_message(e: &ApiError) -> String {
    let mut msg = format!("error: {}", e);
    if e.requires_login() {
        msg.push_str(&format!(
            "\nhint: log in again and export the new token as {}",
            gms_client::config::ENV_TOKEN
        ));
    } else if e.is_retryable() {
        msg.push_str("\nhint: the backend could not be reached; try again");
    }
    msg
}

pub(crate) fn cmd_list(role: Role, ctx: &Context) {
    let desk = desk(role, ctx);
    let letters = run(ctx, desk.list());
    emit(&letters, ctx.output, ctx.quiet, || render::list_text(&letters));
}

pub(crate) fn cmd_show(entry_id: &str, role: Role, ctx: &Context) {
    let desk = desk(role, ctx);
    let reconciled = run(ctx, desk.show(entry_id));
    let space = desk.actions(&reconciled.letter);
    emit(
        &json!({ "letter": &reconciled, "actions": &space }),
        ctx.output,
        ctx.quiet,
        || {
            format!(
                "{}\n{}",
                render::letter_text(&reconciled),
                render::actions_text(&space)
            )
        },
    );
}

pub(crate) fn cmd_remote_sign(entry_id: &str, role: Role, signer: &str, ctx: &Context) {
    let desk = desk(role, ctx);
    let outcome = run(ctx, async {
        let current = desk.show(entry_id).await?;
        desk.sign(&current.letter, signer, time::OffsetDateTime::now_utc())
            .await
    });
    emit(&outcome, ctx.output, ctx.quiet, || {
        let mut text = render::transition_text(&outcome.expected);
        match &outcome.confirmed {
            Some(confirmed) => {
                text.push_str("\n\n");
                text.push_str(&render::letter_text(confirmed));
            }
            None => text.push_str("\n(backend returned no record)"),
        }
        text
    });
}

pub(crate) fn cmd_reject(entry_id: &str, role: Role, reason: &str, ctx: &Context) {
    let desk = desk(role, ctx);
    let returned = run(ctx, async {
        let current = desk.show(entry_id).await?;
        desk.reject(&current.letter, reason).await
    });
    emit(
        &json!({ "entryId": entry_id, "role": role, "reason": reason, "letter": &returned }),
        ctx.output,
        ctx.quiet,
        || {
            let mut text = format!("Rejected {} as {}: {}", entry_id, role, reason);
            if let Some(letter) = &returned {
                text.push_str("\n\n");
                text.push_str(&render::letter_text(letter));
            }
            text
        },
    );
}
