//! `tt toggle`, `tt done` and `tt done-all`: completion state changes.

use super::{Context, VariantArg, render_item};
use crate::output::{pretty_kv, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use teachtask_core::model::Variant;

#[derive(Args, Debug)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Item ID.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DoneArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Item ID.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DoneAllArgs {
    /// Collection to complete: todo (default) or task.
    #[arg(short = 't', long = "variant", default_value = "todo")]
    pub variant: Variant,
}

#[derive(Debug, Serialize)]
struct DoneAllReport {
    variant: Variant,
    changed: usize,
}

pub fn run_toggle(args: &ToggleArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let item = ctx
        .lists()?
        .toggle_status(variant, &args.id)
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}

pub fn run_done(args: &DoneArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let item = ctx
        .lists()?
        .mark_done(variant, &args.id)
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}

pub fn run_done_all(args: &DoneAllArgs, ctx: &Context) -> anyhow::Result<()> {
    let changed = ctx
        .lists()?
        .mark_all_done(args.variant)
        .map_err(|err| ctx.fail(&err))?;
    let report = DoneAllReport {
        variant: args.variant,
        changed,
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}\t{}", r.variant, r.changed),
        |r, w| {
            writeln!(w, "✓ Marked every {} done", r.variant)?;
            pretty_kv(w, "Changed", r.changed.to_string())
        },
    )
}
