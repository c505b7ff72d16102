//! `tt list`: show one collection in position order.

use super::{Context, VariantArg, render_items};
use clap::Args;
use teachtask_core::model::{StatusFilter, Variant};
use teachtask_core::view;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Show only items with this status: all, pending or done.
    #[arg(short, long, default_value = "all")]
    pub status: StatusFilter,
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let items = ctx.lists()?.load(variant).map_err(|err| ctx.fail(&err))?;
    let shown = view::filter(&items, args.status);
    tracing::debug!(%variant, total = items.len(), shown = shown.len(), "listed");
    render_items(ctx.output, heading(variant), &shown)
}

pub(crate) const fn heading(variant: Variant) -> &'static str {
    match variant {
        Variant::Task => "Tasks",
        Variant::Todo => "Teaching goals",
    }
}
