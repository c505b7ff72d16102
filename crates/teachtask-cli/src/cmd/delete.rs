//! `tt delete`: remove an item and close the gap.

use super::{Context, VariantArg, write_item_row};
use crate::output::{pretty_markup, render_mode};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Item ID.
    pub id: String,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let removed = ctx
        .lists()?
        .delete(variant, &args.id)
        .map_err(|err| ctx.fail(&err))?;
    render_mode(
        ctx.output,
        &removed,
        |item, w| write_item_row(w, item),
        |item, w| {
            writeln!(
                w,
                "✓ Deleted {variant} {}: {}",
                item.id,
                pretty_markup(&item.title)
            )
        },
    )
}
