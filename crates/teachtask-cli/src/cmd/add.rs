//! `tt add`: append a task or teaching goal.

use super::{Context, VariantArg, join_words, render_item};
use clap::Args;
use teachtask_core::ListError;
use teachtask_core::model::Priority;

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Priority for a task: high, medium, low or a rank number.
    ///
    /// Todos take their priority from list position.
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Item text. `**bold**` spans are kept as markup.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    if args.priority.is_some() && variant.priority_follows_position() {
        return Err(ctx.fail(&ListError::PriorityIsPositional));
    }

    let lists = ctx.lists()?;
    let item = lists
        .add(variant, &join_words(&args.text), args.priority)
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}
